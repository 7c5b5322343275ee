//! HTTP dispatch of effective payloads and response helpers.
//!
//! The transport consumes [`crate::payload::EffectivePayload`] directly —
//! never a masked view — so what goes on the wire is the real data by
//! construction, whatever the display layer is showing.

pub mod http;
pub mod redirect;

pub use http::{create_http_client, curl_preview, dispatch, DispatchOutcome, DispatchRequest, ResponseBody};
pub use redirect::extract_redirect_url;
