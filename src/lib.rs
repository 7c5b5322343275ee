//! PTP Tester: payload engine for exercising payment-API test profiles.
//!
//! This crate is the engine of an internal console for manually building
//! payment-API test requests against saved configuration profiles and
//! inspecting the responses. It keeps two representations of one request
//! mutually consistent — a typed field model edited through a form, and the
//! raw JSON request body edited as text — while layering per-profile
//! overrides on top and deriving a privacy-masked view for display.
//!
//! # Architecture
//!
//! ```text
//! form edit ──▶ ┌──────────────────┐ ◀── raw JSON edit
//!               │ SyncCoordinator  │
//!               └───┬──────────┬───┘
//!                   ▼          ▼
//!           FieldModel   override fragment
//!                   │          │
//!            compile ▼          ▼ merge
//!           CompiledPayload ─▶ EffectivePayload ──▶ transport (unmasked)
//!                                     │
//!                                mask ▼
//!                                MaskedView ──▶ display only
//! ```
//!
//! The ordering is strict: masking is the final, display-only step. The
//! transport accepts only [`payload::EffectivePayload`], so a masked value
//! can never reach the wire.
//!
//! # Quick Start
//!
//! ```
//! use ptp_tester::{
//!     model::Scenario,
//!     payload::CompileOptions,
//!     sync::SyncCoordinator,
//! };
//!
//! # fn example() -> ptp_tester::Result<()> {
//! let mut sync =
//!     SyncCoordinator::new(Scenario::Unauthenticated, CompileOptions::new("sk_test_key"))?;
//!
//! // Form direction: edit a field, read the republished raw body.
//! sync.field_edited("card_cvv", "999")?;
//! println!("{}", sync.raw_payload_text());
//!
//! // Raw direction: paste JSON, recognized paths land back in the model.
//! let edited = sync.raw_payload_text().replace("999", "123");
//! sync.payload_text_edited(&edited)?;
//!
//! // Display: masked view, with the unmasked source still attached.
//! let view = sync.masked_view();
//! println!("{}", view.to_pretty_string());
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - [`model`]: scenarios, method-type declarations, the typed field model
//! - [`payload`]: compiler, override merger, privacy mask
//! - [`sync`]: the coordinator state machine between the two directions
//! - [`profile`]: saved profiles and the file-backed store
//! - [`settings`]: persisted operator settings
//! - [`transport`]: HTTP dispatch, cURL preview, redirect extraction
//! - [`error`]: error taxonomy
//!
//! # Concurrency
//!
//! Every engine operation is a synchronous pure computation meant to run on
//! the interactive thread; only [`transport::dispatch`] is async so network
//! calls can run elsewhere. The engine holds no locks and no in-flight
//! state.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod error;
pub mod model;
pub mod payload;
pub mod profile;
pub mod settings;
pub mod sync;
pub mod transport;

pub use error::{Result, TesterError};
pub use model::{FieldModel, FieldValue, Scenario};
pub use payload::{CompileOptions, EffectivePayload, MaskedView};
pub use profile::{FileProfileStore, Profile, ProfileIdentity, ProfileStore};
pub use settings::Settings;
pub use sync::SyncCoordinator;
