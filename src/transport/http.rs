//! HTTP client construction and request dispatch.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde_json::Value;
use tracing::{info, instrument};
use url::Url;
use uuid::Uuid;

use crate::{error::Result, payload::merge::EffectivePayload, profile::ProfileIdentity};

/// User agent sent with every request.
const USER_AGENT: &str = concat!("ptp-tester/", env!("CARGO_PKG_VERSION"));

/// Header naming the payment-type profile being exercised.
const PROFILE_HEADER: &str = "X-EBANX-Custom-Payment-Type-Profile";

/// Creates a configured HTTP client with connection pooling.
///
/// Configuration:
/// - Total timeout: 30 seconds
/// - Connection timeout: 10 seconds
/// - Connection pool: max 10 idle connections per host
///
/// Build one per session and reuse it across dispatches.
///
/// # Errors
///
/// Returns [`crate::error::TesterError::Http`] if client configuration
/// fails.
pub fn create_http_client() -> Result<Client> {
    Client::builder()
        .pool_max_idle_per_host(10)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .build()
        .map_err(Into::into)
}

/// One request ready for dispatch.
///
/// Holds a borrow of the unmasked payload; there is no way to dispatch a
/// masked view.
#[derive(Debug)]
pub struct DispatchRequest<'a> {
    /// Target endpoint.
    pub endpoint: Url,
    /// Payment-type-profile header value, from the profile identity.
    pub profile: String,
    /// Extra header from the custom-header toggle, if enabled.
    pub custom_header: Option<(String, String)>,
    /// The unmasked payload to transmit.
    pub payload: &'a EffectivePayload,
}

impl<'a> DispatchRequest<'a> {
    /// Builds a request for a profile against an endpoint.
    #[must_use]
    pub fn new(endpoint: Url, identity: &ProfileIdentity, payload: &'a EffectivePayload) -> Self {
        Self {
            endpoint,
            profile: identity.header_value().to_owned(),
            custom_header: None,
            payload,
        }
    }

    /// Attaches the custom header.
    #[must_use]
    pub fn with_custom_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_header = Some((name.into(), value.into()));
        self
    }
}

/// Response body, parsed when the server returned JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// Body parsed as JSON.
    Json(Value),
    /// Body kept as raw text.
    Text(String),
}

/// Outcome of one dispatch, opaque response data included.
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    /// Correlation id for log lines about this request.
    pub request_id: Uuid,
    /// HTTP status code.
    pub status: u16,
    /// Response body as received.
    pub body: ResponseBody,
    /// When the response arrived.
    pub received_at: DateTime<Utc>,
}

impl DispatchOutcome {
    /// Whether the status is in the 2xx range.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// The body as JSON, when the server returned JSON.
    #[must_use]
    pub const fn json(&self) -> Option<&Value> {
        match &self.body {
            ResponseBody::Json(value) => Some(value),
            ResponseBody::Text(_) => None,
        }
    }
}

/// Sends one payload and collects the response.
///
/// The body is always the unmasked effective payload. Response contents are
/// treated as opaque display data: any status code is an `Ok` outcome, and
/// only transport-level failures (timeouts, connection errors) become
/// [`crate::error::TesterError::Http`].
///
/// # Errors
///
/// Returns [`crate::error::TesterError::Http`] when the request cannot be
/// sent or the response body cannot be read.
#[instrument(skip(client, request), fields(endpoint = %request.endpoint, profile = %request.profile))]
pub async fn dispatch(client: &Client, request: &DispatchRequest<'_>) -> Result<DispatchOutcome> {
    let request_id = Uuid::new_v4();
    info!(%request_id, "dispatching payload");

    let mut builder = client
        .post(request.endpoint.clone())
        .header("User-Agent", USER_AGENT)
        .header(PROFILE_HEADER, &request.profile)
        .json(request.payload.as_value());
    if let Some((name, value)) = &request.custom_header {
        builder = builder.header(name, value);
    }

    let response = builder.send().await?;
    let status = response.status().as_u16();
    let text = response.text().await?;

    let body = match serde_json::from_str::<Value>(&text) {
        Ok(value) => ResponseBody::Json(value),
        Err(_) => ResponseBody::Text(text),
    };

    let outcome = DispatchOutcome { request_id, status, body, received_at: Utc::now() };
    info!(%request_id, status, "response received");
    Ok(outcome)
}

/// Renders the request as a multi-line cURL command for debugging.
///
/// Single quotes in the body are escaped so the command stays valid inside
/// single-quoted shell arguments. The rendered body is the unmasked
/// payload — this preview is what actually goes on the wire.
#[must_use]
pub fn curl_preview(request: &DispatchRequest<'_>) -> String {
    let json = request.payload.as_value().to_string().replace('\'', "'\"'\"'");
    let mut cmd = format!(
        "curl -X POST '{}' \\\n  -H 'Content-Type: application/json' \\\n  -H '{}: {}' \\\n",
        request.endpoint, PROFILE_HEADER, request.profile
    );
    if let Some((name, value)) = &request.custom_header {
        cmd.push_str(&format!("  -H '{name}: {value}' \\\n"));
    }
    cmd.push_str(&format!("  -d '{json}'"));
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{model::ProfileCategory, payload::merge::EffectivePayload};
    use serde_json::json;

    fn identity() -> ProfileIdentity {
        ProfileIdentity {
            name: "visa-ng-test".to_owned(),
            country: "NG".to_owned(),
            category: ProfileCategory::Card,
        }
    }

    fn payload() -> EffectivePayload {
        EffectivePayload::from_value(json!({
            "operation": "request",
            "payment": {"name": "O'Brien"}
        }))
    }

    #[test]
    fn test_create_http_client() {
        assert!(create_http_client().is_ok());
    }

    #[test]
    fn test_request_carries_profile_header_value() {
        let body = payload();
        let request =
            DispatchRequest::new(Url::parse("https://api.ebanx.com/ws/direct").unwrap(), &identity(), &body);
        assert_eq!(request.profile, "visa-ng-test");
        assert!(request.custom_header.is_none());
    }

    #[test]
    fn test_curl_preview_structure() {
        let body = payload();
        let request = DispatchRequest::new(
            Url::parse("https://api.ebanx.com/ws/direct").unwrap(),
            &identity(),
            &body,
        );
        let preview = curl_preview(&request);

        assert!(preview.starts_with("curl -X POST 'https://api.ebanx.com/ws/direct'"));
        assert!(preview.contains("-H 'Content-Type: application/json'"));
        assert!(preview.contains("-H 'X-EBANX-Custom-Payment-Type-Profile: visa-ng-test'"));
        assert!(preview.ends_with('\''));
    }

    #[test]
    fn test_curl_preview_escapes_single_quotes() {
        let body = payload();
        let request = DispatchRequest::new(
            Url::parse("https://api.ebanx.com/ws/direct").unwrap(),
            &identity(),
            &body,
        );
        let preview = curl_preview(&request);
        assert!(preview.contains("O'\"'\"'Brien"));
    }

    #[test]
    fn test_curl_preview_includes_custom_header() {
        let body = payload();
        let request = DispatchRequest::new(
            Url::parse("https://api.ebanx.com/ws/direct").unwrap(),
            &identity(),
            &body,
        )
        .with_custom_header("X-Debug-Run", "smoke-1");
        let preview = curl_preview(&request);
        assert!(preview.contains("-H 'X-Debug-Run: smoke-1'"));
    }

    #[tokio::test]
    async fn test_dispatch_surfaces_transport_failure() {
        let client = create_http_client().unwrap();
        let body = payload();
        // Port 9 (discard) refuses connections; the failure must come back
        // as a typed transport error, not a panic.
        let request = DispatchRequest::new(
            Url::parse("http://127.0.0.1:9/ws/direct").unwrap(),
            &identity(),
            &body,
        );
        let result = dispatch(&client, &request).await;
        assert!(matches!(result, Err(crate::error::TesterError::Http(_))));
    }

    #[test]
    fn test_outcome_success_ranges() {
        let outcome = DispatchOutcome {
            request_id: Uuid::new_v4(),
            status: 201,
            body: ResponseBody::Text(String::new()),
            received_at: Utc::now(),
        };
        assert!(outcome.is_success());

        let failed = DispatchOutcome { status: 500, ..outcome };
        assert!(!failed.is_success());
    }

    #[test]
    fn test_outcome_json_accessor() {
        let outcome = DispatchOutcome {
            request_id: Uuid::new_v4(),
            status: 200,
            body: ResponseBody::Json(json!({"status": "SUCCESS"})),
            received_at: Utc::now(),
        };
        assert_eq!(outcome.json().unwrap()["status"], "SUCCESS");

        let text = DispatchOutcome {
            body: ResponseBody::Text("oops".to_owned()),
            ..outcome
        };
        assert!(text.json().is_none());
    }
}
