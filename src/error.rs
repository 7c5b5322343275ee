//! Error types for the profile tester engine.
//!
//! All fallible operations in this crate return [`Result`], and every error
//! is reported to the caller as a typed value. Nothing in the engine
//! terminates the process: a bad field value, an incomplete toggle, or an
//! unparsable payload edit leaves the previous valid state in place and
//! surfaces the failure for inline display.

use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, TesterError>;

/// Errors that can occur while compiling, syncing, storing, or dispatching
/// payloads.
///
/// # Recovery
///
/// - [`Validation`](Self::Validation): fix the field value and retry; the
///   field model is unchanged.
/// - [`IncompleteConfiguration`](Self::IncompleteConfiguration): fill in or
///   disable the toggle; the previously compiled payload remains valid.
/// - [`MalformedPayload`](Self::MalformedPayload): correct the raw JSON; the
///   last valid field model is retained and the typed text is preserved.
/// - [`Http`](Self::Http): transport failure, opaque to the engine; retry or
///   inspect the endpoint.
#[must_use = "errors should be handled or surfaced to the caller"]
#[derive(Debug, Error)]
pub enum TesterError {
    /// A value does not match the declared type of its field.
    ///
    /// Raised by [`FieldModel::set`](crate::model::FieldModel::set) when a
    /// non-numeric string is written into a numeric field, a value is
    /// written to an unknown field, and similar mismatches. The model is
    /// left unchanged.
    #[error("invalid value for field '{field}': {reason}")]
    Validation {
        /// Name of the rejected field.
        field: String,
        /// Human-readable rejection reason.
        reason: String,
    },

    /// An optional feature is enabled but its required value is empty.
    ///
    /// Raised at compile time only; no payload is emitted with a malformed
    /// or empty optional field.
    #[error("incomplete configuration: {0}")]
    IncompleteConfiguration(String),

    /// A raw payload edit is not parsable as JSON.
    ///
    /// The coordinator keeps the last valid field model and payload, and
    /// retains the user's text for correction.
    #[error("payload is not valid JSON: {0}")]
    MalformedPayload(#[source] serde_json::Error),

    /// Profile store document is structurally unusable.
    #[error("profile store error: {0}")]
    Store(String),

    /// Underlying file I/O failed while reading or writing a store or
    /// settings document.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed.
    ///
    /// Wraps [`reqwest::Error`]; timeouts, connection failures, and TLS
    /// errors all land here. The engine treats these as opaque transport
    /// failures for display.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The configured endpoint is not a usable URL.
    #[error("invalid endpoint URL: {0}")]
    InvalidEndpoint(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display() {
        let error = TesterError::Validation {
            field: "card_cvv".to_owned(),
            reason: "expected digits".to_owned(),
        };
        assert_eq!(error.to_string(), "invalid value for field 'card_cvv': expected digits");
    }

    #[test]
    fn test_incomplete_configuration_display() {
        let error = TesterError::IncompleteConfiguration("soft descriptor is empty".to_owned());
        assert!(error.to_string().contains("incomplete configuration"));
    }

    #[test]
    fn test_malformed_payload_carries_parse_error() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let error = TesterError::MalformedPayload(parse_err);
        assert!(error.to_string().starts_with("payload is not valid JSON"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let error: TesterError = io.into();
        assert!(matches!(error, TesterError::Io(_)));
    }

    #[test]
    fn test_invalid_endpoint_display() {
        let error = TesterError::InvalidEndpoint("not-a-url".to_owned());
        assert_eq!(error.to_string(), "invalid endpoint URL: not-a-url");
    }
}
