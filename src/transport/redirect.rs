//! Redirect-URL extraction for authenticated (3-D Secure) responses.

use serde_json::Value;
use url::Url;

/// Response paths checked for a redirect URL, in order.
const REDIRECT_PATHS: &[&[&str]] = &[
    &["redirect_url"],
    &["payment", "redirect_url"],
    &["payment", "threeds_redirect_url"],
];

/// Finds the payer-authentication redirect URL in a response body.
///
/// Returns the first well-formed URL found at a known path. The engine
/// only exposes the URL; opening it is the caller's job.
#[must_use]
pub fn extract_redirect_url(body: &Value) -> Option<Url> {
    for path in REDIRECT_PATHS {
        let mut cursor = body;
        let mut found = true;
        for segment in *path {
            match cursor.get(segment) {
                Some(next) => cursor = next,
                None => {
                    found = false;
                    break;
                }
            }
        }
        if !found {
            continue;
        }
        if let Some(url) = cursor.as_str().and_then(|s| Url::parse(s).ok()) {
            return Some(url);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_top_level_redirect() {
        let body = json!({"status": "SUCCESS", "redirect_url": "https://3ds.example.com/auth/1"});
        let url = extract_redirect_url(&body).unwrap();
        assert_eq!(url.as_str(), "https://3ds.example.com/auth/1");
    }

    #[test]
    fn test_nested_redirect() {
        let body = json!({"payment": {"redirect_url": "https://3ds.example.com/auth/2"}});
        assert!(extract_redirect_url(&body).is_some());
    }

    #[test]
    fn test_threeds_specific_path() {
        let body = json!({"payment": {"threeds_redirect_url": "https://3ds.example.com/auth/3"}});
        assert!(extract_redirect_url(&body).is_some());
    }

    #[test]
    fn test_absent_redirect() {
        let body = json!({"status": "SUCCESS", "payment": {"hash": "abc"}});
        assert_eq!(extract_redirect_url(&body), None);
    }

    #[test]
    fn test_malformed_url_is_skipped() {
        let body = json!({
            "redirect_url": "not a url",
            "payment": {"redirect_url": "https://3ds.example.com/auth/4"}
        });
        let url = extract_redirect_url(&body).unwrap();
        assert_eq!(url.as_str(), "https://3ds.example.com/auth/4");
    }

    #[test]
    fn test_non_string_redirect_is_ignored() {
        let body = json!({"redirect_url": 42});
        assert_eq!(extract_redirect_url(&body), None);
    }
}
