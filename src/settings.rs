//! Persisted operator settings.
//!
//! Two values survive restarts: the API base URL and the integration key.
//! They live in a small JSON file whose location the caller chooses; a
//! missing or corrupt file yields defaults rather than an error, so a bad
//! settings file never blocks startup.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use tracing::warn;
use url::Url;

use crate::error::{Result, TesterError};

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.ebanx.com/";

/// Path of the direct-payment endpoint under the base URL.
const DIRECT_ENDPOINT: &str = "ws/direct";

/// Operator settings persisted between sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// API base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Integration key injected into compiled payloads. Empty until the
    /// operator supplies one.
    #[serde(default)]
    pub integration_key: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_owned()
}

impl Default for Settings {
    fn default() -> Self {
        Self { base_url: default_base_url(), integration_key: String::new() }
    }
}

impl Settings {
    /// Reads settings from `path`, falling back to defaults when the file
    /// is missing or unreadable.
    #[must_use]
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "corrupt settings file, using defaults");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Writes settings to `path`, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns [`TesterError::Io`] on write failures.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(self)
            .map_err(|e| TesterError::Store(format!("unencodable settings: {e}")))?;
        fs::write(path, text)?;
        Ok(())
    }

    /// Resolves the direct-payment endpoint from the base URL.
    ///
    /// # Errors
    ///
    /// Returns [`TesterError::InvalidEndpoint`] when the base URL does not
    /// parse.
    pub fn endpoint(&self) -> Result<Url> {
        let base = self.base_url.trim_end_matches('/');
        let full = format!("{base}/{DIRECT_ENDPOINT}");
        Url::parse(&full).map_err(|e| TesterError::InvalidEndpoint(format!("{full}: {e}")))
    }
}
