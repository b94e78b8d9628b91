//! Sanitizer configuration
//!
//! The only setting is `whitelist`, a pipe-delimited list of element names.
//! The core never reads ambient state: callers build a [`SanitizerConfig`]
//! from whatever source they have and hand it to [`Sanitizer::new`].
//!
//! [`Sanitizer::new`]: crate::Sanitizer::new
//!
//! # Examples
//!
//! ```
//! use html_sanitizer::SanitizerConfig;
//!
//! let config = SanitizerConfig::from_json(r#"{ "whitelist": "b|i|p" }"#).unwrap();
//! assert!(config.allow_list().contains("p"));
//!
//! let config = SanitizerConfig::from_lookup(|_| None);
//! assert!(config.allow_list().is_empty());
//! ```

use std::env;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::allow_list::AllowList;
use crate::error::SanitizeError;

/// Environment variable read by [`SanitizerConfig::from_env`]
pub const WHITELIST_ENV_VAR: &str = "HTML_SANITIZER_WHITELIST";

/// Explicit configuration value for a [`Sanitizer`](crate::Sanitizer)
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SanitizerConfig {
    /// Pipe-delimited element names, e.g. `"b|i|p|a"`. `None` means no
    /// elements are allowed.
    pub whitelist: Option<String>,
}

impl SanitizerConfig {
    /// Configuration with an explicit whitelist setting
    pub fn with_whitelist(whitelist: impl Into<String>) -> Self {
        Self {
            whitelist: Some(whitelist.into()),
        }
    }

    /// Read the whitelist from `HTML_SANITIZER_WHITELIST`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read the whitelist through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            whitelist: lookup(WHITELIST_ENV_VAR),
        }
    }

    /// Parse a JSON configuration document such as `{"whitelist": "b|i"}`
    pub fn from_json(json: &str) -> Result<Self, SanitizeError> {
        serde_json::from_str(json)
            .map_err(|e| SanitizeError::ConfigError(format!("invalid configuration JSON: {e}")))
    }

    /// Load a JSON configuration document from disk
    pub fn from_json_file(path: &Path) -> Result<Self, SanitizeError> {
        let contents = fs::read_to_string(path).map_err(|e| {
            SanitizeError::ConfigError(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&contents)
    }

    /// Build the allow-list described by this configuration
    pub fn allow_list(&self) -> AllowList {
        self.whitelist
            .as_deref()
            .map(AllowList::parse_delimited)
            .unwrap_or_default()
    }
}
