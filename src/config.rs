// In: src/config.rs

//! The single source of truth for session configuration.
//!
//! `SessionConfig` is created once at the application boundary (typically
//! from a JSON file) and handed to `EvalSession` on construction. Every field
//! has a serde default, so a partial document, or `{}`, is valid.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::BridgeError;

//==================================================================================
// I. Sub-configurations
//==================================================================================

/// Settings for diagnostic logging.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct MonitoringConfig {
    /// Installs the `env_logger` backend at Info level when the session is built.
    #[serde(default)]
    pub verbose: bool,

    /// Appends log output to this file instead of stderr.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

//==================================================================================
// II. The Unified SessionConfig
//==================================================================================

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct SessionConfig {
    /// Default for the `silent` flag of the evaluation wrapper. When false the
    /// interpreter also echoes error diagnostics on its console.
    #[serde(default)]
    pub silent: bool,

    /// How many characters of the expression text to quote in transport
    /// fault messages.
    #[serde(default = "default_error_context_chars")]
    pub error_context_chars: usize,

    /// Replaces the bundled support script loaded before `eval_print`.
    #[serde(default)]
    pub support_script: Option<PathBuf>,

    #[serde(default)]
    pub monitoring: MonitoringConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            silent: false,
            error_context_chars: default_error_context_chars(),
            support_script: None,
            monitoring: MonitoringConfig::default(),
        }
    }
}

impl SessionConfig {
    pub fn from_json_str(json: &str) -> Result<Self, BridgeError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, BridgeError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

/// Helper for `serde` to provide a default for `error_context_chars`.
fn default_error_context_chars() -> usize {
    256
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = SessionConfig::from_json_str("{}").unwrap();
        assert_eq!(config, SessionConfig::default());
        assert_eq!(config.error_context_chars, 256);
        assert!(!config.silent);
    }

    #[test]
    fn test_partial_document() {
        let config = SessionConfig::from_json_str(
            r#"{"silent": true, "monitoring": {"verbose": true}}"#,
        )
        .unwrap();
        assert!(config.silent);
        assert!(config.monitoring.verbose);
        assert_eq!(config.monitoring.log_file, None);
        assert_eq!(config.error_context_chars, 256);
    }

    #[test]
    fn test_malformed_document_is_serde_error() {
        let result = SessionConfig::from_json_str("{\"silent\": 3}");
        assert!(matches!(result, Err(BridgeError::SerdeJson(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = SessionConfig::from_json_file("/nonexistent/rbridge/config.json");
        assert!(matches!(result, Err(BridgeError::Io(_))));
    }
}
