//! Codec Configuration
//!
//! Loaded from JSON. Every field has a default so an empty object is valid.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::MAX_SID_LENGTH;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    #[default]
    Error,
    Warning,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct CodecConfig {
    /// Run the validator before encoding.
    #[serde(default)]
    pub validate_on_encode: bool,
    #[serde(default = "default_max_sid_length")]
    pub max_sid_length: usize,
    /// `warning` lets overlong sids through decode and validation.
    #[serde(default)]
    pub sid_length_severity: Severity,
}

fn default_max_sid_length() -> usize { MAX_SID_LENGTH }

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            validate_on_encode: false,
            max_sid_length: MAX_SID_LENGTH,
            sid_length_severity: Severity::Error,
        }
    }
}

impl CodecConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Whether the node codec itself rejects overlong sids.
    pub fn sid_length_is_hard(&self) -> bool {
        self.sid_length_severity == Severity::Error
    }
}
