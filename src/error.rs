//! Shield error types.
//!
//! Threat findings and validation failures are *data*, not errors: the
//! detector, sanitizers, validator and handlers always return a value.
//! `ShieldError` only covers fallible construction, such as loading a
//! configuration file or compiling a caller-supplied regex rule.

use thiserror::Error;

/// Shield errors.
#[derive(Error, Debug)]
pub enum ShieldError {
    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// A caller-supplied pattern failed to compile.
    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// Unknown preset name.
    #[error("Unknown preset: {0}")]
    UnknownPreset(String),

    /// I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Shield operations
pub type Result<T> = std::result::Result<T, ShieldError>;

impl From<toml::de::Error> for ShieldError {
    fn from(err: toml::de::Error) -> Self {
        ShieldError::Config(format!("Failed to parse config: {err}"))
    }
}
