//! Error types for rsdk

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for rsdk operations
pub type Result<T> = std::result::Result<T, SdkError>;

/// Main error type for rsdk
#[derive(Error, Debug)]
pub enum SdkError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Placeholder resolution errors
    #[error("Resolution error: {0}")]
    Resolve(#[from] ResolveError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// YAML parsing errors
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Configuration discovery and record errors
///
/// All of these abort assembly; a half-built task graph is never returned.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Setting '{0}' is not configured properly")]
    MissingSetting(String),

    #[error("Task record '{record}' is missing required field '{field}'")]
    MissingField { record: String, field: &'static str },

    #[error("Task record '{record}' has an invalid '{field}': {error}")]
    InvalidField {
        record: String,
        field: &'static str,
        error: String,
    },

    #[error("Task record '{record}' is malformed: {error}")]
    InvalidRecord { record: String, error: String },

    #[error("Task '{0}' is not defined")]
    TaskNotFound(String),

    #[error("Failed to read '{path}': {error}")]
    ReadFile { path: PathBuf, error: String },
}

/// Placeholder resolution errors
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Required settings are missing for '{placeholder}': {}", paths.join(", "))]
    MissingSetting {
        placeholder: String,
        paths: Vec<String>,
    },

    #[error("No value available for '{0}'")]
    MissingValue(String),

    #[error("Value resolver '{0}' is not registered")]
    UnknownResolver(String),

    #[error("Invalid configuration for value resolver '{resolver}': {error}")]
    InvalidConfiguration { resolver: String, error: String },

    #[error("Failed to receive value: {0}")]
    Receiver(String),
}

/// Specialized result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Specialized result type for resolution operations
pub type ResolveResult<T> = std::result::Result<T, ResolveError>;

/// Whether a resolution error can be degraded to "no value" locally
pub fn is_missing_value(err: &ResolveError) -> bool {
    matches!(err, ResolveError::MissingValue(_))
}
