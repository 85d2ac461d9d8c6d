//! Error types for configuration loading and destination validation.

use std::path::PathBuf;

/// Errors that can occur when loading configuration or resolving directories.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An I/O error occurred while reading the configuration file.
    #[error("failed to read configuration: {0}")]
    IoError(#[from] std::io::Error),

    /// The TOML content could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    /// A required field is missing or empty.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// A configuration value failed validation.
    #[error("validation error: {0}")]
    ValidationError(String),

    /// A destination path exists but is not a directory.
    #[error("destination `{}` is not a directory", path.display())]
    NotADirectory {
        /// The offending path.
        path: PathBuf,
    },

    /// The resources root could not be determined.
    #[error("cannot resolve resources root: {0}")]
    ResourceRoot(String),
}
