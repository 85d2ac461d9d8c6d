//! Error types for template compilation.

use std::path::PathBuf;

use mailtpl_config::ConfigError;

/// Errors returned by [`Compiler::template`](crate::Compiler::template).
///
/// None of these are recovered internally. A failed call leaves no artifact
/// at its final path.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// The source template is missing or unreadable.
    #[error("cannot read template {}: {source}", path.display())]
    Read {
        /// The source path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The destination directory or artifact could not be written.
    #[error("cannot write compiled template {}: {source}", path.display())]
    Write {
        /// The directory or artifact path that failed.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The destination configuration is unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The transform rejected the template.
    #[error("template transform failed: {reason}")]
    Transform {
        /// Description of the failure.
        reason: String,
    },
}
