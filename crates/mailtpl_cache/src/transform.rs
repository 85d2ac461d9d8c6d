//! Pluggable source-to-artifact transforms.

use mailtpl_config::CompileOptions;

use crate::error::CompileError;

/// Turns template source bytes into compiled artifact bytes.
///
/// The fingerprint is part of every artifact's content key, so bump it
/// whenever the output for a given input changes.
pub trait Transform: Send + Sync {
    /// Stable identifier for this transform and its version.
    fn fingerprint(&self) -> &str;

    /// Compiles `source` into the artifact contents.
    fn compile(&self, source: &[u8], options: &CompileOptions) -> Result<Vec<u8>, CompileError>;
}

/// Copies the source through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl Transform for Identity {
    fn fingerprint(&self) -> &str {
        "identity/1"
    }

    fn compile(&self, source: &[u8], _options: &CompileOptions) -> Result<Vec<u8>, CompileError> {
        Ok(source.to_vec())
    }
}
