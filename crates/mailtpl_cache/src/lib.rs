//! Compilation cache for mail templates.
//!
//! [`Compiler::template`] turns a source template into a compiled artifact on
//! disk and returns its path. Artifacts are keyed by source identity and
//! content, written atomically, and reused until the source changes.

#![warn(missing_docs)]

pub mod compiler;
pub mod error;
pub mod naming;
pub mod store;
pub mod transform;

pub use compiler::Compiler;
pub use error::CompileError;
pub use naming::ArtifactName;
pub use store::ArtifactStore;
pub use transform::{Identity, Transform};
