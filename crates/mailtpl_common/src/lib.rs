//! Shared foundational types for the mail template toolchain.
//!
//! Currently this is the content hash used to key compiled template artifacts.

#![warn(missing_docs)]

pub mod hash;

pub use hash::{hash_parts, ContentHash};
