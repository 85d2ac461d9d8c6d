//! Content hashing for artifact keys and staleness detection.

use serde::{Deserialize, Serialize};
use std::fmt;
use xxhash_rust::xxh3::Xxh3;

/// A 128-bit XXH3 hash identifying a piece of content.
///
/// Artifact names embed these keys, so two inputs with the same `ContentHash`
/// are assumed to produce the same compiled output.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash([u8; 16]);

impl ContentHash {
    /// Computes a content hash from a byte slice using XXH3-128.
    pub fn from_bytes(data: &[u8]) -> Self {
        Self(xxhash_rust::xxh3::xxh3_128(data).to_le_bytes())
    }

    /// Returns the first `len` hex characters of the hash.
    ///
    /// `len` is clamped to the full 32-character width.
    pub fn short_hex(&self, len: usize) -> String {
        let mut s = self.to_string();
        s.truncate(len.min(32));
        s
    }
}

/// Hashes a sequence of byte segments into one `ContentHash`.
///
/// Each segment is length-prefixed, so `["ab", "c"]` and `["a", "bc"]`
/// hash differently.
pub fn hash_parts(parts: &[&[u8]]) -> ContentHash {
    let mut hasher = Xxh3::new();
    for part in parts {
        hasher.update(&(part.len() as u64).to_le_bytes());
        hasher.update(part);
    }
    ContentHash(hasher.digest128().to_le_bytes())
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", self.short_hex(8))
    }
}
