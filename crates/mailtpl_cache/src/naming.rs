//! Deterministic artifact file names.
//!
//! A name has the shape
//! `template_<parent>_<stem>_<path key>_<variant key>_<content key>.<ext>`.
//! Everything up to and including the variant key is the identity: it is
//! fixed for a given source path, transform fingerprint and set of transform
//! options. The content key changes whenever the source bytes do.

use std::path::Path;

use mailtpl_common::{hash_parts, ContentHash};
use mailtpl_config::CompileOptions;

/// Leading component of every artifact name.
const NAME_PREFIX: &str = "template";

/// Hex characters of the path hash kept in the name.
const PATH_KEY_LEN: usize = 16;

/// Hex characters of the variant hash kept in the name.
const VARIANT_KEY_LEN: usize = 8;

/// Extension used when the source has none.
const FALLBACK_EXT: &str = "tpl";

/// The computed name of a compiled artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactName {
    identity: String,
    content_key: ContentHash,
    ext: String,
}

impl ArtifactName {
    /// Derives the artifact name for a source.
    ///
    /// `source_path` should be canonical so that different spellings of the
    /// same file share one identity. Only `options.extra` contributes; the
    /// destination override does not change the name.
    pub fn for_source(
        source_path: &Path,
        fingerprint: &str,
        options: &CompileOptions,
        source: &[u8],
    ) -> Self {
        let parent = source_path
            .parent()
            .and_then(|p| p.file_name())
            .map(|n| sanitize(&n.to_string_lossy()))
            .unwrap_or_else(|| "root".to_string());
        let stem = source_path
            .file_stem()
            .map(|s| sanitize(&s.to_string_lossy()))
            .unwrap_or_else(|| "anonymous".to_string());
        let path_key = ContentHash::from_bytes(source_path.as_os_str().as_encoded_bytes())
            .short_hex(PATH_KEY_LEN);
        let ext = source_path
            .extension()
            .map(|e| sanitize(&e.to_string_lossy()))
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| FALLBACK_EXT.to_string());
        let transform_key = options.transform_key();
        let variant_key = hash_parts(&[fingerprint.as_bytes(), transform_key.as_bytes()])
            .short_hex(VARIANT_KEY_LEN);

        Self {
            identity: format!("{NAME_PREFIX}_{parent}_{stem}_{path_key}_{variant_key}_"),
            content_key: hash_parts(&[fingerprint.as_bytes(), transform_key.as_bytes(), source]),
            ext,
        }
    }

    /// Prefix shared by every artifact of this source under the same transform
    /// and options.
    pub fn identity_prefix(&self) -> &str {
        &self.identity
    }

    /// Hash of the transform fingerprint, options and source bytes.
    pub fn content_key(&self) -> ContentHash {
        self.content_key
    }

    /// The full file name.
    pub fn file_name(&self) -> String {
        format!("{}{}.{}", self.identity, self.content_key, self.ext)
    }

    /// Returns `true` if `file_name` is an artifact of the same source,
    /// transform and options, whatever its content key.
    pub fn is_sibling(&self, file_name: &str) -> bool {
        let Some(rest) = file_name.strip_prefix(self.identity.as_str()) else {
            return false;
        };
        match rest.split_once('.') {
            Some((key, ext)) => {
                key.len() == 32 && key.chars().all(|c| c.is_ascii_hexdigit()) && ext == self.ext
            }
            None => false,
        }
    }
}

/// Replaces anything outside `[A-Za-z0-9-]` with `_`.
fn sanitize(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
