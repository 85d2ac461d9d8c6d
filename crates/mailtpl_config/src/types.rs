//! Configuration types deserialized from `mailtpl.toml`.

use serde::Deserialize;
use std::path::PathBuf;

use crate::options::CompileOptions;
use crate::resources::{DefaultCacheDir, EnvRoot, FixedRoot, DEFAULT_CACHE_SUBDIR};

/// The top-level configuration parsed from `mailtpl.toml`.
///
/// Every table is optional; an empty file yields the same behavior as no file.
#[derive(Debug, Default, Deserialize)]
pub struct MailerConfig {
    /// Where the resources root lives.
    #[serde(default)]
    pub resources: ResourcesConfig,
    /// Cache placement under the resources root.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Default options applied when a caller passes none.
    #[serde(default)]
    pub options: CompileOptions,
}

/// The `[resources]` table.
#[derive(Debug, Default, Deserialize)]
pub struct ResourcesConfig {
    /// Explicit resources root. When absent the environment decides.
    pub root: Option<PathBuf>,
}

/// The `[cache]` table.
#[derive(Debug, Deserialize)]
pub struct CacheConfig {
    /// Cache directory relative to the resources root.
    #[serde(default = "default_subdir")]
    pub subdir: PathBuf,
}

fn default_subdir() -> PathBuf {
    PathBuf::from(DEFAULT_CACHE_SUBDIR)
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            subdir: default_subdir(),
        }
    }
}

impl MailerConfig {
    /// Builds the default cache directory this configuration describes.
    ///
    /// An explicit `resources.root` wins; otherwise [`EnvRoot`] is used.
    pub fn default_cache_dir(&self) -> DefaultCacheDir {
        let subdir = &self.cache.subdir;
        match &self.resources.root {
            Some(root) => DefaultCacheDir::with_subdir(FixedRoot(root.clone()), subdir),
            None => DefaultCacheDir::with_subdir(EnvRoot, subdir),
        }
    }
}
