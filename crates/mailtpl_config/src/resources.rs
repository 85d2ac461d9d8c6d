//! Resource-root resolution and the default cache directory.
//!
//! The resources root is owned by whoever embeds the compiler, so it is
//! injected through [`ResourceRoot`] instead of being hard-coded. The default
//! cache directory is computed from it once and then reused.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::error::ConfigError;

/// Cache location relative to the resources root.
pub const DEFAULT_CACHE_SUBDIR: &str = "tmp/cache/mails";

/// Environment variable consulted by [`EnvRoot`].
pub const RESOURCES_ENV: &str = "MAILTPL_RESOURCES";

/// Supplies the resources root directory.
pub trait ResourceRoot: Send + Sync {
    /// Returns the resources root.
    fn resolve(&self) -> Result<PathBuf, ConfigError>;
}

/// A resources root fixed at construction time.
#[derive(Debug, Clone)]
pub struct FixedRoot(pub PathBuf);

impl ResourceRoot for FixedRoot {
    fn resolve(&self) -> Result<PathBuf, ConfigError> {
        Ok(self.0.clone())
    }
}

/// Reads the root from `MAILTPL_RESOURCES`, falling back to `./resources`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvRoot;

impl ResourceRoot for EnvRoot {
    fn resolve(&self) -> Result<PathBuf, ConfigError> {
        match std::env::var_os(RESOURCES_ENV) {
            Some(root) if !root.is_empty() => Ok(PathBuf::from(root)),
            _ => {
                let cwd = std::env::current_dir()
                    .map_err(|e| ConfigError::ResourceRoot(e.to_string()))?;
                Ok(cwd.join("resources"))
            }
        }
    }
}

/// Lazily resolved default destination for compiled templates.
///
/// The resolver runs at most once successfully; the resulting path is stable
/// for the lifetime of the value. A failed resolution is not cached.
pub struct DefaultCacheDir {
    root: Box<dyn ResourceRoot>,
    subdir: PathBuf,
    resolved: OnceLock<PathBuf>,
}

impl DefaultCacheDir {
    /// Creates a default cache directory under `root` at [`DEFAULT_CACHE_SUBDIR`].
    pub fn new(root: impl ResourceRoot + 'static) -> Self {
        Self::with_subdir(root, DEFAULT_CACHE_SUBDIR)
    }

    /// Creates a default cache directory under `root` at `subdir`.
    pub fn with_subdir(root: impl ResourceRoot + 'static, subdir: impl Into<PathBuf>) -> Self {
        Self {
            root: Box::new(root),
            subdir: subdir.into(),
            resolved: OnceLock::new(),
        }
    }

    /// The process-wide default, rooted by [`EnvRoot`].
    pub fn global() -> &'static DefaultCacheDir {
        static GLOBAL: OnceLock<DefaultCacheDir> = OnceLock::new();
        GLOBAL.get_or_init(|| DefaultCacheDir::new(EnvRoot))
    }

    /// Returns the default cache directory, resolving it on first use.
    pub fn get(&self) -> Result<&Path, ConfigError> {
        if let Some(dir) = self.resolved.get() {
            return Ok(dir);
        }
        let dir = self.root.resolve()?.join(&self.subdir);
        tracing::trace!(dir = %dir.display(), "resolved default cache directory");
        Ok(self.resolved.get_or_init(|| dir))
    }
}

impl std::fmt::Debug for DefaultCacheDir {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultCacheDir")
            .field("subdir", &self.subdir)
            .field("resolved", &self.resolved.get())
            .finish()
    }
}
