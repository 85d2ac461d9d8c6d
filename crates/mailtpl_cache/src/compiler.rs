//! The template compiler and its cache contract.
//!
//! `Compiler::template` reads a source template, picks the effective
//! destination directory (the caller's `path` override, or the default cache
//! directory), and returns the path of an up-to-date compiled artifact there,
//! writing it only on a cache miss.

use std::path::{Path, PathBuf};

use mailtpl_config::{CompileOptions, DefaultCacheDir, MailerConfig};

use crate::error::CompileError;
use crate::naming::ArtifactName;
use crate::store::ArtifactStore;
use crate::transform::{Identity, Transform};

enum DefaultDir {
    Global(&'static DefaultCacheDir),
    Owned(DefaultCacheDir),
}

impl DefaultDir {
    fn get(&self) -> &DefaultCacheDir {
        match self {
            DefaultDir::Global(dir) => dir,
            DefaultDir::Owned(dir) => dir,
        }
    }
}

/// Compiles source templates into cached artifacts.
///
/// A `Compiler` holds no per-call state and may be shared across threads.
pub struct Compiler {
    default_dir: DefaultDir,
    transform: Box<dyn Transform>,
    defaults: CompileOptions,
}

impl Compiler {
    /// A compiler using the process-wide default cache directory and the
    /// identity transform.
    pub fn new() -> Self {
        Self {
            default_dir: DefaultDir::Global(DefaultCacheDir::global()),
            transform: Box::new(Identity),
            defaults: CompileOptions::default(),
        }
    }

    /// A compiler with its own default cache directory.
    pub fn with_default_dir(default_dir: DefaultCacheDir) -> Self {
        Self {
            default_dir: DefaultDir::Owned(default_dir),
            ..Self::new()
        }
    }

    /// A compiler configured from a loaded `mailtpl.toml`.
    ///
    /// The `[options]` table becomes the options used by
    /// [`compile`](Self::compile).
    pub fn from_config(config: &MailerConfig) -> Self {
        Self {
            default_dir: DefaultDir::Owned(config.default_cache_dir()),
            transform: Box::new(Identity),
            defaults: config.options.clone(),
        }
    }

    /// Replaces the transform.
    pub fn with_transform(mut self, transform: impl Transform + 'static) -> Self {
        self.transform = Box::new(transform);
        self
    }

    /// Resolves the default cache directory.
    pub fn default_dir(&self) -> Result<&Path, CompileError> {
        Ok(self.default_dir.get().get()?)
    }

    /// Compiles `source_path` with the configured default options.
    pub fn compile(&self, source_path: &Path) -> Result<PathBuf, CompileError> {
        self.template(source_path, &self.defaults)
    }

    /// Compiles `source_path` and returns the absolute artifact path.
    ///
    /// The returned path lies under the effective destination directory and
    /// names a complete, readable file. An existing artifact for the same
    /// source content is returned without writing.
    pub fn template(
        &self,
        source_path: &Path,
        options: &CompileOptions,
    ) -> Result<PathBuf, CompileError> {
        let read_error = |source| CompileError::Read {
            path: source_path.to_path_buf(),
            source,
        };
        let source = std::fs::read(source_path).map_err(read_error)?;
        let canonical = std::fs::canonicalize(source_path).map_err(read_error)?;

        let dir = match options.override_dir() {
            Some(dir) => dir.to_path_buf(),
            None => self.default_dir()?.to_path_buf(),
        };
        let store = ArtifactStore::open(&dir)?;

        let name =
            ArtifactName::for_source(&canonical, self.transform.fingerprint(), options, &source);
        if store.contains(&name) {
            let artifact = store.artifact_path(&name);
            tracing::debug!(
                source = %canonical.display(),
                artifact = %artifact.display(),
                "template cache hit"
            );
            return Ok(artifact);
        }
        tracing::debug!(
            source = %canonical.display(),
            dir = %store.dir().display(),
            "template cache miss"
        );

        let compiled = self.transform.compile(&source, options)?;
        let artifact = store.write_atomic(&name, &compiled)?;
        tracing::info!(
            artifact = %artifact.display(),
            bytes = compiled.len(),
            "wrote compiled template"
        );

        let source_modified = std::fs::metadata(&canonical).and_then(|m| m.modified());
        match source_modified.map(|modified| store.prune(&name, modified)) {
            Ok(Ok(0)) => {}
            Ok(Ok(removed)) => tracing::debug!(removed, "pruned expired templates"),
            Ok(Err(e)) => tracing::warn!(error = %e, "failed to prune expired templates"),
            Err(e) => tracing::debug!(error = %e, "source mtime unavailable, skipping prune"),
        }

        Ok(artifact)
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}
