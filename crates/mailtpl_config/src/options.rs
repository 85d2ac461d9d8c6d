//! Per-call compile options.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Options passed to a single compile call.
///
/// `path` is the only key the cache understands. Every other key lands in
/// `extra` untouched, where a transform may read it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CompileOptions {
    /// Destination directory override. Replaces the default cache directory;
    /// it is never joined onto it.
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Keys reserved for transform-specific configuration.
    #[serde(flatten)]
    pub extra: BTreeMap<String, toml::Value>,
}

impl CompileOptions {
    /// Options with no override.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the destination directory override.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Stores a transform-specific key.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<toml::Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Returns the override directory, treating an empty path as absent.
    pub fn override_dir(&self) -> Option<&Path> {
        self.path.as_deref().filter(|p| !p.as_os_str().is_empty())
    }

    /// Canonical text form of `extra`, one `key=value` line per key in key
    /// order. Equal maps always produce equal keys.
    pub fn transform_key(&self) -> String {
        let mut key = String::new();
        for (name, value) in &self.extra {
            key.push_str(name);
            key.push('=');
            key.push_str(&value.to_string());
            key.push('\n');
        }
        key
    }
}
