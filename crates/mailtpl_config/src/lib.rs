//! Compile options, resource-root resolution and `mailtpl.toml` loading.
//!
//! The cache crate consumes the types here to decide where compiled templates
//! land. Nothing in this crate writes to the filesystem.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod options;
pub mod resources;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE};
pub use options::CompileOptions;
pub use resources::{
    DefaultCacheDir, EnvRoot, FixedRoot, ResourceRoot, DEFAULT_CACHE_SUBDIR, RESOURCES_ENV,
};
pub use types::{CacheConfig, MailerConfig, ResourcesConfig};
