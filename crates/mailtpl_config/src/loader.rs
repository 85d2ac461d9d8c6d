//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::MailerConfig;
use std::path::{Component, Path, PathBuf};

/// Name of the configuration file looked up in a project directory.
pub const CONFIG_FILE: &str = "mailtpl.toml";

/// Loads and validates `<project_dir>/mailtpl.toml`.
///
/// Relative `resources.root` and `options.path` values are taken relative to
/// `project_dir`. An empty `options.path` stays empty.
pub fn load_config(project_dir: &Path) -> Result<MailerConfig, ConfigError> {
    let content = std::fs::read_to_string(project_dir.join(CONFIG_FILE))?;
    let mut config = load_config_from_str(&content)?;
    if let Some(root) = config.resources.root.take() {
        config.resources.root = Some(rebase(project_dir, root));
    }
    if let Some(path) = config.options.path.take() {
        config.options.path = Some(if path.as_os_str().is_empty() {
            path
        } else {
            rebase(project_dir, path)
        });
    }
    Ok(config)
}

fn rebase(project_dir: &Path, path: PathBuf) -> PathBuf {
    if path.is_relative() {
        project_dir.join(path)
    } else {
        path
    }
}

/// Parses and validates a `mailtpl.toml` configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<MailerConfig, ConfigError> {
    let config: MailerConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// The cache subdir must stay inside the resources root.
fn validate_config(config: &MailerConfig) -> Result<(), ConfigError> {
    let subdir = &config.cache.subdir;
    if subdir.as_os_str().is_empty() {
        return Err(ConfigError::MissingField("cache.subdir".to_string()));
    }
    if subdir.is_absolute() || subdir.has_root() {
        return Err(ConfigError::ValidationError(format!(
            "cache.subdir `{}` must be relative",
            subdir.display()
        )));
    }
    if subdir.components().any(|c| matches!(c, Component::ParentDir)) {
        return Err(ConfigError::ValidationError(format!(
            "cache.subdir `{}` must not leave the resources root",
            subdir.display()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_empty_config() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.cache.subdir, PathBuf::from("tmp/cache/mails"));
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[resources]
root = "/srv/app/resources"

[cache]
subdir = "cache/mails"

[options]
path = "/var/cache/mailtpl"
escape = true
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(
            config.resources.root,
            Some(PathBuf::from("/srv/app/resources"))
        );
        assert_eq!(config.cache.subdir, PathBuf::from("cache/mails"));
        assert_eq!(
            config.options.override_dir(),
            Some(Path::new("/var/cache/mailtpl"))
        );
        assert!(config.options.extra.contains_key("escape"));
    }

    #[test]
    fn absolute_subdir_rejected() {
        let err = load_config_from_str("[cache]\nsubdir = \"/abs\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn escaping_subdir_rejected() {
        let err = load_config_from_str("[cache]\nsubdir = \"../outside\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn empty_subdir_rejected() {
        let err = load_config_from_str("[cache]\nsubdir = \"\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(_)));
    }

    #[test]
    fn invalid_toml_errors() {
        let err = load_config_from_str("this is not valid toml {{{}}}").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn relative_root_joined_to_project_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "[resources]\nroot = \"res\"\n",
        )
        .unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.resources.root, Some(dir.path().join("res")));
    }

    #[test]
    fn relative_options_path_joined_to_project_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "[options]\npath = \"cache/out\"\n",
        )
        .unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(
            config.options.override_dir(),
            Some(dir.path().join("cache/out").as_path())
        );
    }

    #[test]
    fn absolute_and_empty_options_path_untouched() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "[options]\npath = \"/srv/out\"\n").unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.options.path, Some(PathBuf::from("/srv/out")));

        std::fs::write(dir.path().join(CONFIG_FILE), "[options]\npath = \"\"\n").unwrap();
        let config = load_config(dir.path()).unwrap();
        assert!(config.options.override_dir().is_none());
    }

    #[test]
    fn io_error_from_nonexistent_dir() {
        let err = load_config(Path::new("/nonexistent/dir")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
