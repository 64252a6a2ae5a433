//! Configuration management with environment variable support.
//!
//! This module provides [`Config`] for loading and validating filecrypt
//! settings from JSON files and environment variables.
//!
//! ## Environment Variables
//!
//! - `FILECRYPT_CONFIG`: Override config file path (default `filecrypt.json`)
//! - `FILECRYPT_EXTENSION`: Override the default folder extension filter
//! - `FILECRYPT_RECURSIVE`: Override recursion (`true`/`false`/`1`/`0`/`yes`/`no`)
//! - `FILECRYPT_OUTPUT_DIR`: Override the default output directory
//!
//! The passphrase is never part of the configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Environment variable names for configuration overrides
pub const ENV_CONFIG_PATH: &str = "FILECRYPT_CONFIG";
pub const ENV_EXTENSION_FILTER: &str = "FILECRYPT_EXTENSION";
pub const ENV_RECURSIVE: &str = "FILECRYPT_RECURSIVE";
pub const ENV_OUTPUT_DIR: &str = "FILECRYPT_OUTPUT_DIR";

/// Config file picked up from the working directory when none is named
pub const DEFAULT_CONFIG_PATH: &str = "filecrypt.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Suffix a file name must end with to be picked up by folder encryption
    pub extension_filter: String,
    pub recursive: bool,
    pub output_dir: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            extension_filter: String::new(),
            recursive: true,
            output_dir: None,
        }
    }
}

impl Config {
    /// Load config from file path
    pub fn load(path: &str) -> Result<Self> {
        let mut config = Self::read_file(path)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Load config with environment variable overrides
    /// Priority: ENV vars > config file > defaults
    ///
    /// The file is `path`, else `FILECRYPT_CONFIG`, else [`DEFAULT_CONFIG_PATH`].
    /// A file named explicitly (argument or environment) must exist; the
    /// default file is optional.
    pub fn load_with_env(path: Option<&str>) -> Result<Self> {
        Self::load_with_lookup(path, |name| env::var(name).ok())
    }

    /// [`Config::load_with_env`] with a custom variable source
    pub fn load_with_lookup<F>(path: Option<&str>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let explicit = path.map(String::from).or_else(|| lookup(ENV_CONFIG_PATH));

        let mut config = match explicit {
            Some(ref p) => {
                info!(path = p, "loading config from file");
                Self::read_file(p)?
            }
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                info!(path = DEFAULT_CONFIG_PATH, "loading config from file");
                Self::read_file(DEFAULT_CONFIG_PATH)?
            }
            None => {
                debug!("using default configuration");
                Config::default()
            }
        };

        config.apply_overrides(lookup)?;
        config.validate()?;
        Ok(config)
    }

    fn read_file(path: &str) -> Result<Self> {
        let s =
            fs::read_to_string(path).with_context(|| format!("reading config file {}", path))?;
        serde_json::from_str(&s).with_context(|| format!("parsing config file {}", path))
    }

    /// Apply environment variable overrides to config
    fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|name| env::var(name).ok())
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(filter) = lookup(ENV_EXTENSION_FILTER) {
            debug!(filter = %filter, "overriding extension_filter from environment");
            self.extension_filter = filter;
        }

        if let Some(raw) = lookup(ENV_RECURSIVE) {
            self.recursive = parse_bool(&raw)
                .with_context(|| format!("invalid value for {}", ENV_RECURSIVE))?;
            debug!(recursive = self.recursive, "overriding recursive from environment");
        }

        if let Some(output_dir) = lookup(ENV_OUTPUT_DIR) {
            debug!(output_dir = %output_dir, "overriding output_dir from environment");
            self.output_dir = Some(output_dir);
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.extension_filter.contains('/') || self.extension_filter.contains('\\') {
            anyhow::bail!(
                "extension_filter cannot contain a path separator: {:?}",
                self.extension_filter
            );
        }

        if let Some(dir) = &self.output_dir {
            if dir.trim().is_empty() {
                anyhow::bail!("output_dir cannot be empty");
            }
        }

        if self.extension_filter.ends_with("enc") {
            warn!(
                filter = %self.extension_filter,
                "extension filter selects already encrypted files - they would be encrypted twice"
            );
        }

        Ok(())
    }

    /// Create a new config with explicit values
    pub fn new(extension_filter: impl Into<String>, recursive: bool) -> Self {
        Self {
            extension_filter: extension_filter.into(),
            recursive,
            output_dir: None,
        }
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<String>) -> Self {
        self.output_dir = Some(output_dir.into());
        self
    }
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("expected a boolean, got {:?}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.extension_filter, "");
        assert!(cfg.recursive);
        assert!(cfg.output_dir.is_none());
        cfg.validate().expect("defaults are valid");
    }

    #[test]
    fn test_load_from_file_with_partial_fields() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("config.json");
        fs::write(&path, r#"{ "extension_filter": "txt", "recursive": false }"#).unwrap();

        let cfg = Config::load(path.to_str().unwrap()).expect("config loads");
        assert_eq!(cfg.extension_filter, "txt");
        assert!(!cfg.recursive);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("config.json");
        let cfg = Config::new("md", true).with_output_dir("/srv/encrypted");
        fs::write(&path, serde_json::to_string_pretty(&cfg).unwrap()).unwrap();

        let loaded = Config::load(path.to_str().unwrap()).expect("config loads");
        assert_eq!(loaded.output_dir.as_deref(), Some("/srv/encrypted"));
        assert_eq!(loaded.extension_filter, "md");
    }

    #[test]
    fn test_load_missing_file_fails() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("absent.json");
        assert!(Config::load(path.to_str().unwrap()).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(Config::new("sub/txt", true).validate().is_err());
        assert!(Config::new("txt", true).with_output_dir("   ").validate().is_err());
        // warns but passes
        assert!(Config::new(".enc", true).validate().is_ok());
    }

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_env_overrides_file_values() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("config.json");
        fs::write(
            &path,
            r#"{ "extension_filter": "txt", "recursive": true, "output_dir": "/from/file" }"#,
        )
        .unwrap();

        let cfg = Config::load_with_lookup(
            Some(path.to_str().unwrap()),
            vars(&[
                (ENV_EXTENSION_FILTER, "md"),
                (ENV_RECURSIVE, "no"),
                (ENV_OUTPUT_DIR, "/from/env"),
            ]),
        )
        .expect("config loads");
        assert_eq!(cfg.extension_filter, "md");
        assert!(!cfg.recursive);
        assert_eq!(cfg.output_dir.as_deref(), Some("/from/env"));

        // untouched fields keep the file values
        let cfg = Config::load_with_lookup(Some(path.to_str().unwrap()), vars(&[(ENV_RECURSIVE, "0")]))
            .expect("config loads");
        assert_eq!(cfg.extension_filter, "txt");
        assert_eq!(cfg.output_dir.as_deref(), Some("/from/file"));
    }

    #[test]
    fn test_config_path_from_environment() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("env-config.json");
        fs::write(&path, r#"{ "output_dir": "/srv/out" }"#).unwrap();

        let cfg = Config::load_with_lookup(None, vars(&[(ENV_CONFIG_PATH, path.to_str().unwrap())]))
            .expect("config loads");
        assert_eq!(cfg.output_dir.as_deref(), Some("/srv/out"));
        assert!(cfg.recursive);
    }

    #[test]
    fn test_explicit_missing_config_fails() {
        let tmp = TempDir::new().expect("tempdir");
        let missing = tmp.path().join("typo.json");

        let err = Config::load_with_lookup(Some(missing.to_str().unwrap()), vars(&[]))
            .expect_err("named config file must exist");
        assert!(format!("{:#}", err).contains("typo.json"));

        let err = Config::load_with_lookup(None, vars(&[(ENV_CONFIG_PATH, missing.to_str().unwrap())]))
            .expect_err("config file named by environment must exist");
        assert!(format!("{:#}", err).contains("reading config file"));
    }

    #[test]
    fn test_invalid_recursive_value_rejected() {
        let err = Config::load_with_lookup(None, vars(&[(ENV_RECURSIVE, "sometimes")]))
            .expect_err("bad boolean must fail");
        assert!(format!("{:#}", err).contains(ENV_RECURSIVE));
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("TRUE").unwrap());
        assert!(parse_bool(" yes ").unwrap());
        assert!(!parse_bool("0").unwrap());
        assert!(parse_bool("maybe").is_err());
    }
}
