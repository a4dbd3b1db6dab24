//! Configuration module for medusa-storefront.
//!
//! Reads the TOML file, applies CLI and environment overrides, and
//! validates the result into a [`StoreConfig`].

pub mod file;

use std::path::{Path, PathBuf};
use std::time::Duration;

use medusa_sdk::config::StoreConfig;
use thiserror::Error;
use url::Url;

use crate::config::file::FileConfig;

/// Longest per-request timeout the file may ask for.
const MAX_TIMEOUT_SECS: u64 = 300;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("invalid base_url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("validation error: {0}")]
    ValidationError(String),
}

/// Everything the commands need from the configuration.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub store: StoreConfig,
    pub default_region: Option<String>,
}

/// Configuration loader that handles the complete loading process.
#[derive(Debug)]
pub struct ConfigLoader {
    config_path: PathBuf,
    base_url_override: Option<Url>,
    api_key_override: Option<String>,
}

impl ConfigLoader {
    pub fn new(
        config_path: impl AsRef<Path>,
        base_url_override: Option<Url>,
        api_key_override: Option<String>,
    ) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            base_url_override,
            api_key_override,
        }
    }

    /// Read the TOML file, apply overrides, and validate.
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let config_content = std::fs::read_to_string(&self.config_path)?;
        let file_config: FileConfig = toml::from_str(&config_content)?;
        self.resolve(file_config)
    }

    /// Apply overrides to an already parsed file and validate.
    pub fn resolve(&self, file_config: FileConfig) -> Result<LoadedConfig, ConfigError> {
        let base_url = match &self.base_url_override {
            Some(url) => url.clone(),
            None => Url::parse(&file_config.store.base_url)?,
        };
        let api_key = self
            .api_key_override
            .clone()
            .filter(|key| !key.trim().is_empty())
            .unwrap_or(file_config.store.publishable_api_key);

        validate(&base_url, &api_key, file_config.store.timeout_secs)?;

        let store = StoreConfig::new(base_url, api_key.trim())
            .with_timeout(Duration::from_secs(file_config.store.timeout_secs));
        Ok(LoadedConfig {
            store,
            default_region: file_config
                .defaults
                .region_id
                .filter(|region| !region.trim().is_empty()),
        })
    }
}

fn validate(base_url: &Url, api_key: &str, timeout_secs: u64) -> Result<(), ConfigError> {
    if !matches!(base_url.scheme(), "http" | "https") {
        return Err(ConfigError::ValidationError(format!(
            "base_url must use http or https, got {}",
            base_url.scheme()
        )));
    }
    if api_key.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "publishable_api_key is empty; set it in the file or MEDUSA_PUBLISHABLE_API_KEY"
                .to_owned(),
        ));
    }
    if !(1..=MAX_TIMEOUT_SECS).contains(&timeout_secs) {
        return Err(ConfigError::ValidationError(format!(
            "timeout_secs must be between 1 and {MAX_TIMEOUT_SECS}, got {timeout_secs}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_config(toml_str: &str) -> FileConfig {
        toml::from_str(toml_str).unwrap()
    }

    const BASIC: &str = r#"
[store]
base_url = "https://store.example.com"
publishable_api_key = "pk_file"
timeout_secs = 15

[defaults]
region_id = "reg_01"
"#;

    #[test]
    fn test_resolve_basic() {
        let loader = ConfigLoader::new("storefront.toml", None, None);
        let loaded = loader.resolve(file_config(BASIC)).unwrap();
        assert_eq!(loaded.store.base_url.as_str(), "https://store.example.com/");
        assert_eq!(loaded.store.publishable_api_key, "pk_file");
        assert_eq!(loaded.store.timeout, Duration::from_secs(15));
        assert_eq!(loaded.default_region.as_deref(), Some("reg_01"));
    }

    #[test]
    fn test_overrides_win() {
        let loader = ConfigLoader::new(
            "storefront.toml",
            Some(Url::parse("http://localhost:9000").unwrap()),
            Some("pk_env".to_owned()),
        );
        let loaded = loader.resolve(file_config(BASIC)).unwrap();
        assert_eq!(loaded.store.base_url.as_str(), "http://localhost:9000/");
        assert_eq!(loaded.store.publishable_api_key, "pk_env");
    }

    #[test]
    fn test_blank_env_key_falls_back_to_file() {
        let loader = ConfigLoader::new("storefront.toml", None, Some("  ".to_owned()));
        let loaded = loader.resolve(file_config(BASIC)).unwrap();
        assert_eq!(loaded.store.publishable_api_key, "pk_file");
    }

    #[test]
    fn test_missing_key_is_rejected() {
        let loader = ConfigLoader::new("storefront.toml", None, None);
        let err = loader
            .resolve(file_config("[store]\nbase_url = \"https://store.example.com\"\n"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_non_http_scheme_is_rejected() {
        let loader = ConfigLoader::new("storefront.toml", None, None);
        let err = loader
            .resolve(file_config(
                "[store]\nbase_url = \"ftp://store.example.com\"\npublishable_api_key = \"pk\"\n",
            ))
            .unwrap_err();
        assert!(err.to_string().contains("http or https"));
    }

    #[test]
    fn test_timeout_bounds() {
        let loader = ConfigLoader::new("storefront.toml", None, None);
        for timeout in [0, 301] {
            let toml_str = format!(
                "[store]\nbase_url = \"https://s.example.com\"\npublishable_api_key = \"pk\"\ntimeout_secs = {timeout}\n"
            );
            assert!(loader.resolve(file_config(&toml_str)).is_err());
        }
    }

    #[test]
    fn test_unparseable_url() {
        let loader = ConfigLoader::new("storefront.toml", None, None);
        let err = loader
            .resolve(file_config(
                "[store]\nbase_url = \"not a url\"\npublishable_api_key = \"pk\"\n",
            ))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl(_)));
    }

    #[test]
    fn test_missing_file() {
        let loader = ConfigLoader::new("/nonexistent/storefront.toml", None, None);
        assert!(matches!(loader.load(), Err(ConfigError::IoError(_))));
    }
}
