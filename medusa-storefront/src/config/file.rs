//! TOML file configuration structures.
//!
//! These structs map directly to the `storefront.toml` file format.

use serde::{Deserialize, Serialize};

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    pub store: StoreSection,
    #[serde(default)]
    pub defaults: DefaultsSection,
}

/// Where the commerce server lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSection {
    /// Root URL of the server (e.g. "https://store.example.com").
    pub base_url: String,
    /// Publishable key; may be left empty and supplied through the
    /// environment instead.
    #[serde(default)]
    pub publishable_api_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

/// Values used when a command does not name them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultsSection {
    /// Region new carts and price listings are created in.
    #[serde(default)]
    pub region_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_config_parsing() {
        let toml_str = r#"
[store]
base_url = "https://store.example.com"
publishable_api_key = "pk_01"
timeout_secs = 10

[defaults]
region_id = "reg_01"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.store.base_url, "https://store.example.com");
        assert_eq!(config.store.publishable_api_key, "pk_01");
        assert_eq!(config.store.timeout_secs, 10);
        assert_eq!(config.defaults.region_id.as_deref(), Some("reg_01"));
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let toml_str = r#"
[store]
base_url = "http://localhost:9000"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.store.timeout_secs, 30);
        assert!(config.store.publishable_api_key.is_empty());
        assert!(config.defaults.region_id.is_none());
    }

    #[test]
    fn test_missing_store_section_is_an_error() {
        assert!(toml::from_str::<FileConfig>("[defaults]\nregion_id = \"reg_01\"\n").is_err());
    }
}
