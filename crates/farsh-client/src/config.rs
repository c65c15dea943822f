//! # Client Configuration
//!
//! Configuration management for the Farsh client.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     FARSH_API_URL=http://192.168.1.3:8000/api/                         │
//! │     FARSH_SHOP_NAME=...                                                │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     --config <path>, or                                                │
//! │     ~/.config/farsh/farsh.toml (Linux)                                 │
//! │     ~/Library/Application Support/com.farsh.shop/farsh.toml (macOS)    │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     http://localhost:8000/api/                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # farsh.toml
//! [api]
//! base_url = "http://192.168.1.3:8000/api/"
//!
//! [shop]
//! name = "فرش فروشی"
//! address = "Tabriz, Grand Bazaar"
//! phone = "041-0000000"
//!
//! [export]
//! currency_label = "Toman"
//! seller_signature_title = "Seller signature:"
//! buyer_signature_title = "Buyer signature:"
//!
//! [session]
//! path = "/var/lib/farsh/session.json"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{ClientError, ClientResult};

const CONFIG_FILE_NAME: &str = "farsh.toml";

// =============================================================================
// API Settings
// =============================================================================

/// Where the backend lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Base URL every endpoint path is joined onto.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    "http://localhost:8000/api/".to_string()
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            base_url: default_base_url(),
        }
    }
}

// =============================================================================
// Shop Settings
// =============================================================================

/// The header printed on every exported invoice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopSettings {
    #[serde(default = "default_shop_name")]
    pub name: String,

    #[serde(default)]
    pub address: String,

    #[serde(default)]
    pub phone: String,
}

fn default_shop_name() -> String {
    "Carpet Shop".to_string()
}

impl Default for ShopSettings {
    fn default() -> Self {
        ShopSettings {
            name: default_shop_name(),
            address: String::new(),
            phone: String::new(),
        }
    }
}

// =============================================================================
// Export Settings
// =============================================================================

/// Labels used by the document exporters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSettings {
    #[serde(default = "default_currency_label")]
    pub currency_label: String,

    #[serde(default = "default_seller_signature_title")]
    pub seller_signature_title: String,

    #[serde(default = "default_buyer_signature_title")]
    pub buyer_signature_title: String,
}

fn default_currency_label() -> String {
    "Toman".to_string()
}
fn default_seller_signature_title() -> String {
    "Seller signature:".to_string()
}
fn default_buyer_signature_title() -> String {
    "Buyer signature:".to_string()
}

impl Default for ExportSettings {
    fn default() -> Self {
        ExportSettings {
            currency_label: default_currency_label(),
            seller_signature_title: default_seller_signature_title(),
            buyer_signature_title: default_buyer_signature_title(),
        }
    }
}

// =============================================================================
// Session Settings
// =============================================================================

/// Where the logged-in session is persisted between runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Explicit session file. Defaults to `<data_dir>/session.json`.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

// =============================================================================
// Main Client Configuration
// =============================================================================

/// Complete client configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub shop: ShopSettings,

    #[serde(default)]
    pub export: ExportSettings,

    #[serde(default)]
    pub session: SessionSettings,
}

impl ClientConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (farsh.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ClientResult<Self> {
        let explicit = config_path.is_some();
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading client config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else if explicit {
                return Err(ClientError::ConfigLoadFailed(format!(
                    "config file not found: {}",
                    path.display()
                )));
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ClientResult<PathBuf> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ClientError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Client config saved");
        Ok(path)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ClientResult<()> {
        let url = &self.api.base_url;
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ClientError::InvalidUrl(format!(
                "API URL must start with http:// or https://, got: {}",
                url
            )));
        }
        Url::parse(url)?;

        if self.shop.name.trim().is_empty() {
            return Err(ClientError::InvalidConfig("shop.name must not be empty".into()));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Applies overrides from any key lookup; the environment in production.
    fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("FARSH_API_URL") {
            debug!(url = %url, "Overriding API URL from environment");
            self.api.base_url = url;
        }

        if let Some(path) = lookup("FARSH_SESSION_PATH") {
            if path.trim().is_empty() {
                warn!("Ignoring empty FARSH_SESSION_PATH");
            } else {
                self.session.path = Some(PathBuf::from(path));
            }
        }

        if let Some(name) = lookup("FARSH_SHOP_NAME") {
            self.shop.name = name;
        }

        if let Some(address) = lookup("FARSH_SHOP_ADDRESS") {
            self.shop.address = address;
        }

        if let Some(phone) = lookup("FARSH_SHOP_PHONE") {
            self.shop.phone = phone;
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// The base URL, always with a trailing slash so relative paths join
    /// beneath it instead of replacing its last segment.
    pub fn api_base_url(&self) -> ClientResult<Url> {
        let mut raw = self.api.base_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        Ok(Url::parse(&raw)?)
    }

    /// Session file location: configured path, else the platform data dir.
    pub fn session_path(&self) -> ClientResult<PathBuf> {
        if let Some(path) = &self.session.path {
            return Ok(path.clone());
        }
        project_dirs()
            .map(|dirs| dirs.data_dir().join("session.json"))
            .ok_or_else(|| {
                ClientError::SessionStorage("no home directory to store the session in".into())
            })
    }
}

pub(crate) fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "farsh", "shop")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.api.base_url, "http://localhost:8000/api/");
        assert_eq!(config.export.seller_signature_title, "Seller signature:");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = ClientConfig::default();

        config.api.base_url = "ftp://shop".to_string();
        assert!(matches!(config.validate(), Err(ClientError::InvalidUrl(_))));

        config.api.base_url = "http://".to_string();
        assert!(config.validate().is_err());

        config.api.base_url = "https://shop.example/api/".to_string();
        assert!(config.validate().is_ok());

        config.shop.name = "  ".to_string();
        assert!(config.validate().unwrap_err().is_config_error());
    }

    #[test]
    fn test_api_base_url_gets_trailing_slash() {
        let mut config = ClientConfig::default();
        config.api.base_url = "http://192.168.1.3:8000/api".to_string();

        let base = config.api_base_url().unwrap();
        assert_eq!(base.as_str(), "http://192.168.1.3:8000/api/");
        assert_eq!(
            base.join("invoices/").unwrap().as_str(),
            "http://192.168.1.3:8000/api/invoices/"
        );
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("FARSH_API_URL", "http://10.0.0.2:8000/api/"),
            ("FARSH_SHOP_NAME", "Farsh Tabriz"),
            ("FARSH_SESSION_PATH", "/tmp/farsh-session.json"),
        ]
        .into_iter()
        .collect();

        let mut config = ClientConfig::default();
        config.apply_overrides_from(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.api.base_url, "http://10.0.0.2:8000/api/");
        assert_eq!(config.shop.name, "Farsh Tabriz");
        assert_eq!(
            config.session_path().unwrap(),
            PathBuf::from("/tmp/farsh-session.json")
        );
        assert_eq!(config.shop.phone, "");
    }

    #[test]
    fn test_toml_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("farsh.toml");

        let mut config = ClientConfig::default();
        config.shop.address = "Grand Bazaar".to_string();
        config.export.currency_label = "تومان".to_string();
        config.save(Some(path.clone())).unwrap();

        let loaded: ClientConfig =
            toml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded.shop.address, "Grand Bazaar");
        assert_eq!(loaded.export.currency_label, "تومان");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: ClientConfig = toml::from_str("[shop]\nname = \"Kashan Rugs\"\n").unwrap();
        assert_eq!(config.shop.name, "Kashan Rugs");
        assert_eq!(config.api.base_url, "http://localhost:8000/api/");
        assert_eq!(config.export.buyer_signature_title, "Buyer signature:");
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = ClientConfig::load(Some(dir.path().join("absent.toml")));
        assert!(matches!(result, Err(ClientError::ConfigLoadFailed(_))));
    }
}
