//! # Client Configuration
//!
//! Where the backend lives and how the counter behaves.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     KHATHA_API_URL=https://api.example.in/api                          │
//! │     KHATHA_QUICK_MODE=true                                             │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/khatha-wallet/config.toml (Linux)                        │
//! │     ~/Library/Application Support/com.khatha.wallet/config.toml (macOS)│
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     http://localhost:8084/api, 10 s timeout, 5% GST, no retry          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # config.toml
//! [api]
//! base_url = "http://localhost:8084/api"
//! timeout_secs = 10
//!
//! [billing]
//! gst_percent = 5
//! quick_mode = false
//!
//! [retry]
//! max_retries = 0        # GETs only; 0 disables retry
//! initial_backoff_ms = 500
//! max_backoff_secs = 10
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use khatha_core::validation::validate_gst_percent;
use khatha_core::GstRate;

use crate::error::{ClientError, ClientResult};

// =============================================================================
// API Settings
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Backend root, including the `/api` prefix.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout (seconds).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8084/api".to_string()
}

fn default_timeout() -> u64 {
    10
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

// =============================================================================
// Billing Settings
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingSettings {
    #[serde(default = "default_gst_percent")]
    pub gst_percent: u32,

    /// Quick-invoice counter: every bill needs a customer.
    #[serde(default)]
    pub quick_mode: bool,
}

fn default_gst_percent() -> u32 {
    khatha_core::DEFAULT_GST_PERCENT
}

impl Default for BillingSettings {
    fn default() -> Self {
        BillingSettings {
            gst_percent: default_gst_percent(),
            quick_mode: false,
        }
    }
}

// =============================================================================
// Retry Settings
// =============================================================================

/// Retry policy for idempotent GETs. Mutations are never retried.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    #[serde(default)]
    pub max_retries: u32,

    #[serde(default = "default_initial_backoff")]
    pub initial_backoff_ms: u64,

    #[serde(default = "default_max_backoff")]
    pub max_backoff_secs: u64,
}

fn default_initial_backoff() -> u64 {
    500
}
fn default_max_backoff() -> u64 {
    10
}

impl Default for RetrySettings {
    fn default() -> Self {
        RetrySettings {
            max_retries: 0,
            initial_backoff_ms: default_initial_backoff(),
            max_backoff_secs: default_max_backoff(),
        }
    }
}

impl RetrySettings {
    pub fn is_enabled(&self) -> bool {
        self.max_retries > 0
    }
}

// =============================================================================
// Storage Settings
// =============================================================================

/// Where the terminal keeps state between invocations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Session file. Defaults to `<data dir>/session.json`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_file: Option<PathBuf>,

    /// Cart draft file. Defaults to `<data dir>/cart.json`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cart_file: Option<PathBuf>,
}

// =============================================================================
// Main Client Configuration
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub billing: BillingSettings,

    #[serde(default)]
    pub retry: RetrySettings,

    #[serde(default)]
    pub storage: StorageSettings,
}

impl ClientConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (config.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ClientResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading client config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load client config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ClientResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ClientError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ClientError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| ClientError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Client config saved");
        Ok(())
    }

    pub fn validate(&self) -> ClientResult<()> {
        let url = url::Url::parse(&self.api.base_url)?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ClientError::InvalidUrl(format!(
                "Backend URL must start with http:// or https://, got: {}",
                self.api.base_url
            )));
        }

        if self.api.timeout_secs == 0 {
            return Err(ClientError::InvalidConfig(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        validate_gst_percent(self.billing.gst_percent)
            .map_err(|e| ClientError::InvalidConfig(e.to_string()))?;

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("KHATHA_API_URL") {
            debug!(url = %url, "Overriding backend URL from environment");
            self.api.base_url = url;
        }

        if let Ok(secs) = std::env::var("KHATHA_TIMEOUT_SECS") {
            if let Ok(s) = secs.parse::<u64>() {
                self.api.timeout_secs = s;
            }
        }

        if let Ok(pct) = std::env::var("KHATHA_GST_PERCENT") {
            if let Ok(p) = pct.parse::<u32>() {
                debug!(gst_percent = p, "Overriding GST from environment");
                self.billing.gst_percent = p;
            }
        }

        if let Ok(quick) = std::env::var("KHATHA_QUICK_MODE") {
            match quick.to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.billing.quick_mode = true,
                "0" | "false" | "no" | "off" => self.billing.quick_mode = false,
                _ => warn!(value = %quick, "Unknown KHATHA_QUICK_MODE value in environment"),
            }
        }

        if let Ok(retries) = std::env::var("KHATHA_MAX_RETRIES") {
            if let Ok(r) = retries.parse::<u32>() {
                self.retry.max_retries = r;
            }
        }

        if let Ok(path) = std::env::var("KHATHA_SESSION_FILE") {
            self.storage.session_file = Some(PathBuf::from(path));
        }
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "khatha", "wallet")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    fn data_dir() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "khatha", "wallet")
            .map(|dirs| dirs.data_dir().to_path_buf())
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    pub fn gst_rate(&self) -> GstRate {
        GstRate::from_percent(self.billing.gst_percent)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    pub fn session_path(&self) -> Option<PathBuf> {
        self.storage
            .session_file
            .clone()
            .or_else(|| Self::data_dir().map(|d| d.join("session.json")))
    }

    pub fn cart_path(&self) -> Option<PathBuf> {
        self.storage
            .cart_file
            .clone()
            .or_else(|| Self::data_dir().map(|d| d.join("cart.json")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.api.base_url, "http://localhost:8084/api");
        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(config.billing.gst_percent, 5);
        assert!(!config.billing.quick_mode);
        assert!(!config.retry.is_enabled());
        assert_eq!(config.gst_rate(), GstRate::from_percent(5));
    }

    #[test]
    fn test_config_validation() {
        let mut config = ClientConfig::default();
        assert!(config.validate().is_ok());

        config.api.base_url = "ws://localhost:8084".to_string();
        assert!(config.validate().unwrap_err().is_config_error());

        config.api.base_url = "not a url".to_string();
        assert!(config.validate().is_err());

        config.api.base_url = "https://khatha.example/api".to_string();
        config.api.timeout_secs = 0;
        assert!(config.validate().is_err());

        config.api.timeout_secs = 5;
        config.billing.gst_percent = 101;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: ClientConfig = toml::from_str(
            r#"
            [billing]
            quick_mode = true
            "#,
        )
        .unwrap();
        assert!(config.billing.quick_mode);
        assert_eq!(config.billing.gst_percent, 5);
        assert_eq!(config.api.timeout_secs, 10);
    }

    #[test]
    fn test_toml_serialization() {
        let config = ClientConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[api]"));
        assert!(toml_str.contains("[billing]"));
        assert!(toml_str.contains("[retry]"));
    }

    #[test]
    fn test_save_then_load() {
        let dir = std::env::temp_dir().join(format!("khatha-config-{}", std::process::id()));
        let path = dir.join("config.toml");

        let mut config = ClientConfig::default();
        config.billing.quick_mode = true;
        config.save(Some(path.clone())).unwrap();

        let loaded = ClientConfig::load(Some(path)).unwrap();
        assert!(loaded.billing.quick_mode);

        std::fs::remove_dir_all(dir).ok();
    }
}
