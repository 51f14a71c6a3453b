//! # Configuration State
//!
//! The loaded [`ClientConfig`] plus the file it came from, so that
//! `khatha config set ...` writes back to the same place.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`KHATHA_*`)
//! 2. Config file (`--config`, else the platform config dir)
//! 3. Defaults

use std::path::PathBuf;

use serde::Serialize;

use khatha_client::ClientConfig;

use crate::error::CommandResult;

#[derive(Debug, Clone)]
pub struct ConfigState {
    pub config: ClientConfig,
    path: Option<PathBuf>,
}

/// Which setting `config set` changes.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigChange {
    ApiUrl(String),
    TimeoutSecs(u64),
    GstPercent(u32),
    QuickMode(bool),
    MaxRetries(u32),
}

/// What `config show` prints.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigView {
    pub api_url: String,
    pub timeout_secs: u64,
    pub gst_percent: u32,
    pub quick_mode: bool,
    pub max_retries: u32,
    pub session_file: Option<PathBuf>,
    pub cart_file: Option<PathBuf>,
}

impl ConfigState {
    pub fn load(path: Option<PathBuf>) -> CommandResult<Self> {
        let config = ClientConfig::load(path.clone())?;
        Ok(ConfigState { config, path })
    }

    pub fn from_config(config: ClientConfig) -> Self {
        ConfigState { config, path: None }
    }

    /// Applies one change, validates, and saves.
    pub fn apply(&mut self, change: ConfigChange) -> CommandResult<()> {
        let mut updated = self.config.clone();
        match change {
            ConfigChange::ApiUrl(url) => updated.api.base_url = url.trim().trim_end_matches('/').to_string(),
            ConfigChange::TimeoutSecs(secs) => updated.api.timeout_secs = secs,
            ConfigChange::GstPercent(pct) => updated.billing.gst_percent = pct,
            ConfigChange::QuickMode(on) => updated.billing.quick_mode = on,
            ConfigChange::MaxRetries(n) => updated.retry.max_retries = n,
        }
        updated.validate()?;
        updated.save(self.path.clone())?;
        self.config = updated;
        Ok(())
    }

    pub fn view(&self) -> ConfigView {
        ConfigView {
            api_url: self.config.api.base_url.clone(),
            timeout_secs: self.config.api.timeout_secs,
            gst_percent: self.config.billing.gst_percent,
            quick_mode: self.config.billing.quick_mode,
            max_retries: self.config.retry.max_retries,
            session_file: self.config.session_path(),
            cart_file: self.config.cart_path(),
        }
    }
}
