//! Client configuration stored in ~/.bodo/config.json.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api/";

/// Environment override for `apiBaseUrl`.
pub const API_URL_ENV: &str = "BODO_API_URL";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Space the session works in; sent as `space_id` on every request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_id: Option<String>,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_page_size() -> u32 {
    10
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            page_size: default_page_size(),
            request_timeout_secs: default_request_timeout_secs(),
            space_id: None,
        }
    }
}

impl Config {
    /// Parsed base URL, normalized to end with `/` so relative endpoint
    /// paths join underneath it instead of replacing the last segment.
    pub fn base_url(&self) -> Result<url::Url, url::ParseError> {
        let mut raw = self.api_base_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        url::Url::parse(&raw)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

/// Canonical path to the config file.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
    Ok(home.join(".bodo").join("config.json"))
}

/// Load configuration from ~/.bodo/config.json, applying `BODO_API_URL`.
pub fn load_config() -> Result<Config, ConfigError> {
    let path = config_path()?;
    let mut config = load_config_from(&path)?;
    if let Ok(url) = std::env::var(API_URL_ENV) {
        if !url.trim().is_empty() {
            log::debug!("config: apiBaseUrl overridden by {}", API_URL_ENV);
            config.api_base_url = url;
        }
    }
    config
        .base_url()
        .map_err(|source| ConfigError::InvalidBaseUrl {
            url: config.api_base_url.clone(),
            source,
        })?;
    Ok(config)
}

/// Load configuration from an explicit path. A missing file yields defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        log::info!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        return Ok(Config::default());
    }

    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: Config = serde_json::from_str(&content)?;
    Ok(config)
}
