use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config file: {0}")]
    FileError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Environment variable overriding `realtime.url`
pub const WS_URL_ENV: &str = "KITCHEN_WS_URL";

/// Environment variable overriding `auth_api.base_url`
pub const AUTH_API_URL_ENV: &str = "AUTH_API_URL";

/// Kitchen display configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KitchenConfig {
    #[serde(default)]
    pub realtime: RealtimeSettings,

    #[serde(default)]
    pub auth_api: AuthApiSettings,

    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Kitchen socket settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeSettings {
    #[serde(default = "default_ws_url")]
    pub url: String,
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: usize,
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
}

impl RealtimeSettings {
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }
}

impl Default for RealtimeSettings {
    fn default() -> Self {
        Self {
            url: default_ws_url(),
            max_reconnect_attempts: default_max_reconnect_attempts(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
        }
    }
}

/// Authentication API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthApiSettings {
    #[serde(default = "default_auth_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl AuthApiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for AuthApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_auth_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_ws_url() -> String {
    "ws://localhost:8080/kitchen".to_string()
}

fn default_max_reconnect_attempts() -> usize {
    5
}

fn default_reconnect_delay_ms() -> u64 {
    3000
}

fn default_auth_base_url() -> String {
    "http://localhost:3000/api".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for KitchenConfig {
    fn default() -> Self {
        Self {
            realtime: RealtimeSettings::default(),
            auth_api: AuthApiSettings::default(),
            log_level: default_log_level(),
        }
    }
}

impl KitchenConfig {
    /// Load configuration from a YAML file, apply env overrides and validate
    pub fn load(config_path: impl AsRef<Path>) -> Result<Self> {
        let yaml_content = std::fs::read_to_string(config_path)?;
        let mut config = Self::from_yaml(&yaml_content)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Like [`load`](Self::load), but a missing file yields the defaults
    pub fn load_or_default(config_path: impl AsRef<Path>) -> Result<Self> {
        let path = config_path.as_ref();
        if path.exists() {
            return Self::load(path);
        }

        warn!(path = %path.display(), "Config file not found, using defaults");
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse YAML without touching the environment
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Override URLs from `lookup` (the process environment in `load`)
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(WS_URL_ENV) {
            info!("Overriding kitchen socket URL from {}", WS_URL_ENV);
            self.realtime.url = url;
        }

        if let Some(url) = lookup(AUTH_API_URL_ENV) {
            info!("Overriding auth API URL from {}", AUTH_API_URL_ENV);
            self.auth_api.base_url = url;
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let ws_url = &self.realtime.url;
        if !(ws_url.starts_with("ws://") || ws_url.starts_with("wss://")) {
            return Err(ConfigError::ValidationError(format!(
                "realtime.url must start with ws:// or wss://, got '{}'",
                ws_url
            )));
        }

        let api_url = &self.auth_api.base_url;
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(ConfigError::ValidationError(format!(
                "auth_api.base_url must start with http:// or https://, got '{}'",
                api_url
            )));
        }

        if self.auth_api.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "auth_api.timeout_secs must be greater than 0".to_string(),
            ));
        }

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "log_level must be one of: {}",
                valid_levels.join(", ")
            )));
        }

        Ok(())
    }
}
