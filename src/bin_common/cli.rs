//! CLI utilities for binaries
//!
//! Resolves the configuration path from the environment and loads it.

use kitchen::{ConfigError, KitchenConfig};
use std::path::PathBuf;

/// Which configuration file to load
#[derive(Debug, Clone)]
pub enum ConfigType {
    /// Kitchen display configuration (config/kitchen.yaml)
    Kitchen,
    /// Custom path
    Custom(String),
}

impl ConfigType {
    pub fn default_path(&self) -> &str {
        match self {
            ConfigType::Kitchen => "config/kitchen.yaml",
            ConfigType::Custom(path) => path,
        }
    }

    /// Environment variable that overrides the path
    pub fn env_var_name(&self) -> Option<&str> {
        match self {
            ConfigType::Kitchen => Some("KITCHEN_CONFIG_PATH"),
            ConfigType::Custom(_) => None,
        }
    }

    /// Resolve the path using `lookup` for environment variables
    pub fn resolve_with(&self, lookup: impl Fn(&str) -> Option<String>) -> PathBuf {
        self.env_var_name()
            .and_then(|name| lookup(name))
            .unwrap_or_else(|| self.default_path().to_string())
            .into()
    }
}

/// Configuration path from the environment, or the default for `config_type`
pub fn load_config_from_env(config_type: ConfigType) -> PathBuf {
    config_type.resolve_with(|name| std::env::var(name).ok())
}

/// Load the kitchen configuration; a missing file falls back to defaults
pub fn load_kitchen_config(config_type: ConfigType) -> Result<KitchenConfig, ConfigError> {
    KitchenConfig::load_or_default(load_config_from_env(config_type))
}
