//! Application configuration

use anyhow::Context;
use murmur_bridge::BridgeConfig;
use murmur_core::{ComposerConfig, Roster};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};

const CONFIG_ENV: &str = "MURMUR_CONFIG";
const USER_ENV: &str = "MURMUR_USER";
const DEFAULT_USER: &str = "me";

/// Settings for one shell session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub roster: Roster,
    pub composer: ComposerConfig,
    /// Backend to send through; dry run when absent
    pub bridge: Option<BridgeConfig>,
}

impl AppConfig {
    /// Load from `$MURMUR_CONFIG` if set, then apply `$MURMUR_USER`
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var_os(CONFIG_ENV);
        if path.is_none() {
            debug!("{} not set, using default configuration", CONFIG_ENV);
        }
        let mut config = Self::load_from(path.as_deref().map(Path::new))?;

        if let Ok(user) = std::env::var(USER_ENV) {
            config.roster.self_name = user;
        }
        if config.roster.self_name.trim().is_empty() {
            config.roster.self_name = DEFAULT_USER.to_string();
        }
        Ok(config)
    }

    /// Read `path` if it exists; defaults otherwise
    pub fn load_from(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) if path.exists() => Self::from_path(path),
            Some(path) => {
                warn!("Config file {} not found, using defaults", path.display());
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        info!("Loading configuration from {}", path.display());
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}
