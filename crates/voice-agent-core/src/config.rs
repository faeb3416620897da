use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};
use tracing::warn;

use crate::agent::DEFAULT_ENDPOINT;

/// Environment variable that overrides the configured endpoint
pub const ENDPOINT_ENV: &str = "VOICE_AGENT_ENDPOINT";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub endpoint: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self { endpoint: None }
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(config_path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    /// Like [`Config::load`], but an unreadable or corrupt file falls back to
    /// defaults with a warning instead of failing
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|err| {
            warn!(error = %err, "ignoring unreadable config file, using defaults");
            Self::new()
        })
    }

    pub fn load_or_default_from(config_path: &Path) -> Self {
        Self::load_from(config_path).unwrap_or_else(|err| {
            warn!(
                path = %config_path.display(),
                error = %err,
                "ignoring unreadable config file, using defaults"
            );
            Self::new()
        })
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(config_path, config_content)?;
        Ok(())
    }

    pub fn save_endpoint(endpoint: &str) -> Result<PathBuf> {
        let mut config = Self::load_or_default();
        config.endpoint = Some(endpoint.to_string());
        config.save()?;
        Self::get_config_path()
    }

    /// Pick the endpoint to use: explicit flag, then environment, then this
    /// config, then the built-in default.
    pub fn resolve_endpoint(&self, flag: Option<&str>, env: Option<&str>) -> String {
        // A blank source counts as unset, so the next one down still applies
        let nonblank = |endpoint: &&str| !endpoint.trim().is_empty();

        flag.filter(nonblank)
            .or_else(|| env.filter(nonblank))
            .or_else(|| self.endpoint.as_deref().filter(nonblank))
            .unwrap_or(DEFAULT_ENDPOINT)
            .to_string()
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("voice-agent").join("config.json"))
    }
}
