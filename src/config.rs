use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::constants;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub semp: SempConfig,

    pub scheduler: SchedulerConfig,

    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    /// "text" or "json"
    pub log_format: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/rotarr.db".to_string(),
            log_level: "info".to_string(),
            log_format: "text".to_string(),
            worker_threads: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SempConfig {
    /// Upper bound on a single password-change call. The rotation lock is held
    /// for at most this long per call.
    pub request_timeout_seconds: u64,

    /// Replies larger than this are rejected without being parsed.
    pub max_response_bytes: usize,

    pub user_agent: String,
}

impl Default for SempConfig {
    fn default() -> Self {
        Self {
            request_timeout_seconds: constants::semp::DEFAULT_TIMEOUT_SECS,
            max_response_bytes: constants::semp::DEFAULT_MAX_RESPONSE_BYTES,
            user_agent: "Rotarr/1.0".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub enabled: bool,

    pub tick_interval_seconds: u64,

    pub cron_expression: Option<String>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tick_interval_seconds: 60,
            cron_expression: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub enabled: bool,

    pub port: u16,

    /// Key required in `X-Api-Key` (or `Authorization: Bearer`) for every API call.
    /// The API refuses to start while this is empty.
    pub api_key: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: 6790,
            api_key: String::new(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    /// Applies `ROTARR_DATABASE_PATH` and `ROTARR_API_KEY` from the
    /// environment, including values loaded from a `.env` file.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("ROTARR_DATABASE_PATH")
            && !path.is_empty()
        {
            self.general.database_path = path;
        }
        if let Ok(key) = std::env::var("ROTARR_API_KEY")
            && !key.is_empty()
        {
            self.server.api_key = key;
        }
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("rotarr").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".rotarr").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            Self::default().save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.general.database_path.is_empty() {
            anyhow::bail!("Database path cannot be empty");
        }

        if !matches!(self.general.log_format.as_str(), "text" | "json") {
            anyhow::bail!(
                "Unknown log format '{}', expected \"text\" or \"json\"",
                self.general.log_format
            );
        }

        if self.semp.request_timeout_seconds == 0 {
            anyhow::bail!("SEMP request timeout must be > 0");
        }

        if self.semp.max_response_bytes == 0 {
            anyhow::bail!("SEMP max response size must be > 0");
        }

        if self.scheduler.enabled
            && self.scheduler.tick_interval_seconds == 0
            && self.scheduler.cron_expression.is_none()
        {
            anyhow::bail!("Scheduler interval must be > 0 or cron expression must be set");
        }

        if self.server.enabled && self.server.api_key.trim().is_empty() {
            anyhow::bail!("server.api_key must be set when the API server is enabled");
        }

        Ok(())
    }
}
