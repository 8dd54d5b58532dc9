use chrono_tz::Tz;
use serde::Deserialize;
use std::path::Path;

use crate::error::{AppError, Result};

fn default_check_every_seconds() -> u64 {
    300
}

fn default_target_price() -> f64 {
    0.0
}

fn default_notify_on_new_low() -> bool {
    true
}

fn default_timezone() -> String {
    "America/Detroit".to_string()
}

fn default_user_agent() -> String {
    "TixWatch/1.0 (+personal use)".to_string()
}

/// Monitor configuration, loaded from a TOML file.
///
/// Only `event_url` is required; every other option has a default. A
/// `target_price` of 0 disables the target alert.
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    pub event_url: String,

    #[serde(default = "default_check_every_seconds")]
    pub check_every_seconds: u64,

    #[serde(default = "default_target_price")]
    pub target_price: f64,

    #[serde(default = "default_notify_on_new_low")]
    pub notify_on_new_low: bool,

    #[serde(default = "default_timezone")]
    pub timezone: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default)]
    pub run_once: bool,
}

impl MonitorConfig {
    /// Load configuration from a TOML file, applying the RUN_ONCE env override
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        let mut config = Self::from_toml(&content)?;

        // Single-pass mode for non-interactive runs, e.g. RUN_ONCE=1
        if run_once_env() {
            config.run_once = true;
        }

        Ok(config)
    }

    fn from_toml(content: &str) -> Result<Self> {
        let config: MonitorConfig = toml::from_str(content)
            .map_err(|e| AppError::Config(format!("Failed to parse config file: {}", e)))?;

        if config.event_url.trim().is_empty() {
            return Err(AppError::Config("event_url must not be empty".to_string()));
        }

        Ok(config)
    }

    /// Parse the configured timezone; an unknown zone is a startup error
    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse()
            .map_err(|_| AppError::Config(format!("Invalid timezone: {}", self.timezone)))
    }
}

fn run_once_env() -> bool {
    std::env::var("RUN_ONCE")
        .ok()
        .and_then(|v| v.trim().parse::<i64>().ok())
        .map(|n| n != 0)
        .unwrap_or(false)
}
