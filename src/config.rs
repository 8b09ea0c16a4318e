use std::{fs, path::Path, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::utils;

const ENV_BACKEND: &str = "EVENT_SCOUT_BACKEND";
const ENV_ENDPOINT: &str = "EVENT_SCOUT_ENDPOINT";
const ENV_TIMEOUT_SECS: &str = "EVENT_SCOUT_TIMEOUT_SECS";
const ENV_LATENCY_MS: &str = "EVENT_SCOUT_LATENCY_MS";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_LATENCY_MS: u64 = 2000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
    #[error("invalid value for {key}: {value:?}")]
    InvalidEnv { key: &'static str, value: String },
    #[error("timeout_secs must be at least 1")]
    ZeroTimeout,
    #[error("the http backend needs an endpoint")]
    MissingEndpoint,
    #[error("invalid endpoint {0}")]
    InvalidEndpoint(String),
    #[error("failed to build http client: {0}")]
    Client(String),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Mock,
    Http,
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mock" => Ok(BackendKind::Mock),
            "http" => Ok(BackendKind::Http),
            other => Err(format!("unknown backend {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    pub backend: BackendKind,
    pub endpoint: Option<String>,
    pub timeout_secs: u64,
    pub latency_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Mock,
            endpoint: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            latency_ms: DEFAULT_LATENCY_MS,
        }
    }
}

impl AppConfig {
    /// Loads the config file from the user's config directory, then applies
    /// environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&utils::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = read_config(path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }

    fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_BACKEND) {
            self.backend = value.parse().map_err(|_| ConfigError::InvalidEnv {
                key: ENV_BACKEND,
                value,
            })?;
        }
        if let Some(value) = lookup(ENV_ENDPOINT) {
            let trimmed = value.trim();
            self.endpoint = (!trimmed.is_empty()).then(|| trimmed.to_string());
        }
        if let Some(value) = lookup(ENV_TIMEOUT_SECS) {
            self.timeout_secs = parse_number(ENV_TIMEOUT_SECS, value)?;
        }
        if let Some(value) = lookup(ENV_LATENCY_MS) {
            self.latency_ms = parse_number(ENV_LATENCY_MS, value)?;
        }
        Ok(())
    }
}

fn parse_number(key: &'static str, value: String) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|_| ConfigError::InvalidEnv { key, value })
}

fn read_config(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}
