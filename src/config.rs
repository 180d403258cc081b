//! # Config Module
//!
//! YAML run configuration. Without an explicit path the embedded default is
//! used; the SHA-256 of whichever text was loaded is kept as `config_hash`
//! so outputs can be tied back to the exact settings.

use std::fs;
use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::constants::{DEFAULT_OPEN_TIMEOUT_MS, DEFAULT_QUERY_TIMEOUT_MS, DEFAULT_USER_PROFILE};
use crate::scanner::ScanOptions;

const DEFAULT_CONFIG_YAML: &str = include_str!("../config/default.yml");

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid value: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub run_id: String,
    pub user_profile: String,
    pub workers: usize,
    pub open_timeout_ms: u64,
    /// `0` leaves statements unbounded
    pub query_timeout_ms: u64,
    pub follow_symlinks: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            run_id: String::new(),
            user_profile: DEFAULT_USER_PROFILE.to_string(),
            workers: 0,
            open_timeout_ms: DEFAULT_OPEN_TIMEOUT_MS,
            query_timeout_ms: DEFAULT_QUERY_TIMEOUT_MS,
            follow_symlinks: true,
        }
    }
}

impl Config {
    /// Worker count with `0` resolved to the CPU count.
    pub fn effective_workers(&self) -> usize {
        if self.workers == 0 {
            num_cpus::get().max(1)
        } else {
            self.workers
        }
    }

    pub fn open_timeout(&self) -> Duration {
        Duration::from_millis(self.open_timeout_ms)
    }

    pub fn query_timeout(&self) -> Option<Duration> {
        (self.query_timeout_ms > 0).then(|| Duration::from_millis(self.query_timeout_ms))
    }

    /// Checks that must hold after every override, file or command line.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.user_profile.trim().is_empty() {
            return Err(ConfigError::Invalid("user_profile must not be empty".into()));
        }
        Ok(())
    }

    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            follow_symlinks: self.follow_symlinks,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub config_hash: String,
}

pub fn load_config(path: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    let text = match path {
        Some(path) => fs::read_to_string(path)?,
        None => DEFAULT_CONFIG_YAML.to_string(),
    };
    parse_config(&text)
}

pub fn parse_config(text: &str) -> Result<LoadedConfig, ConfigError> {
    let mut config: Config = serde_yaml::from_str(text)?;
    config.validate()?;
    if config.run_id.trim().is_empty() {
        config.run_id = generate_run_id();
    }
    let config_hash = hex::encode(Sha256::digest(text.as_bytes()));
    Ok(LoadedConfig {
        config,
        config_hash,
    })
}

fn generate_run_id() -> String {
    Utc::now().format("%Y%m%dT%H%M%S%.3fZ").to_string()
}
