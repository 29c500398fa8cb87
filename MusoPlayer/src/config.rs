//! Application configuration.
//!
//! Defaults are embedded in the binary; `MUSOPLAYER_CONFIG` points at an
//! override file, and `MUSOPLAYER_LOG` overrides the log filter without
//! touching the file.

use std::env;
use std::fs;

use anyhow::{Context, Result};
use serde::Deserialize;

const DEFAULT_CONFIG: &str = include_str!("musoplayer.yaml");

const ENV_CONFIG_PATH: &str = "MUSOPLAYER_CONFIG";
const ENV_LOG_FILTER: &str = "MUSOPLAYER_LOG";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub session: SessionConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Name the session registers under in the directory.
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// `tracing_subscriber` EnvFilter directive, e.g. `info` or
    /// `musosession=debug,info`.
    pub filter: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        let raw = match env::var(ENV_CONFIG_PATH) {
            Ok(path) => fs::read_to_string(&path)
                .with_context(|| format!("reading configuration file {path}"))?,
            Err(_) => DEFAULT_CONFIG.to_string(),
        };
        let mut config: Config =
            serde_yaml::from_str(&raw).context("parsing configuration")?;
        if let Ok(filter) = env::var(ENV_LOG_FILTER) {
            config.log.filter = filter;
        }
        Ok(config)
    }
}
