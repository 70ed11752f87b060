//! Runtime configuration with optional TOML file support.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Result, WcaError};
use crate::pipeline::PipelineOptions;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Worker-pool size shared across fetch and classification tasks.
    pub concurrency: usize,
    pub dhash_threshold: u32,
    pub phash_threshold: u32,
    /// Candidates tried per cluster before giving up on a representative.
    pub max_candidates: usize,
    pub fetch_timeout_secs: u64,
    pub vision: VisionSettings,
}

/// Vision classifier settings from the config file; unset fields fall back
/// to environment variables, then to built-in defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VisionSettings {
    pub api_endpoint: Option<String>,
    pub api_key: Option<String>,
    pub model: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            concurrency: 5,
            dhash_threshold: 1,
            phash_threshold: 8,
            max_candidates: 3,
            fetch_timeout_secs: 30,
            vision: VisionSettings::default(),
        }
    }
}

impl Config {
    /// Load from a TOML file, or return defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Config> {
        match path {
            Some(path) => {
                let data = std::fs::read_to_string(path).map_err(|e| {
                    WcaError::Config(format!("failed to read config {}: {e}", path.display()))
                })?;
                toml::from_str(&data).map_err(|e| {
                    WcaError::Config(format!("invalid config {}: {e}", path.display()))
                })
            }
            None => Ok(Config::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(WcaError::Config(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if self.max_candidates == 0 {
            return Err(WcaError::Config(
                "max_candidates must be at least 1".to_string(),
            ));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(WcaError::Config(
                "fetch_timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            concurrency: self.concurrency,
            dhash_threshold: self.dhash_threshold,
            phash_threshold: self.phash_threshold,
            max_candidates: self.max_candidates,
        }
    }
}
