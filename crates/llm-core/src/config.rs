//! Configuration management for agent.toml

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::generate::RetryConfig;

/// Name of the backend configuration file
pub const CONFIG_FILE_NAME: &str = "agent.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub ollama: OllamaConfig,
    #[serde(default)]
    pub retry: RetryConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OllamaConfig {
    pub host: String,
    pub port: u16,
    /// Model used for generation
    #[serde(default = "default_model")]
    pub model: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_model() -> String {
    "llama3.2".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

impl Config {
    /// Load agent.toml from the current directory or its parents
    ///
    /// Falls back to [`Config::default_minimal`] when no file exists; a file
    /// that exists but does not parse is an error.
    pub fn load() -> Result<Self> {
        Self::load_from_dir(std::env::current_dir()?)
    }

    /// Same as [`Config::load`], searching upward from `start`
    pub fn load_from_dir(start: PathBuf) -> Result<Self> {
        match Self::find_config_path_from(start) {
            Some(path) => {
                debug!(path = %path.display(), "Loading backend config");
                Self::load_from(&path)
            }
            None => {
                debug!("{} not found, using defaults", CONFIG_FILE_NAME);
                Ok(Self::default_minimal())
            }
        }
    }

    /// Create a minimal default configuration for when agent.toml is missing
    pub fn default_minimal() -> Self {
        Self {
            ollama: OllamaConfig {
                host: "127.0.0.1".to_string(),
                port: 11434,
                model: default_model(),
                timeout_secs: default_timeout_secs(),
            },
            retry: RetryConfig::default(),
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read {}", path.as_ref().display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.as_ref().display()))
    }

    /// Find agent.toml by searching `current` and up to 10 parents
    fn find_config_path_from(mut current: PathBuf) -> Option<PathBuf> {
        for _ in 0..10 {
            let candidate = current.join(CONFIG_FILE_NAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                break;
            }
        }
        None
    }

    /// Get Ollama base URL
    pub fn ollama_url(&self) -> String {
        format!("http://{}:{}", self.ollama.host, self.ollama.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.ollama.timeout_secs)
    }
}
