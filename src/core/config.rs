//! Client configuration from YAML and environment

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_BASE_URL: &str = "https://gate.dataloop.ai/api/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_POOL_SIZE: usize = 8;

/// Environment variable overriding the local state directory
pub const ENV_DATALOOP_PATH: &str = "DATALOOP_PATH";
pub const ENV_DATALOOP_TOKEN: &str = "DATALOOP_TOKEN";
pub const ENV_DATALOOP_URL: &str = "DATALOOP_URL";

/// Connection settings for the platform API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Gateway base URL, without a trailing slash
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token (JWT)
    #[serde(default)]
    pub token: Option<String>,

    /// Timeout for requests in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum concurrent requests for batch operations
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_pool_size() -> usize {
    DEFAULT_POOL_SIZE
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            pool_size: DEFAULT_POOL_SIZE,
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }

    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: ClientConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `config.yaml` from the data directory if present, then apply
    /// environment overrides.
    pub fn load() -> Result<Self> {
        let path = data_dir().join("config.yaml");
        let mut config = if path.exists() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply `DATALOOP_TOKEN` and `DATALOOP_URL` overrides from `lookup`
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup(ENV_DATALOOP_TOKEN).filter(|t| !t.is_empty()) {
            self.token = Some(token);
        }
        if let Some(url) = lookup(ENV_DATALOOP_URL).filter(|u| !u.is_empty()) {
            self.base_url = url;
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            anyhow::bail!("base_url must be an http(s) URL, got '{}'", self.base_url);
        }
        if self.pool_size == 0 {
            anyhow::bail!("pool_size must be at least 1");
        }
        if self.timeout_secs == 0 {
            anyhow::bail!("timeout_secs must be at least 1");
        }
        Ok(())
    }
}

/// Local state directory: `$DATALOOP_PATH` or `~/.dataloop`
pub fn data_dir() -> PathBuf {
    data_dir_from(std::env::var(ENV_DATALOOP_PATH).ok())
}

fn data_dir_from(override_path: Option<String>) -> PathBuf {
    match override_path.filter(|p| !p.is_empty()) {
        Some(path) => PathBuf::from(path),
        None => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".dataloop"),
    }
}
