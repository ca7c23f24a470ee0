// src/environment.rs
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

pub const DEFAULT_LOCAL_API_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_PAYMENT_DELAY_MS: u64 = 2000;

/// The one process-wide client configuration. Built once at start-up and
/// handed to `ApiClient`; nothing else decides where the backend lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub api_base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_storage_path")]
    pub storage_path: PathBuf,
    #[serde(default = "default_payment_delay_ms")]
    pub payment_delay_ms: u64,
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    local: ClientConfig,
    production: ClientConfig,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_storage_path() -> PathBuf {
    PathBuf::from(".restojob/storage.json")
}

fn default_payment_delay_ms() -> u64 {
    DEFAULT_PAYMENT_DELAY_MS
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_LOCAL_API_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            storage_path: default_storage_path(),
            payment_delay_ms: DEFAULT_PAYMENT_DELAY_MS,
        }
    }
}

impl ClientConfig {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            ..Self::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn payment_delay(&self) -> Duration {
        Duration::from_millis(self.payment_delay_ms)
    }

    /// Load configuration based on environment
    pub fn load() -> Result<Self> {
        let environment = Self::get_environment();
        info!("Loading client configuration for environment: {}", environment);

        let config = Self::load_from_file(Path::new("config.yaml"), &environment)?;
        let config = Self::apply_overrides(config);
        info!("API base URL: {}", config.api_base_url);
        Ok(config)
    }

    fn get_environment() -> String {
        std::env::var("RESTOJOB_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .unwrap_or_else(|_| "local".to_string())
    }

    /// Read the section for `environment` from a `local`/`production` yaml file.
    /// A missing file yields the built-in local defaults; production has none.
    pub fn load_from_file(path: &Path, environment: &str) -> Result<Self> {
        if !path.exists() {
            if environment == "production" {
                anyhow::bail!(
                    "{} not found. The production API origin must be configured.",
                    path.display()
                );
            }
            info!("{} not found, using local defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content, environment)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    fn parse(content: &str, environment: &str) -> Result<Self> {
        let file: ConfigFile = serde_yaml::from_str(content)?;
        let config = match environment {
            "production" => file.production,
            _ => file.local,
        };
        if config.api_base_url.trim().is_empty() {
            anyhow::bail!("api_base_url must not be empty");
        }
        Ok(config)
    }

    fn apply_overrides(mut config: Self) -> Self {
        if let Ok(url) = std::env::var("RESTOJOB_API_URL") {
            if !url.trim().is_empty() {
                config.api_base_url = url;
            }
        }
        if let Ok(path) = std::env::var("RESTOJOB_STORAGE") {
            config.storage_path = PathBuf::from(path);
        }
        config
    }
}
