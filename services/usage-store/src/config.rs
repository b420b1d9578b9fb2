use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct UsageStoreConfig {
    pub server_host: String,
    pub server_port: u16,
    pub data_dir: PathBuf,
    pub max_feedback_length: usize,
    pub request_timeout_secs: u64,
    pub log_level: String,
}

impl Default for UsageStoreConfig {
    fn default() -> Self {
        Self {
            server_host: "127.0.0.1".to_string(),
            server_port: 8184,
            data_dir: PathBuf::from("data/usage"),
            max_feedback_length: 2_000,
            request_timeout_secs: 30,
            log_level: "info".to_string(),
        }
    }
}

impl UsageStoreConfig {
    pub fn from_env() -> Result<Self> {
        let mut cfg = Self::default();

        if let Ok(host) = env::var("USAGE_STORE_HOST") {
            cfg.server_host = host;
        }
        if let Ok(port) = env::var("USAGE_STORE_PORT") {
            cfg.server_port = port
                .parse()
                .context("USAGE_STORE_PORT must be a valid u16")?;
        }
        if let Ok(dir) = env::var("USAGE_STORE_DATA_DIR") {
            cfg.data_dir = PathBuf::from(dir);
        }
        if let Ok(length) = env::var("MAX_FEEDBACK_LENGTH") {
            cfg.max_feedback_length = length
                .parse()
                .context("MAX_FEEDBACK_LENGTH must be a positive integer")?;
        }
        if let Ok(timeout) = env::var("REQUEST_TIMEOUT_SECS") {
            cfg.request_timeout_secs = timeout
                .parse()
                .context("REQUEST_TIMEOUT_SECS must be a positive integer")?;
        }
        if let Ok(level) = env::var("LOG_LEVEL") {
            cfg.log_level = level;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        ensure_directory(&self.data_dir)?;

        if self.max_feedback_length == 0 {
            anyhow::bail!("MAX_FEEDBACK_LENGTH must be greater than zero");
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("REQUEST_TIMEOUT_SECS must be greater than zero");
        }

        Ok(())
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn ensure_directory(path: &Path) -> Result<()> {
    if path.exists() {
        if !path.is_dir() {
            anyhow::bail!("{} exists but is not a directory", path.display());
        }
    } else {
        fs::create_dir_all(path)
            .with_context(|| format!("unable to create data directory {}", path.display()))?;
    }
    Ok(())
}
