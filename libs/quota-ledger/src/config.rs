use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::ledger::DEFAULT_DAILY_LIMIT;

#[derive(Debug, Clone)]
pub struct LedgerConfig {
    pub data_dir: PathBuf,
    pub daily_limit: u32,
    pub usage_store_url: Option<String>,
    pub request_timeout_secs: u64,
    pub log_level: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data/qx"),
            daily_limit: DEFAULT_DAILY_LIMIT,
            usage_store_url: None,
            request_timeout_secs: 5,
            log_level: "warn".to_string(),
        }
    }
}

impl LedgerConfig {
    pub fn from_env() -> Result<Self> {
        let mut cfg = Self::default();

        if let Ok(dir) = env::var("QX_DATA_DIR") {
            cfg.data_dir = PathBuf::from(dir);
        }
        if let Ok(limit) = env::var("QX_DAILY_LIMIT") {
            cfg.daily_limit = limit
                .parse()
                .context("QX_DAILY_LIMIT must be a positive integer")?;
        }
        if let Ok(url) = env::var("QX_USAGE_STORE_URL") {
            let url = url.trim();
            cfg.usage_store_url = (!url.is_empty()).then(|| url.to_string());
        }
        if let Ok(timeout) = env::var("QX_REQUEST_TIMEOUT_SECS") {
            cfg.request_timeout_secs = timeout
                .parse()
                .context("QX_REQUEST_TIMEOUT_SECS must be a positive integer")?;
        }
        if let Ok(level) = env::var("LOG_LEVEL") {
            cfg.log_level = level;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.daily_limit == 0 {
            anyhow::bail!("QX_DAILY_LIMIT must be greater than zero");
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("QX_REQUEST_TIMEOUT_SECS must be greater than zero");
        }
        if let Some(url) = &self.usage_store_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                anyhow::bail!("QX_USAGE_STORE_URL must be an http(s) URL, got {url}");
            }
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
