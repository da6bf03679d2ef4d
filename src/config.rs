use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use dotenvy::dotenv;

use crate::services::polling::PollPolicy;

fn default_max_file_size() -> usize {
    // 10 MB in bytes
    10 * 1024 * 1024
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the analysis service, without trailing slash.
    pub api_base: String,
    pub bind_addr: SocketAddr,
    pub poll_max_attempts: u32,
    pub poll_interval_ms: u64,
    pub chart_size: f64,
    /// Advisory only: uploads above this size are logged, not rejected.
    pub max_file_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:8000".to_string(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            poll_max_attempts: 30,
            poll_interval_ms: 1000,
            chart_size: 200.0,
            max_file_size: default_max_file_size(),
        }
    }
}

impl Config {
    pub fn new() -> Result<Self> {
        // Load .env file first
        dotenv().ok();

        let defaults = Config::default();
        let config = Config {
            api_base: std::env::var("ANALYSIS_API_BASE")
                .map(|base| base.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base),
            bind_addr: env_or("DASHBOARD_ADDR", defaults.bind_addr)?,
            poll_max_attempts: env_or("POLL_MAX_ATTEMPTS", defaults.poll_max_attempts)?,
            poll_interval_ms: env_or("POLL_INTERVAL_MS", defaults.poll_interval_ms)?,
            chart_size: env_or("CHART_SIZE", defaults.chart_size)?,
            max_file_size: env_or("MAX_FILE_SIZE", defaults.max_file_size)?,
        };

        if config.poll_max_attempts == 0 {
            anyhow::bail!("POLL_MAX_ATTEMPTS must be at least 1");
        }
        if !(config.chart_size.is_finite() && config.chart_size > 0.0) {
            anyhow::bail!("CHART_SIZE must be a positive number");
        }

        Ok(config)
    }

    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            max_attempts: self.poll_max_attempts,
            interval: Duration::from_millis(self.poll_interval_ms),
        }
    }
}

pub fn load_config() -> Result<Config> {
    Config::new()
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Failed to parse {}={:?}", key, raw)),
        Err(_) => Ok(default),
    }
}
