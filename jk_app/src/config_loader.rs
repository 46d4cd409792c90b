use std::path::Path;
use std::time::Duration;

use config::Config;
use config::ConfigError;
use config::File;
use jk_http::RetryConfig;
use jk_http::jikan::JIKAN_BASE_URL;
use serde::Deserialize;

/// Application settings read from a TOML file
///
/// Every field is optional in the file; missing keys take the library
/// defaults. Durations are given in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub min_interval_ms: u64,
    pub attempt_timeout_ms: u64,
    pub max_attempts: u32,
    pub backoff_step_ms: u64,
    pub rate_limit_padding_ms: u64,
    pub max_rate_limit_waits: Option<u32>,
    pub acquire_per_attempt: bool,
    pub log_dir: String,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        let retry = RetryConfig::default();
        Self {
            base_url: JIKAN_BASE_URL.to_string(),
            min_interval_ms: retry.min_interval.as_millis() as u64,
            attempt_timeout_ms: retry.attempt_timeout.as_millis() as u64,
            max_attempts: retry.max_attempts,
            backoff_step_ms: retry.backoff_step.as_millis() as u64,
            rate_limit_padding_ms: retry.rate_limit_padding.as_millis() as u64,
            max_rate_limit_waits: retry.max_rate_limit_waits,
            acquire_per_attempt: retry.acquire_per_attempt,
            log_dir: "./logs".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }

    /// Retry settings for the client; an attempt budget of 0 is raised to 1
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            min_interval: self.min_interval(),
            attempt_timeout: Duration::from_millis(self.attempt_timeout_ms),
            max_attempts: self.max_attempts.max(1),
            backoff_step: Duration::from_millis(self.backoff_step_ms),
            rate_limit_padding: Duration::from_millis(self.rate_limit_padding_ms),
            max_rate_limit_waits: self.max_rate_limit_waits,
            acquire_per_attempt: self.acquire_per_attempt,
        }
    }
}

pub fn load_app_config<P: AsRef<Path>>(path: P) -> Result<AppConfig, ConfigError> {
    let config = Config::builder().add_source(File::from(path.as_ref())).build()?;

    config.try_deserialize()
}
