use std::path::PathBuf;
use std::time::Duration;

use eyre::Result;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::summarize::DEFAULT_MODEL;
use crate::transcript::RetryPolicy;

/// Longest backoff unit a config file may ask for
pub const MAX_RETRY_DELAY_SECS: f64 = 60.0;

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub model: Option<String>,
    pub max_retries: Option<u32>,
    pub retry_delay_secs: Option<f64>,
    pub cache_size: Option<usize>,
    pub output_dir: Option<PathBuf>,
}

impl Config {
    /// Load config from ~/.config/ytbrief/config.toml if it exists
    pub fn load() -> Result<Self> {
        let path = config_path();
        if path.exists() {
            debug!("Loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            debug!("No config file found at {}", path.display());
            Ok(Config::default())
        }
    }

    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        let defaults = RetryPolicy::default();
        RetryPolicy {
            max_retries: self.max_retries.unwrap_or(defaults.max_retries),
            backoff_unit: self
                .retry_delay_secs
                .map(|secs| {
                    if secs > MAX_RETRY_DELAY_SECS {
                        warn!("retry_delay_secs = {secs} exceeds {MAX_RETRY_DELAY_SECS}, capping");
                        MAX_RETRY_DELAY_SECS
                    } else {
                        secs
                    }
                })
                .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
                .unwrap_or(defaults.backoff_unit),
        }
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("ytbrief")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml_str = r#"
model = "gemini-1.5-pro"
max_retries = 3
retry_delay_secs = 0.5
cache_size = 10
output_dir = "/tmp/summaries"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.model(), "gemini-1.5-pro");
        assert_eq!(config.cache_size, Some(10));
        assert_eq!(config.output_dir, Some(PathBuf::from("/tmp/summaries")));

        let policy = config.retry_policy();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.backoff_unit, Duration::from_millis(500));
    }

    #[test]
    fn test_parse_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.model(), DEFAULT_MODEL);
        let policy = config.retry_policy();
        assert_eq!(policy.max_retries, 5);
        assert_eq!(policy.backoff_unit, Duration::from_secs(2));
    }

    #[test]
    fn test_negative_delay_uses_default() {
        let config: Config = toml::from_str("retry_delay_secs = -1.0").unwrap();
        assert_eq!(config.retry_policy().backoff_unit, Duration::from_secs(2));
    }

    #[test]
    fn test_huge_delay_is_capped() {
        let config: Config = toml::from_str("retry_delay_secs = 1e19").unwrap();
        let policy = config.retry_policy();
        assert_eq!(policy.backoff_unit, Duration::from_secs(60));
        assert_eq!(policy.delay(policy.max_retries), Duration::from_secs(300));
    }

    #[test]
    fn test_parse_partial_config() {
        let config: Config = toml::from_str(r#"max_retries = 1"#).unwrap();
        assert_eq!(config.retry_policy().max_retries, 1);
        assert!(config.model.is_none());
        assert!(config.output_dir.is_none());
    }
}
