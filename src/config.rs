use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::ConfigError;
use crate::state::MonitorTarget;

/// Default check interval (seconds).
pub const DEFAULT_INTERVAL_SECS: u64 = 60;
/// Accepted check interval range (seconds).
pub const MIN_INTERVAL_SECS: u64 = 30;
pub const MAX_INTERVAL_SECS: u64 = 600;
/// Default number of verification events retained in history.
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;
/// Default request timeout (seconds).
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Conventional browser identification, to avoid trivial bot-blocking.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/107.0.0.0 Safari/537.36";

/// Starting set of volatile text patterns stripped before fingerprinting.
///
/// Clock times and calendar dates change every tick independent of real
/// content. This set is heuristic and locale-specific; sites with other
/// volatile content (counters, tickers) need additional patterns in the
/// config file.
pub fn default_volatile_patterns() -> Vec<String> {
    vec![
        r"\b\d{2}:\d{2}:\d{2}\b".to_string(), // HH:MM:SS
        r"\b\d{2}/\d{2}/\d{4}\b".to_string(), // DD/MM/YYYY
        r"\b\d{4}-\d{2}-\d{2}\b".to_string(), // YYYY-MM-DD
    ]
}

/// Monitoring configuration, loadable from a JSON file and overridable
/// from the command line.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Webpage URL to monitor
    pub url: String,
    /// Check interval (seconds)
    pub interval_secs: u64,
    /// Number of verification events to retain
    pub history_capacity: usize,
    /// Request timeout (seconds)
    pub timeout_secs: u64,
    /// User-Agent header sent with every request
    pub user_agent: String,
    /// Regex patterns stripped from page text before fingerprinting
    pub volatile_patterns: Vec<String>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            interval_secs: DEFAULT_INTERVAL_SECS,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            volatile_patterns: default_volatile_patterns(),
        }
    }
}

impl MonitorConfig {
    /// Load settings from a JSON config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        Ok(config)
    }

    /// Check that the configuration describes a usable monitor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.target()?;
        if self.history_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(())
    }

    /// The monitored target described by this configuration.
    pub fn target(&self) -> Result<MonitorTarget, ConfigError> {
        MonitorTarget::new(&self.url, self.interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_reference_values() {
        let config = MonitorConfig::default();
        assert_eq!(config.interval_secs, 60);
        assert_eq!(config.history_capacity, 100);
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.volatile_patterns.len(), 3);
    }

    #[test]
    fn validate_rejects_empty_url() {
        let config = MonitorConfig::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_out_of_range_interval() {
        let config = MonitorConfig {
            url: "https://example.com".to_string(),
            interval_secs: 10,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::IntervalOutOfRange(10, _, _))
        ));

        let config = MonitorConfig {
            url: "https://example.com".to_string(),
            interval_secs: 601,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_accepts_range_bounds() {
        for secs in [MIN_INTERVAL_SECS, MAX_INTERVAL_SECS] {
            let config = MonitorConfig {
                url: "https://example.com".to_string(),
                interval_secs: secs,
                ..Default::default()
            };
            assert!(config.validate().is_ok());
        }
    }

    #[test]
    fn config_file_overrides_defaults() {
        let raw = r#"{
            "url": "https://example.com/menu",
            "interval_secs": 120,
            "volatile_patterns": ["\\bvisits: \\d+\\b"]
        }"#;
        let config: MonitorConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.url, "https://example.com/menu");
        assert_eq!(config.interval_secs, 120);
        assert_eq!(config.volatile_patterns, vec![r"\bvisits: \d+\b"]);
        // Unspecified fields keep their defaults
        assert_eq!(config.history_capacity, DEFAULT_HISTORY_CAPACITY);
    }
}
