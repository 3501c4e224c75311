//! Configuration Management
//!
//! Optional persistent defaults for osenv. Anything set here can be
//! overridden per run on the command line; anything missing falls back to
//! the built-in defaults.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::resource::PollPolicy;

/// User configuration, loaded from `<config dir>/osenv/config.json`.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Provisioning timeout for asynchronously created resources, seconds
    #[serde(default)]
    pub poll_timeout_secs: Option<u64>,
    /// Interval between status queries, seconds
    #[serde(default)]
    pub poll_interval_secs: Option<u64>,
}

impl Config {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("osenv").join("config.json"))
    }

    /// Load configuration from disk. Missing or unreadable config is not an
    /// error; the defaults apply.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    /// Effective poll policy (CLI > config > built-in default).
    pub fn poll_policy(&self, timeout_flag: Option<u64>, interval_flag: Option<u64>) -> PollPolicy {
        let defaults = PollPolicy::default();

        let timeout = timeout_flag
            .or(self.poll_timeout_secs)
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);
        let period = interval_flag
            .or(self.poll_interval_secs)
            .map(Duration::from_secs)
            .unwrap_or(defaults.period);

        PollPolicy::new(timeout, period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_defaults() {
        let policy = Config::default().poll_policy(None, None);
        assert_eq!(policy.timeout, Duration::from_secs(3600));
        assert_eq!(policy.period, Duration::from_secs(10));
    }

    #[test]
    fn cli_flags_override_config_values() {
        let config = Config {
            poll_timeout_secs: Some(600),
            poll_interval_secs: Some(5),
        };

        let policy = config.poll_policy(None, None);
        assert_eq!(policy.timeout, Duration::from_secs(600));
        assert_eq!(policy.period, Duration::from_secs(5));

        let policy = config.poll_policy(Some(120), Some(2));
        assert_eq!(policy.timeout, Duration::from_secs(120));
        assert_eq!(policy.period, Duration::from_secs(2));
    }
}
