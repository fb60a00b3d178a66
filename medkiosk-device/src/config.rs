//! Device configuration.
//!
//! Configuration is loaded in the following order (later overrides earlier):
//! 1. Default values
//! 2. YAML config file (if specified via KIOSK_CONFIG or --config)
//! 3. Environment variables

use crate::feedback::FeedbackProfile;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Service root of the reference deployment.
pub const DEFAULT_SERVICE_URL: &str = "https://oracleapex.com/ords/c85/pihealth/";

/// Longest accepted screen or request timeout, in seconds.
pub const MAX_TIMEOUT_SECS: u64 = 24 * 60 * 60;

/// Longest accepted tick interval or debounce window, in milliseconds.
pub const MAX_INTERVAL_MS: u64 = 1_000;

/// Device configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remote data service.
    pub service: ServiceConfig,
    /// Loop and workflow timing.
    pub timing: TimingConfig,
    /// Tones, colours and durations.
    pub feedback: FeedbackProfile,
}

impl Config {
    /// Loads configuration from `path` if given, then applies environment
    /// variable overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => {
                let mut config = Self::from_file(path)?;
                config.apply_env_overrides();
                config
            }
            None => Self::from_env(),
        };

        config.validate()?;

        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(path.to_path_buf(), e))?;
        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))?;
        Ok(config)
    }

    /// Loads configuration from environment variables only.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    fn apply_env_overrides(&mut self) {
        self.service.apply_env_overrides();
        self.timing.apply_env_overrides();
    }

    /// Saves configuration to a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = serde_yaml::to_string(self)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))?;
        std::fs::write(path, content).map_err(|e| ConfigError::IoError(path.to_path_buf(), e))?;
        Ok(())
    }

    /// Rejects settings the device cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.service.validate()?;
        self.timing.validate()?;

        if self.feedback.pixel_count == 0 {
            return Err(ConfigError::ValidationError(
                "feedback.pixel_count must be at least 1".to_string(),
            ));
        }
        if self.feedback.denial_beeps == 0 {
            return Err(ConfigError::ValidationError(
                "feedback.denial_beeps must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

/// Remote data service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Service root; endpoint paths are appended to it.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SERVICE_URL.to_string(),
            request_timeout_secs: 10,
            user_agent: concat!("medkiosk/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ServiceConfig {
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("KIOSK_SERVICE_URL") {
            if !url.is_empty() {
                self.base_url = url;
            }
        }

        if let Ok(timeout) = std::env::var("KIOSK_REQUEST_TIMEOUT") {
            if let Ok(secs) = timeout.parse() {
                self.request_timeout_secs = secs;
            }
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let url = self.base_url.trim();
        if url.is_empty() {
            return Err(ConfigError::ValidationError(
                "service.base_url is empty".to_string(),
            ));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::ValidationError(format!(
                "service.base_url '{}' is not an http(s) URL",
                url
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "service.request_timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.request_timeout_secs > MAX_TIMEOUT_SECS {
            return Err(ConfigError::ValidationError(format!(
                "service.request_timeout_secs must be at most {}",
                MAX_TIMEOUT_SECS
            )));
        }
        Ok(())
    }
}

/// Loop and workflow timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Pause between ticks in milliseconds.
    pub tick_ms: u64,
    /// Button lockout window in milliseconds.
    pub debounce_ms: u64,
    /// How long the badge prompt waits before showing access denied.
    pub badge_timeout_secs: u64,
    /// How long the welcome and access denied screens stay up.
    pub notice_timeout_secs: u64,
    /// How long an empty patient or assessment list stays up.
    pub empty_list_timeout_secs: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_ms: 10,
            debounce_ms: 20,
            badge_timeout_secs: 30,
            notice_timeout_secs: 5,
            empty_list_timeout_secs: 5,
        }
    }
}

impl TimingConfig {
    fn apply_env_overrides(&mut self) {
        override_u64("KIOSK_TICK_MS", &mut self.tick_ms);
        override_u64("KIOSK_DEBOUNCE_MS", &mut self.debounce_ms);
        override_u64("KIOSK_BADGE_TIMEOUT", &mut self.badge_timeout_secs);
        override_u64("KIOSK_NOTICE_TIMEOUT", &mut self.notice_timeout_secs);
        override_u64("KIOSK_EMPTY_TIMEOUT", &mut self.empty_list_timeout_secs);
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn badge_timeout(&self) -> Duration {
        Duration::from_secs(self.badge_timeout_secs)
    }

    pub fn notice_timeout(&self) -> Duration {
        Duration::from_secs(self.notice_timeout_secs)
    }

    pub fn empty_list_timeout(&self) -> Duration {
        Duration::from_secs(self.empty_list_timeout_secs)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            ("timing.tick_ms", self.tick_ms, MAX_INTERVAL_MS),
            ("timing.badge_timeout_secs", self.badge_timeout_secs, MAX_TIMEOUT_SECS),
            ("timing.notice_timeout_secs", self.notice_timeout_secs, MAX_TIMEOUT_SECS),
            ("timing.empty_list_timeout_secs", self.empty_list_timeout_secs, MAX_TIMEOUT_SECS),
        ];
        for (name, value, max) in checks {
            if value == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "{} must be greater than zero",
                    name
                )));
            }
            if value > max {
                return Err(ConfigError::ValidationError(format!(
                    "{} must be at most {}",
                    name, max
                )));
            }
        }
        if self.debounce_ms > MAX_INTERVAL_MS {
            return Err(ConfigError::ValidationError(format!(
                "timing.debounce_ms must be at most {}",
                MAX_INTERVAL_MS
            )));
        }
        Ok(())
    }
}

fn override_u64(var: &str, target: &mut u64) {
    if let Ok(value) = std::env::var(var) {
        match value.parse() {
            Ok(parsed) => *target = parsed,
            Err(_) => tracing::warn!(var, value = %value, "ignoring non-numeric override"),
        }
    }
}

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {}", .0.display(), .1)]
    IoError(PathBuf, #[source] std::io::Error),

    #[error("failed to parse config file '{}': {}", .0.display(), .1)]
    ParseError(PathBuf, String),

    #[error("configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::Rgb;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.service.base_url, DEFAULT_SERVICE_URL);
        assert_eq!(config.timing.tick_interval(), Duration::from_millis(10));
        assert_eq!(config.timing.badge_timeout(), Duration::from_secs(30));
        assert_eq!(config.timing.notice_timeout(), Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file_partial() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("kiosk.yaml");
        std::fs::write(
            &path,
            "service:\n  base_url: http://localhost:8080/pihealth/\ntiming:\n  badge_timeout_secs: 45\nfeedback:\n  palette:\n    idle: [0, 0, 255]\n",
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.service.base_url, "http://localhost:8080/pihealth/");
        assert_eq!(config.service.request_timeout_secs, 10);
        assert_eq!(config.timing.badge_timeout_secs, 45);
        assert_eq!(config.timing.notice_timeout_secs, 5);
        assert_eq!(config.feedback.palette.idle, Rgb(0, 0, 255));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("saved.yaml");
        let mut config = Config::default();
        config.timing.tick_ms = 25;
        config.save(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.timing.tick_ms, 25);
        assert_eq!(loaded.feedback, config.feedback);
    }

    #[test]
    fn test_missing_and_malformed_files() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.yaml");
        assert!(matches!(
            Config::from_file(&missing),
            Err(ConfigError::IoError(..))
        ));

        let bad = dir.path().join("bad.yaml");
        std::fs::write(&bad, "timing: [not, a, map]\n").unwrap();
        let err = Config::from_file(&bad).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(..)));
        assert!(err.to_string().contains("bad.yaml"));
    }

    #[test]
    fn test_validation() {
        let mut config = Config::default();
        config.timing.tick_ms = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.service.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.service.base_url = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.feedback.pixel_count = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.service.request_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_oversized_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("kiosk.yaml");
        std::fs::write(&path, "timing:\n  badge_timeout_secs: 18446744073709551615\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("timing.badge_timeout_secs"));

        let mut config = Config::default();
        config.timing.badge_timeout_secs = MAX_TIMEOUT_SECS;
        assert!(config.validate().is_ok());
        config.timing.notice_timeout_secs = MAX_TIMEOUT_SECS + 1;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.timing.debounce_ms = MAX_INTERVAL_MS + 1;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.service.request_timeout_secs = u64::MAX;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_overrides() {
        std::env::set_var("KIOSK_SERVICE_URL", "http://10.0.0.5/ords/");
        std::env::set_var("KIOSK_EMPTY_TIMEOUT", "9");
        std::env::set_var("KIOSK_TICK_MS", "fast");

        let config = Config::from_env();

        std::env::remove_var("KIOSK_SERVICE_URL");
        std::env::remove_var("KIOSK_EMPTY_TIMEOUT");
        std::env::remove_var("KIOSK_TICK_MS");

        assert_eq!(config.service.base_url, "http://10.0.0.5/ords/");
        assert_eq!(config.timing.empty_list_timeout_secs, 9);
        assert_eq!(config.timing.tick_ms, 10);
    }
}
