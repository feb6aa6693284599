//! TOML-based timing configuration.
//!
//! The numeric constants the screens feed into the timing core - post-
//! completion delay, log-reveal stagger, progress step count, countdown
//! length and grace - with the original implementation's values as
//! defaults. Stored at `~/.config/propterm/config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::countdown::DEFAULT_GRACE_MS;
use crate::error::ConfigError;
use crate::progress::DEFAULT_STEP_COUNT;
use crate::sequence::DEFAULT_COMPLETION_DELAY_MS;

fn default_completion_delay_ms() -> u64 {
    DEFAULT_COMPLETION_DELAY_MS
}

fn default_log_reveal_stagger_ms() -> u64 {
    crate::catalog::LOG_REVEAL_STAGGER_MS
}

fn default_progress_step_count() -> u32 {
    DEFAULT_STEP_COUNT
}

fn default_countdown_initial_seconds() -> u32 {
    45
}

fn default_countdown_grace_secs() -> u32 {
    (DEFAULT_GRACE_MS / 1000) as u32
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Pause between the last stage ending and the completion callback.
    #[serde(default = "default_completion_delay_ms")]
    pub completion_delay_ms: u64,
    /// Gap between consecutive log reveals within a stage.
    #[serde(default = "default_log_reveal_stagger_ms")]
    pub log_reveal_stagger_ms: u64,
    /// Number of equal steps per progress ramp.
    #[serde(default = "default_progress_step_count")]
    pub progress_step_count: u32,
    /// Edit-session countdown length in seconds.
    #[serde(default = "default_countdown_initial_seconds")]
    pub countdown_initial_seconds: u32,
    /// Pause between the expiry warning and the logout callback.
    #[serde(default = "default_countdown_grace_secs")]
    pub countdown_grace_secs: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            completion_delay_ms: default_completion_delay_ms(),
            log_reveal_stagger_ms: default_log_reveal_stagger_ms(),
            progress_step_count: default_progress_step_count(),
            countdown_initial_seconds: default_countdown_initial_seconds(),
            countdown_grace_secs: default_countdown_grace_secs(),
        }
    }
}

fn parse_num<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("not a valid number: {value}"),
    })
}

impl TimingConfig {
    pub fn grace_ms(&self) -> u64 {
        u64::from(self.countdown_grace_secs) * 1000
    }

    /// Look up a value by its TOML key.
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "completion_delay_ms" => Some(self.completion_delay_ms.to_string()),
            "log_reveal_stagger_ms" => Some(self.log_reveal_stagger_ms.to_string()),
            "progress_step_count" => Some(self.progress_step_count.to_string()),
            "countdown_initial_seconds" => Some(self.countdown_initial_seconds.to_string()),
            "countdown_grace_secs" => Some(self.countdown_grace_secs.to_string()),
            _ => None,
        }
    }

    /// Set a value by its TOML key. The config is untouched on any error.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut next = self.clone();
        match key {
            "completion_delay_ms" => next.completion_delay_ms = parse_num(key, value)?,
            "log_reveal_stagger_ms" => next.log_reveal_stagger_ms = parse_num(key, value)?,
            "progress_step_count" => next.progress_step_count = parse_num(key, value)?,
            "countdown_initial_seconds" => {
                next.countdown_initial_seconds = parse_num(key, value)?;
            }
            "countdown_grace_secs" => next.countdown_grace_secs = parse_num(key, value)?,
            _ => {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: "unknown key".to_string(),
                });
            }
        }
        next.validate()?;
        *self = next;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.progress_step_count == 0 {
            return Err(ConfigError::InvalidValue {
                key: "progress_step_count".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.countdown_initial_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                key: "countdown_initial_seconds".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Default config file location (`~/.config/propterm/config.toml`).
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("propterm").join("config.toml"))
    }

    /// Load from the default location; defaults if the file is absent.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let config: Self =
            toml::from_str(&raw).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::config_path().ok_or_else(|| ConfigError::SaveFailed {
            path: PathBuf::new(),
            message: "no config directory on this platform".to_string(),
        })?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let raw = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::SaveFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        }
        std::fs::write(path, raw).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_scripted_timings() {
        let config = TimingConfig::default();
        assert_eq!(config.completion_delay_ms, 1000);
        assert_eq!(config.log_reveal_stagger_ms, 400);
        assert_eq!(config.progress_step_count, 20);
        assert_eq!(config.countdown_initial_seconds, 45);
        assert_eq!(config.grace_ms(), 3000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: TimingConfig = toml::from_str("countdown_initial_seconds = 60").unwrap();
        assert_eq!(config.countdown_initial_seconds, 60);
        assert_eq!(config.progress_step_count, 20);
    }

    #[test]
    fn zero_step_count_is_rejected() {
        let config: TimingConfig = toml::from_str("progress_step_count = 0").unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "progress_step_count"));
    }

    #[test]
    fn get_and_set_cover_every_key() {
        let mut config = TimingConfig::default();
        config.set("countdown_initial_seconds", "90").unwrap();
        assert_eq!(config.get("countdown_initial_seconds").unwrap(), "90");
        assert_eq!(config.get("progress_step_count").unwrap(), "20");
        assert!(config.get("theme").is_none());
    }

    #[test]
    fn set_rejects_unknown_keys_and_invalid_values() {
        let mut config = TimingConfig::default();
        assert!(config.set("theme", "dark").is_err());
        assert!(config.set("progress_step_count", "ten").is_err());
        assert!(config.set("progress_step_count", "0").is_err());
        assert_eq!(config.progress_step_count, 20);
    }

    #[test]
    fn save_and_load_round_trip() {
        let path = std::env::temp_dir().join("propterm-config-test").join("config.toml");
        let mut config = TimingConfig::default();
        config.countdown_initial_seconds = 90;
        config.save_to(&path).unwrap();
        let loaded = TimingConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
