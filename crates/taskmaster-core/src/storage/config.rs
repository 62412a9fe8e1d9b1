//! TOML-based application configuration.
//!
//! Stores user preferences for the deadline monitor and notification
//! delivery. Configuration is stored at `~/.config/taskmaster/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ConfigError;

use super::data_dir;

/// Deadline monitor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorSettings {
    /// Seconds between evaluation passes.
    #[serde(default = "default_tick_interval_secs")]
    pub tick_interval_secs: u64,
}

/// Notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Path to a custom alert sound file (optional). Interpretation is up
    /// to the delivery layer.
    #[serde(default)]
    pub custom_sound: Option<String>,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/taskmaster/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub monitor: MonitorSettings,
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

fn default_tick_interval_secs() -> u64 {
    60
}
fn default_true() -> bool {
    true
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            tick_interval_secs: default_tick_interval_secs(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            custom_sound: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            monitor: MonitorSettings::default(),
            notifications: NotificationsConfig::default(),
        }
    }
}

impl Config {
    fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("~/.config/taskmaster"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from disk, writing defaults on first run.
    ///
    /// # Errors
    /// Returns an error if the config file exists but cannot be parsed, or
    /// if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path,
                message: e.to_string(),
            }),
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    /// Returns an error if the config cannot be serialized or written.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path().map_err(|e| match e {
            ConfigError::LoadFailed { path, message } => ConfigError::SaveFailed { path, message },
            other => other,
        })?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }

    /// Get a config value as a string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "monitor.tick_interval_secs" => Some(self.monitor.tick_interval_secs.to_string()),
            "notifications.enabled" => Some(self.notifications.enabled.to_string()),
            "notifications.custom_sound" => Some(
                self.notifications
                    .custom_sound
                    .clone()
                    .unwrap_or_default(),
            ),
            _ => None,
        }
    }

    /// Set a config value by key. Does not persist; call [`Config::save`].
    ///
    /// # Errors
    /// Returns an error if the key is unknown or the value cannot be parsed.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "monitor.tick_interval_secs" => {
                let secs: u64 = value.parse().map_err(|_| ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: format!("cannot parse '{value}' as seconds"),
                })?;
                if secs == 0 {
                    return Err(ConfigError::InvalidValue {
                        key: key.to_string(),
                        message: "interval must be at least 1 second".to_string(),
                    });
                }
                self.monitor.tick_interval_secs = secs;
            }
            "notifications.enabled" => {
                self.notifications.enabled =
                    value.parse().map_err(|_| ConfigError::InvalidValue {
                        key: key.to_string(),
                        message: format!("cannot parse '{value}' as bool"),
                    })?;
            }
            "notifications.custom_sound" => {
                self.notifications.custom_sound = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                };
            }
            unknown => {
                return Err(ConfigError::InvalidValue {
                    key: unknown.to_string(),
                    message: "unknown config key".to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_cadence() {
        let cfg = Config::default();
        assert_eq!(cfg.monitor.tick_interval_secs, 60);
        assert!(cfg.notifications.enabled);
        assert!(cfg.notifications.custom_sound.is_none());
    }

    #[test]
    fn toml_round_trip_with_missing_sections() {
        let cfg: Config = toml::from_str("").unwrap();
        assert_eq!(cfg.monitor.tick_interval_secs, 60);

        let partial: Config = toml::from_str("[monitor]\ntick_interval_secs = 15\n").unwrap();
        assert_eq!(partial.monitor.tick_interval_secs, 15);
        assert!(partial.notifications.enabled);

        let serialized = toml::to_string_pretty(&partial).unwrap();
        let back: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(back.monitor.tick_interval_secs, 15);
    }

    #[test]
    fn get_and_set_known_keys() {
        let mut cfg = Config::default();
        cfg.set("monitor.tick_interval_secs", "30").unwrap();
        assert_eq!(cfg.get("monitor.tick_interval_secs").unwrap(), "30");

        cfg.set("notifications.enabled", "false").unwrap();
        assert_eq!(cfg.get("notifications.enabled").unwrap(), "false");

        cfg.set("notifications.custom_sound", "/tmp/ding.wav").unwrap();
        assert_eq!(
            cfg.get("notifications.custom_sound").unwrap(),
            "/tmp/ding.wav"
        );
    }

    #[test]
    fn set_rejects_unknown_key_and_bad_values() {
        let mut cfg = Config::default();
        assert!(cfg.set("nope.nothing", "1").is_err());
        assert!(cfg.set("monitor.tick_interval_secs", "soon").is_err());
        assert!(cfg.set("monitor.tick_interval_secs", "0").is_err());
        assert!(cfg.set("notifications.enabled", "yes").is_err());
    }
}
