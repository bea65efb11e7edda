//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Sequence behavior (restart-on-loop, default duration for new timers)
//! - Expiry feedback toggles (sound, notifications)
//! - Carousel tuning constants
//! - Tick interval for front ends that drive the engine
//!
//! Configuration is stored at `<data dir>/config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceConfig {
    #[serde(default)]
    pub restart_on_loop: bool,
    #[serde(default = "default_duration_secs")]
    pub default_duration_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackConfig {
    #[serde(default = "default_true")]
    pub sound_enabled: bool,
    #[serde(default)]
    pub notifications_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarouselConfig {
    #[serde(default = "default_scroll_throttle_ms")]
    pub scroll_throttle_ms: u64,
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    #[serde(default = "default_gesture_dead_zone_px")]
    pub gesture_dead_zone_px: f64,
    #[serde(default = "default_gesture_throttle_ms")]
    pub gesture_throttle_ms: u64,
    /// Items further than this from the selected one are dimmed.
    #[serde(default = "default_visibility_window")]
    pub visibility_window: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerTickConfig {
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data dir>/config.toml`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub sequence: SequenceConfig,
    #[serde(default)]
    pub feedback: FeedbackConfig,
    #[serde(default)]
    pub carousel: CarouselConfig,
    #[serde(default)]
    pub timer: TimerTickConfig,
}

fn default_duration_secs() -> u64 {
    300
}
fn default_true() -> bool {
    true
}
fn default_scroll_throttle_ms() -> u64 {
    150
}
fn default_settle_delay_ms() -> u64 {
    500
}
fn default_gesture_dead_zone_px() -> f64 {
    10.0
}
fn default_gesture_throttle_ms() -> u64 {
    300
}
fn default_visibility_window() -> usize {
    2
}
fn default_tick_interval_ms() -> u64 {
    1000
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            restart_on_loop: false,
            default_duration_secs: default_duration_secs(),
        }
    }
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            notifications_enabled: false,
        }
    }
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            scroll_throttle_ms: default_scroll_throttle_ms(),
            settle_delay_ms: default_settle_delay_ms(),
            gesture_dead_zone_px: default_gesture_dead_zone_px(),
            gesture_throttle_ms: default_gesture_throttle_ms(),
            visibility_window: default_visibility_window(),
        }
    }
}

impl Default for TimerTickConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

impl Config {
    fn lookup<'a>(root: &'a serde_json::Value, key: &str) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }
        key.split('.').try_fold(root, |node, part| node.get(part))
    }

    /// Replace the leaf at `key`, coercing `value` to the leaf's current type.
    fn assign(root: &mut serde_json::Value, key: &str, value: &str) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let (parent_path, leaf) = match key.rsplit_once('.') {
            Some((parent, leaf)) => (Some(parent), leaf),
            None => (None, key),
        };
        let parent = match parent_path {
            Some(path) => path
                .split('.')
                .try_fold(&mut *root, |node, part| node.get_mut(part))
                .ok_or_else(unknown)?,
            None => root,
        };
        let obj = parent.as_object_mut().ok_or_else(unknown)?;
        let existing = obj.get(leaf).ok_or_else(unknown)?;

        let replacement = match existing {
            serde_json::Value::Bool(_) => value
                .parse::<bool>()
                .map(serde_json::Value::Bool)
                .map_err(|e| invalid(e.to_string()))?,
            serde_json::Value::Number(n) if n.is_f64() => value
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(serde_json::Value::Number)
                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?,
            serde_json::Value::Number(_) => value
                .parse::<u64>()
                .map(|n| serde_json::Value::Number(n.into()))
                .map_err(|e| invalid(e.to_string()))?,
            serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                return Err(invalid("cannot assign a whole section".into()));
            }
            _ => serde_json::Value::String(value.into()),
        };

        obj.insert(leaf.to_string(), replacement);
        Ok(())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the data directory, writing defaults if no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(_) => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
        }
    }

    /// Persist to the data directory.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        match Self::lookup(&json, key)? {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key, in memory only.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not parse
    /// as the key's type.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::assign(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Every leaf as `(dot.path, value)`, sorted by key.
    pub fn entries(&self) -> Vec<(String, String)> {
        fn walk(prefix: &str, node: &serde_json::Value, out: &mut Vec<(String, String)>) {
            match node {
                serde_json::Value::Object(map) => {
                    for (k, v) in map {
                        let path = if prefix.is_empty() {
                            k.clone()
                        } else {
                            format!("{prefix}.{k}")
                        };
                        walk(&path, v, out);
                    }
                }
                serde_json::Value::String(s) => out.push((prefix.to_string(), s.clone())),
                other => out.push((prefix.to_string(), other.to_string())),
            }
        }
        let mut out = Vec::new();
        if let Ok(json) = serde_json::to_value(self) {
            walk("", &json, &mut out);
        }
        out
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to default configuration");
            Self::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn missing_sections_take_defaults() {
        let parsed: Config = toml::from_str("[sequence]\nrestart_on_loop = true\n").unwrap();
        assert!(parsed.sequence.restart_on_loop);
        assert_eq!(parsed.sequence.default_duration_secs, 300);
        assert_eq!(parsed.carousel.settle_delay_ms, 500);
        assert_eq!(parsed.carousel.scroll_throttle_ms, 150);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("feedback.sound_enabled").as_deref(), Some("true"));
        assert_eq!(cfg.get("timer.tick_interval_ms").as_deref(), Some("1000"));
        assert!(cfg.get("feedback.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn set_updates_typed_leaves() {
        let mut cfg = Config::default();
        cfg.set("sequence.restart_on_loop", "true").unwrap();
        cfg.set("carousel.settle_delay_ms", "750").unwrap();
        cfg.set("carousel.gesture_dead_zone_px", "12.5").unwrap();
        assert!(cfg.sequence.restart_on_loop);
        assert_eq!(cfg.carousel.settle_delay_ms, 750);
        assert_eq!(cfg.carousel.gesture_dead_zone_px, 12.5);
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("sequence.nonexistent", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(
            cfg.set("nowhere.at_all", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn set_rejects_invalid_type() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("feedback.sound_enabled", "loud"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(cfg.set("sequence", "x").is_err());
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn entries_list_every_leaf() {
        let entries = Config::default().entries();
        assert!(entries
            .iter()
            .any(|(k, v)| k == "sequence.default_duration_secs" && v == "300"));
        assert_eq!(entries.len(), 10);
    }

    #[test]
    fn load_from_writes_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());

        let mut changed = cfg.clone();
        changed.set("feedback.notifications_enabled", "true").unwrap();
        changed.save_to(&path).unwrap();
        assert!(Config::load_from(&path).unwrap().feedback.notifications_enabled);
    }

    #[test]
    fn load_from_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "sequence = [").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::LoadFailed { .. })
        ));
    }
}
