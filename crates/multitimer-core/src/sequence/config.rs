use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identity of one sequence entry. Stable across edits; only a full
/// sequence reset hands out fresh ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimerId(Uuid);

impl TimerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TimerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for TimerId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerConfig {
    pub id: TimerId,
    pub duration_secs: u64,
    /// Set on freshly inserted entries so the view can animate them in.
    #[serde(default)]
    pub enter_transition: bool,
}

impl TimerConfig {
    pub fn new(duration_secs: u64) -> Self {
        Self {
            id: TimerId::new(),
            duration_secs,
            enter_transition: false,
        }
    }

    pub fn entering(duration_secs: u64) -> Self {
        Self {
            enter_transition: true,
            ..Self::new(duration_secs)
        }
    }
}

/// Persisted shape of a sequence entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredTimer {
    pub id: TimerId,
    pub duration_seconds: u64,
}

impl From<&TimerConfig> for StoredTimer {
    fn from(config: &TimerConfig) -> Self {
        Self {
            id: config.id,
            duration_seconds: config.duration_secs,
        }
    }
}

impl From<StoredTimer> for TimerConfig {
    fn from(stored: StoredTimer) -> Self {
        Self {
            id: stored.id,
            duration_secs: stored.duration_seconds,
            enter_transition: false,
        }
    }
}
