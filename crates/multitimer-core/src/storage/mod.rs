mod config;
pub mod database;
mod memory;

pub use config::{CarouselConfig, Config, FeedbackConfig, SequenceConfig, TimerTickConfig};
pub use database::Database;
pub use memory::MemoryStore;

use std::path::PathBuf;

use crate::error::{ConfigError, StoreError};
use crate::sequence::StoredTimer;

/// Key-value snapshot store for the timer sequence.
///
/// Callers treat it as best-effort: a failed write is logged and dropped,
/// a failed read falls back to defaults.
pub trait SequenceStore {
    fn get(&self, key: &str) -> Result<Option<Vec<StoredTimer>>, StoreError>;

    fn set(&self, key: &str, timers: &[StoredTimer]) -> Result<(), StoreError>;
}

/// Returns the data directory.
///
/// `MULTITIMER_DATA_DIR` wins if set. Otherwise `~/.config/multitimer[-dev]/`
/// depending on `MULTITIMER_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("MULTITIMER_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("MULTITIMER_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("multitimer-dev")
            } else {
                base_dir.join("multitimer")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
