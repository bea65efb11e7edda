//! Wall-clock sources.
//!
//! Countdowns never count ticks; they always re-derive remaining time from a
//! clock reading. The controller reads the clock once per transition and
//! hands the value down, so the primitives stay pure functions of `now`.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::ClockError;

/// A source of wall-clock milliseconds.
pub trait Clock {
    fn now_ms(&self) -> Result<u64, ClockError>;
}

/// Milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> Result<u64, ClockError> {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .map_err(|_| ClockError::BeforeEpoch)
    }
}

/// Settable clock shared between clones.
///
/// Used by tests and simulations to jump time arbitrarily between ticks,
/// and to simulate a failing clock source.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
    failed: Arc<AtomicBool>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(start_ms)),
            failed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn set(&self, ms: u64) {
        self.now.store(ms, Ordering::SeqCst);
    }

    pub fn advance_ms(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn advance_secs(&self, secs: u64) {
        self.advance_ms(secs.saturating_mul(1000));
    }

    /// Make every subsequent reading fail until [`recover`](Self::recover).
    pub fn fail(&self) {
        self.failed.store(true, Ordering::SeqCst);
    }

    pub fn recover(&self) {
        self.failed.store(false, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> Result<u64, ClockError> {
        if self.failed.load(Ordering::SeqCst) {
            return Err(ClockError::Unavailable);
        }
        Ok(self.now.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::new(1_000);
        let other = clock.clone();
        clock.advance_secs(2);
        assert_eq!(other.now_ms().unwrap(), 3_000);
    }

    #[test]
    fn manual_clock_failure_is_recoverable() {
        let clock = ManualClock::new(0);
        clock.fail();
        assert_eq!(clock.now_ms(), Err(ClockError::Unavailable));
        clock.recover();
        assert_eq!(clock.now_ms(), Ok(0));
    }

    #[test]
    fn system_clock_is_after_epoch() {
        assert!(SystemClock.now_ms().unwrap() > 0);
    }
}
