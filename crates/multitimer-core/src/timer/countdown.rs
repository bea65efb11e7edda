//! Wall-clock countdown primitive.
//!
//! A countdown never accumulates ticks. Every `tick()` recomputes the
//! remaining seconds from the distance between `now` and the baseline
//! captured when it last started, so a tab that was suspended for a minute
//! catches up on its first tick back.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> (Paused | Expired | Stalled)
//! Paused -> Running
//! Expired -> Running   (restart, driven by the owner)
//! ```
//!
//! The countdown never restarts itself; restart-on-loop is an explicit
//! `restart()` call made by whoever receives the `Expired` event.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountdownState {
    Idle,
    Running,
    Paused,
    Expired,
    /// The clock source failed while running. The countdown stays frozen.
    Stalled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownEvent {
    Expired,
}

/// Single countdown over a whole number of seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WallClockTimer {
    duration_secs: u64,
    remaining_secs: u64,
    state: CountdownState,
    /// Wall-clock instant (ms) at which a full-duration run would have begun.
    /// Only present while running. Signed so that a resume near the clock
    /// origin can sit before it.
    #[serde(default)]
    baseline_ms: Option<i64>,
}

impl WallClockTimer {
    pub fn new(duration_secs: u64) -> Self {
        Self {
            duration_secs,
            remaining_secs: duration_secs,
            state: CountdownState::Idle,
            baseline_ms: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> CountdownState {
        self.state
    }

    pub fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn is_running(&self) -> bool {
        self.state == CountdownState::Running
    }

    /// 0.0 .. 1.0 progress through the current cycle.
    pub fn progress(&self) -> f64 {
        if self.duration_secs == 0 {
            return 0.0;
        }
        1.0 - (self.remaining_secs as f64 / self.duration_secs as f64)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin (or continue) counting down from the current remaining value.
    pub fn start(&mut self, now_ms: u64) {
        match self.state {
            CountdownState::Running => {}
            CountdownState::Expired => self.restart(now_ms),
            CountdownState::Idle | CountdownState::Paused | CountdownState::Stalled => {
                let consumed = self.duration_secs - self.remaining_secs;
                self.baseline_ms = Some(now_ms as i64 - secs_to_ms(consumed));
                self.state = CountdownState::Running;
            }
        }
    }

    /// Alias of [`start`](Self::start) for readability at call sites that resume.
    pub fn resume(&mut self, now_ms: u64) {
        self.start(now_ms);
    }

    /// Freeze the remaining time. Pausing twice is a no-op.
    pub fn pause(&mut self, now_ms: u64) {
        if self.state != CountdownState::Running {
            return;
        }
        self.recompute(now_ms);
        self.baseline_ms = None;
        self.state = CountdownState::Paused;
    }

    /// Recompute the remaining time. Returns `Expired` exactly once per cycle.
    pub fn tick(&mut self, now_ms: u64) -> Option<CountdownEvent> {
        if self.state != CountdownState::Running {
            return None;
        }
        // Zero-length countdowns are inert.
        if self.duration_secs == 0 {
            return None;
        }
        self.recompute(now_ms);
        if self.remaining_secs == 0 {
            self.state = CountdownState::Expired;
            self.baseline_ms = None;
            return Some(CountdownEvent::Expired);
        }
        None
    }

    /// Begin a new full cycle with the same duration.
    pub fn restart(&mut self, now_ms: u64) {
        self.remaining_secs = self.duration_secs;
        self.baseline_ms = Some(now_ms as i64);
        self.state = CountdownState::Running;
    }

    /// Replace the duration. Partial elapsed time is discarded; a running
    /// countdown restarts its baseline at `now_ms`.
    pub fn set_duration(&mut self, duration_secs: u64, now_ms: u64) {
        if duration_secs == self.duration_secs && self.state != CountdownState::Expired {
            return;
        }
        self.duration_secs = duration_secs;
        self.remaining_secs = duration_secs;
        match self.state {
            CountdownState::Running => self.baseline_ms = Some(now_ms as i64),
            CountdownState::Expired => self.state = CountdownState::Idle,
            _ => {}
        }
    }

    pub fn reset(&mut self) {
        self.remaining_secs = self.duration_secs;
        self.baseline_ms = None;
        self.state = CountdownState::Idle;
    }

    /// Stop advancing because the clock source failed.
    pub fn stall(&mut self) {
        if self.state == CountdownState::Running {
            self.baseline_ms = None;
            self.state = CountdownState::Stalled;
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn recompute(&mut self, now_ms: u64) {
        if let Some(baseline) = self.baseline_ms {
            let elapsed_ms = (now_ms as i64 - baseline).max(0) as u64;
            let elapsed_secs = (elapsed_ms + 500) / 1000;
            self.remaining_secs = self.duration_secs.saturating_sub(elapsed_secs);
        }
    }
}

fn secs_to_ms(secs: u64) -> i64 {
    secs.saturating_mul(1000).min(i64::MAX as u64) as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const T0: u64 = 1_700_000_000_000;

    #[test]
    fn progress_tracks_elapsed_fraction() {
        let mut timer = WallClockTimer::new(10);
        assert_eq!(timer.progress(), 0.0);
        timer.start(T0);
        timer.tick(T0 + 4_000);
        assert!((timer.progress() - 0.4).abs() < 1e-9);
        timer.tick(T0 + 10_000);
        assert_eq!(timer.progress(), 1.0);
        assert_eq!(WallClockTimer::new(0).progress(), 0.0);
    }

    #[test]
    fn counts_down_from_wall_clock() {
        let mut timer = WallClockTimer::new(10);
        timer.start(T0);
        assert_eq!(timer.tick(T0 + 3_000), None);
        assert_eq!(timer.remaining_secs(), 7);
        // An irregular gap between ticks is irrelevant.
        assert_eq!(timer.tick(T0 + 7_400), None);
        assert_eq!(timer.remaining_secs(), 3);
    }

    #[test]
    fn elapsed_is_rounded_to_nearest_second() {
        let mut timer = WallClockTimer::new(10);
        timer.start(T0);
        timer.tick(T0 + 1_499);
        assert_eq!(timer.remaining_secs(), 9);
        timer.tick(T0 + 1_500);
        assert_eq!(timer.remaining_secs(), 8);
    }

    #[test]
    fn pause_is_idempotent() {
        let mut timer = WallClockTimer::new(60);
        timer.start(T0);
        timer.pause(T0 + 12_000);
        let frozen = timer.remaining_secs();
        timer.pause(T0 + 40_000);
        assert_eq!(timer.remaining_secs(), frozen);
        assert_eq!(frozen, 48);
        assert_eq!(timer.state(), CountdownState::Paused);
    }

    #[test]
    fn ticks_while_paused_do_nothing() {
        let mut timer = WallClockTimer::new(5);
        timer.start(T0);
        timer.pause(T0 + 1_000);
        assert_eq!(timer.tick(T0 + 100_000), None);
        assert_eq!(timer.remaining_secs(), 4);
    }

    #[test]
    fn resume_continues_from_frozen_value() {
        let mut timer = WallClockTimer::new(30);
        timer.start(T0);
        timer.pause(T0 + 10_000);
        timer.resume(T0 + 500_000);
        timer.tick(T0 + 505_000);
        assert_eq!(timer.remaining_secs(), 15);
    }

    #[test]
    fn expires_exactly_once_for_large_jumps() {
        for jump in [3, 9, 100] {
            let mut timer = WallClockTimer::new(3);
            timer.start(T0);
            let mut fired = 0;
            if timer.tick(T0 + jump * 1_000).is_some() {
                fired += 1;
            }
            for extra in 1..5 {
                if timer.tick(T0 + (jump + extra) * 1_000).is_some() {
                    fired += 1;
                }
            }
            assert_eq!(fired, 1, "jump of {jump}s");
            assert_eq!(timer.remaining_secs(), 0);
            assert_eq!(timer.state(), CountdownState::Expired);
        }
    }

    #[test]
    fn zero_duration_is_inert() {
        let mut timer = WallClockTimer::new(0);
        timer.start(T0);
        for s in 0..10 {
            assert_eq!(timer.tick(T0 + s * 1_000), None);
        }
        assert_eq!(timer.state(), CountdownState::Running);
    }

    #[test]
    fn duration_change_while_running_restarts_baseline() {
        let mut timer = WallClockTimer::new(60);
        timer.start(T0);
        timer.tick(T0 + 20_000);
        timer.set_duration(30, T0 + 20_000);
        assert_eq!(timer.remaining_secs(), 30);
        timer.tick(T0 + 25_000);
        assert_eq!(timer.remaining_secs(), 25);
    }

    #[test]
    fn duration_change_after_expiry_rearms() {
        let mut timer = WallClockTimer::new(1);
        timer.start(T0);
        timer.tick(T0 + 1_000);
        assert_eq!(timer.state(), CountdownState::Expired);
        timer.set_duration(5, T0 + 2_000);
        assert_eq!(timer.state(), CountdownState::Idle);
        assert_eq!(timer.remaining_secs(), 5);
    }

    #[test]
    fn restart_begins_a_full_cycle() {
        let mut timer = WallClockTimer::new(2);
        timer.start(T0);
        assert!(timer.tick(T0 + 2_000).is_some());
        timer.restart(T0 + 2_000);
        assert_eq!(timer.remaining_secs(), 2);
        assert_eq!(timer.tick(T0 + 3_000), None);
        assert!(timer.tick(T0 + 4_000).is_some());
    }

    #[test]
    fn stalled_timer_makes_no_progress() {
        let mut timer = WallClockTimer::new(10);
        timer.start(T0);
        timer.tick(T0 + 2_000);
        timer.stall();
        assert_eq!(timer.tick(T0 + 9_000), None);
        assert_eq!(timer.remaining_secs(), 8);
        assert_eq!(timer.state(), CountdownState::Stalled);
    }

    #[test]
    fn resume_near_clock_origin() {
        let mut timer = WallClockTimer::new(10);
        timer.start(0);
        timer.pause(4_000);
        timer.resume(1_000);
        timer.tick(2_000);
        assert_eq!(timer.remaining_secs(), 5);
    }

    proptest! {
        #[test]
        fn remaining_tracks_total_running_time(
            duration in 1u64..500,
            segments in proptest::collection::vec((0u64..60, 0u64..600, 0usize..4), 1..12),
        ) {
            let mut timer = WallClockTimer::new(duration);
            let mut now = T0;
            let mut running_total = 0u64;
            for (run, idle, ticks) in segments {
                let run = run.min(duration - running_total.min(duration));
                if running_total + run >= duration {
                    break;
                }
                timer.resume(now);
                // Irregular intermediate ticks.
                for i in 0..ticks {
                    timer.tick(now + (run * 1_000 * i as u64) / (ticks as u64 + 1));
                }
                now += run * 1_000;
                timer.pause(now);
                running_total += run;
                now += idle * 1_000;
            }
            prop_assert_eq!(timer.remaining_secs(), duration - running_total);
        }
    }
}
