//! Throttle and debounce as explicit, cancellable state.
//!
//! Neither wrapper owns a timer. The caller feeds timestamps in and polls
//! for due work, which keeps them deterministic under a manual clock and
//! makes teardown a plain `cancel()`.

/// Leading-edge throttle with an optional trailing call.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval_ms: u64,
    last_fired_ms: Option<u64>,
    trailing: bool,
}

impl Throttle {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            last_fired_ms: None,
            trailing: false,
        }
    }

    fn due(&self, now_ms: u64) -> bool {
        self.last_fired_ms
            .map_or(true, |last| now_ms.saturating_sub(last) >= self.interval_ms)
    }

    /// Returns `true` if the call may run now. Otherwise the call is
    /// remembered and surfaces later through [`poll`](Self::poll).
    pub fn call(&mut self, now_ms: u64) -> bool {
        if self.due(now_ms) {
            self.last_fired_ms = Some(now_ms);
            self.trailing = false;
            true
        } else {
            self.trailing = true;
            false
        }
    }

    /// Leading edge only: a suppressed call is dropped, not deferred.
    pub fn try_fire(&mut self, now_ms: u64) -> bool {
        if self.due(now_ms) {
            self.last_fired_ms = Some(now_ms);
            true
        } else {
            false
        }
    }

    /// Returns `true` once when a remembered trailing call becomes due.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        if self.trailing && self.due(now_ms) {
            self.trailing = false;
            self.last_fired_ms = Some(now_ms);
            return true;
        }
        false
    }

    pub fn is_pending(&self) -> bool {
        self.trailing
    }

    pub fn cancel(&mut self) {
        self.trailing = false;
    }
}

/// Fires once after `delay_ms` with no further [`touch`](Self::touch).
#[derive(Debug, Clone)]
pub struct Debounce {
    delay_ms: u64,
    deadline_ms: Option<u64>,
}

impl Debounce {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            deadline_ms: None,
        }
    }

    pub fn touch(&mut self, now_ms: u64) {
        self.deadline_ms = Some(now_ms.saturating_add(self.delay_ms));
    }

    pub fn poll(&mut self, now_ms: u64) -> bool {
        match self.deadline_ms {
            Some(deadline) if now_ms >= deadline => {
                self.deadline_ms = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.deadline_ms.is_some()
    }

    pub fn cancel(&mut self) {
        self.deadline_ms = None;
    }
}
