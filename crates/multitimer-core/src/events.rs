use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::sequence::{RunState, TimerId};
use crate::timer::CountdownState;

/// Every state change in the sequence produces an Event.
/// Front ends render from them; feedback collaborators subscribe to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SequenceStarted {
        index: usize,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    SequenceResumed {
        index: usize,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    SequencePaused {
        index: usize,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerExpired {
        index: usize,
        id: TimerId,
        at: DateTime<Utc>,
    },
    TimerAdvanced {
        from: usize,
        to: usize,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    /// The last entry expired with restart-on-loop enabled.
    SequenceLooped {
        at: DateTime<Utc>,
    },
    /// The last entry expired without restart-on-loop; the sequence is idle.
    SequenceCompleted {
        index: usize,
        at: DateTime<Utc>,
    },
    SequenceReset {
        at: DateTime<Utc>,
    },
    TimerAdded {
        index: usize,
        id: TimerId,
        at: DateTime<Utc>,
    },
    TimerRemoved {
        index: usize,
        id: TimerId,
        at: DateTime<Utc>,
    },
    DurationChanged {
        index: usize,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    ActiveIndexChanged {
        index: usize,
        at: DateTime<Utc>,
    },
    FocusChanged {
        focus: FocusTarget,
        at: DateTime<Utc>,
    },
    /// The clock source failed; the active countdown is frozen.
    TimerStalled {
        index: usize,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: RunState,
        active_index: usize,
        timer_count: usize,
        countdown: CountdownState,
        remaining_secs: u64,
        duration_secs: u64,
        focus: FocusTarget,
        restart_on_loop: bool,
        at: DateTime<Utc>,
    },
}

/// What currently receives keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FocusTarget {
    None,
    /// A digit slot in the flattened field space.
    Field(usize),
    Button(ControlButton),
}

/// Literal button elements of the controls strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlButton {
    StartResume,
    Reset,
    AddTimer,
    RemoveTimer,
}
