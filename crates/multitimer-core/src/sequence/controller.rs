//! Timer sequence controller.
//!
//! Owns the ordered timer list and is the only thing that mutates it. It
//! drives exactly one [`WallClockTimer`] (the active entry's), arbitrates
//! keyboard focus between the controls and the per-timer segmented editors,
//! and mirrors list changes to a [`SequenceStore`].
//!
//! ## State
//!
//! ```text
//! Idle <-> Running        start / resume / pause / expiry of last entry
//! Idle | Running -> Editing   focusing a field pauses the sequence
//! Editing -> Idle         commit, Enter, or leaving the fields
//! ```
//!
//! Every public operation applies its whole transition before returning the
//! events it produced, so no caller ever observes a half-applied state.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::config::{StoredTimer, TimerConfig, TimerId};
use crate::clock::Clock;
use crate::editor::{Completion, EditOutcome, SegmentedTimeEditor, SLOTS_PER_EDITOR};
use crate::events::{ControlButton, Event, FocusTarget};
use crate::focus::{FocusSequencer, FocusTransition};
use crate::keyboard::{Key, KeyOwner, KeyRegistry};
use crate::storage::{Config, SequenceStore};
use crate::timer::{CountdownEvent, CountdownState, WallClockTimer};

/// Store key under which the sequence snapshot lives.
pub const SEQUENCE_KEY: &str = "timer_sequence";

const SEQUENCE_KEYS: [Key; 3] = [Key::Enter, Key::ArrowUp, Key::ArrowDown];
const EDITOR_KEYS: [Key; 2] = [Key::ArrowLeft, Key::ArrowRight];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Idle,
    Running,
    Editing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerOptions {
    pub restart_on_loop: bool,
    /// Duration given to timers added from the controls.
    pub default_duration_secs: u64,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            restart_on_loop: false,
            default_duration_secs: 300,
        }
    }
}

impl From<&Config> for ControllerOptions {
    fn from(config: &Config) -> Self {
        Self {
            restart_on_loop: config.sequence.restart_on_loop,
            default_duration_secs: config.sequence.default_duration_secs,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Vertical {
    Up,
    Down,
}

pub struct TimerSequenceController<C: Clock> {
    clock: C,
    configs: Vec<TimerConfig>,
    active_index: usize,
    running: bool,
    /// False until the first start after construction, reset or completion.
    /// Decides whether Enter starts fresh or resumes.
    started: bool,
    options: ControllerOptions,
    countdown: WallClockTimer,
    /// Config the countdown was built for.
    countdown_id: TimerId,
    fields: FocusSequencer,
    button: Option<ControlButton>,
    editor: Option<SegmentedTimeEditor>,
    keys: KeyRegistry,
    store: Option<Box<dyn SequenceStore>>,
}

impl<C: Clock> std::fmt::Debug for TimerSequenceController<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerSequenceController")
            .field("configs", &self.configs)
            .field("active_index", &self.active_index)
            .field("running", &self.running)
            .field("countdown", &self.countdown)
            .field("focus", &self.focus())
            .finish_non_exhaustive()
    }
}

impl<C: Clock> TimerSequenceController<C> {
    /// Build a controller over `configs`. An empty list is replaced by a
    /// single default timer.
    pub fn new(clock: C, configs: Vec<TimerConfig>, options: ControllerOptions) -> Self {
        let configs = if configs.is_empty() {
            vec![TimerConfig::new(options.default_duration_secs)]
        } else {
            configs
        };
        let first = &configs[0];
        let countdown = WallClockTimer::new(first.duration_secs);
        let countdown_id = first.id;
        let fields = FocusSequencer::new(configs.len() * SLOTS_PER_EDITOR - 1);

        let mut keys = KeyRegistry::new();
        if let Err(e) = keys.bind_all(&SEQUENCE_KEYS, KeyOwner::Sequence) {
            tracing::warn!(error = %e, "sequence keys already captured");
        }

        Self {
            clock,
            configs,
            active_index: 0,
            running: false,
            started: false,
            options,
            countdown,
            countdown_id,
            fields,
            button: None,
            editor: None,
            keys,
            store: None,
        }
    }

    /// Seed the sequence from `store`, failing open to the default sequence,
    /// and mirror every later change back into it.
    pub fn load(clock: C, store: Box<dyn SequenceStore>, options: ControllerOptions) -> Self {
        // Only a missing or empty snapshot is overwritten with the seeded
        // default; an unreadable one is left for inspection.
        let (configs, seed) = match store.get(SEQUENCE_KEY) {
            Ok(Some(timers)) if !timers.is_empty() => {
                (timers.into_iter().map(TimerConfig::from).collect(), false)
            }
            Ok(_) => (Vec::new(), true),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read stored sequence, using defaults");
                (Vec::new(), false)
            }
        };
        let mut controller = Self::new(clock, configs, options);
        controller.store = Some(store);
        if seed {
            controller.persist();
        }
        controller
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn configs(&self) -> &[TimerConfig] {
        &self.configs
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    /// Always false: a sequence holds at least one timer.
    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    pub fn active_index(&self) -> usize {
        self.active_index
    }

    pub fn active_config(&self) -> &TimerConfig {
        &self.configs[self.active_index]
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn run_state(&self) -> RunState {
        if self.editor.is_some() {
            RunState::Editing
        } else if self.running {
            RunState::Running
        } else {
            RunState::Idle
        }
    }

    pub fn countdown(&self) -> &WallClockTimer {
        &self.countdown
    }

    pub fn remaining_secs(&self) -> u64 {
        self.countdown.remaining_secs()
    }

    pub fn restart_on_loop(&self) -> bool {
        self.options.restart_on_loop
    }

    pub fn set_restart_on_loop(&mut self, enabled: bool) {
        self.options.restart_on_loop = enabled;
    }

    /// Flattened field index currently focused, if any.
    pub fn focus_index(&self) -> Option<usize> {
        self.fields.index()
    }

    pub fn focus(&self) -> FocusTarget {
        match (self.fields.index(), self.button) {
            (Some(index), _) => FocusTarget::Field(index),
            (None, Some(button)) => FocusTarget::Button(button),
            (None, None) => FocusTarget::None,
        }
    }

    pub fn editor(&self) -> Option<&SegmentedTimeEditor> {
        self.editor.as_ref()
    }

    pub fn keys(&self) -> &KeyRegistry {
        &self.keys
    }

    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            state: self.run_state(),
            active_index: self.active_index,
            timer_count: self.configs.len(),
            countdown: self.countdown.state(),
            remaining_secs: self.countdown.remaining_secs(),
            duration_secs: self.countdown.duration_secs(),
            focus: self.focus(),
            restart_on_loop: self.options.restart_on_loop,
            at: Utc::now(),
        }
    }

    // ── Playback ─────────────────────────────────────────────────────

    /// Start the sequence fresh from the first entry.
    pub fn start(&mut self) -> Vec<Event> {
        let now = self.now();
        self.end_editing();
        self.button = None;

        let mut events = Vec::new();
        if self.active_index != 0 {
            self.active_index = 0;
            events.push(Event::ActiveIndexChanged {
                index: 0,
                at: Utc::now(),
            });
        }
        self.rebuild_countdown();
        self.running = true;
        self.started = true;
        if let Some(now) = now {
            self.countdown.start(now);
        }

        tracing::debug!(duration = self.countdown.duration_secs(), "sequence started");
        events.push(Event::SequenceStarted {
            index: 0,
            duration_secs: self.countdown.duration_secs(),
            at: Utc::now(),
        });
        events
    }

    /// Continue from the active entry without rewinding.
    pub fn resume(&mut self) -> Vec<Event> {
        if self.running {
            return Vec::new();
        }
        let now = self.now();
        self.end_editing();
        self.running = true;
        self.started = true;
        if let Some(now) = now {
            if self.countdown.state() == CountdownState::Expired {
                self.countdown.restart(now);
            } else {
                self.countdown.resume(now);
            }
        }

        tracing::debug!(index = self.active_index, "sequence resumed");
        vec![Event::SequenceResumed {
            index: self.active_index,
            remaining_secs: self.countdown.remaining_secs(),
            at: Utc::now(),
        }]
    }

    /// Stop the sequence, freezing the active countdown. A second pause is
    /// a no-op.
    pub fn pause(&mut self) -> Vec<Event> {
        if !self.running {
            return Vec::new();
        }
        // Settle anything already due so an expiry is never swallowed.
        let mut events = self.tick();
        if !self.running {
            return events;
        }
        if let Some(now) = self.now() {
            self.countdown.pause(now);
        }
        self.running = false;

        tracing::debug!(
            index = self.active_index,
            remaining = self.countdown.remaining_secs(),
            "sequence paused"
        );
        events.push(Event::SequencePaused {
            index: self.active_index,
            remaining_secs: self.countdown.remaining_secs(),
            at: Utc::now(),
        });
        events
    }

    /// Start fresh unless a run is already in progress, in which case resume.
    pub fn start_or_resume(&mut self) -> Vec<Event> {
        if self.started {
            self.resume()
        } else {
            self.start()
        }
    }

    /// Recompute the active countdown from the clock. Call as often as
    /// convenient; correctness does not depend on regularity.
    pub fn tick(&mut self) -> Vec<Event> {
        if !self.running {
            return Vec::new();
        }
        let Some(now) = self.now() else {
            return self.stalled_events();
        };
        match self.countdown.state() {
            // Swapped in or resumed while the clock was unavailable.
            CountdownState::Idle | CountdownState::Paused => self.countdown.start(now),
            CountdownState::Running | CountdownState::Stalled | CountdownState::Expired => {}
        }
        match self.countdown.tick(now) {
            Some(CountdownEvent::Expired) => self.expire(self.active_index, now),
            None => Vec::new(),
        }
    }

    /// Handle the expiry of the entry at `index`. The next countdown only
    /// starts if the sequence is running; a stopped sequence stays stopped.
    pub fn on_timer_expire(&mut self, index: usize) -> Vec<Event> {
        if index >= self.configs.len() {
            return Vec::new();
        }
        match self.now() {
            Some(now) => self.expire(index, now),
            None => self.stalled_events(),
        }
    }

    fn expire(&mut self, index: usize, now: u64) -> Vec<Event> {
        let mut events = vec![Event::TimerExpired {
            index,
            id: self.configs[index].id,
            at: Utc::now(),
        }];
        let last = self.configs.len() - 1;

        if index < last {
            let to = index + 1;
            self.active_index = to;
            self.rebuild_countdown();
            if self.running {
                self.countdown.start(now);
            }
            tracing::debug!(from = index, to, "advanced to next timer");
            events.push(Event::TimerAdvanced {
                from: index,
                to,
                duration_secs: self.countdown.duration_secs(),
                at: Utc::now(),
            });
        } else if self.options.restart_on_loop {
            self.active_index = 0;
            if !self.running {
                self.rebuild_countdown();
            } else if self.countdown_id == self.configs[0].id {
                // Single-entry loop: explicit Expired -> Running re-entry.
                self.countdown.restart(now);
            } else {
                self.rebuild_countdown();
                self.countdown.start(now);
            }
            tracing::debug!("sequence looped");
            events.push(Event::SequenceLooped { at: Utc::now() });
            if last != 0 {
                events.push(Event::ActiveIndexChanged {
                    index: 0,
                    at: Utc::now(),
                });
            }
        } else {
            self.running = false;
            self.started = false;
            tracing::debug!(index, "sequence completed");
            events.push(Event::SequenceCompleted {
                index,
                at: Utc::now(),
            });
        }
        events
    }

    // ── List mutations ───────────────────────────────────────────────

    /// Insert `config` at `index` (clamped to the end) and make it active.
    pub fn add_timer_at(&mut self, index: usize, config: TimerConfig) -> Vec<Event> {
        let index = index.min(self.configs.len());
        let id = config.id;
        self.end_editing();
        self.configs.insert(index, config);
        self.fields
            .set_max_index(self.configs.len() * SLOTS_PER_EDITOR - 1);
        self.active_index = index;
        self.sync_countdown();
        self.persist();

        tracing::debug!(index, %id, "timer added");
        vec![
            Event::TimerAdded {
                index,
                id,
                at: Utc::now(),
            },
            Event::ActiveIndexChanged {
                index,
                at: Utc::now(),
            },
        ]
    }

    /// Remove the entry at `index`. Removing the only entry is a no-op.
    pub fn remove_timer_at(&mut self, index: usize) -> Vec<Event> {
        if self.configs.len() <= 1 || index >= self.configs.len() {
            return Vec::new();
        }
        self.end_editing();
        let removed = self.configs.remove(index);
        self.fields
            .set_max_index(self.configs.len() * SLOTS_PER_EDITOR - 1);
        self.active_index = index.saturating_sub(1);
        self.sync_countdown();
        self.persist();

        tracing::debug!(index, id = %removed.id, "timer removed");
        vec![
            Event::TimerRemoved {
                index,
                id: removed.id,
                at: Utc::now(),
            },
            Event::ActiveIndexChanged {
                index: self.active_index,
                at: Utc::now(),
            },
        ]
    }

    /// Change one entry's duration. The active countdown restarts at the new
    /// duration; elapsed time is not carried over.
    pub fn edit_duration_at(&mut self, index: usize, duration_secs: u64) -> Vec<Event> {
        let Some(config) = self.configs.get_mut(index) else {
            return Vec::new();
        };
        if config.duration_secs == duration_secs {
            return Vec::new();
        }
        config.duration_secs = duration_secs;
        if index == self.active_index {
            match self.clock.now_ms() {
                Ok(now) => self.countdown.set_duration(duration_secs, now),
                Err(e) => {
                    tracing::warn!(error = %e, "clock unavailable during duration change");
                    self.countdown = WallClockTimer::new(duration_secs);
                }
            }
        }
        self.persist();

        tracing::debug!(index, duration_secs, "duration changed");
        vec![Event::DurationChanged {
            index,
            duration_secs,
            at: Utc::now(),
        }]
    }

    /// Make the entry at `index` active, e.g. after the carousel was
    /// scrolled by hand.
    pub fn select_timer(&mut self, index: usize) -> Vec<Event> {
        if index >= self.configs.len() || index == self.active_index {
            return Vec::new();
        }
        self.active_index = index;
        self.sync_countdown();
        vec![Event::ActiveIndexChanged {
            index,
            at: Utc::now(),
        }]
    }

    /// Treat the sequence as brand new: fresh identities, first entry, idle.
    pub fn reset(&mut self) -> Vec<Event> {
        self.end_editing();
        self.button = None;
        for config in &mut self.configs {
            config.id = TimerId::new();
            config.enter_transition = false;
        }
        self.active_index = 0;
        self.running = false;
        self.started = false;
        self.rebuild_countdown();
        self.persist();

        tracing::debug!(timers = self.configs.len(), "sequence reset");
        vec![Event::SequenceReset { at: Utc::now() }]
    }

    /// The entering animation for `id` finished.
    pub fn clear_enter_transition(&mut self, id: TimerId) {
        if let Some(config) = self.configs.iter_mut().find(|c| c.id == id) {
            config.enter_transition = false;
        }
    }

    // ── Focus and keyboard ───────────────────────────────────────────

    /// Give keyboard focus to a digit field. A running sequence is paused
    /// first: editing and playback are mutually exclusive.
    pub fn focus_field(&mut self, index: usize) -> Vec<Event> {
        if index > self.fields.max_index() {
            return Vec::new();
        }
        let mut events = self.pause();
        let timer = index / SLOTS_PER_EDITOR;
        self.mount_editor(timer);
        self.button = None;
        if self.fields.set_index(Some(index)) != FocusTransition::Unchanged {
            events.push(self.focus_event());
        }
        events
    }

    pub fn focus_button(&mut self, button: ControlButton) -> Vec<Event> {
        self.end_editing();
        if self.button == Some(button) {
            return Vec::new();
        }
        self.button = Some(button);
        vec![self.focus_event()]
    }

    pub fn blur(&mut self) -> Vec<Event> {
        if self.focus() == FocusTarget::None {
            return Vec::new();
        }
        self.end_editing();
        self.button = None;
        vec![self.focus_event()]
    }

    /// Activate a control as if it were clicked.
    pub fn activate(&mut self, button: ControlButton) -> Vec<Event> {
        match button {
            ControlButton::StartResume if self.running => self.pause(),
            ControlButton::StartResume => self.start_or_resume(),
            ControlButton::Reset => self.reset(),
            ControlButton::AddTimer => {
                let config = TimerConfig::entering(self.options.default_duration_secs);
                self.add_timer_at(self.active_index + 1, config)
            }
            ControlButton::RemoveTimer => self.remove_timer_at(self.active_index),
        }
    }

    /// Dispatch a key press to whichever component currently owns it.
    pub fn handle_key(&mut self, key: Key) -> Vec<Event> {
        if let Key::Char(ch) = key {
            return self.type_char(ch);
        }
        match self.keys.owner_of(key) {
            Some(KeyOwner::Sequence) => match key {
                Key::Enter => self.on_enter(),
                Key::ArrowUp => self.on_vertical(Vertical::Up),
                Key::ArrowDown => self.on_vertical(Vertical::Down),
                _ => Vec::new(),
            },
            Some(KeyOwner::Editor(_)) => self.on_horizontal(key),
            None => Vec::new(),
        }
    }

    /// Type into the focused digit field. Anything but a digit is ignored.
    pub fn type_char(&mut self, ch: char) -> Vec<Event> {
        let Some(editor) = self.editor.as_mut() else {
            return Vec::new();
        };
        let timer = editor.timer_index();
        let outcome = editor.input(ch, &mut self.fields);

        let EditOutcome::Changed { completion, .. } = outcome else {
            return Vec::new();
        };
        match completion {
            Completion::Pending => vec![self.focus_event()],
            Completion::GroupDone { duration_secs } => {
                let mut events = self.edit_duration_at(timer, duration_secs);
                events.push(self.focus_event());
                events
            }
            Completion::Committed { duration_secs } => {
                let mut events = self.edit_duration_at(timer, duration_secs);
                self.end_editing();
                events.push(self.focus_event());
                events
            }
        }
    }

    fn on_enter(&mut self) -> Vec<Event> {
        if let Some(button) = self.button {
            return self.activate(button);
        }
        if self.fields.is_focused() {
            return self.focus_button(ControlButton::StartResume);
        }
        if self.running {
            let mut events = self.pause();
            events.extend(self.focus_button(ControlButton::StartResume));
            return events;
        }
        self.start_or_resume()
    }

    fn on_vertical(&mut self, direction: Vertical) -> Vec<Event> {
        if self.running {
            return Vec::new();
        }
        let Some(index) = self.fields.index() else {
            return Vec::new();
        };
        let timer = index / SLOTS_PER_EDITOR;
        let target = match direction {
            Vertical::Up if timer == 0 => None,
            Vertical::Up => Some(index - SLOTS_PER_EDITOR),
            Vertical::Down if timer + 1 >= self.configs.len() => None,
            Vertical::Down => Some(index + SLOTS_PER_EDITOR),
        };
        match target {
            Some(target) => self.focus_field(target),
            None => self.focus_button(ControlButton::StartResume),
        }
    }

    fn on_horizontal(&mut self, key: Key) -> Vec<Event> {
        let Some(editor) = self.editor.as_ref() else {
            return Vec::new();
        };
        let transition = match key {
            Key::ArrowLeft => editor.move_left(&mut self.fields),
            Key::ArrowRight => editor.move_right(&mut self.fields),
            _ => FocusTransition::Unchanged,
        };
        if transition == FocusTransition::Unchanged {
            return Vec::new();
        }
        vec![self.focus_event()]
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn now(&mut self) -> Option<u64> {
        match self.clock.now_ms() {
            Ok(now) => Some(now),
            Err(e) => {
                if self.countdown.is_running() {
                    tracing::warn!(error = %e, index = self.active_index, "clock failed, countdown stalled");
                }
                self.countdown.stall();
                None
            }
        }
    }

    fn stalled_events(&self) -> Vec<Event> {
        vec![Event::TimerStalled {
            index: self.active_index,
            at: Utc::now(),
        }]
    }

    fn focus_event(&self) -> Event {
        Event::FocusChanged {
            focus: self.focus(),
            at: Utc::now(),
        }
    }

    /// Replace the countdown with a fresh one for the active entry.
    fn rebuild_countdown(&mut self) {
        let config = &self.configs[self.active_index];
        self.countdown = WallClockTimer::new(config.duration_secs);
        self.countdown_id = config.id;
    }

    /// Swap in the active entry's countdown if the active entry changed.
    /// The old countdown is dropped before the new one starts, so two never
    /// run at once.
    fn sync_countdown(&mut self) {
        if self.countdown_id == self.configs[self.active_index].id {
            return;
        }
        self.rebuild_countdown();
        if self.running {
            if let Some(now) = self.now() {
                self.countdown.start(now);
            }
        }
    }

    fn mount_editor(&mut self, timer: usize) {
        if self.editor.as_ref().map(|e| e.timer_index()) == Some(timer) {
            return;
        }
        self.end_editing();
        let duration = self.configs[timer].duration_secs;
        self.editor = Some(SegmentedTimeEditor::new(timer, duration));
        if let Err(e) = self.keys.bind_all(&EDITOR_KEYS, KeyOwner::Editor(timer)) {
            tracing::warn!(error = %e, timer, "editor could not capture arrow keys");
        }
    }

    /// Unmount the editor, release its keys and clear field focus.
    fn end_editing(&mut self) {
        if let Some(editor) = self.editor.take() {
            self.keys.release_all(KeyOwner::Editor(editor.timer_index()));
        }
        self.fields.clear();
    }

    fn persist(&self) {
        let Some(store) = self.store.as_ref() else {
            return;
        };
        let snapshot: Vec<StoredTimer> = self.configs.iter().map(StoredTimer::from).collect();
        if let Err(e) = store.set(SEQUENCE_KEY, &snapshot) {
            tracing::warn!(error = %e, "failed to persist sequence");
        }
    }
}
