//! End-to-end tests for the timer sequence.
//!
//! Drive a controller the way a front end would: a manual clock jumps
//! irregularly between ticks, keys arrive through `handle_key`, and the
//! sequence is persisted to a real SQLite file.

use multitimer_core::sequence::SEQUENCE_KEY;
use multitimer_core::{
    ControlButton, ControllerOptions, Database, Event, FocusTarget, Key, ManualClock, RunState,
    SequenceStore, TimerConfig, TimerSequenceController,
};

const T0: u64 = 1_700_000_000_000;

// ============================================================================
// Test Helpers
// ============================================================================

fn options(restart_on_loop: bool) -> ControllerOptions {
    ControllerOptions {
        restart_on_loop,
        default_duration_secs: 300,
    }
}

fn sequence(durations: &[u64], restart_on_loop: bool) -> (TimerSequenceController<ManualClock>, ManualClock) {
    let clock = ManualClock::new(T0);
    let configs = durations.iter().map(|&d| TimerConfig::new(d)).collect();
    let ctl = TimerSequenceController::new(clock.clone(), configs, options(restart_on_loop));
    (ctl, clock)
}

/// Tick once per `step_ms` until `total_ms` has passed, collecting events.
fn run_for(
    ctl: &mut TimerSequenceController<ManualClock>,
    clock: &ManualClock,
    total_ms: u64,
    step_ms: u64,
) -> Vec<Event> {
    let mut events = Vec::new();
    let mut elapsed = 0;
    while elapsed < total_ms {
        let step = step_ms.min(total_ms - elapsed);
        clock.advance_ms(step);
        elapsed += step;
        events.extend(ctl.tick());
    }
    events
}

fn type_digits(ctl: &mut TimerSequenceController<ManualClock>, digits: &str) {
    for ch in digits.chars() {
        ctl.handle_key(Key::Char(ch));
    }
}

// ============================================================================
// Advancement
// ============================================================================

#[test]
fn three_timers_run_to_completion() {
    let (mut ctl, clock) = sequence(&[5, 5, 5], false);
    ctl.start();
    let mut seen = vec![ctl.active_index()];
    for _ in 0..3 {
        run_for(&mut ctl, &clock, 5_000, 1_000);
        seen.push(ctl.active_index());
    }
    assert_eq!(seen, vec![0, 1, 2, 2]);
    assert!(!ctl.is_running());
}

#[test]
fn three_timers_loop_when_restart_enabled() {
    let (mut ctl, clock) = sequence(&[5, 5, 5], true);
    ctl.start();
    let events = run_for(&mut ctl, &clock, 15_000, 1_000);
    assert_eq!(ctl.active_index(), 0);
    assert!(ctl.is_running());
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, Event::SequenceLooped { .. }))
            .count(),
        1
    );
}

#[test]
fn irregular_ticks_do_not_drift() {
    let (mut ctl, clock) = sequence(&[60], false);
    ctl.start();
    for step in [130, 2_870, 7, 993, 4_000, 12_000] {
        clock.advance_ms(step);
        ctl.tick();
    }
    // 20s elapsed in total.
    assert_eq!(ctl.remaining_secs(), 40);
}

#[test]
fn pause_resume_accumulates_only_running_time() {
    let (mut ctl, clock) = sequence(&[30], false);
    ctl.start();
    clock.advance_secs(4);
    ctl.pause();
    clock.advance_secs(60);
    ctl.resume();
    clock.advance_secs(6);
    ctl.tick();
    assert_eq!(ctl.remaining_secs(), 20);
}

// ============================================================================
// Editing
// ============================================================================

#[test]
fn focusing_a_field_mid_run_pauses_before_any_digit() {
    let (mut ctl, clock) = sequence(&[120, 120], false);
    ctl.start();
    clock.advance_secs(30);
    ctl.focus_field(4);
    assert_eq!(ctl.run_state(), RunState::Editing);
    let frozen = ctl.remaining_secs();
    clock.advance_secs(30);
    ctl.tick();
    assert_eq!(ctl.remaining_secs(), frozen);
    assert_eq!(frozen, 90);
}

#[test]
fn full_edit_commits_and_enter_resumes() {
    let (mut ctl, clock) = sequence(&[120], false);
    ctl.start();
    clock.advance_secs(10);
    ctl.focus_field(0);
    type_digits(&mut ctl, "000045");
    assert_eq!(ctl.configs()[0].duration_secs, 45);
    assert_eq!(ctl.focus(), FocusTarget::None);

    // Nothing focused and not running: Enter resumes the live countdown.
    ctl.handle_key(Key::Enter);
    assert!(ctl.is_running());
    clock.advance_secs(5);
    ctl.tick();
    assert_eq!(ctl.remaining_secs(), 40);
}

#[test]
fn arrow_navigation_across_timers() {
    let (mut ctl, _) = sequence(&[60, 60], false);
    ctl.focus_field(2);
    ctl.handle_key(Key::ArrowRight);
    ctl.handle_key(Key::ArrowDown);
    assert_eq!(ctl.focus(), FocusTarget::Field(9));
    ctl.handle_key(Key::ArrowDown);
    assert_eq!(ctl.focus(), FocusTarget::Button(ControlButton::StartResume));
    ctl.handle_key(Key::Enter);
    assert!(ctl.is_running());
}

// ============================================================================
// Persistence
// ============================================================================

#[test]
fn sequence_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("multitimer.db");

    {
        let db = Database::open_path(&path).unwrap();
        let mut ctl =
            TimerSequenceController::load(ManualClock::new(T0), Box::new(db), options(false));
        assert_eq!(ctl.len(), 1);
        ctl.edit_duration_at(0, 25 * 60);
        ctl.add_timer_at(1, TimerConfig::new(5 * 60));
        ctl.activate(ControlButton::AddTimer);
    }

    let db = Database::open_path(&path).unwrap();
    let stored = db.get(SEQUENCE_KEY).unwrap().unwrap();
    assert_eq!(stored.len(), 3);

    let ctl = TimerSequenceController::load(ManualClock::new(T0), Box::new(db), options(false));
    let durations: Vec<u64> = ctl.configs().iter().map(|c| c.duration_secs).collect();
    assert_eq!(durations, vec![25 * 60, 5 * 60, 300]);
    assert_eq!(ctl.active_index(), 0);
    assert!(!ctl.is_running());
}

#[test]
fn corrupt_snapshot_falls_back_to_default() {
    let db = Database::open_memory().unwrap();
    db.kv_set(SEQUENCE_KEY, "not json").unwrap();
    let ctl = TimerSequenceController::load(ManualClock::new(T0), Box::new(db), options(false));
    assert_eq!(ctl.len(), 1);
    assert_eq!(ctl.configs()[0].duration_secs, 300);
}

#[test]
fn snapshot_event_serializes_with_type_tag() {
    let (ctl, _) = sequence(&[10], false);
    let json = serde_json::to_value(ctl.snapshot()).unwrap();
    assert_eq!(json["type"], "StateSnapshot");
    assert_eq!(json["state"], "idle");
    assert_eq!(json["timer_count"], 1);
}
