use std::io::Write;
use std::time::Duration;

use async_trait::async_trait;
use multitimer_core::{
    AudioPlayer, Config, ControllerOptions, Database, Event, Feedback, Notifier, SystemClock,
    TimerSequenceController,
};
use tokio::time::MissedTickBehavior;

use super::format_duration;

/// Notifications printed to stdout. Always permitted.
struct TerminalNotifier;

#[async_trait]
impl Notifier for TerminalNotifier {
    fn is_supported(&self) -> bool {
        true
    }

    fn permission_granted(&self) -> bool {
        true
    }

    async fn request_permission(&self) -> bool {
        true
    }

    fn fire(&self, message: &str) {
        println!("notification: {message}");
    }
}

/// Terminal bell.
struct Bell;

impl AudioPlayer for Bell {
    fn play(&self) {
        let mut stdout = std::io::stdout();
        let _ = stdout.write_all(b"\x07");
        let _ = stdout.flush();
    }
}

type Controller = TimerSequenceController<SystemClock>;

pub fn run(restart_on_loop: bool, tick_ms: Option<u64>) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let mut options = ControllerOptions::from(&config);
    options.restart_on_loop |= restart_on_loop;
    let tick_ms = tick_ms.unwrap_or(config.timer.tick_interval_ms).max(1);

    let db = Database::open()?;
    let mut ctl = TimerSequenceController::load(SystemClock, Box::new(db), options);
    if let Some(index) = ctl.configs().iter().position(|t| t.duration_secs == 0) {
        return Err(format!("timer {index} has no duration; edit it before running").into());
    }
    let feedback = Feedback::new(TerminalNotifier, Bell, &config.feedback);
    tracing::debug!(tick_ms, timers = ctl.len(), "running sequence");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    runtime.block_on(drive(&mut ctl, &feedback, Duration::from_millis(tick_ms)));
    Ok(())
}

async fn drive(ctl: &mut Controller, feedback: &Feedback<TerminalNotifier, Bell>, every: Duration) {
    let mut interval = tokio::time::interval(every);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    report(feedback, &ctl.start());
    loop {
        interval.tick().await;
        let events = ctl.tick();
        report(feedback, &events);
        if events
            .iter()
            .any(|e| matches!(e, Event::SequenceCompleted { .. }))
        {
            break;
        }
        print_status(ctl);
    }
}

fn report(feedback: &Feedback<TerminalNotifier, Bell>, events: &[Event]) {
    for event in events {
        feedback.handle(event);
        match event {
            Event::TimerExpired { index, .. } => println!("timer {index} expired"),
            Event::SequenceLooped { .. } => println!("sequence restarted"),
            Event::SequenceCompleted { .. } => println!("sequence complete"),
            Event::TimerStalled { index, .. } => eprintln!("timer {index} stalled: clock unavailable"),
            _ => {}
        }
    }
}

fn print_status(ctl: &Controller) {
    println!(
        "[{}/{}] {} {:>3.0}%",
        ctl.active_index() + 1,
        ctl.len(),
        format_duration(ctl.remaining_secs()),
        ctl.countdown().progress() * 100.0
    );
}
