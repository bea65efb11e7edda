use clap::Subcommand;
use multitimer_core::sequence::StoredTimer;
use multitimer_core::{
    Config, ControllerOptions, Database, SystemClock, TimerConfig, TimerSequenceController,
};

use super::{format_duration, parse_duration};

#[derive(Subcommand)]
pub enum SequenceAction {
    /// List the timers in order
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a timer
    Add {
        /// Duration as SS, MM:SS or HH:MM:SS
        duration: String,
        /// Position to insert at (default: end)
        #[arg(long)]
        at: Option<usize>,
    },
    /// Remove the timer at a position
    Remove {
        /// Zero-based position
        index: usize,
    },
    /// Change a timer's duration
    Edit {
        /// Zero-based position
        index: usize,
        /// Duration as SS, MM:SS or HH:MM:SS
        duration: String,
    },
    /// Regenerate timer ids and rewind to the first timer
    Reset,
}

fn open_controller() -> Result<TimerSequenceController<SystemClock>, Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let db = Database::open()?;
    Ok(TimerSequenceController::load(
        SystemClock,
        Box::new(db),
        ControllerOptions::from(&config),
    ))
}

fn print_list(ctl: &TimerSequenceController<SystemClock>) {
    for (i, timer) in ctl.configs().iter().enumerate() {
        println!("{i}  {}  {}", format_duration(timer.duration_secs), timer.id);
    }
}

pub fn run(action: SequenceAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut ctl = open_controller()?;

    match action {
        SequenceAction::List { json } => {
            if json {
                let timers: Vec<StoredTimer> = ctl.configs().iter().map(StoredTimer::from).collect();
                println!("{}", serde_json::to_string_pretty(&timers)?);
            } else {
                print_list(&ctl);
            }
        }
        SequenceAction::Add { duration, at } => {
            let secs = parse_duration(&duration)?;
            let index = at.unwrap_or(ctl.len());
            ctl.add_timer_at(index, TimerConfig::new(secs));
            print_list(&ctl);
        }
        SequenceAction::Remove { index } => {
            if index >= ctl.len() {
                return Err(format!("no timer at position {index}").into());
            }
            if ctl.remove_timer_at(index).is_empty() {
                eprintln!("the last timer cannot be removed");
            }
            print_list(&ctl);
        }
        SequenceAction::Edit { index, duration } => {
            if index >= ctl.len() {
                return Err(format!("no timer at position {index}").into());
            }
            let secs = parse_duration(&duration)?;
            ctl.edit_duration_at(index, secs);
            print_list(&ctl);
        }
        SequenceAction::Reset => {
            ctl.reset();
            print_list(&ctl);
        }
    }
    Ok(())
}
