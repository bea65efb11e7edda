mod config;
mod controller;

pub use config::{StoredTimer, TimerConfig, TimerId};
pub use controller::{ControllerOptions, RunState, TimerSequenceController, SEQUENCE_KEY};
