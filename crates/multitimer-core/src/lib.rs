//! # Multitimer Core Library
//!
//! Core logic for running an ordered sequence of countdown timers. The CLI
//! binary drives the same library a graphical front end would, so every
//! operation is available headless.
//!
//! ## Architecture
//!
//! - **Countdown**: a wall-clock state machine. Remaining time is always
//!   recomputed from an injected [`Clock`], so irregular ticks never drift.
//! - **Sequence controller**: owns the timer list, drives the active
//!   countdown and arbitrates keyboard focus between controls and editors.
//! - **Editing**: six single-digit fields per timer (`hh mm ss`) with soft
//!   validation and automatic focus advance.
//! - **Carousel**: centering and scroll reconciliation against injected
//!   geometry.
//! - **Storage**: SQLite key-value snapshot of the sequence and TOML
//!   configuration.
//!
//! ## Key Components
//!
//! - [`TimerSequenceController`]: the sequence state machine
//! - [`WallClockTimer`]: single countdown
//! - [`CarouselViewport`]: selection/scroll synchronisation
//! - [`Database`]: sequence persistence
//! - [`Config`]: application configuration management

pub mod carousel;
pub mod clock;
pub mod editor;
pub mod error;
pub mod events;
pub mod feedback;
pub mod focus;
pub mod keyboard;
pub mod sequence;
pub mod storage;
pub mod throttle;
pub mod timer;

pub use carousel::{CarouselEvent, CarouselViewport, Measure, Rect, ScrollDriver, ScrollRequest};
pub use clock::{Clock, ManualClock, SystemClock};
pub use editor::{Completion, EditOutcome, SegmentedTimeEditor, TimeGroup};
pub use error::{ClockError, ConfigError, CoreError, KeyError, StoreError};
pub use events::{ControlButton, Event, FocusTarget};
pub use feedback::{AudioPlayer, Feedback, NotificationStatus, Notifier};
pub use focus::{FocusSequencer, FocusTransition};
pub use keyboard::{Key, KeyOwner, KeyRegistry};
pub use sequence::{ControllerOptions, RunState, TimerConfig, TimerId, TimerSequenceController};
pub use storage::{Config, Database, MemoryStore, SequenceStore};
pub use timer::{CountdownState, WallClockTimer};
