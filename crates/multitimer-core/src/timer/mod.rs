mod countdown;

pub use countdown::{CountdownEvent, CountdownState, WallClockTimer};
