//! Shift-light state machine

pub mod light;

pub use light::{ShiftLight, ShiftSignal, SHIFT_BLINK_MS};
