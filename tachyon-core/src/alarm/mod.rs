//! Threshold monitoring and alarm flags

pub mod monitor;

pub use monitor::{out_of_range, AlarmFlags};
