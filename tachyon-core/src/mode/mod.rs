//! Operating-mode arbitration

pub mod arbiter;

pub use arbiter::{ModeArbiter, OperatingMode, SharedResources, MODE_SAMPLE_MS};
