//! Recording admission gate and log cadence

pub mod gate;

pub use gate::{RecordError, Recorder, StartDenied, LOG_APPEND_MS, LOG_FLUSH_MS};
