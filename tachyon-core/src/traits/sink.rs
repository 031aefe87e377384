//! Telemetry log sink

use tachyon_protocol::TelemetrySnapshot;

/// Errors that can occur writing the telemetry log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SinkError {
    /// Storage medium missing or not mounted
    Unavailable,
    /// Could not create the session log
    OpenFailed,
    /// Row or flush write failed
    WriteFailed,
}

/// Destination for recorded telemetry rows.
///
/// Implementations typically write one CSV file per session on removable
/// storage. The recording gate owns the open/append/flush/close
/// lifecycle; the mode arbiter closes the sink before maintenance mode
/// takes over the storage handle.
pub trait LogSink {
    /// True when the storage medium is present and writable
    fn is_available(&self) -> bool;

    /// Create the log for the given session identifier
    fn open(&mut self, session_id: u32) -> Result<(), SinkError>;

    /// Append one snapshot row to the open log
    fn append_row(&mut self, snapshot: &TelemetrySnapshot) -> Result<(), SinkError>;

    /// Push buffered rows to durable storage
    fn flush(&mut self) -> Result<(), SinkError>;

    /// Close the open log, if any
    fn close(&mut self);
}
