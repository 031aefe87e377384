//! Health indicators for the status surface

/// Degraded-status summary pushed to the presentation surface on the
/// status cadence.
///
/// Every fault in the engine lands here as a flag; nothing below this
/// struct halts the control loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusIndicators {
    /// A fresh frame arrived within the staleness window
    pub link_up: bool,
    /// Total bytes received on the telemetry link
    pub rx_bytes: u32,
    /// Milliseconds since the last received byte
    pub frame_age_ms: u32,
    /// Log storage present and writable
    pub storage_ok: bool,
    /// A log session is open
    pub recording: bool,
    /// Last decode fell back to a default for at least one field
    pub degraded: bool,
}
