//! Presentation surface

use tachyon_protocol::TelemetrySnapshot;

use crate::alarm::AlarmFlags;
use crate::controller::StatusIndicators;

/// The rendering layer the core drives.
///
/// The surface owns all widget and layout concerns; the core only tells
/// it what changed. Implementations must keep visual output alive in
/// every state - suspending updates must never blank the display.
pub trait PresentationSurface {
    /// Render a fresh snapshot with its alarm flags
    fn show_snapshot(&mut self, snapshot: &TelemetrySnapshot, alarms: &AlarmFlags);

    /// Render the link-down placeholder (no valid telemetry)
    fn show_link_down(&mut self);

    /// Render the health/status indicators
    fn show_status(&mut self, status: &StatusIndicators);

    /// Shift alert became active; blink phase starts on
    fn shift_alert_enter(&mut self);

    /// Toggle the shift alert blink phase
    fn shift_alert_blink(&mut self, phase_on: bool);

    /// Shift alert ended; return to the normal view
    fn shift_alert_exit(&mut self);

    /// Stop normal refresh while maintenance mode runs
    fn suspend_updates(&mut self);

    /// Resume normal refresh
    fn resume_updates(&mut self);

    /// Draw the static maintenance screen once
    fn show_maintenance_screen(&mut self);

    /// Repaint everything on the next refresh
    fn force_redraw(&mut self);
}
