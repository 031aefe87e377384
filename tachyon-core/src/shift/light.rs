//! Shift-light blink state machine
//!
//! Two states: Idle and Alerting. The alert engages when the shift light
//! is enabled, telemetry is valid and RPM has reached the configured
//! threshold; while engaged, the blink phase toggles on a fixed wall
//! clock cadence, independent of how often frames arrive.

use crate::time::elapsed_ms;

/// Blink phase toggle period while alerting
pub const SHIFT_BLINK_MS: u32 = 180;

/// One-shot signals for the presentation surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ShiftSignal {
    /// Alert engaged; blink phase starts on
    Enter,
    /// Blink phase flipped to the given state
    Blink(bool),
    /// Alert released
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShiftState {
    Idle,
    Alerting,
}

/// Shift-light controller.
///
/// Created at startup, ticked every loop iteration while the dashboard
/// is in normal mode; never persisted.
#[derive(Debug, Clone)]
pub struct ShiftLight {
    state: ShiftState,
    blink_on: bool,
    last_toggle_ms: u32,
}

impl Default for ShiftLight {
    fn default() -> Self {
        Self::new()
    }
}

impl ShiftLight {
    /// Create an idle shift light
    pub fn new() -> Self {
        Self {
            state: ShiftState::Idle,
            blink_on: false,
            last_toggle_ms: 0,
        }
    }

    /// True while the alert is engaged
    pub fn is_alerting(&self) -> bool {
        self.state == ShiftState::Alerting
    }

    /// Current blink phase (meaningful while alerting)
    pub fn blink_on(&self) -> bool {
        self.blink_on
    }

    /// Advance the state machine.
    ///
    /// `rpm` is `None` whenever telemetry is invalid - a stale link
    /// releases the alert just like dropping below the threshold.
    /// Returns at most one signal per call.
    pub fn tick(
        &mut self,
        now_ms: u32,
        rpm: Option<u16>,
        enabled: bool,
        threshold_rpm: u16,
    ) -> Option<ShiftSignal> {
        let engaged = enabled && rpm.is_some_and(|r| r >= threshold_rpm);

        match self.state {
            ShiftState::Idle => {
                if engaged {
                    self.state = ShiftState::Alerting;
                    self.blink_on = true;
                    self.last_toggle_ms = now_ms;
                    return Some(ShiftSignal::Enter);
                }
                None
            }
            ShiftState::Alerting => {
                if !engaged {
                    self.state = ShiftState::Idle;
                    return Some(ShiftSignal::Exit);
                }
                if elapsed_ms(now_ms, self.last_toggle_ms) >= SHIFT_BLINK_MS {
                    self.last_toggle_ms = now_ms;
                    self.blink_on = !self.blink_on;
                    return Some(ShiftSignal::Blink(self.blink_on));
                }
                None
            }
        }
    }
}
