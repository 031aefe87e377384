//! Threshold evaluation
//!
//! Each monitored channel is checked independently against its
//! configured range on every snapshot. Flags carry no history; boundary
//! flicker is the presentation layer's problem, not ours.

use tachyon_protocol::TelemetrySnapshot;

use crate::config::{ThresholdRange, WarnField, WarnSettings};

/// True when monitoring is enabled and the value lies outside the
/// closed interval `[min, max]`
pub fn out_of_range(range: &ThresholdRange, value: f32) -> bool {
    range.enabled && (value < range.min || value > range.max)
}

/// Alarm flags, one per monitored channel.
///
/// Recomputed wholesale from each snapshot; never merged with the
/// previous evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlarmFlags {
    /// Air/fuel ratio out of range
    pub afr: bool,
    /// Battery voltage out of range
    pub battery: bool,
    /// Intake air temperature out of range
    pub intake_temp: bool,
    /// Coolant temperature out of range
    pub coolant_temp: bool,
    /// Throttle position out of range
    pub throttle: bool,
    /// Ignition advance out of range
    pub advance: bool,
}

impl AlarmFlags {
    /// Evaluate every channel of `snapshot` against its warn range
    pub fn evaluate(snapshot: &TelemetrySnapshot, warn: &WarnSettings) -> Self {
        Self {
            afr: out_of_range(&warn.range(WarnField::Afr), snapshot.afr),
            battery: out_of_range(&warn.range(WarnField::Battery), snapshot.vbat),
            intake_temp: out_of_range(
                &warn.range(WarnField::IntakeTemp),
                f32::from(snapshot.iat_c),
            ),
            coolant_temp: out_of_range(
                &warn.range(WarnField::CoolantTemp),
                f32::from(snapshot.clt_c),
            ),
            throttle: out_of_range(&warn.range(WarnField::Throttle), f32::from(snapshot.tps)),
            advance: out_of_range(&warn.range(WarnField::Advance), f32::from(snapshot.advance)),
        }
    }

    /// Flag state for one channel
    pub fn is_raised(&self, field: WarnField) -> bool {
        match field {
            WarnField::Afr => self.afr,
            WarnField::Battery => self.battery,
            WarnField::IntakeTemp => self.intake_temp,
            WarnField::CoolantTemp => self.coolant_temp,
            WarnField::Throttle => self.throttle,
            WarnField::Advance => self.advance,
        }
    }

    /// True when any channel is alarming
    pub fn any(&self) -> bool {
        WarnField::ALL.iter().any(|&f| self.is_raised(f))
    }
}
