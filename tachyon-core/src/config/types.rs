//! Configuration type definitions
//!
//! These types represent the persisted dashboard settings. The settings
//! aggregate is stored as a postcard-serialized binary blob (see
//! [`persist`](super::persist)); the session counter is stored next to
//! it but advanced independently by the recording gate.

use serde::{Deserialize, Serialize};
use tachyon_protocol::AfrFormat;

/// Ceiling for the shift-light RPM threshold (tach full scale)
pub const RPM_MAX: u16 = 8000;

/// Inclusive operating band for one monitored channel.
///
/// A value strictly inside `min..=max` is healthy; anything outside
/// raises the channel's alarm flag while the range is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ThresholdRange {
    /// Monitoring enabled for this channel
    pub enabled: bool,
    /// Lower bound (inclusive)
    pub min: f32,
    /// Upper bound (inclusive)
    pub max: f32,
}

impl ThresholdRange {
    /// Create a range
    pub const fn new(enabled: bool, min: f32, max: f32) -> Self {
        Self { enabled, min, max }
    }
}

/// Monitored channels with a configurable warn range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WarnField {
    /// Air/fuel ratio
    Afr,
    /// Battery voltage
    Battery,
    /// Intake air temperature
    IntakeTemp,
    /// Coolant temperature
    CoolantTemp,
    /// Throttle position
    Throttle,
    /// Ignition advance
    Advance,
}

impl WarnField {
    /// Number of monitored channels
    pub const COUNT: usize = 6;

    /// All channels in display order
    pub const ALL: [WarnField; Self::COUNT] = [
        WarnField::Afr,
        WarnField::Battery,
        WarnField::IntakeTemp,
        WarnField::CoolantTemp,
        WarnField::Throttle,
        WarnField::Advance,
    ];

    /// Short label for settings rows and log headers
    pub fn label(self) -> &'static str {
        match self {
            WarnField::Afr => "AFR",
            WarnField::Battery => "VBAT",
            WarnField::IntakeTemp => "IAT",
            WarnField::CoolantTemp => "CLT",
            WarnField::Throttle => "TPS",
            WarnField::Advance => "ADV",
        }
    }

    /// Increment used by range editors
    pub fn edit_step(self) -> f32 {
        match self {
            WarnField::Afr | WarnField::Battery => 0.1,
            _ => 1.0,
        }
    }

    fn index(self) -> usize {
        match self {
            WarnField::Afr => 0,
            WarnField::Battery => 1,
            WarnField::IntakeTemp => 2,
            WarnField::CoolantTemp => 3,
            WarnField::Throttle => 4,
            WarnField::Advance => 5,
        }
    }
}

/// Warn ranges for all monitored channels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WarnSettings {
    ranges: [ThresholdRange; WarnField::COUNT],
}

impl WarnSettings {
    /// Range for one channel
    pub fn range(&self, field: WarnField) -> ThresholdRange {
        self.ranges[field.index()]
    }

    /// Replace the range for one channel
    pub fn set_range(&mut self, field: WarnField, range: ThresholdRange) {
        self.ranges[field.index()] = range;
    }

    /// Collapse any inverted range to its midpoint.
    ///
    /// Editors can momentarily push min past max; a degenerate
    /// single-point band is kept instead of an empty one.
    pub fn normalize(&mut self) {
        for range in &mut self.ranges {
            if range.min > range.max {
                let mid = 0.5 * (range.min + range.max);
                range.min = mid;
                range.max = mid;
            }
        }
    }
}

impl Default for WarnSettings {
    fn default() -> Self {
        let mut ranges = [ThresholdRange::new(false, 0.0, 0.0); WarnField::COUNT];
        ranges[WarnField::Afr.index()] = ThresholdRange::new(true, 10.0, 16.5);
        ranges[WarnField::Battery.index()] = ThresholdRange::new(true, 11.5, 15.2);
        ranges[WarnField::IntakeTemp.index()] = ThresholdRange::new(true, -10.0, 60.0);
        ranges[WarnField::CoolantTemp.index()] = ThresholdRange::new(true, 0.0, 105.0);
        ranges[WarnField::Throttle.index()] = ThresholdRange::new(false, 0.0, 100.0);
        ranges[WarnField::Advance.index()] = ThresholdRange::new(false, -10.0, 50.0);
        Self { ranges }
    }
}

/// Main gauge layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ViewMode {
    /// Round tachometer with side tiles
    #[default]
    Ring,
    /// Horizontal RPM bar with tile grid
    Bar,
}

/// Persisted dashboard settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Settings {
    /// Warn ranges per monitored channel
    pub warn: WarnSettings,
    /// Shift light armed
    pub shift_enabled: bool,
    /// Shift light RPM threshold
    pub shift_rpm: u16,
    /// Gauge layout
    pub view_mode: ViewMode,
    /// Telemetry logging allowed
    pub log_enabled: bool,
    /// Wire encoding of the AFR channel
    pub afr_format: AfrFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            warn: WarnSettings::default(),
            shift_enabled: true,
            shift_rpm: 6500,
            view_mode: ViewMode::Ring,
            log_enabled: true,
            afr_format: AfrFormat::TenthsU8,
        }
    }
}

impl Settings {
    /// Repair values an editor or a stale blob may have left inconsistent
    pub fn normalize(&mut self) {
        self.warn.normalize();
        if self.shift_rpm > RPM_MAX {
            self.shift_rpm = RPM_MAX;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_warn_ranges() {
        let warn = WarnSettings::default();
        assert!(warn.range(WarnField::Afr).enabled);
        assert!((warn.range(WarnField::Afr).min - 10.0).abs() < 1e-6);
        assert!(!warn.range(WarnField::Throttle).enabled);
        assert!(!warn.range(WarnField::Advance).enabled);
    }

    #[test]
    fn test_normalize_collapses_inverted_range() {
        let mut warn = WarnSettings::default();
        warn.set_range(WarnField::Afr, ThresholdRange::new(true, 16.0, 10.0));
        warn.normalize();

        let range = warn.range(WarnField::Afr);
        assert!((range.min - 13.0).abs() < 1e-6);
        assert!((range.max - 13.0).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_clamps_shift_rpm() {
        let mut settings = Settings {
            shift_rpm: 9000,
            ..Settings::default()
        };
        settings.normalize();
        assert_eq!(settings.shift_rpm, RPM_MAX);
    }

    #[test]
    fn test_edit_steps() {
        assert!((WarnField::Afr.edit_step() - 0.1).abs() < 1e-6);
        assert!((WarnField::Battery.edit_step() - 0.1).abs() < 1e-6);
        assert!((WarnField::CoolantTemp.edit_step() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_labels_unique() {
        for (i, a) in WarnField::ALL.iter().enumerate() {
            for b in &WarnField::ALL[i + 1..] {
                assert_ne!(a.label(), b.label());
            }
        }
    }
}
