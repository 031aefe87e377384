//! Fixed-offset decoding of the realtime-channels payload.
//!
//! The payload is a flat block of channel bytes; every field lives at a
//! fixed offset. Decoding is a pure function of the payload bytes, the
//! configured AFR encoding and the capture timestamp.

/// Minimum payload length accepted by [`decode`]
pub const MIN_PAYLOAD: usize = 40;

/// Raw-to-Celsius offset applied to both temperature channels
const TEMP_OFFSET: i16 = 40;

// Channel offsets into the payload block
const IDX_ENGINE: usize = 2;
const IDX_IAT: usize = 6;
const IDX_CLT: usize = 7;
const IDX_VBAT: usize = 9;
const IDX_AFR: usize = 10;
const IDX_RPM: usize = 14;
const IDX_ADVANCE: usize = 23;
const IDX_TPS: usize = 24;
const IDX_SPARK: usize = 31;

/// Wire encoding of the air/fuel-ratio channel.
///
/// Selected by configuration only; the decoder never guesses the format
/// from the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AfrFormat {
    /// 16-bit little-endian word in hundredths (1472 = 14.72)
    HundredthsU16,
    /// 16-bit little-endian word in tenths (147 = 14.7)
    TenthsU16,
    /// Single byte in tenths (147 = 14.7)
    #[default]
    TenthsU8,
}

impl AfrFormat {
    /// Decode the AFR channel from `payload`.
    ///
    /// Returns `None` when the payload is too short for this encoding;
    /// the caller degrades the field to its default instead of rejecting
    /// the whole payload.
    pub fn decode(self, payload: &[u8]) -> Option<f32> {
        match self {
            AfrFormat::HundredthsU16 => {
                let raw = u16_le(payload, IDX_AFR)?;
                Some(f32::from(raw) / 100.0)
            }
            AfrFormat::TenthsU16 => {
                let raw = u16_le(payload, IDX_AFR)?;
                Some(f32::from(raw) / 10.0)
            }
            AfrFormat::TenthsU8 => {
                let raw = *payload.get(IDX_AFR)?;
                Some(f32::from(raw) / 10.0)
            }
        }
    }
}

/// Engine status byte with named flag accessors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EngineStatus(pub u8);

impl EngineStatus {
    /// Warmup enrichment active (bit 3)
    pub fn warmup(self) -> bool {
        self.0 & (1 << 3) != 0
    }
}

/// Spark status byte with named flag accessors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SparkFlags(pub u8);

impl SparkFlags {
    /// Launch control engaged, either hard or soft limit (bit 0 or bit 1)
    pub fn launch(self) -> bool {
        self.0 & 0b11 != 0
    }
}

/// One fully decoded telemetry reading.
///
/// Immutable once produced; each successful decode replaces the previous
/// snapshot wholesale, never merges into it.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TelemetrySnapshot {
    /// Engine speed in RPM
    pub rpm: u16,
    /// Intake air temperature in °C
    pub iat_c: i16,
    /// Coolant temperature in °C
    pub clt_c: i16,
    /// Battery voltage in volts
    pub vbat: f32,
    /// Air/fuel ratio
    pub afr: f32,
    /// Throttle position, 0-100 %
    pub tps: u8,
    /// Ignition advance in degrees
    pub advance: i16,
    /// Warmup enrichment active
    pub warmup: bool,
    /// Launch control engaged
    pub launch: bool,
    /// Capture time, milliseconds on the control-loop clock
    pub timestamp_ms: u32,
    /// True when an optional field fell back to its default because the
    /// payload was too short for its offset
    pub degraded: bool,
}

fn u16_le(payload: &[u8], idx: usize) -> Option<u16> {
    let lo = *payload.get(idx)?;
    let hi = *payload.get(idx + 1)?;
    Some(u16::from(lo) | (u16::from(hi) << 8))
}

/// Decode a channels payload into a snapshot.
///
/// Rejects payloads shorter than [`MIN_PAYLOAD`] bytes. For accepted
/// payloads the decode is deterministic and total: every mandatory field
/// sits below the minimum length, and the AFR channel degrades to 0.0
/// rather than aborting when its offset is out of reach.
pub fn decode(payload: &[u8], afr_format: AfrFormat, now_ms: u32) -> Option<TelemetrySnapshot> {
    if payload.len() < MIN_PAYLOAD {
        return None;
    }

    let (afr, degraded) = match afr_format.decode(payload) {
        Some(v) => (v, false),
        None => (0.0, true),
    };

    Some(TelemetrySnapshot {
        rpm: u16_le(payload, IDX_RPM).unwrap_or(0),
        iat_c: i16::from(payload[IDX_IAT]) - TEMP_OFFSET,
        clt_c: i16::from(payload[IDX_CLT]) - TEMP_OFFSET,
        vbat: f32::from(payload[IDX_VBAT]) / 10.0,
        afr,
        tps: tps_percent(payload[IDX_TPS]),
        advance: i16::from(payload[IDX_ADVANCE]),
        warmup: EngineStatus(payload[IDX_ENGINE]).warmup(),
        launch: SparkFlags(payload[IDX_SPARK]).launch(),
        timestamp_ms: now_ms,
        degraded,
    })
}

/// Throttle raw byte to percent: half-resolution channel, rounded up and
/// clamped to 100
fn tps_percent(raw: u8) -> u8 {
    (((u16::from(raw)) + 1) / 2).min(100) as u8
}
