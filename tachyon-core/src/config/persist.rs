//! Settings persistence blob
//!
//! The settings aggregate is stored as a small postcard-encoded record
//! with a magic/version header for validation. Config-store
//! implementations keep this blob in whatever medium they own (flash
//! page, NVS entry, file) and hand the raw bytes back here.

use serde::{Deserialize, Serialize};

use super::types::Settings;

/// Magic number identifying a settings blob ("TACH")
pub const SETTINGS_MAGIC: u32 = 0x5441_4348;

/// Current blob format version
pub const SETTINGS_VERSION: u8 = 1;

/// Upper bound on the encoded blob size; sized for the current record
/// with headroom for future fields
pub const SETTINGS_BLOB_MAX: usize = 128;

/// Errors that can occur encoding or decoding the blob
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PersistError {
    /// Output buffer too small for the record
    BufferTooSmall,
    /// Bytes are not a valid settings record
    Corrupt,
    /// Record carries a version this firmware cannot read
    UnsupportedVersion,
}

#[derive(Serialize, Deserialize)]
struct SettingsRecord {
    magic: u32,
    version: u8,
    settings: Settings,
}

/// Encode `settings` into `buf`, returning the number of bytes written
pub fn encode(settings: &Settings, buf: &mut [u8]) -> Result<usize, PersistError> {
    let record = SettingsRecord {
        magic: SETTINGS_MAGIC,
        version: SETTINGS_VERSION,
        settings: *settings,
    };
    let used = postcard::to_slice(&record, buf).map_err(|_| PersistError::BufferTooSmall)?;
    Ok(used.len())
}

/// Decode a settings blob, validating its header
pub fn decode(bytes: &[u8]) -> Result<Settings, PersistError> {
    let record: SettingsRecord = postcard::from_bytes(bytes).map_err(|_| PersistError::Corrupt)?;

    if record.magic != SETTINGS_MAGIC {
        return Err(PersistError::Corrupt);
    }
    if record.version != SETTINGS_VERSION {
        return Err(PersistError::UnsupportedVersion);
    }

    Ok(record.settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ThresholdRange, WarnField};
    use tachyon_protocol::AfrFormat;

    #[test]
    fn test_roundtrip() {
        let mut settings = Settings::default();
        settings.shift_rpm = 7200;
        settings.afr_format = AfrFormat::HundredthsU16;
        settings
            .warn
            .set_range(WarnField::Battery, ThresholdRange::new(false, 12.0, 14.8));

        let mut buf = [0u8; SETTINGS_BLOB_MAX];
        let len = encode(&settings, &mut buf).unwrap();
        let decoded = decode(&buf[..len]).unwrap();

        assert_eq!(decoded, settings);
    }

    #[test]
    fn test_blob_fits_bound() {
        let mut buf = [0u8; SETTINGS_BLOB_MAX];
        let len = encode(&Settings::default(), &mut buf).unwrap();
        assert!(len <= SETTINGS_BLOB_MAX);
    }

    #[test]
    fn test_rejects_wrong_magic() {
        let mut buf = [0u8; SETTINGS_BLOB_MAX];
        let len = encode(&Settings::default(), &mut buf).unwrap();
        buf[0] ^= 0xFF;
        assert!(decode(&buf[..len]).is_err());
    }

    #[test]
    fn test_rejects_truncated_blob() {
        let mut buf = [0u8; SETTINGS_BLOB_MAX];
        let len = encode(&Settings::default(), &mut buf).unwrap();
        assert_eq!(decode(&buf[..len - 1]), Err(PersistError::Corrupt));
    }

    #[test]
    fn test_rejects_future_version() {
        let mut buf = [0u8; SETTINGS_BLOB_MAX];
        let len = encode(&Settings::default(), &mut buf).unwrap();
        // The version byte sits right after the 5-byte varint magic.
        assert_eq!(buf[5], SETTINGS_VERSION);
        buf[5] = SETTINGS_VERSION + 1;
        assert_eq!(decode(&buf[..len]), Err(PersistError::UnsupportedVersion));
    }
}
