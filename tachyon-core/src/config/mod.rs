//! Configuration types and persistence

pub mod persist;
pub mod types;

pub use persist::{PersistError, SETTINGS_BLOB_MAX, SETTINGS_MAGIC, SETTINGS_VERSION};
pub use types::{Settings, ThresholdRange, ViewMode, WarnField, WarnSettings, RPM_MAX};
