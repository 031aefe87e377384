//! Persisted-settings store

use crate::config::Settings;

/// Errors that can occur accessing the settings store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Backing store not present or not initialized
    Unavailable,
    /// Stored data missing or unreadable
    ReadFailed,
    /// Write or commit did not complete
    WriteFailed,
}

/// Typed access to the persisted configuration.
///
/// Writes are batched: callers bracket a group of `store_*` calls with
/// `begin` and `commit`, and nothing is durable until `commit` returns.
/// The session counter is kept separate from the settings aggregate so
/// the recording gate can advance it alone, without rewriting the rest.
pub trait ConfigStore {
    /// Open a write batch
    fn begin(&mut self) -> Result<(), ConfigError>;

    /// Make all writes since `begin` durable
    fn commit(&mut self) -> Result<(), ConfigError>;

    /// Load the settings aggregate
    fn load_settings(&mut self) -> Result<Settings, ConfigError>;

    /// Stage the settings aggregate for the current batch
    fn store_settings(&mut self, settings: &Settings) -> Result<(), ConfigError>;

    /// Current value of the monotonically increasing log-session counter
    fn session_counter(&mut self) -> Result<u32, ConfigError>;

    /// Stage a new session-counter value for the current batch
    fn store_session_counter(&mut self, value: u32) -> Result<(), ConfigError>;
}
