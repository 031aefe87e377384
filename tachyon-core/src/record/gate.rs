//! Recording gate
//!
//! Admission control for appending snapshots to the log sink, plus the
//! append/flush cadence once a session is open. Session identifiers come
//! from the config store and are durably advanced *before* the first
//! write, so a power cut between open and commit can never reissue a
//! session number.

use tachyon_protocol::TelemetrySnapshot;

use crate::config::Settings;
use crate::mode::OperatingMode;
use crate::time::Interval;
use crate::traits::{ConfigError, ConfigStore, LogSink, SinkError};

/// Snapshot row cadence while recording
pub const LOG_APPEND_MS: u32 = 100;

/// Periodic sink flush cadence while recording
pub const LOG_FLUSH_MS: u32 = 1000;

/// Why a recording could not start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StartDenied {
    /// Logging switched off in the settings
    LoggingDisabledByConfig,
    /// Storage medium missing or not writable
    StorageUnavailable,
    /// A session is already open
    AlreadyRecording,
    /// Maintenance mode owns the storage handle
    MaintenanceBusy,
}

/// Errors surfaced by [`Recorder::start`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RecordError {
    /// Admission denied; nothing was touched
    Denied(StartDenied),
    /// Session counter could not be advanced durably
    Config(ConfigError),
    /// Sink rejected the session
    Sink(SinkError),
}

impl From<ConfigError> for RecordError {
    fn from(err: ConfigError) -> Self {
        RecordError::Config(err)
    }
}

impl From<SinkError> for RecordError {
    fn from(err: SinkError) -> Self {
        RecordError::Sink(err)
    }
}

/// Recording gate and cadence driver
#[derive(Debug, Clone)]
pub struct Recorder {
    recording: bool,
    append: Interval,
    flush: Interval,
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new()
    }
}

impl Recorder {
    /// Create a stopped recorder
    pub fn new() -> Self {
        Self {
            recording: false,
            append: Interval::new(LOG_APPEND_MS),
            flush: Interval::new(LOG_FLUSH_MS),
        }
    }

    /// True while a session is open
    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Check whether a new session could start right now
    pub fn can_start(
        &self,
        settings: &Settings,
        sink_available: bool,
        mode: OperatingMode,
    ) -> Result<(), StartDenied> {
        if !settings.log_enabled {
            return Err(StartDenied::LoggingDisabledByConfig);
        }
        if !sink_available {
            return Err(StartDenied::StorageUnavailable);
        }
        if self.recording {
            return Err(StartDenied::AlreadyRecording);
        }
        if mode == OperatingMode::Portal {
            return Err(StartDenied::MaintenanceBusy);
        }
        Ok(())
    }

    /// Start a new session, returning its identifier.
    ///
    /// The session counter is incremented and committed before the sink
    /// is opened.
    pub fn start<K: LogSink, F: ConfigStore>(
        &mut self,
        now_ms: u32,
        settings: &Settings,
        mode: OperatingMode,
        sink: &mut K,
        config: &mut F,
    ) -> Result<u32, RecordError> {
        self.can_start(settings, sink.is_available(), mode)
            .map_err(RecordError::Denied)?;

        let session_id = config.session_counter()?;
        config.begin()?;
        config.store_session_counter(session_id.wrapping_add(1))?;
        config.commit()?;

        sink.open(session_id)?;
        self.recording = true;
        self.append.restart(now_ms);
        self.flush.restart(now_ms);
        Ok(session_id)
    }

    /// True when a row may be appended right now
    pub fn can_append(&self, sink_available: bool, mode: OperatingMode) -> bool {
        self.recording && sink_available && mode != OperatingMode::Portal
    }

    /// Append and flush on their cadences.
    ///
    /// Write errors are not surfaced here; a failing medium shows up as
    /// unavailable on the next tick and appends stop.
    pub fn maybe_append<K: LogSink>(
        &mut self,
        now_ms: u32,
        snapshot: &TelemetrySnapshot,
        sink: &mut K,
        mode: OperatingMode,
    ) {
        if !self.can_append(sink.is_available(), mode) {
            return;
        }
        if self.append.ready(now_ms) {
            let _ = sink.append_row(snapshot);
        }
        if self.flush.ready(now_ms) {
            let _ = sink.flush();
        }
    }

    /// Close the open session, if any. Idempotent.
    pub fn stop<K: LogSink>(&mut self, sink: &mut K) {
        if self.recording {
            let _ = sink.flush();
            sink.close();
            self.recording = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::vec::Vec;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Op {
        Begin,
        StoreCounter(u32),
        Commit,
        Open(u32),
        Append,
        Flush,
        Close,
    }

    struct MockStore {
        counter: u32,
        ops: Rc<RefCell<Vec<Op>>>,
    }

    impl ConfigStore for MockStore {
        fn begin(&mut self) -> Result<(), ConfigError> {
            self.ops.borrow_mut().push(Op::Begin);
            Ok(())
        }
        fn commit(&mut self) -> Result<(), ConfigError> {
            self.ops.borrow_mut().push(Op::Commit);
            Ok(())
        }
        fn load_settings(&mut self) -> Result<Settings, ConfigError> {
            Ok(Settings::default())
        }
        fn store_settings(&mut self, _settings: &Settings) -> Result<(), ConfigError> {
            Ok(())
        }
        fn session_counter(&mut self) -> Result<u32, ConfigError> {
            Ok(self.counter)
        }
        fn store_session_counter(&mut self, value: u32) -> Result<(), ConfigError> {
            self.counter = value;
            self.ops.borrow_mut().push(Op::StoreCounter(value));
            Ok(())
        }
    }

    struct MockSink {
        available: bool,
        ops: Rc<RefCell<Vec<Op>>>,
    }

    impl LogSink for MockSink {
        fn is_available(&self) -> bool {
            self.available
        }
        fn open(&mut self, session_id: u32) -> Result<(), SinkError> {
            self.ops.borrow_mut().push(Op::Open(session_id));
            Ok(())
        }
        fn append_row(&mut self, _snapshot: &TelemetrySnapshot) -> Result<(), SinkError> {
            self.ops.borrow_mut().push(Op::Append);
            Ok(())
        }
        fn flush(&mut self) -> Result<(), SinkError> {
            self.ops.borrow_mut().push(Op::Flush);
            Ok(())
        }
        fn close(&mut self) {
            self.ops.borrow_mut().push(Op::Close);
        }
    }

    fn rig(counter: u32, available: bool) -> (MockStore, MockSink, Rc<RefCell<Vec<Op>>>) {
        let ops = Rc::new(RefCell::new(Vec::new()));
        (
            MockStore {
                counter,
                ops: ops.clone(),
            },
            MockSink {
                available,
                ops: ops.clone(),
            },
            ops,
        )
    }

    fn snapshot() -> TelemetrySnapshot {
        TelemetrySnapshot {
            rpm: 3000,
            iat_c: 25,
            clt_c: 85,
            vbat: 13.8,
            afr: 14.7,
            tps: 20,
            advance: 18,
            warmup: false,
            launch: false,
            timestamp_ms: 0,
            degraded: false,
        }
    }

    #[test]
    fn test_denied_when_logging_disabled() {
        let recorder = Recorder::new();
        let settings = Settings {
            log_enabled: false,
            ..Settings::default()
        };
        assert_eq!(
            recorder.can_start(&settings, true, OperatingMode::Normal),
            Err(StartDenied::LoggingDisabledByConfig)
        );
    }

    #[test]
    fn test_denied_when_storage_unavailable() {
        let recorder = Recorder::new();
        assert_eq!(
            recorder.can_start(&Settings::default(), false, OperatingMode::Normal),
            Err(StartDenied::StorageUnavailable)
        );
    }

    #[test]
    fn test_denied_in_maintenance_mode() {
        let recorder = Recorder::new();
        assert_eq!(
            recorder.can_start(&Settings::default(), true, OperatingMode::Portal),
            Err(StartDenied::MaintenanceBusy)
        );
    }

    #[test]
    fn test_denied_while_already_recording() {
        let mut recorder = Recorder::new();
        let (mut store, mut sink, _ops) = rig(1, true);
        recorder
            .start(0, &Settings::default(), OperatingMode::Normal, &mut sink, &mut store)
            .unwrap();

        assert_eq!(
            recorder.can_start(&Settings::default(), true, OperatingMode::Normal),
            Err(StartDenied::AlreadyRecording)
        );
    }

    #[test]
    fn test_counter_committed_before_open() {
        let mut recorder = Recorder::new();
        let (mut store, mut sink, ops) = rig(7, true);

        let session = recorder
            .start(0, &Settings::default(), OperatingMode::Normal, &mut sink, &mut store)
            .unwrap();

        assert_eq!(session, 7);
        assert_eq!(
            &*ops.borrow(),
            &[Op::Begin, Op::StoreCounter(8), Op::Commit, Op::Open(7)]
        );
    }

    #[test]
    fn test_append_cadence() {
        let mut recorder = Recorder::new();
        let (mut store, mut sink, ops) = rig(1, true);
        recorder
            .start(1000, &Settings::default(), OperatingMode::Normal, &mut sink, &mut store)
            .unwrap();
        ops.borrow_mut().clear();

        let snap = snapshot();
        recorder.maybe_append(1050, &snap, &mut sink, OperatingMode::Normal);
        assert!(ops.borrow().is_empty());

        recorder.maybe_append(1100, &snap, &mut sink, OperatingMode::Normal);
        assert_eq!(&*ops.borrow(), &[Op::Append]);

        recorder.maybe_append(1150, &snap, &mut sink, OperatingMode::Normal);
        assert_eq!(&*ops.borrow(), &[Op::Append]);
    }

    #[test]
    fn test_periodic_flush() {
        let mut recorder = Recorder::new();
        let (mut store, mut sink, ops) = rig(1, true);
        recorder
            .start(0, &Settings::default(), OperatingMode::Normal, &mut sink, &mut store)
            .unwrap();
        ops.borrow_mut().clear();

        let snap = snapshot();
        recorder.maybe_append(LOG_FLUSH_MS, &snap, &mut sink, OperatingMode::Normal);
        assert!(ops.borrow().contains(&Op::Flush));
    }

    #[test]
    fn test_no_append_in_maintenance_mode() {
        let mut recorder = Recorder::new();
        let (mut store, mut sink, ops) = rig(1, true);
        recorder
            .start(0, &Settings::default(), OperatingMode::Normal, &mut sink, &mut store)
            .unwrap();
        ops.borrow_mut().clear();

        recorder.maybe_append(200, &snapshot(), &mut sink, OperatingMode::Portal);
        assert!(ops.borrow().is_empty());
        assert!(!recorder.can_append(true, OperatingMode::Portal));
    }

    #[test]
    fn test_no_append_when_storage_lost() {
        let mut recorder = Recorder::new();
        let (mut store, mut sink, ops) = rig(1, true);
        recorder
            .start(0, &Settings::default(), OperatingMode::Normal, &mut sink, &mut store)
            .unwrap();
        ops.borrow_mut().clear();

        sink.available = false;
        recorder.maybe_append(200, &snapshot(), &mut sink, OperatingMode::Normal);
        assert!(ops.borrow().is_empty());
    }

    #[test]
    fn test_stop_flushes_and_closes_once() {
        let mut recorder = Recorder::new();
        let (mut store, mut sink, ops) = rig(1, true);
        recorder
            .start(0, &Settings::default(), OperatingMode::Normal, &mut sink, &mut store)
            .unwrap();
        ops.borrow_mut().clear();

        recorder.stop(&mut sink);
        recorder.stop(&mut sink);
        assert_eq!(&*ops.borrow(), &[Op::Flush, Op::Close]);
        assert!(!recorder.is_recording());
    }
}
