//! Dashboard controller
//!
//! The context object that owns every component and every external
//! interface, and threads the sampled clock through them once per loop
//! iteration. This is the only place the pieces meet; no component
//! reaches another except through the state passed here.

use tachyon_protocol::{decode, FrameReceiver, RxStats, TelemetrySnapshot};

use super::status::StatusIndicators;
use crate::alarm::AlarmFlags;
use crate::config::Settings;
use crate::mode::{ModeArbiter, OperatingMode, SharedResources};
use crate::record::{RecordError, Recorder};
use crate::shift::{ShiftLight, ShiftSignal};
use crate::time::{elapsed_ms, Interval};
use crate::traits::{ByteSource, Clock, ConfigError, ConfigStore, LogSink, PresentationSurface};

/// Frame poll cadence while the receiver is idle
pub const POLL_INTERVAL_MS: u32 = 100;

/// Snapshot age beyond which telemetry is treated as invalid
pub const LINK_STALE_MS: u32 = 700;

/// Snapshot/alarm push cadence to the presentation surface
pub const UI_UPDATE_MS: u32 = 60;

/// Status-indicator push cadence
pub const STATUS_UPDATE_MS: u32 = 250;

/// The dashboard engine.
///
/// Construct once at boot, then call [`tick`](Self::tick) every loop
/// iteration. All work is synchronous and returns within the iteration;
/// the same loop is expected to drive the presentation refresh.
pub struct Dashboard<C, S, P, K, F>
where
    C: Clock,
    S: ByteSource,
    P: PresentationSurface,
    K: LogSink,
    F: ConfigStore,
{
    clock: C,
    source: S,
    surface: P,
    sink: K,
    config: F,
    settings: Settings,
    receiver: FrameReceiver,
    snapshot: Option<TelemetrySnapshot>,
    alarms: AlarmFlags,
    shift: ShiftLight,
    arbiter: ModeArbiter,
    recorder: Recorder,
    poll: Interval,
    ui: Interval,
    status: Interval,
    last_rx_ms: u32,
}

impl<C, S, P, K, F> Dashboard<C, S, P, K, F>
where
    C: Clock,
    S: ByteSource,
    P: PresentationSurface,
    K: LogSink,
    F: ConfigStore,
{
    /// Build the engine and open the telemetry link.
    ///
    /// Settings come from the config store; an unreadable store falls
    /// back to defaults rather than failing boot.
    pub fn new(clock: C, mut source: S, surface: P, sink: K, mut config: F) -> Self {
        let mut settings = config.load_settings().unwrap_or_default();
        settings.normalize();

        source.start();
        let now = clock.now_millis();

        Self {
            clock,
            source,
            surface,
            sink,
            config,
            settings,
            receiver: FrameReceiver::new(),
            snapshot: None,
            alarms: AlarmFlags::default(),
            shift: ShiftLight::new(),
            arbiter: ModeArbiter::new(),
            recorder: Recorder::new(),
            poll: Interval::new(POLL_INTERVAL_MS),
            ui: Interval::new(UI_UPDATE_MS),
            status: Interval::new(STATUS_UPDATE_MS),
            last_rx_ms: now,
        }
    }

    /// Run one control-loop iteration.
    pub fn tick(&mut self) {
        let now = self.clock.now_millis();

        // Mode arbitration first; the arbiter owns the shared resources.
        let transition = {
            let mut res = SharedResources {
                source: &mut self.source,
                surface: &mut self.surface,
                sink: &mut self.sink,
                receiver: &mut self.receiver,
                recorder: &mut self.recorder,
            };
            self.arbiter.poll(now, &mut res)
        };
        if transition == Some(OperatingMode::Normal) {
            // The receiver was reset with the link restart; telemetry
            // stays invalid until a fresh frame arrives.
            self.snapshot = None;
            self.last_rx_ms = now;
        }
        if self.arbiter.mode() == OperatingMode::Portal {
            return;
        }

        // Drain whatever the link has buffered, then ask for the next
        // frame - but only while no response is outstanding.
        while self.source.available() {
            match self.source.read_byte() {
                Some(byte) => self.ingest(byte, now),
                None => break,
            }
        }
        if self.receiver.is_idle() && self.poll.ready(now) {
            self.source.request_frame();
        }

        let link_up = self.link_valid(now);

        // The shift light runs on the wall clock, not on frame arrival.
        let rpm = if link_up {
            self.snapshot.map(|s| s.rpm)
        } else {
            None
        };
        let signal = self
            .shift
            .tick(now, rpm, self.settings.shift_enabled, self.settings.shift_rpm);
        match signal {
            Some(ShiftSignal::Enter) => self.surface.shift_alert_enter(),
            Some(ShiftSignal::Blink(on)) => self.surface.shift_alert_blink(on),
            Some(ShiftSignal::Exit) => self.surface.shift_alert_exit(),
            None => {}
        }

        if let Some(snapshot) = self.snapshot {
            self.recorder
                .maybe_append(now, &snapshot, &mut self.sink, self.arbiter.mode());
        }

        if self.ui.ready(now) {
            match self.snapshot {
                Some(snapshot) if link_up => self.surface.show_snapshot(&snapshot, &self.alarms),
                _ => self.surface.show_link_down(),
            }
        }

        if self.status.ready(now) {
            let status = self.status_indicators(now, link_up);
            self.surface.show_status(&status);
        }
    }

    /// Feed one telemetry byte from outside the tick loop.
    ///
    /// Equivalent to the byte arriving through the source during `tick`.
    pub fn feed_byte(&mut self, byte: u8) {
        let now = self.clock.now_millis();
        self.ingest(byte, now);
    }

    /// Record the externally sampled maintenance-client count.
    ///
    /// The transition itself happens inside `tick`, on the arbiter's
    /// sampling cadence.
    pub fn request_mode_change(&mut self, station_count: u8) {
        self.arbiter.request(station_count);
    }

    /// The current snapshot, if telemetry is valid.
    ///
    /// Returns `None` while no frame has arrived, after a mode round
    /// trip, or once the last frame is older than [`LINK_STALE_MS`].
    pub fn snapshot(&self) -> Option<&TelemetrySnapshot> {
        let now = self.clock.now_millis();
        self.snapshot
            .as_ref()
            .filter(|s| elapsed_ms(now, s.timestamp_ms) <= LINK_STALE_MS)
    }

    /// Alarm flags from the latest decode
    pub fn alarms(&self) -> &AlarmFlags {
        &self.alarms
    }

    /// Currently active operating mode
    pub fn mode(&self) -> OperatingMode {
        self.arbiter.mode()
    }

    /// Active settings
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Receive counters for diagnostics
    pub fn rx_stats(&self) -> RxStats {
        self.receiver.stats()
    }

    /// True while a log session is open
    pub fn is_recording(&self) -> bool {
        self.recorder.is_recording()
    }

    /// Replace the active settings (from the settings screen or the
    /// maintenance portal), repairing inconsistent values and
    /// re-evaluating alarms against the current snapshot.
    pub fn apply_settings(&mut self, settings: Settings) {
        self.settings = settings;
        self.settings.normalize();
        if let Some(snapshot) = self.snapshot {
            self.alarms = AlarmFlags::evaluate(&snapshot, &self.settings.warn);
        }
    }

    /// Persist the active settings as one batched write
    pub fn save_settings(&mut self) -> Result<(), ConfigError> {
        self.config.begin()?;
        self.config.store_settings(&self.settings)?;
        self.config.commit()
    }

    /// Open a new log session, returning its identifier
    pub fn start_recording(&mut self) -> Result<u32, RecordError> {
        let now = self.clock.now_millis();
        self.recorder.start(
            now,
            &self.settings,
            self.arbiter.mode(),
            &mut self.sink,
            &mut self.config,
        )
    }

    /// Close the open log session, if any
    pub fn stop_recording(&mut self) {
        self.recorder.stop(&mut self.sink);
    }

    fn ingest(&mut self, byte: u8, now_ms: u32) {
        // Defense in depth: the link is quiesced in Portal mode and any
        // straggler byte is dropped unseen.
        if self.arbiter.mode() == OperatingMode::Portal {
            return;
        }

        self.last_rx_ms = now_ms;
        if let Some(frame) = self.receiver.feed(byte) {
            if let Some(snapshot) = decode(&frame.payload, self.settings.afr_format, now_ms) {
                self.alarms = AlarmFlags::evaluate(&snapshot, &self.settings.warn);
                self.snapshot = Some(snapshot);
            }
        }
    }

    fn link_valid(&self, now_ms: u32) -> bool {
        self.snapshot
            .map(|s| elapsed_ms(now_ms, s.timestamp_ms) <= LINK_STALE_MS)
            .unwrap_or(false)
    }

    fn status_indicators(&self, now_ms: u32, link_up: bool) -> StatusIndicators {
        StatusIndicators {
            link_up,
            rx_bytes: self.receiver.stats().bytes_in,
            frame_age_ms: elapsed_ms(now_ms, self.last_rx_ms),
            storage_ok: self.sink.is_available(),
            recording: self.recorder.is_recording(),
            degraded: self.snapshot.map(|s| s.degraded).unwrap_or(false),
        }
    }
}
