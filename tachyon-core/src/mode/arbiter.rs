//! Mode arbiter
//!
//! Supervises the Normal/Portal split and is the sole authority over the
//! three shared resources: the telemetry serial link, the presentation
//! surface and the storage handle. Mode requests are sampled on a fixed
//! cadence rather than applied on arrival, so a flapping maintenance
//! client cannot storm the transition path; requests arriving between
//! samples coalesce to the latest target.

use tachyon_protocol::FrameReceiver;

use crate::record::Recorder;
use crate::time::Interval;
use crate::traits::{ByteSource, LogSink, PresentationSurface};

/// Maintenance-signal sampling cadence
pub const MODE_SAMPLE_MS: u32 = 250;

/// The two mutually exclusive operating modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OperatingMode {
    /// Live telemetry: polling, decoding, rendering, recording
    #[default]
    Normal,
    /// Maintenance/configuration access: telemetry quiesced, static
    /// maintenance screen, storage handed to the maintenance client
    Portal,
}

/// The shared resources a transition acquires and releases.
///
/// Borrowed fresh for each arbiter evaluation; nothing here is global.
pub struct SharedResources<'a, S: ByteSource, P: PresentationSurface, K: LogSink> {
    /// Telemetry serial link
    pub source: &'a mut S,
    /// Rendering layer
    pub surface: &'a mut P,
    /// Log storage handle
    pub sink: &'a mut K,
    /// Frame reassembly state, reset when the link restarts
    pub receiver: &'a mut FrameReceiver,
    /// Recording gate, stopped before storage is handed over
    pub recorder: &'a mut Recorder,
}

/// Two-state mode machine with guarded entry/exit actions
#[derive(Debug, Clone)]
pub struct ModeArbiter {
    mode: OperatingMode,
    target: OperatingMode,
    sample: Interval,
}

impl Default for ModeArbiter {
    fn default() -> Self {
        Self::new()
    }
}

impl ModeArbiter {
    /// Create an arbiter in Normal mode
    pub fn new() -> Self {
        Self {
            mode: OperatingMode::Normal,
            target: OperatingMode::Normal,
            sample: Interval::new(MODE_SAMPLE_MS),
        }
    }

    /// Currently active mode
    pub fn mode(&self) -> OperatingMode {
        self.mode
    }

    /// Record the externally sampled maintenance-client count.
    ///
    /// Any connected client requests Portal mode; zero clients requests
    /// Normal. Repeated or conflicting requests between samples coalesce
    /// to the latest target.
    pub fn request(&mut self, station_count: u8) {
        self.target = if station_count > 0 {
            OperatingMode::Portal
        } else {
            OperatingMode::Normal
        };
    }

    /// Evaluate the pending target at the sampling cadence.
    ///
    /// Executes at most one transition, synchronously, and returns the
    /// new mode when one happened. Re-requesting the active mode is a
    /// no-op, so transitions are idempotent.
    pub fn poll<S, P, K>(
        &mut self,
        now_ms: u32,
        res: &mut SharedResources<'_, S, P, K>,
    ) -> Option<OperatingMode>
    where
        S: ByteSource,
        P: PresentationSurface,
        K: LogSink,
    {
        if !self.sample.ready(now_ms) {
            return None;
        }
        if self.target == self.mode {
            return None;
        }

        match self.target {
            OperatingMode::Portal => Self::enter_portal(res),
            OperatingMode::Normal => Self::enter_normal(res),
        }
        self.mode = self.target;
        Some(self.mode)
    }

    /// Quiesce telemetry and hand the display and storage to the
    /// maintenance client. The display keeps showing a static screen;
    /// it never goes blank.
    fn enter_portal<S, P, K>(res: &mut SharedResources<'_, S, P, K>)
    where
        S: ByteSource,
        P: PresentationSurface,
        K: LogSink,
    {
        res.source.stop();
        res.recorder.stop(res.sink);
        res.surface.suspend_updates();
        res.surface.show_maintenance_screen();
    }

    /// Reclaim the link and display. The receiver restarts from sync so
    /// stale buffered bytes cannot produce a frame; telemetry stays
    /// invalid until a fresh one arrives.
    fn enter_normal<S, P, K>(res: &mut SharedResources<'_, S, P, K>)
    where
        S: ByteSource,
        P: PresentationSurface,
        K: LogSink,
    {
        res.source.start();
        res.receiver.reset();
        res.surface.resume_updates();
        res.surface.force_redraw();
    }
}
