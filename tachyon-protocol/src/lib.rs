//! Speeduino-style secondary serial telemetry protocol
//!
//! This crate defines the wire-level side of the Tachyon dashboard: frame
//! reassembly from a raw UART byte stream and fixed-offset decoding of the
//! realtime channels payload into engineering units.
//!
//! # Protocol Overview
//!
//! The dashboard polls the ECU with a single `'n'` command byte; the ECU
//! answers with a length-prefixed binary frame:
//! ```text
//! ┌──────┬──────┬────────┬─────────────┐
//! │ SYNC │ TYPE │ LENGTH │ PAYLOAD     │
//! │ 'n'  │ 1B   │ 1B     │ 1–200B      │
//! └──────┴──────┴────────┴─────────────┘
//! ```
//!
//! There is no checksum; a malformed length simply drops the frame and the
//! receiver waits for the next sync byte. The payload is a flat channel
//! block read at fixed offsets.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod frame;
pub mod telemetry;

pub use frame::{Frame, FrameReceiver, RxStats, FRAME_SYNC, MAX_PAYLOAD};
pub use telemetry::{
    decode, AfrFormat, EngineStatus, SparkFlags, TelemetrySnapshot, MIN_PAYLOAD,
};
