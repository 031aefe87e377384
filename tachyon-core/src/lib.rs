//! Board-agnostic dashboard logic for the Tachyon telemetry engine
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - External-interface traits (byte source, clock, config store, log
//!   sink, presentation surface)
//! - Threshold monitoring and alarm flags
//! - Shift-light blink state machine
//! - Operating-mode arbiter (live telemetry vs. maintenance portal)
//! - Recording admission gate and log cadence
//! - The dashboard controller tying everything into one cooperative loop
//!
//! Everything runs synchronously on a single control loop; time is a
//! millisecond counter sampled from an externally supplied clock.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod alarm;
pub mod config;
pub mod controller;
pub mod mode;
pub mod record;
pub mod shift;
pub mod time;
pub mod traits;
