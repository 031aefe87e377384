//! Monotonic millisecond clock

/// Source of the control loop's notion of time.
///
/// The returned counter must be monotonic between wraparounds; the core
/// does all elapsed-time arithmetic with wrapping subtraction, so a
/// `u32` rollover (about 49 days) passes through unnoticed.
pub trait Clock {
    /// Milliseconds since an arbitrary epoch
    fn now_millis(&self) -> u32;
}
