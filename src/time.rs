//! Edge timestamps.
//!
//! Button edges are stamped with a free-running 32-bit microsecond counter,
//! the same one the hardware timer exposes. The counter wraps silently after
//! roughly 71.6 minutes, so every comparison goes through wrapping arithmetic.

use embassy_time::{Duration, Instant};

/// Free-running microsecond counter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Timestamp(u32);

impl Timestamp {
    /// Counter value at startup.
    pub const EPOCH: Self = Self(0);

    pub const fn from_micros(micros: u32) -> Self {
        Self(micros)
    }

    pub const fn from_millis(millis: u32) -> Self {
        Self(millis.wrapping_mul(1000))
    }

    /// Truncate an [`Instant`] to the 32-bit counter domain.
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_instant(instant: Instant) -> Self {
        Self(instant.as_micros() as u32)
    }

    pub const fn as_micros(self) -> u32 {
        self.0
    }

    /// Microseconds elapsed since `earlier`, assuming at most one wrap in between.
    pub const fn wrapping_since(self, earlier: Self) -> u32 {
        self.0.wrapping_sub(earlier.0)
    }

    /// Returns true if more than `window` has passed since `earlier`.
    pub fn is_beyond(self, earlier: Self, window: Duration) -> bool {
        u64::from(self.wrapping_since(earlier)) > window.as_micros()
    }
}

/// Source of edge timestamps.
///
/// Implemented by the board on top of its hardware timer.
pub trait TimeSource {
    fn now(&self) -> Timestamp;
}
