//! Monotonic millisecond clock for the control loop.
//!
//! On target this reads the ESP-IDF high-resolution system timer; on the
//! host it measures from construction with `std::time::Instant`.
//!
//! [`Millis`] is 32 bits, so `now_ms()` wraps after ~49.7 days; every
//! consumer compares with wrapping arithmetic.

use crate::timer::Millis;

pub struct MonotonicClock {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Milliseconds since boot, truncated to 32 bits.
    pub fn now_ms(&self) -> Millis {
        (self.uptime_us() / 1_000) as Millis
    }

    /// Microseconds since boot, never wrapping in practice.
    pub fn uptime_us(&self) -> u64 {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: reads the free-running system timer; no preconditions.
            let us = unsafe { esp_idf_sys::esp_timer_get_time() };
            u64::try_from(us).unwrap_or(0)
        }
        #[cfg(not(target_os = "espidf"))]
        {
            u64::try_from(self.start.elapsed().as_micros()).unwrap_or(u64::MAX)
        }
    }
}
