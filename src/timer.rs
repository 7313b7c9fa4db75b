//! Non-blocking interval gate.
//!
//! Every cadence in the agent (network retry, broker retry, sample and
//! publish) is a [`Timer`] polled from the control loop.  Nothing here
//! sleeps or waits; the caller supplies the current monotonic time.
//!
//! ```text
//!   lastFired            lastFired + period
//!      │◀──────── period ───────▶│
//!  ────┼─────────────────────────┼──────▶ now
//!      fired         elapsed() = false │ elapsed() = true
//! ```
//!
//! ## Wraparound
//!
//! [`Millis`] is a 32-bit millisecond counter that wraps after ~49.7
//! days.  The firing condition is evaluated as `now.wrapping_sub(last)`,
//! which stays correct across a single wrap of the clock.
//!
//! ## Cleared state
//!
//! A timer can be *cleared*: it has no `lastFired` timestamp at all.
//! A cleared timer is always due, and the agent also uses the cleared
//! state as a one-shot sentinel ("freshly connected, announce once").

/// Monotonic milliseconds since boot (wrapping).
pub type Millis = u32;

/// A reusable interval gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    period: Millis,
    last_fired: Option<Millis>,
}

impl Timer {
    /// A timer whose reference point is boot time (last fired at 0).
    ///
    /// First fires once `period` milliseconds of uptime have passed.
    pub const fn new(period: Millis) -> Self {
        Self {
            period,
            last_fired: Some(0),
        }
    }

    /// A timer in the cleared state: due immediately.
    pub const fn cleared(period: Millis) -> Self {
        Self {
            period,
            last_fired: None,
        }
    }

    /// The configured period.
    pub const fn period(&self) -> Millis {
        self.period
    }

    /// Timestamp of the last reset, or `None` when cleared.
    pub const fn last_fired(&self) -> Option<Millis> {
        self.last_fired
    }

    /// `true` iff `now - lastFired >= period`.  Does not mutate state.
    pub fn elapsed(&self, now: Millis) -> bool {
        match self.last_fired {
            Some(last) => now.wrapping_sub(last) >= self.period,
            None => true,
        }
    }

    /// Record `now` as the last firing time.
    pub fn reset(&mut self, now: Millis) {
        self.last_fired = Some(now);
    }

    /// Forget the last firing time (sentinel state).
    pub fn clear(&mut self) {
        self.last_fired = None;
    }

    /// Whether the timer is in the cleared sentinel state.
    pub fn is_cleared(&self) -> bool {
        self.last_fired.is_none()
    }

    /// Combined check-and-reset: returns `true` and resets when due.
    pub fn fire_if_elapsed(&mut self, now: Millis) -> bool {
        if self.elapsed(now) {
            self.reset(now);
            true
        } else {
            false
        }
    }
}
