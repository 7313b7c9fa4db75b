//! Error types for the hardware side of the SensorLink firmware.
//!
//! The control loop itself never propagates errors (every failure becomes a
//! diagnostic event), so these types live at the port boundary: drivers
//! return them, the core folds them into state.  All variants are `Copy`
//! so they can be carried inside events without allocation.
//!
//! Broker failures are [`BrokerError`](crate::net::broker::BrokerError);
//! configuration failures are [`ConfigError`](crate::config::ConfigError).

use core::fmt;

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The driver could not complete a read (bus error, no response).
    ReadFailed,
    /// The sensor did not answer within the protocol timing window.
    Timeout,
    /// Frame received but the checksum byte does not match.
    ChecksumMismatch,
    /// The driver produced a value that is not a number.
    NotANumber,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFailed => write!(f, "read failed"),
            Self::Timeout => write!(f, "sensor timeout"),
            Self::ChecksumMismatch => write!(f, "checksum mismatch"),
            Self::NotANumber => write!(f, "reading is not a number"),
        }
    }
}

impl core::error::Error for SensorError {}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// PWM duty-cycle write failed.
    PwmWriteFailed,
    /// GPIO set failed.
    GpioWriteFailed,
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PwmWriteFailed => write!(f, "PWM write failed"),
            Self::GpioWriteFailed => write!(f, "GPIO write failed"),
        }
    }
}

impl core::error::Error for ActuatorError {}
