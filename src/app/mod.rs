//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the coordination rules for the SensorLink agent:
//! connectivity supervision, sampling cadence, publish policy, and
//! command dispatch.  All interaction with hardware happens through
//! **port traits** defined in [`ports`], keeping this layer fully
//! testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod router;
pub mod service;
