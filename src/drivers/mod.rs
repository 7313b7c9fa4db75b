//! Actuator drivers and the task watchdog.

pub mod servo;
pub mod switch;
pub mod watchdog;
