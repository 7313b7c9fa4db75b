//! Hardware adapters: bridge real peripherals to domain port traits.
//!
//! - [`SensorAdapter`] owns the hygrometer and exposes it through
//!   [`SensorPort`].
//! - [`ActuatorAdapter`] owns the switch and servo drivers and exposes
//!   them through [`ActuatorPort`].
//!
//! These are the only modules in the system that touch actual hardware.
//! Driver failures are logged here; the ports are infallible on the
//! actuator side and typed on the sensor side.

use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;
use log::warn;

use crate::app::ports::{ActuatorPort, SensorPort};
use crate::drivers::servo::ServoDriver;
use crate::drivers::switch::SwitchDriver;
use crate::error::SensorError;
use crate::sensors::dht22::Hygrometer;

// ── SensorPort implementation ─────────────────────────────────

/// One bus transaction yields both channels.  The temperature read runs
/// the transaction and parks the humidity; the humidity read that follows
/// consumes it.  A humidity read with nothing parked runs its own
/// transaction.
pub struct SensorAdapter<H> {
    sensor: H,
    pending_humidity: Option<f32>,
}

impl<H: Hygrometer> SensorAdapter<H> {
    pub fn new(sensor: H) -> Self {
        Self {
            sensor,
            pending_humidity: None,
        }
    }
}

impl<H: Hygrometer> SensorPort for SensorAdapter<H> {
    fn read_temperature(&mut self) -> Result<f32, SensorError> {
        self.pending_humidity = None;
        let m = self.sensor.measure()?;
        self.pending_humidity = Some(m.humidity);
        Ok(m.temperature)
    }

    fn read_humidity(&mut self) -> Result<f32, SensorError> {
        match self.pending_humidity.take() {
            Some(h) => Ok(h),
            None => self.sensor.measure().map(|m| m.humidity),
        }
    }
}

// ── ActuatorPort implementation ───────────────────────────────

pub struct ActuatorAdapter<SW, SV> {
    switch: SwitchDriver<SW>,
    servo: ServoDriver<SV>,
}

impl<SW: OutputPin, SV: SetDutyCycle> ActuatorAdapter<SW, SV> {
    pub fn new(switch: SwitchDriver<SW>, servo: ServoDriver<SV>) -> Self {
        Self { switch, servo }
    }

    pub fn switch(&self) -> &SwitchDriver<SW> {
        &self.switch
    }

    pub fn servo(&self) -> &ServoDriver<SV> {
        &self.servo
    }
}

impl<SW: OutputPin, SV: SetDutyCycle> ActuatorPort for ActuatorAdapter<SW, SV> {
    fn set_switch(&mut self, on: bool) {
        if let Err(e) = self.switch.set(on) {
            warn!("Switch write failed: {}", e);
        }
    }

    fn set_position(&mut self, degrees: i32) {
        if let Err(e) = self.servo.set_angle(degrees) {
            warn!("Servo write failed: {}", e);
        }
    }
}
