//! Binary switch (indicator light / relay) on a push-pull GPIO.
//!
//! ## Dual-target design
//!
//! Generic over `embedded_hal::digital::OutputPin`: on ESP-IDF this is a
//! `PinDriver<Output>`, on the host any mock pin.

use embedded_hal::digital::OutputPin;
use log::debug;

use crate::error::ActuatorError;

pub struct SwitchDriver<P> {
    pin: P,
    on: bool,
}

impl<P: OutputPin> SwitchDriver<P> {
    /// Takes the pin and drives it off.
    pub fn new(pin: P) -> Result<Self, ActuatorError> {
        let mut driver = Self { pin, on: true };
        driver.set(false)?;
        Ok(driver)
    }

    pub fn set(&mut self, on: bool) -> Result<(), ActuatorError> {
        let result = if on {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        result.map_err(|_| ActuatorError::GpioWriteFailed)?;
        if self.on != on {
            debug!("Switch: {}", if on { "on" } else { "off" });
        }
        self.on = on;
        Ok(())
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}
