//! DHT22 / AM2302 single-wire temperature + humidity sensor.
//!
//! The line is open-drain with a pull-up.  The bus transaction and frame
//! decoding are done by `dht_sensor`; this module releases the line before
//! each read and folds the driver's errors into [`SensorError`].

use core::fmt;

use dht_sensor::{DhtError, dht22};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use log::{debug, warn};

use crate::error::SensorError;

/// One decoded measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    /// Degrees Celsius.
    pub temperature: f32,
    /// Relative humidity, percent.
    pub humidity: f32,
}

/// Anything that yields a full temperature + humidity measurement.
pub trait Hygrometer {
    fn measure(&mut self) -> Result<Measurement, SensorError>;
}

/// `P` must be an open-drain pin readable while released.
pub struct Dht22<P, D> {
    pin: P,
    delay: D,
}

impl<P, D> Dht22<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    pub fn new(pin: P, delay: D) -> Self {
        Self { pin, delay }
    }
}

impl<P, D> Hygrometer for Dht22<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    fn measure(&mut self) -> Result<Measurement, SensorError> {
        // The sensor only answers a start pulse from an idle-high line.
        if let Err(e) = self.pin.set_high() {
            warn!("DHT22: failed to release line before read: {:?}", e);
            return Err(SensorError::ReadFailed);
        }

        let reading = dht22::blocking::read(&mut self.delay, &mut self.pin).map_err(classify)?;
        debug!(
            "DHT22: {:.1} C, {:.1} %RH",
            reading.temperature, reading.relative_humidity
        );
        Ok(Measurement {
            temperature: reading.temperature,
            humidity: reading.relative_humidity,
        })
    }
}

/// Fold a driver error into the sensor taxonomy.
fn classify<E: fmt::Debug>(error: DhtError<E>) -> SensorError {
    match error {
        DhtError::ChecksumMismatch => SensorError::ChecksumMismatch,
        DhtError::Timeout => SensorError::Timeout,
        DhtError::PinError(e) => {
            warn!("DHT22: pin error: {:?}", e);
            SensorError::ReadFailed
        }
        #[allow(unreachable_patterns)]
        other => {
            warn!("DHT22: read failed: {:?}", other);
            SensorError::ReadFailed
        }
    }
}
