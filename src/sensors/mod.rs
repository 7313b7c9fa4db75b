//! Sensor subsystem: the DHT22 driver and the sticky [`SensorSampler`].
//!
//! The sampler performs one read attempt per channel per pass and keeps a
//! paired last-known-good (temperature, humidity).  The pair only moves
//! when **both** channels are valid in the same pass; a half-good pass
//! leaves both sticky values alone.

pub mod dht22;

use core::fmt::Write;

use log::{debug, warn};

use crate::app::ports::SensorPort;
use crate::error::SensorError;

/// Outcome of one sampling pass.  `None` marks a channel that was invalid
/// in this pass.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SensorReading {
    pub temperature: Option<f32>,
    pub humidity: Option<f32>,
}

/// Telemetry payload capacity: two `f32` in `{:.2}` form plus separator.
pub const MAX_RECORD_LEN: usize = 96;

/// Last-known-good pair, ready for transmission.  Rebuilt on every
/// publish cycle, never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PublishRecord {
    pub temperature: f32,
    pub humidity: f32,
}

impl PublishRecord {
    /// `"<temperature>,<humidity>"`, two decimals each.
    pub fn payload(&self) -> heapless::String<MAX_RECORD_LEN> {
        let mut s = heapless::String::new();
        // Capacity covers the widest finite f32 at two decimals.
        let _ = write!(s, "{:.2},{:.2}", self.temperature, self.humidity);
        s
    }
}

/// Paired sticky sampler over a [`SensorPort`].
pub struct SensorSampler<S> {
    sensor: S,
    temperature: f32,
    humidity: f32,
    passes: u32,
    failed_passes: u32,
}

impl<S: SensorPort> SensorSampler<S> {
    /// Sticky values start at `0.0` until the first complete pass.
    pub fn new(sensor: S) -> Self {
        Self {
            sensor,
            temperature: 0.0,
            humidity: 0.0,
            passes: 0,
            failed_passes: 0,
        }
    }

    /// One read attempt per channel, then the paired sticky update.
    pub fn sample(&mut self) -> SensorReading {
        self.passes = self.passes.wrapping_add(1);
        let reading = SensorReading {
            temperature: channel("temperature", self.sensor.read_temperature()),
            humidity: channel("humidity", self.sensor.read_humidity()),
        };

        match (reading.temperature, reading.humidity) {
            (Some(t), Some(h)) => {
                self.temperature = t;
                self.humidity = h;
                debug!("Sampler: t={:.2} h={:.2}", t, h);
            }
            _ => {
                self.failed_passes = self.failed_passes.wrapping_add(1);
                debug!(
                    "Sampler: incomplete pass, keeping t={:.2} h={:.2}",
                    self.temperature, self.humidity
                );
            }
        }
        reading
    }

    /// Current sticky pair.
    pub fn last_known_good(&self) -> PublishRecord {
        PublishRecord {
            temperature: self.temperature,
            humidity: self.humidity,
        }
    }

    /// Passes run since construction.
    pub fn passes(&self) -> u32 {
        self.passes
    }

    /// Passes that did not update the sticky pair.
    pub fn failed_passes(&self) -> u32 {
        self.failed_passes
    }

    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    pub fn sensor_mut(&mut self) -> &mut S {
        &mut self.sensor
    }
}

/// A channel is valid iff the driver returned a number.
fn channel(name: &str, result: Result<f32, SensorError>) -> Option<f32> {
    match result.and_then(|v| if v.is_nan() { Err(SensorError::NotANumber) } else { Ok(v) }) {
        Ok(v) => Some(v),
        Err(e) => {
            warn!("Sampler: {} read failed: {}", name, e);
            None
        }
    }
}
