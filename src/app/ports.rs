//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Agent (domain)
//! ```
//!
//! Driven adapters (radio, broker transport, sensor, actuators, event
//! sinks) implement these traits.  The [`Agent`](super::service::Agent)
//! consumes them via generics, so the domain core never touches hardware
//! directly and every port can be replaced by a recording mock on the host.
//!
//! ## Blocking rules
//!
//! - Every method here must return promptly (no waiting on I/O
//!   completion) **except** [`BrokerPort::connect`], which may block up to
//!   the transport's connect timeout.
//! - Ports report failures as typed errors; the core folds them into
//!   state and diagnostics, never unwinding the control loop.

use core::net::Ipv4Addr;

use crate::error::SensorError;
use crate::net::broker::{BrokerError, InboundMessage};

// ───────────────────────────────────────────────────────────────
// Network port (driven adapter: domain ↔ wireless station)
// ───────────────────────────────────────────────────────────────

/// Wireless association, observed by polling.
pub trait NetworkPort {
    /// Issue an asynchronous association request.  Safe to call while an
    /// earlier request is still pending.
    fn begin_connect(&mut self);

    /// Whether the station is associated and has an address.
    fn is_connected(&self) -> bool;

    /// Driver-specific status code (diagnostics only).
    fn raw_status(&self) -> i32;

    /// Assigned station address, if any.
    fn local_ip(&self) -> Option<Ipv4Addr>;
}

// ───────────────────────────────────────────────────────────────
// Broker port (driven adapter: domain ↔ MQTT transport)
// ───────────────────────────────────────────────────────────────

/// Publish/subscribe transport.
pub trait BrokerPort {
    /// Open a session.  The only port call allowed to block, bounded by
    /// the transport connect timeout.
    fn connect(&mut self, client_id: &str) -> Result<(), BrokerError>;

    /// Whether the transport still considers the session open.
    fn is_connected(&self) -> bool;

    fn subscribe(&mut self, topic: &str) -> Result<(), BrokerError>;

    /// Fire-and-forget send (QoS 0).
    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), BrokerError>;

    /// Keep-alive bookkeeping and inbound frame processing.  Returns an
    /// error once the session is found to be gone.
    fn poll(&mut self) -> Result<(), BrokerError>;

    /// Pop the next queued inbound message.
    fn next_message(&mut self) -> Option<InboundMessage>;
}

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Environmental sensor with two channels.  Each call is one read attempt.
pub trait SensorPort {
    /// Degrees Celsius.
    fn read_temperature(&mut self) -> Result<f32, SensorError>;

    /// Relative humidity, percent.
    fn read_humidity(&mut self) -> Result<f32, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this to command actuators.
/// Range enforcement is the actuator's own business.
pub trait ActuatorPort {
    /// Binary switch on/off.
    fn set_switch(&mut self, on: bool);

    /// Positional actuator angle in degrees.
    fn set_position(&mut self, degrees: i32);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent<'_>);
}
