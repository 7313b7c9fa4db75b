//! Outbound application events: the diagnostic observation stream.
//!
//! The [`Agent`](super::service::Agent) emits these through the
//! [`EventSink`](super::ports::EventSink) port at every connectivity
//! transition, sampling pass, and publish decision.  Adapters on the
//! other side decide how to render them; the core never formats console
//! output itself.
//!
//! Events borrow from the agent for the duration of `emit()`, so nothing
//! is allocated to produce them.

use core::net::Ipv4Addr;

use super::commands::Command;
use crate::net::ConnectionState;
use crate::net::broker::BrokerError;
use crate::sensors::{PublishRecord, SensorReading};

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent<'a> {
    /// Startup finished: actuators are at their initial positions.
    Started,

    // ── Network ───────────────────────────────────────────────
    /// An association request was issued.
    NetworkConnecting { attempt: u32 },
    /// The link is down; emitted on every offline tick.
    WaitingForNetwork {
        state: ConnectionState,
        raw_status: i32,
    },
    /// One-time banner after the link comes up.
    NetworkConnected { ip: Option<Ipv4Addr> },
    /// The link dropped; any broker session was discarded with it.
    NetworkLost,

    // ── Broker ────────────────────────────────────────────────
    BrokerConnecting { client_id: &'a str },
    BrokerConnected,
    BrokerConnectFailed(BrokerError),
    BrokerSessionLost(BrokerError),

    // ── Commands ──────────────────────────────────────────────
    MessageReceived { topic: &'a str, payload: &'a [u8] },
    CommandApplied(Command),

    // ── Telemetry ─────────────────────────────────────────────
    /// Result of one sampling pass.
    Sampled(SensorReading),
    Published { topic: &'a str, payload: &'a str },
    PublishFailed { topic: &'a str },
    /// The publish policy held the pair back.
    NotInitialized(PublishRecord),
}
