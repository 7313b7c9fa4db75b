//! Publish/subscribe session over an established link.
//!
//! [`BrokerClient`] wraps a [`BrokerPort`] with the session state machine:
//!
//! - `connect()` is the one call allowed to block, bounded by the
//!   transport's connect timeout.  On success both command topics are
//!   subscribed.
//! - `service()` must run every tick while connected.  It pumps the
//!   transport (keep-alive, inbound frames) and hands at most one batch of
//!   queued messages to the caller's handler, inline.
//! - `publish()` is best-effort, at-most-once: no acknowledgement
//!   tracking, no retry.
//!
//! The caller (the agent) guarantees the link is up before invoking any
//! of these.

use core::fmt;

use log::{debug, info, warn};

use super::ConnectionState;
use crate::app::ports::BrokerPort;
use crate::config::{MAX_TOPIC_LEN, Topic};

/// Inbound payload bytes kept per message; the rest is cut off.
pub const MAX_PAYLOAD_LEN: usize = 128;

/// Upper bound on messages handed to the handler per `service()` call.
pub const MAX_INBOUND_BATCH: usize = 8;

// ───────────────────────────────────────────────────────────────
// Inbound message
// ───────────────────────────────────────────────────────────────

/// A queued inbound message.  Fixed capacity, no heap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: Topic,
    pub payload: heapless::Vec<u8, MAX_PAYLOAD_LEN>,
    /// The payload was cut to [`MAX_PAYLOAD_LEN`] bytes.
    pub truncated: bool,
}

impl InboundMessage {
    /// Copy `topic`/`payload` into fixed buffers.  A payload longer than
    /// [`MAX_PAYLOAD_LEN`] keeps its leading bytes.  `None` if the topic
    /// does not fit.
    pub fn new(topic: &str, payload: &[u8]) -> Option<Self> {
        if topic.len() > MAX_TOPIC_LEN {
            return None;
        }
        let mut t = Topic::new();
        t.push_str(topic).ok()?;
        let kept = &payload[..payload.len().min(MAX_PAYLOAD_LEN)];
        let payload_buf = heapless::Vec::from_slice(kept).ok()?;
        Some(Self {
            topic: t,
            payload: payload_buf,
            truncated: kept.len() < payload.len(),
        })
    }
}

// ───────────────────────────────────────────────────────────────
// Error taxonomy
// ───────────────────────────────────────────────────────────────

/// Broker session failures.  `code()` is a stable negative number for
/// field logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrokerError {
    /// No session confirmation within the connect timeout.
    ConnectionTimeout,
    /// The session dropped (keep-alive expired, socket closed).
    ConnectionLost,
    /// The transport or the broker refused the session.
    ConnectFailed,
    /// Operation attempted without a session.
    Disconnected,
}

impl BrokerError {
    /// Stable numeric diagnostic code.
    pub const fn code(self) -> i8 {
        match self {
            Self::ConnectionTimeout => -4,
            Self::ConnectionLost => -3,
            Self::ConnectFailed => -2,
            Self::Disconnected => -1,
        }
    }
}

impl fmt::Display for BrokerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::ConnectionTimeout => "connection timeout",
            Self::ConnectionLost => "connection lost",
            Self::ConnectFailed => "connect failed",
            Self::Disconnected => "not connected",
        };
        write!(f, "{} (code={})", text, self.code())
    }
}

impl core::error::Error for BrokerError {}

// ───────────────────────────────────────────────────────────────
// Session client
// ───────────────────────────────────────────────────────────────

/// Result of one [`BrokerClient::service`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ServiceReport {
    /// Messages handed to the handler.
    pub handled: usize,
    /// Set when the transport reported the session gone during this call.
    pub session_lost: Option<BrokerError>,
}

pub struct BrokerClient<B> {
    port: B,
    state: ConnectionState,
    subscriptions: [Topic; 2],
    last_error: Option<BrokerError>,
}

impl<B: BrokerPort> BrokerClient<B> {
    /// `subscriptions` are (re)subscribed on every successful connect.
    pub fn new(port: B, subscriptions: [Topic; 2]) -> Self {
        Self {
            port,
            state: ConnectionState::Disconnected,
            subscriptions,
            last_error: None,
        }
    }

    /// Attempt a session.  May block up to the transport connect timeout.
    pub fn connect(&mut self, client_id: &str) -> bool {
        self.state = ConnectionState::Connecting;
        info!("Broker: connecting as '{}'", client_id);

        match self.port.connect(client_id) {
            Ok(()) => {
                for topic in &self.subscriptions {
                    match self.port.subscribe(topic) {
                        Ok(()) => debug!("Broker: subscribed to {}", topic),
                        Err(e) => warn!("Broker: subscribe to {} failed: {}", topic, e),
                    }
                }
                self.state = ConnectionState::Connected;
                self.last_error = None;
                info!("Broker: connected");
                true
            }
            Err(e) => {
                warn!("Broker: connect failed: {}", e);
                self.state = ConnectionState::Disconnected;
                self.last_error = Some(e);
                false
            }
        }
    }

    /// Pure observation of the logical session state.
    pub fn connected(&self) -> bool {
        self.state.is_connected()
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Keep the session alive and drain one batch of inbound messages
    /// into `handler`.  No-op unless connected.
    pub fn service(&mut self, mut handler: impl FnMut(&InboundMessage)) -> ServiceReport {
        let mut report = ServiceReport::default();
        if !self.connected() {
            return report;
        }

        let alive = match self.port.poll() {
            Ok(()) if self.port.is_connected() => Ok(()),
            Ok(()) => Err(BrokerError::ConnectionLost),
            Err(e) => Err(e),
        };
        if let Err(e) = alive {
            warn!("Broker: session lost: {}", e);
            self.state = ConnectionState::Disconnected;
            self.last_error = Some(e);
            report.session_lost = Some(e);
            return report;
        }

        while report.handled < MAX_INBOUND_BATCH {
            let Some(msg) = self.port.next_message() else {
                break;
            };
            handler(&msg);
            report.handled += 1;
        }
        report
    }

    /// Best-effort send.  `false` without touching the port when not
    /// connected.
    pub fn publish(&mut self, topic: &str, payload: &[u8]) -> bool {
        if !self.connected() {
            return false;
        }
        match self.port.publish(topic, payload) {
            Ok(()) => true,
            Err(e) => {
                warn!("Broker: publish to {} failed: {}", topic, e);
                self.last_error = Some(e);
                false
            }
        }
    }

    /// Forget the session without talking to the transport (the link
    /// underneath is already gone).
    pub fn drop_session(&mut self) {
        if self.state != ConnectionState::Disconnected {
            info!("Broker: session dropped with the link");
        }
        self.state = ConnectionState::Disconnected;
    }

    /// Most recent failure, kept for diagnostics until the next success.
    pub fn last_error(&self) -> Option<BrokerError> {
        self.last_error
    }

    pub fn subscriptions(&self) -> &[Topic; 2] {
        &self.subscriptions
    }

    pub fn port(&self) -> &B {
        &self.port
    }

    pub fn port_mut(&mut self) -> &mut B {
        &mut self.port
    }
}
