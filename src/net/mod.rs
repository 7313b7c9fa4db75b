//! Connectivity state machines: wireless link and broker session.
//!
//! ```text
//!            begin_connect()           link observed up
//!  Disconnected ──────────▶ Connecting ──────────────▶ Connected
//!       ▲                                                  │
//!       └──────────────── link observed down ──────────────┘
//! ```
//!
//! Both machines are polled, never pushed: status is recomputed from the
//! underlying port on every query and nothing is cached across ticks
//! beyond the logical state needed to detect transitions.

pub mod broker;
pub mod network;

/// Logical connection state shared by [`network::NetworkLink`] and
/// [`broker::BrokerClient`] (tracked independently).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

impl ConnectionState {
    pub fn is_connected(self) -> bool {
        self == Self::Connected
    }
}
