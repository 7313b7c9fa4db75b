//! Wireless link supervision.
//!
//! [`NetworkLink`] owns the [`NetworkPort`] and turns its raw "associated
//! or not" answer into the three-state [`ConnectionState`].  Association
//! failures are invisible at this layer: the driver silently retries or
//! stalls, so the only recourse is to re-issue `begin_connect()` on the
//! retry cadence.

use core::net::Ipv4Addr;

use log::{info, warn};

use super::ConnectionState;
use crate::app::ports::NetworkPort;
use crate::timer::{Millis, Timer};

/// Edge observed by [`NetworkLink::observe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkTransition {
    /// The link came up since the previous observation.
    Established,
    /// The link went down since the previous observation.
    Lost,
}

pub struct NetworkLink<N> {
    port: N,
    /// Logical state as of the last `observe()` / `begin_connect()`.
    state: ConnectionState,
    attempts: u32,
}

impl<N: NetworkPort> NetworkLink<N> {
    pub fn new(port: N) -> Self {
        Self {
            port,
            state: ConnectionState::Disconnected,
            attempts: 0,
        }
    }

    /// Current status, recomputed from the port.  No side effects.
    ///
    /// A link that was `Connected` and is no longer reported up reads as
    /// `Disconnected`; otherwise the logical state is returned.
    pub fn status(&self) -> ConnectionState {
        if self.port.is_connected() {
            ConnectionState::Connected
        } else if self.state == ConnectionState::Connected {
            ConnectionState::Disconnected
        } else {
            self.state
        }
    }

    /// Logical state recorded at the last observation.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Issue an association request.  Idempotent and non-blocking.
    pub fn begin_connect(&mut self) {
        self.attempts = self.attempts.wrapping_add(1);
        info!("Network: association request #{}", self.attempts);
        self.port.begin_connect();
        self.state = ConnectionState::Connecting;
    }

    /// Re-issue `begin_connect()` when the link is down and the retry
    /// cadence allows it.  Returns `true` if an attempt was issued.
    pub fn on_tick(&mut self, now: Millis, retry: &mut Timer) -> bool {
        if self.status() == ConnectionState::Connected || !retry.elapsed(now) {
            return false;
        }
        self.begin_connect();
        retry.reset(now);
        true
    }

    /// Poll the port and commit the new logical state, reporting an edge
    /// into or out of `Connected`.
    pub fn observe(&mut self) -> Option<LinkTransition> {
        let previous = self.state;
        let current = self.status();
        self.state = current;

        match (previous.is_connected(), current.is_connected()) {
            (false, true) => {
                info!("Network: link up after {} attempt(s)", self.attempts);
                self.attempts = 0;
                Some(LinkTransition::Established)
            }
            (true, false) => {
                warn!("Network: link lost");
                Some(LinkTransition::Lost)
            }
            _ => None,
        }
    }

    /// Raw driver status code (diagnostics only).
    pub fn raw_status(&self) -> i32 {
        self.port.raw_status()
    }

    /// Station address, when one has been assigned.
    pub fn local_ip(&self) -> Option<Ipv4Addr> {
        self.port.local_ip()
    }

    /// Association requests issued since the link was last up.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn port(&self) -> &N {
        &self.port
    }

    pub fn port_mut(&mut self) -> &mut N {
        &mut self.port
    }
}
