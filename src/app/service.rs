//! Application service: the hexagonal core.
//!
//! [`Agent`] owns the connectivity state machines, the sampler, the
//! command router, and one [`Timer`] per cadence.  It exposes a single
//! non-blocking `tick(now)`; all I/O flows through port traits injected
//! at construction, making the whole agent testable with mock adapters.
//!
//! ```text
//!  NetworkPort ──▶ ┌─────────────────────────────┐ ──▶ EventSink
//!   BrokerPort ◀─▶ │            Agent            │
//!   SensorPort ──▶ │ Link · Broker · Sampler ·   │
//! ActuatorPort ◀── │ Router · 3 × Timer          │
//!                  └─────────────────────────────┘
//! ```
//!
//! ## Tick order
//!
//! 0. Observe the link; a drop discards the broker session.
//! 1. Link down: drive the retry cadence, report, **return**.
//! 2. Link freshly up (network retry timer cleared): announce once.
//! 3. Broker down and broker retry due: one bounded connect attempt.
//! 4. Service the broker session (no-op unless connected).
//! 5. Sample timer due: sample, then publish per [`PublishPolicy`].
//!
//! The broker is never touched while the link is not `Connected`.

use log::{info, warn};

use crate::config::{AgentConfig, ConfigError, PublishPolicy, Topic};
use crate::net::broker::{BrokerClient, BrokerError};
use crate::net::network::{LinkTransition, NetworkLink};
use crate::sensors::SensorSampler;
use crate::timer::{Millis, Timer};

use super::commands::Command;
use super::events::AppEvent;
use super::ports::{ActuatorPort, BrokerPort, EventSink, NetworkPort, SensorPort};
use super::router::CommandRouter;

// ───────────────────────────────────────────────────────────────
// Agent
// ───────────────────────────────────────────────────────────────

/// The coordinating core.  Constructed once, ticked forever.
pub struct Agent<N, B, S, A> {
    link: NetworkLink<N>,
    broker: BrokerClient<B>,
    sampler: SensorSampler<S>,
    router: CommandRouter<A>,

    /// Association retry cadence.  Cleared when the link comes up, which
    /// doubles as the "announce once" sentinel.
    network_retry: Timer,
    /// Broker connect cadence.  Cleared after a successful connect so the
    /// next loss retries immediately.
    broker_retry: Timer,
    sample_timer: Timer,

    client_id: String,
    telemetry_topic: Topic,
    initial_position: i32,
    publish_policy: PublishPolicy,
    tick_count: u64,
}

impl<N, B, S, A> Agent<N, B, S, A>
where
    N: NetworkPort,
    B: BrokerPort,
    S: SensorPort,
    A: ActuatorPort,
{
    /// Wire the agent from validated configuration and its four ports.
    ///
    /// Does **not** touch hardware; call [`start`](Self::start) next.
    pub fn new(
        config: &AgentConfig,
        network: N,
        broker: B,
        sensor: S,
        actuators: A,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut telemetry_topic = Topic::new();
        telemetry_topic
            .push_str(&config.telemetry_topic)
            .map_err(|_| ConfigError::ValidationFailed("telemetry_topic too long"))?;

        let router = CommandRouter::new(actuators, config.switch_topic(), config.position_topic());
        let broker = BrokerClient::new(broker, router.topics());

        Ok(Self {
            link: NetworkLink::new(network),
            broker,
            sampler: SensorSampler::new(sensor),
            router,
            network_retry: Timer::new(config.network_retry_ms),
            broker_retry: Timer::cleared(config.broker_retry_ms),
            sample_timer: Timer::new(config.sample_interval_ms),
            client_id: config.client_id.clone(),
            telemetry_topic,
            initial_position: config.initial_position,
            publish_policy: config.publish_policy,
            tick_count: 0,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Put the actuators in their power-on positions and issue the first
    /// association request.
    pub fn start(&mut self, now: Millis, sink: &mut impl EventSink) {
        let actuators = self.router.actuators_mut();
        actuators.set_switch(false);
        actuators.set_position(self.initial_position);
        sink.emit(&AppEvent::Started);
        info!(
            "Agent started (client '{}', position {}°)",
            self.client_id, self.initial_position
        );

        self.link.begin_connect();
        self.network_retry.reset(now);
        sink.emit(&AppEvent::NetworkConnecting {
            attempt: self.link.attempts(),
        });
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one non-blocking iteration.  Only the broker connect attempt
    /// (step 3) may block, bounded by the transport timeout.
    pub fn tick(&mut self, now: Millis, sink: &mut impl EventSink) {
        self.tick_count += 1;

        // 0. Link edges
        match self.link.observe() {
            Some(LinkTransition::Established) => self.network_retry.clear(),
            Some(LinkTransition::Lost) => {
                self.broker.drop_session();
                sink.emit(&AppEvent::NetworkLost);
            }
            None => {}
        }

        // 1. Offline: retry cadence only
        if !self.link.state().is_connected() {
            if self.link.on_tick(now, &mut self.network_retry) {
                sink.emit(&AppEvent::NetworkConnecting {
                    attempt: self.link.attempts(),
                });
            }
            sink.emit(&AppEvent::WaitingForNetwork {
                state: self.link.state(),
                raw_status: self.link.raw_status(),
            });
            return;
        }

        // 2. One-time banner
        if self.network_retry.is_cleared() {
            sink.emit(&AppEvent::NetworkConnected {
                ip: self.link.local_ip(),
            });
            self.network_retry.reset(now);
        }

        // 3. Broker (re)connect
        if !self.broker.connected() && self.broker_retry.elapsed(now) {
            self.connect_broker(now, sink);
        }

        // 4. Inbound commands
        self.service_broker(sink);

        // 5. Sample + publish
        if self.sample_timer.fire_if_elapsed(now) {
            let reading = self.sampler.sample();
            sink.emit(&AppEvent::Sampled(reading));
            if self.broker.connected() {
                self.publish_telemetry(sink);
            }
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Apply a command outside the broker path (e.g. a local button).
    pub fn apply(&mut self, command: Command, sink: &mut impl EventSink) {
        self.router.apply(command);
        sink.emit(&AppEvent::CommandApplied(command));
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn link(&self) -> &NetworkLink<N> {
        &self.link
    }

    pub fn broker(&self) -> &BrokerClient<B> {
        &self.broker
    }

    pub fn sampler(&self) -> &SensorSampler<S> {
        &self.sampler
    }

    pub fn router(&self) -> &CommandRouter<A> {
        &self.router
    }

    pub fn network_retry(&self) -> &Timer {
        &self.network_retry
    }

    pub fn broker_retry(&self) -> &Timer {
        &self.broker_retry
    }

    pub fn sample_timer(&self) -> &Timer {
        &self.sample_timer
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Total ticks executed since construction.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Mutable broker access for host-side injection.
    pub fn broker_mut(&mut self) -> &mut BrokerClient<B> {
        &mut self.broker
    }

    // ── Internal ──────────────────────────────────────────────

    fn connect_broker(&mut self, now: Millis, sink: &mut impl EventSink) {
        self.broker_retry.reset(now);
        sink.emit(&AppEvent::BrokerConnecting {
            client_id: &self.client_id,
        });

        if self.broker.connect(&self.client_id) {
            self.broker_retry.clear();
            sink.emit(&AppEvent::BrokerConnected);
        } else {
            let code = self.broker.last_error().unwrap_or(BrokerError::ConnectFailed);
            sink.emit(&AppEvent::BrokerConnectFailed(code));
        }
    }

    fn service_broker(&mut self, sink: &mut impl EventSink) {
        let router = &mut self.router;
        let report = self.broker.service(|msg| {
            sink.emit(&AppEvent::MessageReceived {
                topic: &msg.topic,
                payload: &msg.payload,
            });
            if let Some(command) = router.dispatch(&msg.topic, &msg.payload) {
                sink.emit(&AppEvent::CommandApplied(command));
            }
        });

        if let Some(e) = report.session_lost {
            sink.emit(&AppEvent::BrokerSessionLost(e));
        }
    }

    fn publish_telemetry(&mut self, sink: &mut impl EventSink) {
        let record = self.sampler.last_known_good();
        if !self.publish_policy.permits(record.temperature, record.humidity) {
            sink.emit(&AppEvent::NotInitialized(record));
            return;
        }

        let payload = record.payload();
        if self.broker.publish(&self.telemetry_topic, payload.as_bytes()) {
            sink.emit(&AppEvent::Published {
                topic: &self.telemetry_topic,
                payload: &payload,
            });
        } else {
            warn!("Agent: telemetry publish failed");
            sink.emit(&AppEvent::PublishFailed {
                topic: &self.telemetry_topic,
            });
        }
    }
}
