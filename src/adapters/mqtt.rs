//! MQTT transport adapter.
//!
//! Implements [`BrokerPort`] for the agent's broker session.
//!
//! The client task and the control loop share a `Mailbox`: inbound
//! publishes go through a bounded `embassy-sync` channel (overflow is
//! dropped and counted), and session changes through a latest-value
//! `Signal` so they are never lost behind a full channel.
//!
//! ```text
//! ┌──────────────┐ InboundMessage ┌──────────────┐
//! │ client task  │───────────────▶│ control loop │
//! │ (callback)   │ SessionEvent   │ poll()/next  │
//! └──────────────┘───────────────▶└──────────────┘
//! ```
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `esp_idf_svc::mqtt::client::EspMqttClient`.
//!   Its event callback posts into the mailbox from the client task.
//!   `connect()` waits for the session event for at most the configured
//!   connect timeout.
//! - **all other targets**: in-memory broker model for host-side tests,
//!   posting into the same mailbox.
//!
//! All publishes and subscriptions are QoS 0 (at most once).

use core::sync::atomic::{AtomicU32, Ordering};
use core::time::Duration;
use std::sync::Arc;
use std::time::Instant;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use log::{debug, info, warn};

use crate::app::ports::BrokerPort;
use crate::config::AgentConfig;
use crate::net::broker::{BrokerError, InboundMessage};

#[cfg(target_os = "espidf")]
use esp_idf_hal::delay::FreeRtos;
#[cfg(target_os = "espidf")]
use esp_idf_svc::mqtt::client::{EspMqttClient, EventPayload, MqttClientConfiguration, QoS};

/// Inbound messages buffered between the client task and `next_message()`.
pub const INBOX_CAPACITY: usize = 16;

/// Session changes reported by the client task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionEvent {
    Up,
    Down,
    Refused(BrokerError),
}

/// State shared between the client task and the control loop.
struct Mailbox {
    messages: Channel<CriticalSectionRawMutex, InboundMessage, INBOX_CAPACITY>,
    session: Signal<CriticalSectionRawMutex, SessionEvent>,
    dropped: AtomicU32,
}

impl Mailbox {
    fn new() -> Self {
        Self {
            messages: Channel::new(),
            session: Signal::new(),
            dropped: AtomicU32::new(0),
        }
    }

    /// Queue without blocking; a full inbox drops the newest message.
    fn post(&self, msg: InboundMessage) {
        if msg.truncated {
            debug!("MQTT: payload on {} truncated", msg.topic);
        }
        if self.messages.try_send(msg).is_err() {
            let total = self.dropped.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
            warn!("MQTT: inbox full, message dropped ({} total)", total);
        }
    }

    fn report(&self, event: SessionEvent) {
        self.session.signal(event);
    }

    /// Forget everything queued for a previous session.
    fn reset(&self) {
        while self.messages.try_receive().is_ok() {}
        self.session.reset();
    }
}

/// Transport settings taken from [`AgentConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MqttSettings {
    pub url: String,
    pub keep_alive: Duration,
    pub connect_timeout: Duration,
}

impl MqttSettings {
    pub fn from_config(config: &AgentConfig) -> Self {
        Self {
            url: config.broker_url(),
            keep_alive: Duration::from_secs(u64::from(config.keep_alive_secs)),
            connect_timeout: Duration::from_millis(u64::from(config.broker_connect_timeout_ms)),
        }
    }
}

pub struct MqttAdapter {
    settings: MqttSettings,
    connected: bool,
    mailbox: Arc<Mailbox>,
    #[cfg(target_os = "espidf")]
    client: Option<EspMqttClient<'static>>,
    #[cfg(not(target_os = "espidf"))]
    sim: SimBroker,
}

/// Host-side broker model.
#[cfg(not(target_os = "espidf"))]
#[derive(Debug, Default)]
struct SimBroker {
    reject: Option<BrokerError>,
    silent: bool,
    session_up: bool,
    subscriptions: Vec<String>,
    published: Vec<(String, Vec<u8>)>,
    connects: u32,
}

impl MqttAdapter {
    pub fn new(settings: MqttSettings) -> Self {
        Self {
            settings,
            connected: false,
            mailbox: Arc::new(Mailbox::new()),
            #[cfg(target_os = "espidf")]
            client: None,
            #[cfg(not(target_os = "espidf"))]
            sim: SimBroker::default(),
        }
    }

    pub fn settings(&self) -> &MqttSettings {
        &self.settings
    }

    /// Inbound messages discarded because the inbox was full.
    pub fn dropped(&self) -> u32 {
        self.mailbox.dropped.load(Ordering::Relaxed)
    }

    /// Wait for the client task to confirm or refuse the session.
    fn await_session(&self) -> Result<(), BrokerError> {
        let deadline = Instant::now() + self.settings.connect_timeout;
        loop {
            match self.mailbox.session.try_take() {
                Some(SessionEvent::Up) => return Ok(()),
                Some(SessionEvent::Refused(e)) => return Err(e),
                Some(SessionEvent::Down) => return Err(BrokerError::ConnectFailed),
                None => {}
            }
            if Instant::now() >= deadline {
                return Err(BrokerError::ConnectionTimeout);
            }
            pause();
        }
    }

    // ── Simulation controls ───────────────────────────────────

    /// Refuse subsequent connects with `error` (`None` accepts again).
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_reject(&mut self, error: Option<BrokerError>) {
        self.sim.reject = error;
    }

    /// Never answer subsequent connects.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_silent(&mut self, silent: bool) {
        self.sim.silent = silent;
    }

    /// Deliver a message from another client.  Dropped unless the topic
    /// is subscribed and the session is up.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_inject(&mut self, topic: &str, payload: &[u8]) {
        if !self.sim.session_up || !self.sim.subscriptions.iter().any(|t| t == topic) {
            return;
        }
        if let Some(msg) = InboundMessage::new(topic, payload) {
            self.mailbox.post(msg);
        }
    }

    /// Server-side disconnect.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_drop_session(&mut self) {
        self.sim.session_up = false;
        self.mailbox.report(SessionEvent::Down);
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn sim_published(&self) -> &[(String, Vec<u8>)] {
        &self.sim.published
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn sim_connects(&self) -> u32 {
        self.sim.connects
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn sim_subscriptions(&self) -> &[String] {
        &self.sim.subscriptions
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_connect(&mut self, client_id: &str) -> Result<(), BrokerError> {
        // A fresh client per attempt; the previous one (if any) is torn
        // down first so its task stops posting behind our back.
        self.client = None;
        self.mailbox.reset();

        let conf = MqttClientConfiguration {
            client_id: Some(client_id),
            keep_alive_interval: Some(self.settings.keep_alive),
            network_timeout: self.settings.connect_timeout,
            ..Default::default()
        };

        let mailbox = Arc::clone(&self.mailbox);
        let client = EspMqttClient::new_cb(&self.settings.url, &conf, move |event| {
            match event.payload() {
                EventPayload::Connected(_) => mailbox.report(SessionEvent::Up),
                EventPayload::Disconnected => mailbox.report(SessionEvent::Down),
                EventPayload::Error(e) => {
                    warn!("MQTT: transport error {}", e);
                    mailbox.report(SessionEvent::Refused(BrokerError::ConnectFailed));
                }
                EventPayload::Received {
                    topic: Some(topic),
                    data,
                    ..
                } => {
                    if let Some(msg) = InboundMessage::new(topic, data) {
                        mailbox.post(msg);
                    }
                }
                _ => {}
            }
        })
        .map_err(|e| {
            warn!("MQTT: client init failed: {}", e);
            BrokerError::ConnectFailed
        })?;

        let outcome = self.await_session();
        if outcome.is_ok() {
            self.client = Some(client);
        }
        outcome
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_connect(&mut self, _client_id: &str) -> Result<(), BrokerError> {
        self.mailbox.reset();
        self.sim.connects = self.sim.connects.wrapping_add(1);
        self.sim.subscriptions.clear();
        self.sim.session_up = false;
        if !self.sim.silent {
            match self.sim.reject {
                Some(e) => self.mailbox.report(SessionEvent::Refused(e)),
                None => {
                    self.sim.session_up = true;
                    self.mailbox.report(SessionEvent::Up);
                }
            }
        }
        self.await_session()
    }

    #[cfg(target_os = "espidf")]
    fn platform_subscribe(&mut self, topic: &str) -> Result<(), BrokerError> {
        let client = self.client.as_mut().ok_or(BrokerError::Disconnected)?;
        client
            .subscribe(topic, QoS::AtMostOnce)
            .map(|_| ())
            .map_err(|_| BrokerError::ConnectionLost)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_subscribe(&mut self, topic: &str) -> Result<(), BrokerError> {
        self.sim.subscriptions.push(topic.into());
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), BrokerError> {
        let client = self.client.as_mut().ok_or(BrokerError::Disconnected)?;
        // enqueue() hands the frame to the client task without waiting.
        client
            .enqueue(topic, QoS::AtMostOnce, false, payload)
            .map(|_| ())
            .map_err(|_| BrokerError::ConnectionLost)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), BrokerError> {
        self.sim.published.push((topic.into(), payload.to_vec()));
        Ok(())
    }
}

/// Yield while waiting on the client task.
#[cfg(target_os = "espidf")]
fn pause() {
    FreeRtos::delay_ms(10);
}

#[cfg(not(target_os = "espidf"))]
fn pause() {
    std::thread::sleep(Duration::from_millis(1));
}

// ───────────────────────────────────────────────────────────────
// BrokerPort
// ───────────────────────────────────────────────────────────────

impl BrokerPort for MqttAdapter {
    fn connect(&mut self, client_id: &str) -> Result<(), BrokerError> {
        info!("MQTT: connecting to {} as '{}'", self.settings.url, client_id);
        let result = self.platform_connect(client_id);
        self.connected = result.is_ok();
        result
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), BrokerError> {
        if !self.connected {
            return Err(BrokerError::Disconnected);
        }
        self.platform_subscribe(topic)
    }

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), BrokerError> {
        if !self.connected {
            return Err(BrokerError::Disconnected);
        }
        self.platform_publish(topic, payload)
    }

    fn poll(&mut self) -> Result<(), BrokerError> {
        if let Some(event) = self.mailbox.session.try_take() {
            // A second `Up` means the client task reconnected on its own
            // after a drop we never saw; the subscriptions are gone.
            self.connected = event == SessionEvent::Up && !self.connected;
        }
        if self.connected {
            Ok(())
        } else {
            Err(BrokerError::ConnectionLost)
        }
    }

    fn next_message(&mut self) -> Option<InboundMessage> {
        self.mailbox.messages.try_receive().ok()
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
