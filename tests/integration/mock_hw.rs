//! Mock adapters for integration tests.
//!
//! Every port records what the agent asked of it so tests can assert on
//! the full call history without touching real radio, sockets, or GPIO.
//! The network and broker mocks share one `link` flag: the broker mock
//! counts any call made while that flag is down as a violation.

use std::cell::Cell;
use std::collections::VecDeque;
use std::net::Ipv4Addr;
use std::rc::Rc;

use sensorlink::app::commands::Command;
use sensorlink::app::events::AppEvent;
use sensorlink::app::ports::{ActuatorPort, BrokerPort, EventSink, NetworkPort, SensorPort};
use sensorlink::app::service::Agent;
use sensorlink::config::AgentConfig;
use sensorlink::error::SensorError;
use sensorlink::net::broker::{BrokerError, InboundMessage};

pub type Link = Rc<Cell<bool>>;
pub type TestAgent = Agent<MockNetwork, MockBroker, MockSensor, MockActuators>;

// ── MockNetwork ───────────────────────────────────────────────

pub struct MockNetwork {
    pub link: Link,
    pub begins: u32,
}

impl NetworkPort for MockNetwork {
    fn begin_connect(&mut self) {
        self.begins += 1;
    }

    fn is_connected(&self) -> bool {
        self.link.get()
    }

    fn raw_status(&self) -> i32 {
        if self.link.get() { 3 } else { 6 }
    }

    fn local_ip(&self) -> Option<Ipv4Addr> {
        self.link.get().then(|| Ipv4Addr::new(10, 0, 0, 42))
    }
}

// ── MockBroker ────────────────────────────────────────────────

pub struct MockBroker {
    link: Link,
    /// Refuse connects with this error while set.
    pub reject: Option<BrokerError>,
    pub session_up: bool,
    pub connects: u32,
    pub subscriptions: Vec<String>,
    pub published: Vec<(String, String)>,
    pub inbox: VecDeque<InboundMessage>,
    /// Calls made while the shared link flag was down.
    pub violations: u32,
}

#[allow(dead_code)]
impl MockBroker {
    pub fn new(link: Link) -> Self {
        Self {
            link,
            reject: None,
            session_up: false,
            connects: 0,
            subscriptions: Vec::new(),
            published: Vec::new(),
            inbox: VecDeque::new(),
            violations: 0,
        }
    }

    pub fn inject(&mut self, topic: &str, payload: &str) {
        let msg = InboundMessage::new(topic, payload.as_bytes()).expect("message fits");
        self.inbox.push_back(msg);
    }

    fn guard(&mut self) {
        if !self.link.get() {
            self.violations += 1;
        }
    }
}

impl BrokerPort for MockBroker {
    fn connect(&mut self, _client_id: &str) -> Result<(), BrokerError> {
        self.guard();
        self.connects += 1;
        match self.reject {
            Some(e) => Err(e),
            None => {
                self.session_up = true;
                Ok(())
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.session_up
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), BrokerError> {
        self.guard();
        self.subscriptions.push(topic.to_string());
        Ok(())
    }

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), BrokerError> {
        self.guard();
        self.published.push((
            topic.to_string(),
            String::from_utf8_lossy(payload).into_owned(),
        ));
        Ok(())
    }

    fn poll(&mut self) -> Result<(), BrokerError> {
        self.guard();
        if self.session_up {
            Ok(())
        } else {
            Err(BrokerError::ConnectionLost)
        }
    }

    fn next_message(&mut self) -> Option<InboundMessage> {
        self.guard();
        self.inbox.pop_front()
    }
}

// ── MockSensor ────────────────────────────────────────────────

/// Replays scripted passes, then repeats `steady` forever.
pub struct MockSensor {
    pub script: VecDeque<(Result<f32, SensorError>, Result<f32, SensorError>)>,
    pub steady: (Result<f32, SensorError>, Result<f32, SensorError>),
    pending_humidity: Option<Result<f32, SensorError>>,
    pub reads: u32,
}

#[allow(dead_code)]
impl MockSensor {
    pub fn steady(temperature: f32, humidity: f32) -> Self {
        Self {
            script: VecDeque::new(),
            steady: (Ok(temperature), Ok(humidity)),
            pending_humidity: None,
            reads: 0,
        }
    }

    pub fn push(&mut self, t: Result<f32, SensorError>, h: Result<f32, SensorError>) {
        self.script.push_back((t, h));
    }
}

impl SensorPort for MockSensor {
    fn read_temperature(&mut self) -> Result<f32, SensorError> {
        self.reads += 1;
        let (t, h) = self.script.pop_front().unwrap_or(self.steady);
        self.pending_humidity = Some(h);
        t
    }

    fn read_humidity(&mut self) -> Result<f32, SensorError> {
        self.reads += 1;
        self.pending_humidity.take().unwrap_or(self.steady.1)
    }
}

// ── MockActuators ─────────────────────────────────────────────

#[derive(Default)]
pub struct MockActuators {
    pub calls: Vec<Command>,
}

impl ActuatorPort for MockActuators {
    fn set_switch(&mut self, on: bool) {
        self.calls.push(Command::SetSwitch(on));
    }

    fn set_position(&mut self, degrees: i32) {
        self.calls.push(Command::SetPosition(degrees));
    }
}

// ── RecordingSink ─────────────────────────────────────────────

/// Keeps the `Debug` rendering of every event.
#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<String>,
}

#[allow(dead_code)]
impl RecordingSink {
    /// Number of events whose rendering starts with `variant`.
    pub fn count(&self, variant: &str) -> usize {
        self.events.iter().filter(|e| e.starts_with(variant)).count()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent<'_>) {
        self.events.push(format!("{:?}", event));
    }
}

// ── Rig ───────────────────────────────────────────────────────

#[allow(dead_code)]
pub fn test_config() -> AgentConfig {
    AgentConfig {
        namespace: "lab".into(),
        client_id: "test-node".into(),
        telemetry_topic: "lab/telemetry".into(),
        ..AgentConfig::default()
    }
}

/// Build an agent over fresh mocks.  The link starts down.
#[allow(dead_code)]
pub fn rig(config: &AgentConfig, sensor: MockSensor) -> (TestAgent, Link, RecordingSink) {
    let link: Link = Rc::new(Cell::new(false));
    let agent = Agent::new(
        config,
        MockNetwork {
            link: link.clone(),
            begins: 0,
        },
        MockBroker::new(link.clone()),
        sensor,
        MockActuators::default(),
    )
    .expect("valid test config");
    (agent, link, RecordingSink::default())
}

/// Tick every `step` ms over `[from, to]`.
#[allow(dead_code)]
pub fn run(agent: &mut TestAgent, sink: &mut RecordingSink, from: u32, to: u32, step: u32) {
    let mut now = from;
    while now <= to {
        agent.tick(now, sink);
        now += step;
    }
}

#[allow(dead_code)]
pub fn broker(agent: &TestAgent) -> &MockBroker {
    agent.broker().port()
}

#[allow(dead_code)]
pub fn broker_mut(agent: &mut TestAgent) -> &mut MockBroker {
    agent.broker_mut().port_mut()
}
