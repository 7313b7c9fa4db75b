//! End-to-end agent behaviour over mock ports.

use sensorlink::app::commands::Command;
use sensorlink::config::PublishPolicy;
use sensorlink::error::SensorError;
use sensorlink::net::broker::BrokerError;
use sensorlink::sensors::PublishRecord;

use crate::mock_hw::{broker, broker_mut, rig, run, test_config, MockSensor};

// ── Startup ───────────────────────────────────────────────────

#[test]
fn start_drives_actuators_to_power_on_positions() {
    let (mut agent, _link, mut sink) = rig(&test_config(), MockSensor::steady(21.0, 55.0));
    agent.start(0, &mut sink);

    assert_eq!(
        agent.router().actuators().calls,
        vec![Command::SetSwitch(false), Command::SetPosition(20)]
    );
    assert_eq!(sink.events[0], "Started");
    assert_eq!(sink.count("NetworkConnecting"), 1);
    assert_eq!(agent.link().port().begins, 1);
}

// ── Boot to telemetry ─────────────────────────────────────────

#[test]
fn sticky_pair_survives_invalid_pass_and_literal_guard_holds_back() {
    let mut sensor = MockSensor::steady(21.0, 56.0);
    sensor.push(Ok(21.0), Ok(55.0));
    sensor.push(Err(SensorError::Timeout), Ok(56.0));
    let (mut agent, link, mut sink) = rig(&test_config(), sensor);

    agent.start(0, &mut sink);
    agent.tick(0, &mut sink);
    link.set(true);

    // Broker session at t=0.1 s.
    agent.tick(100, &mut sink);
    assert!(agent.broker().connected());
    assert_eq!(broker(&agent).connects, 1);
    assert_eq!(sink.count("NetworkConnected"), 1);

    // First sample at t=5 s: valid, both positive, literal guard says no.
    run(&mut agent, &mut sink, 200, 5_000, 100);
    assert_eq!(agent.sampler().passes(), 1);
    assert_eq!(
        agent.sampler().last_known_good(),
        PublishRecord { temperature: 21.0, humidity: 55.0 }
    );
    assert_eq!(sink.count("NotInitialized"), 1);
    assert!(broker(&agent).published.is_empty());

    // Second sample at t=10 s: temperature invalid, pair unchanged.
    run(&mut agent, &mut sink, 5_100, 10_000, 100);
    assert_eq!(agent.sampler().passes(), 2);
    assert_eq!(agent.sampler().failed_passes(), 1);
    assert_eq!(
        agent.sampler().last_known_good(),
        PublishRecord { temperature: 21.0, humidity: 55.0 }
    );
    assert_eq!(sink.count("NotInitialized"), 2);
    assert!(broker(&agent).published.is_empty());
}

// ── Publish guard ─────────────────────────────────────────────

#[test]
fn literal_guard_publishes_non_positive_pair() {
    let mut config = test_config();
    config.telemetry_topic = "your-topic".into();
    let (mut agent, link, mut sink) = rig(&config, MockSensor::steady(0.0, 40.0));
    agent.start(0, &mut sink);
    link.set(true);

    run(&mut agent, &mut sink, 0, 5_000, 100);

    assert_eq!(
        broker(&agent).published,
        vec![("your-topic".to_string(), "0.00,40.00".to_string())]
    );
    assert_eq!(sink.count("Published"), 1);
    assert_eq!(sink.count("NotInitialized"), 0);
}

#[test]
fn literal_guard_holds_back_positive_pair() {
    let (mut agent, link, mut sink) = rig(&test_config(), MockSensor::steady(22.5, 40.0));
    agent.start(0, &mut sink);
    link.set(true);

    run(&mut agent, &mut sink, 0, 5_000, 100);

    assert!(broker(&agent).published.is_empty());
    assert_eq!(sink.count("NotInitialized"), 1);
}

#[test]
fn require_non_zero_policy_publishes_positive_pair() {
    let mut config = test_config();
    config.publish_policy = PublishPolicy::RequireNonZero;
    let (mut agent, link, mut sink) = rig(&config, MockSensor::steady(22.5, 40.0));
    agent.start(0, &mut sink);
    link.set(true);

    run(&mut agent, &mut sink, 0, 10_000, 100);

    let published = &broker(&agent).published;
    assert_eq!(published.len(), 2);
    assert_eq!(published[0], ("lab/telemetry".to_string(), "22.50,40.00".to_string()));
}

#[test]
fn no_publish_attempt_without_broker_session() {
    let (mut agent, link, mut sink) = rig(&test_config(), MockSensor::steady(0.0, 0.0));
    broker_mut(&mut agent).reject = Some(BrokerError::ConnectFailed);
    agent.start(0, &mut sink);
    link.set(true);

    run(&mut agent, &mut sink, 0, 5_000, 100);

    // Sampling still happens; nothing is sent.
    assert_eq!(agent.sampler().passes(), 1);
    assert!(broker(&agent).published.is_empty());
    assert_eq!(sink.count("NotInitialized"), 0);
}

// ── Network cadence ───────────────────────────────────────────

#[test]
fn association_retried_every_period_while_offline() {
    let (mut agent, _link, mut sink) = rig(&test_config(), MockSensor::steady(21.0, 55.0));
    agent.start(0, &mut sink);

    run(&mut agent, &mut sink, 0, 20_000, 100);

    // Startup request plus retries at 5, 10, 15 and 20 s.
    assert_eq!(agent.link().port().begins, 5);
    assert_eq!(sink.count("WaitingForNetwork"), 201);
    assert_eq!(agent.sampler().passes(), 0);
    assert_eq!(broker(&agent).connects, 0);
    assert_eq!(broker(&agent).violations, 0);
}

#[test]
fn connected_banner_emitted_once_per_link_up() {
    let (mut agent, link, mut sink) = rig(&test_config(), MockSensor::steady(21.0, 55.0));
    agent.start(0, &mut sink);
    link.set(true);

    run(&mut agent, &mut sink, 0, 30_000, 100);
    assert_eq!(sink.count("NetworkConnected"), 1);
    assert!(
        sink.events
            .iter()
            .any(|e| e == "NetworkConnected { ip: Some(10.0.0.42) }")
    );
}

#[test]
fn link_loss_drops_session_and_silences_broker() {
    let (mut agent, link, mut sink) = rig(&test_config(), MockSensor::steady(21.0, 55.0));
    agent.start(0, &mut sink);
    link.set(true);
    run(&mut agent, &mut sink, 0, 1_000, 100);
    assert!(agent.broker().connected());

    link.set(false);
    run(&mut agent, &mut sink, 1_100, 9_000, 100);
    assert!(!agent.broker().connected());
    assert_eq!(sink.count("NetworkLost"), 1);
    assert_eq!(broker(&agent).violations, 0);
    assert_eq!(broker(&agent).connects, 1);

    // Link back: banner again and an immediate broker reconnect.
    link.set(true);
    agent.tick(9_100, &mut sink);
    assert_eq!(sink.count("NetworkConnected"), 2);
    assert_eq!(broker(&agent).connects, 2);
    assert!(agent.broker().connected());
}

// ── Broker cadence ────────────────────────────────────────────

#[test]
fn broker_attempts_spaced_by_retry_period() {
    let (mut agent, link, mut sink) = rig(&test_config(), MockSensor::steady(21.0, 55.0));
    broker_mut(&mut agent).reject = Some(BrokerError::ConnectFailed);
    agent.start(0, &mut sink);
    link.set(true);

    let mut attempts_at = Vec::new();
    let mut seen = 0;
    for now in (0..=15_000).step_by(100) {
        agent.tick(now, &mut sink);
        let connects = broker(&agent).connects;
        if connects != seen {
            attempts_at.push(now);
            seen = connects;
        }
    }

    assert_eq!(attempts_at, vec![0, 5_000, 10_000, 15_000]);
    assert_eq!(sink.count("BrokerConnectFailed(ConnectFailed)"), 4);
    assert_eq!(agent.broker().last_error(), Some(BrokerError::ConnectFailed));
}

#[test]
fn broker_recovers_once_it_accepts() {
    let (mut agent, link, mut sink) = rig(&test_config(), MockSensor::steady(21.0, 55.0));
    broker_mut(&mut agent).reject = Some(BrokerError::ConnectionTimeout);
    agent.start(0, &mut sink);
    link.set(true);
    run(&mut agent, &mut sink, 0, 2_000, 100);
    assert!(!agent.broker().connected());

    broker_mut(&mut agent).reject = None;
    run(&mut agent, &mut sink, 2_100, 4_900, 100);
    assert!(!agent.broker().connected(), "retry must wait for the period");

    agent.tick(5_000, &mut sink);
    assert!(agent.broker().connected());
    assert_eq!(
        broker(&agent).subscriptions,
        vec!["lab/lights".to_string(), "lab/servo".to_string()]
    );
}

#[test]
fn session_loss_reconnects_on_next_tick() {
    let (mut agent, link, mut sink) = rig(&test_config(), MockSensor::steady(21.0, 55.0));
    agent.start(0, &mut sink);
    link.set(true);
    run(&mut agent, &mut sink, 0, 1_000, 100);

    broker_mut(&mut agent).session_up = false;
    agent.tick(1_100, &mut sink);
    assert!(!agent.broker().connected());
    assert_eq!(sink.count("BrokerSessionLost(ConnectionLost)"), 1);

    agent.tick(1_200, &mut sink);
    assert!(agent.broker().connected());
    assert_eq!(broker(&agent).connects, 2);
}

// ── Inbound commands ──────────────────────────────────────────

#[test]
fn inbound_messages_drive_actuators() {
    let (mut agent, link, mut sink) = rig(&test_config(), MockSensor::steady(21.0, 55.0));
    agent.start(0, &mut sink);
    link.set(true);
    agent.tick(0, &mut sink);

    let b = broker_mut(&mut agent);
    b.inject("lab/lights", "TRUE");
    b.inject("lab/lights", "banana");
    b.inject("lab/servo", "90");
    b.inject("lab/servo", "abc");
    b.inject("lab/other", "1");
    agent.tick(100, &mut sink);

    assert_eq!(
        agent.router().actuators().calls[2..],
        [
            Command::SetSwitch(true),
            Command::SetSwitch(false),
            Command::SetPosition(90),
            Command::SetPosition(0),
        ]
    );
    assert_eq!(sink.count("MessageReceived"), 5);
    assert_eq!(sink.count("CommandApplied"), 4);
}

#[test]
fn local_command_bypasses_broker() {
    let (mut agent, _link, mut sink) = rig(&test_config(), MockSensor::steady(21.0, 55.0));
    agent.apply(Command::SetPosition(135), &mut sink);
    assert_eq!(agent.router().actuators().calls, vec![Command::SetPosition(135)]);
    assert_eq!(sink.events, vec!["CommandApplied(SetPosition(135))".to_string()]);
}
