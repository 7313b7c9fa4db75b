//! Broker session over the simulated MQTT transport.

use sensorlink::adapters::mqtt::{INBOX_CAPACITY, MqttAdapter, MqttSettings};
use sensorlink::app::commands::Command;
use sensorlink::app::router::CommandRouter;
use sensorlink::net::broker::{BrokerClient, BrokerError, MAX_INBOUND_BATCH};

use crate::mock_hw::{test_config, MockActuators};

fn session() -> (BrokerClient<MqttAdapter>, CommandRouter<MockActuators>) {
    let config = test_config();
    let router = CommandRouter::new(
        MockActuators::default(),
        config.switch_topic(),
        config.position_topic(),
    );
    let mut client = BrokerClient::new(
        MqttAdapter::new(MqttSettings::from_config(&config)),
        router.topics(),
    );
    assert!(client.connect(&config.client_id));
    (client, router)
}

#[test]
fn oversize_payloads_are_truncated_not_lost() {
    let (mut client, mut router) = session();

    let mut position = b"90".to_vec();
    position.resize(202, b' ');
    let adapter = client.port_mut();
    adapter.sim_inject("lab/lights", b"true");
    adapter.sim_inject("lab/lights", &[b'x'; 200]);
    adapter.sim_inject("lab/servo", &position);

    let report = client.service(|msg| {
        router.dispatch(&msg.topic, &msg.payload);
    });

    assert_eq!(report.handled, 3);
    assert_eq!(
        router.actuators().calls,
        vec![
            Command::SetSwitch(true),
            Command::SetSwitch(false),
            Command::SetPosition(90),
        ]
    );
    assert_eq!(client.port().dropped(), 0);
}

#[test]
fn burst_beyond_inbox_is_counted_and_rest_delivered() {
    let (mut client, mut router) = session();
    for deg in 0..(INBOX_CAPACITY + 5) {
        client.port_mut().sim_inject("lab/servo", deg.to_string().as_bytes());
    }
    assert_eq!(client.port().dropped(), 5);

    let mut handled = 0;
    while handled < INBOX_CAPACITY {
        let report = client.service(|msg| {
            router.dispatch(&msg.topic, &msg.payload);
        });
        assert!(report.handled <= MAX_INBOUND_BATCH);
        assert!(report.handled > 0);
        handled += report.handled;
    }

    let calls = &router.actuators().calls;
    assert_eq!(calls.len(), INBOX_CAPACITY);
    assert_eq!(calls[0], Command::SetPosition(0));
    assert_eq!(calls[INBOX_CAPACITY - 1], Command::SetPosition(15));
}

#[test]
fn refused_session_keeps_its_error() {
    let config = test_config();
    let mut adapter = MqttAdapter::new(MqttSettings::from_config(&config));
    adapter.sim_reject(Some(BrokerError::ConnectFailed));
    let mut client = BrokerClient::new(adapter, [config.switch_topic(), config.position_topic()]);

    assert!(!client.connect(&config.client_id));
    assert_eq!(client.last_error(), Some(BrokerError::ConnectFailed));
    assert!(client.port().sim_subscriptions().is_empty());
}

#[test]
fn server_drop_ends_session_on_next_service() {
    let (mut client, _router) = session();
    assert_eq!(client.port().sim_subscriptions(), ["lab/lights", "lab/servo"]);

    client.port_mut().sim_drop_session();
    let report = client.service(|_| panic!("no delivery after a drop"));
    assert_eq!(report.session_lost, Some(BrokerError::ConnectionLost));
    assert!(!client.connected());
}
