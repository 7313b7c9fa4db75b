//! Fuzz target: `CommandRouter::dispatch`
//!
//! Splits the input at the first NUL into a topic and a payload and feeds
//! them through the router.  Every message must produce a decision
//! without panicking, and only the two command topics may reach the
//! actuators.
//!
//! cargo fuzz run fuzz_command_router

#![no_main]

use libfuzzer_sys::fuzz_target;
use sensorlink::app::commands::{parse_position, parse_switch, Command};
use sensorlink::app::ports::ActuatorPort;
use sensorlink::app::router::CommandRouter;
use sensorlink::config::AgentConfig;

#[derive(Default)]
struct Tally(u32);

impl ActuatorPort for Tally {
    fn set_switch(&mut self, _on: bool) {
        self.0 += 1;
    }

    fn set_position(&mut self, _degrees: i32) {
        self.0 += 1;
    }
}

fuzz_target!(|data: &[u8]| {
    let split = data.iter().position(|&b| b == 0).unwrap_or(data.len());
    let (topic, rest) = data.split_at(split);
    let payload = rest.get(1..).unwrap_or(&[]);
    let Ok(topic) = core::str::from_utf8(topic) else {
        return;
    };

    let config = AgentConfig {
        namespace: "fz".into(),
        client_id: "fuzz".into(),
        ..AgentConfig::default()
    };
    let mut router = CommandRouter::new(
        Tally::default(),
        config.switch_topic(),
        config.position_topic(),
    );

    match router.dispatch(topic, payload) {
        Some(Command::SetSwitch(on)) => {
            assert_eq!(topic, "fz/lights");
            assert_eq!(on, parse_switch(payload));
        }
        Some(Command::SetPosition(deg)) => {
            assert_eq!(topic, "fz/servo");
            assert_eq!(deg, parse_position(payload));
        }
        None => assert_eq!(router.actuators().0, 0),
    }
});
