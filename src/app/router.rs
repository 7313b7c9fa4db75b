//! Command dispatch: (topic, payload) → [`Command`] → actuator.

use log::{debug, info};

use super::commands::{Command, parse_position, parse_switch};
use super::ports::ActuatorPort;
use crate::config::Topic;

/// Owns the actuator port and knows the two command topics.
pub struct CommandRouter<A> {
    actuators: A,
    switch_topic: Topic,
    position_topic: Topic,
}

impl<A: ActuatorPort> CommandRouter<A> {
    pub fn new(actuators: A, switch_topic: Topic, position_topic: Topic) -> Self {
        Self {
            actuators,
            switch_topic,
            position_topic,
        }
    }

    /// Decode an inbound message.  Unknown topics yield `None`.
    pub fn route(&self, topic: &str, payload: &[u8]) -> Option<Command> {
        if topic == self.switch_topic.as_str() {
            Some(Command::SetSwitch(parse_switch(payload)))
        } else if topic == self.position_topic.as_str() {
            Some(Command::SetPosition(parse_position(payload)))
        } else {
            debug!("Router: ignoring message on '{}'", topic);
            None
        }
    }

    /// Forward a command to its actuator.
    pub fn apply(&mut self, command: Command) {
        info!("Router: applying {:?}", command);
        match command {
            Command::SetSwitch(on) => self.actuators.set_switch(on),
            Command::SetPosition(degrees) => self.actuators.set_position(degrees),
        }
    }

    /// `route` then `apply`.  Returns the command that was applied.
    pub fn dispatch(&mut self, topic: &str, payload: &[u8]) -> Option<Command> {
        let command = self.route(topic, payload)?;
        self.apply(command);
        Some(command)
    }

    /// The two topics to subscribe to, switch first.
    pub fn topics(&self) -> [Topic; 2] {
        [self.switch_topic.clone(), self.position_topic.clone()]
    }

    pub fn actuators(&self) -> &A {
        &self.actuators
    }

    pub fn actuators_mut(&mut self) -> &mut A {
        &mut self.actuators
    }
}
