//! Agent configuration parameters
//!
//! All tunable parameters for the SensorLink agent.  Credentials and
//! endpoints are pre-provisioned (baked in at build time or handed over by
//! the bootstrap code); nothing here is persisted at runtime.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Longest topic the inbound queue and router can hold.
pub const MAX_TOPIC_LEN: usize = 64;

/// Fixed-capacity topic string.
pub type Topic = heapless::String<MAX_TOPIC_LEN>;

/// Suffix of the binary-switch command topic.
pub const SWITCH_TOPIC_SUFFIX: &str = "lights";
/// Suffix of the positional-actuator command topic.
pub const POSITION_TOPIC_SUFFIX: &str = "servo";

/// Which condition gates a telemetry publish after each sampling pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishPolicy {
    /// Publish only when `temperature <= 0 || humidity <= 0`; otherwise
    /// report "not yet initialised".  This is the shipped field behaviour
    /// and must stay the default until a product owner signs off on the
    /// alternative.
    #[default]
    NonPositiveOnly,
    /// Publish only when both values are strictly positive.
    RequireNonZero,
}

impl PublishPolicy {
    /// Whether a pair of last-known-good values may be published.
    pub fn permits(self, temperature: f32, humidity: f32) -> bool {
        match self {
            Self::NonPositiveOnly => temperature <= 0.0 || humidity <= 0.0,
            Self::RequireNonZero => temperature > 0.0 && humidity > 0.0,
        }
    }
}

/// Core agent configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    // --- Identity / topics ---
    /// Prefix of the two command topics (`<namespace>/lights`, `<namespace>/servo`).
    pub namespace: String,
    /// Broker client identifier.  Empty = derive from the factory MAC.
    pub client_id: String,
    /// Topic the `"<temperature>,<humidity>"` telemetry pair is published on.
    pub telemetry_topic: String,

    // --- Network ---
    pub wifi_ssid: String,
    pub wifi_password: String,
    pub broker_host: String,
    pub broker_port: u16,

    // --- Timing ---
    /// Minimum spacing of wireless association retries (milliseconds).
    pub network_retry_ms: u32,
    /// Minimum spacing of broker connect attempts (milliseconds).
    pub broker_retry_ms: u32,
    /// Sensor sample / publish cadence (milliseconds).
    pub sample_interval_ms: u32,
    /// Upper bound on the blocking broker connect call (milliseconds).
    pub broker_connect_timeout_ms: u32,
    /// Broker keep-alive interval (seconds).
    pub keep_alive_secs: u16,

    // --- Actuators ---
    /// Angle the positional actuator is driven to at startup (degrees).
    pub initial_position: i32,

    // --- Telemetry ---
    pub publish_policy: PublishPolicy,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            namespace: "your-name".into(),
            client_id: String::new(),
            telemetry_topic: "your-topic".into(),

            wifi_ssid: "your-wifi-ssid".into(),
            wifi_password: "your-wifi-password".into(),
            broker_host: "your-mqtt.broker.com".into(),
            broker_port: 1883,

            network_retry_ms: 5_000,
            broker_retry_ms: 5_000,
            sample_interval_ms: 5_000,
            broker_connect_timeout_ms: 3_000,
            keep_alive_secs: 15,

            initial_position: 20,

            publish_policy: PublishPolicy::NonPositiveOnly,
        }
    }
}

impl AgentConfig {
    /// Build the runtime configuration from an optional provisioned JSON
    /// document.  Missing fields take their default value, and an empty
    /// `client_id` is replaced by `fallback_client_id` before validation.
    pub fn resolve(json: Option<&str>, fallback_client_id: &str) -> Result<Self, ConfigError> {
        let mut config = match json {
            Some(doc) => serde_json::from_str(doc).map_err(|_| ConfigError::Parse)?,
            None => Self::default(),
        };
        if config.client_id.is_empty() {
            config.client_id = fallback_client_id.into();
        }
        config.validate()?;
        Ok(config)
    }

    /// Reject values the agent cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.namespace.is_empty() {
            return Err(ConfigError::ValidationFailed("namespace must not be empty"));
        }
        if self.client_id.is_empty() {
            return Err(ConfigError::ValidationFailed("client_id must not be empty"));
        }
        if self.telemetry_topic.is_empty() || self.telemetry_topic.len() > MAX_TOPIC_LEN {
            return Err(ConfigError::ValidationFailed("telemetry_topic length out of range"));
        }
        let longest_suffix = SWITCH_TOPIC_SUFFIX.len().max(POSITION_TOPIC_SUFFIX.len());
        if self.namespace.len() + 1 + longest_suffix > MAX_TOPIC_LEN {
            return Err(ConfigError::ValidationFailed("namespace too long for command topics"));
        }
        if self.wifi_ssid.is_empty() || self.wifi_ssid.len() > 32 {
            return Err(ConfigError::ValidationFailed("wifi_ssid must be 1-32 bytes"));
        }
        if self.broker_host.is_empty() {
            return Err(ConfigError::ValidationFailed("broker_host must not be empty"));
        }
        if self.network_retry_ms == 0 || self.broker_retry_ms == 0 || self.sample_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed("timer periods must be non-zero"));
        }
        if !(0..=180).contains(&self.initial_position) {
            return Err(ConfigError::ValidationFailed("initial_position must be 0-180"));
        }
        Ok(())
    }

    /// `<namespace>/lights`
    pub fn switch_topic(&self) -> Topic {
        self.command_topic(SWITCH_TOPIC_SUFFIX)
    }

    /// `<namespace>/servo`
    pub fn position_topic(&self) -> Topic {
        self.command_topic(POSITION_TOPIC_SUFFIX)
    }

    /// Broker URL in the form the MQTT client expects.
    pub fn broker_url(&self) -> String {
        format!("mqtt://{}:{}", self.broker_host, self.broker_port)
    }

    fn command_topic(&self, suffix: &str) -> Topic {
        use core::fmt::Write;
        let mut topic = Topic::new();
        // Length is checked by validate(); an oversize namespace truncates.
        let _ = write!(topic, "{}/{}", self.namespace, suffix);
        topic
    }
}

/// Errors from configuration parsing and validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The provisioned document is not valid JSON for [`AgentConfig`].
    Parse,
    /// A field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse => write!(f, "config could not be parsed"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}

impl core::error::Error for ConfigError {}
