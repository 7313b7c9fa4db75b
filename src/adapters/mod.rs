//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter      | Implements   | Connects to               |
//! |--------------|--------------|---------------------------|
//! | `hardware`   | SensorPort   | DHT22 on a single GPIO    |
//! |              | ActuatorPort | GPIO switch, LEDC servo   |
//! | `log_sink`   | EventSink    | Serial log output         |
//! | `mqtt`       | BrokerPort   | ESP-IDF MQTT client       |
//! | `wifi`       | NetworkPort  | ESP-IDF WiFi STA          |
//! | `time`       |:            | ESP32 system timer        |
//! | `device_id`  |:            | Factory MAC (eFuse)       |

pub mod device_id;
pub mod hardware;
pub mod log_sink;
pub mod mqtt;
pub mod time;
pub mod wifi;
