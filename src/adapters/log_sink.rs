//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing the diagnostic observation stream
//! to the ESP-IDF logger (UART / USB-CDC in production) as one
//! human-readable status line per event.

use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink {
    /// Offline ticks since the last connectivity change.  The waiting
    /// line is throttled so a fast loop does not flood the console.
    waiting: u32,
}

/// One waiting line per this many offline ticks.
const WAITING_EVERY: u32 = 500;

impl LogEventSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent<'_>) {
        match event {
            AppEvent::Started => info!("START | actuators at initial positions"),
            AppEvent::NetworkConnecting { attempt } => {
                info!("NET   | connecting (attempt {})", attempt);
            }
            AppEvent::WaitingForNetwork { state, raw_status } => {
                if self.waiting % WAITING_EVERY == 0 {
                    info!("NET   | waiting, {:?} (status {})", state, raw_status);
                }
                self.waiting = self.waiting.wrapping_add(1);
            }
            AppEvent::NetworkConnected { ip } => {
                self.waiting = 0;
                match ip {
                    Some(ip) => info!("NET   | connected, ip={}", ip),
                    None => info!("NET   | connected"),
                }
            }
            AppEvent::NetworkLost => warn!("NET   | link lost"),
            AppEvent::BrokerConnecting { client_id } => {
                info!("MQTT  | connecting as {}", client_id);
            }
            AppEvent::BrokerConnected => info!("MQTT  | connected"),
            AppEvent::BrokerConnectFailed(e) => {
                warn!("MQTT  | failed, rc={} ({}), retrying", e.code(), e);
            }
            AppEvent::BrokerSessionLost(e) => warn!("MQTT  | session lost: {}", e),
            AppEvent::MessageReceived { topic, payload } => {
                info!(
                    "RECV  | [{}] {}",
                    topic,
                    core::str::from_utf8(payload).unwrap_or("<binary>")
                );
            }
            AppEvent::CommandApplied(cmd) => debug!("CMD   | {:?}", cmd),
            AppEvent::Sampled(reading) => match (reading.temperature, reading.humidity) {
                (Some(t), Some(h)) => info!("SENSE | T={:.2}\u{00b0}C RH={:.2}%", t, h),
                (t, h) => warn!("SENSE | incomplete read, T={:?} RH={:?}", t, h),
            },
            AppEvent::Published { topic, payload } => info!("PUB   | [{}] {}", topic, payload),
            AppEvent::PublishFailed { topic } => warn!("PUB   | [{}] failed", topic),
            AppEvent::NotInitialized(record) => {
                info!(
                    "PUB   | sensor not yet initialized ({:.2}, {:.2}), skipped",
                    record.temperature, record.humidity
                );
            }
        }
    }
}
