//! SensorLink Firmware: Main Entry Point
//!
//! Hexagonal architecture driven by a single cooperative control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  WifiAdapter      MqttAdapter     SensorAdapter   LogEventSink │
//! │  (NetworkPort)    (BrokerPort)    (SensorPort)    (EventSink)  │
//! │  ActuatorAdapter  MonotonicClock  Watchdog                     │
//! │  (ActuatorPort)                                                │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │                  Agent (pure logic)                    │    │
//! │  │  NetworkLink · BrokerClient · Sampler · Router · Timers│    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Configuration is baked in at build time through the
//! `SENSORLINK_CONFIG` environment variable (a JSON [`AgentConfig`]
//! document); without it the defaults apply.
#![deny(unused_must_use)]

use anyhow::Result;
use log::info;

use esp_idf_hal::delay::{Ets, FreeRtos};
use esp_idf_hal::gpio::{PinDriver, Pull};
use esp_idf_hal::ledc::config::TimerConfig;
use esp_idf_hal::ledc::{LedcDriver, LedcTimerDriver, Resolution};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::units::FromValueType;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::EspWifi;

use sensorlink::adapters::device_id;
use sensorlink::adapters::hardware::{ActuatorAdapter, SensorAdapter};
use sensorlink::adapters::log_sink::LogEventSink;
use sensorlink::adapters::mqtt::{MqttAdapter, MqttSettings};
use sensorlink::adapters::time::MonotonicClock;
use sensorlink::adapters::wifi::{Credentials, WifiAdapter};
use sensorlink::app::service::Agent;
use sensorlink::config::AgentConfig;
use sensorlink::drivers::servo::ServoDriver;
use sensorlink::drivers::switch::SwitchDriver;
use sensorlink::drivers::watchdog::Watchdog;
use sensorlink::sensors::dht22::Dht22;

/// Pause between control-loop iterations.  Yields to the idle task so the
/// TWDT idle hook and the WiFi/MQTT tasks get CPU time.
const LOOP_DELAY_MS: u32 = 10;

/// Floor for the task watchdog timeout.
const MIN_WATCHDOG_MS: u32 = 10_000;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  SensorLink v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let peripherals = Peripherals::take()?;
    let sys_loop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    // ── 2. Configuration ──────────────────────────────────────
    let mac = device_id::read_mac();
    let fallback_id = device_id::client_id(&mac);
    let config = AgentConfig::resolve(option_env!("SENSORLINK_CONFIG"), &fallback_id)?;
    info!(
        "Config: client '{}', broker {}, namespace '{}'",
        config.client_id,
        config.broker_url(),
        config.namespace
    );

    // ── 3. Network + broker adapters ──────────────────────────
    let credentials = Credentials::new(&config.wifi_ssid, &config.wifi_password)?;
    let esp_wifi = EspWifi::new(peripherals.modem, sys_loop, Some(nvs))?;
    let wifi = WifiAdapter::new(esp_wifi, credentials)?;
    let mqtt = MqttAdapter::new(MqttSettings::from_config(&config));

    // ── 4. Sensor: DHT22 on GPIO12 (open drain, pull-up) ──────
    let mut dht_pin = PinDriver::input_output_od(peripherals.pins.gpio12)?;
    dht_pin.set_pull(Pull::Up)?;
    dht_pin.set_high()?;
    let sensor = SensorAdapter::new(Dht22::new(dht_pin, Ets));

    // ── 5. Actuators: switch on GPIO14, servo on GPIO26 ───────
    let switch = SwitchDriver::new(PinDriver::output(peripherals.pins.gpio14)?)?;
    let servo_timer = LedcTimerDriver::new(
        peripherals.ledc.timer0,
        &TimerConfig::default()
            .frequency(50.Hz().into())
            .resolution(Resolution::Bits14),
    )?;
    let servo_channel = LedcDriver::new(
        peripherals.ledc.channel0,
        servo_timer,
        peripherals.pins.gpio26,
    )?;
    let actuators = ActuatorAdapter::new(switch, ServoDriver::new(servo_channel));

    // ── 6. Agent ──────────────────────────────────────────────
    let mut agent = Agent::new(&config, wifi, mqtt, sensor, actuators)?;
    let mut sink = LogEventSink::new();
    let clock = MonotonicClock::new();
    let mut watchdog = Watchdog::new(
        config
            .broker_connect_timeout_ms
            .saturating_mul(3)
            .max(MIN_WATCHDOG_MS),
    );

    agent.start(clock.now_ms(), &mut sink);

    // ── 7. Control loop ───────────────────────────────────────
    loop {
        agent.tick(clock.now_ms(), &mut sink);
        watchdog.feed();
        FreeRtos::delay_ms(LOOP_DELAY_MS);
    }
}
