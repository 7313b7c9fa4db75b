//! WiFi station-mode adapter.
//!
//! Implements [`NetworkPort`]: the hexagonal boundary for wireless
//! association.  The adapter never waits for the association to finish:
//! `begin_connect()` only kicks the driver, and the agent polls
//! `is_connected()` on every tick.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF WiFi driver via `esp_idf_svc::wifi`.
//! - **all other targets**: simulation stub for host-side tests.

use core::fmt;
use core::net::Ipv4Addr;

use log::{info, warn};

use crate::app::ports::NetworkPort;

#[cfg(target_os = "espidf")]
use esp_idf_svc::wifi::EspWifi;

// ───────────────────────────────────────────────────────────────
// Credentials
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    InvalidSsid,
    InvalidPassword,
}

impl fmt::Display for CredentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)"),
        }
    }
}

impl core::error::Error for CredentialError {}

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

/// Station credentials, validated once at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub ssid: heapless::String<32>,
    pub password: heapless::String<64>,
}

impl Credentials {
    pub fn new(ssid: &str, password: &str) -> Result<Self, CredentialError> {
        if ssid.is_empty() || !is_printable_ascii(ssid) {
            return Err(CredentialError::InvalidSsid);
        }
        if !password.is_empty() && password.len() < 8 {
            return Err(CredentialError::InvalidPassword);
        }
        let mut s = heapless::String::new();
        s.push_str(ssid).map_err(|_| CredentialError::InvalidSsid)?;
        let mut p = heapless::String::new();
        p.push_str(password).map_err(|_| CredentialError::InvalidPassword)?;
        Ok(Self {
            ssid: s,
            password: p,
        })
    }

    /// Open network (no passphrase).
    pub fn is_open(&self) -> bool {
        self.password.is_empty()
    }
}

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiAdapter {
    credentials: Credentials,
    requests: u32,
    #[cfg(target_os = "espidf")]
    wifi: EspWifi<'static>,
    #[cfg(not(target_os = "espidf"))]
    sim: SimRadio,
}

/// Host-side radio model.
#[cfg(not(target_os = "espidf"))]
#[derive(Debug, Default)]
struct SimRadio {
    /// Whether an access point answers association requests.
    ap_in_range: bool,
    associated: bool,
}

impl WifiAdapter {
    /// Configure the station and start the driver.  Does not associate.
    #[cfg(target_os = "espidf")]
    pub fn new(mut wifi: EspWifi<'static>, credentials: Credentials) -> anyhow::Result<Self> {
        use esp_idf_svc::wifi::{AuthMethod, ClientConfiguration, Configuration};

        let auth_method = if credentials.is_open() {
            AuthMethod::None
        } else {
            AuthMethod::WPAWPA2Personal
        };
        wifi.set_configuration(&Configuration::Client(ClientConfiguration {
            ssid: credentials.ssid.clone(),
            password: credentials.password.clone(),
            auth_method,
            ..Default::default()
        }))?;
        wifi.start()?;
        info!("WiFi: station started for '{}'", credentials.ssid);

        Ok(Self {
            credentials,
            requests: 0,
            wifi,
        })
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            requests: 0,
            sim: SimRadio {
                ap_in_range: true,
                associated: false,
            },
        }
    }

    pub fn ssid(&self) -> &str {
        &self.credentials.ssid
    }

    /// Association requests issued since construction.
    pub fn requests(&self) -> u32 {
        self.requests
    }

    // ── Simulation controls ───────────────────────────────────

    /// Make the simulated access point (un)reachable.  Going out of range
    /// drops an existing association.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_set_in_range(&mut self, in_range: bool) {
        self.sim.ap_in_range = in_range;
        if !in_range {
            self.sim.associated = false;
        }
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_begin_connect(&mut self) {
        // EspWifi::connect() only issues the request; completion is
        // observed through is_up().
        if let Err(e) = self.wifi.connect() {
            warn!("WiFi: connect request rejected: {}", e);
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_begin_connect(&mut self) {
        if self.sim.ap_in_range {
            self.sim.associated = true;
        } else {
            warn!("WiFi(sim): '{}' out of range", self.credentials.ssid);
        }
    }

    #[cfg(target_os = "espidf")]
    fn platform_is_connected(&self) -> bool {
        self.wifi.is_up().unwrap_or(false)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_is_connected(&self) -> bool {
        self.sim.associated
    }

    /// `esp_wifi_sta_get_ap_info` return code: 0 when associated.
    #[cfg(target_os = "espidf")]
    fn platform_raw_status(&self) -> i32 {
        let mut ap_info = esp_idf_sys::wifi_ap_record_t::default();
        unsafe { esp_idf_sys::esp_wifi_sta_get_ap_info(&mut ap_info) }
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_raw_status(&self) -> i32 {
        i32::from(!self.sim.associated)
    }

    #[cfg(target_os = "espidf")]
    fn platform_local_ip(&self) -> Option<Ipv4Addr> {
        self.wifi
            .sta_netif()
            .get_ip_info()
            .ok()
            .map(|info| info.ip)
            .filter(|ip| !ip.is_unspecified())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_local_ip(&self) -> Option<Ipv4Addr> {
        self.sim.associated.then(|| Ipv4Addr::new(192, 168, 4, 2))
    }
}

// ───────────────────────────────────────────────────────────────
// NetworkPort
// ───────────────────────────────────────────────────────────────

impl NetworkPort for WifiAdapter {
    fn begin_connect(&mut self) {
        self.requests = self.requests.wrapping_add(1);
        info!("WiFi: association request to '{}'", self.credentials.ssid);
        self.platform_begin_connect();
    }

    fn is_connected(&self) -> bool {
        self.platform_is_connected()
    }

    fn raw_status(&self) -> i32 {
        self.platform_raw_status()
    }

    fn local_ip(&self) -> Option<Ipv4Addr> {
        self.platform_local_ip()
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
