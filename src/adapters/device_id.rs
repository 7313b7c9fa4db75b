//! Device identity derived from the ESP32 factory MAC address.
//!
//! When no broker client identifier is provisioned the agent uses
//! `sensorlink-xxyyzz` (last 3 MAC bytes, lowercase hex).  The factory
//! MAC is burned into eFuse, so the identifier is stable across reboots
//! and unique per board.

use core::fmt::Write;

/// Fixed-size client identifier.
pub type ClientIdString = heapless::String<24>;

/// Full 6-byte MAC address.
pub type MacAddress = [u8; 6];

/// Prefix of the MAC-derived client identifier.
pub const CLIENT_ID_PREFIX: &str = "sensorlink-";

/// Factory MAC from eFuse.  An all-zero MAC comes back if the eFuse read
/// fails, which still yields a usable (if shared) identifier.
#[cfg(target_os = "espidf")]
pub fn read_mac() -> MacAddress {
    let mut mac: MacAddress = [0u8; 6];
    // SAFETY: `mac` is exactly the 6 bytes the call writes.
    let ret = unsafe { esp_idf_sys::esp_efuse_mac_get_default(mac.as_mut_ptr()) };
    if ret != esp_idf_sys::ESP_OK {
        log::warn!("Device id: eFuse MAC read failed ({})", ret);
        mac = [0u8; 6];
    }
    mac
}

/// Host builds report a fixed MAC.
#[cfg(not(target_os = "espidf"))]
pub fn read_mac() -> MacAddress {
    [0xDE, 0xAD, 0xBE, 0xEF, 0xCA, 0xFE]
}

/// `sensorlink-` followed by the NIC-specific half of the MAC.
pub fn client_id(mac: &MacAddress) -> ClientIdString {
    let mut id = ClientIdString::new();
    let _ = id.push_str(CLIENT_ID_PREFIX);
    for byte in &mac[3..] {
        let _ = write!(id, "{:02x}", byte);
    }
    id
}
