//! Task watchdog (TWDT) for the control loop.
//!
//! The loop feeds once per iteration.  Its longest stall is the bounded
//! broker connect, so `main` sizes the timeout as a multiple of that.
//! On the host the watchdog only counts feeds.

#[cfg(target_os = "espidf")]
use esp_idf_sys as sys;
use log::{info, warn};

pub struct Watchdog {
    timeout_ms: u32,
    /// Whether the calling task is registered with the TWDT.
    armed: bool,
    feeds: u32,
}

impl Watchdog {
    /// Arm the watchdog for the calling task.  A failure to register is
    /// logged and leaves the watchdog disarmed; the loop runs regardless.
    pub fn new(timeout_ms: u32) -> Self {
        let armed = arm_current_task(timeout_ms);
        if armed {
            info!("Watchdog: armed, {} ms", timeout_ms);
        } else {
            warn!("Watchdog: not armed, loop stalls will go unnoticed");
        }
        Self {
            timeout_ms,
            armed,
            feeds: 0,
        }
    }

    pub fn feed(&mut self) {
        if self.armed {
            kick();
        }
        self.feeds = self.feeds.wrapping_add(1);
    }

    pub fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn feeds(&self) -> u32 {
        self.feeds
    }
}

#[cfg(target_os = "espidf")]
fn arm_current_task(timeout_ms: u32) -> bool {
    let cfg = sys::esp_task_wdt_config_t {
        timeout_ms,
        idle_core_mask: 0,
        trigger_panic: true,
    };
    // SAFETY: `cfg` outlives the call; the TWDT copies it.
    if let Err(e) = sys::esp!(unsafe { sys::esp_task_wdt_reconfigure(&cfg) }) {
        warn!("Watchdog: reconfigure failed ({}), keeping boot timeout", e);
    }
    // SAFETY: a null handle registers the calling task.
    match sys::esp!(unsafe { sys::esp_task_wdt_add(core::ptr::null_mut()) }) {
        Ok(()) => true,
        Err(e) => {
            warn!("Watchdog: task registration failed ({})", e);
            false
        }
    }
}

#[cfg(target_os = "espidf")]
fn kick() {
    // SAFETY: only reached after the calling task was registered.
    unsafe {
        sys::esp_task_wdt_reset();
    }
}

#[cfg(not(target_os = "espidf"))]
fn arm_current_task(_timeout_ms: u32) -> bool {
    true
}

#[cfg(not(target_os = "espidf"))]
fn kick() {}
