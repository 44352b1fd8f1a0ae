//! Task Watchdog Timer (TWDT) driver.
//!
//! Subscribes the supervising (main) thread to the TWDT so the node resets
//! if that thread stalls for longer than the configured timeout. The
//! supervisor calls [`Watchdog::feed`] on every pass of its idle loop.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use log::info;
#[cfg(target_os = "espidf")]
use log::warn;

pub struct Watchdog {
    timeout_ms: u32,
    #[cfg(target_os = "espidf")]
    subscribed: bool,
}

impl Watchdog {
    /// Configure the TWDT and subscribe the current task.
    #[cfg(target_os = "espidf")]
    pub fn new(timeout_ms: u32) -> Self {
        let cfg = esp_task_wdt_config_t {
            timeout_ms,
            idle_core_mask: 0,
            trigger_panic: true,
        };
        // SAFETY: plain IDF calls with a fully initialised config; a null
        // task handle subscribes the calling task.
        let subscribed = unsafe {
            let ret = esp_task_wdt_reconfigure(&cfg);
            if ret != ESP_OK {
                warn!("watchdog: reconfigure returned {} (may already be configured)", ret);
            }
            esp_task_wdt_add(core::ptr::null_mut()) == ESP_OK
        };
        if subscribed {
            info!("watchdog: subscribed ({} ms timeout, panic on trigger)", timeout_ms);
        } else {
            warn!("watchdog: failed to subscribe, running unsupervised");
        }
        Self {
            timeout_ms,
            subscribed,
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new(timeout_ms: u32) -> Self {
        info!("watchdog(sim): {} ms timeout, no-op", timeout_ms);
        Self { timeout_ms }
    }

    pub fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }

    /// Must be called at least once per timeout.
    pub fn feed(&self) {
        #[cfg(target_os = "espidf")]
        if self.subscribed {
            // SAFETY: the calling task subscribed in `new`.
            unsafe {
                esp_task_wdt_reset();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sim_watchdog_feeds_without_hardware() {
        let wd = Watchdog::new(10_000);
        wd.feed();
        assert_eq!(wd.timeout_ms(), 10_000);
    }
}
