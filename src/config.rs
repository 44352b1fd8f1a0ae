//! Node configuration parameters.
//!
//! All tunable parameters for the HomeNode. Defaults are the shipped board
//! timing; the struct is serde-enabled so a build can embed an
//! override.

use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::bus::DEFAULT_SLAVE_ADDRESS;
use crate::drivers::button::DEFAULT_DEBOUNCE_MS;
use crate::error::{Error, Result};

/// Core node configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    // --- Bus ---
    /// 7-bit I2C slave address
    pub slave_address: u8,

    // --- Sampling periods (milliseconds) ---
    pub distance_period_ms: u32,
    pub angle_period_ms: u32,
    pub tag_period_ms: u32,
    /// Hold-off after a tag is read, so one card is reported once
    pub tag_hold_ms: u32,

    // --- Control ---
    pub control_period_ms: u32,
    /// Motion is reported for readings in (0, threshold) millimetres
    pub motion_threshold_mm: u16,
    /// Confirmation beep on button press
    pub beep_ms: u32,
    /// Button debounce window
    pub debounce_ms: u32,

    // --- RTOS priorities ---
    pub control_priority: u8,
    pub tag_priority: u8,
    pub sampling_priority: u8,
    pub bus_priority: u8,

    // --- Supervision ---
    pub watchdog_timeout_ms: u32,
    /// Register snapshot log interval (0 disables)
    pub snapshot_interval_secs: u32,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            slave_address: DEFAULT_SLAVE_ADDRESS,

            distance_period_ms: 200,
            angle_period_ms: 200,
            tag_period_ms: 100,
            tag_hold_ms: 2_000,

            control_period_ms: 50,
            motion_threshold_mm: 1_000,
            beep_ms: 100,
            debounce_ms: DEFAULT_DEBOUNCE_MS,

            control_priority: 6,
            tag_priority: 5,
            sampling_priority: 4,
            bus_priority: 10,

            watchdog_timeout_ms: 10_000,
            snapshot_interval_secs: 30,
        }
    }
}

impl NodeConfig {
    pub fn validate(&self) -> Result<()> {
        // 0x00..=0x07 and 0x78..=0x7F are reserved by the I2C standard.
        if !(0x08..=0x77).contains(&self.slave_address) {
            return Err(Error::Config("slave address outside 7-bit range"));
        }
        let periods = [
            self.distance_period_ms,
            self.angle_period_ms,
            self.tag_period_ms,
            self.control_period_ms,
        ];
        if periods.contains(&0) {
            return Err(Error::Config("task period must be non-zero"));
        }
        if self.debounce_ms == 0 {
            return Err(Error::Config("debounce window must be non-zero"));
        }
        if self.motion_threshold_mm == 0 {
            return Err(Error::Config("motion threshold must be non-zero"));
        }
        if self.beep_ms > self.debounce_ms {
            return Err(Error::Config("beep longer than debounce window"));
        }
        if self.watchdog_timeout_ms <= self.control_period_ms {
            return Err(Error::Config("watchdog timeout shorter than control period"));
        }
        Ok(())
    }

    pub fn distance_period(&self) -> Duration {
        Duration::from_millis(self.distance_period_ms.into())
    }

    pub fn angle_period(&self) -> Duration {
        Duration::from_millis(self.angle_period_ms.into())
    }

    pub fn tag_period(&self) -> Duration {
        Duration::from_millis(self.tag_period_ms.into())
    }

    pub fn tag_hold(&self) -> Duration {
        Duration::from_millis(self.tag_hold_ms.into())
    }

    pub fn control_period(&self) -> Duration {
        Duration::from_millis(self.control_period_ms.into())
    }

    pub fn beep(&self) -> Duration {
        Duration::from_millis(self.beep_ms.into())
    }
}
