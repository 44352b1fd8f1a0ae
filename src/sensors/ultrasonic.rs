//! Ultrasonic ranger sampling and motion detection.
//!
//! Publishes the distance as a big-endian composite in DISTANCE_H/L and sets
//! MOTION_DETECTED when something is closer than the motion threshold.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: [`PulseRanger`] drives a single-pin ranger (trigger and echo
//! share one GPIO) and times the echo with busy-waits, like `pulseIn`.
//! On host/test: any [`RangeSensor`] mock.

use log::{info, warn};

use super::FaultLatch;
use crate::app::ports::RangeSensor;
use crate::error::{DriverError, ErrorCode};
use crate::registers::{Register, RegisterStore};

/// Echo round-trip time to millimetres (sound at ~0.343 mm/us, halved).
pub const fn echo_to_mm(echo_us: u32) -> u32 {
    echo_us.saturating_mul(5) / 29
}

/// Motion means something inside the threshold; 0 means no reading.
pub fn is_motion(distance_mm: u16, threshold_mm: u16) -> bool {
    distance_mm > 0 && distance_mm < threshold_mm
}

pub struct DistanceSampler<R> {
    sensor: R,
    motion_threshold_mm: u16,
    fault: FaultLatch,
}

impl<R: RangeSensor> DistanceSampler<R> {
    pub fn new(sensor: R, motion_threshold_mm: u16) -> Self {
        Self {
            sensor,
            motion_threshold_mm,
            fault: FaultLatch::default(),
        }
    }

    pub fn init(&mut self) -> Result<(), DriverError> {
        self.sensor.init()
    }

    /// One measurement. On failure the last good distance stays published
    /// and motion is withdrawn, so a dead ranger cannot hold the alarm on.
    pub fn sample(&mut self, regs: &RegisterStore) -> Option<u16> {
        match self.sensor.measure_mm() {
            Ok(raw) => {
                let mm = u16::try_from(raw).unwrap_or(u16::MAX);
                regs.write_u16(Register::DistanceH, mm);
                regs.set_flag(
                    Register::MotionDetected,
                    is_motion(mm, self.motion_threshold_mm),
                );
                if self.fault.recover(regs, ErrorCode::RangeTimeout) {
                    info!("ranger: recovered ({} mm)", mm);
                }
                Some(mm)
            }
            Err(e) => {
                regs.set_flag(Register::MotionDetected, false);
                if self.fault.raise(regs, ErrorCode::RangeTimeout) {
                    warn!("ranger: {}, keeping last distance", e);
                }
                None
            }
        }
    }

    pub fn sensor(&self) -> &R {
        &self.sensor
    }
}

// ── Device adapter ────────────────────────────────────────────

/// Longest echo we wait for (~4 m round trip).
#[cfg(target_os = "espidf")]
const ECHO_TIMEOUT_US: u32 = 25_000;

#[cfg(target_os = "espidf")]
pub struct PulseRanger {
    gpio: i32,
}

#[cfg(target_os = "espidf")]
impl PulseRanger {
    pub fn new(gpio: i32) -> Self {
        Self { gpio }
    }
}

#[cfg(target_os = "espidf")]
impl RangeSensor for PulseRanger {
    fn init(&mut self) -> Result<(), DriverError> {
        crate::drivers::hw_init::gpio_output(self.gpio)
    }

    fn measure_mm(&mut self) -> Result<u32, DriverError> {
        crate::drivers::hw_init::ping_echo_us(self.gpio, ECHO_TIMEOUT_US)
            .map(echo_to_mm)
            .ok_or(DriverError::Timeout)
    }
}
