//! Rotary angle sensor sampling.
//!
//! The potentiometer sweeps 300 degrees over a 10-bit reading. The register
//! carries the angle rescaled to a byte: raw → degrees → 0..=255, using
//! integer steps so every host sees the same quantisation.
//!
//! On ESP-IDF: [`AdcAngle`] reads ADC1 (12-bit) and narrows it to 10 bits.

use log::{info, warn};

use super::FaultLatch;
use crate::app::ports::AngleSensor;
use crate::error::{DriverError, ErrorCode};
use crate::registers::{Register, RegisterStore};

pub const RAW_FULL_SCALE: u16 = 1023;
pub const SWEEP_DEGREES: u16 = 300;

/// Degrees for a 10-bit reading; readings above full scale are clamped.
pub fn raw_to_degrees(raw: u16) -> u16 {
    (u32::from(raw.min(RAW_FULL_SCALE)) * u32::from(SWEEP_DEGREES) / u32::from(RAW_FULL_SCALE))
        as u16
}

pub fn degrees_to_byte(degrees: u16) -> u8 {
    (u32::from(degrees.min(SWEEP_DEGREES)) * 255 / u32::from(SWEEP_DEGREES)) as u8
}

pub struct AngleSampler<A> {
    sensor: A,
    fault: FaultLatch,
}

impl<A: AngleSensor> AngleSampler<A> {
    pub fn new(sensor: A) -> Self {
        Self {
            sensor,
            fault: FaultLatch::default(),
        }
    }

    pub fn init(&mut self) -> Result<(), DriverError> {
        self.sensor.init()
    }

    pub fn sample(&mut self, regs: &RegisterStore) -> Option<u8> {
        match self.sensor.read_raw() {
            Ok(raw) => {
                let scaled = degrees_to_byte(raw_to_degrees(raw));
                regs.write(Register::RotaryAngle, scaled);
                if self.fault.recover(regs, ErrorCode::AngleReadFailed) {
                    info!("angle: recovered");
                }
                Some(scaled)
            }
            Err(e) => {
                if self.fault.raise(regs, ErrorCode::AngleReadFailed) {
                    warn!("angle: {}, keeping last value", e);
                }
                None
            }
        }
    }
}

// ── Device adapter ────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub struct AdcAngle {
    channel: u32,
}

#[cfg(target_os = "espidf")]
impl AdcAngle {
    pub fn new(channel: u32) -> Self {
        Self { channel }
    }
}

#[cfg(target_os = "espidf")]
impl AngleSensor for AdcAngle {
    fn init(&mut self) -> Result<(), DriverError> {
        crate::drivers::hw_init::init_adc_channel(self.channel)
    }

    fn read_raw(&mut self) -> Result<u16, DriverError> {
        // 12-bit conversion narrowed to the 10-bit scale.
        crate::drivers::hw_init::adc1_read(self.channel).map(|raw| raw >> 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Result<u16, DriverError>);

    impl AngleSensor for Fixed {
        fn read_raw(&mut self) -> Result<u16, DriverError> {
            self.0
        }
    }

    #[test]
    fn scale_endpoints() {
        assert_eq!(degrees_to_byte(raw_to_degrees(0)), 0);
        assert_eq!(degrees_to_byte(raw_to_degrees(1023)), 255);
        assert_eq!(raw_to_degrees(1023), 300);
    }

    #[test]
    fn midpoint_uses_two_step_integer_math() {
        // 512 -> 150 degrees -> 127
        assert_eq!(raw_to_degrees(512), 150);
        assert_eq!(degrees_to_byte(150), 127);
    }

    #[test]
    fn out_of_scale_reading_is_clamped() {
        assert_eq!(raw_to_degrees(4095), 300);
    }

    #[test]
    fn publishes_scaled_angle() {
        let regs = RegisterStore::new();
        let mut s = AngleSampler::new(Fixed(Ok(1023)));
        assert_eq!(s.sample(&regs), Some(255));
        assert_eq!(regs.read(Register::RotaryAngle), 255);
    }

    #[test]
    fn adc_failure_keeps_last_value() {
        let regs = RegisterStore::new();
        regs.write(Register::RotaryAngle, 42);
        let mut s = AngleSampler::new(Fixed(Err(DriverError::Adc)));
        assert_eq!(s.sample(&regs), None);
        assert_eq!(regs.read(Register::RotaryAngle), 42);
        assert_eq!(regs.read(Register::ErrorCode), ErrorCode::AngleReadFailed.code());
    }
}
