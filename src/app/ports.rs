//! Port traits: the boundary between node logic and peripherals.
//!
//! ```text
//!   Driver / sensor adapter ──▶ Port trait ──▶ samplers, alarm loop, dispatcher
//! ```
//!
//! Every collaborator offers a narrow `init` / `read` / `write` contract.
//! Device adapters live in `drivers` and `sensors`; integration tests supply
//! mocks. Node logic consumes the ports via generics, so nothing above this
//! line touches hardware directly.

use crate::error::DriverError;

// ───────────────────────────────────────────────────────────────
// Actuators (buzzer, LED)
// ───────────────────────────────────────────────────────────────

/// Binary output. Methods take `&self` because the same switch is driven
/// from bus context (host commands) and from tasks; implementations carry
/// their own interior synchronisation.
pub trait Switch: Sync {
    fn set(&self, on: bool);

    fn is_on(&self) -> bool;

    /// Drive the output to its safe (off) level.
    fn init(&self) -> Result<(), DriverError> {
        self.off();
        Ok(())
    }

    fn on(&self) {
        self.set(true);
    }

    fn off(&self) {
        self.set(false);
    }

    fn toggle(&self) {
        self.set(!self.is_on());
    }
}

// ───────────────────────────────────────────────────────────────
// Sensors
// ───────────────────────────────────────────────────────────────

/// Ultrasonic ranger. `measure_mm` fails with [`DriverError::Timeout`] when
/// no echo returns.
pub trait RangeSensor {
    fn init(&mut self) -> Result<(), DriverError> {
        Ok(())
    }

    fn measure_mm(&mut self) -> Result<u32, DriverError>;
}

/// Rotary potentiometer on a 10-bit scale (0..=1023).
pub trait AngleSensor {
    fn init(&mut self) -> Result<(), DriverError> {
        Ok(())
    }

    fn read_raw(&mut self) -> Result<u16, DriverError>;
}

/// Serial tag reader delivering raw frames.
pub trait TagReader {
    fn init(&mut self) -> Result<(), DriverError> {
        Ok(())
    }

    fn data_available(&mut self) -> bool;

    /// Copy pending bytes into `buf`; returns how many were written.
    fn read_data(&mut self, buf: &mut [u8]) -> usize;
}

// ───────────────────────────────────────────────────────────────
// Edge-interrupt input (button)
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Falling,
    Rising,
    Any,
}

/// Pin that can raise an interrupt on an edge. `init` enables the pull-up,
/// selects `edge` and arms the interrupt.
pub trait EdgeInput {
    fn init(&mut self, edge: Edge) -> Result<(), DriverError>;
}
