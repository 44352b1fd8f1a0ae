//! Sensor sampling: one sampler per collaborator.
//!
//! A sampler owns its sensor, performs one read per call to `sample`, and
//! publishes the transformed result into the register store. Samplers are
//! plain synchronous steps; the periodic task loops in `app::tasks` drive
//! them.
//!
//! Faults never stop a sampler. The previous register values stay in place,
//! the sampler's own code goes to ERROR_CODE, and the next good read clears
//! that code again (only if nobody overwrote it meanwhile).

pub mod rfid;
pub mod rotary;
pub mod ultrasonic;

use crate::error::ErrorCode;
use crate::registers::{Register, RegisterStore};

/// Edge-tracked fault state shared by the samplers, so a persistent fault
/// logs once instead of every period.
#[derive(Debug, Default)]
struct FaultLatch {
    active: bool,
}

impl FaultLatch {
    /// Publish `code`. Returns `true` on the first report of a new fault.
    fn raise(&mut self, regs: &RegisterStore, code: ErrorCode) -> bool {
        regs.write(Register::ErrorCode, code.code());
        !core::mem::replace(&mut self.active, true)
    }

    /// Withdraw `code`. Returns `true` if a fault was active.
    fn recover(&mut self, regs: &RegisterStore, code: ErrorCode) -> bool {
        if !core::mem::replace(&mut self.active, false) {
            return false;
        }
        regs.clear_if(Register::ErrorCode, code.code());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recover_keeps_foreign_code() {
        let regs = RegisterStore::new();
        let mut latch = FaultLatch::default();
        assert!(latch.raise(&regs, ErrorCode::RangeTimeout));
        assert!(!latch.raise(&regs, ErrorCode::RangeTimeout));

        regs.write(Register::ErrorCode, ErrorCode::AngleReadFailed.code());
        assert!(latch.recover(&regs, ErrorCode::RangeTimeout));
        assert_eq!(regs.read(Register::ErrorCode), ErrorCode::AngleReadFailed.code());
        assert!(!latch.recover(&regs, ErrorCode::RangeTimeout));
    }
}
