//! Button-driven arming with a confirmation beep.
//!
//! Each accepted press flips ALARM_STATE, raises BUTTON_STATE and sounds the
//! buzzer briefly, whatever the alarm loop is doing. While the beep runs the
//! [`BeepGate`] keeps the control loop from switching the buzzer off.

use core::sync::atomic::{AtomicBool, Ordering};

use log::info;

use crate::app::ports::Switch;
use crate::registers::{Register, RegisterStore};

/// Set while a confirmation beep owns the buzzer.
pub struct BeepGate(AtomicBool);

impl Default for BeepGate {
    fn default() -> Self {
        Self::new()
    }
}

impl BeepGate {
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    pub fn start(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn stop(&self) {
        self.0.store(false, Ordering::Release);
    }

    pub fn is_active(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

pub struct Arming<'a, B> {
    buzzer: &'a B,
    beep: &'a BeepGate,
}

impl<'a, B: Switch> Arming<'a, B> {
    pub fn new(buzzer: &'a B, beep: &'a BeepGate) -> Self {
        Self { buzzer, beep }
    }

    /// Handle an accepted press and start the beep. Returns the new
    /// alarm-enabled state.
    pub fn press(&self, regs: &RegisterStore) -> bool {
        let enabled = regs.toggle_flag(Register::AlarmState);
        regs.set_flag(Register::ButtonState, true);
        self.beep.start();
        self.buzzer.on();
        info!("button: alarm {}", if enabled { "enabled" } else { "disabled" });
        enabled
    }

    /// End the beep. The buzzer stays on if the alarm loop wants it.
    pub fn release(&self, regs: &RegisterStore) {
        self.beep.stop();
        regs.set_flag(Register::ButtonState, false);
        if !regs.flag(Register::BuzzerCmd) {
            self.buzzer.off();
        }
    }
}
