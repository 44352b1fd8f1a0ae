//! Host command dispatch: the change notifier's observer.
//!
//! Runs synchronously in bus context for every accepted host write, so it
//! only flips pins and logs. It never writes registers; the engine stored
//! the value before calling in, and the alarm loop re-asserts its own
//! decision on the next control tick, so actuator commands from the host
//! are momentary overrides.

use log::{debug, info};

use crate::app::ports::Switch;
use crate::bus::ChangeObserver;
use crate::registers::Register;

pub struct CommandDispatcher<'a, B, L> {
    buzzer: &'a B,
    led: &'a L,
}

impl<'a, B: Switch, L: Switch> CommandDispatcher<'a, B, L> {
    pub fn new(buzzer: &'a B, led: &'a L) -> Self {
        Self { buzzer, led }
    }
}

impl<B: Switch, L: Switch> ChangeObserver for CommandDispatcher<'_, B, L> {
    fn on_change(&self, reg: u8, value: u8) {
        match Register::from_offset(reg) {
            Some(Register::BuzzerCmd) => self.buzzer.set(value != 0),
            Some(Register::LedCmd) => self.led.set(value != 0),
            Some(Register::AlarmState) => {
                info!("host: alarm {}", if value != 0 { "enabled" } else { "disabled" });
            }
            Some(Register::Command) => info!("host: command 0x{:02X}", value),
            _ => debug!("host: write 0x{:02X} -> 0x{:02X}", value, reg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicBool, Ordering};

    #[derive(Default)]
    struct Flag(AtomicBool);

    impl Switch for Flag {
        fn set(&self, on: bool) {
            self.0.store(on, Ordering::SeqCst);
        }

        fn is_on(&self) -> bool {
            self.0.load(Ordering::SeqCst)
        }
    }

    #[test]
    fn actuator_registers_drive_switches() {
        let (buzzer, led) = (Flag::default(), Flag::default());
        let d = CommandDispatcher::new(&buzzer, &led);

        d.on_change(Register::BuzzerCmd.offset(), 1);
        d.on_change(Register::LedCmd.offset(), 0x80);
        assert!(buzzer.is_on() && led.is_on());

        d.on_change(Register::BuzzerCmd.offset(), 0);
        assert!(!buzzer.is_on());
    }

    #[test]
    fn other_registers_touch_no_outputs() {
        let (buzzer, led) = (Flag::default(), Flag::default());
        let d = CommandDispatcher::new(&buzzer, &led);

        d.on_change(Register::AlarmState.offset(), 1);
        d.on_change(Register::Command.offset(), 0x42);
        d.on_change(0x1F, 0xFF);
        assert!(!buzzer.is_on() && !led.is_on());
    }
}
