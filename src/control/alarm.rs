//! Alarm decision loop.
//!
//! Level-triggered: every control tick re-derives the state from
//! ALARM_STATE and MOTION_DETECTED and drives the outputs to match, so a
//! missed tick or a momentary host command is corrected on the next tick.
//!
//! | ALARM_STATE | MOTION | State         | Buzzer | LED |
//! |-------------|--------|---------------|--------|-----|
//! | 0           | any    | Idle          | off    | off |
//! | 1           | 0      | ArmedQuiet    | off    | off |
//! | 1           | 1      | ArmedAlarming | on     | on  |
//!
//! The buzzer decision is mirrored into BUZZER_CMD and STATUS is refreshed
//! as the liveness indication for the host. LED_CMD belongs to the host and
//! is left as written.

use log::info;

use super::arming::BeepGate;
use crate::app::ports::Switch;
use crate::registers::{Register, RegisterStore, STATUS_OK};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmState {
    Idle,
    ArmedQuiet,
    ArmedAlarming,
}

impl AlarmState {
    pub fn evaluate(armed: bool, motion: bool) -> Self {
        match (armed, motion) {
            (false, _) => Self::Idle,
            (true, false) => Self::ArmedQuiet,
            (true, true) => Self::ArmedAlarming,
        }
    }

    pub fn sounding(self) -> bool {
        self == Self::ArmedAlarming
    }
}

pub struct AlarmController<'a, B, L> {
    buzzer: &'a B,
    led: &'a L,
    beep: &'a BeepGate,
    state: AlarmState,
}

impl<'a, B: Switch, L: Switch> AlarmController<'a, B, L> {
    pub fn new(buzzer: &'a B, led: &'a L, beep: &'a BeepGate) -> Self {
        Self {
            buzzer,
            led,
            beep,
            state: AlarmState::Idle,
        }
    }

    pub fn state(&self) -> AlarmState {
        self.state
    }

    /// One control tick.
    pub fn step(&mut self, regs: &RegisterStore) -> AlarmState {
        let next = AlarmState::evaluate(
            regs.flag(Register::AlarmState),
            regs.flag(Register::MotionDetected),
        );
        let sounding = next.sounding();

        if sounding {
            self.buzzer.on();
        } else if !self.beep.is_active() {
            self.buzzer.off();
        }
        self.led.set(sounding);

        regs.set_flag(Register::BuzzerCmd, sounding);
        regs.write(Register::Status, STATUS_OK);

        if next != self.state {
            info!("ALARM | {:?} -> {:?}", self.state, next);
            self.state = next;
        }
        next
    }
}
