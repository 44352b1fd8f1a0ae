//! Control logic: the alarm decision loop and button arming.

pub mod alarm;
pub mod arming;

pub use alarm::{AlarmController, AlarmState};
pub use arming::{Arming, BeepGate};
