//! Peripheral drivers, pinned thread spawning and supervision.

pub mod button;
#[cfg(target_os = "espidf")]
pub mod hw_init;
#[cfg(target_os = "espidf")]
pub mod i2c_slave;
pub mod switch;
pub mod task_pin;
pub mod watchdog;
