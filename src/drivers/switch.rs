//! Binary output driver for the buzzer and the alarm LED.
//!
//! The pin lives behind a critical-section mutex so host commands (bus
//! context) and tasks can drive it through a shared reference. The logical
//! state is tracked separately so `is_on` never touches the pin.

use core::cell::RefCell;
use core::sync::atomic::{AtomicBool, Ordering};

use critical_section::Mutex;
use embedded_hal::digital::{Error as _, OutputPin};
use log::warn;

use crate::app::ports::Switch;

pub struct PinSwitch<P> {
    name: &'static str,
    pin: Mutex<RefCell<P>>,
    on: AtomicBool,
}

impl<P: OutputPin + Send> PinSwitch<P> {
    pub fn new(name: &'static str, pin: P) -> Self {
        Self {
            name,
            pin: Mutex::new(RefCell::new(pin)),
            on: AtomicBool::new(false),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<P: OutputPin + Send> Switch for PinSwitch<P> {
    fn set(&self, on: bool) {
        let result = critical_section::with(|cs| {
            let mut pin = self.pin.borrow_ref_mut(cs);
            if on { pin.set_high() } else { pin.set_low() }
        });
        match result {
            Ok(()) => self.on.store(on, Ordering::Release),
            Err(e) => warn!("{}: pin write failed ({:?})", self.name, e.kind()),
        }
    }

    fn is_on(&self) -> bool {
        self.on.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType;

    #[derive(Default)]
    struct RecordingPin {
        levels: Vec<bool>,
    }

    impl ErrorType for RecordingPin {
        type Error = Infallible;
    }

    impl OutputPin for RecordingPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.levels.push(false);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.levels.push(true);
            Ok(())
        }
    }

    #[test]
    fn init_drives_low() {
        let sw = PinSwitch::new("buzzer", RecordingPin::default());
        sw.init().unwrap();
        assert!(!sw.is_on());
        critical_section::with(|cs| {
            assert_eq!(sw.pin.borrow_ref(cs).levels, vec![false]);
        });
    }

    #[test]
    fn toggle_tracks_state() {
        let sw = PinSwitch::new("led", RecordingPin::default());
        sw.toggle();
        assert!(sw.is_on());
        sw.toggle();
        assert!(!sw.is_on());
        critical_section::with(|cs| {
            assert_eq!(sw.pin.borrow_ref(cs).levels, vec![true, false]);
        });
    }
}
