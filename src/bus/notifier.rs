//! Single-slot change notifier for host writes.
//!
//! The bus engine calls [`ChangeNotifier::notify`] once per accepted
//! in-range host write, after the byte is stored and before the register
//! pointer advances. The call runs synchronously in bus context, so
//! observers must not block.
//!
//! There is exactly one observer slot. Registering a second observer
//! replaces the first.

use core::cell::Cell;

use critical_section::Mutex;

/// Side-effect hook for host writes. The register store already holds the
/// new value when this runs; observers must not write it back.
pub trait ChangeObserver: Sync {
    fn on_change(&self, reg: u8, value: u8);
}

pub struct ChangeNotifier {
    slot: Mutex<Cell<Option<&'static dyn ChangeObserver>>>,
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeNotifier {
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(Cell::new(None)),
        }
    }

    /// Install `observer`, discarding any previous one. Returns `true` if an
    /// observer was replaced.
    pub fn register(&self, observer: &'static dyn ChangeObserver) -> bool {
        critical_section::with(|cs| self.slot.borrow(cs).replace(Some(observer)).is_some())
    }

    pub fn clear(&self) {
        critical_section::with(|cs| self.slot.borrow(cs).set(None));
    }

    pub fn is_registered(&self) -> bool {
        critical_section::with(|cs| self.slot.borrow(cs).get().is_some())
    }

    /// Invoke the observer, if any. The observer runs outside the critical
    /// section so it may drive pins that take their own.
    pub fn notify(&self, reg: u8, value: u8) {
        let observer = critical_section::with(|cs| self.slot.borrow(cs).get());
        if let Some(observer) = observer {
            observer.on_change(reg, value);
        }
    }
}
