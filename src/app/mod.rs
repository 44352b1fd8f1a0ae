//! Application layer: the node's shared state and its task wiring.
//!
//! All interaction with hardware happens through the port traits in
//! [`ports`], so everything here runs unchanged against mocks on the host.
//!
//! ```text
//!   bus ISR/thread ──▶ BusSlave ──▶ RegisterStore ◀── samplers (periodic)
//!                         │               ▲
//!                         ▼               │
//!                  ChangeNotifier    AlarmController (periodic) ──▶ buzzer, LED
//!                         │
//!                         ▼
//!                 CommandDispatcher ──▶ buzzer, LED
//!
//!   button ISR ──▶ DebouncedLatch ──▶ button task ──▶ ALARM_STATE, beep
//! ```

pub mod dispatch;
pub mod ports;
pub mod tasks;

use log::warn;

use crate::bus::ChangeNotifier;
use crate::control::BeepGate;
use crate::drivers::button::DebouncedLatch;
use crate::error::{DriverError, ErrorCode};
use crate::registers::{Register, RegisterStore};
use dispatch::CommandDispatcher;
use ports::Switch;

/// Handles to the process-lifetime state every task shares.
pub struct Node<B: 'static, L: 'static> {
    pub registers: &'static RegisterStore,
    pub notifier: &'static ChangeNotifier,
    pub button: &'static DebouncedLatch,
    pub beep: &'static BeepGate,
    pub buzzer: &'static B,
    pub led: &'static L,
}

impl<B: 'static, L: 'static> Clone for Node<B, L> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<B: 'static, L: 'static> Copy for Node<B, L> {}

impl<B: Switch + 'static, L: Switch + 'static> Node<B, L> {
    /// Drive both outputs to their safe level.
    pub fn init_outputs(&self) -> Result<(), DriverError> {
        self.buzzer.init()?;
        self.led.init()
    }

    /// Install the command dispatcher as the notifier's observer.
    pub fn bind_commands(&self) {
        let dispatcher: &'static CommandDispatcher<'static, B, L> =
            Box::leak(Box::new(CommandDispatcher::new(self.buzzer, self.led)));
        if self.notifier.register(dispatcher) {
            warn!("node: replaced an existing change observer");
        }
    }

    pub fn report_fault(&self, code: ErrorCode) {
        self.registers.write(Register::ErrorCode, code.code());
    }
}
