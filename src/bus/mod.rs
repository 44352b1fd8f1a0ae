//! I2C slave register protocol engine.
//!
//! The hardware controller reports opaque transaction events; the engine
//! turns them into register-store accesses through a single persistent
//! register pointer.
//!
//! ```text
//!   write:  Idle ──Start{W}──▶ AddressedForWrite ──byte──▶ ReceivingData ──Stop──▶ Idle
//!                                (byte = pointer)            (byte = data)
//!   read:   Idle ──Start{R}──▶ AddressedForRead ──request──▶ Transmitting ──Stop──▶ Idle
//! ```
//!
//! - The first byte of a write sets the pointer to any value, in range or not.
//! - Each further byte is stored at the pointer, the notifier fires, then the
//!   pointer advances. Past the end of the map bytes are dropped and the
//!   pointer stays put.
//! - A read request returns the byte at the pointer and advances; past the
//!   end it returns 0 and stays put.
//! - The pointer survives across transactions until the host re-addresses it.
//!
//! ACK/NACK and clock stretching belong to the controller. The engine never
//! fails: malformed traffic degrades to no-ops.
//!
//! Controllers that report transactions from an interrupt queue them as
//! [`ControllerEvent`]s; a servicing thread applies them in bus order with
//! [`BusSlave::serve`], one read byte per request.

pub mod notifier;

use log::debug;

use crate::registers::{REGISTER_COUNT, RegisterStore};
pub use notifier::{ChangeNotifier, ChangeObserver};

/// 7-bit slave address the host expects.
pub const DEFAULT_SLAVE_ADDRESS: u8 = 0x32;

/// Longest write a controller event carries: pointer byte plus a full map.
/// Anything longer would land past the end of the map and be dropped.
pub const MAX_WRITE: usize = REGISTER_COUNT + 1;

/// Opaque events from the bus controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusEvent {
    /// Our address matched; `read` is the direction bit.
    Start { read: bool },
    /// The host sent a byte.
    Received(u8),
    /// The host clocks out a byte from us.
    Requested,
    /// Stop condition.
    Stop,
}

/// Transaction work queued by an interrupt-driven controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerEvent {
    /// A finished write phase, `[register][data...]`.
    Write { len: u8, data: [u8; MAX_WRITE] },
    /// The host is clocking out one more byte; the bus is stretched until
    /// the byte is loaded.
    ByteRequested,
}

impl ControllerEvent {
    /// Capture a write phase, keeping at most [`MAX_WRITE`] bytes.
    pub fn write(bytes: &[u8]) -> Self {
        let len = bytes.len().min(MAX_WRITE);
        let mut data = [0u8; MAX_WRITE];
        data[..len].copy_from_slice(&bytes[..len]);
        Self::Write {
            len: len as u8,
            data,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusState {
    Idle,
    AddressedForWrite,
    ReceivingData,
    AddressedForRead,
    Transmitting,
}

pub struct BusSlave<'a> {
    regs: &'a RegisterStore,
    notifier: &'a ChangeNotifier,
    pointer: u8,
    state: BusState,
}

impl<'a> BusSlave<'a> {
    pub const fn new(regs: &'a RegisterStore, notifier: &'a ChangeNotifier) -> Self {
        Self {
            regs,
            notifier,
            pointer: 0,
            state: BusState::Idle,
        }
    }

    pub fn pointer(&self) -> u8 {
        self.pointer
    }

    pub fn state(&self) -> BusState {
        self.state
    }

    /// Advance the state machine by one controller event. Returns the byte
    /// to put on the wire for [`BusEvent::Requested`].
    pub fn handle(&mut self, event: BusEvent) -> Option<u8> {
        match event {
            BusEvent::Start { read: false } => {
                self.state = BusState::AddressedForWrite;
                None
            }
            BusEvent::Start { read: true } => {
                self.state = BusState::AddressedForRead;
                None
            }
            BusEvent::Received(byte) => {
                match self.state {
                    BusState::ReceivingData => self.store(byte),
                    // A controller that does not report address matches
                    // starts every write with the pointer byte.
                    _ => {
                        self.pointer = byte;
                        self.state = BusState::ReceivingData;
                    }
                }
                None
            }
            BusEvent::Requested => {
                self.state = BusState::Transmitting;
                Some(self.transmit())
            }
            BusEvent::Stop => {
                self.state = BusState::Idle;
                None
            }
        }
    }

    /// Whole write transaction as delivered by buffer-oriented controllers:
    /// `[register][data...]`. An empty write changes nothing.
    pub fn on_receive(&mut self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        self.handle(BusEvent::Start { read: false });
        for &b in bytes {
            self.handle(BusEvent::Received(b));
        }
        self.handle(BusEvent::Stop);
    }

    /// One byte of a read transaction.
    pub fn on_request(&mut self) -> u8 {
        self.handle(BusEvent::Requested).unwrap_or(0)
    }

    /// Apply one queued controller event. Returns the byte to load for
    /// [`ControllerEvent::ByteRequested`].
    pub fn serve(&mut self, event: &ControllerEvent) -> Option<u8> {
        match event {
            ControllerEvent::Write { len, data } => {
                self.on_receive(&data[..usize::from(*len)]);
                None
            }
            ControllerEvent::ByteRequested => Some(self.on_request()),
        }
    }

    fn store(&mut self, byte: u8) {
        if (self.pointer as usize) < REGISTER_COUNT {
            self.regs.set(self.pointer, byte);
            self.notifier.notify(self.pointer, byte);
            self.pointer += 1;
        } else {
            debug!("bus: dropped write 0x{:02X} at 0x{:02X}", byte, self.pointer);
        }
    }

    fn transmit(&mut self) -> u8 {
        if (self.pointer as usize) < REGISTER_COUNT {
            let value = self.regs.get(self.pointer);
            self.pointer += 1;
            value
        } else {
            0
        }
    }
}
