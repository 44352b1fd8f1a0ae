//! 125 kHz tag reader sampling.
//!
//! The reader emits one frame per card: a start byte, ten ID characters, a
//! checksum and a stop byte. A frame of at least [`MIN_TAG_FRAME`] bytes
//! counts as a tag; the six bytes after the start byte are published in
//! RFID_ID_0..5 and then RFID_STATUS goes to 1. When the reader is silent
//! RFID_STATUS drops back to 0. The task holds off after a read so one card
//! is reported once.

use heapless::Vec;
use log::{debug, info, warn};

use super::FaultLatch;
use crate::app::ports::TagReader;
use crate::error::{DriverError, ErrorCode};
use crate::registers::{RFID_ID_LEN, Register, RegisterStore};

/// Bytes read per poll.
pub const FRAME_CAPACITY: usize = 15;
/// Shortest frame accepted as a tag.
pub const MIN_TAG_FRAME: usize = 10;

pub type TagId = Vec<u8, RFID_ID_LEN>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagOutcome {
    /// Reader silent; RFID_STATUS cleared.
    NoData,
    /// Tag read and published.
    Present(TagId),
    /// Frame too short; registers left unchanged.
    Incomplete(usize),
}

/// ID bytes of a frame: up to six bytes following the start byte.
pub fn extract_id(frame: &[u8]) -> TagId {
    let end = frame.len().min(RFID_ID_LEN + 1);
    frame
        .get(1..end)
        .map(|id| id.iter().copied().collect())
        .unwrap_or_default()
}

pub struct TagSampler<T> {
    reader: T,
    frame: [u8; FRAME_CAPACITY],
    fault: FaultLatch,
}

impl<T: TagReader> TagSampler<T> {
    pub fn new(reader: T) -> Self {
        Self {
            reader,
            frame: [0; FRAME_CAPACITY],
            fault: FaultLatch::default(),
        }
    }

    pub fn init(&mut self) -> Result<(), DriverError> {
        self.reader.init()
    }

    pub fn sample(&mut self, regs: &RegisterStore) -> TagOutcome {
        if !self.reader.data_available() {
            regs.set_flag(Register::RfidStatus, false);
            return TagOutcome::NoData;
        }

        let len = self.reader.read_data(&mut self.frame).min(FRAME_CAPACITY);
        if len < MIN_TAG_FRAME {
            if self.fault.raise(regs, ErrorCode::TagFrameIncomplete) {
                warn!("tag: short frame ({} bytes)", len);
            } else {
                debug!("tag: short frame ({} bytes)", len);
            }
            return TagOutcome::Incomplete(len);
        }

        let id = extract_id(&self.frame[..len]);
        // ID first, so a host that sees RFID_STATUS=1 reads a whole ID.
        regs.write_block(Register::RfidId0, &id);
        regs.set_flag(Register::RfidStatus, true);
        self.fault.recover(regs, ErrorCode::TagFrameIncomplete);
        info!("tag: present {:02X?}", id.as_slice());
        TagOutcome::Present(id)
    }
}

// ── Device adapter ────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub struct UartTagReader {
    uart: esp_idf_hal::uart::UartDriver<'static>,
}

#[cfg(target_os = "espidf")]
impl UartTagReader {
    pub fn new(uart: esp_idf_hal::uart::UartDriver<'static>) -> Self {
        Self { uart }
    }
}

#[cfg(target_os = "espidf")]
impl TagReader for UartTagReader {
    fn init(&mut self) -> Result<(), DriverError> {
        self.uart
            .clear_rx()
            .map_err(|e| DriverError::Uart(e.code()))
    }

    fn data_available(&mut self) -> bool {
        self.uart.remaining_read().is_ok_and(|n| n > 0)
    }

    fn read_data(&mut self, buf: &mut [u8]) -> usize {
        self.uart
            .read(buf, esp_idf_hal::delay::NON_BLOCK)
            .unwrap_or(0)
    }
}
