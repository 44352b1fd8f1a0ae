//! Shared register map: the single source of truth for node state.
//!
//! The host sees the node as 32 byte-wide slots addressed over I2C. Tasks,
//! the bus engine and the notifier all read and write the same table, so each
//! slot is an `AtomicU8` (no torn bytes, last writer wins) and multi-byte
//! composites are written inside a critical section.
//!
//! | Offset      | Name            | Host | Meaning                         |
//! |-------------|-----------------|------|---------------------------------|
//! | 0x00        | STATUS          | R    | non-zero = system OK            |
//! | 0x01        | ALARM_STATE     | R/W  | 0 = disabled, 1 = enabled       |
//! | 0x02        | MOTION_DETECTED | R    | 0/1                             |
//! | 0x03        | BUZZER_CMD      | R/W  | 0/1                             |
//! | 0x04        | LED_CMD         | R/W  | 0/1                             |
//! | 0x05 / 0x06 | DISTANCE_H / _L | R    | millimetres, big-endian         |
//! | 0x07        | RFID_STATUS     | R    | 0 = no tag, 1 = tag present     |
//! | 0x08..0x0D  | RFID_ID_0..5    | R    | tag ID bytes                    |
//! | 0x10        | ROTARY_ANGLE    | R    | 0-255 scaled from 0-300 degrees |
//! | 0x11        | BUTTON_STATE    | R    | 0/1                             |
//! | 0x12        | COMMAND         | R/W  | generic command byte            |
//! | 0x13        | ERROR_CODE      | R    | fault code, 0 = none            |

use core::sync::atomic::{AtomicU8, Ordering};

/// Number of addressable slots.
pub const REGISTER_COUNT: usize = 32;

/// Number of tag ID bytes published in RFID_ID_0..5.
pub const RFID_ID_LEN: usize = 6;

/// Value written to STATUS while the control loop is alive.
pub const STATUS_OK: u8 = 0x01;

// ═══════════════════════════════════════════════════════════════
//  Register names
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Register {
    Status = 0x00,
    AlarmState = 0x01,
    MotionDetected = 0x02,
    BuzzerCmd = 0x03,
    LedCmd = 0x04,
    DistanceH = 0x05,
    DistanceL = 0x06,
    RfidStatus = 0x07,
    RfidId0 = 0x08,
    RfidId1 = 0x09,
    RfidId2 = 0x0A,
    RfidId3 = 0x0B,
    RfidId4 = 0x0C,
    RfidId5 = 0x0D,
    RotaryAngle = 0x10,
    ButtonState = 0x11,
    Command = 0x12,
    ErrorCode = 0x13,
}

/// Whether the host may write a register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    ReadOnly,
    ReadWrite,
}

impl Register {
    pub const ALL: [Register; 18] = [
        Register::Status,
        Register::AlarmState,
        Register::MotionDetected,
        Register::BuzzerCmd,
        Register::LedCmd,
        Register::DistanceH,
        Register::DistanceL,
        Register::RfidStatus,
        Register::RfidId0,
        Register::RfidId1,
        Register::RfidId2,
        Register::RfidId3,
        Register::RfidId4,
        Register::RfidId5,
        Register::RotaryAngle,
        Register::ButtonState,
        Register::Command,
        Register::ErrorCode,
    ];

    pub const fn offset(self) -> u8 {
        self as u8
    }

    /// Named register at `offset`, if any. Offsets 0x0E, 0x0F and 0x14..0x1F
    /// are storage-only slots.
    pub const fn from_offset(offset: u8) -> Option<Self> {
        Some(match offset {
            0x00 => Self::Status,
            0x01 => Self::AlarmState,
            0x02 => Self::MotionDetected,
            0x03 => Self::BuzzerCmd,
            0x04 => Self::LedCmd,
            0x05 => Self::DistanceH,
            0x06 => Self::DistanceL,
            0x07 => Self::RfidStatus,
            0x08 => Self::RfidId0,
            0x09 => Self::RfidId1,
            0x0A => Self::RfidId2,
            0x0B => Self::RfidId3,
            0x0C => Self::RfidId4,
            0x0D => Self::RfidId5,
            0x10 => Self::RotaryAngle,
            0x11 => Self::ButtonState,
            0x12 => Self::Command,
            0x13 => Self::ErrorCode,
            _ => return None,
        })
    }

    pub const fn access(self) -> Access {
        match self {
            Self::AlarmState | Self::BuzzerCmd | Self::LedCmd | Self::Command => Access::ReadWrite,
            _ => Access::ReadOnly,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Status => "STATUS",
            Self::AlarmState => "ALARM_STATE",
            Self::MotionDetected => "MOTION_DETECTED",
            Self::BuzzerCmd => "BUZZER_CMD",
            Self::LedCmd => "LED_CMD",
            Self::DistanceH => "DISTANCE_H",
            Self::DistanceL => "DISTANCE_L",
            Self::RfidStatus => "RFID_STATUS",
            Self::RfidId0 => "RFID_ID_0",
            Self::RfidId1 => "RFID_ID_1",
            Self::RfidId2 => "RFID_ID_2",
            Self::RfidId3 => "RFID_ID_3",
            Self::RfidId4 => "RFID_ID_4",
            Self::RfidId5 => "RFID_ID_5",
            Self::RotaryAngle => "ROTARY_ANGLE",
            Self::ButtonState => "BUTTON_STATE",
            Self::Command => "COMMAND",
            Self::ErrorCode => "ERROR_CODE",
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Store
// ═══════════════════════════════════════════════════════════════

/// Fixed table of [`REGISTER_COUNT`] byte slots.
///
/// Access by raw offset is bounds-checked: out-of-range writes are ignored
/// and out-of-range reads yield 0. The store never calls the change
/// notifier; only the bus engine does that for host writes.
pub struct RegisterStore {
    cells: [AtomicU8; REGISTER_COUNT],
}

impl Default for RegisterStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterStore {
    pub const fn new() -> Self {
        Self {
            cells: [const { AtomicU8::new(0) }; REGISTER_COUNT],
        }
    }

    // ── Raw offsets ───────────────────────────────────────────

    pub fn get(&self, offset: u8) -> u8 {
        self.cells
            .get(offset as usize)
            .map_or(0, |cell| cell.load(Ordering::Acquire))
    }

    pub fn set(&self, offset: u8, value: u8) {
        if let Some(cell) = self.cells.get(offset as usize) {
            cell.store(value, Ordering::Release);
        }
    }

    // ── Named registers ───────────────────────────────────────

    pub fn read(&self, reg: Register) -> u8 {
        self.get(reg.offset())
    }

    pub fn write(&self, reg: Register, value: u8) {
        self.set(reg.offset(), value);
    }

    pub fn flag(&self, reg: Register) -> bool {
        self.read(reg) != 0
    }

    pub fn set_flag(&self, reg: Register, on: bool) {
        self.write(reg, u8::from(on));
    }

    /// Atomically flip a 0/1 flag and return the new state. Any non-zero
    /// value counts as set and toggles to 0.
    pub fn toggle_flag(&self, reg: Register) -> bool {
        let cell = &self.cells[reg.offset() as usize];
        let prev = cell
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |v| Some(u8::from(v == 0)))
            .unwrap_or_else(|v| v);
        prev == 0
    }

    /// Clear `reg` only if it still holds `expected`. Returns whether it did.
    pub fn clear_if(&self, reg: Register, expected: u8) -> bool {
        self.cells[reg.offset() as usize]
            .compare_exchange(expected, 0, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    // ── Composites ────────────────────────────────────────────

    /// Big-endian 16-bit composite starting at `high` (high byte first).
    pub fn read_u16(&self, high: Register) -> u16 {
        let hi = high.offset();
        critical_section::with(|_| u16::from_be_bytes([self.get(hi), self.get(hi.wrapping_add(1))]))
    }

    pub fn write_u16(&self, high: Register, value: u16) {
        let hi = high.offset();
        let [h, l] = value.to_be_bytes();
        critical_section::with(|_| {
            self.set(hi, h);
            self.set(hi.wrapping_add(1), l);
        });
    }

    /// Write `bytes` to consecutive slots starting at `first`, as one unit
    /// with respect to other composite accesses. Bytes past the map are dropped.
    pub fn write_block(&self, first: Register, bytes: &[u8]) {
        critical_section::with(|_| {
            for (offset, &b) in (first.offset()..).zip(bytes) {
                self.set(offset, b);
            }
        });
    }

    pub fn read_block(&self, first: Register, out: &mut [u8]) {
        critical_section::with(|_| {
            for (offset, slot) in (first.offset()..).zip(out.iter_mut()) {
                *slot = self.get(offset);
            }
        });
    }

    /// Consistent copy of the whole table.
    pub fn snapshot(&self) -> [u8; REGISTER_COUNT] {
        let mut out = [0u8; REGISTER_COUNT];
        critical_section::with(|_| {
            for (slot, cell) in out.iter_mut().zip(&self.cells) {
                *slot = cell.load(Ordering::Acquire);
            }
        });
        out
    }
}
