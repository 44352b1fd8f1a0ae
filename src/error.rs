//! Unified error types for the HomeNode firmware.
//!
//! Collaborator failures are typed as [`DriverError`] and funnel into the
//! firmware-wide [`Error`]. The host only ever sees faults through the
//! ERROR_CODE register, so every fault that matters at runtime also maps to
//! an [`ErrorCode`]. All variants are `Copy`.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A sensor or actuator collaborator failed.
    Driver(DriverError),
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Driver(e) => write!(f, "driver: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Driver errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverError {
    /// The sensor did not answer in time (e.g. no ultrasonic echo).
    Timeout,
    /// ADC conversion failed.
    Adc,
    /// GPIO configuration or access failed (ESP-IDF return code).
    Gpio(i32),
    /// UART configuration or access failed (ESP-IDF return code).
    Uart(i32),
    /// I2C slave driver failure (ESP-IDF return code).
    Bus(i32),
    /// The collaborator was used before `init()` succeeded.
    NotInitialised,
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "timed out"),
            Self::Adc => write!(f, "ADC read failed"),
            Self::Gpio(rc) => write!(f, "GPIO failure (rc={rc})"),
            Self::Uart(rc) => write!(f, "UART failure (rc={rc})"),
            Self::Bus(rc) => write!(f, "I2C slave failure (rc={rc})"),
            Self::NotInitialised => write!(f, "not initialised"),
        }
    }
}

impl From<DriverError> for Error {
    fn from(e: DriverError) -> Self {
        Self::Driver(e)
    }
}

// ---------------------------------------------------------------------------
// ERROR_CODE register values
// ---------------------------------------------------------------------------

/// Fault codes published to the ERROR_CODE register. `0` means no fault.
///
/// The register holds the most recent fault. A subsystem clears only its own
/// code when it recovers, so one recovery never masks another fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ErrorCode {
    None = 0x00,
    /// Ultrasonic ranger produced no echo.
    RangeTimeout = 0x01,
    /// Rotary angle ADC read failed.
    AngleReadFailed = 0x02,
    /// Tag reader delivered a frame shorter than a full tag.
    TagFrameIncomplete = 0x03,
    /// A collaborator failed to initialise at boot.
    PeripheralInit = 0x10,
}

impl ErrorCode {
    pub const fn code(self) -> u8 {
        self as u8
    }

    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0x00 => Some(Self::None),
            0x01 => Some(Self::RangeTimeout),
            0x02 => Some(Self::AngleReadFailed),
            0x03 => Some(Self::TagFrameIncomplete),
            0x10 => Some(Self::PeripheralInit),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::RangeTimeout => write!(f, "range timeout"),
            Self::AngleReadFailed => write!(f, "angle read failed"),
            Self::TagFrameIncomplete => write!(f, "tag frame incomplete"),
            Self::PeripheralInit => write!(f, "peripheral init failed"),
        }
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
