//! GPIO / peripheral pin assignments for the HomeNode board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Host bus (I2C slave)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 8;
pub const I2C_SCL_GPIO: i32 = 9;

// ---------------------------------------------------------------------------
// Actuators
// ---------------------------------------------------------------------------

/// Active buzzer, HIGH = sounding.
pub const BUZZER_GPIO: i32 = 4;
/// Alarm LED, HIGH = lit.
pub const LED_GPIO: i32 = 5;

// ---------------------------------------------------------------------------
// Sensors
// ---------------------------------------------------------------------------

/// Single-pin ultrasonic ranger (trigger and echo share the line).
pub const RANGER_GPIO: i32 = 6;

/// Rotary potentiometer on ADC1 channel 6 (GPIO 7 on ESP32-S3).
pub const ANGLE_ADC_GPIO: i32 = 7;
pub const ANGLE_ADC_CHANNEL: u32 = 6;

/// 125 kHz tag reader, 9600 8N1 on UART1.
pub const TAG_UART_RX_GPIO: i32 = 18;
pub const TAG_UART_TX_GPIO: i32 = 17;
pub const TAG_UART_BAUD: u32 = 9_600;

// ---------------------------------------------------------------------------
// User button (active-low, internal pull-up)
// ---------------------------------------------------------------------------

pub const BUTTON_GPIO: i32 = 2;
