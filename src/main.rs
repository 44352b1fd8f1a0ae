//! HomeNode firmware: main entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                     Adapters (outer ring)                      │
//! │                                                                │
//! │  I2cSlaveDriver    IsrButton     PinSwitch ×2   PulseRanger    │
//! │  (bus thread)      (GPIO ISR)    (buzzer, LED)  AdcAngle       │
//! │                                                 UartTagReader  │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │  RegisterStore · BusSlave · ChangeNotifier             │    │
//! │  │  DebouncedLatch · samplers · AlarmController           │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Priority levels: control · tag · sampling  (+ bus thread)     │
//! │  Main thread: watchdog + register snapshots                    │
//! └────────────────────────────────────────────────────────────────┘
//! ```

use std::time::{Duration, Instant};

use anyhow::Result;
use esp_idf_hal::gpio::{AnyInputPin, AnyIOPin, AnyOutputPin, PinDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::uart::{UartDriver, config::Config as UartConfig};
use esp_idf_hal::units::Hertz;
use log::{error, info};

use homenode::app::Node;
use homenode::app::tasks::{spawn_control, spawn_sampling, spawn_tag};
use homenode::bus::ChangeNotifier;
use homenode::config::NodeConfig;
use homenode::control::BeepGate;
use homenode::drivers::button::{DEFAULT_DEBOUNCE_MS, DebouncedLatch};
use homenode::drivers::hw_init::IsrButton;
use homenode::drivers::i2c_slave;
use homenode::drivers::switch::PinSwitch;
use homenode::drivers::watchdog::Watchdog;
use homenode::error::{DriverError, ErrorCode};
use homenode::pins;
use homenode::registers::{Register, RegisterStore};
use homenode::sensors::rfid::{TagSampler, UartTagReader};
use homenode::sensors::rotary::{AdcAngle, AngleSampler};
use homenode::sensors::ultrasonic::{DistanceSampler, PulseRanger};

// ── Process-lifetime state ────────────────────────────────────

static REGISTERS: RegisterStore = RegisterStore::new();
static NOTIFIER: ChangeNotifier = ChangeNotifier::new();
static BUTTON: DebouncedLatch = DebouncedLatch::new(DEFAULT_DEBOUNCE_MS);
static BEEP: BeepGate = BeepGate::new();

/// Supervisor wake interval.
const SUPERVISOR_TICK: Duration = Duration::from_millis(500);

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  HomeNode v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = NodeConfig::default();
    config.validate()?;
    BUTTON.set_window(config.debounce_ms);

    // ── 2. Actuators + command dispatch ───────────────────────
    // SAFETY: pins::* are dedicated to these functions on this board.
    let (buzzer_pin, led_pin) = unsafe {
        (
            AnyOutputPin::new(pins::BUZZER_GPIO),
            AnyOutputPin::new(pins::LED_GPIO),
        )
    };
    let buzzer = Box::leak(Box::new(PinSwitch::new("buzzer", PinDriver::output(buzzer_pin)?)));
    let led = Box::leak(Box::new(PinSwitch::new("led", PinDriver::output(led_pin)?)));

    let node = Node {
        registers: &REGISTERS,
        notifier: &NOTIFIER,
        button: &BUTTON,
        beep: &BEEP,
        buzzer: &*buzzer,
        led: &*led,
    };

    let report = |what: &str, result: core::result::Result<(), DriverError>| {
        if let Err(e) = result {
            error!("init: {} failed ({}), continuing degraded", what, e);
            node.report_fault(ErrorCode::PeripheralInit);
        }
    };

    report("outputs", node.init_outputs());
    node.bind_commands();

    // ── 3. Button latch ───────────────────────────────────────
    let mut button = IsrButton::new(pins::BUTTON_GPIO, &BUTTON);
    report("button", BUTTON.init(&mut button));

    // ── 4. Sensors ────────────────────────────────────────────
    let peripherals = Peripherals::take()?;

    let mut distance = DistanceSampler::new(
        PulseRanger::new(pins::RANGER_GPIO),
        config.motion_threshold_mm,
    );
    report("ranger", distance.init());

    let mut angle = AngleSampler::new(AdcAngle::new(pins::ANGLE_ADC_CHANNEL));
    report("angle", angle.init());

    // SAFETY: pins::TAG_UART_* are dedicated to the tag reader.
    let (tag_tx, tag_rx) = unsafe {
        (
            AnyOutputPin::new(pins::TAG_UART_TX_GPIO),
            AnyInputPin::new(pins::TAG_UART_RX_GPIO),
        )
    };
    let tag_uart = UartDriver::new(
        peripherals.uart1,
        tag_tx,
        tag_rx,
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &UartConfig::default().baudrate(Hertz(pins::TAG_UART_BAUD)),
    );

    // ── 5. Host bus ───────────────────────────────────────────
    if let Err(e) = i2c_slave::spawn(
        peripherals.i2c0,
        config.slave_address,
        config.bus_priority,
        &REGISTERS,
        &NOTIFIER,
    ) {
        error!("init: I2C slave failed ({}), node unreachable", e);
        node.report_fault(ErrorCode::PeripheralInit);
    }

    // ── 6. Task levels ────────────────────────────────────────
    spawn_control(node, &config)?;
    spawn_sampling(distance, angle, &REGISTERS, &config)?;
    match tag_uart {
        Ok(uart) => {
            let mut tag = TagSampler::new(UartTagReader::new(uart));
            report("tag reader", tag.init());
            spawn_tag(tag, &REGISTERS, &config)?;
        }
        Err(e) => {
            error!("init: tag UART failed ({}), tag sampling disabled", e);
            node.report_fault(ErrorCode::PeripheralInit);
        }
    }

    info!("HomeNode ready at 0x{:02X}", config.slave_address);

    // ── 7. Supervisor ─────────────────────────────────────────
    let watchdog = Watchdog::new(config.watchdog_timeout_ms);
    let snapshot_every = Duration::from_secs(config.snapshot_interval_secs.into());
    let mut last_snapshot = Instant::now();

    loop {
        watchdog.feed();
        if !snapshot_every.is_zero() && last_snapshot.elapsed() >= snapshot_every {
            log_snapshot(&REGISTERS);
            last_snapshot = Instant::now();
        }
        std::thread::sleep(SUPERVISOR_TICK);
    }
}

fn log_snapshot(regs: &RegisterStore) {
    let snap = regs.snapshot();
    let reg = |r: Register| snap[r.offset() as usize];
    info!(
        "regs | status={} alarm={} motion={} dist={}mm angle={} tag={} button={} err=0x{:02X}",
        reg(Register::Status),
        reg(Register::AlarmState),
        reg(Register::MotionDetected),
        u16::from_be_bytes([reg(Register::DistanceH), reg(Register::DistanceL)]),
        reg(Register::RotaryAngle),
        reg(Register::RfidStatus),
        reg(Register::ButtonState),
        reg(Register::ErrorCode),
    );
}
