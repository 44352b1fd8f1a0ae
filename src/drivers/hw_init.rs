//! Raw ESP-IDF peripheral plumbing for the sensor and button adapters.
//!
//! GPIO direction changes, the pulse-timed ranger line, ADC1 one-shot reads
//! and the button edge interrupt, all via `esp_idf_svc::sys`. Device-only;
//! the host build uses mocks behind the port traits instead.

use core::ffi::c_void;
use core::ptr;
use core::sync::atomic::{AtomicPtr, Ordering};

use esp_idf_svc::sys::*;
use log::info;

use crate::app::ports::{Edge, EdgeInput};
use crate::drivers::button::DebouncedLatch;
use crate::error::DriverError;

fn check(ret: esp_err_t, err: fn(i32) -> DriverError) -> Result<(), DriverError> {
    if ret == ESP_OK as esp_err_t { Ok(()) } else { Err(err(ret)) }
}

// ── GPIO ──────────────────────────────────────────────────────

pub fn gpio_output(pin: i32) -> Result<(), DriverError> {
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pin,
        mode: gpio_mode_t_GPIO_MODE_OUTPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    // SAFETY: cfg is a fully initialised config for a single valid pin.
    check(unsafe { gpio_config(&cfg) }, DriverError::Gpio)?;
    // SAFETY: pin was configured as an output above.
    unsafe { gpio_set_level(pin, 0) };
    Ok(())
}

fn micros() -> i64 {
    // SAFETY: esp_timer_get_time is a monotonic counter read.
    unsafe { esp_timer_get_time() }
}

/// Trigger a single-pin ranger and time the echo pulse. `None` when no echo
/// starts or ends within `timeout_us`.
pub fn ping_echo_us(pin: i32, timeout_us: u32) -> Option<u32> {
    // SAFETY: the ranger pin is owned by the distance sampler; the sampling
    // level is the only caller.
    unsafe {
        gpio_set_direction(pin, gpio_mode_t_GPIO_MODE_OUTPUT);
        gpio_set_level(pin, 0);
        esp_rom_delay_us(2);
        gpio_set_level(pin, 1);
        esp_rom_delay_us(5);
        gpio_set_level(pin, 0);
        gpio_set_direction(pin, gpio_mode_t_GPIO_MODE_INPUT);
    }

    let limit = i64::from(timeout_us);
    let armed = micros();
    // SAFETY: read-only level access on a configured input.
    while unsafe { gpio_get_level(pin) } == 0 {
        if micros() - armed > limit {
            return None;
        }
    }
    let rise = micros();
    while unsafe { gpio_get_level(pin) } != 0 {
        if micros() - rise > limit {
            return None;
        }
    }
    u32::try_from(micros() - rise).ok()
}

// ── ADC1 (oneshot) ────────────────────────────────────────────

static ADC1: AtomicPtr<adc_oneshot_unit_ctx_t> = AtomicPtr::new(ptr::null_mut());

fn adc1_unit() -> Result<adc_oneshot_unit_handle_t, DriverError> {
    let existing = ADC1.load(Ordering::Acquire);
    if !existing.is_null() {
        return Ok(existing);
    }
    let init_cfg = adc_oneshot_unit_init_cfg_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
        ..Default::default()
    };
    let mut handle: adc_oneshot_unit_handle_t = ptr::null_mut();
    // SAFETY: called from boot before the sampling level starts.
    let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &mut handle) };
    if ret != ESP_OK as esp_err_t {
        return Err(DriverError::Adc);
    }
    ADC1.store(handle, Ordering::Release);
    info!("hw_init: ADC1 unit ready");
    Ok(handle)
}

pub fn init_adc_channel(channel: u32) -> Result<(), DriverError> {
    let unit = adc1_unit()?;
    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten: adc_atten_t_ADC_ATTEN_DB_12,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
    };
    // SAFETY: unit is a live handle from adc_oneshot_new_unit.
    let ret = unsafe { adc_oneshot_config_channel(unit, channel, &chan_cfg) };
    if ret != ESP_OK as esp_err_t {
        return Err(DriverError::Adc);
    }
    info!("hw_init: ADC1 CH{} configured", channel);
    Ok(())
}

/// 12-bit one-shot conversion.
pub fn adc1_read(channel: u32) -> Result<u16, DriverError> {
    let unit = ADC1.load(Ordering::Acquire);
    if unit.is_null() {
        return Err(DriverError::NotInitialised);
    }
    let mut raw: i32 = 0;
    // SAFETY: unit is live; only the sampling level reads this channel.
    let ret = unsafe { adc_oneshot_read(unit, channel, &mut raw) };
    if ret != ESP_OK as esp_err_t {
        return Err(DriverError::Adc);
    }
    Ok(raw.clamp(0, 4095) as u16)
}

// ── Button edge interrupt ─────────────────────────────────────

unsafe extern "C" fn button_gpio_isr(arg: *mut c_void) {
    // SAFETY: arg is the &'static DebouncedLatch registered in `init`.
    let latch = unsafe { &*(arg as *const DebouncedLatch) };
    let now_ms = (crate::time_driver::now_us() / 1_000) as u32;
    latch.on_edge(now_ms);
}

/// Button GPIO whose interrupt feeds a [`DebouncedLatch`].
pub struct IsrButton {
    gpio: i32,
    latch: &'static DebouncedLatch,
}

impl IsrButton {
    pub fn new(gpio: i32, latch: &'static DebouncedLatch) -> Self {
        Self { gpio, latch }
    }
}

impl EdgeInput for IsrButton {
    fn init(&mut self, edge: Edge) -> Result<(), DriverError> {
        let intr_type = match edge {
            Edge::Falling => gpio_int_type_t_GPIO_INTR_NEGEDGE,
            Edge::Rising => gpio_int_type_t_GPIO_INTR_POSEDGE,
            Edge::Any => gpio_int_type_t_GPIO_INTR_ANYEDGE,
        };
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << self.gpio,
            mode: gpio_mode_t_GPIO_MODE_INPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_ENABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type,
        };
        // SAFETY: cfg is fully initialised; the ISR argument points at a
        // 'static latch, and the handler only touches atomics and a
        // critical-section signal.
        unsafe {
            check(gpio_config(&cfg), DriverError::Gpio)?;
            let ret = gpio_install_isr_service(0);
            if ret != ESP_OK as esp_err_t && ret != ESP_ERR_INVALID_STATE as esp_err_t {
                return Err(DriverError::Gpio(ret));
            }
            let arg = ptr::from_ref(self.latch).cast_mut().cast::<c_void>();
            check(
                gpio_isr_handler_add(self.gpio, Some(button_gpio_isr), arg),
                DriverError::Gpio,
            )?;
            check(gpio_intr_enable(self.gpio), DriverError::Gpio)?;
        }
        info!("hw_init: button ISR armed on GPIO{} ({:?})", self.gpio, edge);
        Ok(())
    }
}
