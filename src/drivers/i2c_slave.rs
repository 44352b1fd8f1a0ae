//! ESP-IDF I2C slave adapter feeding the [`BusSlave`] engine.
//!
//! Uses the callback-based slave driver (`CONFIG_I2C_ENABLE_SLAVE_DRIVER_VERSION_2`,
//! see `sdkconfig.defaults`). Both callbacks run in interrupt context and
//! only queue a [`ControllerEvent`]:
//!
//! - `on_receive` hands over a finished write phase (`[register][data...]`);
//! - `on_request` fires each time the host clocks out a byte the TX FIFO
//!   does not hold. The controller stretches SCL until it is loaded.
//!
//! The servicing thread applies events in queue order, so a combined
//! `[reg]` + repeated-start read always sees the new pointer, and each read
//! byte goes through the engine and advances the pointer.

use core::ffi::c_void;
use core::ptr;
use core::sync::atomic::{AtomicU32, Ordering};

use esp_idf_hal::delay::BLOCK;
use esp_idf_hal::i2c::I2C0;
use esp_idf_hal::task::queue::Queue;
use esp_idf_svc::sys::*;
use log::{info, warn};

use crate::bus::{BusSlave, ChangeNotifier, ControllerEvent};
use crate::drivers::task_pin::{self, Core};
use crate::error::DriverError;
use crate::pins;
use crate::registers::RegisterStore;

const EVENT_QUEUE_DEPTH: usize = 16;
const RX_BUFFER_DEPTH: u32 = 64;
const TX_BUFFER_DEPTH: u32 = 32;
const LOAD_TIMEOUT_MS: i32 = 5;

/// Events the interrupt could not queue.
static DROPPED: AtomicU32 = AtomicU32::new(0);

struct SlaveHandle(i2c_slave_dev_handle_t);

// SAFETY: the handle is only used by the servicing thread after creation.
unsafe impl Send for SlaveHandle {}

fn check(ret: esp_err_t) -> Result<(), DriverError> {
    if ret == ESP_OK as esp_err_t { Ok(()) } else { Err(DriverError::Bus(ret)) }
}

fn enqueue(arg: *mut c_void, event: ControllerEvent) -> bool {
    // SAFETY: arg is the leaked queue registered in `spawn`.
    let queue = unsafe { &*(arg as *const Queue<ControllerEvent>) };
    match queue.send_back(event, 0) {
        Ok(woken) => woken,
        Err(_) => {
            DROPPED.fetch_add(1, Ordering::Relaxed);
            false
        }
    }
}

unsafe extern "C" fn on_receive(
    _dev: i2c_slave_dev_handle_t,
    evt: *const i2c_slave_rx_done_event_data_t,
    arg: *mut c_void,
) -> bool {
    // SAFETY: the driver passes a valid event whose buffer lives for the
    // duration of the callback; the bytes are copied out before returning.
    let bytes = unsafe {
        let evt = &*evt;
        core::slice::from_raw_parts(evt.buffer, evt.length as usize)
    };
    enqueue(arg, ControllerEvent::write(bytes))
}

unsafe extern "C" fn on_request(
    _dev: i2c_slave_dev_handle_t,
    _evt: *const i2c_slave_request_event_data_t,
    arg: *mut c_void,
) -> bool {
    enqueue(arg, ControllerEvent::ByteRequested)
}

/// Open the slave device and start the servicing thread on the PRO core.
pub fn spawn(
    i2c: I2C0,
    address: u8,
    priority: u8,
    regs: &'static RegisterStore,
    notifier: &'static ChangeNotifier,
) -> Result<std::thread::JoinHandle<()>, DriverError> {
    let queue: &'static Queue<ControllerEvent> = Box::leak(Box::new(Queue::new(EVENT_QUEUE_DEPTH)));

    let config = i2c_slave_config_t {
        i2c_port: 0,
        sda_io_num: pins::I2C_SDA_GPIO,
        scl_io_num: pins::I2C_SCL_GPIO,
        clk_source: soc_periph_i2c_clk_src_t_I2C_CLK_SRC_DEFAULT,
        send_buf_depth: TX_BUFFER_DEPTH,
        receive_buf_depth: RX_BUFFER_DEPTH,
        slave_addr: u16::from(address),
        addr_bit_len: i2c_addr_bit_len_t_I2C_ADDR_BIT_LEN_7,
        ..Default::default()
    };
    let callbacks = i2c_slave_event_callbacks_t {
        on_request: Some(on_request),
        on_receive: Some(on_receive),
    };

    let mut dev: i2c_slave_dev_handle_t = ptr::null_mut();
    // SAFETY: config and callbacks are fully initialised; the queue passed
    // as user data is leaked and outlives the device.
    unsafe {
        check(i2c_new_slave_device(&config, &mut dev))?;
        check(i2c_slave_register_event_callbacks(
            dev,
            &callbacks,
            ptr::from_ref(queue).cast_mut().cast::<c_void>(),
        ))?;
    }
    info!("i2c: slave ready at 0x{:02X}", address);

    let handle = SlaveHandle(dev);
    task_pin::spawn_on_core(Core::Pro, priority, 4, "i2c-slave\0", move || {
        // The port stays claimed for as long as the device runs.
        let _port = i2c;
        service(&handle, queue, BusSlave::new(regs, notifier));
    })
    .map_err(|_| DriverError::Bus(-1))
}

fn service(dev: &SlaveHandle, queue: &Queue<ControllerEvent>, mut bus: BusSlave<'static>) {
    loop {
        let Some((event, _)) = queue.recv_front(BLOCK) else {
            continue;
        };
        if let Some(byte) = bus.serve(&event) {
            load_byte(dev, byte);
        }
        let lost = DROPPED.swap(0, Ordering::Relaxed);
        if lost > 0 {
            warn!("i2c: event queue full, {} event(s) lost", lost);
        }
    }
}

fn load_byte(dev: &SlaveHandle, byte: u8) {
    let mut written: u32 = 0;
    // SAFETY: dev is the live slave handle; the byte outlives the call.
    let ret = unsafe { i2c_slave_write(dev.0, &byte, 1, &mut written, LOAD_TIMEOUT_MS) };
    if ret != ESP_OK as esp_err_t || written != 1 {
        warn!("i2c: TX load failed ({}, {} written)", ret, written);
    }
}
