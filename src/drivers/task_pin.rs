//! Threads with a fixed core, RTOS priority and stack.
//!
//! Every long-lived thread of the node (one per priority level, plus the
//! I2C servicing thread) is started here. On ESP-IDF, `std::thread` runs on
//! pthreads over FreeRTOS tasks, and `esp_pthread_set_cfg()` stages the core,
//! priority and stack for the next thread created *from the calling thread*,
//! so staging and spawning happen back to back.
//!
//! Host builds only honour the name and the stack; levels still get their
//! own threads, which is what the tests rely on.

use std::io;
use std::thread::JoinHandle;

/// ESP32-S3 cores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum Core {
    /// PRO_CPU: I2C slave servicing and IDF housekeeping.
    Pro = 0,
    /// APP_CPU: sampling and control levels.
    App = 1,
}

/// Spawn `f` on `core` at RTOS `priority` with `stack_kb` of stack. `name`
/// carries a trailing NUL because the RTOS keeps a pointer to it.
pub fn spawn_on_core(
    core: Core,
    priority: u8,
    stack_kb: usize,
    name: &'static str,
    f: impl FnOnce() + Send + 'static,
) -> io::Result<JoinHandle<()>> {
    let label = name.strip_suffix('\0').ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, format!("thread name {name:?} lacks NUL"))
    })?;
    let stack_bytes = stack_kb * 1024;

    stage_rtos_config(core, priority, stack_bytes, name)?;
    log::info!("task: '{}' core={:?} pri={} stack={}KB", label, core, priority, stack_kb);

    std::thread::Builder::new()
        .name(label.into())
        .stack_size(stack_bytes)
        .spawn(f)
}

#[cfg(target_os = "espidf")]
fn stage_rtos_config(core: Core, priority: u8, stack_bytes: usize, name: &'static str) -> io::Result<()> {
    // SAFETY: the config comes from the IDF default constructor; `name` is
    // a static NUL-terminated string checked by the caller.
    let ret = unsafe {
        let mut cfg = esp_idf_sys::esp_create_default_pthread_config();
        cfg.pin_to_core = core as i32;
        cfg.prio = i32::from(priority);
        cfg.stack_size = stack_bytes as i32;
        cfg.thread_name = name.as_ptr().cast();
        esp_idf_sys::esp_pthread_set_cfg(&cfg)
    };
    if ret == esp_idf_sys::ESP_OK as i32 {
        Ok(())
    } else {
        Err(io::Error::other(format!("esp_pthread_set_cfg failed: {ret}")))
    }
}

#[cfg(not(target_os = "espidf"))]
fn stage_rtos_config(_core: Core, _priority: u8, _stack_bytes: usize, _name: &'static str) -> io::Result<()> {
    Ok(())
}
