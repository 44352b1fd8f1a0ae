//! Clock and wake queue behind every `async_io_mini::Timer` in the crate.
//!
//! The timers ask `embassy-time-driver` for the current tick and for a wake
//! at a future tick. Ticks are microseconds (the driver's default 1 MHz
//! rate): `esp_timer_get_time` on the device, a process-local monotonic
//! clock on the host.
//!
//! Wakes are kept in one queue served by a single `time-wake` thread that
//! sleeps until the earliest deadline. A waker that is already queued keeps
//! a single entry at the earlier of its two deadlines.

use core::task::Waker;
use core::time::Duration;
use std::sync::{Condvar, Mutex, MutexGuard, OnceLock, PoisonError};

use embassy_time_driver::Driver;
use log::error;

struct NodeClock;

embassy_time_driver::time_driver_impl!(static CLOCK: NodeClock = NodeClock);

impl Driver for NodeClock {
    fn now(&self) -> u64 {
        now_us()
    }

    fn schedule_wake(&self, at: u64, waker: &Waker) {
        if at <= now_us() {
            waker.wake_by_ref();
            return;
        }
        match wake_queue() {
            Some(queue) => queue.push(at, waker),
            None => waker.wake_by_ref(),
        }
    }
}

/// Microseconds since boot.
#[cfg(target_os = "espidf")]
pub fn now_us() -> u64 {
    // SAFETY: esp_timer_get_time is a monotonic counter read.
    let us = unsafe { esp_idf_svc::sys::esp_timer_get_time() };
    us.max(0) as u64
}

/// Microseconds since the first clock read in this process.
#[cfg(not(target_os = "espidf"))]
pub fn now_us() -> u64 {
    static EPOCH: OnceLock<std::time::Instant> = OnceLock::new();
    let elapsed = EPOCH.get_or_init(std::time::Instant::now).elapsed();
    u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX)
}

// ── Wake queue ────────────────────────────────────────────────

#[derive(Default)]
struct WakeQueue {
    pending: Mutex<Vec<(u64, Waker)>>,
    changed: Condvar,
}

impl WakeQueue {
    fn lock(&self) -> MutexGuard<'_, Vec<(u64, Waker)>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, at: u64, waker: &Waker) {
        let mut pending = self.lock();
        match pending.iter_mut().find(|(_, w)| w.will_wake(waker)) {
            Some(entry) => entry.0 = entry.0.min(at),
            None => pending.push((at, waker.clone())),
        }
        self.changed.notify_one();
    }

    /// Wake every expired entry; returns the earliest remaining deadline.
    fn fire_expired(pending: &mut Vec<(u64, Waker)>, now: u64) -> Option<u64> {
        let mut i = 0;
        while i < pending.len() {
            if pending[i].0 <= now {
                pending.swap_remove(i).1.wake();
            } else {
                i += 1;
            }
        }
        pending.iter().map(|(at, _)| *at).min()
    }

    fn serve(&self) {
        let mut pending = self.lock();
        loop {
            pending = match Self::fire_expired(&mut pending, now_us()) {
                None => self.changed.wait(pending).unwrap_or_else(PoisonError::into_inner),
                Some(at) => {
                    let sleep = Duration::from_micros(at.saturating_sub(now_us()));
                    self.changed
                        .wait_timeout(pending, sleep)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0
                }
            };
        }
    }
}

/// The shared queue, starting its thread on first use. `None` when the
/// thread could not be started; timers then degrade to immediate re-polls.
fn wake_queue() -> Option<&'static WakeQueue> {
    static QUEUE: OnceLock<Option<&'static WakeQueue>> = OnceLock::new();
    *QUEUE.get_or_init(|| {
        let queue: &'static WakeQueue = Box::leak(Box::default());
        match std::thread::Builder::new()
            .name("time-wake".into())
            .stack_size(3 * 1024)
            .spawn(move || queue.serve())
        {
            Ok(_) => Some(queue),
            Err(e) => {
                error!("time: wake thread failed to start ({})", e);
                None
            }
        }
    })
}
