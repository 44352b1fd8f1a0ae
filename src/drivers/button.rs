//! ISR-debounced push-button latch.
//!
//! ## Hardware
//!
//! Active-low momentary switch with pull-up. The GPIO interrupt fires on the
//! falling edge and calls [`DebouncedLatch::on_edge`] with the current
//! millisecond tick. That is the only code that runs in interrupt context:
//! a timestamp compare, two atomic stores and a non-blocking signal release.
//!
//! ## Handoff
//!
//! The latch is a binary permit. Accepted edges release it; releases while
//! it is already set collapse into one. A task consumes it with
//! [`DebouncedLatch::wait_for_press`].
//!
//! | Edge spacing        | Presses seen by the task |
//! |---------------------|--------------------------|
//! | <= window (200 ms)  | 1                        |
//! | > window            | one per edge             |

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use core::time::Duration;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use futures_lite::future;

use crate::app::ports::{Edge, EdgeInput};
use crate::error::DriverError;

/// Debounce window for the panel push button.
pub const DEFAULT_DEBOUNCE_MS: u32 = 200;

pub struct DebouncedLatch {
    window_ms: AtomicU32,
    /// Tick of the last accepted edge. Only meaningful once `seen` is set.
    last_accept_ms: AtomicU32,
    seen: AtomicBool,
    armed: AtomicBool,
    permit: Signal<CriticalSectionRawMutex, ()>,
}

impl Default for DebouncedLatch {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_MS)
    }
}

impl DebouncedLatch {
    pub const fn new(window_ms: u32) -> Self {
        Self {
            window_ms: AtomicU32::new(window_ms),
            last_accept_ms: AtomicU32::new(0),
            seen: AtomicBool::new(false),
            armed: AtomicBool::new(false),
            permit: Signal::new(),
        }
    }

    /// Configure the input (pull-up, falling edge) and arm the latch. On
    /// failure the latch stays disarmed and `wait_for_press` keeps
    /// returning `false`.
    pub fn init(&self, pin: &mut impl EdgeInput) -> Result<(), DriverError> {
        pin.init(Edge::Falling)?;
        self.armed.store(true, Ordering::Release);
        Ok(())
    }

    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::Acquire)
    }

    pub fn set_window(&self, window_ms: u32) {
        self.window_ms.store(window_ms, Ordering::Relaxed);
    }

    pub fn window_ms(&self) -> u32 {
        self.window_ms.load(Ordering::Relaxed)
    }

    /// Interrupt-context entry point. Returns whether the edge was accepted.
    ///
    /// The tick may wrap; elapsed time is computed with wrapping arithmetic.
    pub fn on_edge(&self, now_ms: u32) -> bool {
        let seen = self.seen.load(Ordering::Acquire);
        let last = self.last_accept_ms.load(Ordering::Acquire);
        if seen && now_ms.wrapping_sub(last) <= self.window_ms() {
            return false;
        }
        self.last_accept_ms.store(now_ms, Ordering::Release);
        self.seen.store(true, Ordering::Release);
        self.permit.signal(());
        true
    }

    /// Consume a pending press without waiting.
    pub fn try_take(&self) -> bool {
        self.permit.try_take().is_some()
    }

    /// Wait for an accepted press. With a timeout, returns `false` once it
    /// elapses. Returns `false` immediately if the latch was never armed.
    pub async fn wait_for_press(&self, timeout: Option<Duration>) -> bool {
        if !self.is_armed() {
            return false;
        }
        match timeout {
            None => {
                self.permit.wait().await;
                true
            }
            Some(limit) => {
                future::or(
                    async {
                        self.permit.wait().await;
                        true
                    },
                    async {
                        async_io_mini::Timer::after(limit).await;
                        false
                    },
                )
                .await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakePin {
        edge: Option<Edge>,
        fail: bool,
    }

    impl EdgeInput for FakePin {
        fn init(&mut self, edge: Edge) -> Result<(), DriverError> {
            if self.fail {
                return Err(DriverError::Gpio(-1));
            }
            self.edge = Some(edge);
            Ok(())
        }
    }

    fn armed_latch() -> DebouncedLatch {
        let latch = DebouncedLatch::new(DEFAULT_DEBOUNCE_MS);
        let mut pin = FakePin { edge: None, fail: false };
        latch.init(&mut pin).unwrap();
        assert_eq!(pin.edge, Some(Edge::Falling));
        latch
    }

    #[test]
    fn first_edge_is_accepted_even_at_tick_zero() {
        let latch = armed_latch();
        assert!(latch.on_edge(0));
        assert!(latch.try_take());
    }

    #[test]
    fn bounce_inside_window_collapses() {
        let latch = armed_latch();
        assert!(latch.on_edge(1_000));
        assert!(!latch.on_edge(1_050));
        assert!(!latch.on_edge(1_200));
        assert!(latch.try_take());
        assert!(!latch.try_take());
    }

    #[test]
    fn edges_beyond_window_count_separately() {
        let latch = armed_latch();
        assert!(latch.on_edge(1_000));
        assert!(latch.try_take());
        assert!(latch.on_edge(1_250));
        assert!(latch.try_take());
    }

    #[test]
    fn unconsumed_releases_collapse_to_one_permit() {
        let latch = armed_latch();
        assert!(latch.on_edge(1_000));
        assert!(latch.on_edge(2_000));
        assert!(latch.try_take());
        assert!(!latch.try_take());
    }

    #[test]
    fn tick_wraparound_is_handled() {
        let latch = armed_latch();
        assert!(latch.on_edge(u32::MAX - 50));
        assert!(!latch.on_edge(20));
        assert!(latch.on_edge(300));
    }

    #[test]
    fn failed_init_leaves_latch_disarmed() {
        let latch = DebouncedLatch::default();
        let mut pin = FakePin { edge: None, fail: true };
        assert_eq!(latch.init(&mut pin), Err(DriverError::Gpio(-1)));
        assert!(!latch.is_armed());
        assert!(!futures_lite::future::block_on(latch.wait_for_press(None)));
    }

    #[test]
    fn wait_returns_pending_press() {
        let latch = armed_latch();
        latch.on_edge(10);
        let pressed = futures_lite::future::block_on(
            latch.wait_for_press(Some(Duration::from_millis(500))),
        );
        assert!(pressed);
    }

    #[test]
    fn wait_times_out_without_press() {
        let latch = armed_latch();
        let started = std::time::Instant::now();
        let pressed = futures_lite::future::block_on(
            latch.wait_for_press(Some(Duration::from_millis(30))),
        );
        assert!(!pressed);
        assert!(started.elapsed() >= Duration::from_millis(30));
    }
}
