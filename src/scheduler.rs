//! Fixed-priority periodic task runtime.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  RTOS thread per priority level (pinned, fixed priority)     │
//! │                                                              │
//! │  ┌───────────────────────┐   ┌───────────────────────────┐   │
//! │  │ Control (prio 6)      │   │ Tag (prio 5)              │   │
//! │  │  alarm loop · button  │   │  tag sampler              │   │
//! │  └───────────────────────┘   └───────────────────────────┘   │
//! │  ┌───────────────────────┐                                   │
//! │  │ Sampling (prio 4)     │   each level: LocalExecutor,      │
//! │  │  distance · angle     │   tasks cooperate at `.await`     │
//! │  └───────────────────────┘                                   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Levels preempt each other through the RTOS; tasks inside one level only
//! yield at their periodic wait or at a button wait.
//!
//! Periodic waits are drift-free: each deadline is the previous deadline
//! plus the period, never "now plus the period". When a task overruns so
//! that the pending deadline has already passed, it runs once immediately
//! and the grid points it missed are skipped; the phase is kept and there is
//! no catch-up burst.

use core::time::Duration;
use std::time::Instant;

use log::warn;

use crate::drivers::task_pin::{self, Core};

// ═══════════════════════════════════════════════════════════════
//  Deadline arithmetic
// ═══════════════════════════════════════════════════════════════

/// Outcome of asking a [`Cadence`] for the next wake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wake {
    /// Absolute wake time; equal to `now` after an overrun.
    pub at: Instant,
    /// Grid points dropped because the task was late.
    pub skipped: u32,
}

/// Pure deadline grid: `anchor + n * period`.
#[derive(Debug, Clone)]
pub struct Cadence {
    period: Duration,
    next: Instant,
}

impl Cadence {
    /// First deadline one period after `start`.
    pub fn starting_at(start: Instant, period: Duration) -> Self {
        Self {
            period,
            next: start + period,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Pending deadline.
    pub fn deadline(&self) -> Instant {
        self.next
    }

    /// Consume the pending deadline and compute when to wake.
    pub fn next_wake(&mut self, now: Instant) -> Wake {
        if now < self.next {
            let at = self.next;
            self.next += self.period;
            return Wake { at, skipped: 0 };
        }

        let behind = now.duration_since(self.next).as_nanos();
        let period = self.period.as_nanos().max(1);
        let skipped = u32::try_from(behind / period).unwrap_or(u32::MAX);
        self.next += self.period * skipped.saturating_add(1);
        Wake { at: now, skipped }
    }

    /// Shift every later deadline by `extra`, once.
    pub fn postpone(&mut self, extra: Duration) {
        self.next += extra;
    }
}

// ═══════════════════════════════════════════════════════════════
//  Async periodic timer
// ═══════════════════════════════════════════════════════════════

pub struct PeriodicTimer {
    name: &'static str,
    cadence: Cadence,
}

impl PeriodicTimer {
    pub fn new(name: &'static str, period: Duration) -> Self {
        Self {
            name,
            cadence: Cadence::starting_at(Instant::now(), period),
        }
    }

    pub fn cadence(&self) -> &Cadence {
        &self.cadence
    }

    /// Suspend until the next deadline on the grid.
    pub async fn next(&mut self) {
        let now = Instant::now();
        let wake = self.cadence.next_wake(now);
        if wake.skipped > 0 {
            warn!(
                "sched: '{}' overran, skipped {} period(s) of {:?}",
                self.name,
                wake.skipped,
                self.cadence.period()
            );
        }
        if wake.at > now {
            async_io_mini::Timer::after(wake.at - now).await;
        }
    }

    pub fn postpone(&mut self, extra: Duration) {
        self.cadence.postpone(extra);
    }
}

// ═══════════════════════════════════════════════════════════════
//  Priority levels
// ═══════════════════════════════════════════════════════════════

/// Maximum tasks one level's executor can hold.
pub const MAX_TASKS_PER_LEVEL: usize = 4;

pub type LevelExecutor<'a> = edge_executor::LocalExecutor<'a, MAX_TASKS_PER_LEVEL>;

/// One RTOS thread hosting a cooperative executor.
#[derive(Debug, Clone, Copy)]
pub struct TaskLevel {
    /// NUL-terminated for the RTOS task name.
    pub name: &'static str,
    pub priority: u8,
    pub stack_kb: usize,
}

/// Start a priority level. `setup` runs on the new thread and spawns the
/// level's tasks onto its executor; the executor then runs forever.
pub fn spawn_level<F>(level: TaskLevel, setup: F) -> std::io::Result<std::thread::JoinHandle<()>>
where
    F: FnOnce(&LevelExecutor<'_>) + Send + 'static,
{
    task_pin::spawn_on_core(Core::App, level.priority, level.stack_kb, level.name, move || {
        let executor = LevelExecutor::new();
        setup(&executor);
        futures_lite::future::block_on(executor.run(core::future::pending::<()>()));
    })
}
