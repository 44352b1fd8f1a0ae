//! Periodic task bodies and their placement on priority levels.
//!
//! | Level    | Tasks                 | Period          |
//! |----------|-----------------------|-----------------|
//! | control  | alarm loop, button    | 50 ms, on press |
//! | tag      | tag sampler           | 100 ms (+2 s hold after a read) |
//! | sampling | distance, angle       | 200 ms each     |

use core::time::Duration;
use std::io;
use std::thread::JoinHandle;

use log::warn;

use super::Node;
use super::ports::{AngleSensor, RangeSensor, Switch, TagReader};
use crate::config::NodeConfig;
use crate::control::{AlarmController, Arming};
use crate::registers::RegisterStore;
use crate::scheduler::{PeriodicTimer, TaskLevel, spawn_level};
use crate::sensors::rfid::{TagOutcome, TagSampler};
use crate::sensors::rotary::AngleSampler;
use crate::sensors::ultrasonic::DistanceSampler;

/// How long the button task sleeps between checks while its latch is not
/// armed.
const UNARMED_RECHECK: Duration = Duration::from_secs(1);

// ── Task bodies ───────────────────────────────────────────────

pub async fn distance_task<R: RangeSensor>(
    mut sampler: DistanceSampler<R>,
    regs: &'static RegisterStore,
    period: Duration,
) {
    let mut timer = PeriodicTimer::new("distance", period);
    loop {
        sampler.sample(regs);
        timer.next().await;
    }
}

pub async fn angle_task<A: AngleSensor>(
    mut sampler: AngleSampler<A>,
    regs: &'static RegisterStore,
    period: Duration,
) {
    let mut timer = PeriodicTimer::new("angle", period);
    loop {
        sampler.sample(regs);
        timer.next().await;
    }
}

pub async fn tag_task<T: TagReader>(
    mut sampler: TagSampler<T>,
    regs: &'static RegisterStore,
    period: Duration,
    hold: Duration,
) {
    let mut timer = PeriodicTimer::new("tag", period);
    loop {
        if let TagOutcome::Present(_) = sampler.sample(regs) {
            timer.postpone(hold);
        }
        timer.next().await;
    }
}

pub async fn alarm_task<B: Switch + 'static, L: Switch + 'static>(node: Node<B, L>, period: Duration) {
    let mut controller = AlarmController::new(node.buzzer, node.led, node.beep);
    let mut timer = PeriodicTimer::new("alarm", period);
    loop {
        controller.step(node.registers);
        timer.next().await;
    }
}

pub async fn button_task<B: Switch + 'static, L: Switch + 'static>(node: Node<B, L>, beep: Duration) {
    let arming = Arming::new(node.buzzer, node.beep);
    let mut warned = false;
    loop {
        if node.button.wait_for_press(None).await {
            arming.press(node.registers);
            async_io_mini::Timer::after(beep).await;
            arming.release(node.registers);
        } else {
            if !warned {
                warn!("button: latch not armed, presses ignored");
                warned = true;
            }
            async_io_mini::Timer::after(UNARMED_RECHECK).await;
        }
    }
}

// ── Level placement ───────────────────────────────────────────

pub fn spawn_control<B: Switch + 'static, L: Switch + 'static>(
    node: Node<B, L>,
    config: &NodeConfig,
) -> io::Result<JoinHandle<()>> {
    let (period, beep) = (config.control_period(), config.beep());
    let level = TaskLevel {
        name: "control\0",
        priority: config.control_priority,
        stack_kb: 6,
    };
    spawn_level(level, move |ex| {
        ex.spawn(alarm_task(node, period)).detach();
        ex.spawn(button_task(node, beep)).detach();
    })
}

pub fn spawn_tag<T: TagReader + Send + 'static>(
    sampler: TagSampler<T>,
    regs: &'static RegisterStore,
    config: &NodeConfig,
) -> io::Result<JoinHandle<()>> {
    let (period, hold) = (config.tag_period(), config.tag_hold());
    let level = TaskLevel {
        name: "tag\0",
        priority: config.tag_priority,
        stack_kb: 6,
    };
    spawn_level(level, move |ex| {
        ex.spawn(tag_task(sampler, regs, period, hold)).detach();
    })
}

pub fn spawn_sampling<R, A>(
    distance: DistanceSampler<R>,
    angle: AngleSampler<A>,
    regs: &'static RegisterStore,
    config: &NodeConfig,
) -> io::Result<JoinHandle<()>>
where
    R: RangeSensor + Send + 'static,
    A: AngleSensor + Send + 'static,
{
    let (distance_period, angle_period) = (config.distance_period(), config.angle_period());
    let level = TaskLevel {
        name: "sampling\0",
        priority: config.sampling_priority,
        stack_kb: 6,
    };
    spawn_level(level, move |ex| {
        ex.spawn(distance_task(distance, regs, distance_period)).detach();
        ex.spawn(angle_task(angle, regs, angle_period)).detach();
    })
}
