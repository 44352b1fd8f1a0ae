//! Button latch handoff from interrupt context to the button task.

use std::thread;
use std::time::{Duration, Instant};

use homenode::app::ports::{Edge, Switch};
use homenode::app::tasks::spawn_control;
use homenode::config::NodeConfig;
use homenode::drivers::button::DebouncedLatch;
use homenode::registers::Register;

use crate::mock_hw::{MockEdgePin, leaked_node};

fn wait_until(limit: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let started = Instant::now();
    while started.elapsed() < limit {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    cond()
}

#[test]
fn init_selects_falling_edge() {
    let latch = DebouncedLatch::default();
    let mut pin = MockEdgePin::default();
    latch.init(&mut pin).unwrap();
    assert_eq!(pin.configured, Some(Edge::Falling));
    assert!(latch.is_armed());
}

#[test]
fn edge_from_another_thread_wakes_waiter() {
    let latch: &'static DebouncedLatch = Box::leak(Box::default());
    latch.init(&mut MockEdgePin::default()).unwrap();

    let isr = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        latch.on_edge(1_000);
    });
    let pressed = futures_lite::future::block_on(
        latch.wait_for_press(Some(Duration::from_secs(2))),
    );
    isr.join().unwrap();
    assert!(pressed);
}

#[test]
fn bounce_burst_is_one_press() {
    let latch = DebouncedLatch::default();
    latch.init(&mut MockEdgePin::default()).unwrap();

    let accepted = [5_000, 5_050, 5_100, 5_150]
        .into_iter()
        .filter(|&t| latch.on_edge(t))
        .count();
    assert_eq!(accepted, 1);
    assert!(latch.try_take());
    assert!(!latch.try_take());
}

#[test]
fn press_toggles_alarm_and_beeps_once() {
    let node = leaked_node();
    let config = NodeConfig::default();
    spawn_control(node, &config).unwrap();

    node.button.on_edge(10_000);
    assert!(wait_until(Duration::from_secs(2), || node.registers.flag(Register::AlarmState)));

    assert!(wait_until(Duration::from_secs(2), || node.buzzer.history().contains(&true)));

    // Beep ends and the control loop keeps the idle-motion buzzer off.
    assert!(wait_until(Duration::from_secs(2), || {
        !node.registers.flag(Register::ButtonState) && !node.buzzer.is_on()
    }));

    // Second press beyond the window disarms.
    node.button.on_edge(10_500);
    assert!(wait_until(Duration::from_secs(2), || !node.registers.flag(Register::AlarmState)));
}
