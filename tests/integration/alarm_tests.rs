//! Alarm scenarios: samplers publishing motion, host arming over the bus,
//! and the control loop driving outputs.

use std::collections::VecDeque;
use std::thread;
use std::time::Duration;

use homenode::app::ports::Switch;
use homenode::app::tasks::spawn_control;
use homenode::bus::BusSlave;
use homenode::config::NodeConfig;
use homenode::control::{AlarmController, AlarmState};
use homenode::registers::{Register, STATUS_OK};
use homenode::sensors::ultrasonic::DistanceSampler;

use crate::mock_hw::{ScriptedRanger, leaked_node};

#[test]
fn armed_node_alarms_on_motion_within_one_tick() {
    let node = leaked_node();
    node.bind_commands();
    let mut controller = AlarmController::new(node.buzzer, node.led, node.beep);
    let mut ranger = DistanceSampler::new(ScriptedRanger(VecDeque::from([Ok(450)])), 1_000);

    BusSlave::new(node.registers, node.notifier).on_receive(&[Register::AlarmState.offset(), 1]);
    ranger.sample(node.registers);

    assert_eq!(controller.step(node.registers), AlarmState::ArmedAlarming);
    assert!(node.buzzer.is_on());
    assert!(node.led.is_on());
    assert_eq!(node.registers.read(Register::Status), STATUS_OK);
}

#[test]
fn disarm_over_bus_silences_next_tick_despite_motion() {
    let node = leaked_node();
    node.bind_commands();
    let mut controller = AlarmController::new(node.buzzer, node.led, node.beep);
    let mut bus = BusSlave::new(node.registers, node.notifier);

    node.registers.set_flag(Register::MotionDetected, true);
    bus.on_receive(&[Register::AlarmState.offset(), 1]);
    controller.step(node.registers);
    assert!(node.buzzer.is_on());

    bus.on_receive(&[Register::AlarmState.offset(), 0]);
    assert_eq!(controller.step(node.registers), AlarmState::Idle);
    assert!(!node.buzzer.is_on());
    assert!(!node.led.is_on());
}

#[test]
fn ranger_timeout_withdraws_motion_and_stops_alarm() {
    let node = leaked_node();
    let mut controller = AlarmController::new(node.buzzer, node.led, node.beep);
    let mut ranger = DistanceSampler::new(ScriptedRanger(VecDeque::from([Ok(300)])), 1_000);

    node.registers.set_flag(Register::AlarmState, true);
    ranger.sample(node.registers);
    assert_eq!(controller.step(node.registers), AlarmState::ArmedAlarming);

    // Script exhausted: the ranger now times out.
    ranger.sample(node.registers);
    assert_eq!(controller.step(node.registers), AlarmState::ArmedQuiet);
    assert!(!node.buzzer.is_on());
    assert_eq!(node.registers.read_u16(Register::DistanceH), 300);
    assert_ne!(node.registers.read(Register::ErrorCode), 0);
}

#[test]
fn host_led_override_lasts_until_next_tick() {
    let node = leaked_node();
    node.bind_commands();
    let mut controller = AlarmController::new(node.buzzer, node.led, node.beep);

    BusSlave::new(node.registers, node.notifier).on_receive(&[Register::LedCmd.offset(), 1]);
    assert!(node.led.is_on());

    controller.step(node.registers);
    assert!(!node.led.is_on());
    assert_eq!(node.led.history(), vec![true, false]);
    assert!(node.registers.flag(Register::LedCmd));
}

#[test]
fn led_command_reads_back_on_running_node() {
    let node = leaked_node();
    node.bind_commands();
    spawn_control(node, &NodeConfig::default()).unwrap();

    let mut bus = BusSlave::new(node.registers, node.notifier);
    bus.on_receive(&[Register::LedCmd.offset(), 1]);
    // Several control ticks pass.
    thread::sleep(Duration::from_millis(120));

    bus.on_receive(&[Register::LedCmd.offset()]);
    assert_eq!(bus.on_request(), 1);
}
