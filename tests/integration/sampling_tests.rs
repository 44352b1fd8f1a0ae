//! Sampling levels running on the scheduler against mock sensors.

use std::collections::VecDeque;
use std::thread;
use std::time::{Duration, Instant};

use homenode::app::tasks::{spawn_sampling, spawn_tag};
use homenode::config::NodeConfig;
use homenode::registers::{RFID_ID_LEN, Register, RegisterStore};
use homenode::sensors::rfid::TagSampler;
use homenode::sensors::rotary::AngleSampler;
use homenode::sensors::ultrasonic::DistanceSampler;

use crate::mock_hw::{FixedAngle, QueuedTags, ScriptedRanger};

fn fast_config() -> NodeConfig {
    NodeConfig {
        distance_period_ms: 10,
        angle_period_ms: 10,
        tag_period_ms: 10,
        tag_hold_ms: 200,
        ..NodeConfig::default()
    }
}

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
fn sampling_level_publishes_distance_and_angle() {
    let regs: &'static RegisterStore = Box::leak(Box::new(RegisterStore::new()));
    let ranger = ScriptedRanger(VecDeque::from(vec![Ok(1_500); 1_000]));
    spawn_sampling(
        DistanceSampler::new(ranger, 1_000),
        AngleSampler::new(FixedAngle(512)),
        regs,
        &fast_config(),
    )
    .unwrap();

    assert!(wait_until(Duration::from_secs(2), || {
        regs.read_u16(Register::DistanceH) == 1_500 && regs.read(Register::RotaryAngle) == 127
    }));
    assert!(!regs.flag(Register::MotionDetected));
}

#[test]
fn tag_is_published_then_cleared_after_hold() {
    let regs: &'static RegisterStore = Box::leak(Box::new(RegisterStore::new()));
    let reader = QueuedTags(VecDeque::from([b"\x020F00A1B2C3D4\x03".to_vec()]));
    spawn_tag(TagSampler::new(reader), regs, &fast_config()).unwrap();

    assert!(wait_until(Duration::from_secs(2), || regs.flag(Register::RfidStatus)));
    let mut id = [0u8; RFID_ID_LEN];
    regs.read_block(Register::RfidId0, &mut id);
    assert_eq!(&id, b"0F00A1");

    // Status holds for the hold-off, then the silent reader clears it.
    thread::sleep(Duration::from_millis(50));
    assert!(regs.flag(Register::RfidStatus));
    assert!(wait_until(Duration::from_secs(2), || !regs.flag(Register::RfidStatus)));
}
