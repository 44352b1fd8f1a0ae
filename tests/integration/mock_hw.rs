//! Mock collaborators for integration tests.
//!
//! Switches record every level they are driven to; the observer records
//! every notification, so tests can assert on full histories without real
//! GPIO or I2C hardware.

use std::collections::VecDeque;
use std::sync::Mutex;

use homenode::app::Node;
use homenode::app::ports::{AngleSensor, Edge, EdgeInput, RangeSensor, Switch, TagReader};
use homenode::bus::{ChangeNotifier, ChangeObserver};
use homenode::control::BeepGate;
use homenode::drivers::button::DebouncedLatch;
use homenode::error::DriverError;
use homenode::registers::RegisterStore;

// ── Switch ────────────────────────────────────────────────────

#[derive(Default)]
pub struct MockSwitch {
    pub levels: Mutex<Vec<bool>>,
}

#[allow(dead_code)]
impl MockSwitch {
    pub fn history(&self) -> Vec<bool> {
        self.levels.lock().unwrap().clone()
    }
}

impl Switch for MockSwitch {
    fn set(&self, on: bool) {
        self.levels.lock().unwrap().push(on);
    }

    fn is_on(&self) -> bool {
        self.levels.lock().unwrap().last().copied().unwrap_or(false)
    }
}

// ── Observer ──────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingObserver {
    pub seen: Mutex<Vec<(u8, u8)>>,
}

#[allow(dead_code)]
impl RecordingObserver {
    pub fn leaked() -> &'static Self {
        Box::leak(Box::default())
    }

    pub fn calls(&self) -> Vec<(u8, u8)> {
        self.seen.lock().unwrap().clone()
    }
}

impl ChangeObserver for RecordingObserver {
    fn on_change(&self, reg: u8, value: u8) {
        self.seen.lock().unwrap().push((reg, value));
    }
}

// ── Sensors ───────────────────────────────────────────────────

/// Ranger replaying a script, then timing out.
#[allow(dead_code)]
pub struct ScriptedRanger(pub VecDeque<Result<u32, DriverError>>);

impl RangeSensor for ScriptedRanger {
    fn measure_mm(&mut self) -> Result<u32, DriverError> {
        self.0.pop_front().unwrap_or(Err(DriverError::Timeout))
    }
}

#[allow(dead_code)]
pub struct FixedAngle(pub u16);

impl AngleSensor for FixedAngle {
    fn read_raw(&mut self) -> Result<u16, DriverError> {
        Ok(self.0)
    }
}

/// Tag reader that delivers queued frames one per poll.
#[derive(Default)]
#[allow(dead_code)]
pub struct QueuedTags(pub VecDeque<Vec<u8>>);

impl TagReader for QueuedTags {
    fn data_available(&mut self) -> bool {
        !self.0.is_empty()
    }

    fn read_data(&mut self, buf: &mut [u8]) -> usize {
        let frame = self.0.pop_front().unwrap_or_default();
        let n = frame.len().min(buf.len());
        buf[..n].copy_from_slice(&frame[..n]);
        n
    }
}

#[derive(Default)]
pub struct MockEdgePin {
    pub configured: Option<Edge>,
}

impl EdgeInput for MockEdgePin {
    fn init(&mut self, edge: Edge) -> Result<(), DriverError> {
        self.configured = Some(edge);
        Ok(())
    }
}

// ── Node fixture ──────────────────────────────────────────────

/// A node with leaked state and mock outputs; the button latch is armed.
#[allow(dead_code)]
pub fn leaked_node() -> Node<MockSwitch, MockSwitch> {
    let button: &'static DebouncedLatch = Box::leak(Box::default());
    button.init(&mut MockEdgePin::default()).unwrap();
    Node {
        registers: Box::leak(Box::new(RegisterStore::new())),
        notifier: Box::leak(Box::new(ChangeNotifier::new())),
        button,
        beep: Box::leak(Box::new(BeepGate::new())),
        buzzer: Box::leak(Box::default()),
        led: Box::leak(Box::default()),
    }
}
