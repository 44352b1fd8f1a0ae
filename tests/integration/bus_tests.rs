//! Host-side register protocol: bus engine + notifier + dispatcher.

use homenode::app::ports::Switch;
use homenode::bus::{BusEvent, BusSlave, ChangeNotifier};
use homenode::registers::{Register, RegisterStore};

use crate::mock_hw::{RecordingObserver, leaked_node};

fn leaked_bus() -> (&'static RegisterStore, &'static ChangeNotifier) {
    (
        Box::leak(Box::new(RegisterStore::new())),
        Box::leak(Box::new(ChangeNotifier::new())),
    )
}

#[test]
fn multi_byte_write_notifies_in_order() {
    let (regs, notifier) = leaked_bus();
    let observer = RecordingObserver::leaked();
    notifier.register(observer);

    let mut bus = BusSlave::new(regs, notifier);
    bus.on_receive(&[0x01, 0x0A, 0x0B, 0x0C]);

    assert_eq!(observer.calls(), vec![(0x01, 0x0A), (0x02, 0x0B), (0x03, 0x0C)]);
    assert_eq!(bus.pointer(), 0x04);
}

#[test]
fn store_is_updated_before_observer_runs() {
    use homenode::bus::ChangeObserver;

    struct Checker(&'static RegisterStore);
    impl ChangeObserver for Checker {
        fn on_change(&self, reg: u8, value: u8) {
            assert_eq!(self.0.get(reg), value);
        }
    }

    let (regs, notifier) = leaked_bus();
    notifier.register(Box::leak(Box::new(Checker(regs))));
    BusSlave::new(regs, notifier).on_receive(&[0x12, 0x99, 0x98]);
    assert_eq!(regs.get(0x13), 0x98);
}

#[test]
fn dropped_bytes_are_not_notified() {
    let (regs, notifier) = leaked_bus();
    let observer = RecordingObserver::leaked();
    notifier.register(observer);

    let mut bus = BusSlave::new(regs, notifier);
    bus.on_receive(&[31, 1, 2, 3]);

    assert_eq!(observer.calls(), vec![(31, 1)]);
    assert_eq!(bus.pointer(), 32);
}

#[test]
fn host_buzzer_command_drives_output_immediately() {
    let node = leaked_node();
    node.bind_commands();

    let mut bus = BusSlave::new(node.registers, node.notifier);
    bus.on_receive(&[Register::BuzzerCmd.offset(), 1, 1]);

    assert!(node.buzzer.is_on());
    assert!(node.led.is_on());
    assert!(node.registers.flag(Register::BuzzerCmd));
    assert!(node.registers.flag(Register::LedCmd));
}

#[test]
fn host_alarm_write_is_stored_once_and_not_rewritten() {
    let node = leaked_node();
    node.bind_commands();

    let mut bus = BusSlave::new(node.registers, node.notifier);
    bus.on_receive(&[Register::AlarmState.offset(), 1]);

    assert!(node.registers.flag(Register::AlarmState));
    assert!(node.buzzer.history().is_empty());
    assert!(node.led.history().is_empty());
}

#[test]
fn read_transaction_streams_from_pointer() {
    let (regs, notifier) = leaked_bus();
    regs.write(Register::RfidStatus, 1);
    regs.write_block(Register::RfidId0, b"0F00A1");

    let mut bus = BusSlave::new(regs, notifier);
    bus.on_receive(&[Register::RfidStatus.offset()]);
    let read: Vec<u8> = (0..7).map(|_| bus.on_request()).collect();
    assert_eq!(read, b"\x010F00A1");
}

#[test]
fn pointer_persists_across_transactions() {
    let (regs, notifier) = leaked_bus();
    let mut bus = BusSlave::new(regs, notifier);

    bus.on_receive(&[0x14, 0xAA]);
    bus.handle(BusEvent::Start { read: true });
    assert_eq!(bus.handle(BusEvent::Requested), Some(0));
    bus.handle(BusEvent::Stop);
    assert_eq!(bus.pointer(), 0x16);

    // Re-address and read back.
    bus.on_receive(&[0x14]);
    assert_eq!(bus.on_request(), 0xAA);
}

#[test]
fn composite_read_may_straddle_an_update() {
    let (regs, notifier) = leaked_bus();
    regs.write_u16(Register::DistanceH, 0x01FF);

    let mut bus = BusSlave::new(regs, notifier);
    bus.on_receive(&[Register::DistanceH.offset()]);
    let high = bus.on_request();
    // Sampler publishes between the two byte events.
    regs.write_u16(Register::DistanceH, 0x0200);
    let low = bus.on_request();

    assert_eq!(u16::from_be_bytes([high, low]), 0x0100);
    assert_eq!(regs.read_u16(Register::DistanceH), 0x0200);
}
