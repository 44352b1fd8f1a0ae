//! Fuzz target: `BusSlave::handle`
//!
//! Decodes the input into a stream of bus events and checks that the
//! engine never panics and that the pointer only moves the way the
//! protocol allows.
//!
//! cargo fuzz run fuzz_bus_slave

#![no_main]

use homenode::bus::{BusEvent, BusSlave, BusState, ChangeNotifier};
use homenode::registers::{REGISTER_COUNT, RegisterStore};
use libfuzzer_sys::fuzz_target;

const MAP: u8 = REGISTER_COUNT as u8;

fn decode(data: &[u8]) -> impl Iterator<Item = BusEvent> + '_ {
    let mut bytes = data.iter().copied();
    core::iter::from_fn(move || {
        let tag = bytes.next()?;
        Some(match tag % 5 {
            0 => BusEvent::Start { read: false },
            1 => BusEvent::Start { read: true },
            2 => BusEvent::Received(bytes.next().unwrap_or(0)),
            3 => BusEvent::Requested,
            _ => BusEvent::Stop,
        })
    })
}

fuzz_target!(|data: &[u8]| {
    let regs = RegisterStore::new();
    let notifier = ChangeNotifier::new();
    let mut bus = BusSlave::new(&regs, &notifier);

    for event in decode(data) {
        let before = bus.pointer();
        let receiving = bus.state() == BusState::ReceivingData;
        let reply = bus.handle(event);
        let after = bus.pointer();

        match event {
            BusEvent::Requested => {
                let byte = reply.unwrap_or(0);
                if before < MAP {
                    assert_eq!(after, before + 1);
                    assert_eq!(byte, regs.get(before));
                } else {
                    assert_eq!(after, before);
                    assert_eq!(byte, 0);
                }
            }
            BusEvent::Received(byte) if receiving => {
                if before < MAP {
                    assert_eq!(after, before + 1);
                    assert_eq!(regs.get(before), byte);
                } else {
                    assert_eq!(after, before);
                }
            }
            BusEvent::Received(byte) => assert_eq!(after, byte),
            BusEvent::Start { .. } | BusEvent::Stop => assert_eq!(after, before),
        }
    }

    assert!(regs.snapshot().len() == REGISTER_COUNT);
});
