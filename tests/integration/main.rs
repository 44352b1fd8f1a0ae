//! Host integration tests for the node.
//!
//! Each module drives one subsystem (bus protocol, alarm loop, button
//! latch, sampling levels) against the recording mocks in `mock_hw`.

mod alarm_tests;
mod bus_tests;
mod button_tests;
mod mock_hw;
mod sampling_tests;
