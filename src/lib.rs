//! HomeNode firmware library.
//!
//! Exposes the node logic for integration testing: register map, bus
//! protocol engine, debounced button latch, samplers, alarm loop and the
//! periodic scheduler with its time driver. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod bus;
pub mod config;
pub mod control;
pub mod drivers;
pub mod error;
pub mod pins;
pub mod registers;
pub mod scheduler;
pub mod sensors;
pub mod time_driver;
