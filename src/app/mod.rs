//! Application core — pure domain logic, zero I/O.
//!
//! This module contains the business rules for the location/messaging
//! application: FSM orchestration, capability gating, position tracking,
//! and message dispatch.  All interaction with the platform happens
//! through **port traits** defined in [`ports`], keeping this layer
//! fully testable without a real device.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
