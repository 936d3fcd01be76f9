//! Application core — pure domain logic, zero I/O.
//!
//! This module contains the command vocabulary, routing, connection
//! tracking and the control-loop service for the dock station.  All
//! interaction with pins, clocks and sockets happens through **port
//! traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod commands;
pub mod connection;
pub mod events;
pub mod ports;
pub mod router;
pub mod service;
