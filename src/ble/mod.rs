//! BLE communication module.
//!
//! This module provides the btleplug plumbing for locating, connecting to,
//! and exchanging data with a Yeelight Blue lamp.

pub mod characteristics;
pub mod connection;
pub mod scanner;
pub mod transport;
pub mod uuids;

pub use characteristics::{CharacteristicHandler, NotificationEvent};
pub use connection::{ConnectionEvent, ConnectionManager, ConnectionState};
pub use scanner::{parse_address, BleScanner};
pub use transport::BleTransport;
pub use uuids::*;
