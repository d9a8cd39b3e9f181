//! Error types for the yeelight-blue-ble crate.

use thiserror::Error;

/// The main error type for this crate.
#[derive(Error, Debug)]
pub enum Error {
    /// Bluetooth-related error from the underlying BLE library.
    #[error("Bluetooth error: {0}")]
    Bluetooth(#[from] btleplug::Error),

    /// Bluetooth is not available or is disabled on this system.
    #[error("Bluetooth not available or disabled")]
    BluetoothUnavailable,

    /// The device address could not be parsed.
    #[error("Invalid device address: {address}")]
    InvalidAddress {
        /// The address string that was rejected.
        address: String,
    },

    /// No peripheral with the given address was seen in time.
    #[error("Device not found: {address}")]
    DeviceNotFound {
        /// The address that was searched for.
        address: String,
    },

    /// Operation requires a connection but the light is not connected.
    #[error("Light not connected")]
    NotConnected,

    /// Failed to establish a connection to the light.
    #[error("Connection failed: {reason}")]
    ConnectionFailed {
        /// Description of why the connection failed.
        reason: String,
    },

    /// Service not found on the device.
    #[error("Service not found: {uuid}")]
    ServiceNotFound {
        /// The UUID of the service that was not found.
        uuid: String,
    },

    /// Characteristic not found on the device.
    #[error("Characteristic not found: {uuid}")]
    CharacteristicNotFound {
        /// The UUID of the characteristic that was not found.
        uuid: String,
    },

    /// A command argument is outside the range the lamp accepts.
    #[error("Value out of range: {name} = {value} (expected {expected})")]
    OutOfRange {
        /// The name of the parameter.
        name: String,
        /// The rejected value.
        value: String,
        /// The accepted range.
        expected: String,
    },

    /// A status query is already waiting for its notification.
    ///
    /// The wire protocol carries no request identifier, so only one query
    /// per connection can be outstanding.
    #[error("Another query is already waiting for a notification")]
    QueryInProgress,

    /// Invalid data was received from the light.
    #[error("Invalid data received: {context}")]
    InvalidData {
        /// Description of what was invalid about the data.
        context: String,
    },
}

impl Error {
    /// Build an [`Error::OutOfRange`] for `name`.
    pub(crate) fn out_of_range(
        name: &str,
        value: impl std::fmt::Display,
        expected: impl std::fmt::Display,
    ) -> Self {
        Self::OutOfRange {
            name: name.to_string(),
            value: value.to_string(),
            expected: expected.to_string(),
        }
    }

    /// Whether this is a [`Error::CharacteristicNotFound`].
    pub fn is_characteristic_not_found(&self) -> bool {
        matches!(self, Self::CharacteristicNotFound { .. })
    }
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
