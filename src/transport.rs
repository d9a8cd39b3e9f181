//! Transport abstraction.
//!
//! [`Light`](crate::Light) talks to the lamp only through this trait, so the
//! protocol and correlation logic can run over btleplug
//! ([`BleTransport`](crate::ble::BleTransport)) or a test double.

use async_trait::async_trait;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::ble::characteristics::NotificationEvent;
use crate::ble::connection::ConnectionState;
use crate::error::Result;

/// GATT operations required from the underlying BLE stack.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Write to a characteristic.
    ///
    /// Returns [`Error::CharacteristicNotFound`](crate::Error::CharacteristicNotFound)
    /// when the characteristic is absent.
    async fn write(&self, uuid: &Uuid, data: &[u8]) -> Result<()>;

    /// Read a characteristic value.
    async fn read(&self, uuid: &Uuid) -> Result<Vec<u8>>;

    /// Get a receiver for notification events.
    fn subscribe_notifications(&self) -> broadcast::Receiver<NotificationEvent>;

    /// Get the current connection state.
    fn connection_state(&self) -> ConnectionState;

    /// Disconnect from the device.
    async fn disconnect(&self) -> Result<()>;
}
