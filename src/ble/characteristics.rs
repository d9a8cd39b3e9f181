//! GATT characteristic handling.
//!
//! Provides functionality for reading, writing, and subscribing to
//! the characteristics of the Yeelight Blue light service.

use btleplug::api::{Characteristic, CharPropFlags, Peripheral as _, WriteType};
use btleplug::platform::Peripheral;
use chrono::{DateTime, Utc};
use futures::stream::StreamExt;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error, trace};
use uuid::Uuid;

use crate::ble::uuids::*;
use crate::error::{Error, Result};

/// Notification event from a characteristic.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NotificationEvent {
    /// UUID of the characteristic that sent the notification.
    pub characteristic_uuid: Uuid,
    /// The notification data.
    pub data: Vec<u8>,
    /// When the notification was received.
    pub received_at: DateTime<Utc>,
}

impl NotificationEvent {
    /// Create an event stamped with the current time.
    pub fn new(characteristic_uuid: Uuid, data: Vec<u8>) -> Self {
        Self {
            characteristic_uuid,
            data,
            received_at: Utc::now(),
        }
    }

    /// The payload as text, with padding commas left in place.
    pub fn data_lossy(&self) -> String {
        String::from_utf8_lossy(&self.data).into_owned()
    }
}

/// Handler for the light service's GATT characteristics.
pub struct CharacteristicHandler {
    /// The peripheral to communicate with.
    peripheral: Peripheral,
    /// Cached characteristics by UUID.
    characteristics: Arc<RwLock<HashMap<Uuid, Characteristic>>>,
    /// Channel for notification events.
    notification_tx: broadcast::Sender<NotificationEvent>,
    /// Write type used for all writes.
    write_type: WriteType,
    /// Whether we're currently listening for notifications.
    is_listening: Arc<RwLock<bool>>,
    /// Handle to the notification listener task.
    listener_handle: Arc<RwLock<Option<tokio::task::JoinHandle<()>>>>,
}

impl CharacteristicHandler {
    /// Create a new characteristic handler for a peripheral.
    ///
    /// Note: Services must be discovered before using this handler.
    pub fn new(peripheral: Peripheral, write_with_response: bool, buffer: usize) -> Self {
        let (notification_tx, _) = broadcast::channel(buffer.max(1));

        Self {
            peripheral,
            characteristics: Arc::new(RwLock::new(HashMap::new())),
            notification_tx,
            write_type: if write_with_response {
                WriteType::WithResponse
            } else {
                WriteType::WithoutResponse
            },
            is_listening: Arc::new(RwLock::new(false)),
            listener_handle: Arc::new(RwLock::new(None)),
        }
    }

    /// Discover and cache the light service's characteristics.
    ///
    /// This should be called after connecting and discovering services.
    pub async fn discover_characteristics(&self) -> Result<()> {
        let service = self
            .peripheral
            .services()
            .into_iter()
            .find(|s| s.uuid == LIGHT_SERVICE_UUID)
            .ok_or_else(|| Error::ServiceNotFound {
                uuid: LIGHT_SERVICE_UUID.to_string(),
            })?;

        let mut chars = self.characteristics.write();
        chars.clear();

        for characteristic in service.characteristics {
            debug!(
                "Found characteristic: {} ({})",
                characteristic.uuid,
                characteristic_name(&characteristic.uuid).unwrap_or("unknown")
            );
            chars.insert(characteristic.uuid, characteristic);
        }

        debug!("Discovered {} characteristics", chars.len());

        Ok(())
    }

    /// Get a characteristic by UUID.
    pub fn get_characteristic(&self, uuid: &Uuid) -> Option<Characteristic> {
        self.characteristics.read().get(uuid).cloned()
    }

    fn require(&self, uuid: &Uuid) -> Result<Characteristic> {
        self.get_characteristic(uuid)
            .ok_or_else(|| Error::CharacteristicNotFound {
                uuid: uuid.to_string(),
            })
    }

    /// Read a characteristic value.
    pub async fn read(&self, uuid: &Uuid) -> Result<Vec<u8>> {
        let characteristic = self.require(uuid)?;

        let data = self
            .peripheral
            .read(&characteristic)
            .await
            .map_err(Error::Bluetooth)?;

        trace!("Read {} bytes from characteristic {}", data.len(), uuid);

        Ok(data)
    }

    /// Write to a characteristic.
    pub async fn write(&self, uuid: &Uuid, data: &[u8]) -> Result<()> {
        let characteristic = self.require(uuid)?;

        self.peripheral
            .write(&characteristic, data, self.write_type)
            .await
            .map_err(Error::Bluetooth)?;

        trace!("Wrote {} bytes to characteristic {}", data.len(), uuid);

        Ok(())
    }

    /// Subscribe to notifications from a characteristic.
    pub async fn subscribe(&self, uuid: &Uuid) -> Result<()> {
        let characteristic = self.require(uuid)?;

        debug!(
            "Subscribing to {}, properties: {:?}",
            uuid, characteristic.properties
        );

        self.peripheral
            .subscribe(&characteristic)
            .await
            .map_err(Error::Bluetooth)?;

        Ok(())
    }

    /// Subscribe to every notify characteristic the light exposes.
    ///
    /// Returns the number of characteristics subscribed.
    pub async fn subscribe_all(&self) -> Result<usize> {
        let mut count = 0;

        for uuid in NOTIFY_CHARACTERISTICS {
            let notifiable = self
                .get_characteristic(&uuid)
                .map(|c| c.properties.contains(CharPropFlags::NOTIFY))
                .unwrap_or(false);

            if notifiable {
                self.subscribe(&uuid).await?;
                count += 1;
            } else {
                debug!("Skipping notifications for {}: not available", uuid);
            }
        }

        Ok(count)
    }

    /// Start listening for notifications.
    ///
    /// Notifications will be sent through the channel returned by `subscribe_notifications()`.
    pub async fn start_notifications(&self) -> Result<()> {
        if *self.is_listening.read() {
            return Ok(());
        }

        *self.is_listening.write() = true;

        let peripheral = self.peripheral.clone();
        let is_listening = self.is_listening.clone();
        let notification_tx = self.notification_tx.clone();

        let handle = tokio::spawn(async move {
            let mut notifications = match peripheral.notifications().await {
                Ok(n) => n,
                Err(e) => {
                    error!("Failed to get notifications stream: {}", e);
                    return;
                }
            };

            while *is_listening.read() {
                tokio::select! {
                    Some(notification) = notifications.next() => {
                        debug!(
                            "Notification from {}: {:?}",
                            characteristic_name(&notification.uuid).unwrap_or("unknown"),
                            String::from_utf8_lossy(&notification.value)
                        );

                        let _ = notification_tx.send(NotificationEvent::new(
                            notification.uuid,
                            notification.value,
                        ));
                    }
                    _ = tokio::time::sleep(std::time::Duration::from_millis(50)) => {
                        if !*is_listening.read() {
                            break;
                        }
                    }
                }
            }

            debug!("Notification listener stopped");
        });

        *self.listener_handle.write() = Some(handle);

        Ok(())
    }

    /// Stop listening for notifications.
    pub async fn stop_notifications(&self) {
        *self.is_listening.write() = false;

        let handle = self.listener_handle.write().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }

    /// Get a receiver for notification events.
    pub fn subscribe_notifications(&self) -> broadcast::Receiver<NotificationEvent> {
        self.notification_tx.subscribe()
    }
}

impl Drop for CharacteristicHandler {
    fn drop(&mut self) {
        *self.is_listening.write() = false;
    }
}
