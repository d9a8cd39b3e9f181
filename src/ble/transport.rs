//! btleplug-backed transport.

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::info;
use uuid::Uuid;

use crate::ble::characteristics::{CharacteristicHandler, NotificationEvent};
use crate::ble::connection::{ConnectionManager, ConnectionState};
use crate::ble::scanner::{parse_address, BleScanner};
use crate::config::LightConfig;
use crate::error::Result;
use crate::transport::Transport;

/// A live BLE connection to one lamp.
pub struct BleTransport {
    connection: ConnectionManager,
    characteristics: CharacteristicHandler,
}

impl BleTransport {
    /// Locate the lamp at `address`, connect, and start notifications.
    pub async fn connect(address: &str, config: &LightConfig) -> Result<Self> {
        let address = parse_address(address)?;

        let scanner = BleScanner::new().await?;
        let peripheral = scanner.locate(address, config.connect_timeout).await?;

        let connection = ConnectionManager::new(peripheral);
        connection.connect().await?;

        let characteristics = CharacteristicHandler::new(
            connection.peripheral().clone(),
            config.write_with_response,
            config.notification_buffer,
        );

        let setup = async {
            characteristics.discover_characteristics().await?;
            let subscribed = characteristics.subscribe_all().await?;
            characteristics.start_notifications().await?;
            Ok::<_, crate::Error>(subscribed)
        };

        match setup.await {
            Ok(subscribed) => {
                info!(
                    "Light {} ready ({} notify characteristics)",
                    address, subscribed
                );
                Ok(Self {
                    connection,
                    characteristics,
                })
            }
            Err(e) => {
                let _ = connection.disconnect().await;
                Err(e)
            }
        }
    }
}

#[async_trait]
impl Transport for BleTransport {
    async fn write(&self, uuid: &Uuid, data: &[u8]) -> Result<()> {
        self.characteristics.write(uuid, data).await
    }

    async fn read(&self, uuid: &Uuid) -> Result<Vec<u8>> {
        self.characteristics.read(uuid).await
    }

    fn subscribe_notifications(&self) -> broadcast::Receiver<NotificationEvent> {
        self.characteristics.subscribe_notifications()
    }

    fn connection_state(&self) -> ConnectionState {
        self.connection.state()
    }

    async fn disconnect(&self) -> Result<()> {
        self.characteristics.stop_notifications().await;
        self.connection.disconnect().await
    }
}
