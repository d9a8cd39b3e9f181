//! Light struct and methods.
//!
//! Represents one connected Yeelight Blue lamp.

use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::ble::characteristics::NotificationEvent;
use crate::ble::connection::ConnectionState;
use crate::ble::transport::BleTransport;
use crate::ble::uuids::*;
use crate::config::LightConfig;
use crate::correlator::NotificationCorrelator;
use crate::data::{encode_flow, Color, FlowStep};
use crate::error::{Error, Result};
use crate::protocol::{
    encode_control, encode_delay, encode_effect_mode, encode_flow_control, encode_query_token,
    Command, ControlStatus, DelayStatus, EffectMode, EncodedPayload, FlowControl, QueryToken,
};
use crate::transport::Transport;

/// Delay used by the lamp's own app when none is given.
pub const DEFAULT_DELAY_MINUTES: u16 = 5;

/// A Yeelight Blue lamp.
///
/// Commands are plain writes. Status queries write a token and wait for the
/// lamp's notification; only one query can be outstanding at a time.
pub struct Light<T: Transport = BleTransport> {
    /// The transport to the lamp.
    transport: Arc<T>,
    /// Pending query registry.
    correlator: NotificationCorrelator,
    /// Task feeding notifications into the correlator.
    pump: JoinHandle<()>,
    /// Serializes multi-write sequences (color flows).
    sequence_lock: Mutex<()>,
    /// Configuration.
    config: LightConfig,
}

impl Light<BleTransport> {
    /// Connect to the lamp at `address` with the default configuration.
    pub async fn connect(address: &str) -> Result<Self> {
        Self::connect_with_config(address, LightConfig::default()).await
    }

    /// Connect to the lamp at `address`.
    pub async fn connect_with_config(address: &str, config: LightConfig) -> Result<Self> {
        info!("Connecting to light {}", address);

        let transport = BleTransport::connect(address, &config).await?;
        Ok(Self::with_transport(transport, config))
    }
}

impl<T: Transport + 'static> Light<T> {
    /// Wrap an already connected transport.
    ///
    /// Spawns the task that feeds notifications to pending queries.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    pub fn with_transport(transport: T, config: LightConfig) -> Self {
        let correlator = NotificationCorrelator::new();
        let pump = correlator.attach(transport.subscribe_notifications());

        Self {
            transport: Arc::new(transport),
            correlator,
            pump,
            sequence_lock: Mutex::new(()),
            config,
        }
    }

    /// Get the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Get the configuration.
    pub fn config(&self) -> &LightConfig {
        &self.config
    }

    // === Connection ===

    /// Get the current connection state.
    pub fn connection_state(&self) -> ConnectionState {
        self.transport.connection_state()
    }

    /// Disconnect from the lamp.
    pub async fn disconnect(&self) -> Result<()> {
        info!("Disconnecting from light");
        self.transport.disconnect().await
    }

    /// Subscribe to every notification the lamp sends.
    pub fn subscribe_notifications(&self) -> broadcast::Receiver<NotificationEvent> {
        self.transport.subscribe_notifications()
    }

    /// Check if a status query is waiting for its answer.
    pub fn is_query_pending(&self) -> bool {
        self.correlator.is_pending()
    }

    // === Power & Color ===

    /// Turn on in white at `brightness` percent.
    pub async fn turn_on(&self, brightness: u8) -> Result<()> {
        self.set_color(Color::WHITE, brightness).await
    }

    /// Turn off.
    pub async fn turn_off(&self) -> Result<()> {
        self.set_color(Color::BLACK, 0).await
    }

    /// Set color and brightness.
    pub async fn set_color(&self, color: Color, brightness: u8) -> Result<()> {
        let (red, green, blue) = color.channels();
        self.control(red, green, blue, brightness.into()).await
    }

    /// Set raw color channels (0-255) and brightness (0-100).
    pub async fn control(&self, red: u16, green: u16, blue: u16, brightness: u16) -> Result<()> {
        let payload = encode_control(red, green, blue, brightness)?;
        self.ensure_connected()?;
        self.write_payload(&CONTROL_UUID, &payload).await
    }

    // === Delay ===

    /// Turn on after `minutes` (1-1439).
    pub async fn delay_on(&self, minutes: u16) -> Result<()> {
        let payload = encode_delay(minutes, true)?;
        self.ensure_connected()?;
        self.write_payload(&DELAY_UUID, &payload).await
    }

    /// Turn off after `minutes` (1-1439).
    pub async fn delay_off(&self, minutes: u16) -> Result<()> {
        let payload = encode_delay(minutes, false)?;
        self.ensure_connected()?;
        self.write_payload(&DELAY_UUID, &payload).await
    }

    // === Status Queries ===

    /// Query the delay timer.
    ///
    /// Returns the raw notification, or `None` if the lamp did not answer
    /// within the query timeout.
    pub async fn delay_status(&self) -> Result<Option<NotificationEvent>> {
        self.query(QueryToken::DelayStatus).await
    }

    /// Query the current color and brightness.
    ///
    /// Returns the raw notification, or `None` if the lamp did not answer
    /// within the query timeout.
    pub async fn control_status(&self) -> Result<Option<NotificationEvent>> {
        self.query(QueryToken::ControlStatus).await
    }

    /// Query and parse the delay timer.
    pub async fn delay_status_parsed(&self) -> Result<Option<DelayStatus>> {
        match self.query(QueryToken::DelayStatus).await? {
            Some(event) => {
                Self::check_answer(&event, QueryToken::DelayStatus)?;
                DelayStatus::parse(&event.data).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Query and parse the current color and brightness.
    pub async fn control_status_parsed(&self) -> Result<Option<ControlStatus>> {
        match self.query(QueryToken::ControlStatus).await? {
            Some(event) => {
                Self::check_answer(&event, QueryToken::ControlStatus)?;
                ControlStatus::parse(&event.data).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Send a query token and wait for the next notification.
    pub async fn query(&self, token: QueryToken) -> Result<Option<NotificationEvent>> {
        self.ensure_connected()?;

        let payload = encode_query_token(token);
        info!(
            "write {} to {}",
            payload,
            characteristic_name(&token.characteristic()).unwrap_or("unknown")
        );

        self.correlator
            .query(
                self.transport.as_ref(),
                &token.characteristic(),
                &payload,
                self.config.query_timeout,
            )
            .await
    }

    // === Color Flow ===

    /// Program and start a color flow of up to nine steps.
    ///
    /// Every step is validated before anything is written; an invalid step
    /// leaves the lamp untouched.
    pub async fn start_color_flow(&self, steps: &[FlowStep]) -> Result<()> {
        let payloads = encode_flow(steps)?;
        self.ensure_connected()?;

        let _sequence = self.sequence_lock.lock().await;

        for payload in &payloads {
            self.write_payload(&COLOR_FLOW_UUID, payload).await?;
        }

        self.write_payload(&COLOR_FLOW_UUID, &encode_flow_control(FlowControl::Commit))
            .await?;

        debug!("Color flow of {} steps started", payloads.len());

        Ok(())
    }

    /// Stop a running color flow.
    pub async fn stop_color_flow(&self) -> Result<()> {
        self.ensure_connected()?;

        let _sequence = self.sequence_lock.lock().await;
        self.write_payload(&COLOR_FLOW_UUID, &encode_flow_control(FlowControl::Stop))
            .await
    }

    // === Effects ===

    /// Select the color change effect.
    pub async fn set_effect(&self, mode: EffectMode) -> Result<()> {
        self.ensure_connected()?;
        self.write_payload(&COLOR_EFFECT_UUID, &encode_effect_mode(mode))
            .await
    }

    /// Fade smoothly between colors.
    pub async fn effect_smooth(&self) -> Result<()> {
        self.set_effect(EffectMode::Smooth).await
    }

    /// Change colors immediately.
    pub async fn effect_immediate(&self) -> Result<()> {
        self.set_effect(EffectMode::Immediate).await
    }

    /// Keep the current color as the power-on default.
    pub async fn effect_current_color(&self) -> Result<()> {
        self.set_effect(EffectMode::UseCurrentColor).await
    }

    // === Raw Access ===

    /// Encode and write a single command.
    ///
    /// Query commands are written without waiting; use [`query`](Self::query)
    /// to collect the answer.
    pub async fn send(&self, command: Command) -> Result<()> {
        let payload = command.encode()?;
        self.ensure_connected()?;
        self.write_payload(&command.characteristic(), &payload).await
    }

    /// Read a characteristic value; `None` if the lamp does not expose it.
    pub async fn read_characteristic(&self, uuid: &Uuid) -> Result<Option<Vec<u8>>> {
        self.ensure_connected()?;

        debug!("read data from {}", uuid);

        match self.transport.read(uuid).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.is_characteristic_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    // === Internal ===

    fn ensure_connected(&self) -> Result<()> {
        if self.transport.connection_state().is_connected() {
            Ok(())
        } else {
            Err(Error::NotConnected)
        }
    }

    fn check_answer(event: &NotificationEvent, token: QueryToken) -> Result<()> {
        if event.characteristic_uuid == token.answer_characteristic() {
            Ok(())
        } else {
            Err(Error::InvalidData {
                context: format!(
                    "Answer to {} arrived on {}",
                    token.token(),
                    event.characteristic_uuid
                ),
            })
        }
    }

    /// Write a framed payload; a missing characteristic is skipped.
    async fn write_payload(&self, uuid: &Uuid, payload: &EncodedPayload) -> Result<()> {
        let name = characteristic_name(uuid).unwrap_or("unknown");
        info!("write {} to {}", payload, name);

        match self.transport.write(uuid, payload.as_bytes()).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_characteristic_not_found() => {
                warn!("Characteristic {} not found, write skipped", name);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

impl<T: Transport> Drop for Light<T> {
    fn drop(&mut self) {
        self.pump.abort();
    }
}

impl<T: Transport> std::fmt::Debug for Light<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Light")
            .field("connection_state", &self.transport.connection_state())
            .field("correlator", &self.correlator)
            .field("config", &self.config)
            .finish()
    }
}
