//! Request/response over the notification channel.
//!
//! The lamp answers a status query by pushing a notification, and nothing
//! in that notification says which query it answers. The correlator keeps
//! a single pending waiter: the first notification to arrive after a query
//! is registered is taken to be its answer. A second query while one is
//! pending is rejected with [`Error::QueryInProgress`].

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};
use uuid::Uuid;

use crate::ble::characteristics::NotificationEvent;
use crate::ble::uuids::characteristic_name;
use crate::error::{Error, Result};
use crate::protocol::EncodedPayload;
use crate::transport::Transport;

/// A query waiting for its notification.
struct PendingWaiter {
    id: u64,
    tx: oneshot::Sender<NotificationEvent>,
}

#[derive(Default)]
struct Shared {
    slot: Mutex<Option<PendingWaiter>>,
    next_id: AtomicU64,
}

/// Routes incoming notifications to the single outstanding query.
#[derive(Clone, Default)]
pub struct NotificationCorrelator {
    shared: Arc<Shared>,
}

/// Registration of a pending query.
///
/// Dropping the guard deregisters the waiter if it is still pending, so a
/// timed out, failed, or cancelled query never leaves a stale waiter behind.
pub struct WaiterGuard {
    shared: Arc<Shared>,
    id: u64,
    rx: Option<oneshot::Receiver<NotificationEvent>>,
}

impl WaiterGuard {
    /// Wait up to `timeout` for the notification.
    ///
    /// Returns `None` on timeout.
    pub async fn wait(mut self, timeout: Duration) -> Option<NotificationEvent> {
        let rx = self.rx.take()?;

        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(event)) => Some(event),
            _ => None,
        }
    }
}

impl Drop for WaiterGuard {
    fn drop(&mut self) {
        let mut slot = self.shared.slot.lock();
        if slot.as_ref().map(|w| w.id) == Some(self.id) {
            *slot = None;
            trace!("Waiter {} deregistered", self.id);
        }
    }
}

impl NotificationCorrelator {
    /// Create a correlator with no pending waiter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a query is waiting for a notification.
    pub fn is_pending(&self) -> bool {
        self.shared.slot.lock().is_some()
    }

    /// Register a waiter for the next notification.
    pub fn register(&self) -> Result<WaiterGuard> {
        let mut slot = self.shared.slot.lock();
        if slot.is_some() {
            return Err(Error::QueryInProgress);
        }

        let id = self.shared.next_id.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = oneshot::channel();
        *slot = Some(PendingWaiter { id, tx });
        trace!("Waiter {} registered", id);

        Ok(WaiterGuard {
            shared: self.shared.clone(),
            id,
            rx: Some(rx),
        })
    }

    /// Hand a notification to the pending waiter, if any.
    ///
    /// Returns `true` if a waiter took the event.
    pub fn dispatch(&self, event: NotificationEvent) -> bool {
        let waiter = self.shared.slot.lock().take();

        match waiter {
            Some(waiter) => {
                trace!("Notification resolves waiter {}", waiter.id);
                waiter.tx.send(event).is_ok()
            }
            None => {
                trace!(
                    "No waiter for notification from {}",
                    event.characteristic_uuid
                );
                false
            }
        }
    }

    /// Spawn a task feeding `rx` into [`dispatch`](Self::dispatch).
    ///
    /// The task ends when the channel closes.
    pub fn attach(&self, mut rx: broadcast::Receiver<NotificationEvent>) -> JoinHandle<()> {
        let correlator = self.clone();

        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => {
                        correlator.dispatch(event);
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("Notification pump lagged, {} events dropped", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }

            debug!("Notification pump stopped");
        })
    }

    /// Write `payload` to `uuid` and wait for the next notification.
    ///
    /// Returns `Ok(None)` if nothing arrives within `timeout`. A missing
    /// characteristic skips the write but still waits. Any other write
    /// failure is returned as-is.
    pub async fn query<T: Transport + ?Sized>(
        &self,
        transport: &T,
        uuid: &Uuid,
        payload: &EncodedPayload,
        timeout: Duration,
    ) -> Result<Option<NotificationEvent>> {
        let waiter = self.register()?;

        match transport.write(uuid, payload.as_bytes()).await {
            Ok(()) => {}
            Err(e) if e.is_characteristic_not_found() => {
                warn!("Characteristic {} not found, query not sent", uuid);
            }
            Err(e) => return Err(e),
        }

        let name = characteristic_name(uuid).unwrap_or("unknown");
        match waiter.wait(timeout).await {
            Some(event) => {
                debug!("Query on {} answered: {:?}", name, event.data_lossy());
                Ok(Some(event))
            }
            None => {
                warn!("Query on {} timed out after {:?}", name, timeout);
                Ok(None)
            }
        }
    }
}

impl std::fmt::Debug for NotificationCorrelator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationCorrelator")
            .field("pending", &self.is_pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ble::uuids::*;
    use crate::protocol::{encode_query_token, QueryToken};
    use crate::transport::MockTransport;
    use tokio_test::{assert_err, assert_ok};

    const SHORT: Duration = Duration::from_millis(50);

    fn event(data: &[u8]) -> NotificationEvent {
        NotificationEvent::new(NOTIFY_UUID, data.to_vec())
    }

    #[test]
    fn test_single_outstanding_waiter() {
        let correlator = NotificationCorrelator::new();

        let first = assert_ok!(correlator.register());
        assert!(correlator.is_pending());
        assert!(matches!(correlator.register(), Err(Error::QueryInProgress)));

        drop(first);
        assert!(!correlator.is_pending());
        assert_ok!(correlator.register());
    }

    #[test]
    fn test_dispatch_without_waiter_is_dropped() {
        let correlator = NotificationCorrelator::new();
        assert!(!correlator.dispatch(event(b"1,2,3,4")));
    }

    #[tokio::test]
    async fn test_dispatch_resolves_waiter_once() {
        let correlator = NotificationCorrelator::new();
        let waiter = correlator.register().unwrap();

        assert!(correlator.dispatch(event(b"first")));
        assert!(!correlator.is_pending());
        assert!(!correlator.dispatch(event(b"second")));

        let received = waiter.wait(SHORT).await.unwrap();
        assert_eq!(received.data, b"first");
    }

    #[tokio::test]
    async fn test_wait_times_out_and_deregisters() {
        let correlator = NotificationCorrelator::new();
        let waiter = correlator.register().unwrap();

        assert!(waiter.wait(SHORT).await.is_none());
        assert!(!correlator.is_pending());
    }

    #[tokio::test]
    async fn test_stale_guard_does_not_clear_newer_waiter() {
        let correlator = NotificationCorrelator::new();

        let first = correlator.register().unwrap();
        correlator.dispatch(event(b"answer"));
        let second = correlator.register().unwrap();

        drop(first);
        assert!(correlator.is_pending());
        drop(second);
        assert!(!correlator.is_pending());
    }

    #[tokio::test]
    async fn test_query_returns_notification() {
        let correlator = NotificationCorrelator::new();
        let (tx, rx) = broadcast::channel(8);
        let pump = correlator.attach(rx);

        let mut transport = MockTransport::new();
        transport
            .expect_write()
            .withf(|uuid, data| *uuid == QUERY_UUID && data == b"S")
            .times(1)
            .returning(move |_, _| {
                let _ = tx.send(NotificationEvent::new(NOTIFY_UUID, b"255,0,0,100".to_vec()));
                Ok(())
            });

        let payload = encode_query_token(QueryToken::ControlStatus);
        let answer = correlator
            .query(&transport, &QUERY_UUID, &payload, Duration::from_secs(1))
            .await
            .unwrap()
            .expect("notification should arrive");

        assert_eq!(answer.characteristic_uuid, NOTIFY_UUID);
        assert_eq!(answer.data, b"255,0,0,100");
        assert!(!correlator.is_pending());

        pump.abort();
    }

    #[tokio::test]
    async fn test_query_timeout_returns_none() {
        let correlator = NotificationCorrelator::new();

        let mut transport = MockTransport::new();
        transport.expect_write().times(1).returning(|_, _| Ok(()));

        let payload = encode_query_token(QueryToken::DelayStatus);
        let answer = correlator
            .query(&transport, &DELAY_QUERY_UUID, &payload, SHORT)
            .await
            .unwrap();

        assert!(answer.is_none());
        assert!(!correlator.is_pending());
    }

    #[tokio::test]
    async fn test_query_write_failure_propagates() {
        let correlator = NotificationCorrelator::new();

        let mut transport = MockTransport::new();
        transport
            .expect_write()
            .times(1)
            .returning(|_, _| Err(Error::NotConnected));

        let payload = encode_query_token(QueryToken::ControlStatus);
        let result = correlator
            .query(&transport, &QUERY_UUID, &payload, SHORT)
            .await;

        assert!(matches!(assert_err!(result), Error::NotConnected));
        assert!(!correlator.is_pending());
    }

    #[tokio::test]
    async fn test_query_missing_characteristic_still_waits() {
        let correlator = NotificationCorrelator::new();

        let mut transport = MockTransport::new();
        transport.expect_write().times(1).returning(|uuid, _| {
            Err(Error::CharacteristicNotFound {
                uuid: uuid.to_string(),
            })
        });

        let payload = encode_query_token(QueryToken::ControlStatus);
        let answer = correlator
            .query(&transport, &QUERY_UUID, &payload, SHORT)
            .await
            .unwrap();

        assert!(answer.is_none());
    }

    #[tokio::test]
    async fn test_overlapping_query_is_rejected_without_write() {
        let correlator = NotificationCorrelator::new();
        let _held = correlator.register().unwrap();

        let mut transport = MockTransport::new();
        transport.expect_write().never();

        let payload = encode_query_token(QueryToken::ControlStatus);
        let result = correlator
            .query(&transport, &QUERY_UUID, &payload, SHORT)
            .await;

        assert!(matches!(result, Err(Error::QueryInProgress)));
    }

    #[tokio::test]
    async fn test_pump_stops_when_channel_closes() {
        let correlator = NotificationCorrelator::new();
        let (tx, rx) = broadcast::channel::<NotificationEvent>(1);
        let pump = correlator.attach(rx);

        drop(tx);
        let joined = assert_ok!(tokio::time::timeout(Duration::from_secs(1), pump).await);
        assert_ok!(joined);
    }
}
