//! Client configuration.

use std::time::Duration;

/// Tunables for a [`Light`](crate::Light) connection.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LightConfig {
    /// How long a status query waits for its notification.
    pub query_timeout: Duration,
    /// How long to look for the peripheral before giving up on connect.
    pub connect_timeout: Duration,
    /// Use GATT write-with-response for commands.
    pub write_with_response: bool,
    /// Capacity of the notification broadcast channel.
    pub notification_buffer: usize,
}

impl LightConfig {
    /// Default query timeout (5 seconds), as used by the lamp's own app.
    pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);
    /// Default connect timeout (10 seconds).
    pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
    /// Default notification channel capacity.
    pub const DEFAULT_NOTIFICATION_BUFFER: usize = 64;

    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the query timeout.
    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    /// Set the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Choose between write-with-response and write-without-response.
    pub fn with_write_with_response(mut self, with_response: bool) -> Self {
        self.write_with_response = with_response;
        self
    }

    /// Set the notification channel capacity (at least 1).
    pub fn with_notification_buffer(mut self, capacity: usize) -> Self {
        self.notification_buffer = capacity.max(1);
        self
    }
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            query_timeout: Self::DEFAULT_QUERY_TIMEOUT,
            connect_timeout: Self::DEFAULT_CONNECT_TIMEOUT,
            write_with_response: true,
            notification_buffer: Self::DEFAULT_NOTIFICATION_BUFFER,
        }
    }
}
