use crate::error::{RealtimeError, Result};
use crate::traits::*;

/// Configuration for [`RealtimeClient`](crate::client::RealtimeClient)
///
/// Built by the type-state builder; immutable once the client exists.
pub struct ClientConfig {
    /// WebSocket URL (ws:// or wss://)
    pub(crate) url: String,

    /// Reconnection strategy consulted after every unexpected close
    pub(crate) reconnect_strategy: Box<dyn ReconnectionStrategy>,
}

impl ClientConfig {
    pub(crate) fn new(
        url: String,
        reconnect_strategy: Box<dyn ReconnectionStrategy>,
    ) -> Result<Self> {
        if !(url.starts_with("ws://") || url.starts_with("wss://")) {
            return Err(RealtimeError::Configuration(format!(
                "URL must use ws:// or wss://, got '{}'",
                url
            )));
        }

        Ok(Self {
            url,
            reconnect_strategy,
        })
    }

    /// Get a reference to the URL
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn reconnect_strategy(&self) -> &dyn ReconnectionStrategy {
        self.reconnect_strategy.as_ref()
    }
}
