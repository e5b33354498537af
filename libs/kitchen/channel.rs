//! Kitchen realtime channel
//!
//! A [`RealtimeClient`] routed with [`KitchenRouter`], plus the three
//! requests a kitchen display sends over it.

use crate::config::RealtimeSettings;
use crate::protocol::{KitchenKind, KitchenRouter, OutboundEnvelope};
use realtime::{ConnectionState, Listener, Metrics, RealtimeClient, ReconnectPhase, Topic};
use tracing::debug;

pub type KitchenTopic = Topic<KitchenKind>;

/// Kitchen display connection
///
/// Create one per display and share it by reference; there is no global
/// instance.
pub struct KitchenChannel {
    client: RealtimeClient<KitchenRouter>,
}

impl KitchenChannel {
    /// Build a channel from configured settings
    pub fn new(settings: &RealtimeSettings) -> realtime::Result<Self> {
        let client = RealtimeClient::builder()
            .url(&settings.url)
            .router(KitchenRouter)
            .fixed_delay(settings.reconnect_delay(), settings.max_reconnect_attempts)
            .build()?;
        Ok(Self { client })
    }

    /// Build a channel for `url` with the default retry policy
    pub fn with_url(url: impl Into<String>) -> realtime::Result<Self> {
        let client = RealtimeClient::builder()
            .url(url)
            .router(KitchenRouter)
            .build()?;
        Ok(Self { client })
    }

    pub fn connect(&self) {
        self.client.connect();
    }

    pub fn disconnect(&self) {
        self.client.disconnect();
    }

    pub fn on(&self, topic: KitchenTopic, listener: Listener) {
        self.client.on(topic, listener);
    }

    /// Subscribe by event name, e.g. `"orderUpdate"` or `"connected"`
    pub fn on_named(&self, event: &str, listener: Listener) -> realtime::Result<()> {
        let topic: KitchenTopic = event.parse()?;
        self.client.on(topic, listener);
        Ok(())
    }

    pub fn off(&self, topic: &KitchenTopic, listener: &Listener) -> bool {
        self.client.off(topic, listener)
    }

    /// Ask the server to resend the current state of one order
    pub fn request_order_update(&self, order_id: impl Into<String>) -> bool {
        let order_id = order_id.into();
        debug!(%order_id, "Requesting order update");
        self.client
            .send(&OutboundEnvelope::RequestOrderUpdate { order_id })
    }

    /// Report a new status for an order
    pub fn update_order_status(
        &self,
        order_id: impl Into<String>,
        status: impl Into<String>,
    ) -> bool {
        let order_id = order_id.into();
        let status = status.into();
        debug!(%order_id, %status, "Updating order status");
        self.client
            .send(&OutboundEnvelope::UpdateOrderStatus { order_id, status })
    }

    pub fn request_station_status(&self) -> bool {
        self.client.send(&OutboundEnvelope::RequestStationStatus)
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.client.connection_state()
    }

    pub fn is_open(&self) -> bool {
        self.client.is_open()
    }

    pub fn reconnect_phase(&self) -> ReconnectPhase {
        self.client.reconnect_phase()
    }

    pub fn retry_count(&self) -> usize {
        self.client.retry_count()
    }

    pub fn metrics(&self) -> Metrics {
        self.client.metrics()
    }

    pub fn url(&self) -> &str {
        self.client.url()
    }

    /// Underlying generic client
    pub fn client(&self) -> &RealtimeClient<KitchenRouter> {
        &self.client
    }
}
