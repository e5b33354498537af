//! Inbound frame dispatch
//!
//! A frame is parsed once. Malformed frames are logged and dropped without
//! touching any listener. Parsed envelopes go to `message` listeners first and
//! then, if the router knows the discriminator, to the kind listeners.

use crate::registry::ListenerRegistry;
use crate::traits::{EnvelopeRouter, EventPayload, Topic};
use serde_json::Value;
use tracing::{debug, warn};

/// Result of dispatching one frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome<K> {
    /// Not valid JSON; no listener invoked
    Malformed,
    /// Delivered to `message` listeners only
    Message,
    /// Delivered to `message` listeners, then to the listeners of this kind
    Routed(K),
}

pub struct Dispatcher<R: EnvelopeRouter> {
    router: R,
    registry: ListenerRegistry<R::Kind>,
}

impl<R: EnvelopeRouter> Dispatcher<R> {
    pub fn new(router: R) -> Self {
        Self {
            router,
            registry: ListenerRegistry::new(),
        }
    }

    pub fn router(&self) -> &R {
        &self.router
    }

    pub fn registry(&self) -> &ListenerRegistry<R::Kind> {
        &self.registry
    }

    /// Emit a lifecycle event
    pub fn emit(&self, topic: &Topic<R::Kind>, payload: EventPayload<'_>) -> usize {
        self.registry.emit(topic, payload)
    }

    /// Parse and fan out one text frame
    pub fn dispatch_text(&self, text: &str) -> DispatchOutcome<R::Kind> {
        let envelope: Value = match serde_json::from_str(text) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(error = %e, frame_len = text.len(), "Dropping malformed frame");
                return DispatchOutcome::Malformed;
            }
        };

        self.registry
            .emit(&Topic::Message, EventPayload::Envelope(&envelope));

        let kind = envelope
            .get(self.router.discriminator())
            .and_then(Value::as_str)
            .and_then(|envelope_type| self.router.route_key(envelope_type));

        match kind {
            Some(kind) => {
                let delivered = self
                    .registry
                    .emit(&Topic::Kind(kind.clone()), EventPayload::Envelope(&envelope));
                debug!(?kind, delivered, "Routed envelope");
                DispatchOutcome::Routed(kind)
            }
            None => DispatchOutcome::Message,
        }
    }
}
