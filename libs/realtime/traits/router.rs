//! Envelope routing
//!
//! Inbound frames are JSON envelopes discriminated by a `type` string. The
//! router decides which of those discriminators deserve a kind-specific event
//! on top of the generic `message` event.
//!
//! ```text
//! frame → JSON → Topic::Message ──────────────→ message listeners
//!                    │
//!                    └─ type → route_key → Topic::Kind(k) → kind listeners
//! ```

use std::fmt::Debug;
use std::hash::Hash;

/// Maps envelope discriminators to listener kinds
///
/// # Example
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// enum Feed { Trade, Book }
///
/// struct FeedRouter;
///
/// impl EnvelopeRouter for FeedRouter {
///     type Kind = Feed;
///
///     fn route_key(&self, envelope_type: &str) -> Option<Feed> {
///         match envelope_type {
///             "trade" => Some(Feed::Trade),
///             "book" => Some(Feed::Book),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait EnvelopeRouter: Send + Sync + 'static {
    /// The kind used as a listener key for routed envelopes
    type Kind: Hash + Eq + Clone + Send + Sync + Debug + 'static;

    /// Name of the discriminator field
    fn discriminator(&self) -> &str {
        "type"
    }

    /// Map a discriminator value to a kind, or `None` for unknown values
    ///
    /// This is on the hot path: a plain match.
    fn route_key(&self, envelope_type: &str) -> Option<Self::Kind>;
}

/// Router with no kinds: every envelope produces only the `message` event
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageOnly;

impl EnvelopeRouter for MessageOnly {
    type Kind = ();

    fn route_key(&self, _envelope_type: &str) -> Option<()> {
        None
    }
}
