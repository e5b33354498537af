//! # Realtime Traits
//!
//! Core traits and types shared by the client and its callers:
//!
//! - **EnvelopeRouter**: map an envelope's `type` discriminator to a kind
//! - **ReconnectionStrategy**: control retry delay and the attempt budget
//! - **Topic / Listener**: what listeners subscribe to and what they receive

pub mod error;
pub mod listener;
pub mod reconnect;
pub mod router;

// Re-export commonly used types
pub use error::{RealtimeError, Result};
pub use listener::{listener, EventPayload, Listener, Topic};
pub use reconnect::{FixedDelay, NeverReconnect, ReconnectionStrategy};
pub use router::{EnvelopeRouter, MessageOnly};
