//! # Realtime Core
//!
//! The client, its builder and the pieces it is made of:
//!
//! - **client**: session driver, reconnection state machine, fail-soft API
//! - **dispatch**: JSON parsing and `message` → kind fan-out
//! - **registry**: topic → ordered listeners
//! - **connection_state**: atomic socket state, reconnect phase, metrics
//!
//! ## Example
//!
//! ```rust,ignore
//! use realtime::*;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = RealtimeClient::builder()
//!         .url("ws://localhost:8080/kitchen")
//!         .router(MessageOnly)
//!         .fixed_delay(Duration::from_secs(3), 5)
//!         .build()?;
//!
//!     client.on(Topic::Connected, listener(|_| println!("connected")));
//!     client.on(Topic::Message, listener(|payload| println!("{:?}", payload.envelope())));
//!     client.connect();
//!
//!     tokio::signal::ctrl_c().await.ok();
//!     client.disconnect();
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod client;
pub mod config;
pub mod connection_state;
pub mod dispatch;
pub mod registry;

// Re-export main types
pub use builder::{states, RealtimeClientBuilder};
pub use client::RealtimeClient;
pub use config::ClientConfig;
pub use connection_state::{
    AtomicConnectionState, AtomicMetrics, AtomicReconnectPhase, ConnectionState, Metrics,
    ReconnectPhase,
};
pub use dispatch::{DispatchOutcome, Dispatcher};
pub use registry::ListenerRegistry;

// Re-export traits for convenience
pub use crate::traits::*;
