//! # Realtime
//!
//! A reconnecting WebSocket client with a listener registry keyed by event kind.
//!
//! ## Features
//!
//! - **Bounded reconnection**: fixed-delay retries up to a maximum, then a single
//!   terminal `maxReconnectAttemptsReached` event
//! - **Typed listener topics**: lifecycle topics plus router-defined kinds
//! - **Ordered dispatch**: frames reach listeners in wire order, `message` first
//! - **Fail-soft API**: `connect`, `disconnect`, `send`, `on`, `off` never return errors
//!
//! ## Example
//!
//! ```rust,ignore
//! use realtime::*;
//!
//! let client = RealtimeClient::builder()
//!     .url("ws://localhost:8080/kitchen")
//!     .router(MyRouter)
//!     .reconnect_strategy(FixedDelay::default())
//!     .build()?;
//!
//! client.on(Topic::Message, listener(|payload| {
//!     println!("{:?}", payload.envelope());
//! }));
//! client.connect();
//! ```

pub mod traits;
pub mod core;

// Re-export all traits
pub use traits::*;

// Re-export core client functionality
pub use self::core::{
    builder, client, config, connection_state, dispatch, registry,
    builder::{states, RealtimeClientBuilder},
    client::RealtimeClient,
    config::ClientConfig,
    connection_state::{
        AtomicConnectionState, AtomicMetrics, AtomicReconnectPhase, ConnectionState, Metrics,
        ReconnectPhase,
    },
    dispatch::{DispatchOutcome, Dispatcher},
    registry::ListenerRegistry,
};

/// Type alias for Result with RealtimeError
pub type Result<T> = std::result::Result<T, traits::RealtimeError>;
