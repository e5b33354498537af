//! Kitchen display layer
//!
//! Builds on the `realtime` client:
//! - `protocol`: inbound kinds, router and outbound requests
//! - `channel`: `KitchenChannel` with the order/station convenience senders
//! - `board`: in-memory order board fed by inbound envelopes
//! - `auth_api`: staff OTP login and password reset over HTTP
//! - `config`, `logging`, `shutdown`: process plumbing for the monitor binary

pub mod auth_api;
pub mod board;
pub mod channel;
pub mod config;
pub mod logging;
pub mod protocol;
pub mod shutdown;

pub use auth_api::{AuthApiClient, AuthApiError};
pub use board::{OrderBoard, OrderEntry};
pub use channel::{KitchenChannel, KitchenTopic};
pub use config::{AuthApiSettings, ConfigError, KitchenConfig, RealtimeSettings};
pub use logging::init_tracing;
pub use protocol::{KitchenKind, KitchenRouter, OutboundEnvelope, UnknownKind};
pub use shutdown::ShutdownSignal;
