use thiserror::Error;

/// Main error type for the realtime client
///
/// None of these cross the public `connect`/`send`/`on`/`off` surface; they are
/// produced by the builder and by the connection driver, which reports them to
/// listeners as `error` events.
#[derive(Error, Debug)]
pub enum RealtimeError {
    /// WebSocket transport error
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// Connection closed unexpectedly
    #[error("Connection closed: {0}")]
    ConnectionClosed(String),

    /// Outbound payload could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Topic name did not match a lifecycle topic or a router kind
    #[error("Unknown topic: {0}")]
    UnknownTopic(String),
}

/// Result type for realtime operations
pub type Result<T> = std::result::Result<T, RealtimeError>;
