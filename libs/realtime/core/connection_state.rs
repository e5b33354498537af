//! Lock-free connection state and counters

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

/// Socket-level state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConnectionState {
    /// Never connected since construction
    Disconnected = 0,
    /// Transport handshake in flight
    Connecting = 1,
    /// Frames can be sent and received
    Open = 2,
    /// Connection lost or closed by the caller
    Closed = 3,
}

impl ConnectionState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => ConnectionState::Connecting,
            2 => ConnectionState::Open,
            3 => ConnectionState::Closed,
            _ => ConnectionState::Disconnected,
        }
    }
}

/// Reconnection state machine phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ReconnectPhase {
    /// No session: before `connect()` or after `disconnect()`
    Idle = 0,
    Connecting = 1,
    Connected = 2,
    /// Waiting out the reconnect delay
    RetryScheduled = 3,
    /// Retry budget used up; terminal until the next `connect()`
    Exhausted = 4,
}

impl ReconnectPhase {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => ReconnectPhase::Connecting,
            2 => ReconnectPhase::Connected,
            3 => ReconnectPhase::RetryScheduled,
            4 => ReconnectPhase::Exhausted,
            _ => ReconnectPhase::Idle,
        }
    }
}

/// Atomic holder for [`ConnectionState`]
#[derive(Debug)]
pub struct AtomicConnectionState(AtomicU8);

impl AtomicConnectionState {
    pub fn new(state: ConnectionState) -> Self {
        Self(AtomicU8::new(state as u8))
    }

    #[inline]
    pub fn get(&self) -> ConnectionState {
        ConnectionState::from_u8(self.0.load(Ordering::Acquire))
    }

    #[inline]
    pub fn set(&self, state: ConnectionState) {
        self.0.store(state as u8, Ordering::Release);
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.get() == ConnectionState::Open
    }

    #[inline]
    pub fn is_connecting(&self) -> bool {
        self.get() == ConnectionState::Connecting
    }
}

/// Atomic holder for [`ReconnectPhase`]
#[derive(Debug)]
pub struct AtomicReconnectPhase(AtomicU8);

impl AtomicReconnectPhase {
    pub fn new(phase: ReconnectPhase) -> Self {
        Self(AtomicU8::new(phase as u8))
    }

    #[inline]
    pub fn get(&self) -> ReconnectPhase {
        ReconnectPhase::from_u8(self.0.load(Ordering::Acquire))
    }

    #[inline]
    pub fn set(&self, phase: ReconnectPhase) {
        self.0.store(phase as u8, Ordering::Release);
    }
}

/// Client metrics snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metrics {
    /// Frames written to the transport
    pub messages_sent: u64,
    /// Text or binary frames read from the transport
    pub messages_received: u64,
    /// `send` calls rejected because the socket was not open
    pub sends_dropped: u64,
    /// Inbound frames discarded as malformed
    pub parse_failures: u64,
    /// Retries scheduled over the client's lifetime
    pub reconnect_count: u64,
    pub connection_state: ConnectionState,
}

/// Lifetime counters
#[derive(Debug, Default)]
pub struct AtomicMetrics {
    messages_sent: AtomicU64,
    messages_received: AtomicU64,
    sends_dropped: AtomicU64,
    parse_failures: AtomicU64,
    reconnect_count: AtomicU64,
}

impl AtomicMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn increment_sent(&self) {
        self.messages_sent.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn increment_received(&self) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn increment_dropped(&self) {
        self.sends_dropped.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn increment_parse_failures(&self) {
        self.parse_failures.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn increment_reconnects(&self) {
        self.reconnect_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn messages_sent(&self) -> u64 {
        self.messages_sent.load(Ordering::Relaxed)
    }

    pub fn messages_received(&self) -> u64 {
        self.messages_received.load(Ordering::Relaxed)
    }

    pub fn sends_dropped(&self) -> u64 {
        self.sends_dropped.load(Ordering::Relaxed)
    }

    pub fn parse_failures(&self) -> u64 {
        self.parse_failures.load(Ordering::Relaxed)
    }

    pub fn reconnect_count(&self) -> u64 {
        self.reconnect_count.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self, connection_state: ConnectionState) -> Metrics {
        Metrics {
            messages_sent: self.messages_sent(),
            messages_received: self.messages_received(),
            sends_dropped: self.sends_dropped(),
            parse_failures: self.parse_failures(),
            reconnect_count: self.reconnect_count(),
            connection_state,
        }
    }
}
