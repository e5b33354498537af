use std::time::Duration;

/// Default wait before a retry
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(3000);

/// Default retry budget per `connect()`
pub const DEFAULT_MAX_ATTEMPTS: usize = 5;

/// Decides whether, and after how long, a lost connection is retried
///
/// `attempt` counts the retries already scheduled since the last successful
/// open (or since `connect()`), so the first retry is asked about with `0`.
pub trait ReconnectionStrategy: Send + Sync {
    /// `None` ends the session with `maxReconnectAttemptsReached`
    fn next_delay(&self, attempt: usize) -> Option<Duration>;

    fn should_reconnect(&self, attempt: usize) -> bool {
        self.next_delay(attempt).is_some()
    }
}

/// Same delay before every retry, optionally capped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDelay {
    delay: Duration,
    max_attempts: Option<usize>,
}

impl FixedDelay {
    /// `max_attempts: None` retries forever
    pub fn new(delay: Duration, max_attempts: Option<usize>) -> Self {
        Self { delay, max_attempts }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn max_attempts(&self) -> Option<usize> {
        self.max_attempts
    }
}

impl Default for FixedDelay {
    fn default() -> Self {
        Self::new(DEFAULT_RECONNECT_DELAY, Some(DEFAULT_MAX_ATTEMPTS))
    }
}

impl ReconnectionStrategy for FixedDelay {
    fn next_delay(&self, attempt: usize) -> Option<Duration> {
        match self.max_attempts {
            Some(max) if attempt >= max => None,
            _ => Some(self.delay),
        }
    }
}

/// First unexpected close is final
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverReconnect;

impl ReconnectionStrategy for NeverReconnect {
    fn next_delay(&self, _attempt: usize) -> Option<Duration> {
        None
    }
}
