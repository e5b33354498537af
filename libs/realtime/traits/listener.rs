use crate::error::RealtimeError;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// What a listener subscribes to
///
/// Lifecycle topics are emitted by the client itself; `Kind` topics are
/// emitted for envelopes whose discriminator the router recognizes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Topic<K> {
    /// Socket opened (no payload)
    Connected,
    /// Socket closed or failed to open (no payload)
    Disconnected,
    /// Every successfully parsed envelope
    Message,
    /// Transport error description
    Error,
    /// A retry was scheduled (attempt number)
    Reconnecting,
    /// Retry budget exhausted (no payload)
    MaxReconnectAttemptsReached,
    /// Router-defined kind
    Kind(K),
}

impl<K> Topic<K> {
    /// Lifecycle topic name, `None` for router kinds
    pub fn lifecycle_name(&self) -> Option<&'static str> {
        match self {
            Topic::Connected => Some("connected"),
            Topic::Disconnected => Some("disconnected"),
            Topic::Message => Some("message"),
            Topic::Error => Some("error"),
            Topic::Reconnecting => Some("reconnecting"),
            Topic::MaxReconnectAttemptsReached => Some("maxReconnectAttemptsReached"),
            Topic::Kind(_) => None,
        }
    }
}

impl<K: fmt::Display> fmt::Display for Topic<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Topic::Kind(kind) => kind.fmt(f),
            other => f.write_str(other.lifecycle_name().unwrap_or_default()),
        }
    }
}

impl<K: FromStr> FromStr for Topic<K> {
    type Err = RealtimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "connected" => Ok(Topic::Connected),
            "disconnected" => Ok(Topic::Disconnected),
            "message" => Ok(Topic::Message),
            "error" => Ok(Topic::Error),
            "reconnecting" => Ok(Topic::Reconnecting),
            "maxReconnectAttemptsReached" => Ok(Topic::MaxReconnectAttemptsReached),
            other => other
                .parse::<K>()
                .map(Topic::Kind)
                .map_err(|_| RealtimeError::UnknownTopic(other.to_string())),
        }
    }
}

/// Payload handed to a listener
#[derive(Debug, Clone, Copy)]
pub enum EventPayload<'a> {
    Empty,
    Envelope(&'a Value),
    Error(&'a str),
    Attempt(usize),
}

impl<'a> EventPayload<'a> {
    pub fn envelope(&self) -> Option<&'a Value> {
        match self {
            EventPayload::Envelope(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&'a str> {
        match self {
            EventPayload::Error(description) => Some(description),
            _ => None,
        }
    }

    pub fn attempt(&self) -> Option<usize> {
        match self {
            EventPayload::Attempt(attempt) => Some(*attempt),
            _ => None,
        }
    }
}

/// Shared callback handle
///
/// Identity is the allocation: `off` removes the registration made with a
/// clone of the same `Arc`.
pub type Listener = Arc<dyn Fn(EventPayload<'_>) + Send + Sync>;

/// Wrap a closure into a [`Listener`]
pub fn listener<F>(callback: F) -> Listener
where
    F: Fn(EventPayload<'_>) + Send + Sync + 'static,
{
    Arc::new(callback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    struct Kind(String);

    impl FromStr for Kind {
        type Err = ();

        fn from_str(s: &str) -> Result<Self, ()> {
            if s == "orderUpdate" {
                Ok(Kind(s.to_string()))
            } else {
                Err(())
            }
        }
    }

    impl fmt::Display for Kind {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(&self.0)
        }
    }

    #[test]
    fn test_topic_names_round_trip() {
        for name in [
            "connected",
            "disconnected",
            "message",
            "error",
            "reconnecting",
            "maxReconnectAttemptsReached",
            "orderUpdate",
        ] {
            let topic: Topic<Kind> = name.parse().unwrap();
            assert_eq!(topic.to_string(), name);
        }
    }

    #[test]
    fn test_unknown_topic_rejected() {
        let err = "stationUpdate".parse::<Topic<Kind>>().unwrap_err();
        assert!(matches!(err, RealtimeError::UnknownTopic(name) if name == "stationUpdate"));
    }

    #[test]
    fn test_payload_accessors() {
        let value = serde_json::json!({"type": "x"});
        assert_eq!(EventPayload::Envelope(&value).envelope(), Some(&value));
        assert_eq!(EventPayload::Error("boom").error(), Some("boom"));
        assert_eq!(EventPayload::Attempt(3).attempt(), Some(3));
        assert!(EventPayload::Empty.envelope().is_none());
    }
}
