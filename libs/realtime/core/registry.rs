//! Listener registry
//!
//! Topic → ordered listeners. Emission snapshots the list under the lock and
//! invokes callbacks with the lock released, so a callback may subscribe,
//! unsubscribe or send without deadlocking. A panicking callback is logged
//! and skipped; the remaining listeners still run.

use crate::traits::{EventPayload, Listener, Topic};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::error;

pub struct ListenerRegistry<K> {
    listeners: Mutex<HashMap<Topic<K>, Vec<Listener>>>,
}

impl<K> ListenerRegistry<K>
where
    K: Hash + Eq + Clone + Debug,
{
    pub fn new() -> Self {
        Self {
            listeners: Mutex::new(HashMap::new()),
        }
    }

    /// Append a listener; the same handle may be registered more than once
    pub fn add(&self, topic: Topic<K>, listener: Listener) {
        self.listeners.lock().entry(topic).or_default().push(listener);
    }

    /// Remove the first registration of `listener` under `topic`
    pub fn remove(&self, topic: &Topic<K>, listener: &Listener) -> bool {
        let mut listeners = self.listeners.lock();
        let Some(registered) = listeners.get_mut(topic) else {
            return false;
        };

        let Some(index) = registered
            .iter()
            .position(|candidate| std::ptr::addr_eq(Arc::as_ptr(candidate), Arc::as_ptr(listener)))
        else {
            return false;
        };

        registered.remove(index);
        if registered.is_empty() {
            listeners.remove(topic);
        }
        true
    }

    /// Invoke every listener of `topic` in registration order
    ///
    /// Returns how many listeners returned normally.
    pub fn emit(&self, topic: &Topic<K>, payload: EventPayload<'_>) -> usize {
        let snapshot = match self.listeners.lock().get(topic) {
            Some(registered) => registered.clone(),
            None => return 0,
        };

        let mut completed = 0;
        for listener in &snapshot {
            match panic::catch_unwind(AssertUnwindSafe(|| listener(payload))) {
                Ok(()) => completed += 1,
                Err(cause) => {
                    error!(?topic, panic = panic_message(&*cause), "Listener panicked");
                }
            }
        }
        completed
    }

    pub fn listener_count(&self, topic: &Topic<K>) -> usize {
        self.listeners.lock().get(topic).map_or(0, Vec::len)
    }
}

fn panic_message(cause: &(dyn std::any::Any + Send)) -> &str {
    cause
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| cause.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

impl<K> Default for ListenerRegistry<K>
where
    K: Hash + Eq + Clone + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}
