//! Notification listener registry.
//!
//! Maps a notification method name to the listeners registered for it.
//! The registry is append-only: listeners are invoked in registration
//! order and never removed.

// ============================================================================
// Imports
// ============================================================================

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use serde_json::Value;
use tracing::{trace, warn};

use crate::protocol::Notification;

// ============================================================================
// Types
// ============================================================================

/// Notification listener callback.
///
/// Receives the notification's undecoded `params`. Listeners run on the
/// read loop, so while one runs no other frame is routed. A listener must
/// never wait for a call response; spawn a task for that instead.
pub type Listener = Arc<dyn Fn(&Value) + Send + Sync>;

// ============================================================================
// ListenerRegistry
// ============================================================================

/// Append-only map from method name to listeners.
#[derive(Default)]
pub(crate) struct ListenerRegistry {
    listeners: RwLock<FxHashMap<String, Vec<Listener>>>,
}

impl ListenerRegistry {
    /// Appends `listener` to the list for `method`.
    pub(crate) fn add(&self, method: impl Into<String>, listener: Listener) {
        self.listeners
            .write()
            .entry(method.into())
            .or_default()
            .push(listener);
    }

    /// Returns the number of listeners registered for `method`.
    pub(crate) fn count(&self, method: &str) -> usize {
        self.listeners.read().get(method).map_or(0, Vec::len)
    }

    /// Invokes every listener registered for the notification's method.
    ///
    /// The list is snapshotted and the lock released before any listener
    /// runs, so listeners may register more listeners. A panicking
    /// listener is logged and skipped. Returns how many listeners ran.
    pub(crate) fn dispatch(&self, notification: &Notification) -> usize {
        let snapshot: Vec<Listener> = match self.listeners.read().get(&notification.method) {
            Some(list) => list.clone(),
            None => {
                trace!(method = %notification.method, "No listeners, notification dropped");
                return 0;
            }
        };

        for listener in &snapshot {
            let outcome = catch_unwind(AssertUnwindSafe(|| listener(&notification.params)));
            if outcome.is_err() {
                warn!(method = %notification.method, "Listener panicked");
            }
        }

        snapshot.len()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use parking_lot::Mutex;
    use serde_json::json;

    fn notification(method: &str, params: Value) -> Notification {
        Notification {
            method: method.into(),
            params,
        }
    }

    #[test]
    fn test_dispatch_in_registration_order() {
        let registry = ListenerRegistry::default();
        let log = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let log = Arc::clone(&log);
            registry.add(
                "Foo.event",
                Arc::new(move |params: &Value| log.lock().push((tag, params["n"].clone()))),
            );
        }

        let ran = registry.dispatch(&notification("Foo.event", json!({"n": 5})));
        assert_eq!(ran, 3);
        assert_eq!(
            *log.lock(),
            vec![("first", json!(5)), ("second", json!(5)), ("third", json!(5))]
        );
    }

    #[test]
    fn test_dispatch_only_to_matching_method() {
        let registry = ListenerRegistry::default();
        let hits = Arc::new(Mutex::new(Vec::new()));

        let h = Arc::clone(&hits);
        registry.add("Foo.a", Arc::new(move |_: &Value| h.lock().push("a")));
        let h = Arc::clone(&hits);
        registry.add("Foo.b", Arc::new(move |_: &Value| h.lock().push("b")));

        registry.dispatch(&notification("Foo.b", Value::Null));
        assert_eq!(*hits.lock(), vec!["b"]);
    }

    #[test]
    fn test_unregistered_method_is_dropped() {
        let registry = ListenerRegistry::default();
        assert_eq!(registry.dispatch(&notification("Foo.none", Value::Null)), 0);
        assert_eq!(registry.count("Foo.none"), 0);
    }

    #[test]
    fn test_listener_may_register_listener() {
        let registry = Arc::new(ListenerRegistry::default());
        let inner = Arc::clone(&registry);
        registry.add(
            "Foo.event",
            Arc::new(move |_: &Value| inner.add("Foo.other", Arc::new(|_: &Value| {}))),
        );

        registry.dispatch(&notification("Foo.event", Value::Null));
        assert_eq!(registry.count("Foo.other"), 1);
    }

    #[test]
    fn test_panicking_listener_does_not_stop_dispatch() {
        let registry = ListenerRegistry::default();
        let hits = Arc::new(Mutex::new(0));

        fn faulty(_: &Value) {
            panic!("listener bug");
        }

        registry.add("Foo.event", Arc::new(faulty));
        let h = Arc::clone(&hits);
        registry.add("Foo.event", Arc::new(move |_: &Value| *h.lock() += 1));

        assert_eq!(registry.dispatch(&notification("Foo.event", Value::Null)), 2);
        assert_eq!(*hits.lock(), 1);
    }
}
