//! Typed publish/subscribe registry for pushed notifications

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Event kind triggered for payloads that could not be decoded
pub const STREAM_ERROR_EVENT: &str = "stream.error";

/// A notification pushed by the backend: `{type, ...payload}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamEvent {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl StreamEvent {
    pub fn new(kind: impl Into<String>) -> Self {
        Self { kind: kind.into(), payload: Map::new() }
    }

    /// The error event for an undecodable payload
    pub fn stream_error(raw: &str, reason: impl fmt::Display) -> Self {
        let mut payload = Map::new();
        payload.insert("data".to_string(), Value::String(raw.to_string()));
        payload.insert("reason".to_string(), Value::String(reason.to_string()));
        Self { kind: STREAM_ERROR_EVENT.to_string(), payload }
    }
}

/// Handle returned by [`EventBus::on`], used to unsubscribe
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Subscription {
    kind: String,
    id: u64,
}

impl Subscription {
    pub fn kind(&self) -> &str {
        &self.kind
    }
}

pub type Handler<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Handlers registered per event kind. Several handlers may share a kind;
/// each registered handler runs once per triggered event.
pub struct EventBus<E> {
    handlers: HashMap<String, Vec<(u64, Handler<E>)>>,
    next_id: u64,
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self { handlers: HashMap::new(), next_id: 0 }
    }
}

impl<E> fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: HashMap<&str, usize> =
            self.handlers.iter().map(|(k, v)| (k.as_str(), v.len())).collect();
        f.debug_struct("EventBus").field("handlers", &counts).finish()
    }
}

impl<E> EventBus<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for an event kind
    pub fn on<F>(&mut self, kind: impl Into<String>, handler: F) -> Subscription
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let kind = kind.into();
        let id = self.next_id;
        self.next_id += 1;
        self.handlers.entry(kind.clone()).or_default().push((id, Arc::new(handler)));
        Subscription { kind, id }
    }

    /// Remove one handler. Returns false if it was already removed.
    pub fn off(&mut self, subscription: &Subscription) -> bool {
        let Some(handlers) = self.handlers.get_mut(&subscription.kind) else {
            return false;
        };
        let before = handlers.len();
        handlers.retain(|(id, _)| *id != subscription.id);
        before != handlers.len()
    }

    /// Remove every handler for a kind, returning how many were removed
    pub fn off_all(&mut self, kind: &str) -> usize {
        self.handlers.remove(kind).map_or(0, |handlers| handlers.len())
    }

    /// Invoke the handlers registered for `kind`, returning how many ran
    pub fn trigger(&self, kind: &str, event: &E) -> usize {
        let Some(handlers) = self.handlers.get(kind) else {
            return 0;
        };
        for (_, handler) in handlers {
            handler(event);
        }
        handlers.len()
    }

    /// The handlers registered for `kind`, in registration order. Callers
    /// that share the bus behind a lock invoke these after releasing it.
    pub fn handlers(&self, kind: &str) -> Vec<Handler<E>> {
        self.handlers
            .get(kind)
            .map(|handlers| handlers.iter().map(|(_, handler)| handler.clone()).collect())
            .unwrap_or_default()
    }

    pub fn handler_count(&self, kind: &str) -> usize {
        self.handlers.get(kind).map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counter(bus: &mut EventBus<StreamEvent>, kind: &str) -> (Arc<AtomicUsize>, Subscription) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let sub = bus.on(kind, move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });
        (count, sub)
    }

    #[test]
    fn test_multiple_handlers_each_run_once() {
        let mut bus = EventBus::new();
        let (a, _) = counter(&mut bus, "job_status");
        let (b, _) = counter(&mut bus, "job_status");
        let (other, _) = counter(&mut bus, "progress");

        assert_eq!(bus.trigger("job_status", &StreamEvent::new("job_status")), 2);
        assert_eq!(a.load(Ordering::SeqCst), 1);
        assert_eq!(b.load(Ordering::SeqCst), 1);
        assert_eq!(other.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_off_removes_single_handler() {
        let mut bus = EventBus::new();
        let (a, sub_a) = counter(&mut bus, "job_status");
        let (b, _) = counter(&mut bus, "job_status");

        assert!(bus.off(&sub_a));
        assert!(!bus.off(&sub_a));
        bus.trigger("job_status", &StreamEvent::new("job_status"));

        assert_eq!(a.load(Ordering::SeqCst), 0);
        assert_eq!(b.load(Ordering::SeqCst), 1);
        assert_eq!(sub_a.kind(), "job_status");
    }

    #[test]
    fn test_off_all() {
        let mut bus = EventBus::new();
        let (a, _) = counter(&mut bus, "job_status");
        counter(&mut bus, "job_status");

        assert_eq!(bus.off_all("job_status"), 2);
        assert_eq!(bus.handler_count("job_status"), 0);
        assert_eq!(bus.trigger("job_status", &StreamEvent::new("job_status")), 0);
        assert_eq!(a.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_handlers_snapshot_outlives_off() {
        let mut bus = EventBus::new();
        let (a, sub_a) = counter(&mut bus, "job_status");

        let snapshot = bus.handlers("job_status");
        bus.off(&sub_a);
        for handler in &snapshot {
            handler(&StreamEvent::new("job_status"));
        }

        assert_eq!(snapshot.len(), 1);
        assert_eq!(a.load(Ordering::SeqCst), 1);
        assert!(bus.handlers("job_status").is_empty());
        assert!(bus.handlers("progress").is_empty());
    }

    #[test]
    fn test_stream_event_wire_format() {
        let event: StreamEvent =
            serde_json::from_value(json!({"type": "job_status", "data": {"status": 3}})).unwrap();
        assert_eq!(event.kind, "job_status");
        assert_eq!(event.payload["data"]["status"], 3);

        let error = StreamEvent::stream_error("{oops", "expected value");
        assert_eq!(error.kind, STREAM_ERROR_EVENT);
        assert_eq!(error.payload["data"], "{oops");
    }
}
