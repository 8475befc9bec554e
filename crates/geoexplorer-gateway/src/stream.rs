//! Server-sent notification stream.
//!
//! [`SseDecoder`] turns `text/event-stream` bytes into frames, and
//! [`EventStream`] dispatches each frame's JSON payload `{type, ...}` on an
//! [`EventBus`] keyed by `type`. The time of the last delivered event is kept
//! in a [`TimestampStore`] so a reopened stream resumes from there.

use geoexplorer_core::config::LayeredConfig;
use geoexplorer_core::error::{ExplorerError, Result};
use geoexplorer_core::events::{EventBus, StreamEvent, Subscription, STREAM_ERROR_EVENT};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};
use tokio::sync::Notify;

use crate::http::RestGateway;

/// Payload field carrying the backend's event time
const EVENT_TIME_FIELD: &str = "_girderTime";

/// One dispatched server-sent event
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SseFrame {
    pub event: Option<String>,
    pub id: Option<String>,
    pub data: String,
}

/// Incremental `text/event-stream` decoder.
///
/// Bytes may be fed in arbitrary chunks, including chunks that split a
/// UTF-8 sequence or a line. Events without any `data` line are skipped.
#[derive(Debug, Default)]
pub struct SseDecoder {
    pending: Vec<u8>,
    line: String,
    event: Option<String>,
    id: Option<String>,
    data: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return the frames it completed
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.pending.extend_from_slice(chunk);
        let text = match std::str::from_utf8(&self.pending) {
            Ok(text) => {
                let text = text.to_string();
                self.pending.clear();
                text
            }
            // Incomplete sequence at the end: keep it for the next chunk
            Err(e) if e.error_len().is_none() => {
                let rest = self.pending.split_off(e.valid_up_to());
                let text = String::from_utf8_lossy(&self.pending).into_owned();
                self.pending = rest;
                text
            }
            Err(_) => {
                let text = String::from_utf8_lossy(&self.pending).into_owned();
                self.pending.clear();
                text
            }
        };
        self.line.push_str(&text);

        let mut frames = Vec::new();
        while let Some(end) = self.line.find('\n') {
            let line: String = self.line.drain(..=end).collect();
            if let Some(frame) = self.process_line(line.trim_end_matches(['\n', '\r'])) {
                frames.push(frame);
            }
        }
        frames
    }

    fn process_line(&mut self, line: &str) -> Option<SseFrame> {
        if line.is_empty() {
            let event = self.event.take();
            let id = self.id.take();
            if self.data.is_empty() {
                return None;
            }
            let data = std::mem::take(&mut self.data).join("\n");
            return Some(SseFrame { event, id, data });
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "data" => self.data.push(value.to_string()),
            "event" => self.event = Some(value.to_string()),
            "id" => self.id = Some(value.to_string()),
            _ => {}
        }
        None
    }
}

/// File-backed storage of the last seen event timestamp.
///
/// A missing, unreadable or corrupt file reads as `None`; write failures are
/// logged and otherwise ignored.
#[derive(Debug, Clone)]
pub struct TimestampStore {
    path: PathBuf,
}

impl TimestampStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Option<i64> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                tracing::debug!("No stream timestamp at {}: {}", self.path.display(), e);
                return None;
            }
        };
        match content.trim().parse::<i64>() {
            Ok(timestamp) => Some(timestamp),
            Err(e) => {
                tracing::debug!("Ignoring corrupt stream timestamp '{}': {}", content.trim(), e);
                None
            }
        }
    }

    pub fn save(&self, timestamp: i64) {
        if let Err(e) = fs::write(&self.path, timestamp.to_string()) {
            tracing::debug!("Failed to persist stream timestamp to {}: {}", self.path.display(), e);
        }
    }
}

/// Consumer of the backend notification stream
#[derive(Clone)]
pub struct EventStream {
    bus: Arc<RwLock<EventBus<StreamEvent>>>,
    timestamps: TimestampStore,
    closed: Arc<Notify>,
}

impl EventStream {
    pub fn new(timestamps: TimestampStore) -> Self {
        Self {
            bus: Arc::new(RwLock::new(EventBus::new())),
            timestamps,
            closed: Arc::new(Notify::new()),
        }
    }

    pub fn from_config(config: &LayeredConfig) -> Self {
        Self::new(TimestampStore::new(config.timestamp_path.value.clone()))
    }

    fn bus_mut(&self) -> RwLockWriteGuard<'_, EventBus<StreamEvent>> {
        self.bus.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a handler for an event type
    pub fn on<F>(&self, kind: impl Into<String>, handler: F) -> Subscription
    where
        F: Fn(&StreamEvent) + Send + Sync + 'static,
    {
        self.bus_mut().on(kind, handler)
    }

    pub fn off(&self, subscription: &Subscription) -> bool {
        self.bus_mut().off(subscription)
    }

    pub fn off_all(&self, kind: &str) -> usize {
        self.bus_mut().off_all(kind)
    }

    /// Trigger an event type directly, bypassing the stream.
    ///
    /// Handlers run on a snapshot taken under the registry lock and may
    /// themselves call `on` or `off`; changes apply from the next event.
    pub fn trigger(&self, kind: &str, event: &StreamEvent) -> usize {
        let handlers = self.bus.read().unwrap_or_else(PoisonError::into_inner).handlers(kind);
        for handler in &handlers {
            handler(event);
        }
        handlers.len()
    }

    /// Stream URL, resuming after the persisted timestamp when there is one
    pub fn stream_url(&self, gateway: &RestGateway) -> Result<reqwest::Url> {
        match self.timestamps.load().filter(|since| *since > 0) {
            Some(since) => gateway.url("notification/stream", &[("since", since.to_string())]),
            None => gateway.url("notification/stream", &[]),
        }
    }

    /// Decode one `data` payload and trigger handlers for its type.
    ///
    /// A payload that is not a JSON object with a string `type` is logged and
    /// surfaced as a [`STREAM_ERROR_EVENT`]; it never fails the stream.
    pub fn dispatch_message(&self, data: &str) -> usize {
        let event = match serde_json::from_str::<StreamEvent>(data) {
            Ok(event) => event,
            Err(e) => {
                tracing::error!("Invalid JSON from event stream: {}, {}", data, e);
                let error = StreamEvent::stream_error(data, &e);
                return self.trigger(STREAM_ERROR_EVENT, &error);
            }
        };

        let timestamp = event
            .payload
            .get(EVENT_TIME_FIELD)
            .and_then(Value::as_i64)
            .unwrap_or_else(|| chrono::Utc::now().timestamp());
        self.timestamps.save(timestamp);

        self.trigger(&event.kind, &event)
    }

    /// Consume the stream until the server ends it or [`close`](Self::close)
    /// is called.
    pub async fn run(&self, gateway: &RestGateway) -> Result<()> {
        let url = self.stream_url(gateway)?;
        tracing::info!("Opening event stream at {}", url);

        let mut response = gateway.open_stream(url).await?;
        let mut decoder = SseDecoder::new();

        loop {
            let chunk = tokio::select! {
                _ = self.closed.notified() => {
                    tracing::info!("Event stream closed");
                    return Ok(());
                }
                chunk = response.chunk() => chunk.map_err(|e| ExplorerError::StreamError {
                    reason: format!("Failed to read event stream: {}", e),
                })?,
            };

            let Some(chunk) = chunk else {
                tracing::info!("Event stream ended by server");
                return Ok(());
            };

            for frame in decoder.feed(&chunk) {
                self.dispatch_message(&frame.data);
            }
        }
    }

    /// Stop a running [`run`](Self::run)
    pub fn close(&self) {
        self.closed.notify_one();
    }
}

impl std::fmt::Debug for EventStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventStream").field("timestamps", &self.timestamps).finish()
    }
}
