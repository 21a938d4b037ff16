//! In-memory event publisher for development and testing.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use super::error::{PublishError, PublishResult};
use super::{encode_event, EventPublisher};
use crate::models::LogEvent;

/// Publisher that keeps the most recent events in process memory.
///
/// Events go through the same JSON encoding as the broker publisher, and
/// the encoded payloads are kept alongside the events. Once `capacity`
/// events are held, each new event evicts the oldest one.
#[derive(Debug)]
pub struct MemoryPublisher {
    published: Mutex<VecDeque<(LogEvent, Vec<u8>)>>,
    capacity: usize,
    evicted: AtomicU64,
    failure: Mutex<Option<String>>,
    closed: AtomicBool,
}

impl MemoryPublisher {
    pub const DEFAULT_CAPACITY: usize = 10_000;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Keep at most `capacity` events (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            published: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
            capacity,
            evicted: AtomicU64::new(0),
            failure: Mutex::new(None),
            closed: AtomicBool::new(false),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of events dropped to stay within capacity.
    pub fn evicted(&self) -> u64 {
        self.evicted.load(Ordering::Relaxed)
    }

    /// Make every following publish fail with `message`.
    pub fn fail_with(&self, message: impl Into<String>) {
        *self.failure.lock() = Some(message.into());
    }

    pub fn clear_failure(&self) {
        *self.failure.lock() = None;
    }

    /// Retained events in publish order.
    pub fn events(&self) -> Vec<LogEvent> {
        self.published
            .lock()
            .iter()
            .map(|(event, _)| event.clone())
            .collect()
    }

    /// Retained payloads decoded as JSON values.
    pub fn payloads(&self) -> Vec<serde_json::Value> {
        self.published
            .lock()
            .iter()
            .filter_map(|(_, payload)| serde_json::from_slice(payload).ok())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.published.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.published.lock().is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Default for MemoryPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for MemoryPublisher {
    fn kind(&self) -> &'static str {
        "memory"
    }

    async fn publish(&self, event: &LogEvent) -> PublishResult<()> {
        if self.is_closed() {
            return Err(PublishError::Closed);
        }
        if let Some(message) = self.failure.lock().clone() {
            return Err(PublishError::Publish(message));
        }

        let payload = encode_event(event)?;
        let mut published = self.published.lock();
        if published.len() >= self.capacity {
            published.pop_front();
            self.evicted.fetch_add(1, Ordering::Relaxed);
        }
        published.push_back((event.clone(), payload));
        Ok(())
    }

    async fn close(&self) -> PublishResult<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
