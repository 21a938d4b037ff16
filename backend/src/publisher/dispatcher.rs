//! Fire-and-forget dispatch of log events.
//!
//! [`EventDispatcher::dispatch`] hands a finished event to a detached task and
//! returns immediately. The task publishes it, logs the outcome, and drops
//! the event on failure. Tasks are tracked so shutdown can wait for in-flight
//! publishes before the publisher is closed.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::runtime::Handle;
use tokio_util::task::TaskTracker;
use tracing::{debug, warn};

use super::error::{PublishError, PublishResult};
use super::EventPublisher;
use crate::models::LogEvent;

/// Counters of dispatched events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchStats {
    pub published: u64,
    pub failed: u64,
    pub dropped: u64,
}

#[derive(Debug, Default)]
struct Counters {
    published: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
}

/// Background dispatcher in front of an optional publisher.
///
/// Without a publisher (event logging disabled) events are dropped on the
/// spot. Cloning is cheap and clones share tasks and counters.
#[derive(Clone)]
pub struct EventDispatcher {
    publisher: Option<Arc<dyn EventPublisher>>,
    tracker: TaskTracker,
    publish_timeout: Option<Duration>,
    counters: Arc<Counters>,
}

impl EventDispatcher {
    pub fn new(publisher: Arc<dyn EventPublisher>) -> Self {
        Self::from_publisher(Some(publisher))
    }

    /// Dispatcher that discards every event.
    pub fn disabled() -> Self {
        Self::from_publisher(None)
    }

    pub fn from_publisher(publisher: Option<Arc<dyn EventPublisher>>) -> Self {
        Self {
            publisher,
            tracker: TaskTracker::new(),
            publish_timeout: None,
            counters: Arc::new(Counters::default()),
        }
    }

    /// Bound each publish call; `None` lets publishes run to completion.
    pub fn with_publish_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.publish_timeout = timeout;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.publisher.is_some()
    }

    /// Name of the publisher backend, `disabled` when there is none.
    pub fn publisher_kind(&self) -> &'static str {
        self.publisher
            .as_ref()
            .map_or("disabled", |publisher| publisher.kind())
    }

    pub fn stats(&self) -> DispatchStats {
        DispatchStats {
            published: self.counters.published.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
            dropped: self.counters.dropped.load(Ordering::Relaxed),
        }
    }

    /// Hand `event` to a background task and return without waiting.
    ///
    /// Must be called from within a tokio runtime; otherwise the event is
    /// dropped with a warning.
    pub fn dispatch(&self, event: LogEvent) {
        let Some(publisher) = self.publisher.clone() else {
            self.counters.dropped.fetch_add(1, Ordering::Relaxed);
            debug!(request_num = event.request_num, "Event logging disabled, dropping log event");
            return;
        };

        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                warn!(request_num = event.request_num, error = %e, "No runtime to send log event");
                return;
            }
        };

        let counters = Arc::clone(&self.counters);
        let timeout = self.publish_timeout;
        self.tracker.spawn_on(
            async move {
                match publish_with_timeout(publisher.as_ref(), &event, timeout).await {
                    Ok(()) => {
                        counters.published.fetch_add(1, Ordering::Relaxed);
                        debug!("Sent log event: {}", event);
                    }
                    Err(e) => {
                        counters.failed.fetch_add(1, Ordering::Relaxed);
                        warn!(request_num = event.request_num, error = %e, "Error sending log event");
                    }
                }
            },
            &handle,
        );
    }

    /// Wait until every dispatched event has been published or dropped.
    pub async fn wait_idle(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }

    /// Wait for in-flight events, then close the publisher.
    pub async fn shutdown(&self) -> PublishResult<()> {
        self.tracker.close();
        self.tracker.wait().await;

        match &self.publisher {
            Some(publisher) => publisher.close().await,
            None => Ok(()),
        }
    }
}

async fn publish_with_timeout(
    publisher: &dyn EventPublisher,
    event: &LogEvent,
    timeout: Option<Duration>,
) -> PublishResult<()> {
    match timeout {
        Some(limit) => tokio::time::timeout(limit, publisher.publish(event))
            .await
            .unwrap_or(Err(PublishError::Timeout(limit))),
        None => publisher.publish(event).await,
    }
}
