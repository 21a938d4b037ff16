//! Log event publishing.
//!
//! Publishers deliver one [`LogEvent`] at a time to a durable sink. The
//! request path never calls a publisher directly; it goes through the
//! [`EventDispatcher`], which runs each publish on a background task.

pub mod dispatcher;
pub mod error;
pub mod memory;

#[cfg(feature = "amqp-publisher")]
pub mod amqp;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::PublisherSettings;
use crate::models::LogEvent;

#[cfg(feature = "amqp-publisher")]
pub use amqp::AmqpPublisher;
pub use dispatcher::{DispatchStats, EventDispatcher};
pub use error::{PublishError, PublishResult};
pub use memory::MemoryPublisher;

/// Sink for log events.
///
/// Implementations must tolerate concurrent `publish` calls from many tasks.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Short backend name used in logs and the health report.
    fn kind(&self) -> &'static str;

    /// Deliver one event. Returns once the sink has accepted it.
    async fn publish(&self, event: &LogEvent) -> PublishResult<()>;

    /// Release connections. Later publishes may fail.
    async fn close(&self) -> PublishResult<()>;
}

/// JSON payload of a log event as it goes on the wire.
pub(crate) fn encode_event(event: &LogEvent) -> PublishResult<Vec<u8>> {
    Ok(serde_json::to_vec(event)?)
}

/// Publisher backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublisherKind {
    /// RabbitMQ durable queue
    Amqp,
    /// Process memory
    Memory,
    /// Events are dropped
    Disabled,
}

impl FromStr for PublisherKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "amqp" | "rabbitmq" => Ok(Self::Amqp),
            "memory" | "local" => Ok(Self::Memory),
            "disabled" | "none" | "off" => Ok(Self::Disabled),
            _ => Err(format!("Unknown publisher kind: {}", s)),
        }
    }
}

impl fmt::Display for PublisherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Amqp => "amqp",
            Self::Memory => "memory",
            Self::Disabled => "disabled",
        };
        f.write_str(name)
    }
}

/// Builds the configured publisher.
pub struct PublisherFactory;

impl PublisherFactory {
    /// Create a publisher of the given kind.
    ///
    /// Returns `Ok(None)` for [`PublisherKind::Disabled`].
    ///
    /// # Errors
    /// Fails when the broker cannot be reached, or when `amqp` is requested
    /// from a build without the `amqp-publisher` feature.
    pub async fn create(
        kind: PublisherKind,
        settings: &PublisherSettings,
    ) -> PublishResult<Option<Arc<dyn EventPublisher>>> {
        match kind {
            PublisherKind::Amqp => {
                #[cfg(feature = "amqp-publisher")]
                {
                    let publisher = AmqpPublisher::connect(settings).await?;
                    Ok(Some(Arc::new(publisher) as Arc<dyn EventPublisher>))
                }
                #[cfg(not(feature = "amqp-publisher"))]
                {
                    let _ = settings;
                    Err(PublishError::Configuration(
                        "AMQP publisher feature not enabled".to_string(),
                    ))
                }
            }
            PublisherKind::Memory => Ok(Some(Self::create_memory())),
            PublisherKind::Disabled => Ok(None),
        }
    }

    pub fn create_memory() -> Arc<dyn EventPublisher> {
        Arc::new(MemoryPublisher::new())
    }

    /// Create the publisher selected by `settings`.
    pub async fn from_settings(
        settings: &PublisherSettings,
    ) -> PublishResult<Option<Arc<dyn EventPublisher>>> {
        Self::create(settings.resolved_kind(), settings).await
    }
}
