//! Error types for event publishing.

use std::time::Duration;

/// Result type for publisher operations
pub type PublishResult<T> = Result<T, PublishError>;

/// Error type for publisher operations.
///
/// Broker errors are carried as text so the type does not depend on which
/// publisher backends are compiled in.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("failed to marshal log event: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to connect to broker: {0}")]
    Connection(String),

    #[error("failed to open a channel: {0}")]
    Channel(String),

    #[error("failed to declare queue '{queue}': {message}")]
    QueueDeclare { queue: String, message: String },

    #[error("failed to publish a message: {0}")]
    Publish(String),

    #[error("broker rejected the message")]
    NotConfirmed,

    #[error("publish timed out after {0:?}")]
    Timeout(Duration),

    #[error("publisher is closed")]
    Closed,

    #[error("publisher configuration error: {0}")]
    Configuration(String),
}
