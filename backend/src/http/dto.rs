//! Data transfer objects for endpoints other than `/calculate`.

use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    /// Server id stamped on log events
    pub server: String,
    /// Requests numbered so far
    pub requests: u64,
    /// Publisher backend (`amqp`, `memory`, `disabled`)
    pub publisher: String,
}
