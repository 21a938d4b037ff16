//! Application state for the HTTP server.

use std::sync::Arc;

use crate::evaluator::Evaluator;
use crate::publisher::EventDispatcher;
use crate::services::ServerIdentity;

/// Default limit for a `/calculate` request body.
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Expression evaluator
    pub evaluator: Arc<dyn Evaluator>,
    /// Server id and request counter
    pub identity: Arc<ServerIdentity>,
    /// Background log event dispatch
    pub dispatcher: EventDispatcher,
    /// Largest accepted request body; larger bodies are answered with 400
    pub max_body_bytes: usize,
}

impl AppState {
    /// Create a state with a fresh server identity.
    pub fn new(evaluator: Arc<dyn Evaluator>, dispatcher: EventDispatcher) -> Self {
        Self {
            evaluator,
            identity: Arc::new(ServerIdentity::new()),
            dispatcher,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    pub fn with_identity(mut self, identity: Arc<ServerIdentity>) -> Self {
        self.identity = identity;
        self
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }
}
