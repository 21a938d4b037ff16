//! Process identity and request numbering.

use parking_lot::Mutex;
use uuid::Uuid;

/// Identity of one running service instance.
///
/// Holds the server id stamped on every log event and the request counter.
/// One instance is created at startup and shared by `Arc` with every handler.
#[derive(Debug)]
pub struct ServerIdentity {
    server_id: String,
    counter: Mutex<u64>,
}

impl ServerIdentity {
    /// Create an identity with a fresh random server id.
    pub fn new() -> Self {
        Self::with_server_id(Uuid::new_v4().to_string())
    }

    pub fn with_server_id(server_id: impl Into<String>) -> Self {
        Self {
            server_id: server_id.into(),
            counter: Mutex::new(0),
        }
    }

    pub fn server_id(&self) -> &str {
        &self.server_id
    }

    /// Allocate the next request number. The first call returns 1.
    pub fn next_request_num(&self) -> u64 {
        let mut counter = self.counter.lock();
        *counter += 1;
        *counter
    }

    /// Most recently allocated request number (0 before any request).
    pub fn last_request_num(&self) -> u64 {
        *self.counter.lock()
    }
}

impl Default for ServerIdentity {
    fn default() -> Self {
        Self::new()
    }
}
