//! Per-request log event recording.
//!
//! A [`RequestLog`] is opened as the very first step of handling a request and
//! follows it until the response has been handed to the transport. Calling
//! [`RequestLog::finish`] consumes it, so an event can only be completed and
//! dispatched once.

use chrono::Utc;
use std::time::Instant;

use crate::models::{CalculationRequest, CalculationResponse, LogEvent};
use crate::services::identity::ServerIdentity;

/// HTTP status recorded when the response could not be written.
const WRITE_FAILURE_STATUS: u16 = 500;

#[derive(Debug)]
pub struct RequestLog {
    started: Instant,
    event: LogEvent,
}

impl RequestLog {
    /// Fix the start time and allocate the request number.
    pub fn begin(identity: &ServerIdentity) -> Self {
        let started = Instant::now();
        let started_at = Utc::now();
        let request_num = identity.next_request_num();

        Self {
            started,
            event: LogEvent::new(identity.server_id(), request_num, started_at),
        }
    }

    /// Event as recorded so far.
    pub fn event(&self) -> &LogEvent {
        &self.event
    }

    pub fn record_request(&mut self, request: &CalculationRequest) {
        self.event.username = request.username.clone();
        self.event.problem = request.problem.clone();
        self.event.id = request.id.clone();
    }

    pub fn record_response(&mut self, response: &CalculationResponse, status: u16) {
        self.event.success = response.success;
        self.event.error = response.error.clone();
        self.event.answer = response.answer;
        self.event.http_return_code = status;
    }

    /// Record a protocol failure answered with `status`.
    pub fn record_failure(&mut self, error: impl Into<String>, status: u16) {
        self.event.error = error.into();
        self.event.http_return_code = status;
    }

    /// Record that the response body never reached the transport.
    pub fn record_write_failure(&mut self, reason: &str) {
        self.event.success = false;
        self.event.answer = 0.0;
        self.event.error = format!("Error writing response: {}", reason);
        self.event.http_return_code = WRITE_FAILURE_STATUS;
    }

    /// Stamp the elapsed time and release the event for dispatch.
    pub fn finish(mut self) -> LogEvent {
        let elapsed = self.started.elapsed().as_millis();
        self.event.duration_ms = i64::try_from(elapsed).unwrap_or(i64::MAX);
        self.event
    }
}
