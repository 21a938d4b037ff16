//! Structured analytics record describing one handled request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::number::serialize_answer;

/// Wire format of [`LogEvent::start_time`].
pub const START_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// One request's identity, timing and outcome.
///
/// Serialized field names are part of the queue contract consumed by
/// analytics; do not rename them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEvent {
    pub username: String,
    pub problem: String,
    pub id: String,
    /// Identifier of the process instance that handled the request
    pub server: String,
    /// Per-process sequence number, starting at 1
    pub request_num: u64,
    /// UTC start time, `YYYY-MM-DDTHH:MM:SS.mmmZ`
    pub start_time: String,
    /// Start time in milliseconds since the Unix epoch
    pub start_time_ms: i64,
    pub duration_ms: i64,
    pub success: bool,
    pub error: String,
    #[serde(serialize_with = "serialize_answer")]
    pub answer: f64,
    pub http_return_code: u16,
}

impl LogEvent {
    /// Create an event with identity and start time fixed and every outcome
    /// field at its empty value.
    pub fn new(server: impl Into<String>, request_num: u64, started_at: DateTime<Utc>) -> Self {
        Self {
            username: String::new(),
            problem: String::new(),
            id: String::new(),
            server: server.into(),
            request_num,
            start_time: format_start_time(&started_at),
            start_time_ms: started_at.timestamp_millis(),
            duration_ms: 0,
            success: false,
            error: String::new(),
            answer: 0.0,
            http_return_code: 0,
        }
    }
}

pub fn format_start_time(time: &DateTime<Utc>) -> String {
    time.format(START_TIME_FORMAT).to_string()
}

impl fmt::Display for LogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LogEvent{{Username: {:?}, Problem: {:?}, ID: {:?}, Server: {}, RequestNum: {}, \
             StartTime: {}, StartTimeMs: {}, DurationMs: {}, Success: {}, Error: {:?}, \
             Answer: {:.6}, HTTPReturnCode: {}}}",
            self.username,
            self.problem,
            self.id,
            self.server,
            self.request_num,
            self.start_time,
            self.start_time_ms,
            self.duration_ms,
            self.success,
            self.error,
            self.answer,
            self.http_return_code,
        )
    }
}
