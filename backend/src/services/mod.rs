//! Service layer between the HTTP handlers and the evaluator / publisher.
//!
//! Nothing here knows about HTTP types; statuses are plain `u16` codes so the
//! same logic can be driven from tests or other front ends.

pub mod calculation;

pub mod identity;

pub mod request_log;

pub use calculation::{classify_answer, evaluate_request, NumericFault};
pub use identity::ServerIdentity;
pub use request_log::RequestLog;
