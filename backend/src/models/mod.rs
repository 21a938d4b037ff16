//! Data types exchanged over HTTP and published to the event queue.

pub mod calculation;
pub mod log_event;
pub mod number;

pub use calculation::{CalculationRequest, CalculationResponse};
pub use log_event::{format_start_time, LogEvent, START_TIME_FORMAT};
