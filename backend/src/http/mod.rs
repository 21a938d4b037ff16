//! HTTP front end.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  HTTP Layer (axum handlers)                               │
//! │  - Method and body checks                                 │
//! │  - JSON encoding, text/plain protocol errors              │
//! │  - LoggedBody: emits the LogEvent once the body is sent   │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Service Layer (services/)                                │
//! │  - Evaluation and numeric classification                  │
//! │  - Request numbering, per-request log recording           │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Publisher Layer (publisher/)                             │
//! │  - Background dispatcher                                  │
//! │  - AmqpPublisher / MemoryPublisher                        │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod body;

pub mod dto;

pub mod error;

pub mod handlers;

pub mod router;

pub mod state;

pub use router::create_router;

pub use state::AppState;
