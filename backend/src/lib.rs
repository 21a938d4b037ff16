//! # Calc Service
//!
//! Arithmetic evaluation over HTTP with asynchronous analytics logging.
//!
//! The service accepts `POST /calculate` requests carrying an arithmetic
//! expression, evaluates it, and answers with a JSON result. Every request
//! also produces one structured [`models::LogEvent`] that is handed to a
//! durable message queue on a background task, so analytics consumers can
//! follow traffic without the request path ever waiting on the broker.
//!
//! ## Architecture
//!
//! - [`evaluator`]: expression evaluation behind the [`evaluator::Evaluator`] trait
//! - [`models`]: request, response and log event data types
//! - [`services`]: numeric classification, request identity, per-request log recording
//! - [`publisher`]: event publishers (RabbitMQ, in-memory) and the background dispatcher
//! - [`config`]: TOML file + environment configuration
//! - [`http`]: axum router, handlers and the logging response body
//!
//! ```text
//! HTTP request ─► handler ─► evaluator ─► classify ─► JSON response
//!                    │
//!                    └─► RequestLog ──(body written)──► EventDispatcher ─► EventPublisher
//! ```

pub mod config;

pub mod evaluator;

pub mod models;

pub mod publisher;

pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
