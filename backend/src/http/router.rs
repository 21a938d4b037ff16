//! Router configuration for the HTTP API.

use axum::{
    routing::{any, get},
    Router,
};
use tower_http::trace::TraceLayer;

use super::handlers;
use super::state::AppState;

/// Create the application router.
///
/// `/calculate` accepts every method so that rejected methods still reach
/// the handler and are logged. Body limits are enforced by the handler for
/// the same reason.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/calculate", any(handlers::calculate))
        .route("/health", get(handlers::health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
