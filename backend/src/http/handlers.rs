//! HTTP handlers.

use axum::{
    body::{Body, Bytes},
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::Response,
    Json,
};
use tracing::debug;

use super::body::LoggedBody;
use super::dto::HealthResponse;
use super::error::HandlerError;
use super::state::AppState;
use crate::models::CalculationRequest;
use crate::services::{evaluate_request, RequestLog};

const JSON_CONTENT_TYPE: &str = "application/json";
const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// `/calculate`, any method.
///
/// Every call produces exactly one log event, whatever the outcome: the
/// event travels with the response body and is dispatched once the body has
/// been handed to the transport (or dropped).
pub async fn calculate(State(state): State<AppState>, request: Request) -> Response {
    let mut log = RequestLog::begin(&state.identity);
    let head_only = request.method() == Method::HEAD;

    let (status, content_type, payload) = match process(&state, request, &mut log).await {
        Ok(payload) => (StatusCode::OK, JSON_CONTENT_TYPE, payload),
        Err(err) => {
            let status = err.status();
            log.record_failure(err.to_string(), status.as_u16());
            (status, TEXT_CONTENT_TYPE, Bytes::from(format!("{}\n", err)))
        }
    };

    let payload = if head_only { Bytes::new() } else { payload };
    let body = LoggedBody::new(payload, log, state.dispatcher.clone());

    let mut response = Response::new(Body::new(body));
    *response.status_mut() = status;
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    if status == StatusCode::METHOD_NOT_ALLOWED {
        headers.insert(header::ALLOW, HeaderValue::from_static("POST"));
    }
    response
}

async fn process(
    state: &AppState,
    request: Request,
    log: &mut RequestLog,
) -> Result<Bytes, HandlerError> {
    if request.method() != Method::POST {
        return Err(HandlerError::MethodNotAllowed);
    }

    let bytes = axum::body::to_bytes(request.into_body(), state.max_body_bytes)
        .await
        .map_err(|e| {
            debug!(error = %e, "Failed to read request body");
            HandlerError::InvalidBody
        })?;

    let calculation = CalculationRequest::decode_first(&bytes).map_err(|e| {
        debug!(error = %e, "Failed to decode request body");
        HandlerError::InvalidBody
    })?;
    log.record_request(&calculation);

    let response = evaluate_request(state.evaluator.as_ref(), &calculation);
    let payload = serde_json::to_vec(&response).map_err(|e| {
        debug!(error = %e, "Failed to encode response");
        HandlerError::Encode
    })?;
    log.record_response(&response, StatusCode::OK.as_u16());

    Ok(Bytes::from(payload))
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        server: state.identity.server_id().to_string(),
        requests: state.identity.last_request_num(),
        publisher: state.dispatcher.publisher_kind().to_string(),
    })
}
