//! Protocol failures of the calculate endpoint.

use axum::http::StatusCode;

/// Failure that ends a request before a calculation response is produced.
///
/// The display text is both the `text/plain` response body and the `error`
/// recorded in the request's log event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum HandlerError {
    #[error("Invalid request method")]
    MethodNotAllowed,

    #[error("Invalid request body")]
    InvalidBody,

    #[error("Error encoding response")]
    Encode,
}

impl HandlerError {
    pub fn status(&self) -> StatusCode {
        match self {
            HandlerError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            HandlerError::InvalidBody => StatusCode::BAD_REQUEST,
            HandlerError::Encode => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
