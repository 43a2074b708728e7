//! Client-facing API errors.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::combiner::CombineError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid trace id '{0}': expected 1 to 32 hex characters")]
    InvalidTraceId(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("trace not found")]
    TraceNotFound,

    #[error("failed to combine {kind} results: {source}")]
    Combine {
        kind: &'static str,
        #[source]
        source: CombineError,
    },
}

impl ApiError {
    pub fn combine(kind: &'static str, source: CombineError) -> Self {
        ApiError::Combine { kind, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidTraceId(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::TraceNotFound => StatusCode::NOT_FOUND,
            ApiError::Combine { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Federated request failed");
        }
        (status, self.to_string()).into_response()
    }
}
