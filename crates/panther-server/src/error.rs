use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use panther_sdk::ProofError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Proof(#[from] ProofError),

    #[error("invalid api key")]
    Unauthorized,

    #[error("invalid request: {0}")]
    BadRequest(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServerError {
    /// Stable error kind reported in response bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Proof(e) => e.kind(),
            Self::Unauthorized => "unauthorized",
            Self::BadRequest(_) => "invalid_request",
            Self::Config(_) => "configuration_error",
            Self::Io(_) | Self::Internal(_) => "internal",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.kind() {
            "invalid_request" => StatusCode::BAD_REQUEST,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "encoding_error" => StatusCode::UNPROCESSABLE_ENTITY,
            "ledger_unavailable" => StatusCode::BAD_GATEWAY,
            "configuration_error" | "guideline_unavailable" | "storage_degraded" => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(kind = self.kind(), error = %self, "request failed");
        }
        let body = json!({
            "error": {
                "kind": self.kind(),
                "message": self.to_string(),
            }
        });
        (status, Json(body)).into_response()
    }
}

pub type ServerResult<T> = Result<T, ServerError>;
