use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Error, Debug)]
pub enum AppError {
    /// No session cookie, or the token failed verification.
    #[error("unauthorized access")]
    Unauthenticated,
    /// The path names a different account than the session token.
    #[error("Unauthorized Access")]
    Unauthorized,
    #[error("Forbidden Access! Admin Only Actions!")]
    Forbidden,
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Unauthenticated | AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = match &self {
            AppError::Internal(e) => {
                error!(error = %e, "request failed");
                json!({ "message": "An error occurred", "error": format!("{e:#}") })
            }
            other => {
                warn!(%status, reason = %other, "request rejected");
                json!({ "message": other.to_string() })
            }
        };

        (status, Json(body)).into_response()
    }
}
