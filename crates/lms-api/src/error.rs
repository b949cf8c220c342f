use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use lms_core::i18n::Lang;
use serde_json::json;
use thiserror::Error;

/// Every failure a handler can return.
///
/// Variants carrying a `String` hold an already localized message that is
/// sent to the client as `{"error": message}`.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Authentication error: {0}")]
    Auth(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    /// The uploaded file broke a type or size rule.
    #[error("Upload rejected: {0}")]
    Upload(String),
    /// Object storage was unreachable or refused the request.
    #[error("Storage error: {0}")]
    Storage(String),
    /// The lesson completion transaction failed and was rolled back.
    #[error("Transaction error: {0}")]
    Transaction(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

impl ApiError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Upload(_) => StatusCode::BAD_REQUEST,
            Self::Auth(_) | Self::Jwt(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Storage(_) => StatusCode::BAD_GATEWAY,
            Self::Transaction(_) | Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            Self::Validation(m)
            | Self::Auth(m)
            | Self::Forbidden(m)
            | Self::NotFound(m)
            | Self::Conflict(m)
            | Self::Upload(m)
            | Self::Storage(m)
            | Self::Transaction(m) => m,
            Self::Database(e) => {
                tracing::error!(error = %e, "database error");
                Lang::default().messages().internal_error.to_string()
            }
            Self::Jwt(_) => Lang::default().messages().not_authorized.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
