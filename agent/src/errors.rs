//! HTTP error type for the token server

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::config::ConfigError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// Server-side configuration is incomplete
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to create access token: {0}")]
    Token(#[from] livekit_api::access_token::AccessTokenError),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        error!(status = %status, error = %self, "Request failed");
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}
