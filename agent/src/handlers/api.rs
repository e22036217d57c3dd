use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: &'static str,
}

/// Liveness probe for the token server
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "LiveKit Agent API",
    })
}
