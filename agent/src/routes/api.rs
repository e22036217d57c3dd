use std::sync::Arc;

use axum::{Router, routing::get};
use http::{HeaderValue, Method, header::CONTENT_TYPE};
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::handlers::{api, connection};
use crate::state::AppState;

/// Create the token server router with CORS, tracing and security headers
pub fn create_api_router(state: Arc<AppState>) -> Router {
    let cors_layer = cors_layer(state.config.cors_allowed_origins.as_deref());

    Router::new()
        .route("/", get(api::root))
        .route("/api/connection-details", get(connection::connection_details))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .layer(SetResponseHeaderLayer::overriding(
            http::header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
}

/// Build the CORS layer from a comma-separated origin list or "*"
pub fn cors_layer(origins: Option<&str>) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]);

    match origins.map(str::trim) {
        Some("*") => base.allow_origin(Any),
        Some(list) => {
            let origins: Vec<HeaderValue> = list
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            base.allow_origin(origins)
        }
        None => {
            info!("CORS not configured, defaulting to same-origin only");
            base
        }
    }
}
