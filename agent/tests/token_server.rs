//! Token Server Tests
//!
//! Exercises the HTTP router in-process with `tower::ServiceExt::oneshot` and
//! decodes the issued LiveKit tokens to check their claims.

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde_json::Value;
use tower::util::ServiceExt;

use vyna_agent::{AgentConfig, handlers::ConnectionDetails, routes, state::AppState};

const API_KEY: &str = "devkey";
const API_SECRET: &str = "test-secret-that-is-long-enough-for-hs256";

fn configured() -> AgentConfig {
    let mut config = AgentConfig::default();
    config.livekit_url = Some("ws://localhost:7880".to_string());
    config.livekit_api_key = Some(API_KEY.to_string());
    config.livekit_api_secret = Some(API_SECRET.to_string());
    config
}

fn app(config: AgentConfig) -> Router {
    routes::api::create_api_router(AppState::new(config))
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

fn decode_claims(token: &str) -> Value {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_aud = false;
    decode::<Value>(
        token,
        &DecodingKey::from_secret(API_SECRET.as_bytes()),
        &validation,
    )
    .unwrap()
    .claims
}

#[tokio::test]
async fn test_root_message() {
    let (status, body) = get(app(AgentConfig::default()), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "LiveKit Agent API");
}

#[tokio::test]
async fn test_connection_details_issue_token() {
    let (status, body) = get(app(configured()), "/api/connection-details").await;
    assert_eq!(status, StatusCode::OK);

    let details: ConnectionDetails = serde_json::from_value(body).unwrap();
    assert_eq!(details.server_url, "ws://localhost:7880");

    let room_suffix: u32 = details
        .room_name
        .strip_prefix("voice_assistant_room_")
        .unwrap()
        .parse()
        .unwrap();
    assert!(room_suffix < 10_000);

    let claims = decode_claims(&details.participant_token);
    assert_eq!(claims["iss"], API_KEY);
    let identity = claims["sub"].as_str().unwrap();
    assert_eq!(details.participant_name, identity);
    assert_eq!(claims["name"], identity);

    let identity_suffix: u32 = identity
        .strip_prefix("voice_assistant_user_")
        .unwrap()
        .parse()
        .unwrap();
    assert!(identity_suffix < 10_000);

    let video = &claims["video"];
    assert_eq!(video["room"], Value::String(details.room_name.clone()));
    assert_eq!(video["roomJoin"], true);
    assert_eq!(video["canPublish"], true);
    assert_eq!(video["canSubscribe"], true);
    assert_eq!(video["canPublishData"], true);

    // 15 minute lifetime
    let ttl = claims["exp"].as_i64().unwrap() - claims["nbf"].as_i64().unwrap();
    assert!((890..=910).contains(&ttl), "unexpected ttl {ttl}");
}

#[tokio::test]
async fn test_participant_name_is_token_identity() {
    let (_, body) = get(app(configured()), "/api/connection-details").await;
    let first: ConnectionDetails = serde_json::from_value(body).unwrap();

    assert!(first.participant_name.starts_with("voice_assistant_user_"));
    let claims = decode_claims(&first.participant_token);
    assert_eq!(claims["sub"], Value::String(first.participant_name.clone()));
}

#[tokio::test]
async fn test_missing_livekit_url_is_500() {
    let mut config = configured();
    config.livekit_url = None;

    let (status, body) = get(app(config), "/api/connection-details").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["detail"], "LIVEKIT_URL is not defined");
}

#[tokio::test]
async fn test_missing_credentials_are_500() {
    let mut config = configured();
    config.livekit_api_key = None;
    let (status, body) = get(app(config), "/api/connection-details").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["detail"], "LIVEKIT_API_KEY is not defined");

    let mut config = configured();
    config.livekit_api_secret = None;
    let (status, body) = get(app(config), "/api/connection-details").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["detail"], "LIVEKIT_API_SECRET is not defined");
}

#[tokio::test]
async fn test_cors_allows_any_origin_by_default() {
    let response = app(configured())
        .oneshot(
            Request::builder()
                .uri("/")
                .header(header::ORIGIN, "http://localhost:3000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}

#[tokio::test]
async fn test_cors_restricted_origins() {
    let mut config = configured();
    config.cors_allowed_origins = Some("https://app.example.com".to_string());

    let response = app(config)
        .oneshot(
            Request::builder()
                .uri("/")
                .header(header::ORIGIN, "https://evil.example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none()
    );
}
