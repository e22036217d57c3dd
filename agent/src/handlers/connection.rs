//! Connection details for the web frontend
//!
//! Each request mints a fresh identity and room so that every browser tab
//! lands in its own conversation with the agent.

use std::sync::Arc;

use axum::{Json, extract::State};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppResult;
use crate::state::AppState;

pub const PARTICIPANT_IDENTITY_PREFIX: &str = "voice_assistant_user_";
pub const ROOM_NAME_PREFIX: &str = "voice_assistant_room_";

/// Everything the frontend needs to join a room
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionDetails {
    pub server_url: String,
    pub room_name: String,
    pub participant_name: String,
    pub participant_token: String,
}

fn random_suffix() -> u32 {
    rand::rng().random_range(0..10_000)
}

pub async fn connection_details(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ConnectionDetails>> {
    let server_url = state.config.livekit_url()?.to_string();
    let issuer = state.config.token_issuer()?;

    let identity = format!("{PARTICIPANT_IDENTITY_PREFIX}{}", random_suffix());
    let room_name = format!("{ROOM_NAME_PREFIX}{}", random_suffix());
    // The frontend shows the identity as its display name
    let participant_token = issuer.participant_token(&identity, &identity, &room_name)?;

    info!(identity = %identity, room = %room_name, "Issued connection details");

    Ok(Json(ConnectionDetails {
        server_url,
        room_name,
        participant_name: identity,
        participant_token,
    }))
}
