//! Illustration display over the frontend RPC channel.
//!
//! The assistant can put a diagram on the student's screen, or clear it, by
//! calling `client.showIllustration` on the frontend participant:
//!
//! ```text
//! request:  {"state": "show", "image_url": "https://..."}  |  {"state": "hidden"}
//! response: {"ok": true}  |  {"ok": false, "error": "..."}
//! ```
//!
//! The response timeout defaults to two seconds. Longer RPC timeouts have
//! triggered a duration overflow inside the native transport on some
//! platforms.

mod catalog;
mod error;
mod payload;

use std::time::Duration;

use tracing::{debug, info};

use crate::livekit::{RoomRpc, RpcCallError, RpcRequest, perform_with_deadline};

pub use catalog::{Illustration, IllustrationCatalog};
pub use error::IllustrationError;
pub use payload::{IllustrationPayload, IllustrationResponse, IllustrationState, validate_image_url};

/// RPC method registered by the frontend.
pub const SHOW_ILLUSTRATION_METHOD: &str = "client.showIllustration";

/// Default time the frontend has to answer.
pub const DEFAULT_ILLUSTRATION_TIMEOUT: Duration = Duration::from_secs(2);

/// Send `payload` to `destination_identity` and interpret the answer.
///
/// Returns the parsed response when the frontend accepted the request. A
/// `{"ok": false}` answer becomes [`IllustrationError::Rejected`].
pub async fn send_illustration(
    rpc: &dyn RoomRpc,
    destination_identity: &str,
    payload: &IllustrationPayload,
    response_timeout: Duration,
) -> Result<IllustrationResponse, IllustrationError> {
    let body = payload.to_json()?;
    info!(
        destination = %destination_identity,
        state = %payload.state,
        payload = %body,
        "Sending illustration payload"
    );

    let request = RpcRequest {
        destination_identity: destination_identity.to_string(),
        method: SHOW_ILLUSTRATION_METHOD.to_string(),
        payload: body,
        response_timeout,
    };

    let raw = perform_with_deadline(rpc, request)
        .await
        .map_err(|e| match e {
            RpcCallError::ResponseTimeout => IllustrationError::Timeout(response_timeout),
            other => IllustrationError::Transport(other),
        })?;

    let response = IllustrationResponse::parse(&raw)?;
    debug!(?response, "Illustration RPC answered");

    if response.ok {
        Ok(response)
    } else {
        Err(IllustrationError::Rejected(response.error_message().to_string()))
    }
}

/// Build and send a payload for `state`, validating the image URL first.
pub async fn set_illustration_state(
    rpc: &dyn RoomRpc,
    destination_identity: &str,
    state: IllustrationState,
    image_url: Option<&str>,
    response_timeout: Duration,
) -> Result<IllustrationResponse, IllustrationError> {
    let payload = IllustrationPayload::new(state, image_url)?;
    send_illustration(rpc, destination_identity, &payload, response_timeout).await
}
