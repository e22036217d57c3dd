//! Transport seam for participant discovery and outbound RPC.
//!
//! Tool handlers only need two things from a room: the identities of the
//! remote participants currently connected, and a way to call a method on one
//! of them. [`RoomRpc`] captures exactly that so the handlers can run against
//! a live LiveKit room, the console frontend, or a test double.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

/// Extra time granted on top of the RPC response timeout before the caller
/// gives up on the transport itself.
pub const RPC_GUARD_MARGIN: Duration = Duration::from_secs(2);

/// A single outbound RPC invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcRequest {
    /// Identity of the remote participant that handles the method
    pub destination_identity: String,
    /// Method name registered by the remote participant
    pub method: String,
    /// JSON-encoded request body
    pub payload: String,
    /// How long the remote side has to answer
    pub response_timeout: Duration,
}

/// Errors surfaced by an RPC transport.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RpcCallError {
    /// The remote participant did not answer within the response timeout
    #[error("RPC response timed out")]
    ResponseTimeout,

    /// The destination left the room or never joined it
    #[error("RPC recipient '{0}' is not connected")]
    RecipientDisconnected(String),

    /// The local room connection is gone
    #[error("room is disconnected")]
    RoomDisconnected,

    /// Any other error reported by the remote handler or the transport
    #[error("RPC error {code}: {message}")]
    Remote { code: u32, message: String },
}

/// Minimal view of a room needed to talk to the frontend.
#[async_trait]
pub trait RoomRpc: Send + Sync {
    /// Identities of all remote participants currently in the room.
    fn remote_participant_identities(&self) -> Vec<String>;

    /// Invoke `request.method` on the destination participant and return the
    /// raw response payload.
    async fn perform_rpc(&self, request: RpcRequest) -> Result<String, RpcCallError>;
}

/// Perform an RPC, bounding the wait even when the transport never honours
/// its own response timeout.
pub async fn perform_with_deadline(
    rpc: &dyn RoomRpc,
    request: RpcRequest,
) -> Result<String, RpcCallError> {
    let deadline = request.response_timeout + RPC_GUARD_MARGIN;
    let method = request.method.clone();

    match tokio::time::timeout(deadline, rpc.perform_rpc(request)).await {
        Ok(result) => result,
        Err(_) => {
            warn!(method = %method, ?deadline, "RPC transport did not return before deadline");
            Err(RpcCallError::ResponseTimeout)
        }
    }
}

/// Pick the participant that should receive frontend RPCs.
///
/// Identities are considered in sorted order. When a prefix is given, the
/// first identity carrying it wins; otherwise the first identity is used.
pub fn select_participant(mut identities: Vec<String>, prefix: Option<&str>) -> Option<String> {
    identities.sort();

    if let Some(prefix) = prefix.filter(|p| !p.is_empty()) {
        if let Some(found) = identities.iter().find(|id| id.starts_with(prefix)) {
            return Some(found.clone());
        }
    }

    identities.into_iter().next()
}
