use std::sync::Arc;

use async_trait::async_trait;
use ::livekit::RoomError;
use ::livekit::prelude::*;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info};

use super::methods::{TOGGLE_COMPONENT_METHOD, handle_toggle_component};
use super::rpc::{RoomRpc, RpcCallError, RpcRequest};
use crate::session::AgentSession;

const CONNECTION_TIMEOUT: u32 = RpcErrorCode::ConnectionTimeout as u32;
const RESPONSE_TIMEOUT: u32 = RpcErrorCode::ResponseTimeout as u32;
const RECIPIENT_DISCONNECTED: u32 = RpcErrorCode::RecipientDisconnected as u32;
const RECIPIENT_NOT_FOUND: u32 = RpcErrorCode::RecipientNotFound as u32;

/// A connected LiveKit room, seen through [`RoomRpc`].
pub struct LiveKitRoom {
    room: Arc<Room>,
}

impl LiveKitRoom {
    /// Join the room at `url` with `token`.
    pub async fn connect(
        url: &str,
        token: &str,
    ) -> Result<(Self, UnboundedReceiver<RoomEvent>), RoomError> {
        let (room, events) = Room::connect(url, token, RoomOptions::default()).await?;
        info!(room = %room.name(), "Connected to LiveKit room");
        Ok((
            Self {
                room: Arc::new(room),
            },
            events,
        ))
    }

    pub fn name(&self) -> String {
        self.room.name()
    }

    /// Register the RPC methods the frontend calls on the agent.
    pub fn register_session_methods(&self, session: Arc<AgentSession>) {
        info!(method = TOGGLE_COMPONENT_METHOD, "Registering RPC method");
        self.room.local_participant().register_rpc_method(
            TOGGLE_COMPONENT_METHOD.to_string(),
            move |data: RpcInvocationData| {
                let session = session.clone();
                Box::pin(async move {
                    Ok(handle_toggle_component(
                        &session,
                        &data.caller_identity.0,
                        &data.payload,
                    ))
                })
            },
        );
    }

    pub async fn close(&self) -> Result<(), RoomError> {
        self.room.close().await
    }
}

#[async_trait]
impl RoomRpc for LiveKitRoom {
    fn remote_participant_identities(&self) -> Vec<String> {
        self.room
            .remote_participants()
            .keys()
            .map(|identity| identity.0.clone())
            .collect()
    }

    async fn perform_rpc(&self, request: RpcRequest) -> Result<String, RpcCallError> {
        debug!(
            destination = %request.destination_identity,
            method = %request.method,
            "Performing LiveKit RPC"
        );
        let destination = request.destination_identity.clone();

        self.room
            .local_participant()
            .perform_rpc(PerformRpcData {
                destination_identity: request.destination_identity,
                method: request.method,
                payload: request.payload,
                response_timeout: request.response_timeout,
            })
            .await
            .map_err(|e| map_rpc_error(e, destination))
    }
}

fn map_rpc_error(err: RpcError, destination: String) -> RpcCallError {
    match err.code {
        CONNECTION_TIMEOUT | RESPONSE_TIMEOUT => RpcCallError::ResponseTimeout,
        RECIPIENT_DISCONNECTED | RECIPIENT_NOT_FOUND => {
            RpcCallError::RecipientDisconnected(destination)
        }
        code => RpcCallError::Remote {
            code,
            message: err.message,
        },
    }
}
