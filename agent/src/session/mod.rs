//! Per-conversation state shared between tool handlers and inbound RPC
//! methods.
//!
//! An [`AgentSession`] optionally holds the room transport, the student's
//! [`UserData`], and a broadcast channel of [`SessionEvent`]s the voice
//! pipeline can subscribe to.

mod userdata;

use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, MutexGuard};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::debug;

use crate::illustration::DEFAULT_ILLUSTRATION_TIMEOUT;
use crate::livekit::{RoomRpc, select_participant};

pub use userdata::{Component, UserData, UserInfo};

const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Why a frontend participant could not be resolved.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ParticipantError {
    #[error("no room is attached to the session")]
    NoRoom,
    #[error("no remote participants in the room")]
    NoParticipant,
}

/// Notifications emitted by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The agent should say something in response to a frontend action
    ReplyRequested { instructions: String },
    /// A component changed visibility
    ComponentToggled { id: String, is_showed: bool },
}

/// Knobs for how the session talks to the frontend.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Identity prefix used to pick the frontend among remote participants
    pub frontend_identity_prefix: Option<String>,
    /// Response timeout for outbound RPCs
    pub rpc_timeout: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            frontend_identity_prefix: None,
            rpc_timeout: DEFAULT_ILLUSTRATION_TIMEOUT,
        }
    }
}

pub struct AgentSession {
    room: Option<Arc<dyn RoomRpc>>,
    userdata: Mutex<UserData>,
    options: SessionOptions,
    events: broadcast::Sender<SessionEvent>,
}

impl AgentSession {
    pub fn new(options: SessionOptions) -> Self {
        let (events, _) = broadcast::channel(DEFAULT_EVENT_CAPACITY);
        Self {
            room: None,
            userdata: Mutex::new(UserData::default()),
            options,
            events,
        }
    }

    pub fn with_room(mut self, room: Arc<dyn RoomRpc>) -> Self {
        self.room = Some(room);
        self
    }

    pub fn room(&self) -> Option<&Arc<dyn RoomRpc>> {
        self.room.as_ref()
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn rpc_timeout(&self) -> Duration {
        self.options.rpc_timeout
    }

    /// Lock the user data. Never hold the guard across an `.await`.
    pub fn userdata(&self) -> MutexGuard<'_, UserData> {
        self.userdata.lock()
    }

    /// Resolve the room and the identity of the frontend participant at call
    /// time.
    pub fn resolve_frontend(&self) -> Result<(Arc<dyn RoomRpc>, String), ParticipantError> {
        let room = self.room.clone().ok_or(ParticipantError::NoRoom)?;
        let identity = select_participant(
            room.remote_participant_identities(),
            self.options.frontend_identity_prefix.as_deref(),
        )
        .ok_or(ParticipantError::NoParticipant)?;

        debug!(identity = %identity, "Resolved frontend participant");
        Ok((room, identity))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Publish an event. Having no subscribers is not an error.
    pub fn emit(&self, event: SessionEvent) {
        if self.events.send(event).is_err() {
            debug!("No session event subscribers");
        }
    }
}
