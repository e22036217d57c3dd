//! `dev` mode: join a LiveKit room as the agent and drive tools from stdin

use std::sync::Arc;

use ::livekit::prelude::RoomEvent;
use anyhow::Context;
use tokio::io::BufReader;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info, warn};

use crate::config::{AgentConfig, ConfigError};
use crate::console::run_prompt;
use crate::livekit::LiveKitRoom;
use crate::session::AgentSession;
use crate::tools::Assistant;

/// Connect to the configured room and run until stdin closes or Ctrl+C.
pub async fn run_dev(config: &AgentConfig) -> anyhow::Result<()> {
    let url = config.livekit_url()?;
    let room_name = config
        .agent_room
        .as_deref()
        .ok_or(ConfigError::Missing("AGENT_ROOM"))?;
    let token = config
        .token_issuer()?
        .participant_token(&config.agent_identity, &config.agent_identity, room_name)
        .context("Failed to create agent token")?;

    let (room, events) = LiveKitRoom::connect(url, &token)
        .await
        .with_context(|| format!("Failed to join room {room_name}"))?;
    let room = Arc::new(room);

    let assistant = Assistant::new(config.illustration_catalog()?);
    let session = Arc::new(AgentSession::new(config.session_options()).with_room(room.clone()));
    room.register_session_methods(session.clone());

    let event_task = tokio::spawn(log_room_events(events));

    info!(
        room = %room.name(),
        identity = %config.agent_identity,
        "Agent ready, type 'help' for commands"
    );

    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();

    drive_session(
        run_prompt(&assistant, &session, stdin, stdout),
        async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        },
        async {
            event_task.abort();
            if let Err(e) = room.close().await {
                warn!(error = %e, "Error while leaving the room");
            }
            info!("Agent stopped");
        },
    )
    .await
}

/// Run `prompt` until it ends or `stop` fires, then always run `cleanup`
/// before reporting the prompt's outcome.
async fn drive_session<P, S, C>(prompt: P, stop: S, cleanup: C) -> anyhow::Result<()>
where
    P: Future<Output = std::io::Result<()>>,
    S: Future<Output = ()>,
    C: Future<Output = ()>,
{
    let outcome = tokio::select! {
        result = prompt => result.context("Prompt failed"),
        _ = stop => Ok(()),
    };

    cleanup.await;
    outcome
}

async fn log_room_events(mut events: UnboundedReceiver<RoomEvent>) {
    while let Some(event) = events.recv().await {
        match event {
            RoomEvent::ParticipantConnected(participant) => {
                info!(identity = %participant.identity().0, "Participant joined");
            }
            RoomEvent::ParticipantDisconnected(participant) => {
                info!(identity = %participant.identity().0, "Participant left");
            }
            RoomEvent::Disconnected { reason } => {
                warn!(?reason, "Disconnected from room");
                break;
            }
            other => debug!(event = ?other, "Room event"),
        }
    }
}
