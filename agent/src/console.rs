//! Terminal driver for the assistant's tools
//!
//! `console` mode runs the tools against [`ConsoleFrontend`], which logs each
//! RPC and acknowledges it. `dev` mode reuses the same prompt against a live
//! LiveKit room.
//!
//! Input lines have the form `<tool> [json arguments]`, e.g.
//! `show_illustration {"illustration_key":"pythagoras"}`.

use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::broadcast;
use tracing::info;

use crate::handlers::connection::PARTICIPANT_IDENTITY_PREFIX;
use crate::livekit::{RoomRpc, RpcCallError, RpcRequest};
use crate::session::{AgentSession, SessionEvent};
use crate::tools::{Assistant, ToolCall};

const PROMPT: &str = "vyna> ";

/// Stand-in for the web frontend when no LiveKit room is available
#[derive(Debug)]
pub struct ConsoleFrontend {
    identity: String,
    latency: Duration,
    requests: Mutex<Vec<RpcRequest>>,
}

impl Default for ConsoleFrontend {
    fn default() -> Self {
        Self {
            identity: format!("{PARTICIPANT_IDENTITY_PREFIX}console"),
            latency: Duration::ZERO,
            requests: Mutex::new(Vec::new()),
        }
    }
}

impl ConsoleFrontend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every acknowledgement, to try out timeout handling
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<RpcRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl RoomRpc for ConsoleFrontend {
    fn remote_participant_identities(&self) -> Vec<String> {
        vec![self.identity.clone()]
    }

    async fn perform_rpc(&self, request: RpcRequest) -> Result<String, RpcCallError> {
        info!(
            method = %request.method,
            payload = %request.payload,
            "Frontend received RPC"
        );
        self.requests.lock().push(request.clone());

        if self.latency > request.response_timeout {
            tokio::time::sleep(request.response_timeout).await;
            return Err(RpcCallError::ResponseTimeout);
        }
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        Ok(r#"{"ok":true}"#.to_string())
    }
}

/// One line of prompt input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Empty,
    Help,
    Tools,
    Quit,
    Call(ToolCall),
}

/// Parse a prompt line. Arguments default to `{}` and must be a JSON object.
pub fn parse_command(line: &str) -> Result<ConsoleCommand, String> {
    let line = line.trim();
    let (name, rest) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    };

    match name {
        "" => Ok(ConsoleCommand::Empty),
        "help" | "?" => Ok(ConsoleCommand::Help),
        "tools" => Ok(ConsoleCommand::Tools),
        "quit" | "exit" => Ok(ConsoleCommand::Quit),
        tool => {
            let arguments = if rest.is_empty() { "{}" } else { rest };
            match serde_json::from_str::<serde_json::Value>(arguments) {
                Ok(serde_json::Value::Object(_)) => {
                    Ok(ConsoleCommand::Call(ToolCall::new(tool, arguments)))
                }
                Ok(_) => Err("arguments must be a JSON object".to_string()),
                Err(e) => Err(format!("invalid JSON arguments: {e}")),
            }
        }
    }
}

fn help_text() -> &'static str {
    "Commands:\n  \
     <tool> [json]   call a tool, e.g. show_illustration {\"illustration_key\":\"pythagoras\"}\n  \
     tools           list available tools\n  \
     help            show this message\n  \
     quit            leave\n"
}

fn describe_event(event: &SessionEvent) -> String {
    match event {
        SessionEvent::ReplyRequested { instructions } => format!("[reply requested] {instructions}"),
        SessionEvent::ComponentToggled { id, is_showed } => {
            format!("[component {id}] is_showed={is_showed}")
        }
    }
}

/// Read commands from `input` until EOF or `quit`, writing tool replies and
/// session events to `output`.
pub async fn run_prompt<R, W>(
    assistant: &Assistant,
    session: &AgentSession,
    input: R,
    mut output: W,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut events = session.subscribe();
    let mut lines = input.lines();

    output.write_all(PROMPT.as_bytes()).await?;
    output.flush().await?;

    while let Some(line) = lines.next_line().await? {
        match parse_command(&line) {
            Ok(ConsoleCommand::Empty) => {}
            Ok(ConsoleCommand::Help) => output.write_all(help_text().as_bytes()).await?,
            Ok(ConsoleCommand::Tools) => {
                for tool in assistant.tools() {
                    output.write_all(format!("  {}\n", tool.name()).as_bytes()).await?;
                }
            }
            Ok(ConsoleCommand::Quit) => break,
            Ok(ConsoleCommand::Call(call)) => {
                let reply = assistant.invoke(session, &call).await;
                output.write_all(format!("{}\n", reply.output).as_bytes()).await?;
            }
            Err(e) => output.write_all(format!("error: {e}\n").as_bytes()).await?,
        }

        loop {
            match events.try_recv() {
                Ok(event) => {
                    output
                        .write_all(format!("{}\n", describe_event(&event)).as_bytes())
                        .await?
                }
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => break,
            }
        }

        output.write_all(PROMPT.as_bytes()).await?;
        output.flush().await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::illustration::SHOW_ILLUSTRATION_METHOD;
    use crate::session::SessionOptions;
    use std::sync::Arc;

    #[test]
    fn test_parse_command_forms() {
        assert_eq!(parse_command("   ").unwrap(), ConsoleCommand::Empty);
        assert_eq!(parse_command("help").unwrap(), ConsoleCommand::Help);
        assert_eq!(parse_command("tools").unwrap(), ConsoleCommand::Tools);
        assert_eq!(parse_command("exit").unwrap(), ConsoleCommand::Quit);

        match parse_command("hide_illustration").unwrap() {
            ConsoleCommand::Call(call) => {
                assert_eq!(call.name, "hide_illustration");
                assert_eq!(call.arguments, "{}");
            }
            other => panic!("unexpected command: {other:?}"),
        }

        match parse_command(r#"set_user_data {"name":"Budi","age":12}"#).unwrap() {
            ConsoleCommand::Call(call) => {
                assert_eq!(call.name, "set_user_data");
                assert_eq!(call.arguments, r#"{"name":"Budi","age":12}"#);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_command_rejects_bad_arguments() {
        assert!(parse_command("show_illustration {oops").is_err());
        assert!(parse_command("show_illustration [1,2]").is_err());
    }

    #[tokio::test]
    async fn test_console_frontend_acknowledges() {
        let frontend = ConsoleFrontend::new();
        let reply = frontend
            .perform_rpc(RpcRequest {
                destination_identity: frontend.identity().to_string(),
                method: SHOW_ILLUSTRATION_METHOD.to_string(),
                payload: r#"{"state":"hidden"}"#.to_string(),
                response_timeout: Duration::from_secs(2),
            })
            .await
            .unwrap();
        assert_eq!(reply, r#"{"ok":true}"#);
        assert_eq!(frontend.requests().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_console_frontend_slow_times_out() {
        let frontend = ConsoleFrontend::new().with_latency(Duration::from_secs(5));
        let err = frontend
            .perform_rpc(RpcRequest {
                destination_identity: frontend.identity().to_string(),
                method: SHOW_ILLUSTRATION_METHOD.to_string(),
                payload: r#"{"state":"hidden"}"#.to_string(),
                response_timeout: Duration::from_secs(2),
            })
            .await
            .unwrap_err();
        assert_eq!(err, RpcCallError::ResponseTimeout);
    }

    #[tokio::test]
    async fn test_run_prompt_drives_tools() {
        let frontend = Arc::new(ConsoleFrontend::new());
        let session = AgentSession::new(SessionOptions::default()).with_room(frontend.clone());
        let assistant = Assistant::default();

        let input = concat!(
            "show_illustration {\"illustration_key\":\"pythagoras\"}\n",
            "bogus {\n",
            "hide_illustration\n",
            "quit\n",
            "get_user_data\n",
        );
        let mut output = Vec::new();
        run_prompt(&assistant, &session, input.as_bytes(), &mut output)
            .await
            .unwrap();

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("I've displayed the illustration"));
        assert!(text.contains("error: invalid JSON arguments"));
        assert!(text.contains("I've hidden the illustration."));
        // Nothing after quit runs
        assert!(!text.contains("introduce"));

        let requests = frontend.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests.iter().all(|r| r.method == SHOW_ILLUSTRATION_METHOD));
    }
}
