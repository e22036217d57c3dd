//! RPC methods the agent registers for the frontend to call.

use serde::Deserialize;
use tracing::{error, info};

use crate::session::{AgentSession, SessionEvent};

/// Called by the frontend when the user clicks a component toggle.
pub const TOGGLE_COMPONENT_METHOD: &str = "agent.toggleComponent";

#[derive(Debug, Deserialize)]
struct ToggleComponentRequest {
    /// Any JSON value; non-string ids are looked up by their JSON text
    #[serde(default)]
    id: serde_json::Value,
}

impl ToggleComponentRequest {
    fn component_id(&self) -> Option<String> {
        match &self.id {
            serde_json::Value::Null => None,
            serde_json::Value::String(id) if id.is_empty() => None,
            serde_json::Value::String(id) => Some(id.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// Handle an `agent.toggleComponent` invocation.
///
/// Returns `"success"` once the payload is understood, or `"error: <reason>"`
/// when it is not a JSON object. Unknown, missing or non-string ids are logged
/// and still acknowledged.
pub fn handle_toggle_component(session: &AgentSession, caller: &str, payload: &str) -> String {
    info!(caller = %caller, payload = %payload, "Received toggle component payload");

    let request: ToggleComponentRequest = match serde_json::from_str(payload) {
        Ok(request) => request,
        Err(e) => {
            error!(error = %e, "Error handling toggle component request");
            return format!("error: {e}");
        }
    };

    let Some(id) = request.component_id() else {
        error!("No component ID found in payload");
        return "success".to_string();
    };

    let toggled = session.userdata().toggle_component(&id);
    match toggled {
        Some(component) => {
            info!(id = %id, is_showed = component.is_showed, "Toggled component");
            session.emit(SessionEvent::ComponentToggled {
                id: component.id,
                is_showed: component.is_showed,
            });
            session.emit(SessionEvent::ReplyRequested {
                instructions: "Say to the user that they successfully toggled the component"
                    .to_string(),
            });
        }
        None => error!(id = %id, "Component not found"),
    }

    "success".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionOptions;

    #[tokio::test]
    async fn test_toggle_known_component() {
        let session = AgentSession::new(SessionOptions::default());
        let id = session.userdata().add_component("note").id;
        let mut events = session.subscribe();

        let reply = handle_toggle_component(&session, "frontend", &format!(r#"{{"id":"{id}"}}"#));

        assert_eq!(reply, "success");
        assert!(session.userdata().get_component(&id).unwrap().is_showed);
        assert_eq!(
            events.recv().await.unwrap(),
            SessionEvent::ComponentToggled {
                id: id.clone(),
                is_showed: true
            }
        );
        assert!(matches!(
            events.recv().await.unwrap(),
            SessionEvent::ReplyRequested { .. }
        ));
    }

    #[test]
    fn test_toggle_unknown_or_missing_id_acknowledged() {
        let session = AgentSession::new(SessionOptions::default());
        assert_eq!(handle_toggle_component(&session, "frontend", r#"{"id":"nope"}"#), "success");
        assert_eq!(handle_toggle_component(&session, "frontend", "{}"), "success");
    }

    #[test]
    fn test_toggle_non_string_id_acknowledged() {
        let session = AgentSession::new(SessionOptions::default());
        session.userdata().add_component("note");

        assert_eq!(handle_toggle_component(&session, "frontend", r#"{"id":7}"#), "success");
        assert_eq!(handle_toggle_component(&session, "frontend", r#"{"id":null}"#), "success");
        assert!(!session.userdata().components()[0].is_showed);
    }

    #[test]
    fn test_toggle_malformed_payload() {
        let session = AgentSession::new(SessionOptions::default());
        let reply = handle_toggle_component(&session, "frontend", "not json");
        assert!(reply.starts_with("error: "));
    }
}
