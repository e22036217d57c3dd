use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{error, info, warn};

use super::definitions::{ASSISTANT_INSTRUCTIONS, ToolCall, ToolDefinition, ToolOutput, tool_definitions};
use crate::illustration::{
    IllustrationCatalog, IllustrationError, IllustrationState, set_illustration_state,
};
use crate::livekit::{RpcCallError, RpcRequest, perform_with_deadline};
use crate::session::{AgentSession, ParticipantError, SessionEvent};

/// RPC method the frontend registers for component updates.
pub const COMPONENT_METHOD: &str = "client.component";

/// Arguments of `show_illustration`. A catalog key wins over a raw URL.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShowIllustrationArgs {
    #[serde(default)]
    pub illustration_key: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SetUserDataArgs {
    name: String,
    age: u32,
}

#[derive(Debug, Deserialize)]
struct CreateComponentArgs {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ToggleComponentArgs {
    component_id: String,
}

#[derive(Debug, Clone, Copy)]
enum IllustrationAction {
    Show,
    Hide,
}

impl IllustrationAction {
    fn verb(self) -> &'static str {
        match self {
            IllustrationAction::Show => "show",
            IllustrationAction::Hide => "hide",
        }
    }
}

#[derive(Debug)]
enum DeliveryFailure {
    Participant(ParticipantError),
    Rpc(RpcCallError),
}

/// The tutor agent: its instructions, its illustration catalog, and the tool
/// handlers the model can call.
#[derive(Debug, Clone, Default)]
pub struct Assistant {
    catalog: IllustrationCatalog,
}

impl Assistant {
    pub fn new(catalog: IllustrationCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &IllustrationCatalog {
        &self.catalog
    }

    pub fn instructions(&self) -> &'static str {
        ASSISTANT_INSTRUCTIONS
    }

    pub fn tools(&self) -> Vec<ToolDefinition> {
        tool_definitions(&self.catalog)
    }

    /// Route a model tool call to its handler.
    pub async fn invoke(&self, session: &AgentSession, call: &ToolCall) -> ToolOutput {
        info!(tool = %call.name, call_id = %call.call_id, "Invoking tool");

        let output = match call.name.as_str() {
            "show_illustration" => match parse_args::<ShowIllustrationArgs>(call) {
                Ok(args) => self.show_illustration(session, args).await,
                Err(reply) => reply,
            },
            "hide_illustration" => self.hide_illustration(session).await,
            "set_user_data" => match parse_args::<SetUserDataArgs>(call) {
                Ok(args) => self.set_user_data(session, &args.name, args.age),
                Err(reply) => reply,
            },
            "get_user_data" => self.get_user_data(session),
            "create_component" => match parse_args::<CreateComponentArgs>(call) {
                Ok(args) => self.create_component(session, &args.content).await,
                Err(reply) => reply,
            },
            "toggle_component" => match parse_args::<ToggleComponentArgs>(call) {
                Ok(args) => self.toggle_component(session, &args.component_id).await,
                Err(reply) => reply,
            },
            other => {
                warn!(tool = %other, "Model called an unknown tool");
                format!("There is no tool called '{other}'.")
            }
        };

        ToolOutput {
            call_id: call.call_id.clone(),
            output,
        }
    }

    pub async fn show_illustration(
        &self,
        session: &AgentSession,
        args: ShowIllustrationArgs,
    ) -> String {
        let key = args.illustration_key.as_deref().map(str::trim).filter(|k| !k.is_empty());
        let url = args.image_url.as_deref().map(str::trim).filter(|u| !u.is_empty());

        let (image_url, description) = match (key, url) {
            (Some(key), _) => match self.catalog.get(key) {
                Ok(illustration) => (illustration.url.clone(), Some(illustration.description.clone())),
                Err(_) => {
                    return format!(
                        "I don't have an illustration called '{key}'. Available illustrations are: {}",
                        self.available_keys()
                    );
                }
            },
            (None, Some(url)) => (url.to_string(), None),
            (None, None) => {
                return format!(
                    "Tell me which illustration to show. Available illustrations are: {}",
                    self.available_keys()
                );
            }
        };

        let (room, identity) = match session.resolve_frontend() {
            Ok(target) => target,
            Err(e) => return illustration_failure(IllustrationAction::Show, e.into()),
        };

        let result = set_illustration_state(
            room.as_ref(),
            &identity,
            IllustrationState::Show,
            Some(&image_url),
            session.rpc_timeout(),
        )
        .await;

        match result {
            Ok(response) => {
                info!(?response, "Show illustration succeeded");
                match description {
                    Some(description) => {
                        format!("I've displayed the illustration showing {description} to you.")
                    }
                    None => "I've displayed the illustration to you.".to_string(),
                }
            }
            Err(e) => illustration_failure(IllustrationAction::Show, e),
        }
    }

    pub async fn hide_illustration(&self, session: &AgentSession) -> String {
        let (room, identity) = match session.resolve_frontend() {
            Ok(target) => target,
            Err(e) => return illustration_failure(IllustrationAction::Hide, e.into()),
        };

        let result = set_illustration_state(
            room.as_ref(),
            &identity,
            IllustrationState::Hidden,
            None,
            session.rpc_timeout(),
        )
        .await;

        match result {
            Ok(response) => {
                info!(?response, "Hide illustration succeeded");
                "I've hidden the illustration.".to_string()
            }
            Err(e) => illustration_failure(IllustrationAction::Hide, e),
        }
    }

    pub fn set_user_data(&self, session: &AgentSession, name: &str, age: u32) -> String {
        let info = session.userdata().set_user_info(name, age);
        info!(user_id = %info.id, "Stored user info");
        format!(
            "Okay, now I will remember your name is {} and you are {age} year old.",
            info.name
        )
    }

    pub fn get_user_data(&self, session: &AgentSession) -> String {
        match session.userdata().get_user_info() {
            Some(info) => match info.age {
                Some(age) => format!("Your name: {} and your age: {age}", info.name),
                None => format!("Your name: {}", info.name),
            },
            None => "I don't know your name. Please introduce your name and your age".to_string(),
        }
    }

    pub async fn create_component(&self, session: &AgentSession, content: &str) -> String {
        let (component, index) = {
            let mut userdata = session.userdata();
            let component = userdata.add_component(content);
            let index = userdata.components().len() - 1;
            (component, index)
        };

        let payload = json!({
            "action": "show",
            "id": component.id,
            "content": component.content,
            "index": index,
        });

        match push_component(session, payload).await {
            Ok(()) => format!(
                "I've created a component with the content: {content} (id: {})",
                component.id
            ),
            Err(DeliveryFailure::Participant(ParticipantError::NoRoom)) => {
                "Created a component, but couldn't access the room to send it".to_string()
            }
            Err(DeliveryFailure::Participant(ParticipantError::NoParticipant)) => {
                "Created a component, but no participants found to send it to".to_string()
            }
            Err(DeliveryFailure::Rpc(e)) => {
                format!("Created a component, but couldn't send it to the frontend: {e}")
            }
        }
    }

    pub async fn toggle_component(&self, session: &AgentSession, component_id: &str) -> String {
        let Some(component) = session.userdata().toggle_component(component_id) else {
            return format!("Component with ID {component_id} not found");
        };

        session.emit(SessionEvent::ComponentToggled {
            id: component.id.clone(),
            is_showed: component.is_showed,
        });

        let payload = json!({ "action": "toggle", "id": component.id });
        let state = if component.is_showed { "show" } else { "hide" };

        match push_component(session, payload).await {
            Ok(()) => format!("I've toggled the component to {state} the component"),
            Err(DeliveryFailure::Participant(ParticipantError::NoRoom)) => {
                "Toggled the component, but couldn't access the room to send it".to_string()
            }
            Err(DeliveryFailure::Participant(ParticipantError::NoParticipant)) => {
                "Toggled the component, but no participants found to send it to".to_string()
            }
            Err(DeliveryFailure::Rpc(e)) => {
                format!("Toggled the component, but couldn't send it to the frontend: {e}")
            }
        }
    }

    fn available_keys(&self) -> String {
        self.catalog.keys().collect::<Vec<_>>().join(", ")
    }
}

fn parse_args<T: DeserializeOwned>(call: &ToolCall) -> Result<T, String> {
    let raw = if call.arguments.trim().is_empty() {
        "{}"
    } else {
        call.arguments.as_str()
    };

    serde_json::from_str(raw).map_err(|e| {
        warn!(tool = %call.name, error = %e, "Invalid tool arguments");
        format!("Invalid arguments for {}: {e}", call.name)
    })
}

async fn push_component(
    session: &AgentSession,
    payload: serde_json::Value,
) -> Result<(), DeliveryFailure> {
    let (room, identity) = session
        .resolve_frontend()
        .map_err(DeliveryFailure::Participant)?;

    let body = payload.to_string();
    info!(destination = %identity, payload = %body, "Sending component payload");

    let request = RpcRequest {
        destination_identity: identity,
        method: COMPONENT_METHOD.to_string(),
        payload: body,
        response_timeout: session.rpc_timeout(),
    };

    perform_with_deadline(room.as_ref(), request)
        .await
        .map(|_| ())
        .map_err(|e| {
            error!(error = %e, "Component RPC failed");
            DeliveryFailure::Rpc(e)
        })
}

fn illustration_failure(action: IllustrationAction, err: IllustrationError) -> String {
    let verb = action.verb();

    if err.is_precondition() {
        warn!(action = verb, error = %err, "Illustration not sent");
    } else {
        error!(action = verb, error = %err, "Failed to {verb} illustration");
    }

    match (action, err) {
        (_, IllustrationError::NoRoom) => {
            format!("Cannot {verb} illustration: couldn't access the room")
        }
        (_, IllustrationError::NoParticipant) => {
            format!("Cannot {verb} illustration: no participants found in the room")
        }
        (_, e @ (IllustrationError::MissingImageUrl | IllustrationError::InvalidImageUrl { .. })) => {
            format!("I can't {verb} that image: {e}")
        }
        (_, IllustrationError::UnknownIllustration(key)) => {
            format!("I don't have an illustration called '{key}'.")
        }
        (_, IllustrationError::Rejected(reason)) => {
            format!("I tried to {verb} the illustration but encountered an error: {reason}")
        }
        (IllustrationAction::Show, IllustrationError::Timeout(_)) => {
            "The illustration request timed out. Please make sure the frontend is connected and try again."
                .to_string()
        }
        (IllustrationAction::Hide, IllustrationError::Timeout(_)) => {
            "The hide illustration request timed out. Please make sure the frontend is connected."
                .to_string()
        }
        (IllustrationAction::Show, _) => {
            "I encountered an error while trying to show the illustration. The frontend may not be ready to receive it."
                .to_string()
        }
        (IllustrationAction::Hide, _) => {
            "I encountered an error while trying to hide the illustration. The frontend may not be ready."
                .to_string()
        }
    }
}
