//! Request and response shapes exchanged with the presentation layer

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::reply::Reply;
use super::state::ConversationState;

/// One user command plus the state the UI is holding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub comando: String,
    /// Serialized `ConversationState`; `{}` and `null` mean a fresh session
    #[serde(default)]
    pub estado_conversacion: Value,
}

impl Request {
    pub fn new(command: impl Into<String>, state: &ConversationState) -> Self {
        Self {
            comando: command.into(),
            estado_conversacion: serde_json::to_value(state).unwrap_or(Value::Null),
        }
    }

    /// First command of a session, with no state
    pub fn fresh(command: impl Into<String>) -> Self {
        Self {
            comando: command.into(),
            estado_conversacion: Value::Null,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UiAction {
    #[serde(rename = "MOSTRAR_RULETA")]
    ShowRoulette,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub nuevo_estado: ConversationState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mensaje_para_ui: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accion_ui: Option<UiAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opciones_ruleta: Option<Vec<String>>,
}

impl Response {
    pub fn new(state: ConversationState, reply: Reply) -> Self {
        let accion_ui = reply.roulette.as_ref().map(|_| UiAction::ShowRoulette);
        Self {
            nuevo_estado: state,
            mensaje_para_ui: reply.message,
            accion_ui,
            opciones_ruleta: reply.roulette,
        }
    }

    pub fn message(&self) -> &str {
        self.mensaje_para_ui.as_deref().unwrap_or_default()
    }
}
