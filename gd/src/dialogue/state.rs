//! Conversation state carried between calls
//!
//! The state is a tagged union on `mode`: each planning mode owns its step
//! and working data, so a step can never outlive its mode. Small-talk
//! history and the last interaction time ride alongside any mode.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::combo::ComboSession;
use super::contract::ContractSession;
use super::ticket::TicketSession;
use super::transition::TransitionSession;

/// Small-talk turns kept for prompting
pub const HISTORY_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Active mode and its working data
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Flow {
    #[default]
    #[serde(alias = "libre")]
    Idle,
    DesigningContract(ContractSession),
    DesigningCombo(ComboSession),
    NegotiatingTransition(TransitionSession),
    IssuingTicket(TicketSession),
}

impl Flow {
    pub fn name(&self) -> &'static str {
        match self {
            Flow::Idle => "idle",
            Flow::DesigningContract(_) => "designing_contract",
            Flow::DesigningCombo(_) => "designing_combo",
            Flow::NegotiatingTransition(_) => "negotiating_transition",
            Flow::IssuingTicket(_) => "issuing_ticket",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Flow::Idle)
    }

    /// Follow a record that was filed under a different id than it was sealed with
    pub fn record_rekeyed(&mut self, old: &str, new: &str) {
        if let Flow::DesigningCombo(combo) = self {
            combo.record_rekeyed(old, new);
        }
    }
}

/// The only object exchanged between calls
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationState {
    #[serde(flatten)]
    pub flow: Flow,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
    #[serde(default)]
    pub last_interaction: Option<NaiveDateTime>,
}

impl ConversationState {
    /// Decode the state the UI sent back
    ///
    /// `null` and `{}` start a fresh session. The legacy `modo` key is read
    /// as `mode`.
    pub fn decode(value: Value) -> Result<Self, serde_json::Error> {
        debug!("decode: called");
        let mut value = match value {
            Value::Null => return Ok(Self::default()),
            Value::Object(map) if map.is_empty() => return Ok(Self::default()),
            other => other,
        };

        if let Value::Object(map) = &mut value
            && !map.contains_key("mode")
        {
            match map.remove("modo") {
                Some(mode) => {
                    map.insert("mode".to_string(), mode);
                }
                None => {
                    map.insert("mode".to_string(), Value::String("idle".to_string()));
                }
            }
        }

        serde_json::from_value(value)
    }

    /// Append a completed exchange, keeping the last `HISTORY_LIMIT` turns
    pub fn push_exchange(&mut self, user: &str, assistant: &str) {
        self.history.push(ChatTurn::user(user));
        self.history.push(ChatTurn::assistant(assistant));
        if self.history.len() > HISTORY_LIMIT {
            let excess = self.history.len() - HISTORY_LIMIT;
            self.history.drain(..excess);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_and_empty_are_idle() {
        assert_eq!(ConversationState::decode(Value::Null).unwrap(), ConversationState::default());
        assert_eq!(ConversationState::decode(json!({})).unwrap(), ConversationState::default());
    }

    #[test]
    fn test_legacy_libre_alias() {
        let state = ConversationState::decode(json!({"modo": "libre"})).unwrap();
        assert!(state.flow.is_idle());

        let state = ConversationState::decode(json!({"mode": "libre", "history": []})).unwrap();
        assert!(state.flow.is_idle());
    }

    #[test]
    fn test_missing_mode_keeps_history() {
        let state = ConversationState::decode(json!({
            "history": [{"role": "user", "content": "hola"}]
        }))
        .unwrap();
        assert!(state.flow.is_idle());
        assert_eq!(state.history.len(), 1);
    }

    #[test]
    fn test_unknown_mode_is_error() {
        assert!(ConversationState::decode(json!({"mode": "juggling"})).is_err());
        assert!(ConversationState::decode(json!("idle")).is_err());
    }

    #[test]
    fn test_roundtrip_contract_mode() {
        let state = ConversationState {
            flow: Flow::DesigningContract(ContractSession::start()),
            history: vec![ChatTurn::user("hi"), ChatTurn::assistant("hello")],
            last_interaction: None,
        };
        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(value["mode"], "designing_contract");
        assert_eq!(value["step"]["name"], "AWAIT_MISSION");
        assert_eq!(ConversationState::decode(value).unwrap(), state);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut state = ConversationState::default();
        for i in 0..8 {
            state.push_exchange(&format!("q{i}"), &format!("a{i}"));
        }
        assert_eq!(state.history.len(), HISTORY_LIMIT);
        assert_eq!(state.history[0], ChatTurn::user("q3"));
        assert_eq!(state.history[9], ChatTurn::assistant("a7"));
    }
}
