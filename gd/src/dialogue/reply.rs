//! What a flow hands back after one command

use chrono::NaiveDateTime;
use rand::rngs::StdRng;

use super::state::Flow;
use crate::domain::SealedRecord;

/// Text and optional roulette directive for the UI
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    pub message: Option<String>,
    pub roulette: Option<Vec<String>>,
}

impl Reply {
    pub fn say(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            roulette: None,
        }
    }

    /// Ask the UI to spin a roulette over `options`
    pub fn roulette(prompt: impl Into<String>, options: Vec<String>) -> Self {
        Self {
            message: Some(prompt.into()),
            roulette: Some(options),
        }
    }

    pub fn text(&self) -> &str {
        self.message.as_deref().unwrap_or_default()
    }
}

/// Inputs every step may draw on
pub struct TurnContext<'a> {
    pub now: NaiveDateTime,
    pub rng: &'a mut StdRng,
}

/// Result of advancing the active flow by one command
#[derive(Debug)]
pub struct Turn {
    pub flow: Flow,
    pub reply: Reply,
    /// Record sealed on this turn, still to be filed
    pub seal: Option<SealedRecord>,
}

impl Turn {
    pub fn stay(flow: Flow, reply: Reply) -> Self {
        Self { flow, reply, seal: None }
    }

    pub fn idle(reply: Reply) -> Self {
        Self {
            flow: Flow::Idle,
            reply,
            seal: None,
        }
    }

    pub fn sealed(flow: Flow, reply: Reply, record: SealedRecord) -> Self {
        Self {
            flow,
            reply,
            seal: Some(record),
        }
    }
}
