//! Top-level entry point for one command

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::intent::{Intent, classify};
use super::persona::{APOLOGY, chat_prompt, greeting};
use super::reply::{Reply, Turn, TurnContext};
use super::state::{ConversationState, Flow};
use super::wire::{Request, Response};
use crate::clock::Clock;
use crate::domain::{SealedRecord, find_record_id, generate_id};
use crate::llm::ChatClient;
use crate::store::{ContractRepository, StoreError};

/// Tries at filing a record under a fresh id before giving up
const MAX_FILE_ATTEMPTS: usize = 5;

const STATE_ERROR: &str = "Something went wrong with that conversation state. Back to chat mode.";

#[derive(Debug, Clone)]
pub struct GuardianSettings {
    pub user_name: String,
    /// Bound on one chat collaborator reply
    pub chat_timeout: Duration,
}

impl Default for GuardianSettings {
    fn default() -> Self {
        Self {
            user_name: "Juan".to_string(),
            chat_timeout: Duration::from_secs(20),
        }
    }
}

/// Routes commands to flows, lookups, or small talk
pub struct Guardian {
    repository: Arc<dyn ContractRepository>,
    chat: Arc<dyn ChatClient>,
    clock: Arc<dyn Clock>,
    rng: Mutex<StdRng>,
    settings: GuardianSettings,
}

impl Guardian {
    pub fn new(
        repository: Arc<dyn ContractRepository>,
        chat: Arc<dyn ChatClient>,
        clock: Arc<dyn Clock>,
        rng: StdRng,
        settings: GuardianSettings,
    ) -> Self {
        Self {
            repository,
            chat,
            clock,
            rng: Mutex::new(rng),
            settings,
        }
    }

    pub fn repository(&self) -> &Arc<dyn ContractRepository> {
        &self.repository
    }

    /// Process one command against the state the UI sent
    pub async fn handle(&self, request: Request) -> Response {
        let now = self.clock.now();
        let command = request.comando.trim().to_string();
        debug!(%command, "handle: called");

        let mut state = match ConversationState::decode(request.estado_conversacion) {
            Ok(state) => state,
            Err(e) => {
                warn!(error = %e, "handle: undecodable state, resetting to idle");
                let state = ConversationState {
                    last_interaction: Some(now),
                    ..ConversationState::default()
                };
                return Response::new(state, Reply::say(STATE_ERROR));
            }
        };

        let intent = classify(&command);
        if intent == Intent::Greeting {
            let text = greeting(&self.settings.user_name, now, state.last_interaction);
            return Response::new(state, Reply::say(text));
        }
        state.last_interaction = Some(now);

        if intent == Intent::Cancel {
            if !state.flow.is_idle() {
                info!(mode = state.flow.name(), "Flow cancelled");
            }
            state.flow = Flow::Idle;
            return Response::new(state, Reply::say("Cancelled. Back to chat mode."));
        }

        let flow = std::mem::take(&mut state.flow);
        let turn = match (flow, intent) {
            (Flow::Idle, Intent::Enter(kind)) if find_record_id(&command).is_none() => super::enter(kind),
            (Flow::Idle, _) => self.handle_idle(&command, &mut state).await,
            (flow, _) => {
                let mut rng = self.rng.lock().await;
                let mut ctx = TurnContext { now, rng: &mut *rng };
                super::advance(flow, &command, &mut ctx)
            }
        };

        let Turn { flow, mut reply, seal } = turn;
        state.flow = flow;
        if let Some(record) = seal {
            reply = self.file(record, &mut state.flow, reply).await;
        }
        debug!(mode = state.flow.name(), "handle: turn done");
        Response::new(state, reply)
    }

    /// Idle and not entering a mode: record lookup, else small talk
    async fn handle_idle(&self, command: &str, state: &mut ConversationState) -> Turn {
        if let Some(id) = find_record_id(command) {
            debug!(%id, "handle_idle: record lookup");
            let reply = match self.repository.get(&id).await {
                Ok(Some(record)) => Reply::say(record.render()),
                Ok(None) => Reply::say(format!("No record with id {} exists.", id)),
                Err(e) => {
                    warn!(%id, error = %e, "handle_idle: lookup failed");
                    Reply::say(format!("I couldn't reach the archive to look up {}.", id))
                }
            };
            return Turn::idle(reply);
        }

        Turn::idle(Reply::say(self.chat(command, state).await))
    }

    /// Ask the chat collaborator; history only grows on success
    async fn chat(&self, command: &str, state: &mut ConversationState) -> String {
        let prompt = chat_prompt(&self.settings.user_name, &state.history, command);
        let result = tokio::time::timeout(self.settings.chat_timeout, self.chat.generate_reply(&prompt)).await;
        match result {
            Ok(Ok(text)) if !text.trim().is_empty() => {
                let text = text.trim().to_string();
                state.push_exchange(command, &text);
                text
            }
            Ok(Ok(_)) => {
                warn!("chat: empty reply");
                APOLOGY.to_string()
            }
            Ok(Err(e)) => {
                warn!(error = %e, "chat: collaborator failed");
                APOLOGY.to_string()
            }
            Err(_) => {
                warn!(timeout = ?self.settings.chat_timeout, "chat: collaborator timed out");
                APOLOGY.to_string()
            }
        }
    }

    /// File a sealed record and put its card ahead of the flow's reply
    async fn file(&self, mut record: SealedRecord, flow: &mut Flow, reply: Reply) -> Reply {
        let mut follow_up = reply.message.unwrap_or_default();
        let mut filed = false;

        for _ in 0..MAX_FILE_ATTEMPTS {
            match self.repository.put(record.clone()).await {
                Ok(()) => {
                    info!(id = %record.id(), kind = ?record.kind(), "Record filed");
                    filed = true;
                    break;
                }
                Err(StoreError::Duplicate(old)) => {
                    let new = generate_id(record.kind().prefix(), &mut *self.rng.lock().await);
                    warn!(%old, %new, "file: id taken, re-keying");
                    record.set_id(new.clone());
                    flow.record_rekeyed(&old, &new);
                    follow_up = follow_up.replace(&old, &new);
                }
                Err(e) => {
                    warn!(id = %record.id(), error = %e, "file: repository failed");
                    break;
                }
            }
        }

        let mut message = record.render();
        if !filed {
            message.push_str("\n\nWarning: this record could not be filed. Keep a copy of the card above.");
        }
        if !follow_up.is_empty() {
            message.push_str("\n\n");
            message.push_str(&follow_up);
        }
        Reply {
            message: Some(message),
            roulette: reply.roulette,
        }
    }
}
