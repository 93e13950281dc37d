//! Combo: one contract per pre-collected task
//!
//! Collects up to three task names, shuffles them, then runs the contract
//! flow once per task with the mission pre-filled.

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::contract::{ContractSession, Progress};
use super::input::candidates;
use super::reply::{Reply, Turn, TurnContext};
use super::state::Flow;
use crate::domain::SealedRecord;

/// Most tasks a single combo accepts
pub const MAX_COMBO_TASKS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComboStep {
    AwaitTasks,
    Driving { contract: ContractSession },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboSession {
    pub step: ComboStep,
    /// Tasks not yet started, in drive order
    #[serde(default)]
    pub queue: Vec<String>,
    /// IDs sealed so far
    #[serde(default)]
    pub sealed: Vec<String>,
}

impl ComboSession {
    pub fn start() -> Self {
        Self {
            step: ComboStep::AwaitTasks,
            queue: Vec::new(),
            sealed: Vec::new(),
        }
    }

    pub fn start_prompt() -> Reply {
        Reply::say(format!(
            "Combo mode on.\nName up to {} tasks, comma-separated. I'll shuffle them and forge one contract each.",
            MAX_COMBO_TASKS
        ))
    }

    pub fn record_rekeyed(&mut self, old: &str, new: &str) {
        for id in self.sealed.iter_mut().filter(|id| id.as_str() == old) {
            *id = new.to_string();
        }
    }

    pub fn advance(self, command: &str, ctx: &mut TurnContext<'_>) -> Turn {
        debug!(step = ?self.step, queued = self.queue.len(), "ComboSession::advance: called");
        let Self { step, queue, sealed } = self;
        match step {
            ComboStep::AwaitTasks => collect_tasks(command, ctx),
            ComboStep::Driving { contract } => match contract.advance(command, ctx) {
                Progress::Continue(contract, reply) => {
                    let session = Self {
                        step: ComboStep::Driving { contract },
                        queue,
                        sealed,
                    };
                    Turn::stay(Flow::DesigningCombo(session), reply)
                }
                Progress::Sealed(contract) => {
                    let mut sealed = sealed;
                    sealed.push(contract.id.clone());
                    let record = SealedRecord::Contract(contract);
                    next_task(queue, sealed, record)
                }
                Progress::Exit(reply) => Turn::idle(reply),
            },
        }
    }
}

fn collect_tasks(command: &str, ctx: &mut TurnContext<'_>) -> Turn {
    let mut tasks = candidates(command);
    if tasks.is_empty() {
        return Turn::stay(
            Flow::DesigningCombo(ComboSession::start()),
            Reply::say("I didn't catch any task. Name up to three, comma-separated."),
        );
    }
    if tasks.len() > MAX_COMBO_TASKS {
        debug!(count = tasks.len(), "collect_tasks: too many tasks");
        return Turn::stay(
            Flow::DesigningCombo(ComboSession::start()),
            Reply::say(format!(
                "That's {} tasks. A combo takes at most {}; pick again.",
                tasks.len(),
                MAX_COMBO_TASKS
            )),
        );
    }

    tasks.shuffle(&mut *ctx.rng);
    info!(?tasks, "Combo order drawn");
    let order = tasks.join(", ");
    let first = tasks.remove(0);
    let (contract, reply) = ContractSession::start_with_mission(&first);
    let session = ComboSession {
        step: ComboStep::Driving { contract },
        queue: tasks,
        sealed: Vec::new(),
    };
    let reply = Reply::say(format!("Order: {}.\n\n{}", order, reply.text()));
    Turn::stay(Flow::DesigningCombo(session), reply)
}

/// After a seal: start the next queued task, or finish with a summary
fn next_task(mut queue: Vec<String>, sealed: Vec<String>, record: SealedRecord) -> Turn {
    if queue.is_empty() {
        info!(count = sealed.len(), "Combo complete");
        let reply = Reply::say(format!(
            "Combo complete. Sealed: {}.\nBack to chat mode.",
            sealed.join(", ")
        ));
        return Turn::sealed(Flow::Idle, reply, record);
    }

    let task = queue.remove(0);
    let (contract, reply) = ContractSession::start_with_mission(&task);
    let remaining = queue.len();
    let session = ComboSession {
        step: ComboStep::Driving { contract },
        queue,
        sealed,
    };
    let reply = Reply::say(format!(
        "Next up ({} more after this one).\n\n{}",
        remaining,
        reply.text()
    ));
    Turn::sealed(Flow::DesigningCombo(session), reply, record)
}
