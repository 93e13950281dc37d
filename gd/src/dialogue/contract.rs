//! Contract draft/seal flow
//!
//! ```text
//! AWAIT_MISSION ─► AWAIT_SPEC_DECISION ⟲ AWAIT_SPEC_OPTIONS
//!        │
//!        ▼
//! AWAIT_KICKOFF ─► AWAIT_DURATION_DECISION ─► AWAIT_DURATION
//!        │                                        │
//!        ▼                                        ▼
//! DRAFT_PRESENTED ─ confirm ─► sealed ─► AWAIT_CHAIN_NEXT
//!        │
//!        └ correct ─► AWAIT_FIELD ─► [AWAIT_LAYER_DECISION] ─► AWAIT_NEW_VALUE ─► DRAFT_PRESENTED
//! ```
//!
//! Any step that takes a value accepts several comma-separated candidates;
//! the flow then suspends in `AWAIT_CHOICE` until the UI reports which one
//! the roulette landed on.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::input::{self, candidates, parse_all, parse_clock, parse_minutes, yes_no};
use super::reply::{Reply, TurnContext};
use crate::domain::{Contract, MissionSpec, RecordKind, UNDEFINED_DURATION, generate_id, seal_stamp};

const MISSION_PROMPT: &str =
    "**Step 1: The Mission.**\nDefine the mission (a direct order or several options, comma-separated).";
const SPEC_PROMPT: &str = "Add a layer of detail? (a direct order, options, or 'done')";
const KICKOFF_HINT: &str = "I need clock times like 20:00 or 7:30.";
const DURATION_HINT: &str = "I need minute counts like 45 or 45 min.";
const DRAFT_HINT: &str = "Reply 'confirm' to seal it or 'correct' to change a field.";

/// Draft field a value is collected for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Mission,
    Specification,
    Kickoff,
    Duration,
}

impl Field {
    /// Correctable field named in free text
    fn named_in(text: &str) -> Option<Field> {
        let text = input::normalize(text);
        text.split_whitespace().find_map(|word| match word {
            "mission" | "mision" | "misión" => Some(Field::Mission),
            "kickoff" | "start" | "time" | "horario" | "hora" | "inicio" => Some(Field::Kickoff),
            "duration" | "duracion" | "duración" => Some(Field::Duration),
            _ => None,
        })
    }

    fn label(self) -> &'static str {
        match self {
            Field::Mission => "mission",
            Field::Specification => "detail",
            Field::Kickoff => "kickoff",
            Field::Duration => "duration",
        }
    }

    /// Validate and normalize candidates for this field
    fn accept(self, items: &[String]) -> Result<Vec<String>, &'static str> {
        match self {
            Field::Mission | Field::Specification => Ok(items.to_vec()),
            Field::Kickoff => parse_all(items, parse_clock).ok_or(KICKOFF_HINT),
            Field::Duration => parse_all(items, parse_minutes).ok_or(DURATION_HINT),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContractStep {
    AwaitMission,
    AwaitSpecDecision,
    AwaitSpecOptions,
    AwaitKickoff,
    AwaitDurationDecision,
    AwaitDuration,
    AwaitChoice {
        field: Field,
        correcting: bool,
        keep_layers: bool,
        options: Vec<String>,
    },
    DraftPresented,
    AwaitField,
    AwaitLayerDecision,
    AwaitNewValue {
        field: Field,
        keep_layers: bool,
    },
    AwaitChainNext,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractDraft {
    pub mission: Option<MissionSpec>,
    pub kickoff: Option<String>,
    pub duration: Option<String>,
}

impl ContractDraft {
    fn mission_text(&self) -> String {
        self.mission.as_ref().map(MissionSpec::render).unwrap_or_default()
    }

    fn render(&self) -> String {
        format!(
            "**CONTRACT DRAFT**\n\
             --------------------\n\
             **Mission:** {}\n\
             **Kickoff:** {}\n\
             **Duration:** {}\n\
             --------------------\n\
             {}",
            self.mission_text(),
            self.kickoff.as_deref().unwrap_or("-"),
            self.duration.as_deref().unwrap_or(UNDEFINED_DURATION),
            DRAFT_HINT
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractSession {
    pub step: ContractStep,
    #[serde(default)]
    pub draft: ContractDraft,
}

/// Where one command left the contract flow
#[derive(Debug)]
pub enum Progress {
    Continue(ContractSession, Reply),
    Sealed(Contract),
    Exit(Reply),
}

impl ContractSession {
    fn at(step: ContractStep, draft: ContractDraft) -> Self {
        Self { step, draft }
    }

    /// Fresh session asking for the mission
    pub fn start() -> Self {
        Self::at(ContractStep::AwaitMission, ContractDraft::default())
    }

    pub fn start_prompt() -> Reply {
        Reply::say(format!("Design mode on.\n\n{}", MISSION_PROMPT))
    }

    /// Session with the mission already set, asking for detail
    pub fn start_with_mission(mission: &str) -> (Self, Reply) {
        let draft = ContractDraft {
            mission: Some(MissionSpec::new(mission)),
            ..ContractDraft::default()
        };
        let reply = Reply::say(format!("Mission: **{}**.\n\n{}", mission, SPEC_PROMPT));
        (Self::at(ContractStep::AwaitSpecDecision, draft), reply)
    }

    /// Session waiting on "forge another?"
    pub fn chain_next() -> Self {
        Self::at(ContractStep::AwaitChainNext, ContractDraft::default())
    }

    pub fn advance(self, command: &str, ctx: &mut TurnContext<'_>) -> Progress {
        debug!(step = ?self.step, "ContractSession::advance: called");
        let Self { step, draft } = self;
        match step {
            ContractStep::AwaitMission => collect(step, draft, Field::Mission, false, false, command),
            ContractStep::AwaitSpecDecision => match yes_no(command) {
                Some(false) => {
                    let reply = Reply::say(format!(
                        "Mission defined: **{}**.\n\n**Next: Kickoff.**\n\
                         What time do you start? (a time or several options)",
                        draft.mission_text()
                    ));
                    Progress::Continue(Self::at(ContractStep::AwaitKickoff, draft), reply)
                }
                Some(true) => Progress::Continue(
                    Self::at(ContractStep::AwaitSpecOptions, draft),
                    Reply::say("Go ahead: the detail, or several options."),
                ),
                // anything else is the detail itself
                None => collect(step, draft, Field::Specification, false, false, command),
            },
            ContractStep::AwaitSpecOptions => collect(step, draft, Field::Specification, false, false, command),
            ContractStep::AwaitKickoff => collect(step, draft, Field::Kickoff, false, false, command),
            ContractStep::AwaitDurationDecision => match yes_no(command) {
                Some(true) => Progress::Continue(
                    Self::at(ContractStep::AwaitDuration, draft),
                    Reply::say("How long? (e.g. 45 min, or several options)"),
                ),
                Some(false) => present(ContractDraft { duration: None, ..draft }),
                None if Field::Duration.accept(&candidates(command)).is_ok() && !candidates(command).is_empty() => {
                    collect(ContractStep::AwaitDuration, draft, Field::Duration, false, false, command)
                }
                None => Progress::Continue(
                    Self::at(step, draft),
                    Reply::say("Set a duration? Answer yes or no (or just give the minutes)."),
                ),
            },
            ContractStep::AwaitDuration => collect(step, draft, Field::Duration, false, false, command),
            ContractStep::AwaitChoice {
                field,
                correcting,
                keep_layers,
                options,
            } => match input::pick(&options, command).cloned() {
                Some(chosen) => apply(draft, field, chosen, correcting, keep_layers),
                None => {
                    debug!(%command, "ContractSession::advance: choice not among options, re-spinning");
                    let reply = roulette(field, options.clone());
                    Progress::Continue(
                        Self::at(
                            ContractStep::AwaitChoice {
                                field,
                                correcting,
                                keep_layers,
                                options,
                            },
                            draft,
                        ),
                        reply,
                    )
                }
            },
            ContractStep::DraftPresented => {
                if input::is_confirm(command) {
                    Progress::Sealed(seal(draft, ctx))
                } else if input::is_correct(command) {
                    match Field::named_in(command) {
                        Some(field) => ask_new_value(draft, field),
                        None => ask_field(draft),
                    }
                } else {
                    Progress::Continue(Self::at(step, draft), Reply::say(DRAFT_HINT))
                }
            }
            ContractStep::AwaitField => match Field::named_in(command) {
                Some(field) => ask_new_value(draft, field),
                None => Progress::Continue(
                    Self::at(step, draft),
                    Reply::say("Which field: mission, kickoff or duration?"),
                ),
            },
            ContractStep::AwaitLayerDecision => match yes_no(command) {
                Some(keep_layers) => Progress::Continue(
                    Self::at(
                        ContractStep::AwaitNewValue {
                            field: Field::Mission,
                            keep_layers,
                        },
                        draft,
                    ),
                    Reply::say("New mission? (a direct order or several options)"),
                ),
                None => Progress::Continue(
                    Self::at(step, draft),
                    Reply::say("Keep the detail layers on the new mission? Answer yes or no."),
                ),
            },
            ContractStep::AwaitNewValue { field, keep_layers } => {
                if field == Field::Duration && yes_no(command) == Some(false) {
                    return present(ContractDraft { duration: None, ..draft });
                }
                collect(step, draft, field, true, keep_layers, command)
            }
            ContractStep::AwaitChainNext => match yes_no(command) {
                Some(true) => Progress::Continue(
                    Self::start(),
                    Reply::say(format!("New contract.\n\n{}", MISSION_PROMPT)),
                ),
                Some(false) => Progress::Exit(Reply::say("Understood. Back to chat mode.")),
                None => Progress::Continue(
                    Self::at(step, draft),
                    Reply::say("Forge another contract? Answer yes or no."),
                ),
            },
        }
    }
}

fn roulette(field: Field, options: Vec<String>) -> Reply {
    Reply::roulette(format!("Several {} options. Spin the roulette.", field.label()), options)
}

/// Take one or several candidates for `field`; re-prompt `step` when none are usable
fn collect(
    step: ContractStep,
    draft: ContractDraft,
    field: Field,
    correcting: bool,
    keep_layers: bool,
    command: &str,
) -> Progress {
    let items = candidates(command);
    if items.is_empty() {
        let reply = Reply::say(format!("I didn't catch a valid {}. Try again.", field.label()));
        return Progress::Continue(ContractSession::at(step, draft), reply);
    }

    let options = match field.accept(&items) {
        Ok(options) => options,
        Err(hint) => return Progress::Continue(ContractSession::at(step, draft), Reply::say(hint)),
    };

    match <[String; 1]>::try_from(options) {
        Ok([only]) => apply(draft, field, only, correcting, keep_layers),
        Err(options) => {
            let reply = roulette(field, options.clone());
            let step = ContractStep::AwaitChoice {
                field,
                correcting,
                keep_layers,
                options,
            };
            Progress::Continue(ContractSession::at(step, draft), reply)
        }
    }
}

/// Write a settled value into the draft and move on
fn apply(mut draft: ContractDraft, field: Field, value: String, correcting: bool, keep_layers: bool) -> Progress {
    debug!(?field, %value, correcting, "apply: called");
    match field {
        Field::Mission => {
            match (&mut draft.mission, correcting) {
                (Some(mission), true) => mission.replace_base(value.clone(), keep_layers),
                _ => draft.mission = Some(MissionSpec::new(value.clone())),
            }
            if correcting {
                return present(draft);
            }
            let reply = Reply::say(format!(
                "Mission accepted: **{}**.\n\n**Next: Specification.**\n{}",
                value, SPEC_PROMPT
            ));
            Progress::Continue(ContractSession::at(ContractStep::AwaitSpecDecision, draft), reply)
        }
        Field::Specification => {
            draft.mission.get_or_insert_with(|| MissionSpec::new("")).push_layer(value);
            let reply = Reply::say(format!("Detail added: **{}**.\n\n{}", draft.mission_text(), SPEC_PROMPT));
            Progress::Continue(ContractSession::at(ContractStep::AwaitSpecDecision, draft), reply)
        }
        Field::Kickoff => {
            draft.kickoff = Some(value.clone());
            if correcting {
                return present(draft);
            }
            let reply = Reply::say(format!(
                "Kickoff: **{}**.\n\n**Final step: Duration.**\nSet a duration? (yes/no)",
                value
            ));
            Progress::Continue(ContractSession::at(ContractStep::AwaitDurationDecision, draft), reply)
        }
        Field::Duration => {
            draft.duration = Some(value);
            present(draft)
        }
    }
}

fn present(draft: ContractDraft) -> Progress {
    let reply = Reply::say(draft.render());
    Progress::Continue(ContractSession::at(ContractStep::DraftPresented, draft), reply)
}

fn ask_field(draft: ContractDraft) -> Progress {
    Progress::Continue(
        ContractSession::at(ContractStep::AwaitField, draft),
        Reply::say("Which field do you want to correct: mission, kickoff or duration?"),
    )
}

fn ask_new_value(draft: ContractDraft, field: Field) -> Progress {
    if field == Field::Mission && draft.mission.as_ref().is_some_and(MissionSpec::has_layers) {
        let reply = Reply::say(format!(
            "The mission carries detail layers: **{}**.\nKeep them on the new mission? (yes/no)",
            draft.mission_text()
        ));
        return Progress::Continue(ContractSession::at(ContractStep::AwaitLayerDecision, draft), reply);
    }

    let prompt = match field {
        Field::Kickoff => "New kickoff time? (a time or several options)",
        Field::Duration => "New duration? (minutes or several options; 'none' leaves it undefined)",
        Field::Mission | Field::Specification => "New mission? (a direct order or several options)",
    };
    let step = ContractStep::AwaitNewValue {
        field,
        keep_layers: false,
    };
    Progress::Continue(ContractSession::at(step, draft), Reply::say(prompt))
}

fn seal(draft: ContractDraft, ctx: &mut TurnContext<'_>) -> Contract {
    let (sealed_date, sealed_time) = seal_stamp(ctx.now);
    let contract = Contract {
        id: generate_id(RecordKind::Contract.prefix(), &mut *ctx.rng),
        mission: draft.mission_text(),
        kickoff: draft.kickoff.unwrap_or_default(),
        duration: draft.duration.unwrap_or_else(|| UNDEFINED_DURATION.to_string()),
        sealed_date,
        sealed_time,
    };
    info!(id = %contract.id, mission = %contract.mission, "Contract sealed");
    contract
}
