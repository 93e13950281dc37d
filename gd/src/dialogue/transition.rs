//! Transition draft/seal flow
//!
//! ```text
//! AWAIT_MOTHER_ACTIVITY -> AWAIT_MOTHER_START_TIME -(gap)-> AWAIT_TASK_WISHLIST
//!                                                                | split + allocate
//!                                                                v
//!          +------------ confirm ------------------------ DRAFT_PRESENTED
//!          |                                              |            |
//!          v                                           modify        correct
//!       sealed <-- AWAIT_FREEFORM_PLAN <-------------------+            |
//!                                                                       v
//!                   AWAIT_TASK_EDITS <-- AWAIT_CORRECTION_CATEGORY --> AWAIT_DURATION_EDITS
//! ```
//!
//! The usable budget is fixed once the gap is computed; every later
//! reallocation draws against that same budget. Blocks only get what is left
//! after the worst-case buffer and rests are held back, so a sealed itinerary
//! always ends inside the usable window.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::ops::RangeInclusive;
use std::sync::LazyLock;

use chrono::{Duration, NaiveDateTime};
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::input::{self, clock_time};
use super::reply::{Reply, Turn, TurnContext};
use super::state::Flow;
use crate::domain::{RecordKind, SealedRecord, TransitionPlan, generate_id};
use crate::schedule::{
    PlannedTask, allocate, calendarize, normalize_minutes, split_and_allocate, split_list, task_budget, total_minutes,
};

/// A gap this short or shorter is not worth planning
pub const MIN_GAP_MINUTES: i64 = 20;

/// Safety margin held back from the gap, drawn uniformly
pub const SAFETY_MARGIN_RANGE: RangeInclusive<u32> = 10..=20;

/// Smallest usable budget after the margin
pub const MIN_USABLE_MINUTES: u32 = 20;

const DRAFT_HINT: &str =
    "Reply 'confirm' to seal it, 'modify' to rewrite the whole plan, or 'correct' to edit tasks or durations.";
const TASK_EDIT_HINT: &str = "Send '<number> <new name>' pairs, comma-separated (e.g. 1 Read, 3 Call mom).";
const DURATION_EDIT_HINT: &str =
    "Send '<number>: <minutes>' to pin a duration or just '<number>' to let me re-allocate it, comma-separated.";

static TASK_EDIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s+(.+)$").expect("task edit pattern compiles"));

static DURATION_EDIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\d+)\s*(?::\s*(\d+)\s*(?:min|mins|minutes|minutos)?)?$")
        .expect("duration edit pattern compiles")
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransitionStep {
    AwaitMotherActivity,
    AwaitMotherStartTime,
    AwaitTaskWishlist,
    DraftPresented,
    AwaitFreeformPlan,
    AwaitCorrectionCategory,
    AwaitTaskEdits,
    AwaitDurationEdits,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionDraft {
    pub mother_activity: String,
    pub mother_start: Option<NaiveDateTime>,
    pub usable_minutes: u32,
    pub margin_minutes: u32,
    pub wishlist: Vec<String>,
    pub tasks: Vec<PlannedTask>,
}

impl TransitionDraft {
    fn render(&self) -> String {
        let mut out = format!(
            "**TRANSITION DRAFT**\nBefore *{}*{} ({} usable min)\n--------------------\n",
            self.mother_activity,
            self.mother_start
                .map(|t| format!(" at {}", t.format("%H:%M")))
                .unwrap_or_default(),
            self.usable_minutes
        );
        for (i, task) in self.tasks.iter().enumerate() {
            let _ = writeln!(out, "{}. {} ({} min)", i + 1, task.label, task.minutes);
        }
        let _ = write!(
            out,
            "--------------------\nPlanned: {} min\n\n{}",
            total_minutes(&self.tasks),
            DRAFT_HINT
        );
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionSession {
    pub step: TransitionStep,
    #[serde(default)]
    pub draft: TransitionDraft,
}

/// One slot of a duration edit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotEdit {
    Keep,
    Pin(u32),
    Reallocate,
}

impl TransitionSession {
    fn at(step: TransitionStep, draft: TransitionDraft) -> Self {
        Self { step, draft }
    }

    pub fn start() -> Self {
        Self::at(TransitionStep::AwaitMotherActivity, TransitionDraft::default())
    }

    pub fn start_prompt() -> Reply {
        Reply::say("Transition mode on.\n\n**Step 1: Mother activity.**\nWhat fixed activity is coming up?")
    }

    pub fn advance(self, command: &str, ctx: &mut TurnContext<'_>) -> Turn {
        debug!(step = ?self.step, "TransitionSession::advance: called");
        let Self { step, mut draft } = self;
        match step {
            TransitionStep::AwaitMotherActivity => {
                let activity = command.trim();
                if activity.is_empty() {
                    return stay(step, draft, "What's the activity? Name it.");
                }
                draft.mother_activity = activity.to_string();
                let prompt = format!("**{}**. What time does it start? (HH:MM)", activity);
                stay(TransitionStep::AwaitMotherStartTime, draft, prompt)
            }
            TransitionStep::AwaitMotherStartTime => match clock_time(command) {
                Some(time) => compute_gap(draft, time, ctx),
                None => stay(step, draft, "I need a time like 18:30."),
            },
            TransitionStep::AwaitTaskWishlist => {
                if split_list(command).is_empty() {
                    return stay(step, draft, "What do you want to fit in? Comma-separated, please.");
                }
                draft.wishlist = split_list(command);
                draft.tasks = plan_wishlist(&draft, command, ctx);
                present_or_abort(draft)
            }
            TransitionStep::DraftPresented => {
                if input::is_confirm(command) {
                    seal(draft, ctx)
                } else if input::is_modify(command) {
                    stay(
                        TransitionStep::AwaitFreeformPlan,
                        draft,
                        "Write the new plan, comma-separated ('name (30 min)' pins a duration).",
                    )
                } else if input::is_correct(command) {
                    match category(command) {
                        Some(next) => {
                            let hint = edit_hint(&next);
                            stay(next, draft, hint)
                        }
                        None => stay(
                            TransitionStep::AwaitCorrectionCategory,
                            draft,
                            "What do you want to correct: tasks or durations?",
                        ),
                    }
                } else {
                    stay(step, draft, DRAFT_HINT)
                }
            }
            TransitionStep::AwaitFreeformPlan => {
                if split_list(command).is_empty() {
                    return stay(step, draft, "The plan is empty. Write it comma-separated.");
                }
                draft.wishlist = split_list(command);
                draft.tasks = plan_wishlist(&draft, command, ctx);
                if draft.tasks.is_empty() {
                    return infeasible(&draft);
                }
                seal(draft, ctx)
            }
            TransitionStep::AwaitCorrectionCategory => match category(command) {
                Some(next) => {
                    let hint = edit_hint(&next);
                    stay(next, draft, hint)
                }
                None => stay(step, draft, "Tasks or durations?"),
            },
            TransitionStep::AwaitTaskEdits => match parse_task_edits(command, draft.tasks.len()) {
                Some(edits) => {
                    for (index, name) in edits {
                        draft.tasks[index].label = name;
                    }
                    present_or_abort(draft)
                }
                None => stay(step, draft, TASK_EDIT_HINT),
            },
            TransitionStep::AwaitDurationEdits => match parse_duration_edits(command, draft.tasks.len()) {
                Some(edits) => apply_duration_edits(draft, &edits, &mut *ctx.rng),
                None => stay(step, draft, DURATION_EDIT_HINT),
            },
        }
    }
}

/// Split and allocate `command` against what the blocks may use
fn plan_wishlist(draft: &TransitionDraft, command: &str, ctx: &mut TurnContext<'_>) -> Vec<PlannedTask> {
    let budget = task_budget(draft.usable_minutes, draft.wishlist.len());
    debug!(usable = draft.usable_minutes, budget, "plan_wishlist: called");
    split_and_allocate(command, budget, &mut *ctx.rng)
}

fn stay(step: TransitionStep, draft: TransitionDraft, message: impl Into<String>) -> Turn {
    Turn::stay(
        Flow::NegotiatingTransition(TransitionSession::at(step, draft)),
        Reply::say(message),
    )
}

fn edit_hint(step: &TransitionStep) -> &'static str {
    match step {
        TransitionStep::AwaitDurationEdits => DURATION_EDIT_HINT,
        _ => TASK_EDIT_HINT,
    }
}

fn category(command: &str) -> Option<TransitionStep> {
    let text = input::normalize(command);
    text.split_whitespace().find_map(|word| match word {
        "task" | "tasks" | "name" | "names" | "tarea" | "tareas" => Some(TransitionStep::AwaitTaskEdits),
        "duration" | "durations" | "time" | "times" | "duracion" | "duraciones" | "duración" => {
            Some(TransitionStep::AwaitDurationEdits)
        }
        _ => None,
    })
}

/// Minutes from `now` until the next occurrence of `time`
pub fn minutes_until(now: NaiveDateTime, time: chrono::NaiveTime) -> (NaiveDateTime, i64) {
    let mut target = now.date().and_time(time);
    if target < now {
        target += Duration::days(1);
    }
    (target, (target - now).num_minutes())
}

fn compute_gap(mut draft: TransitionDraft, time: chrono::NaiveTime, ctx: &mut TurnContext<'_>) -> Turn {
    let (mother_start, gap) = minutes_until(ctx.now, time);
    debug!(%mother_start, gap, "compute_gap: called");

    if gap <= MIN_GAP_MINUTES {
        info!(gap, "Transition aborted: gap too short");
        return Turn::idle(Reply::say(format!(
            "Only {} min until {}. That's too tight for a transition plan. Back to chat mode.",
            gap, draft.mother_activity
        )));
    }

    let margin = ctx.rng.random_range(SAFETY_MARGIN_RANGE);
    let usable = u32::try_from(gap).unwrap_or(u32::MAX).saturating_sub(margin);
    if usable < MIN_USABLE_MINUTES {
        info!(gap, margin, usable, "Transition aborted: usable time too short");
        return Turn::idle(Reply::say(format!(
            "{} min until {}, but after a {}-min safety margin only {} are usable. \
             Not enough for a block. Back to chat mode.",
            gap, draft.mother_activity, margin, usable
        )));
    }

    draft.mother_start = Some(mother_start);
    draft.margin_minutes = margin;
    draft.usable_minutes = usable;
    let prompt = format!(
        "{} min until {}. Holding back a {}-min safety margin leaves **{} usable min**.\n\n\
         What do you want to fit in? (comma-separated; 'name (30 min)' pins a duration)",
        gap, draft.mother_activity, margin, usable
    );
    stay(TransitionStep::AwaitTaskWishlist, draft, prompt)
}

fn infeasible(draft: &TransitionDraft) -> Turn {
    info!(usable = draft.usable_minutes, "Transition aborted: nothing fits");
    Turn::idle(Reply::say(format!(
        "Nothing fits in {} usable minutes. Back to chat mode.",
        draft.usable_minutes
    )))
}

fn present_or_abort(draft: TransitionDraft) -> Turn {
    if draft.tasks.is_empty() {
        return infeasible(&draft);
    }
    let message = draft.render();
    stay(TransitionStep::DraftPresented, draft, message)
}

/// `"<index> <name>"` pairs as zero-based edits; `None` if any pair is bad
fn parse_task_edits(command: &str, len: usize) -> Option<Vec<(usize, String)>> {
    let items = split_list(command);
    if items.is_empty() {
        return None;
    }
    items
        .iter()
        .map(|item| {
            let caps = TASK_EDIT.captures(item)?;
            let index: usize = caps[1].parse().ok()?;
            (1..=len)
                .contains(&index)
                .then(|| (index - 1, caps[2].trim().to_string()))
        })
        .collect()
}

/// Per-slot edits; `None` if any item is bad or an index repeats
fn parse_duration_edits(command: &str, len: usize) -> Option<Vec<SlotEdit>> {
    let items = split_list(command);
    if items.is_empty() {
        return None;
    }

    let mut edits = vec![SlotEdit::Keep; len];
    let mut touched = HashSet::new();
    for item in items {
        let caps = DURATION_EDIT.captures(&item)?;
        let index: usize = caps[1].parse().ok()?;
        if !(1..=len).contains(&index) || !touched.insert(index) {
            return None;
        }
        edits[index - 1] = match caps.get(2) {
            Some(minutes) => {
                let minutes: u32 = minutes.as_str().parse().ok()?;
                if minutes == 0 {
                    return None;
                }
                SlotEdit::Pin(normalize_minutes(minutes))
            }
            None => SlotEdit::Reallocate,
        };
    }
    Some(edits)
}

/// Pin, keep, and re-allocate slots against the fixed usable budget
fn apply_duration_edits<R: Rng + ?Sized>(mut draft: TransitionDraft, edits: &[SlotEdit], rng: &mut R) -> Turn {
    let fixed = draft
        .tasks
        .iter()
        .zip(edits)
        .map(|(task, edit)| match edit {
            SlotEdit::Keep => task.minutes,
            SlotEdit::Pin(m) => *m,
            SlotEdit::Reallocate => 0,
        })
        .fold(0u32, u32::saturating_add);

    let budget = task_budget(draft.usable_minutes, draft.tasks.len());
    if fixed > budget {
        debug!(fixed, budget, usable = draft.usable_minutes, "apply_duration_edits: over budget");
        let message = format!(
            "Those durations add up to {} min, but only {} of the {} usable fit around the rests. {}",
            fixed, budget, draft.usable_minutes, DURATION_EDIT_HINT
        );
        return stay(TransitionStep::AwaitDurationEdits, draft, message);
    }

    let marked: Vec<String> = draft
        .tasks
        .iter()
        .zip(edits)
        .filter(|(_, edit)| **edit == SlotEdit::Reallocate)
        .map(|(task, _)| task.label.clone())
        .collect();
    let mut allocated = allocate(&marked, budget - fixed, rng);

    let mut tasks = Vec::with_capacity(draft.tasks.len());
    for (task, edit) in draft.tasks.iter().zip(edits) {
        match edit {
            SlotEdit::Keep => tasks.push(task.clone()),
            SlotEdit::Pin(m) => tasks.push(PlannedTask::new(task.label.clone(), *m)),
            SlotEdit::Reallocate => match allocated.iter().position(|a| a.label == task.label) {
                Some(pos) => tasks.push(allocated.remove(pos)),
                None => warn!(label = %task.label, "apply_duration_edits: slot dropped, no time left"),
            },
        }
    }
    draft.tasks = tasks;
    present_or_abort(draft)
}

fn seal(draft: TransitionDraft, ctx: &mut TurnContext<'_>) -> Turn {
    let itinerary = calendarize(&draft.tasks, ctx.now, &mut *ctx.rng);
    let plan = TransitionPlan::from_itinerary(
        generate_id(RecordKind::Transition.prefix(), &mut *ctx.rng),
        draft.mother_activity,
        draft.mother_start.unwrap_or(ctx.now),
        draft.usable_minutes,
        draft.wishlist,
        itinerary,
        ctx.now,
    );
    info!(
        id = %plan.id,
        planned = plan.planned_minutes,
        rest = plan.rest_minutes,
        unassigned = plan.unassigned_minutes,
        "Transition plan sealed"
    );
    Turn::sealed(
        Flow::Idle,
        Reply::say("Plan sealed. Back to chat mode."),
        SealedRecord::Transition(plan),
    )
}
