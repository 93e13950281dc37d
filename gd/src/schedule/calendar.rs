//! Calendarizing planned tasks into clock times with rests between them

use std::ops::RangeInclusive;

use chrono::{Duration, NaiveDateTime, Timelike};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{BLOCK_STEP, PlannedTask, normalize_minutes};

/// Minutes between "now" and the first block, before rounding up
pub const INITIAL_BUFFER_RANGE: RangeInclusive<u32> = 5..=10;

/// Rest between consecutive blocks, drawn uniformly
pub const REST_RANGE: RangeInclusive<u32> = 5..=10;

/// A block placed on the clock
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledEntry {
    pub label: String,
    pub duration_minutes: u32,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// A rest between two blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestMarker {
    pub duration_minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItineraryItem {
    Task(ScheduledEntry),
    Rest(RestMarker),
}

/// Calendarized plan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Itinerary {
    pub items: Vec<ItineraryItem>,
    pub total_rest_minutes: u32,
}

impl Itinerary {
    pub fn entries(&self) -> impl Iterator<Item = &ScheduledEntry> {
        self.items.iter().filter_map(|item| match item {
            ItineraryItem::Task(entry) => Some(entry),
            ItineraryItem::Rest(_) => None,
        })
    }

    pub fn planned_minutes(&self) -> u32 {
        self.entries().map(|e| e.duration_minutes).sum()
    }
}

/// Worst-case minutes [`calendarize`] adds around `task_count` blocks:
/// the longest buffer, a full step of round-up and the longest rest between
/// every pair
pub fn calendar_overhead(task_count: usize) -> u32 {
    if task_count == 0 {
        return 0;
    }
    let gaps = u32::try_from(task_count - 1).unwrap_or(u32::MAX);
    INITIAL_BUFFER_RANGE
        .end()
        .saturating_add(BLOCK_STEP)
        .saturating_add(gaps.saturating_mul(*REST_RANGE.end()))
}

/// Minutes left for the blocks themselves once up to `task_count` of them are
/// calendarized inside `usable_minutes`
pub fn task_budget(usable_minutes: u32, task_count: usize) -> u32 {
    usable_minutes.saturating_sub(calendar_overhead(task_count))
}

/// Round up to the next 5-minute mark; times already on a mark are kept
pub fn round_up_to_step(t: NaiveDateTime) -> NaiveDateTime {
    let floor = t - Duration::seconds(t.second() as i64) - Duration::nanoseconds(t.nanosecond() as i64);
    let floor = floor - Duration::minutes((floor.minute() % BLOCK_STEP) as i64);
    if floor == t { t } else { floor + Duration::minutes(BLOCK_STEP as i64) }
}

/// Place `tasks` on the clock starting shortly after `now`
pub fn calendarize<R: Rng + ?Sized>(tasks: &[PlannedTask], now: NaiveDateTime, rng: &mut R) -> Itinerary {
    debug!(task_count = tasks.len(), %now, "calendarize: called");
    let buffer = rng.random_range(INITIAL_BUFFER_RANGE);
    let mut start = round_up_to_step(now + Duration::minutes(buffer as i64));

    let mut itinerary = Itinerary::default();
    for (i, task) in tasks.iter().enumerate() {
        let minutes = normalize_minutes(task.minutes);
        let end = start + Duration::minutes(minutes as i64);
        itinerary.items.push(ItineraryItem::Task(ScheduledEntry {
            label: task.label.clone(),
            duration_minutes: minutes,
            start,
            end,
        }));

        if i + 1 < tasks.len() {
            let rest = rng.random_range(REST_RANGE);
            itinerary.items.push(ItineraryItem::Rest(RestMarker { duration_minutes: rest }));
            itinerary.total_rest_minutes += rest;
            start = end + Duration::minutes(rest as i64);
        }
    }

    debug!(
        items = itinerary.items.len(),
        total_rest = itinerary.total_rest_minutes,
        "calendarize: done"
    );
    itinerary
}
