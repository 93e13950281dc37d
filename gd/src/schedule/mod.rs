//! Scheduling math for transition plans
//!
//! Turns an unordered wishlist into timed blocks:
//!
//! ```text
//! "Read (25 min), Stretch, Email"
//!        │ splitter (duration parser + allocator)
//!        ▼
//! [Read 25] [Email 35] [Stretch 20]          PlannedTask, presentation order
//!        │ calendar
//!        ▼
//! 18:15 Read → rest 5 → 18:45 Email → rest 10 → 19:30 Stretch
//! ```
//!
//! All randomness is drawn from a caller-supplied `Rng` so a seeded
//! generator reproduces a plan exactly.

mod allocator;
mod calendar;
mod duration;
mod splitter;

use serde::{Deserialize, Serialize};

pub use allocator::allocate;
pub use calendar::{
    INITIAL_BUFFER_RANGE, Itinerary, ItineraryItem, REST_RANGE, RestMarker, ScheduledEntry, calendar_overhead,
    calendarize, task_budget,
};
pub use duration::parse_duration;
pub use splitter::{split_and_allocate, split_list};

/// Shortest block the allocator will hand out
pub const MIN_BLOCK_MINUTES: u32 = 20;

/// Longest block the allocator will hand out
pub const MAX_BLOCK_MINUTES: u32 = 45;

/// Block vocabulary for the abundant-time branch
pub const BLOCK_SIZES: [u32; 6] = [20, 25, 30, 35, 40, 45];

/// Every scheduled duration is a multiple of this
pub const BLOCK_STEP: u32 = 5;

/// A task label with its allotted minutes, not yet placed on the clock
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedTask {
    pub label: String,
    pub minutes: u32,
}

impl PlannedTask {
    pub fn new(label: impl Into<String>, minutes: u32) -> Self {
        Self {
            label: label.into(),
            minutes,
        }
    }
}

/// Round to the nearest multiple of five
pub fn round_to_step(minutes: u32) -> u32 {
    minutes.saturating_add(BLOCK_STEP / 2) / BLOCK_STEP * BLOCK_STEP
}

/// Round to the nearest multiple of five, never below one step
pub fn normalize_minutes(minutes: u32) -> u32 {
    round_to_step(minutes).max(BLOCK_STEP)
}

/// Sum of allotted minutes
pub fn total_minutes(tasks: &[PlannedTask]) -> u32 {
    tasks.iter().fold(0, |acc, t| acc.saturating_add(t.minutes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to_step() {
        assert_eq!(round_to_step(0), 0);
        assert_eq!(round_to_step(2), 0);
        assert_eq!(round_to_step(3), 5);
        assert_eq!(round_to_step(22), 20);
        assert_eq!(round_to_step(23), 25);
        assert_eq!(round_to_step(45), 45);
    }

    #[test]
    fn test_round_to_step_saturates() {
        assert_eq!(round_to_step(u32::MAX), u32::MAX / BLOCK_STEP * BLOCK_STEP);
        assert_eq!(round_to_step(u32::MAX - 1), u32::MAX / BLOCK_STEP * BLOCK_STEP);
        assert_eq!(normalize_minutes(u32::MAX), u32::MAX / BLOCK_STEP * BLOCK_STEP);
    }

    #[test]
    fn test_normalize_minutes_has_floor() {
        assert_eq!(normalize_minutes(1), 5);
        assert_eq!(normalize_minutes(0), 5);
        assert_eq!(normalize_minutes(58), 60);
    }

    #[test]
    fn test_total_minutes() {
        let tasks = vec![PlannedTask::new("A", 20), PlannedTask::new("B", 35)];
        assert_eq!(total_minutes(&tasks), 55);
        assert_eq!(total_minutes(&[]), 0);
    }
}
