//! Time-block allocation for tasks without an explicit duration

use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use tracing::debug;

use super::{BLOCK_SIZES, BLOCK_STEP, MAX_BLOCK_MINUTES, MIN_BLOCK_MINUTES, PlannedTask, round_to_step};

/// Assign a block size to each task within `usable_minutes`
///
/// When the budget cannot give every task the minimum block, a single task is
/// picked and given as much of the budget as one block allows. Otherwise the
/// tasks are shuffled (that order is the presentation order) and each draws a
/// block size that still fits; once less than a minimum block remains the rest
/// are dropped. The sum of returned minutes never exceeds `usable_minutes`.
pub fn allocate<R: Rng + ?Sized>(tasks: &[String], usable_minutes: u32, rng: &mut R) -> Vec<PlannedTask> {
    debug!(task_count = tasks.len(), usable_minutes, "allocate: called");
    if tasks.is_empty() {
        return Vec::new();
    }

    let needed = MIN_BLOCK_MINUTES.saturating_mul(tasks.len() as u32);
    if usable_minutes < needed {
        return allocate_scarce(tasks, usable_minutes, rng);
    }

    let mut order: Vec<&String> = tasks.iter().collect();
    order.shuffle(rng);

    let mut remaining = usable_minutes;
    let mut planned = Vec::with_capacity(order.len());
    for label in order {
        if remaining < MIN_BLOCK_MINUTES {
            debug!(remaining, "allocate: budget exhausted, dropping remaining tasks");
            break;
        }
        let fitting: Vec<u32> = BLOCK_SIZES.iter().copied().filter(|b| *b <= remaining).collect();
        let Some(&minutes) = fitting.choose(rng) else {
            break;
        };
        remaining -= minutes;
        planned.push(PlannedTask::new(label.clone(), minutes));
    }

    debug!(planned = planned.len(), remaining, "allocate: abundance branch done");
    planned
}

fn allocate_scarce<R: Rng + ?Sized>(tasks: &[String], usable_minutes: u32, rng: &mut R) -> Vec<PlannedTask> {
    let capped = usable_minutes.min(MAX_BLOCK_MINUTES);
    let mut minutes = round_to_step(capped);
    // Nearest-five rounding may land above the budget (e.g. 38 -> 40)
    if minutes > usable_minutes {
        minutes -= BLOCK_STEP;
    }

    if minutes < MIN_BLOCK_MINUTES {
        debug!(usable_minutes, "allocate_scarce: below minimum block, no viable plan");
        return Vec::new();
    }

    match tasks.choose(rng) {
        Some(label) => {
            debug!(%label, minutes, "allocate_scarce: single-task fallback");
            vec![PlannedTask::new(label.clone(), minutes)]
        }
        None => Vec::new(),
    }
}
