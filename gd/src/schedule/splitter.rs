//! Mixed plans: some tasks carry a duration, the rest go to the allocator

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, warn};

use super::{PlannedTask, allocate, normalize_minutes, parse_duration};

/// Split a comma list, trimming fragments and dropping empty ones
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Plan a raw comma list against `usable_minutes`
///
/// Fragments with an explicit duration are fixed first (in input order,
/// rounded to a multiple of five) and their minutes leave the budget; a fixed
/// fragment that no longer fits is dropped. The remaining fragments are handed
/// to [`allocate`] with whatever budget is left. The combined list is shuffled
/// once more for presentation.
pub fn split_and_allocate<R: Rng + ?Sized>(raw: &str, usable_minutes: u32, rng: &mut R) -> Vec<PlannedTask> {
    debug!(%raw, usable_minutes, "split_and_allocate: called");
    let mut remaining = usable_minutes;
    let mut fixed = Vec::new();
    let mut flexible = Vec::new();

    for fragment in split_list(raw) {
        let (label, minutes) = parse_duration(&fragment);
        if minutes == 0 {
            flexible.push(label);
            continue;
        }

        let minutes = normalize_minutes(minutes);
        if minutes > remaining {
            warn!(%label, minutes, remaining, "split_and_allocate: fixed task does not fit, dropping");
            continue;
        }
        remaining -= minutes;
        fixed.push(PlannedTask::new(label, minutes));
    }

    let mut planned = fixed;
    planned.extend(allocate(&flexible, remaining, rng));
    planned.shuffle(rng);

    debug!(planned = planned.len(), "split_and_allocate: done");
    planned
}
