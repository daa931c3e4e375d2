//! Backlog aggregation

use std::collections::BTreeMap;
use storyloom_core::{Backlog, Priority, Story};

/// Fold stories into a backlog: total points and per-priority counts.
///
/// Stories are kept as given, in order. Every priority appears in the
/// breakdown, zero counts included.
pub fn aggregate(stories: Vec<Story>) -> Backlog {
    let mut priority_breakdown: BTreeMap<Priority, usize> =
        Priority::ALL.iter().map(|p| (*p, 0)).collect();
    let mut total_points = 0u32;

    for story in &stories {
        total_points += story.estimation;
        *priority_breakdown.entry(story.priority).or_insert(0) += 1;
    }

    Backlog {
        stories,
        total_points,
        priority_breakdown,
    }
}
