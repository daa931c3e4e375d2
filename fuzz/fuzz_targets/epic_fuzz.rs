//! Fuzz test for epic ingestion and planning
//!
//! Feeds arbitrary bytes through epic parsing, backlog planning and both
//! allocation strategies. Any input must yield Ok or Err, never a panic.
//!
//! Run with: cargo +nightly fuzz run epic_fuzz -- -max_total_time=60

#![no_main]

use libfuzzer_sys::fuzz_target;
use storyloom_backlog::plan_backlog;
use storyloom_core::{AllocationStrategy, Epic};
use storyloom_sprint::SprintAllocator;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(epic) = Epic::from_json(input) else {
        return;
    };
    let Ok(backlog) = plan_backlog(&epic) else {
        return;
    };

    let points: u32 = backlog.stories.iter().map(|s| s.estimation).sum();
    assert_eq!(points, backlog.total_points, "Totals must match the story list");

    let capacity = i64::from(points / 2 + 1);
    for strategy in [AllocationStrategy::Greedy, AllocationStrategy::Optimal] {
        let plan = SprintAllocator::default()
            .with_strategy(strategy)
            .allocate(&backlog, capacity)
            .expect("positive capacity must allocate");
        assert!(i64::from(plan.committed_points) <= capacity);
        assert!(plan.committed_points + plan.stretch_points <= plan.stretch_limit);
    }
});
