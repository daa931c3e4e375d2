//! STORYLOOM Sprint - Capacity-Bounded Sprint Allocation
//!
//! Selects stories from a backlog into a sprint. Stories are walked in
//! scheduling order: priority rank, then estimation ascending, then backlog
//! order. Each story is committed while it fits the capacity, otherwise
//! placed in stretch while committed + stretch stays within the stretch
//! limit, otherwise skipped.
//!
//! Two modes are available:
//! - [`AllocationStrategy::Greedy`] (default): one pass, no back-fill.
//! - [`AllocationStrategy::Optimal`]: 0/1 knapsack over the same order,
//!   maximizing committed points, then priority weight.

pub mod packing;

use storyloom_core::{
    round_one_decimal, AllocationAction, AllocationDecision, AllocationStrategy, Backlog,
    PlannerConfig, SprintPlan, Story, StoryloomResult, ValidationError,
    DEFAULT_STRETCH_RATIO_PERCENT,
};

/// Stretch ceiling in points: `floor(capacity * ratio / 100)`.
///
/// A story of `p` points fits when `100 * p <= ratio * capacity`, which for
/// integer points is the same as `p <= stretch_limit`.
pub fn stretch_limit(capacity: u32, ratio_percent: u32) -> u32 {
    let limit = u64::from(capacity) * u64::from(ratio_percent) / 100;
    u32::try_from(limit).unwrap_or(u32::MAX)
}

/// Backlog stories in scheduling order.
pub fn scheduling_order(backlog: &Backlog) -> Vec<&Story> {
    let mut order: Vec<(usize, &Story)> = backlog.stories.iter().enumerate().collect();
    order.sort_by_key(|(idx, story)| (story.priority.rank(), story.estimation, *idx));
    order.into_iter().map(|(_, story)| story).collect()
}

fn validate_capacity(capacity: i64) -> Result<u32, ValidationError> {
    if capacity <= 0 {
        return Err(ValidationError::invalid(
            "capacity",
            format!("must be greater than 0, got {}", capacity),
        ));
    }
    u32::try_from(capacity).map_err(|_| {
        ValidationError::invalid("capacity", format!("must not exceed {}, got {}", u32::MAX, capacity))
    })
}

// ============================================================================
// SPRINT ALLOCATOR
// ============================================================================

/// Sprint allocator. Holds the strategy and stretch ratio; stateless
/// otherwise, so one allocator can plan any number of sprints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SprintAllocator {
    strategy: AllocationStrategy,
    stretch_ratio_percent: u32,
}

impl Default for SprintAllocator {
    fn default() -> Self {
        Self {
            strategy: AllocationStrategy::Greedy,
            stretch_ratio_percent: DEFAULT_STRETCH_RATIO_PERCENT,
        }
    }
}

impl SprintAllocator {
    /// Create an allocator from configuration.
    pub fn new(config: &PlannerConfig) -> StoryloomResult<Self> {
        config.validate()?;
        Ok(Self {
            strategy: config.strategy,
            stretch_ratio_percent: config.stretch_ratio_percent,
        })
    }

    pub fn with_strategy(mut self, strategy: AllocationStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn strategy(&self) -> AllocationStrategy {
        self.strategy
    }

    pub fn stretch_ratio_percent(&self) -> u32 {
        self.stretch_ratio_percent
    }

    /// Allocate backlog stories into a sprint of `capacity` points.
    ///
    /// # Errors
    /// `ValidationError` when capacity is not positive.
    pub fn allocate(&self, backlog: &Backlog, capacity: i64) -> StoryloomResult<SprintPlan> {
        let capacity = validate_capacity(capacity)?;
        let limit = stretch_limit(capacity, self.stretch_ratio_percent);
        let order = scheduling_order(backlog);

        let actions = match self.strategy {
            AllocationStrategy::Greedy => greedy_actions(&order, capacity, limit),
            AllocationStrategy::Optimal => optimal_actions(&order, capacity, limit),
        };

        let mut plan = SprintPlan {
            capacity,
            strategy: self.strategy,
            stretch_limit: limit,
            committed: Vec::new(),
            stretch: Vec::new(),
            committed_points: 0,
            stretch_points: 0,
            utilization: 0.0,
            unscheduled: Vec::new(),
            decisions: Vec::with_capacity(order.len()),
        };

        for (story, action) in order.into_iter().zip(actions) {
            let reason = match action {
                AllocationAction::Commit => {
                    plan.committed_points += story.estimation;
                    plan.committed.push(story.clone());
                    format!(
                        "Fits capacity: {}/{} points committed",
                        plan.committed_points, capacity
                    )
                }
                AllocationAction::Stretch => {
                    plan.stretch_points += story.estimation;
                    plan.stretch.push(story.clone());
                    format!(
                        "Exceeds capacity, fits stretch limit: {}/{} points planned",
                        plan.total_points(),
                        limit
                    )
                }
                AllocationAction::Skip => {
                    plan.unscheduled.push(story.id.clone());
                    format!(
                        "Exceeds stretch limit: needs {} points, {} available",
                        story.estimation,
                        limit.saturating_sub(plan.total_points())
                    )
                }
            };

            tracing::debug!(
                story_id = %story.id,
                action = ?action,
                estimation = story.estimation,
                priority = %story.priority,
                "Allocation decision"
            );

            plan.decisions.push(AllocationDecision {
                story_id: story.id.clone(),
                action,
                estimation: story.estimation,
                reason,
            });
        }

        plan.utilization =
            round_one_decimal(f64::from(plan.committed_points) / f64::from(capacity) * 100.0);

        tracing::info!(
            strategy = %self.strategy,
            capacity,
            committed = plan.committed.len(),
            stretch = plan.stretch.len(),
            unscheduled = plan.unscheduled.len(),
            utilization = plan.utilization,
            "Sprint allocated"
        );

        Ok(plan)
    }
}

/// Allocate with the default greedy allocator.
pub fn allocate(backlog: &Backlog, capacity: i64) -> StoryloomResult<SprintPlan> {
    SprintAllocator::default().allocate(backlog, capacity)
}

/// Single pass, first fit, no back-fill. A commit must also keep the
/// planned total within the stretch limit, since earlier stretch picks
/// already count against it.
fn greedy_actions(order: &[&Story], capacity: u32, limit: u32) -> Vec<AllocationAction> {
    let mut committed = 0u32;
    let mut stretch = 0u32;
    order
        .iter()
        .map(|story| {
            let est = story.estimation;
            let planned = committed.saturating_add(stretch).saturating_add(est);
            if committed.saturating_add(est) <= capacity && planned <= limit {
                committed += est;
                AllocationAction::Commit
            } else if planned <= limit {
                stretch += est;
                AllocationAction::Stretch
            } else {
                AllocationAction::Skip
            }
        })
        .collect()
}

/// Knapsack for the committed set, then knapsack for stretch over the rest.
fn optimal_actions(order: &[&Story], capacity: u32, limit: u32) -> Vec<AllocationAction> {
    let committed = packing::select(order, capacity);
    let committed_points: u32 = order
        .iter()
        .zip(&committed)
        .filter(|(_, c)| **c)
        .map(|(s, _)| s.estimation)
        .sum();

    let (rest_idx, rest): (Vec<usize>, Vec<&Story>) = order
        .iter()
        .enumerate()
        .filter(|(idx, _)| !committed[*idx])
        .map(|(idx, story)| (idx, *story))
        .unzip();
    let stretch = packing::select(&rest, limit.saturating_sub(committed_points));

    let mut actions: Vec<AllocationAction> = committed
        .iter()
        .map(|c| {
            if *c {
                AllocationAction::Commit
            } else {
                AllocationAction::Skip
            }
        })
        .collect();
    for (idx, chosen) in rest_idx.into_iter().zip(stretch) {
        if chosen {
            actions[idx] = AllocationAction::Stretch;
        }
    }
    actions
}

#[cfg(test)]
mod tests {
    use super::*;
    use storyloom_core::{Priority, StoryloomError};
    use storyloom_test_utils::assertions::{assert_capacity_invariant, assert_disjoint, assert_invalid_field};
    use storyloom_test_utils::fixtures::{backlog_of, mixed_backlog, scenario_backlog, story};

    fn optimal() -> SprintAllocator {
        SprintAllocator::default().with_strategy(AllocationStrategy::Optimal)
    }

    #[test]
    fn test_scenario_capacity_two_commits_both() {
        let plan = allocate(&scenario_backlog(), 2).unwrap();
        assert_eq!(plan.committed_ids(), vec!["UD-001", "UD-002"]);
        assert!(plan.stretch.is_empty());
        assert_eq!(plan.utilization, 100.0);
    }

    #[test]
    fn test_scenario_capacity_one_leaves_second_unscheduled() {
        let plan = allocate(&scenario_backlog(), 1).unwrap();
        assert_eq!(plan.committed_ids(), vec!["UD-001"]);
        // 1 + 1 > 1.2
        assert!(plan.stretch.is_empty());
        assert_eq!(plan.unscheduled, vec!["UD-002".to_string()]);
        assert_eq!(plan.utilization, 100.0);
    }

    #[test]
    fn test_non_positive_capacity_is_rejected() {
        for capacity in [0, -5] {
            let result = allocate(&scenario_backlog(), capacity);
            assert_invalid_field(&result, "capacity");
        }
        assert!(matches!(
            allocate(&scenario_backlog(), i64::from(u32::MAX) + 1),
            Err(StoryloomError::Validation(_))
        ));
    }

    #[test]
    fn test_empty_backlog_yields_empty_plan() {
        let plan = allocate(&backlog_of(vec![]), 10).unwrap();
        assert!(plan.committed.is_empty());
        assert!(plan.decisions.is_empty());
        assert_eq!(plan.utilization, 0.0);
        assert_eq!(plan.stretch_limit, 12);
    }

    #[test]
    fn test_scheduling_order() {
        let backlog = mixed_backlog();
        let ids: Vec<&str> = scheduling_order(&backlog).iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["MX-002", "MX-005", "MX-003", "MX-006", "MX-001", "MX-004"]);
    }

    #[test]
    fn test_insertion_order_breaks_full_ties() {
        let backlog = backlog_of(vec![
            story("T-002", 3, Priority::High),
            story("T-001", 3, Priority::High),
        ]);
        let ids: Vec<&str> = scheduling_order(&backlog).iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["T-002", "T-001"]);
    }

    #[test]
    fn test_greedy_commit_stretch_skip() {
        // order: MX-002(3) MX-005(3) MX-003(13) MX-006(1) MX-001(8) MX-004(1)
        let plan = allocate(&mixed_backlog(), 10).unwrap();
        assert_eq!(plan.committed_ids(), vec!["MX-002", "MX-005", "MX-006", "MX-004"]);
        assert_eq!(plan.committed_points, 8);
        assert!(plan.stretch.is_empty());
        assert_eq!(plan.unscheduled, vec!["MX-003".to_string(), "MX-001".to_string()]);
        assert_eq!(plan.utilization, 80.0);
        assert_capacity_invariant(&plan);
        assert_disjoint(&plan);
    }

    #[test]
    fn test_greedy_stretch_uses_ratio() {
        let backlog = backlog_of(vec![
            story("S-001", 8, Priority::High),
            story("S-002", 3, Priority::High),
            story("S-003", 3, Priority::Medium),
        ]);
        // order S-002, S-001, S-003; capacity 10 -> limit 12
        // commit 3, stretch 8 (11), then 3 more would plan 14 > 12
        let plan = allocate(&backlog, 10).unwrap();
        assert_eq!(plan.committed_ids(), vec!["S-002"]);
        assert_eq!(plan.stretch_ids(), vec!["S-001"]);
        assert_eq!(plan.unscheduled, vec!["S-003".to_string()]);
        assert_eq!(plan.utilization, 30.0);

        let config = PlannerConfig {
            stretch_ratio_percent: 150,
            ..PlannerConfig::default()
        };
        let plan = SprintAllocator::new(&config).unwrap().allocate(&backlog, 10).unwrap();
        assert_eq!(plan.stretch_limit, 15);
        assert_eq!(plan.committed_ids(), vec!["S-002", "S-003"]);
        assert_eq!(plan.stretch_ids(), vec!["S-001"]);
        assert_eq!(plan.total_points(), 14);
    }

    #[test]
    fn test_every_story_oversized() {
        let backlog = backlog_of(vec![story("O-001", 13, Priority::High), story("O-002", 8, Priority::Low)]);
        let plan = allocate(&backlog, 5).unwrap();
        assert!(plan.committed.is_empty());
        assert!(plan.stretch.is_empty());
        assert_eq!(plan.utilization, 0.0);
        assert_eq!(plan.decisions.len(), 2);
        assert!(plan.decisions.iter().all(|d| d.action == AllocationAction::Skip));
    }

    #[test]
    fn test_decision_trace_covers_every_story() {
        let plan = allocate(&mixed_backlog(), 10).unwrap();
        let traced: Vec<&str> = plan.decisions.iter().map(|d| d.story_id.as_str()).collect();
        assert_eq!(traced, vec!["MX-002", "MX-005", "MX-003", "MX-006", "MX-001", "MX-004"]);
        assert_eq!(plan.decisions[2].action, AllocationAction::Skip);
        assert!(plan.decisions[0].reason.starts_with("Fits capacity"));
    }

    #[test]
    fn test_optimal_fills_capacity_greedy_misses() {
        // greedy: 3 + 3 + 1 + 1 = 8 of 10; optimal finds 8 + 1 + 1 = 10
        let greedy = allocate(&mixed_backlog(), 10).unwrap();
        let best = optimal().allocate(&mixed_backlog(), 10).unwrap();
        assert_eq!(greedy.committed_points, 8);
        assert_eq!(best.committed_points, 10);
        assert_eq!(best.strategy, AllocationStrategy::Optimal);
        assert_capacity_invariant(&best);
        assert_disjoint(&best);
    }

    #[test]
    fn test_optimal_fills_stretch_from_remaining() {
        let backlog = backlog_of(vec![
            story("P-001", 8, Priority::High),
            story("P-002", 3, Priority::Medium),
            story("P-003", 1, Priority::Low),
        ]);
        // capacity 9 -> limit 10; commit 8 + 1, stretch has 1 point left: nothing fits
        let plan = optimal().allocate(&backlog, 9).unwrap();
        assert_eq!(plan.committed_points, 9);
        assert_eq!(plan.unscheduled, vec!["P-002".to_string()]);

        // capacity 10 -> limit 12; best commit is still 8 + 1, leaving 3 of stretch room
        let plan = optimal().allocate(&backlog, 10).unwrap();
        assert_eq!(plan.committed_points, 9);
        assert_eq!(plan.stretch_ids(), vec!["P-002"]);
        assert_eq!(plan.total_points(), 12);
    }

    #[test]
    fn test_stretch_limit_arithmetic() {
        assert_eq!(stretch_limit(1, 120), 1);
        assert_eq!(stretch_limit(5, 120), 6);
        assert_eq!(stretch_limit(13, 120), 15);
        assert_eq!(stretch_limit(10, 100), 10);
        assert_eq!(stretch_limit(u32::MAX, 200), u32::MAX);
    }

    #[test]
    fn test_allocator_from_invalid_config() {
        let config = PlannerConfig {
            stretch_ratio_percent: 250,
            ..PlannerConfig::default()
        };
        assert!(matches!(SprintAllocator::new(&config), Err(StoryloomError::Config(_))));
    }

    #[test]
    fn test_allocation_does_not_mutate_backlog() {
        let backlog = mixed_backlog();
        let before = backlog.clone();
        let _ = allocate(&backlog, 7).unwrap();
        assert_eq!(backlog, before);
    }
}
