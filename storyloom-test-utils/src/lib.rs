//! STORYLOOM Test Utilities
//!
//! Centralized test infrastructure for the STORYLOOM workspace:
//! - Proptest generators for epics, stories, backlogs and inputs
//! - Test fixtures for common scenarios
//! - Custom assertions for STORYLOOM-specific invariants

// Re-export core types for convenience
pub use storyloom_core::{
    story_id, AllocationAction, AllocationStrategy, Backlog, ComplexityBucket, ConfigError,
    DivisionError, Epic, InvestCheck, PersonaId, PlannerConfig, Priority, SprintPlan, Story,
    StoryType, StoryloomError, StoryloomResult, ValidationError, ACCEPTANCE_CRITERIA_COUNT,
    STORY_POINT_SCALE,
};

use std::collections::BTreeMap;

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for generating STORYLOOM inputs.

    use super::*;
    use proptest::prelude::*;

    const VERBS: &[&str] = &[
        "View", "Export", "Browse", "Edit", "Create", "Manage", "Integrate", "Sync", "Redesign",
        "Migrate", "Fix", "Dark", "Quickly view",
    ];

    const OBJECTS: &[&str] = &[
        "metrics",
        "profile",
        "reports",
        "billing data",
        "calendar",
        "notifications",
        "search index",
        "dashboard",
    ];

    const SUFFIXES: &[&str] = &["", " (nice to have)", " so that I save time", " in order to plan"];

    const REQUIREMENTS: &[&str] = &[
        "Metrics API",
        "Authentication service",
        "Event store migration",
        "Report cache",
        "Search index rebuild",
        "Set up notification queue",
    ];

    // === Enum Generators ===

    /// Generate a Priority.
    pub fn arb_priority() -> impl Strategy<Value = Priority> {
        prop::sample::select(Priority::ALL.to_vec())
    }

    /// Generate a ComplexityBucket.
    pub fn arb_complexity_bucket() -> impl Strategy<Value = ComplexityBucket> {
        prop::sample::select(ComplexityBucket::ALL.to_vec())
    }

    /// Generate an AllocationStrategy.
    pub fn arb_strategy() -> impl Strategy<Value = AllocationStrategy> {
        prop_oneof![
            Just(AllocationStrategy::Greedy),
            Just(AllocationStrategy::Optimal),
        ]
    }

    /// Generate a raw persona id: mostly built-ins, sometimes unknown.
    pub fn arb_persona_id() -> impl Strategy<Value = String> {
        prop_oneof![
            3 => prop::sample::select(vec!["end_user", "admin", "power_user", "new_user"])
                .prop_map(str::to_string),
            1 => "[a-z]{3,8}_role",
        ]
    }

    // === Phrase Generators ===

    /// Generate a scope phrase from the verb and object pools.
    pub fn arb_scope_phrase() -> impl Strategy<Value = String> {
        (
            prop::sample::select(VERBS.to_vec()),
            prop::sample::select(OBJECTS.to_vec()),
            prop::sample::select(SUFFIXES.to_vec()),
        )
            .prop_map(|(verb, object, suffix)| format!("{} {}{}", verb, object, suffix))
    }

    /// Generate a technical requirement phrase.
    pub fn arb_requirement() -> impl Strategy<Value = String> {
        prop::sample::select(REQUIREMENTS.to_vec()).prop_map(str::to_string)
    }

    /// Generate an epic name of one to four words.
    pub fn arb_epic_name() -> impl Strategy<Value = String> {
        "[A-Z][a-z]{2,8}( [A-Z][a-z]{2,8}){0,3}"
    }

    // === Entity Generators ===

    /// Generate a valid Epic (non-empty scope, no blank phrases).
    pub fn arb_epic() -> impl Strategy<Value = Epic> {
        (
            arb_epic_name(),
            prop::collection::vec(arb_persona_id(), 0..4),
            prop::collection::vec(arb_scope_phrase(), 1..5),
            prop::collection::vec(arb_requirement(), 0..3),
        )
            .prop_map(|(name, personas, scope, requirements)| {
                Epic::new(name)
                    .with_personas(personas)
                    .with_scope(scope)
                    .with_technical_requirements(requirements)
            })
    }

    /// Generate a Story with the given id.
    pub fn arb_story(id: String) -> impl Strategy<Value = Story> {
        (
            prop::sample::select(STORY_POINT_SCALE.to_vec()),
            arb_priority(),
            any::<bool>(),
        )
            .prop_map(move |(estimation, priority, enabler)| {
                let mut story = fixtures::story(&id, estimation, priority);
                if enabler {
                    story.story_type = StoryType::Enabler;
                    story.persona = None;
                }
                story
            })
    }

    /// Generate a backlog of up to `max_len` stories with ids `GEN-001...`.
    pub fn arb_backlog(max_len: usize) -> impl Strategy<Value = Backlog> {
        (0..=max_len)
            .prop_flat_map(|len| {
                (1..=len)
                    .map(|seq| arb_story(story_id("GEN", seq)))
                    .collect::<Vec<_>>()
            })
            .prop_map(fixtures::backlog_of)
    }

    /// Generate a positive sprint capacity.
    pub fn arb_capacity() -> impl Strategy<Value = i64> {
        1i64..60
    }

    /// Generate a stretch ratio within the accepted range.
    pub fn arb_stretch_ratio() -> impl Strategy<Value = u32> {
        100u32..=200
    }

    /// Generate a valid PlannerConfig.
    pub fn arb_valid_config() -> impl Strategy<Value = PlannerConfig> {
        (
            arb_stretch_ratio(),
            arb_strategy(),
            prop::option::of(1u32..100),
            prop::option::of("[A-Z]{2,4}"),
        )
            .prop_map(|(stretch_ratio_percent, strategy, default_capacity, id_prefix)| {
                PlannerConfig {
                    stretch_ratio_percent,
                    strategy,
                    default_capacity,
                    id_prefix,
                    custom_personas: Vec::new(),
                }
            })
    }

    /// Generate raw RICE inputs `(reach, impact, confidence, effort)` that
    /// pass validation.
    pub fn arb_rice_values() -> impl Strategy<Value = (f64, f64, f64, f64)> {
        (0.0f64..10_000.0, 0.0f64..5.0, 0.01f64..=1.0, 0.1f64..100.0)
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built test fixtures for common testing scenarios.

    use super::*;

    /// The two-story dashboard epic: both scope items are read-only.
    pub fn dashboard_epic() -> Epic {
        Epic::new("User Dashboard")
            .with_description("Usage insight for everyday users")
            .with_personas(["end_user"])
            .with_scope(["View metrics", "Export data"])
    }

    /// A larger epic with several personas and enablers.
    pub fn platform_epic() -> Epic {
        Epic::new("Team Collaboration Platform")
            .with_description("Shared workspace for distributed teams")
            .with_personas(["power_user", "end_user", "admin"])
            .with_scope([
                "Edit shared documents",
                "Integrate with calendar",
                "Redesign notification center",
                "Fix broken file uploads",
                "Custom themes (nice to have)",
            ])
            .with_technical_requirements(["Document storage service", "Calendar sync worker"])
    }

    /// Create a story with fixed criteria and computed INVEST flags.
    pub fn story(id: &str, estimation: u32, priority: Priority) -> Story {
        let acceptance_criteria: Vec<String> = (1..=ACCEPTANCE_CRITERIA_COUNT)
            .map(|n| format!("Criterion {}", n))
            .collect();
        Story {
            id: id.to_string(),
            story_type: StoryType::Story,
            title: format!("Story {}", id),
            narrative: format!("As a user, I want story {} so that it ships", id),
            invest_check: InvestCheck::evaluate(estimation, &[], &acceptance_criteria),
            acceptance_criteria,
            estimation,
            priority,
            dependencies: Vec::new(),
            persona: Some(PersonaId::EndUser),
        }
    }

    /// Wrap stories in a backlog, computing totals.
    pub fn backlog_of(stories: Vec<Story>) -> Backlog {
        let mut priority_breakdown: BTreeMap<Priority, usize> =
            Priority::ALL.iter().map(|p| (*p, 0)).collect();
        for story in &stories {
            *priority_breakdown.entry(story.priority).or_insert(0) += 1;
        }
        Backlog {
            total_points: stories.iter().map(|s| s.estimation).sum(),
            stories,
            priority_breakdown,
        }
    }

    /// The dashboard backlog: two one-point high stories.
    pub fn scenario_backlog() -> Backlog {
        backlog_of(vec![
            story("UD-001", 1, Priority::High),
            story("UD-002", 1, Priority::High),
        ])
    }

    /// A mixed backlog that exercises every priority and bucket.
    pub fn mixed_backlog() -> Backlog {
        backlog_of(vec![
            story("MX-001", 8, Priority::Medium),
            story("MX-002", 3, Priority::Critical),
            story("MX-003", 13, Priority::High),
            story("MX-004", 1, Priority::Low),
            story("MX-005", 3, Priority::High),
            story("MX-006", 1, Priority::Medium),
        ])
    }

    /// Default configuration.
    pub fn minimal_config() -> PlannerConfig {
        PlannerConfig::default()
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Custom assertion functions for STORYLOOM-specific validation.

    use super::*;

    /// Assert that a StoryloomResult is Ok.
    #[track_caller]
    pub fn assert_ok<T: std::fmt::Debug>(result: &StoryloomResult<T>) {
        assert!(result.is_ok(), "Expected Ok, got Err: {:?}", result);
    }

    /// Assert that a StoryloomResult is Err.
    #[track_caller]
    pub fn assert_err<T: std::fmt::Debug>(result: &StoryloomResult<T>) {
        assert!(result.is_err(), "Expected Err, got Ok: {:?}", result);
    }

    /// Assert that a StoryloomResult is a Validation error.
    #[track_caller]
    pub fn assert_validation_error<T: std::fmt::Debug>(result: &StoryloomResult<T>) {
        match result {
            Err(StoryloomError::Validation(_)) => {}
            other => panic!("Expected Validation error, got: {:?}", other),
        }
    }

    /// Assert that a StoryloomResult is a Validation error naming `field`.
    #[track_caller]
    pub fn assert_invalid_field<T: std::fmt::Debug>(result: &StoryloomResult<T>, field: &str) {
        match result {
            Err(StoryloomError::Validation(ValidationError::InvalidValue { field: f, .. }))
            | Err(StoryloomError::Validation(ValidationError::RequiredFieldMissing { field: f })) => {
                assert_eq!(f, field, "Wrong field in validation error");
            }
            other => panic!("Expected validation error for {}, got: {:?}", field, other),
        }
    }

    /// Assert that a StoryloomResult is a Division error.
    #[track_caller]
    pub fn assert_division_error<T: std::fmt::Debug>(result: &StoryloomResult<T>) {
        match result {
            Err(StoryloomError::Division(_)) => {}
            other => panic!("Expected Division error, got: {:?}", other),
        }
    }

    /// Assert that a StoryloomResult is a Config error.
    #[track_caller]
    pub fn assert_config_error<T: std::fmt::Debug>(result: &StoryloomResult<T>) {
        match result {
            Err(StoryloomError::Config(_)) => {}
            other => panic!("Expected Config error, got: {:?}", other),
        }
    }

    /// Assert that a story is internally consistent.
    #[track_caller]
    pub fn assert_story_well_formed(story: &Story) {
        assert!(
            STORY_POINT_SCALE.contains(&story.estimation),
            "{} has off-scale estimation {}",
            story.id,
            story.estimation
        );
        assert_eq!(
            story.acceptance_criteria.len(),
            ACCEPTANCE_CRITERIA_COUNT,
            "{} has wrong criteria count",
            story.id
        );
        assert_eq!(
            story.invest_check,
            InvestCheck::evaluate(story.estimation, &story.dependencies, &story.acceptance_criteria),
            "{} has stale INVEST flags",
            story.id
        );
        assert_eq!(
            story.persona.is_none(),
            story.story_type == StoryType::Enabler,
            "{}: persona must be set exactly on user stories",
            story.id
        );
    }

    /// Assert that backlog totals match its stories.
    #[track_caller]
    pub fn assert_backlog_consistent(backlog: &Backlog) {
        let points: u32 = backlog.stories.iter().map(|s| s.estimation).sum();
        assert_eq!(backlog.total_points, points, "total_points mismatch");
        for priority in Priority::ALL {
            let count = backlog.stories.iter().filter(|s| s.priority == priority).count();
            assert_eq!(
                backlog.priority_breakdown.get(&priority).copied(),
                Some(count),
                "breakdown mismatch for {}",
                priority
            );
        }
    }

    /// Assert the capacity bounds of a sprint plan.
    #[track_caller]
    pub fn assert_capacity_invariant(plan: &SprintPlan) {
        assert!(
            plan.committed_points <= plan.capacity,
            "committed {} exceeds capacity {}",
            plan.committed_points,
            plan.capacity
        );
        assert!(
            plan.total_points() <= plan.stretch_limit,
            "committed + stretch {} exceeds stretch limit {}",
            plan.total_points(),
            plan.stretch_limit
        );
        let committed: u32 = plan.committed.iter().map(|s| s.estimation).sum();
        let stretch: u32 = plan.stretch.iter().map(|s| s.estimation).sum();
        assert_eq!(plan.committed_points, committed, "committed_points mismatch");
        assert_eq!(plan.stretch_points, stretch, "stretch_points mismatch");
    }

    /// Assert that committed, stretch and unscheduled never share a story.
    #[track_caller]
    pub fn assert_disjoint(plan: &SprintPlan) {
        let mut seen = std::collections::BTreeSet::new();
        let ids = plan
            .committed
            .iter()
            .chain(plan.stretch.iter())
            .map(|s| s.id.as_str())
            .chain(plan.unscheduled.iter().map(String::as_str));
        for id in ids {
            assert!(seen.insert(id), "story {} appears in more than one list", id);
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_minimal_config_is_valid() {
        assertions::assert_ok(&fixtures::minimal_config().validate());
    }

    #[test]
    fn test_epic_fixtures_are_valid() {
        assert!(fixtures::dashboard_epic().validate().is_ok());
        assert!(fixtures::platform_epic().validate().is_ok());
    }

    #[test]
    fn test_fixture_backlogs_are_consistent() {
        assertions::assert_backlog_consistent(&fixtures::scenario_backlog());
        assertions::assert_backlog_consistent(&fixtures::mixed_backlog());
        assert_eq!(fixtures::scenario_backlog().total_points, 2);
    }

    #[test]
    fn test_assertion_invalid_field() {
        let result: StoryloomResult<()> = Err(ValidationError::invalid("capacity", "must be > 0").into());
        assertions::assert_invalid_field(&result, "capacity");
    }

    #[test]
    #[should_panic(expected = "Expected Division error")]
    fn test_assertion_division_error_rejects_ok() {
        assertions::assert_division_error(&Ok(1.0));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn prop_generated_epic_is_valid(epic in generators::arb_epic()) {
            prop_assert!(epic.validate().is_ok());
        }

        #[test]
        fn prop_generated_config_is_valid(config in generators::arb_valid_config()) {
            assertions::assert_ok(&config.validate());
        }

        #[test]
        fn prop_generated_backlog_is_consistent(backlog in generators::arb_backlog(12)) {
            assertions::assert_backlog_consistent(&backlog);
            for story in &backlog.stories {
                assertions::assert_story_well_formed(story);
            }
        }
    }
}
