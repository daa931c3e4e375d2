//! Backlog report document
//!
//! The serialized output shape shared by every renderer: metadata, the full
//! story list and an optional sprint section that references stories by id.

use crate::{AllocationStrategy, Backlog, Priority, SprintPlan, Story};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tool name written into report metadata.
pub const TOOL_NAME: &str = "storyloom";

/// Tool version written into report metadata.
pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub tool: String,
    pub version: String,
    pub total_stories: usize,
    pub total_points: u32,
    pub priority_breakdown: BTreeMap<Priority, usize>,
}

/// Sprint section of a report. Stories are referenced by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SprintSummary {
    pub capacity: u32,
    pub strategy: AllocationStrategy,
    pub committed: Vec<String>,
    pub stretch: Vec<String>,
    pub committed_points: u32,
    pub stretch_points: u32,
    /// Committed plus stretch points
    pub total_points: u32,
    pub utilization: f64,
}

impl From<&SprintPlan> for SprintSummary {
    fn from(plan: &SprintPlan) -> Self {
        Self {
            capacity: plan.capacity,
            strategy: plan.strategy,
            committed: plan.committed_ids(),
            stretch: plan.stretch_ids(),
            committed_points: plan.committed_points,
            stretch_points: plan.stretch_points,
            total_points: plan.total_points(),
            utilization: plan.utilization,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacklogReport {
    pub metadata: ReportMetadata,
    pub stories: Vec<Story>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprint: Option<SprintSummary>,
}

impl BacklogReport {
    pub fn new(backlog: &Backlog, plan: Option<&SprintPlan>) -> Self {
        Self {
            metadata: ReportMetadata {
                tool: TOOL_NAME.to_string(),
                version: TOOL_VERSION.to_string(),
                total_stories: backlog.stories.len(),
                total_points: backlog.total_points,
                priority_breakdown: backlog.priority_breakdown.clone(),
            },
            stories: backlog.stories.clone(),
            sprint: plan.map(SprintSummary::from),
        }
    }

    /// Resolve story ids from the sprint section against the story list.
    pub fn sprint_stories<'a>(&'a self, ids: &'a [String]) -> impl Iterator<Item = &'a Story> + 'a {
        ids.iter()
            .filter_map(move |id| self.stories.iter().find(|s| &s.id == id))
    }
}
