//! Enum types for STORYLOOM entities

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// STORY ENUMS
// ============================================================================

/// Story priority. Declaration order is the scheduling order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

impl Priority {
    /// Every priority, highest first.
    pub const ALL: [Priority; 4] = [
        Priority::Critical,
        Priority::High,
        Priority::Medium,
        Priority::Low,
    ];

    /// Sort rank used by the sprint allocator (critical = 0 ... low = 3).
    pub fn rank(&self) -> u8 {
        match self {
            Priority::Critical => 0,
            Priority::High => 1,
            Priority::Medium => 2,
            Priority::Low => 3,
        }
    }

    /// Weight used when two selections carry the same number of points.
    /// Higher is more important.
    pub fn weight(&self) -> u64 {
        3 - u64::from(self.rank())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Critical => "critical",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = EnumParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "critical" => Ok(Priority::Critical),
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            _ => Err(EnumParseError::new("priority", s)),
        }
    }
}

/// Kind of backlog item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoryType {
    /// User-facing story tied to a persona
    Story,
    /// Technical-requirement story with no persona
    Enabler,
}

impl StoryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoryType::Story => "story",
            StoryType::Enabler => "enabler",
        }
    }
}

impl fmt::Display for StoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Complexity bucket an action verb falls into.
///
/// Each bucket maps to exactly one value on the story point scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ComplexityBucket {
    /// View/read-only actions (1 point)
    ReadOnly,
    /// Create/edit/update actions (3 points)
    #[default]
    Standard,
    /// Integration and advanced-feature actions (8 points)
    Integration,
    /// Redesign/refactor/architecture actions (13 points)
    Architecture,
}

impl ComplexityBucket {
    pub const ALL: [ComplexityBucket; 4] = [
        ComplexityBucket::ReadOnly,
        ComplexityBucket::Standard,
        ComplexityBucket::Integration,
        ComplexityBucket::Architecture,
    ];

    /// Story points for this bucket.
    pub fn points(&self) -> u32 {
        match self {
            ComplexityBucket::ReadOnly => 1,
            ComplexityBucket::Standard => 3,
            ComplexityBucket::Integration => 8,
            ComplexityBucket::Architecture => 13,
        }
    }

    /// Inverse of [`ComplexityBucket::points`].
    pub fn from_points(points: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|bucket| bucket.points() == points)
    }
}

// ============================================================================
// ALLOCATION ENUMS
// ============================================================================

/// How the sprint allocator selects stories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AllocationStrategy {
    /// Single-pass greedy walk with no back-fill
    #[default]
    Greedy,
    /// Knapsack selection maximizing committed points
    Optimal,
}

impl AllocationStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            AllocationStrategy::Greedy => "greedy",
            AllocationStrategy::Optimal => "optimal",
        }
    }
}

impl fmt::Display for AllocationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AllocationStrategy {
    type Err = EnumParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "greedy" => Ok(AllocationStrategy::Greedy),
            "optimal" => Ok(AllocationStrategy::Optimal),
            _ => Err(EnumParseError::new("allocation strategy", s)),
        }
    }
}

/// Action the allocator took for one story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllocationAction {
    /// Placed in the committed list
    Commit,
    /// Placed in the stretch list
    Stretch,
    /// Left unscheduled this sprint
    Skip,
}

// ============================================================================
// PARSE ERROR
// ============================================================================

/// Error when parsing an enum from its string form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumParseError {
    pub kind: &'static str,
    pub value: String,
}

impl EnumParseError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

impl fmt::Display for EnumParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid {}: {}", self.kind, self.value)
    }
}

impl std::error::Error for EnumParseError {}
