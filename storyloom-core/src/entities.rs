//! Entity types: epics, stories, backlogs and sprint plans

use crate::{
    content_hash_hex, AllocationAction, AllocationStrategy, PersonaId, Priority, StoryType,
    StoryloomError, StoryloomResult, ValidationError,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fixed number of acceptance criteria generated for every story.
pub const ACCEPTANCE_CRITERIA_COUNT: usize = 5;

/// Stories at or below this estimate are considered small.
pub const SMALL_STORY_MAX_POINTS: u32 = 8;

// ============================================================================
// EPIC
// ============================================================================

/// High-level input record decomposed into stories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Epic {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Persona ids; the first listed is the primary persona
    #[serde(default)]
    pub personas: Vec<PersonaId>,
    /// Capability phrases, order-preserving
    pub scope: Vec<String>,
    /// Phrases that become enabler stories
    #[serde(default)]
    pub technical_requirements: Vec<String>,
}

impl Epic {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            personas: Vec::new(),
            scope: Vec::new(),
            technical_requirements: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_personas<I, P>(mut self, personas: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PersonaId>,
    {
        self.personas = personas.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_scope<I, S>(mut self, scope: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scope = scope.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_technical_requirements<I, S>(mut self, requirements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.technical_requirements = requirements.into_iter().map(Into::into).collect();
        self
    }

    /// Parse an epic from its JSON document form.
    pub fn from_json(input: &str) -> StoryloomResult<Self> {
        serde_json::from_str(input).map_err(|e| {
            StoryloomError::Validation(ValidationError::MalformedEpic {
                reason: e.to_string(),
            })
        })
    }

    /// Validate the structural invariants of the epic.
    ///
    /// Validates:
    /// - scope has at least one item
    /// - every scope item and technical requirement is non-blank
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.scope.is_empty() {
            return Err(ValidationError::RequiredFieldMissing {
                field: "scope".to_string(),
            });
        }

        if let Some(idx) = self.scope.iter().position(|s| s.trim().is_empty()) {
            return Err(ValidationError::invalid(
                format!("scope[{}]", idx),
                "scope items must not be blank",
            ));
        }

        if let Some(idx) = self
            .technical_requirements
            .iter()
            .position(|t| t.trim().is_empty())
        {
            return Err(ValidationError::invalid(
                format!("technical_requirements[{}]", idx),
                "technical requirements must not be blank",
            ));
        }

        Ok(())
    }

    /// The first-listed persona, if any.
    pub fn primary_persona(&self) -> Option<&PersonaId> {
        self.personas.first()
    }
}

// ============================================================================
// STORY
// ============================================================================

/// The six INVEST qualities of a story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvestCheck {
    pub independent: bool,
    pub negotiable: bool,
    pub valuable: bool,
    pub estimable: bool,
    pub small: bool,
    pub testable: bool,
}

impl InvestCheck {
    /// Compute the flags from the story fields they depend on.
    pub fn evaluate(estimation: u32, dependencies: &[String], acceptance_criteria: &[String]) -> Self {
        Self {
            independent: dependencies.is_empty(),
            negotiable: true,
            valuable: true,
            estimable: true,
            small: estimation <= SMALL_STORY_MAX_POINTS,
            testable: !acceptance_criteria.is_empty(),
        }
    }

    /// Flags as `(name, value)` pairs in INVEST order.
    pub fn pairs(&self) -> [(&'static str, bool); 6] {
        [
            ("independent", self.independent),
            ("negotiable", self.negotiable),
            ("valuable", self.valuable),
            ("estimable", self.estimable),
            ("small", self.small),
            ("testable", self.testable),
        ]
    }

    pub fn all_passed(&self) -> bool {
        self.pairs().iter().all(|(_, ok)| *ok)
    }

    /// Names of the flags that are false.
    pub fn failures(&self) -> Vec<&'static str> {
        self.pairs()
            .iter()
            .filter(|(_, ok)| !ok)
            .map(|(name, _)| *name)
            .collect()
    }
}

/// A fully specified backlog item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    /// `{PREFIX}-{n:03}`
    pub id: String,
    #[serde(rename = "type")]
    pub story_type: StoryType,
    pub title: String,
    pub narrative: String,
    /// Exactly [`ACCEPTANCE_CRITERIA_COUNT`] criteria in fixed order
    pub acceptance_criteria: Vec<String>,
    /// Story points on the 1/3/8/13 scale
    pub estimation: u32,
    pub priority: Priority,
    /// Ids of enabler stories this story depends on
    pub dependencies: Vec<String>,
    pub invest_check: InvestCheck,
    /// Persona the story was written for; absent on enablers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona: Option<PersonaId>,
}

impl Story {
    pub fn is_enabler(&self) -> bool {
        self.story_type == StoryType::Enabler
    }
}

/// Format a story id from its prefix and 1-based sequence number.
pub fn story_id(prefix: &str, sequence: usize) -> String {
    format!("{}-{:03}", prefix, sequence)
}

// ============================================================================
// BACKLOG
// ============================================================================

/// Aggregate of all stories produced by one decomposition run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Backlog {
    /// Stories in generation order
    pub stories: Vec<Story>,
    pub total_points: u32,
    /// Count per priority; every priority is present
    pub priority_breakdown: BTreeMap<Priority, usize>,
}

impl Backlog {
    pub fn len(&self) -> usize {
        self.stories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stories.is_empty()
    }

    /// Look a story up by id.
    pub fn story(&self, id: &str) -> Option<&Story> {
        self.stories.iter().find(|s| s.id == id)
    }

    /// SHA-256 of the canonical JSON form, hex encoded.
    ///
    /// Two backlogs with the same fingerprint serialize to identical bytes.
    pub fn fingerprint(&self) -> StoryloomResult<String> {
        let bytes = serde_json::to_vec(self).map_err(|e| StoryloomError::Serialization {
            reason: e.to_string(),
        })?;
        Ok(content_hash_hex(&bytes))
    }
}

// ============================================================================
// SPRINT PLAN
// ============================================================================

/// One entry in the allocation trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationDecision {
    pub story_id: String,
    pub action: AllocationAction,
    pub estimation: u32,
    pub reason: String,
}

/// Capacity-bounded selection of backlog stories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SprintPlan {
    /// Points the team can commit to
    pub capacity: u32,
    pub strategy: AllocationStrategy,
    /// Ceiling for committed + stretch points
    pub stretch_limit: u32,
    pub committed: Vec<Story>,
    pub stretch: Vec<Story>,
    pub committed_points: u32,
    pub stretch_points: u32,
    /// committed_points / capacity as a percentage, one decimal
    pub utilization: f64,
    /// Ids of walked stories that landed in neither list
    pub unscheduled: Vec<String>,
    pub decisions: Vec<AllocationDecision>,
}

impl SprintPlan {
    pub fn committed_ids(&self) -> Vec<String> {
        self.committed.iter().map(|s| s.id.clone()).collect()
    }

    pub fn stretch_ids(&self) -> Vec<String> {
        self.stretch.iter().map(|s| s.id.clone()).collect()
    }

    /// Committed plus stretch points.
    pub fn total_points(&self) -> u32 {
        self.committed_points + self.stretch_points
    }
}

/// Round a percentage to one decimal place.
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

// =============================================================================
// TESTS
// =============================================================================
