//! STORYLOOM Backlog - Epic to Backlog Pipeline
//!
//! Decomposes an epic into story candidates, synthesizes each candidate into
//! a story and aggregates the result into a [`Backlog`]. Every stage is a pure
//! function of its inputs: planning the same epic twice yields byte-identical
//! output.
//!
//! RICE scoring lives in [`rice`] and is applied on demand to an existing
//! backlog.

pub mod aggregate;
pub mod decompose;
pub mod linking;
pub mod rice;
pub mod rules;
pub mod synthesize;

pub use aggregate::aggregate;
pub use decompose::{derive_prefix, Decomposition, EpicDecomposer, StoryCandidate, FALLBACK_PREFIX};
pub use linking::{DependencyLinker, NoLinking, TokenOverlapLinker};
pub use rice::{normalize, rank, reorder_backlog, score, RankedItem, RiceInput};
pub use rules::{
    classify, ComplexityRule, PriorityCondition, PriorityContext, PriorityRule, PriorityRules,
    VerbMatch, COMPLEXITY_TABLE,
};
pub use synthesize::{CriterionKind, StorySynthesizer};

use storyloom_core::{Backlog, Epic, PersonaRegistry, PlannerConfig, StoryloomResult};

// ============================================================================
// PLANNER
// ============================================================================

/// Configured epic-to-backlog pipeline.
#[derive(Debug)]
pub struct BacklogPlanner {
    registry: PersonaRegistry,
    rules: PriorityRules,
    linker: Box<dyn DependencyLinker>,
    id_prefix: Option<String>,
}

impl Default for BacklogPlanner {
    fn default() -> Self {
        Self {
            registry: PersonaRegistry::default(),
            rules: PriorityRules::default(),
            linker: Box::new(TokenOverlapLinker),
            id_prefix: None,
        }
    }
}

impl BacklogPlanner {
    /// Create a planner from configuration.
    ///
    /// Returns an error if the configuration fails validation.
    pub fn new(config: &PlannerConfig) -> StoryloomResult<Self> {
        config.validate()?;
        Ok(Self {
            registry: config.persona_registry()?,
            id_prefix: config.id_prefix.clone(),
            ..Self::default()
        })
    }

    /// Replace the priority rule table.
    pub fn with_rules(mut self, rules: PriorityRules) -> Self {
        self.rules = rules;
        self
    }

    /// Replace the dependency linking strategy.
    pub fn with_linker(mut self, linker: impl DependencyLinker + 'static) -> Self {
        self.linker = Box::new(linker);
        self
    }

    pub fn registry(&self) -> &PersonaRegistry {
        &self.registry
    }

    pub fn rules(&self) -> &PriorityRules {
        &self.rules
    }

    /// Story id prefix used for an epic.
    pub fn prefix_for(&self, epic: &Epic) -> String {
        self.id_prefix
            .clone()
            .unwrap_or_else(|| derive_prefix(&epic.name))
    }

    /// Decompose an epic without synthesizing.
    pub fn decompose(&self, epic: &Epic) -> StoryloomResult<Decomposition> {
        Ok(EpicDecomposer::new(&self.registry, self.linker.as_ref()).decompose(epic)?)
    }

    /// Run the full pipeline: decompose, synthesize, aggregate.
    pub fn plan(&self, epic: &Epic) -> StoryloomResult<Backlog> {
        let decomposition = self.decompose(epic)?;
        let prefix = self.prefix_for(epic);
        let synthesizer =
            StorySynthesizer::new(&prefix, &epic.name, &decomposition.primary, &self.rules);

        let stories = decomposition
            .candidates
            .iter()
            .map(|candidate| synthesizer.synthesize(candidate, candidate.sequence))
            .collect();
        let backlog = aggregate(stories);

        tracing::info!(
            epic = %epic.name,
            prefix = %prefix,
            stories = backlog.len(),
            total_points = backlog.total_points,
            "Backlog planned"
        );

        Ok(backlog)
    }
}

/// Plan a backlog with the default configuration.
pub fn plan_backlog(epic: &Epic) -> StoryloomResult<Backlog> {
    BacklogPlanner::default().plan(epic)
}
