//! Epic decomposition
//!
//! Expands an epic into an ordered list of story candidates: one per
//! (scope item, persona) pair, followed by one enabler per technical
//! requirement. Candidate `n` (1-based) becomes story `{PREFIX}-{n:03}`.

use crate::linking::DependencyLinker;
use storyloom_core::{Epic, Persona, PersonaId, PersonaRegistry, ValidationError};

/// Prefix used when an epic name has no alphanumeric characters.
pub const FALLBACK_PREFIX: &str = "STORY";

/// Maximum words (or characters, for single-word names) used for a prefix.
const PREFIX_MAX_LEN: usize = 4;

/// Derive the story id prefix from an epic name.
///
/// - two or more words: uppercase initials of the first four words
/// - one word: its first four characters, uppercased
/// - no alphanumerics: [`FALLBACK_PREFIX`]
pub fn derive_prefix(epic_name: &str) -> String {
    let words: Vec<&str> = epic_name
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    match words.as_slice() {
        [] => FALLBACK_PREFIX.to_string(),
        [word] => word.chars().take(PREFIX_MAX_LEN).collect::<String>().to_uppercase(),
        _ => words
            .iter()
            .take(PREFIX_MAX_LEN)
            .filter_map(|w| w.chars().next())
            .collect::<String>()
            .to_uppercase(),
    }
}

/// One unit of decomposition output, not yet synthesized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryCandidate {
    /// 1-based position in the backlog
    pub sequence: usize,
    pub phrase: String,
    /// Persona for user stories; `None` marks an enabler
    pub persona: Option<Persona>,
    /// Sequence numbers of the enablers this candidate depends on
    pub depends_on: Vec<usize>,
}

impl StoryCandidate {
    pub fn is_enabler(&self) -> bool {
        self.persona.is_none()
    }
}

/// Result of decomposing one epic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decomposition {
    /// The epic's first-listed persona (or the fallback persona)
    pub primary: PersonaId,
    /// Resolved personas in canonical order
    pub personas: Vec<Persona>,
    pub candidates: Vec<StoryCandidate>,
}

/// Expands epics against a persona registry.
#[derive(Debug, Clone, Copy)]
pub struct EpicDecomposer<'a> {
    registry: &'a PersonaRegistry,
    linker: &'a dyn DependencyLinker,
}

impl<'a> EpicDecomposer<'a> {
    pub fn new(registry: &'a PersonaRegistry, linker: &'a dyn DependencyLinker) -> Self {
        Self { registry, linker }
    }

    /// Resolve the epic's persona list.
    ///
    /// Registered personas come first in registry order, unknown ids follow
    /// in the order they were listed. Duplicates collapse. An empty list
    /// falls back to `end_user`. Returns the primary persona id alongside.
    pub fn resolve_personas(&self, epic: &Epic) -> (PersonaId, Vec<Persona>) {
        if epic.personas.is_empty() {
            tracing::warn!(
                epic = %epic.name,
                fallback = %PersonaId::EndUser,
                "Epic lists no personas; using default persona"
            );
            let persona = self.lookup(&PersonaId::EndUser);
            return (PersonaId::EndUser, vec![persona]);
        }

        let mut unique: Vec<&PersonaId> = Vec::with_capacity(epic.personas.len());
        for id in &epic.personas {
            if unique.contains(&id) {
                tracing::warn!(epic = %epic.name, persona = %id, "Duplicate persona id collapsed");
            } else {
                unique.push(id);
            }
        }

        let (mut known, unknown): (Vec<&PersonaId>, Vec<&PersonaId>) = unique
            .into_iter()
            .partition(|id| self.registry.position(id).is_some());
        known.sort_by_key(|id| self.registry.position(id));

        for id in &unknown {
            tracing::warn!(
                epic = %epic.name,
                persona = %id,
                "Unknown persona id; using synthetic persona with default needs"
            );
        }

        let personas = known
            .into_iter()
            .chain(unknown)
            .map(|id| self.lookup(id))
            .collect();

        let primary = epic
            .primary_persona()
            .cloned()
            .unwrap_or(PersonaId::EndUser);
        (primary, personas)
    }

    fn lookup(&self, id: &PersonaId) -> Persona {
        self.registry
            .resolve(id)
            .cloned()
            .unwrap_or_else(|| Persona::synthetic(id.clone()))
    }

    /// Expand an epic into candidates.
    ///
    /// Produces `scope.len() * personas.len() + technical_requirements.len()`
    /// candidates with contiguous sequence numbers starting at 1.
    pub fn decompose(&self, epic: &Epic) -> Result<Decomposition, ValidationError> {
        epic.validate()?;

        let (primary, personas) = self.resolve_personas(epic);
        let first_enabler = epic.scope.len() * personas.len() + 1;

        let mut candidates =
            Vec::with_capacity(epic.scope.len() * personas.len() + epic.technical_requirements.len());

        for item in &epic.scope {
            let depends_on: Vec<usize> = epic
                .technical_requirements
                .iter()
                .enumerate()
                .filter(|(_, requirement)| self.linker.links(requirement, item))
                .map(|(idx, _)| first_enabler + idx)
                .collect();

            for persona in &personas {
                candidates.push(StoryCandidate {
                    sequence: candidates.len() + 1,
                    phrase: item.trim().to_string(),
                    persona: Some(persona.clone()),
                    depends_on: depends_on.clone(),
                });
            }
        }

        for requirement in &epic.technical_requirements {
            candidates.push(StoryCandidate {
                sequence: candidates.len() + 1,
                phrase: requirement.trim().to_string(),
                persona: None,
                depends_on: Vec::new(),
            });
        }

        tracing::debug!(
            epic = %epic.name,
            personas = personas.len(),
            candidates = candidates.len(),
            "Epic decomposed"
        );

        Ok(Decomposition {
            primary,
            personas,
            candidates,
        })
    }
}
