//! Story synthesis
//!
//! Turns a [`StoryCandidate`] into a fully specified [`Story`] by template
//! substitution. No step here can fail: unknown verbs fall back to the
//! default bucket and unmatched phrases to the default priority.

use crate::decompose::StoryCandidate;
use crate::rules::{bucket_for_token, classify, tokens, PriorityContext, PriorityRules, FALLBACK_PRIORITY};
use storyloom_core::{
    story_id, InvestCheck, Persona, PersonaId, Story, StoryType, ACCEPTANCE_CRITERIA_COUNT,
};

/// Markers that introduce an explicit benefit clause.
pub const BENEFIT_MARKERS: [&str; 2] = [" so that ", " in order to "];

/// Benefit used for enablers without an explicit benefit clause.
pub const ENABLER_BENEFIT: &str = "dependent user stories can be delivered";

// ============================================================================
// ACCEPTANCE CRITERIA
// ============================================================================

/// Position of each generated acceptance criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CriterionKind {
    HappyPath = 0,
    InputValidation = 1,
    ErrorHandling = 2,
    Performance = 3,
    Accessibility = 4,
}

impl CriterionKind {
    pub const ALL: [CriterionKind; ACCEPTANCE_CRITERIA_COUNT] = [
        CriterionKind::HappyPath,
        CriterionKind::InputValidation,
        CriterionKind::ErrorHandling,
        CriterionKind::Performance,
        CriterionKind::Accessibility,
    ];

    /// Index into `Story::acceptance_criteria`.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CriterionKind::HappyPath => "happy_path",
            CriterionKind::InputValidation => "input_validation",
            CriterionKind::ErrorHandling => "error_handling",
            CriterionKind::Performance => "performance",
            CriterionKind::Accessibility => "accessibility",
        }
    }
}

fn criterion(kind: CriterionKind, persona: Option<&Persona>, task: &str) -> String {
    match (kind, persona) {
        (CriterionKind::HappyPath, Some(persona)) => format!(
            "Given I am {} {}, when I {}, then the action completes and I see a confirmation",
            article(&persona.label),
            persona.label,
            task
        ),
        (CriterionKind::HappyPath, None) => format!(
            "Given the target environment, when the work to {} is delivered, then dependent stories can build on it",
            task
        ),
        (CriterionKind::InputValidation, _) => format!(
            "Given invalid or incomplete input, when attempting to {}, then it is rejected with a clear validation message",
            task
        ),
        (CriterionKind::ErrorHandling, _) => format!(
            "Given a failure while attempting to {}, then a descriptive error is reported and no partial changes are saved",
            task
        ),
        (CriterionKind::Performance, _) => format!(
            "Given normal load, when attempting to {}, then it completes within 2 seconds",
            task
        ),
        (CriterionKind::Accessibility, _) => format!(
            "Given assistive technology, when attempting to {}, then the interface meets WCAG 2.1 AA",
            task
        ),
    }
}

/// The five acceptance criteria, in [`CriterionKind`] order.
pub fn acceptance_criteria(persona: Option<&Persona>, task: &str) -> Vec<String> {
    CriterionKind::ALL
        .iter()
        .map(|kind| criterion(*kind, persona, task))
        .collect()
}

// ============================================================================
// PHRASE HANDLING
// ============================================================================

/// Split a phrase into its action part and an explicit benefit, if present.
pub fn split_benefit(phrase: &str) -> (&str, Option<&str>) {
    let lowered = phrase.to_ascii_lowercase();
    let found = BENEFIT_MARKERS
        .iter()
        .filter_map(|marker| lowered.find(marker).map(|at| (at, marker.len())))
        .min_by_key(|(at, _)| *at);

    match found {
        Some((at, len)) => {
            let benefit = phrase[at + len..].trim().trim_end_matches('.').trim();
            let action = phrase[..at].trim();
            (action, (!benefit.is_empty()).then_some(benefit))
        }
        None => (phrase.trim().trim_end_matches('.').trim(), None),
    }
}

/// Lowercase the first character unless the first word is an acronym.
fn lower_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if !chars.next().is_some_and(char::is_uppercase) => {
            first.to_lowercase().chain(text.chars().skip(1)).collect()
        }
        _ => text.to_string(),
    }
}

fn upper_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Indefinite article for a label. Vowel letters that sound like "you"
/// ("user", "unit", "eu...") take "a".
fn article(noun: &str) -> &'static str {
    let lowered = noun.to_lowercase();
    let mut chars = lowered.chars();
    let is_vowel = |c: char| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u');
    match (chars.next(), chars.next(), chars.next()) {
        (Some('u'), Some(second), Some(third)) if !is_vowel(second) && is_vowel(third) => "a",
        (Some('e'), Some('u'), _) => "a",
        (Some(first), _, _) if is_vowel(first) => "an",
        _ => "a",
    }
}

/// Whether the phrase opens with a known action verb, possibly after
/// leading adverbs ("quickly view metrics").
fn starts_with_verb(action: &str) -> bool {
    tokens(action)
        .iter()
        .find(|token| !is_adverb(token))
        .is_some_and(|token| bucket_for_token(token).is_some())
}

fn is_adverb(token: &str) -> bool {
    token.len() > 3 && token.ends_with("ly")
}

// ============================================================================
// SYNTHESIZER
// ============================================================================

/// Synthesizes stories for one epic.
#[derive(Debug, Clone, Copy)]
pub struct StorySynthesizer<'a> {
    prefix: &'a str,
    epic_name: &'a str,
    primary: &'a PersonaId,
    rules: &'a PriorityRules,
}

impl<'a> StorySynthesizer<'a> {
    pub fn new(
        prefix: &'a str,
        epic_name: &'a str,
        primary: &'a PersonaId,
        rules: &'a PriorityRules,
    ) -> Self {
        Self {
            prefix,
            epic_name,
            primary,
            rules,
        }
    }

    /// Build the story for a candidate at the given 1-based sequence number.
    pub fn synthesize(&self, candidate: &StoryCandidate, sequence: usize) -> Story {
        let (action_text, explicit_benefit) = split_benefit(&candidate.phrase);
        let action = lower_first(action_text);
        let verb_led = starts_with_verb(&action);
        let task = if verb_led {
            action.clone()
        } else {
            format!("use {}", action)
        };

        let bucket = classify(action_text).bucket;
        let estimation = bucket.points();

        let persona = candidate.persona.as_ref();
        let ctx = PriorityContext {
            phrase: &candidate.phrase,
            bucket,
            primary_persona: persona.is_some_and(|p| &p.id == self.primary),
        };
        let rule = self.rules.matching_rule(&ctx);
        let priority = rule.map(|r| r.priority).unwrap_or(FALLBACK_PRIORITY);

        let narrative = match persona {
            Some(persona) => {
                let benefit = explicit_benefit.unwrap_or_else(|| persona.primary_need());
                format!(
                    "As {} {}, I want to {} so that {}",
                    article(&persona.label),
                    persona.label,
                    task,
                    benefit
                )
            }
            None => {
                let benefit = explicit_benefit.unwrap_or(ENABLER_BENEFIT);
                let need = if verb_led {
                    format!("to {}", action)
                } else {
                    format!("{} in place", action)
                };
                format!(
                    "To support {}, the team needs {} so that {}",
                    self.epic_name.trim(),
                    need,
                    benefit
                )
            }
        };

        let acceptance_criteria = acceptance_criteria(persona, &task);
        let dependencies: Vec<String> = candidate
            .depends_on
            .iter()
            .map(|seq| story_id(self.prefix, *seq))
            .collect();
        let invest_check = InvestCheck::evaluate(estimation, &dependencies, &acceptance_criteria);
        let id = story_id(self.prefix, sequence);

        tracing::debug!(
            story_id = %id,
            estimation,
            priority = %priority,
            rule = rule.map(|r| r.name.as_str()).unwrap_or("fallback"),
            "Story synthesized"
        );

        Story {
            id,
            story_type: if persona.is_some() {
                StoryType::Story
            } else {
                StoryType::Enabler
            },
            title: upper_first(action_text),
            narrative,
            acceptance_criteria,
            estimation,
            priority,
            dependencies,
            invest_check,
            persona: persona.map(|p| p.id.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storyloom_core::{PersonaRegistry, Priority};

    fn candidate(phrase: &str, persona: Option<PersonaId>, depends_on: Vec<usize>) -> StoryCandidate {
        StoryCandidate {
            sequence: 1,
            phrase: phrase.to_string(),
            persona: persona.map(|id| {
                PersonaRegistry::built_in()
                    .resolve(&id)
                    .cloned()
                    .unwrap_or_else(|| Persona::synthetic(id))
            }),
            depends_on,
        }
    }

    fn synthesize(candidate: &StoryCandidate, primary: PersonaId) -> Story {
        let rules = PriorityRules::default();
        StorySynthesizer::new("UD", "User Dashboard", &primary, &rules).synthesize(candidate, 1)
    }

    #[test]
    fn test_story_narrative_uses_persona_need() {
        let story = synthesize(
            &candidate("View metrics", Some(PersonaId::EndUser), vec![]),
            PersonaId::EndUser,
        );
        assert_eq!(story.id, "UD-001");
        assert_eq!(story.story_type, StoryType::Story);
        assert_eq!(story.title, "View metrics");
        assert_eq!(
            story.narrative,
            "As a user, I want to view metrics so that I can complete my everyday tasks efficiently"
        );
        assert_eq!(story.estimation, 1);
        assert_eq!(story.priority, Priority::High);
        assert_eq!(story.persona, Some(PersonaId::EndUser));
    }

    #[test]
    fn test_explicit_benefit_wins() {
        let story = synthesize(
            &candidate(
                "Export data so that I can share reports.",
                Some(PersonaId::Admin),
                vec![],
            ),
            PersonaId::EndUser,
        );
        assert_eq!(story.title, "Export data");
        assert_eq!(
            story.narrative,
            "As a system administrator, I want to export data so that I can share reports"
        );
        assert_eq!(story.priority, Priority::Medium);
    }

    #[test]
    fn test_in_order_to_marker() {
        assert_eq!(
            split_benefit("Sync calendars In Order To avoid double booking"),
            ("Sync calendars", Some("avoid double booking"))
        );
        assert_eq!(split_benefit("Edit profile so that "), ("Edit profile", None));
        assert_eq!(split_benefit("Edit profile"), ("Edit profile", None));
    }

    #[test]
    fn test_non_verb_phrase_narrative() {
        let story = synthesize(
            &candidate("Dark mode (nice to have)", Some(PersonaId::EndUser), vec![]),
            PersonaId::EndUser,
        );
        assert!(story
            .narrative
            .starts_with("As a user, I want to use dark mode (nice to have) so that"));
        assert_eq!(story.estimation, 3);
        assert_eq!(story.priority, Priority::Low);
        assert!(story.acceptance_criteria[0].contains("when I use dark mode"));
    }

    #[test]
    fn test_acronym_is_not_lowercased() {
        let story = synthesize(
            &candidate("API access for partners", Some(PersonaId::PowerUser), vec![]),
            PersonaId::EndUser,
        );
        assert!(story.narrative.contains("I want to use API access for partners"));
    }

    #[test]
    fn test_enabler_uses_technical_template() {
        let story = synthesize(&candidate("Metrics collection API", None, vec![]), PersonaId::EndUser);
        assert_eq!(story.story_type, StoryType::Enabler);
        assert_eq!(story.persona, None);
        assert_eq!(
            story.narrative,
            "To support User Dashboard, the team needs metrics collection API in place so that dependent user stories can be delivered"
        );
        assert_eq!(story.priority, Priority::Medium);
        assert!(story.acceptance_criteria[CriterionKind::HappyPath.index()]
            .starts_with("Given the target environment"));
    }

    #[test]
    fn test_verb_led_enabler() {
        let story = synthesize(&candidate("Migrate the event store", None, vec![]), PersonaId::EndUser);
        assert_eq!(story.estimation, 13);
        assert_eq!(story.priority, Priority::High);
        assert!(!story.invest_check.small);
        assert!(story.narrative.contains("the team needs to migrate the event store"));
    }

    #[test]
    fn test_acceptance_criteria_order() {
        let story = synthesize(
            &candidate("Edit profile", Some(PersonaId::NewUser), vec![]),
            PersonaId::EndUser,
        );
        assert_eq!(story.acceptance_criteria.len(), ACCEPTANCE_CRITERIA_COUNT);
        let ac = &story.acceptance_criteria;
        assert!(ac[CriterionKind::HappyPath.index()].starts_with("Given I am a new user, when I edit profile"));
        assert!(ac[CriterionKind::InputValidation.index()].contains("validation message"));
        assert!(ac[CriterionKind::ErrorHandling.index()].contains("no partial changes"));
        assert!(ac[CriterionKind::Performance.index()].contains("2 seconds"));
        assert!(ac[CriterionKind::Accessibility.index()].contains("WCAG 2.1 AA"));
    }

    #[test]
    fn test_dependencies_use_prefix() {
        let story = synthesize(
            &candidate("View metrics", Some(PersonaId::EndUser), vec![3, 4]),
            PersonaId::EndUser,
        );
        assert_eq!(story.dependencies, vec!["UD-003".to_string(), "UD-004".to_string()]);
        assert!(!story.invest_check.independent);
    }

    #[test]
    fn test_article_for_vowel_labels() {
        let story = synthesize(
            &candidate("View metrics", Some(PersonaId::parse("analyst")), vec![]),
            PersonaId::EndUser,
        );
        assert!(story.narrative.starts_with("As an analyst,"));
    }

    #[test]
    fn test_article_for_built_in_labels() {
        let articles: Vec<(String, &str)> = PersonaRegistry::built_in()
            .iter()
            .map(|p| (p.label.clone(), article(&p.label)))
            .collect();
        for (label, art) in &articles {
            assert_eq!(*art, "a", "label {}", label);
        }
        assert_eq!(article("auditor"), "an");
        assert_eq!(article("unhappy customer"), "an");
        assert_eq!(article("European buyer"), "a");
        assert_eq!(article(""), "a");

        let story = synthesize(
            &candidate("View metrics", Some(PersonaId::EndUser), vec![]),
            PersonaId::EndUser,
        );
        assert!(story.acceptance_criteria[0].starts_with("Given I am a user, when I view metrics"));
    }

    #[test]
    fn test_verb_after_leading_adverb() {
        let story = synthesize(
            &candidate("Quickly view metrics", Some(PersonaId::Admin), vec![]),
            PersonaId::EndUser,
        );
        assert_eq!(story.estimation, 1);
        assert_eq!(
            story.narrative,
            "As a system administrator, I want to quickly view metrics so that I keep control over system settings"
        );
        assert!(story.acceptance_criteria[0].contains("when I quickly view metrics"));
    }

    #[test]
    fn test_critical_keyword_in_benefit_clause() {
        let story = synthesize(
            &candidate(
                "Edit session timeout so that the security audit passes",
                Some(PersonaId::Admin),
                vec![],
            ),
            PersonaId::EndUser,
        );
        assert_eq!(story.priority, Priority::Critical);
    }

    #[test]
    fn test_criterion_kind_indices() {
        let indices: Vec<usize> = CriterionKind::ALL.iter().map(|k| k.index()).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
    }
}
