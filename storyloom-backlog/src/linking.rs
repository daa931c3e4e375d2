//! Dependency linking between enablers and scope items

use crate::rules::tokens;
use std::collections::BTreeSet;
use std::fmt::Debug;

/// Decides whether stories synthesized from a scope item depend on the
/// enabler synthesized from a technical requirement.
pub trait DependencyLinker: Debug + Send + Sync {
    fn links(&self, requirement: &str, scope_item: &str) -> bool;
}

/// Words ignored when comparing phrases.
pub const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "with", "from", "into", "onto", "that", "this", "these", "those", "our",
    "their", "your", "all", "any", "are", "was", "can", "via", "per", "when", "then", "than",
    "its", "has", "have", "use", "using", "able", "new", "each", "every", "more", "less",
];

/// Shortest token considered a content word.
pub const MIN_CONTENT_WORD_LEN: usize = 3;

/// Content words of a phrase: lowercase tokens of at least
/// [`MIN_CONTENT_WORD_LEN`] characters, minus stop words, with a plural `s`
/// stripped.
pub fn content_words(phrase: &str) -> BTreeSet<String> {
    tokens(phrase)
        .into_iter()
        .filter(|t| t.chars().count() >= MIN_CONTENT_WORD_LEN)
        .filter(|t| !STOP_WORDS.contains(&t.as_str()))
        .map(|t| singular(&t))
        .collect()
}

fn singular(token: &str) -> String {
    match token.strip_suffix('s') {
        Some(stem) if stem.chars().count() >= MIN_CONTENT_WORD_LEN && !stem.ends_with('s') => {
            stem.to_string()
        }
        _ => token.to_string(),
    }
}

/// Links when the two phrases share at least one content word.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenOverlapLinker;

impl DependencyLinker for TokenOverlapLinker {
    fn links(&self, requirement: &str, scope_item: &str) -> bool {
        let requirement = content_words(requirement);
        content_words(scope_item)
            .iter()
            .any(|word| requirement.contains(word))
    }
}

/// Never links. Every story comes out independent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoLinking;

impl DependencyLinker for NoLinking {
    fn links(&self, _requirement: &str, _scope_item: &str) -> bool {
        false
    }
}
