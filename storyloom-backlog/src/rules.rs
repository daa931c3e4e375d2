//! Keyword rule tables
//!
//! Phrase classification is table driven. Each table is an ordered list of
//! rules evaluated top to bottom, first match wins:
//!
//! - [`COMPLEXITY_TABLE`] maps an action verb to a [`ComplexityBucket`].
//! - [`PriorityRules`] maps a phrase, its bucket and its persona to a
//!   [`Priority`].
//!
//! Matching works on lowercase alphanumeric tokens with light inflection
//! stripping ("views", "viewing", "viewed" all match "view").

use once_cell::sync::Lazy;
use regex::Regex;
use storyloom_core::{ComplexityBucket, Priority};

// ============================================================================
// TOKENS
// ============================================================================

static TOKEN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\p{L}\p{N}]+").expect("Invalid token regex"));

/// Lowercase alphanumeric tokens of a phrase, in order.
pub fn tokens(phrase: &str) -> Vec<String> {
    TOKEN_PATTERN
        .find_iter(phrase)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

/// Candidate base forms of a token: the token itself, then forms with common
/// inflections stripped. Stripped forms shorter than three characters are
/// dropped.
pub fn base_forms(token: &str) -> Vec<String> {
    let mut forms = vec![token.to_string()];
    for suffix in ["s", "es", "ed", "d", "ing"] {
        if let Some(stem) = token.strip_suffix(suffix) {
            if stem.len() >= 3 {
                forms.push(stem.to_string());
            }
        }
    }
    if let Some(stem) = token.strip_suffix("ing") {
        if stem.len() >= 2 {
            forms.push(format!("{}e", stem));
        }
    }
    forms
}

fn token_in(token: &str, words: &[&str]) -> bool {
    base_forms(token)
        .iter()
        .any(|form| words.contains(&form.as_str()))
}

// ============================================================================
// COMPLEXITY TABLE
// ============================================================================

/// Verbs belonging to one complexity bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComplexityRule {
    pub bucket: ComplexityBucket,
    pub verbs: &'static [&'static str],
}

/// Verb table. Verb lists are disjoint, so a verb belongs to exactly one bucket.
pub const COMPLEXITY_TABLE: [ComplexityRule; 4] = [
    ComplexityRule {
        bucket: ComplexityBucket::ReadOnly,
        verbs: &[
            "view", "display", "see", "show", "list", "browse", "read", "export", "download",
            "search", "find", "filter", "preview", "track", "monitor",
        ],
    },
    ComplexityRule {
        bucket: ComplexityBucket::Standard,
        verbs: &[
            "create", "add", "edit", "update", "delete", "remove", "save", "submit", "upload",
            "manage", "change", "rename", "assign", "invite", "reset", "configure", "set",
            "enter", "register", "share", "comment", "approve", "cancel", "schedule", "send",
        ],
    },
    ComplexityRule {
        bucket: ComplexityBucket::Integration,
        verbs: &[
            "integrate", "connect", "sync", "synchronize", "import", "automate", "customize",
            "personalize", "analyze", "notify", "stream", "generate", "recommend", "predict",
            "embed", "authenticate", "collaborate",
        ],
    },
    ComplexityRule {
        bucket: ComplexityBucket::Architecture,
        verbs: &[
            "redesign", "refactor", "rearchitect", "architect", "migrate", "rebuild", "rewrite",
            "overhaul", "replatform", "modernize", "restructure", "scale",
        ],
    },
];

/// Action verb found in a phrase and the bucket it falls into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerbMatch {
    /// The verb as written in the phrase (lowercase)
    pub verb: String,
    pub bucket: ComplexityBucket,
    /// False when no token matched the table and the default bucket was used
    pub matched: bool,
}

/// Bucket for a single token, if it is a known verb.
pub fn bucket_for_token(token: &str) -> Option<ComplexityBucket> {
    COMPLEXITY_TABLE
        .iter()
        .find(|rule| token_in(token, rule.verbs))
        .map(|rule| rule.bucket)
}

/// Classify a phrase by its first known action verb.
///
/// Total function: a phrase with no known verb uses its first token as the
/// verb and falls back to [`ComplexityBucket::Standard`].
pub fn classify(phrase: &str) -> VerbMatch {
    let words = tokens(phrase);
    for word in &words {
        if let Some(bucket) = bucket_for_token(word) {
            return VerbMatch {
                verb: word.clone(),
                bucket,
                matched: true,
            };
        }
    }
    VerbMatch {
        verb: words.first().cloned().unwrap_or_default(),
        bucket: ComplexityBucket::default(),
        matched: false,
    }
}

// ============================================================================
// PRIORITY RULES
// ============================================================================

/// Keywords that mark a phrase as security-sensitive or a defect fix.
pub const CRITICAL_KEYWORDS: &[&str] = &[
    "security", "secure", "vulnerability", "vulnerable", "exploit", "breach", "fix", "hotfix",
    "broken", "break", "bug", "crash", "outage",
];

/// Markers that flag a phrase as optional.
pub const OPTIONAL_MARKERS: &[&str] = &[
    "nice to have",
    "nice-to-have",
    "optional",
    "if time permits",
    "stretch goal",
];

/// Inputs a priority rule is evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriorityContext<'a> {
    pub phrase: &'a str,
    pub bucket: ComplexityBucket,
    /// True when the story is written for the epic's first-listed persona
    pub primary_persona: bool,
}

/// Condition half of a priority rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PriorityCondition {
    /// Any token (or its base form) is in the list
    Keyword(Vec<String>),
    /// Any marker occurs in the lowercased phrase
    Marker(Vec<String>),
    /// Primary persona and bucket in the list
    PrimaryPersonaIn(Vec<ComplexityBucket>),
    /// Bucket in the list
    BucketIn(Vec<ComplexityBucket>),
    Always,
}

impl PriorityCondition {
    pub fn matches(&self, ctx: &PriorityContext<'_>) -> bool {
        match self {
            PriorityCondition::Keyword(words) => {
                let words: Vec<&str> = words.iter().map(String::as_str).collect();
                tokens(ctx.phrase).iter().any(|t| token_in(t, &words))
            }
            PriorityCondition::Marker(markers) => {
                let lowered = ctx.phrase.to_lowercase();
                markers.iter().any(|m| lowered.contains(m.as_str()))
            }
            PriorityCondition::PrimaryPersonaIn(buckets) => {
                ctx.primary_persona && buckets.contains(&ctx.bucket)
            }
            PriorityCondition::BucketIn(buckets) => buckets.contains(&ctx.bucket),
            PriorityCondition::Always => true,
        }
    }
}

/// One row of the priority table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityRule {
    pub name: String,
    pub condition: PriorityCondition,
    pub priority: Priority,
}

impl PriorityRule {
    pub fn new(name: impl Into<String>, condition: PriorityCondition, priority: Priority) -> Self {
        Self {
            name: name.into(),
            condition,
            priority,
        }
    }
}

/// Ordered, first-match-wins priority table.
///
/// Callers needing domain-specific prioritization replace the whole table
/// with [`PriorityRules::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityRules {
    rules: Vec<PriorityRule>,
}

/// Priority used when a custom table has no matching rule.
pub const FALLBACK_PRIORITY: Priority = Priority::Medium;

impl PriorityRules {
    pub fn new(rules: Vec<PriorityRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[PriorityRule] {
        &self.rules
    }

    /// First matching rule, if any.
    pub fn matching_rule(&self, ctx: &PriorityContext<'_>) -> Option<&PriorityRule> {
        self.rules.iter().find(|rule| rule.condition.matches(ctx))
    }

    pub fn evaluate(&self, ctx: &PriorityContext<'_>) -> Priority {
        self.matching_rule(ctx)
            .map(|rule| rule.priority)
            .unwrap_or(FALLBACK_PRIORITY)
    }
}

impl Default for PriorityRules {
    /// The standard table. The optional marker sits directly below the
    /// critical keyword rule so it overrides every rule after it.
    fn default() -> Self {
        let owned = |words: &[&str]| words.iter().map(|w| w.to_string()).collect::<Vec<_>>();
        Self::new(vec![
            PriorityRule::new(
                "critical-keyword",
                PriorityCondition::Keyword(owned(CRITICAL_KEYWORDS)),
                Priority::Critical,
            ),
            PriorityRule::new(
                "optional-marker",
                PriorityCondition::Marker(owned(OPTIONAL_MARKERS)),
                Priority::Low,
            ),
            PriorityRule::new(
                "primary-persona",
                PriorityCondition::PrimaryPersonaIn(vec![
                    ComplexityBucket::ReadOnly,
                    ComplexityBucket::Standard,
                    ComplexityBucket::Integration,
                ]),
                Priority::High,
            ),
            PriorityRule::new(
                "architecture",
                PriorityCondition::BucketIn(vec![ComplexityBucket::Architecture]),
                Priority::High,
            ),
            PriorityRule::new("default", PriorityCondition::Always, Priority::Medium),
        ])
    }
}
