//! Persona registry
//!
//! Personas are a closed set of well-known ids plus a custom variant. The
//! built-in table is constructed once and shared read-only; callers may layer
//! extra rows on top of it (see [`PersonaRegistry::with_custom`]).

use crate::ConfigError;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Needs attached to personas that are not present in the registry.
///
/// Need phrases complete the clause "so that ...".
pub const DEFAULT_PERSONA_NEEDS: [&str; 2] = [
    "I can accomplish my goals with minimal friction",
    "the product behaves predictably",
];

/// Persona identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PersonaId {
    EndUser,
    Admin,
    PowerUser,
    NewUser,
    /// Caller-supplied id outside the built-in set
    Custom(String),
}

impl PersonaId {
    /// Built-in ids in canonical registry order.
    pub const BUILT_IN: [PersonaId; 4] = [
        PersonaId::EndUser,
        PersonaId::Admin,
        PersonaId::PowerUser,
        PersonaId::NewUser,
    ];

    /// Parse an id. Anything outside the built-in set becomes `Custom`.
    pub fn parse(raw: &str) -> Self {
        let normalized = raw.trim();
        match normalized.to_ascii_lowercase().as_str() {
            "end_user" => PersonaId::EndUser,
            "admin" => PersonaId::Admin,
            "power_user" => PersonaId::PowerUser,
            "new_user" => PersonaId::NewUser,
            _ => PersonaId::Custom(normalized.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            PersonaId::EndUser => "end_user",
            PersonaId::Admin => "admin",
            PersonaId::PowerUser => "power_user",
            PersonaId::NewUser => "new_user",
            PersonaId::Custom(id) => id,
        }
    }

    pub fn is_built_in(&self) -> bool {
        !matches!(self, PersonaId::Custom(_))
    }
}

impl From<String> for PersonaId {
    fn from(value: String) -> Self {
        PersonaId::parse(&value)
    }
}

impl From<&str> for PersonaId {
    fn from(value: &str) -> Self {
        PersonaId::parse(value)
    }
}

impl From<PersonaId> for String {
    fn from(value: PersonaId) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for PersonaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable capability descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    pub id: PersonaId,
    /// Display name used in narratives ("As a {label}")
    pub label: String,
    pub focus: String,
    /// Ordered need phrases; the first one is the primary need
    pub needs: Vec<String>,
}

impl Persona {
    pub fn new(
        id: PersonaId,
        label: impl Into<String>,
        focus: impl Into<String>,
        needs: Vec<String>,
    ) -> Self {
        Self {
            id,
            label: label.into(),
            focus: focus.into(),
            needs,
        }
    }

    /// Persona used for ids that do not resolve against the registry.
    pub fn synthetic(id: PersonaId) -> Self {
        let label = id.as_str().replace(['_', '-'], " ");
        Self {
            id,
            label,
            focus: "General".to_string(),
            needs: DEFAULT_PERSONA_NEEDS.iter().map(|n| n.to_string()).collect(),
        }
    }

    pub fn primary_need(&self) -> &str {
        self.needs
            .first()
            .map(String::as_str)
            .unwrap_or(DEFAULT_PERSONA_NEEDS[0])
    }
}

fn row(id: PersonaId, label: &str, focus: &str, needs: &[&str]) -> Persona {
    Persona::new(
        id,
        label,
        focus,
        needs.iter().map(|n| n.to_string()).collect(),
    )
}

static BUILT_IN_REGISTRY: Lazy<PersonaRegistry> = Lazy::new(|| PersonaRegistry {
    personas: vec![
        row(
            PersonaId::EndUser,
            "user",
            "Core functionality",
            &[
                "I can complete my everyday tasks efficiently",
                "the interface stays intuitive",
                "the product performs reliably",
            ],
        ),
        row(
            PersonaId::Admin,
            "system administrator",
            "Management and configuration",
            &[
                "I keep control over system settings",
                "I have visibility into how the system is used",
                "access stays secure",
            ],
        ),
        row(
            PersonaId::PowerUser,
            "power user",
            "Advanced features",
            &[
                "I can tailor the product to advanced workflows",
                "repetitive work is automated",
                "I can work faster with shortcuts",
            ],
        ),
        row(
            PersonaId::NewUser,
            "new user",
            "Onboarding",
            &[
                "I can get started without assistance",
                "I receive clear guidance",
                "I reach value quickly",
            ],
        ),
    ],
});

/// Ordered persona table. Position in the table is the canonical order used
/// for decomposition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonaRegistry {
    personas: Vec<Persona>,
}

impl PersonaRegistry {
    /// The static built-in table.
    pub fn built_in() -> &'static PersonaRegistry {
        &BUILT_IN_REGISTRY
    }

    /// Built-in table extended with caller-supplied rows, appended in order.
    ///
    /// Rows may not reuse an id that is already registered.
    pub fn with_custom(custom: Vec<Persona>) -> Result<Self, ConfigError> {
        let mut registry = Self::built_in().clone();
        for persona in custom {
            if registry.position(&persona.id).is_some() {
                return Err(ConfigError::DuplicatePersona {
                    id: persona.id.to_string(),
                });
            }
            registry.personas.push(persona);
        }
        Ok(registry)
    }

    pub fn resolve(&self, id: &PersonaId) -> Option<&Persona> {
        self.personas.iter().find(|p| &p.id == id)
    }

    /// Canonical position of a registered persona.
    pub fn position(&self, id: &PersonaId) -> Option<usize> {
        self.personas.iter().position(|p| &p.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Persona> {
        self.personas.iter()
    }

    pub fn len(&self) -> usize {
        self.personas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.personas.is_empty()
    }
}

impl Default for PersonaRegistry {
    fn default() -> Self {
        Self::built_in().clone()
    }
}
