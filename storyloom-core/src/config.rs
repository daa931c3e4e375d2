//! Planner configuration

use crate::*;
use serde::{Deserialize, Serialize};

/// Default stretch ceiling as a percentage of capacity.
pub const DEFAULT_STRETCH_RATIO_PERCENT: u32 = 120;

/// Allowed range for the stretch ceiling.
pub const STRETCH_RATIO_RANGE: std::ops::RangeInclusive<u32> = 100..=200;

/// Extra persona row supplied through configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CustomPersona {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub focus: String,
    pub needs: Vec<String>,
}

impl CustomPersona {
    pub fn to_persona(&self) -> Persona {
        let focus = if self.focus.trim().is_empty() {
            "General".to_string()
        } else {
            self.focus.clone()
        };
        Persona::new(
            PersonaId::parse(&self.id),
            self.label.clone(),
            focus,
            self.needs.clone(),
        )
    }
}

/// Master configuration for a planning run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlannerConfig {
    /// Ceiling for committed + stretch points, as a percentage of capacity
    pub stretch_ratio_percent: u32,
    pub strategy: AllocationStrategy,
    /// Capacity used when a sprint is requested without an explicit value
    pub default_capacity: Option<u32>,
    /// Overrides the prefix derived from the epic name
    pub id_prefix: Option<String>,
    /// Rows appended to the built-in persona registry
    pub custom_personas: Vec<CustomPersona>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            stretch_ratio_percent: DEFAULT_STRETCH_RATIO_PERCENT,
            strategy: AllocationStrategy::Greedy,
            default_capacity: None,
            id_prefix: None,
            custom_personas: Vec::new(),
        }
    }
}

impl PlannerConfig {
    /// Validate the configuration.
    /// Returns Ok(()) if valid, Err(StoryloomError::Config) if invalid.
    ///
    /// Validates:
    /// - stretch_ratio_percent within 100..=200
    /// - default_capacity, when set, is > 0
    /// - id_prefix, when set, is non-blank alphanumeric
    /// - custom personas have an id, a label and at least one need, no need
    ///   is blank, and they do not shadow registered ids
    pub fn validate(&self) -> StoryloomResult<()> {
        if !STRETCH_RATIO_RANGE.contains(&self.stretch_ratio_percent) {
            return Err(StoryloomError::Config(ConfigError::InvalidValue {
                field: "stretch_ratio_percent".to_string(),
                value: self.stretch_ratio_percent.to_string(),
                reason: format!(
                    "must be between {} and {}",
                    STRETCH_RATIO_RANGE.start(),
                    STRETCH_RATIO_RANGE.end()
                ),
            }));
        }

        if self.default_capacity == Some(0) {
            return Err(StoryloomError::Config(ConfigError::InvalidValue {
                field: "default_capacity".to_string(),
                value: "0".to_string(),
                reason: "default_capacity must be greater than 0".to_string(),
            }));
        }

        if let Some(prefix) = &self.id_prefix {
            if prefix.trim().is_empty() || !prefix.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(StoryloomError::Config(ConfigError::InvalidValue {
                    field: "id_prefix".to_string(),
                    value: prefix.clone(),
                    reason: "id_prefix must be non-empty ASCII alphanumeric".to_string(),
                }));
            }
        }

        for (idx, persona) in self.custom_personas.iter().enumerate() {
            if persona.id.trim().is_empty() || persona.label.trim().is_empty() {
                return Err(StoryloomError::Config(ConfigError::InvalidValue {
                    field: format!("custom_personas[{}]", idx),
                    value: persona.id.clone(),
                    reason: "id and label must not be blank".to_string(),
                }));
            }
            if persona.needs.is_empty() {
                return Err(StoryloomError::Config(ConfigError::InvalidValue {
                    field: format!("custom_personas[{}].needs", idx),
                    value: persona.id.clone(),
                    reason: "at least one need is required".to_string(),
                }));
            }
            if let Some(pos) = persona.needs.iter().position(|n| n.trim().is_empty()) {
                return Err(StoryloomError::Config(ConfigError::InvalidValue {
                    field: format!("custom_personas[{}].needs[{}]", idx, pos),
                    value: persona.id.clone(),
                    reason: "needs must not be blank".to_string(),
                }));
            }
        }

        self.persona_registry().map(|_| ())
    }

    /// Persona registry with the configured custom rows applied.
    pub fn persona_registry(&self) -> StoryloomResult<PersonaRegistry> {
        if self.custom_personas.is_empty() {
            return Ok(PersonaRegistry::default());
        }
        let rows = self
            .custom_personas
            .iter()
            .map(CustomPersona::to_persona)
            .collect();
        Ok(PersonaRegistry::with_custom(rows)?)
    }

    /// Create from environment variables with fallback to defaults.
    ///
    /// Environment variables:
    /// - `STORYLOOM_STRETCH_RATIO`: stretch ceiling percentage (default: 120)
    /// - `STORYLOOM_STRATEGY`: `greedy` or `optimal` (default: greedy)
    /// - `STORYLOOM_CAPACITY`: default sprint capacity (default: unset)
    /// - `STORYLOOM_ID_PREFIX`: story id prefix override (default: derived)
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply `STORYLOOM_*` environment variables on top of this config.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(ratio) = lookup("STORYLOOM_STRETCH_RATIO").and_then(|s| s.parse().ok()) {
            self.stretch_ratio_percent = ratio;
        }
        if let Some(strategy) = lookup("STORYLOOM_STRATEGY").and_then(|s| s.parse().ok()) {
            self.strategy = strategy;
        }
        if let Some(capacity) = lookup("STORYLOOM_CAPACITY").and_then(|s| s.parse().ok()) {
            self.default_capacity = Some(capacity);
        }
        if let Some(prefix) = lookup("STORYLOOM_ID_PREFIX") {
            self.id_prefix = Some(prefix);
        }
        self
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config_is_valid() {
        let config = PlannerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.stretch_ratio_percent, 120);
        assert_eq!(config.strategy, AllocationStrategy::Greedy);
    }

    #[test]
    fn test_rejects_stretch_ratio_out_of_range() {
        for ratio in [0, 99, 201] {
            let config = PlannerConfig {
                stretch_ratio_percent: ratio,
                ..PlannerConfig::default()
            };
            match config.validate() {
                Err(StoryloomError::Config(ConfigError::InvalidValue { field, .. })) => {
                    assert_eq!(field, "stretch_ratio_percent");
                }
                other => panic!("Expected InvalidValue, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_rejects_zero_default_capacity() {
        let config = PlannerConfig {
            default_capacity: Some(0),
            ..PlannerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_prefix() {
        let config = PlannerConfig {
            id_prefix: Some("UD-".to_string()),
            ..PlannerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_custom_persona_shadowing_built_in() {
        let config = PlannerConfig {
            custom_personas: vec![CustomPersona {
                id: "admin".to_string(),
                label: "admin".to_string(),
                focus: String::new(),
                needs: vec!["everything".to_string()],
            }],
            ..PlannerConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(StoryloomError::Config(ConfigError::DuplicatePersona { .. }))
        ));
    }

    #[test]
    fn test_rejects_any_blank_custom_need() {
        let persona = |needs: &[&str]| CustomPersona {
            id: "auditor".to_string(),
            label: "auditor".to_string(),
            focus: String::new(),
            needs: needs.iter().map(|n| n.to_string()).collect(),
        };
        for needs in [&[][..], &["", "I can prove compliance"][..], &["I can prove compliance", "  "][..]] {
            let config = PlannerConfig {
                custom_personas: vec![persona(needs)],
                ..PlannerConfig::default()
            };
            assert!(
                matches!(config.validate(), Err(StoryloomError::Config(ConfigError::InvalidValue { .. }))),
                "needs {:?}",
                needs
            );
        }
        let err = PlannerConfig {
            custom_personas: vec![persona(&["", "x"])],
            ..PlannerConfig::default()
        }
        .validate()
        .unwrap_err();
        assert!(err.to_string().contains("custom_personas[0].needs[0]"));
    }

    #[test]
    fn test_custom_persona_registry() {
        let config = PlannerConfig {
            custom_personas: vec![CustomPersona {
                id: "auditor".to_string(),
                label: "compliance auditor".to_string(),
                focus: String::new(),
                needs: vec!["I can prove compliance".to_string()],
            }],
            ..PlannerConfig::default()
        };
        let registry = config.persona_registry().unwrap();
        let auditor = registry.resolve(&PersonaId::parse("auditor")).unwrap();
        assert_eq!(auditor.focus, "General");
        assert_eq!(auditor.primary_need(), "I can prove compliance");
    }

    #[test]
    fn test_overrides_apply_parsed_values() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("STORYLOOM_STRETCH_RATIO", "150"),
            ("STORYLOOM_STRATEGY", "optimal"),
            ("STORYLOOM_CAPACITY", "21"),
        ]);
        let config = PlannerConfig::default()
            .with_overrides(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.stretch_ratio_percent, 150);
        assert_eq!(config.strategy, AllocationStrategy::Optimal);
        assert_eq!(config.default_capacity, Some(21));
        assert_eq!(config.id_prefix, None);
    }

    #[test]
    fn test_overrides_ignore_unparseable_values() {
        let config = PlannerConfig::default().with_overrides(|key| match key {
            "STORYLOOM_STRETCH_RATIO" => Some("lots".to_string()),
            _ => None,
        });
        assert_eq!(config.stretch_ratio_percent, DEFAULT_STRETCH_RATIO_PERCENT);
    }

    #[test]
    fn test_config_toml_shape() {
        let config: PlannerConfig = toml::from_str(
            r#"
            stretch_ratio_percent = 110
            strategy = "optimal"

            [[custom_personas]]
            id = "auditor"
            label = "auditor"
            needs = ["I can prove compliance"]
            "#,
        )
        .unwrap();
        assert_eq!(config.stretch_ratio_percent, 110);
        assert_eq!(config.custom_personas.len(), 1);
        assert!(config.validate().is_ok());
    }
}
