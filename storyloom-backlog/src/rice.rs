//! RICE scoring
//!
//! `score = (reach * impact * confidence) / effort`. Scores are computed on
//! demand and never stored on a story. Ranking a set rescales the scores so
//! the maximum maps to 100.

use crate::aggregate::aggregate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use storyloom_core::{Backlog, DivisionError, StoryloomResult, ValidationError};

/// Normalized score assigned to the highest-scoring item.
pub const NORMALIZED_MAX: f64 = 100.0;

/// Raw RICE inputs for one item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RiceInput {
    pub reach: f64,
    pub impact: f64,
    /// In (0, 1]
    pub confidence: f64,
    /// Must be > 0
    pub effort: f64,
}

impl RiceInput {
    pub fn new(reach: f64, impact: f64, confidence: f64, effort: f64) -> Self {
        Self {
            reach,
            impact,
            confidence,
            effort,
        }
    }

    /// Validate the inputs.
    ///
    /// Validates:
    /// - every input is finite
    /// - effort > 0 (DivisionError otherwise)
    /// - confidence in (0, 1]
    /// - reach >= 0 and impact >= 0
    pub fn validate(&self) -> StoryloomResult<()> {
        for (field, value) in [
            ("reach", self.reach),
            ("impact", self.impact),
            ("confidence", self.confidence),
            ("effort", self.effort),
        ] {
            if !value.is_finite() {
                return Err(ValidationError::invalid(field, format!("must be finite, got {}", value)).into());
            }
        }

        if self.effort <= 0.0 {
            return Err(DivisionError::NonPositiveEffort {
                effort: self.effort,
            }
            .into());
        }

        if self.confidence <= 0.0 || self.confidence > 1.0 {
            return Err(ValidationError::invalid(
                "confidence",
                format!("must be in (0, 1], got {}", self.confidence),
            )
            .into());
        }

        if self.reach < 0.0 {
            return Err(ValidationError::invalid("reach", "must not be negative").into());
        }

        if self.impact < 0.0 {
            return Err(ValidationError::invalid("impact", "must not be negative").into());
        }

        Ok(())
    }

    pub fn score(&self) -> StoryloomResult<f64> {
        self.validate()?;
        Ok(self.reach * self.impact * self.confidence / self.effort)
    }
}

/// Compute a RICE score.
pub fn score(reach: f64, impact: f64, confidence: f64, effort: f64) -> StoryloomResult<f64> {
    RiceInput::new(reach, impact, confidence, effort).score()
}

/// Rescale scores linearly so the maximum maps to [`NORMALIZED_MAX`].
///
/// All zeros when the maximum is zero (or the slice is empty).
pub fn normalize(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(0.0_f64, f64::max);
    if max <= 0.0 {
        return vec![0.0; scores.len()];
    }
    scores.iter().map(|s| s / max * NORMALIZED_MAX).collect()
}

/// One ranked item.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedItem<K> {
    pub key: K,
    pub score: f64,
    pub normalized: f64,
}

/// Score and rank items, highest first. Ties keep input order.
pub fn rank<K: Clone>(items: &[(K, RiceInput)]) -> StoryloomResult<Vec<RankedItem<K>>> {
    let scores = items
        .iter()
        .map(|(_, input)| input.score())
        .collect::<StoryloomResult<Vec<f64>>>()?;
    let normalized = normalize(&scores);

    let mut ranked: Vec<RankedItem<K>> = items
        .iter()
        .zip(scores.iter().zip(normalized))
        .map(|((key, _), (score, normalized))| RankedItem {
            key: key.clone(),
            score: *score,
            normalized,
        })
        .collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    Ok(ranked)
}

/// Reorder a backlog by RICE score.
///
/// Returns a new backlog: stories with inputs first, highest score first,
/// then the remaining stories in their original order. The input backlog is
/// untouched. Inputs naming an unknown story id are rejected.
pub fn reorder_backlog(
    backlog: &Backlog,
    inputs: &BTreeMap<String, RiceInput>,
) -> StoryloomResult<Backlog> {
    if let Some(unknown) = inputs.keys().find(|id| backlog.story(id).is_none()) {
        return Err(ValidationError::UnknownStory {
            field: "rice".to_string(),
            story_id: unknown.clone(),
        }
        .into());
    }

    let scored: Vec<(usize, RiceInput)> = backlog
        .stories
        .iter()
        .enumerate()
        .filter_map(|(idx, story)| inputs.get(&story.id).map(|input| (idx, *input)))
        .collect();
    let ranked = rank(&scored)?;

    let mut stories = Vec::with_capacity(backlog.len());
    stories.extend(ranked.iter().map(|item| backlog.stories[item.key].clone()));
    stories.extend(
        backlog
            .stories
            .iter()
            .filter(|story| !inputs.contains_key(&story.id))
            .cloned(),
    );

    tracing::debug!(
        scored = ranked.len(),
        unscored = backlog.len() - ranked.len(),
        "Backlog reordered by RICE score"
    );

    Ok(aggregate(stories))
}
