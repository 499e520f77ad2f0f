//! The five weighted terms of a match score.

use std::collections::BTreeSet;

use packgen_interchange::{CatalogEntry, DescriptionAnalysis, Stage};
use serde::Serialize;

use crate::tables;

pub const BUSINESS_TYPE_WEIGHT: f64 = 0.4;
pub const STAGE_WEIGHT: f64 = 0.2;
pub const FEATURE_WEIGHT: f64 = 0.2;
pub const ENTITY_WEIGHT: f64 = 0.1;
pub const DESCRIPTION_WEIGHT: f64 = 0.1;

/// Words shorter than this never count toward description similarity.
const MIN_WORD_LEN: usize = 4;

/// Per-term contribution to a match score, each already weighted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub business_type: f64,
    pub stage: f64,
    pub features: f64,
    pub entities: f64,
    pub description: f64,
}

impl ScoreBreakdown {
    /// Sum of the terms, capped at 1.0.
    pub fn total(&self) -> f64 {
        (self.business_type + self.stage + self.features + self.entities + self.description)
            .min(1.0)
    }
}

pub fn score(analysis: &DescriptionAnalysis, entry: &CatalogEntry) -> ScoreBreakdown {
    let context = &analysis.business_context;

    let business_type = if tables::business_type(&context.business_type)
        == tables::normalize(&entry.business_type)
    {
        BUSINESS_TYPE_WEIGHT
    } else {
        0.0
    };

    let stage = match tables::stage(&context.stage) {
        Some(s) if scenario_stages(&entry.scenario.id).contains(&s) => STAGE_WEIGHT,
        _ => 0.0,
    };

    let pack_features = tables::features(&tables::normalize(&entry.business_type));
    let features = FEATURE_WEIGHT * overlap(&analysis.key_features, pack_features);
    let entities = ENTITY_WEIGHT * overlap(&analysis.entities, &entry.entities);

    let description = match &entry.scenario.description {
        Some(text) => DESCRIPTION_WEIGHT * word_similarity(&context.primary_features.join(" "), text),
        None => 0.0,
    };

    ScoreBreakdown {
        business_type,
        stage,
        features,
        entities,
        description,
    }
}

/// Stages named by the tokens of a scenario id (`early-launch` -> early).
pub fn scenario_stages(scenario_id: &str) -> Vec<Stage> {
    scenario_id
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter_map(|token| token.parse::<Stage>().ok())
        .collect()
}

/// Items of `ours` that match something in `theirs` (case-insensitive
/// substring either way), over the larger list length.
fn overlap<A: AsRef<str>, B: AsRef<str>>(ours: &[A], theirs: &[B]) -> f64 {
    let denom = ours.len().max(theirs.len());
    if denom == 0 {
        return 0.0;
    }
    let theirs: Vec<String> = theirs.iter().map(|t| t.as_ref().to_lowercase()).collect();
    let matched = ours
        .iter()
        .map(|o| o.as_ref().to_lowercase())
        .filter(|o| !o.is_empty())
        .filter(|o| theirs.iter().any(|t| t.contains(o.as_str()) || o.contains(t.as_str())))
        .count();
    matched as f64 / denom as f64
}

fn words(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= MIN_WORD_LEN)
        .map(str::to_lowercase)
        .collect()
}

/// Shared long words over the larger distinct word count.
fn word_similarity(a: &str, b: &str) -> f64 {
    let a = words(a);
    let b = words(b);
    let denom = a.len().max(b.len());
    if denom == 0 {
        return 0.0;
    }
    a.intersection(&b).count() as f64 / denom as f64
}
