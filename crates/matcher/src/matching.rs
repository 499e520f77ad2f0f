//! Rank catalog scenarios against a business analysis.

use std::cmp::Ordering;

use packgen_interchange::{
    CatalogEntry, DescriptionAnalysis, ScenarioInfo, ScenarioSelection, Stage,
};
use serde::Serialize;

use crate::score::{scenario_stages, score, ScoreBreakdown};
use crate::tables;

/// Matches at or below this score are dropped.
pub const INCLUSION_THRESHOLD: f64 = 0.3;

/// A best match below this score still recommends a new scenario.
pub const RECOMMENDATION_THRESHOLD: f64 = 0.7;

/// One scored `(pack, scenario)` pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioMatch {
    #[serde(flatten)]
    pub info: ScenarioInfo,
    pub breakdown: ScoreBreakdown,
    /// Stage named by the scenario id, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl ScenarioMatch {
    pub fn confidence(&self) -> f64 {
        self.info.match_score
    }

    /// The store selection that activates this match.
    pub fn selection(&self) -> ScenarioSelection {
        ScenarioSelection {
            category: Some(self.info.pack_id.clone()),
            role: None,
            stage: self.stage,
            generation_id: self.seed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub matches: Vec<ScenarioMatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_match: Option<ScenarioMatch>,
    pub recommend_new_scenario: bool,
    pub reasoning: Vec<String>,
}

/// Score every catalog entry and keep those above [`INCLUSION_THRESHOLD`],
/// best first. Ties fall back to pack id, then scenario id.
pub fn find_matches(analysis: &DescriptionAnalysis, catalog: &[CatalogEntry]) -> MatchResult {
    let mut matches: Vec<ScenarioMatch> = catalog
        .iter()
        .filter_map(|entry| {
            let breakdown = score(analysis, entry);
            let total = breakdown.total();
            (total > INCLUSION_THRESHOLD).then(|| ScenarioMatch {
                info: ScenarioInfo::from_entry(entry, total),
                breakdown,
                stage: scenario_stages(&entry.scenario.id).into_iter().next(),
                seed: entry.scenario.config.seed,
            })
        })
        .collect();

    matches.sort_by(|a, b| {
        b.confidence()
            .partial_cmp(&a.confidence())
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.info.pack_id.cmp(&b.info.pack_id))
            .then_with(|| a.info.scenario_id.cmp(&b.info.scenario_id))
    });

    let best_match = matches.first().cloned();
    let recommend_new_scenario = best_match
        .as_ref()
        .map_or(true, |m| m.confidence() < RECOMMENDATION_THRESHOLD);
    let reasoning = explain(analysis, &matches, recommend_new_scenario);

    MatchResult {
        matches,
        best_match,
        recommend_new_scenario,
        reasoning,
    }
}

fn explain(analysis: &DescriptionAnalysis, matches: &[ScenarioMatch], recommend: bool) -> Vec<String> {
    let mut reasoning = Vec::new();
    match matches.first() {
        Some(best) => {
            reasoning.push(format!(
                "Found {} scenario(s) scoring above {:.2}",
                matches.len(),
                INCLUSION_THRESHOLD
            ));
            reasoning.push(format!(
                "Best match: {} ({:.2})",
                best.info.qualified_id,
                best.confidence()
            ));
        }
        None => reasoning.push(format!(
            "No existing scenario scored above {:.2}",
            INCLUSION_THRESHOLD
        )),
    }
    if recommend {
        reasoning.push(format!(
            "No match reaches {:.2}; a new scenario is recommended",
            RECOMMENDATION_THRESHOLD
        ));
    }

    let business_type = tables::normalize(&analysis.business_context.business_type);
    if tables::MARKETPLACE_TYPES.contains(&business_type.as_str()) {
        reasoning.push(
            "Marketplaces usually need a custom scenario covering both buyers and sellers"
                .to_string(),
        );
    }
    if tables::REGULATED_TYPES.contains(&business_type.as_str()) {
        reasoning.push(
            "Regulated industries usually need a custom scenario with compliance-specific data"
                .to_string(),
        );
    }
    reasoning
}
