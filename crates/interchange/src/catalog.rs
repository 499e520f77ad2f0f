//! Read-only projections of registered scenarios.

use serde::{Deserialize, Serialize};

use crate::types::{qualified_name, Scenario, Stage};

/// One `(pack, scenario)` pair as handed to the matcher.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub pack_id: String,
    pub pack_name: String,
    pub business_type: String,
    /// Entity names the pack can synthesize (its schema names).
    pub entities: Vec<String>,
    /// Local name of the scenario within its pack (its map key).
    pub key: String,
    pub scenario: Scenario,
}

impl CatalogEntry {
    /// Namespaced `"<packId>:<localName>"` key.
    pub fn qualified_id(&self) -> String {
        qualified_name(&self.pack_id, &self.key)
    }
}

/// A scenario combined with its pack identity and a match score.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioInfo {
    pub pack_id: String,
    pub pack_name: String,
    pub scenario_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub qualified_id: String,
    /// Score in `[0, 1]`; `0.0` for unscored listings.
    pub match_score: f64,
}

impl ScenarioInfo {
    pub fn from_entry(entry: &CatalogEntry, match_score: f64) -> Self {
        ScenarioInfo {
            pack_id: entry.pack_id.clone(),
            pack_name: entry.pack_name.clone(),
            scenario_id: entry.scenario.id.clone(),
            name: entry.scenario.name.clone(),
            description: entry.scenario.description.clone(),
            qualified_id: entry.qualified_id(),
            match_score,
        }
    }
}

/// A complete scenario choice, applied to a configuration store in one
/// step. Unset fields take the store defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioSelection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Defaults to `early`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_id: Option<u64>,
}
