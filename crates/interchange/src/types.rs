//! Typed structs representing the pack document format.
//!
//! Scenario, persona, and route entries are plain serde structs. Schema
//! trees are parsed by hand into the closed [`SchemaDef`] enum (see
//! [`crate::schema`]) because the synthesizer needs to match on their
//! shape exhaustively.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::schema::SchemaDef;

/// A fully parsed data pack.
#[derive(Debug, Clone, PartialEq)]
pub struct DataPack {
    /// Globally unique pack id (`^[a-z0-9-]+$`).
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub version: String,
    /// Declared business type. Falls back to `id` when absent.
    pub business_type: Option<String>,
    pub schemas: BTreeMap<String, SchemaDef>,
    pub scenarios: BTreeMap<String, Scenario>,
    pub personas: BTreeMap<String, Persona>,
    pub routes: BTreeMap<String, RouteConfig>,
}

impl DataPack {
    /// The business type the matcher aligns against.
    pub fn business_type(&self) -> &str {
        self.business_type.as_deref().unwrap_or(&self.id)
    }

    /// Entity names exposed by this pack, in sorted order.
    pub fn entity_names(&self) -> Vec<String> {
        self.schemas.keys().cloned().collect()
    }

    pub fn schema(&self, name: &str) -> Option<&SchemaDef> {
        self.schemas.get(name)
    }

    /// Look up a scenario by its map key, falling back to its declared `id`.
    pub fn scenario(&self, name: &str) -> Option<&Scenario> {
        self.scenarios
            .get(name)
            .or_else(|| self.scenarios.values().find(|s| s.id == name))
    }

    /// Look up a persona by its map key, falling back to its declared `id`.
    pub fn persona(&self, name: &str) -> Option<&Persona> {
        self.personas
            .get(name)
            .or_else(|| self.personas.values().find(|p| p.id == name))
    }
}

// ── Scenario ────────────────────────────────────────────────────────

/// A named business situation within a pack.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub config: ScenarioConfig,
}

/// Generation parameters attached to a scenario.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
    /// Entity name -> record count at the `early` stage.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub volume: BTreeMap<String, usize>,
    /// Relationship hints between entities. Kept as Value because only
    /// downstream consumers (mock servers, exporters) interpret them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationships: Option<serde_json::Value>,
}

/// Inclusive date window (`YYYY-MM-DD`) for date-shaped fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

// ── Persona ─────────────────────────────────────────────────────────

/// An access-level descriptor controlling field visibility.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Persona {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<serde_json::Value>,
    /// Top-level values forced onto every record rendered for this persona.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overrides: Option<serde_json::Map<String, serde_json::Value>>,
    /// Fields (dotted paths) whose values are masked.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub masked_fields: BTreeSet<String>,
    /// Fields (dotted paths) removed entirely.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub hidden_fields: BTreeSet<String>,
}

// ── Route ───────────────────────────────────────────────────────────

/// A mock route served from generated records of one schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RouteConfig {
    /// Key into the pack's `schemas` map.
    pub schema: String,
    #[serde(default = "default_method")]
    pub method: String,
    /// Number of records for list routes. `None` means a single record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    /// Persona (local name) whose redaction applies to this route.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona: Option<String>,
}

fn default_method() -> String {
    "GET".to_string()
}

// ── Stage ───────────────────────────────────────────────────────────

/// Business-maturity tier. Scales generated data volume.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    #[default]
    Early,
    Growth,
    Enterprise,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Early, Stage::Growth, Stage::Enterprise];

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Early => "early",
            Stage::Growth => "growth",
            Stage::Enterprise => "enterprise",
        }
    }

    /// Multiplier applied to scenario volume counts.
    pub fn volume_multiplier(self) -> usize {
        match self {
            Stage::Early => 1,
            Stage::Growth => 5,
            Stage::Enterprise => 20,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "early" => Ok(Stage::Early),
            "growth" => Ok(Stage::Growth),
            "enterprise" => Ok(Stage::Enterprise),
            other => Err(format!(
                "unknown stage '{}': expected early, growth, or enterprise",
                other
            )),
        }
    }
}

// ── Qualified names ─────────────────────────────────────────────────

/// Build the namespaced `"<packId>:<localName>"` key.
pub fn qualified_name(pack_id: &str, local: &str) -> String {
    format!("{}:{}", pack_id, local)
}

/// Split a `"<packId>:<localName>"` key. Returns `None` without a colon.
pub fn split_qualified(name: &str) -> Option<(&str, &str)> {
    name.split_once(':')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_parses_case_insensitively() {
        assert_eq!("Growth".parse::<Stage>(), Ok(Stage::Growth));
        assert_eq!(" enterprise ".parse::<Stage>(), Ok(Stage::Enterprise));
        assert!("mature".parse::<Stage>().is_err());
    }

    #[test]
    fn stage_serializes_lowercase() {
        let json = serde_json::to_value(Stage::Enterprise).unwrap();
        assert_eq!(json, serde_json::json!("enterprise"));
    }

    #[test]
    fn route_method_defaults_to_get() {
        let route: RouteConfig =
            serde_json::from_value(serde_json::json!({ "schema": "user" })).unwrap();
        assert_eq!(route.method, "GET");
        assert_eq!(route.count, None);
    }

    #[test]
    fn persona_field_sets_deserialize() {
        let persona: Persona = serde_json::from_value(serde_json::json!({
            "id": "viewer",
            "name": "Viewer",
            "maskedFields": ["email"],
            "hiddenFields": ["salary", "ssn"]
        }))
        .unwrap();
        assert!(persona.masked_fields.contains("email"));
        assert_eq!(persona.hidden_fields.len(), 2);
    }

    #[test]
    fn qualified_names_round_trip() {
        let q = qualified_name("crm", "growth");
        assert_eq!(q, "crm:growth");
        assert_eq!(split_qualified(&q), Some(("crm", "growth")));
        assert_eq!(split_qualified("growth"), None);
    }
}
