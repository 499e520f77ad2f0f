//! Configuration state and its pure reducer.
//!
//! [`reduce`] is the only place state changes are defined. It never
//! mutates its input: a transition either yields a complete new state or
//! an error, leaving the caller's state as it was.

use std::collections::{BTreeMap, BTreeSet};

pub use packgen_interchange::ScenarioSelection;
use packgen_interchange::Stage;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StoreError;

/// Generation id of a fresh or reset store.
pub const DEFAULT_GENERATION_ID: u64 = 12345;

/// Randomized generation ids are drawn from `0..GENERATION_ID_RANGE`.
pub const GENERATION_ID_RANGE: u64 = 100_000;

/// Store-wide generation defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreConfig {
    pub locale: String,
    pub default_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_date: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            locale: "en-US".to_string(),
            default_count: 10,
            time_zone: None,
            base_date: None,
        }
    }
}

// ── Snapshots ───────────────────────────────────────────────────────

/// The captured part of the live state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotState {
    #[serde(default)]
    pub config: StoreConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_role: Option<String>,
    pub active_stage: Stage,
    #[serde(default)]
    pub generated_data: BTreeMap<String, Value>,
    pub generation_id: u64,
}

/// An immutable, named capture of the live state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub id: String,
    pub name: String,
    /// RFC 3339 creation time.
    pub timestamp: String,
    pub state: SnapshotState,
}

/// The subset of state written to a persistence port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedConfig {
    #[serde(default)]
    pub config: StoreConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_role: Option<String>,
    #[serde(default)]
    pub active_stage: Stage,
    #[serde(default = "default_generation_id")]
    pub current_generation_id: u64,
}

fn default_generation_id() -> u64 {
    DEFAULT_GENERATION_ID
}

// ── Live state ──────────────────────────────────────────────────────

/// Everything the store tracks.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigurationState {
    pub config: StoreConfig,
    pub active_category: Option<String>,
    pub active_categories: BTreeSet<String>,
    pub active_role: Option<String>,
    pub active_stage: Stage,
    pub current_generation_id: u64,
    pub generated_data: BTreeMap<String, Value>,
    /// Snapshots in creation (or import) order.
    pub snapshots: Vec<Snapshot>,
    /// Category ids that may be activated. `None` accepts any id.
    pub known_categories: Option<BTreeSet<String>>,
}

impl Default for ConfigurationState {
    fn default() -> Self {
        ConfigurationState {
            config: StoreConfig::default(),
            active_category: None,
            active_categories: BTreeSet::new(),
            active_role: None,
            active_stage: Stage::Early,
            current_generation_id: DEFAULT_GENERATION_ID,
            generated_data: BTreeMap::new(),
            snapshots: Vec::new(),
            known_categories: None,
        }
    }
}

impl ConfigurationState {
    pub fn snapshot(&self, id: &str) -> Option<&Snapshot> {
        self.snapshots.iter().find(|s| s.id == id)
    }

    pub fn persisted(&self) -> PersistedConfig {
        PersistedConfig {
            config: self.config.clone(),
            active_category: self.active_category.clone(),
            active_role: self.active_role.clone(),
            active_stage: self.active_stage,
            current_generation_id: self.current_generation_id,
        }
    }

    fn capture(&self) -> SnapshotState {
        SnapshotState {
            config: self.config.clone(),
            active_category: self.active_category.clone(),
            active_role: self.active_role.clone(),
            active_stage: self.active_stage,
            generated_data: self.generated_data.clone(),
            generation_id: self.current_generation_id,
        }
    }

    fn check_known(&self, category: &str) -> Result<(), StoreError> {
        match &self.known_categories {
            Some(known) if !known.contains(category) => {
                Err(StoreError::not_found("category", category))
            }
            _ => Ok(()),
        }
    }

    fn select_category(&mut self, category: Option<String>) {
        self.active_categories = category.iter().cloned().collect();
        self.active_category = category;
    }
}

// ── Transitions ─────────────────────────────────────────────────────

/// Every state change the store supports.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    ActivateCategory(String),
    DeactivateCategory(String),
    ActivateRole(String),
    DeactivateRole,
    SetStage(Stage),
    SetGenerationId(u64),
    SetScenario(ScenarioSelection),
    CreateSnapshot {
        id: String,
        name: String,
        timestamp: String,
    },
    RestoreSnapshot(String),
    DeleteSnapshot(String),
    ImportSnapshot(Snapshot),
    RecordGenerated {
        key: String,
        value: Value,
    },
    ClearGenerated,
    SetConfig(StoreConfig),
    SyncCategories(BTreeSet<String>),
    /// Load a persisted subset (used when a port is attached).
    Hydrate(PersistedConfig),
    Reset,
}

impl Transition {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Transition::ActivateCategory(_) => "activate_category",
            Transition::DeactivateCategory(_) => "deactivate_category",
            Transition::ActivateRole(_) => "activate_role",
            Transition::DeactivateRole => "deactivate_role",
            Transition::SetStage(_) => "set_stage",
            Transition::SetGenerationId(_) => "set_generation_id",
            Transition::SetScenario(_) => "set_scenario",
            Transition::CreateSnapshot { .. } => "create_snapshot",
            Transition::RestoreSnapshot(_) => "restore_snapshot",
            Transition::DeleteSnapshot(_) => "delete_snapshot",
            Transition::ImportSnapshot(_) => "import_snapshot",
            Transition::RecordGenerated { .. } => "record_generated",
            Transition::ClearGenerated => "clear_generated",
            Transition::SetConfig(_) => "set_config",
            Transition::SyncCategories(_) => "sync_categories",
            Transition::Hydrate(_) => "hydrate",
            Transition::Reset => "reset",
        }
    }
}

/// Apply one transition, returning the next state.
pub fn reduce(
    state: &ConfigurationState,
    transition: &Transition,
) -> Result<ConfigurationState, StoreError> {
    let mut next = state.clone();
    match transition {
        Transition::ActivateCategory(id) => {
            state.check_known(id)?;
            next.active_categories.insert(id.clone());
            next.active_category = Some(id.clone());
        }
        Transition::DeactivateCategory(id) => {
            next.active_categories.remove(id);
            if next.active_category.as_deref() == Some(id.as_str()) {
                next.active_category = None;
            }
        }
        Transition::ActivateRole(id) => next.active_role = Some(id.clone()),
        Transition::DeactivateRole => next.active_role = None,
        Transition::SetStage(stage) => next.active_stage = *stage,
        Transition::SetGenerationId(id) => next.current_generation_id = *id,
        Transition::SetScenario(selection) => {
            if let Some(category) = &selection.category {
                state.check_known(category)?;
            }
            next.select_category(selection.category.clone());
            next.active_role = selection.role.clone();
            next.active_stage = selection.stage.unwrap_or_default();
            next.current_generation_id = selection.generation_id.unwrap_or(DEFAULT_GENERATION_ID);
        }
        Transition::CreateSnapshot {
            id,
            name,
            timestamp,
        } => {
            if state.snapshot(id).is_some() {
                return Err(StoreError::DuplicateSnapshot { id: id.clone() });
            }
            next.snapshots.push(Snapshot {
                id: id.clone(),
                name: name.clone(),
                timestamp: timestamp.clone(),
                state: state.capture(),
            });
        }
        Transition::RestoreSnapshot(id) => {
            let snapshot = state
                .snapshot(id)
                .ok_or_else(|| StoreError::not_found("snapshot", id))?;
            let captured = snapshot.state.clone();
            let category = captured
                .active_category
                .filter(|c| state.check_known(c).is_ok());
            next.config = captured.config;
            next.select_category(category);
            next.active_role = captured.active_role;
            next.active_stage = captured.active_stage;
            next.generated_data = captured.generated_data;
            next.current_generation_id = captured.generation_id;
        }
        Transition::DeleteSnapshot(id) => {
            if state.snapshot(id).is_none() {
                return Err(StoreError::not_found("snapshot", id));
            }
            next.snapshots.retain(|s| &s.id != id);
        }
        Transition::ImportSnapshot(snapshot) => {
            if state.snapshot(&snapshot.id).is_some() {
                return Err(StoreError::DuplicateSnapshot {
                    id: snapshot.id.clone(),
                });
            }
            next.snapshots.push(snapshot.clone());
        }
        Transition::RecordGenerated { key, value } => {
            next.generated_data.insert(key.clone(), value.clone());
        }
        Transition::ClearGenerated => next.generated_data.clear(),
        Transition::SetConfig(config) => next.config = config.clone(),
        Transition::SyncCategories(ids) => {
            next.active_categories.retain(|c| ids.contains(c));
            if next
                .active_category
                .as_ref()
                .is_some_and(|c| !ids.contains(c))
            {
                next.active_category = None;
            }
            next.known_categories = Some(ids.clone());
        }
        Transition::Hydrate(persisted) => {
            let category = persisted
                .active_category
                .clone()
                .filter(|c| state.check_known(c).is_ok());
            next.config = persisted.config.clone();
            next.select_category(category);
            next.active_role = persisted.active_role.clone();
            next.active_stage = persisted.active_stage;
            next.current_generation_id = persisted.current_generation_id;
        }
        Transition::Reset => {
            next = ConfigurationState {
                snapshots: state.snapshots.clone(),
                known_categories: state.known_categories.clone(),
                ..ConfigurationState::default()
            };
        }
    }
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn apply(state: &ConfigurationState, t: Transition) -> ConfigurationState {
        reduce(state, &t).unwrap()
    }

    #[test]
    fn defaults() {
        let s = ConfigurationState::default();
        assert_eq!(s.active_stage, Stage::Early);
        assert_eq!(s.current_generation_id, 12345);
        assert!(s.active_category.is_none());
        assert_eq!(s.config.locale, "en-US");
    }

    #[test]
    fn category_activation_is_single_select() {
        let s = ConfigurationState::default();
        let s = apply(&s, Transition::ActivateCategory("crm".into()));
        let s = apply(&s, Transition::ActivateCategory("shop".into()));
        assert_eq!(s.active_category.as_deref(), Some("shop"));
        assert!(s.active_categories.contains("crm"));

        let s = apply(&s, Transition::DeactivateCategory("shop".into()));
        assert!(s.active_category.is_none());
        assert!(!s.active_categories.contains("shop"));
    }

    #[test]
    fn unknown_category_is_rejected_once_known_list_exists() {
        let s = apply(
            &ConfigurationState::default(),
            Transition::SyncCategories(["crm".to_string()].into()),
        );
        let err = reduce(&s, &Transition::ActivateCategory("shop".into())).unwrap_err();
        assert_eq!(err, StoreError::not_found("category", "shop"));
    }

    #[test]
    fn sync_drops_orphaned_category() {
        let s = apply(
            &ConfigurationState::default(),
            Transition::ActivateCategory("crm".into()),
        );
        let s = apply(&s, Transition::SyncCategories(BTreeSet::new()));
        assert!(s.active_category.is_none());
        assert!(s.active_categories.is_empty());
    }

    #[test]
    fn set_scenario_applies_defaults() {
        let mut s = ConfigurationState::default();
        s.active_stage = Stage::Enterprise;
        s.current_generation_id = 1;
        let s = apply(
            &s,
            Transition::SetScenario(ScenarioSelection {
                category: Some("crm".into()),
                ..ScenarioSelection::default()
            }),
        );
        assert_eq!(s.active_category.as_deref(), Some("crm"));
        assert_eq!(s.active_stage, Stage::Early);
        assert_eq!(s.current_generation_id, DEFAULT_GENERATION_ID);
    }

    #[test]
    fn restore_missing_snapshot_leaves_state() {
        let s = ConfigurationState::default();
        let err = reduce(&s, &Transition::RestoreSnapshot("nope".into())).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { kind: "snapshot", .. }));
    }

    #[test]
    fn snapshot_then_restore_brings_back_everything() {
        let s = ConfigurationState::default();
        let s = apply(&s, Transition::ActivateCategory("crm".into()));
        let s = apply(&s, Transition::SetStage(Stage::Growth));
        let s = apply(
            &s,
            Transition::RecordGenerated {
                key: "contacts".into(),
                value: json!([1, 2]),
            },
        );
        let s = apply(
            &s,
            Transition::CreateSnapshot {
                id: "snap-1".into(),
                name: "before".into(),
                timestamp: "2024-01-01T00:00:00Z".into(),
            },
        );
        let changed = apply(&s, Transition::Reset);
        assert_eq!(changed.snapshots.len(), 1);
        assert!(changed.generated_data.is_empty());

        let restored = apply(&changed, Transition::RestoreSnapshot("snap-1".into()));
        assert_eq!(restored.active_category.as_deref(), Some("crm"));
        assert_eq!(restored.active_stage, Stage::Growth);
        assert_eq!(restored.generated_data["contacts"], json!([1, 2]));
    }

    #[test]
    fn restore_brings_back_config_cleared_by_reset() {
        let config = StoreConfig {
            locale: "fr-FR".into(),
            default_count: 3,
            time_zone: Some("Europe/Paris".into()),
            base_date: None,
        };
        let s = apply(&ConfigurationState::default(), Transition::SetConfig(config.clone()));
        let s = apply(
            &s,
            Transition::CreateSnapshot {
                id: "snap-1".into(),
                name: "fr".into(),
                timestamp: "2024-01-01T00:00:00Z".into(),
            },
        );
        let s = apply(&s, Transition::Reset);
        assert_eq!(s.config, StoreConfig::default());

        let restored = apply(&s, Transition::RestoreSnapshot("snap-1".into()));
        assert_eq!(restored.config, config);
    }

    #[test]
    fn restore_skips_category_no_longer_known() {
        let s = apply(
            &ConfigurationState::default(),
            Transition::SyncCategories(["crm".to_string(), "shop".to_string()].into()),
        );
        let s = apply(&s, Transition::ActivateCategory("crm".into()));
        let s = apply(&s, Transition::SetStage(Stage::Growth));
        let s = apply(
            &s,
            Transition::CreateSnapshot {
                id: "snap-1".into(),
                name: "crm".into(),
                timestamp: "2024-01-01T00:00:00Z".into(),
            },
        );
        let s = apply(&s, Transition::SyncCategories(["shop".to_string()].into()));

        let restored = apply(&s, Transition::RestoreSnapshot("snap-1".into()));
        assert_eq!(restored.active_category, None);
        assert!(restored.active_categories.is_empty());
        assert_eq!(restored.active_stage, Stage::Growth);
    }

    #[test]
    fn snapshot_without_config_member_still_parses() {
        let state: SnapshotState = serde_json::from_value(json!({
            "activeStage": "growth",
            "generationId": 7
        }))
        .unwrap();
        assert_eq!(state.config, StoreConfig::default());
        assert_eq!(state.generation_id, 7);
    }

    #[test]
    fn persisted_subset_round_trips_through_json() {
        let mut s = ConfigurationState::default();
        s.active_role = Some("admin".into());
        s.generated_data.insert("k".into(), json!(1));
        let text = serde_json::to_string(&s.persisted()).unwrap();
        assert!(!text.contains("generatedData"));
        let back: PersistedConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(back, s.persisted());
    }
}
