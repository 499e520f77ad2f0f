//! Pack registry: namespaced lookup over registered packs.
//!
//! Every scenario and persona is addressable as `"<packId>:<localName>"`,
//! where the local name is its key in the pack document.

use std::collections::BTreeMap;
use std::path::Path;

use packgen_interchange::{qualified_name, split_qualified, CatalogEntry, DataPack, Persona, Scenario};

use crate::error::PackError;
use crate::loader::{self, PackSource};
use crate::source::SourceProvider;

/// A lookup index over registered packs.
#[derive(Debug, Default, Clone)]
pub struct Registry {
    packs: BTreeMap<String, DataPack>,
    /// Qualified scenario name -> (pack id, local name).
    scenarios: BTreeMap<String, (String, String)>,
    /// Qualified persona name -> (pack id, local name).
    personas: BTreeMap<String, (String, String)>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one pack. Fails if its id is already registered.
    pub fn register(&mut self, pack: DataPack) -> Result<(), PackError> {
        if self.packs.contains_key(&pack.id) {
            return Err(PackError::DuplicateId { id: pack.id });
        }
        self.insert(pack);
        Ok(())
    }

    /// Register a batch atomically: either every pack is registered or,
    /// on any duplicate (within the batch or against the registry), none.
    pub fn register_all(&mut self, packs: Vec<DataPack>) -> Result<(), PackError> {
        loader::check_batch_duplicates(&packs)?;
        if let Some(existing) = packs.iter().find(|p| self.packs.contains_key(&p.id)) {
            return Err(PackError::DuplicateId {
                id: existing.id.clone(),
            });
        }
        for pack in packs {
            self.insert(pack);
        }
        Ok(())
    }

    /// Load and register a batch. Nothing is registered on failure.
    pub fn load_packs(&mut self, sources: &[PackSource]) -> Result<(), PackError> {
        let packs = loader::load_packs(sources)?;
        self.register_all(packs)
    }

    pub fn load_packs_with_provider(
        &mut self,
        sources: &[PackSource],
        provider: &dyn SourceProvider,
    ) -> Result<(), PackError> {
        let packs = loader::load_packs_with_provider(sources, provider)?;
        self.register_all(packs)
    }

    /// Load and register every pack in a directory as one batch.
    pub fn load_dir(&mut self, dir: &Path) -> Result<(), PackError> {
        let packs = loader::load_dir(dir)?;
        self.register_all(packs)
    }

    /// Remove a pack and all of its namespaced scenario/persona entries.
    pub fn unregister(&mut self, id: &str) -> Result<DataPack, PackError> {
        let pack = self
            .packs
            .remove(id)
            .ok_or_else(|| PackError::not_found("pack", id))?;
        self.scenarios.retain(|_, (pack_id, _)| pack_id != id);
        self.personas.retain(|_, (pack_id, _)| pack_id != id);
        tracing::debug!(pack = %id, "unregistered pack");
        Ok(pack)
    }

    fn insert(&mut self, pack: DataPack) {
        for key in pack.scenarios.keys() {
            self.scenarios.insert(
                qualified_name(&pack.id, key),
                (pack.id.clone(), key.clone()),
            );
        }
        for key in pack.personas.keys() {
            self.personas.insert(
                qualified_name(&pack.id, key),
                (pack.id.clone(), key.clone()),
            );
        }
        tracing::debug!(
            pack = %pack.id,
            scenarios = pack.scenarios.len(),
            personas = pack.personas.len(),
            "registered pack"
        );
        self.packs.insert(pack.id.clone(), pack);
    }

    // ── Lookup ──────────────────────────────────────────────────────

    pub fn pack(&self, id: &str) -> Option<&DataPack> {
        self.packs.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.packs.contains_key(id)
    }

    pub fn packs(&self) -> impl Iterator<Item = &DataPack> {
        self.packs.values()
    }

    /// Registered pack ids in sorted order.
    pub fn pack_ids(&self) -> Vec<String> {
        self.packs.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.packs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packs.is_empty()
    }

    /// Qualified scenario names in sorted order.
    pub fn scenario_names(&self) -> Vec<String> {
        self.scenarios.keys().cloned().collect()
    }

    /// Qualified persona names in sorted order.
    pub fn persona_names(&self) -> Vec<String> {
        self.personas.keys().cloned().collect()
    }

    /// Look up a scenario by its qualified name.
    pub fn scenario(&self, qualified: &str) -> Option<&Scenario> {
        let (pack_id, local) = self.scenarios.get(qualified)?;
        self.packs.get(pack_id)?.scenarios.get(local)
    }

    /// Look up a persona by its qualified name.
    pub fn persona(&self, qualified: &str) -> Option<&Persona> {
        let (pack_id, local) = self.personas.get(qualified)?;
        self.packs.get(pack_id)?.personas.get(local)
    }

    /// Resolve a qualified scenario name to its pack and scenario.
    pub fn resolve_scenario(&self, qualified: &str) -> Result<(&DataPack, &Scenario), PackError> {
        let not_found = || PackError::not_found("scenario", qualified);
        let (pack_id, local) = match self.scenarios.get(qualified) {
            Some((p, l)) => (p.as_str(), l.as_str()),
            None => split_qualified(qualified).ok_or_else(not_found)?,
        };
        let pack = self.packs.get(pack_id).ok_or_else(not_found)?;
        let scenario = pack.scenario(local).ok_or_else(not_found)?;
        Ok((pack, scenario))
    }

    /// Resolve a qualified persona name to its persona.
    pub fn resolve_persona(&self, qualified: &str) -> Result<&Persona, PackError> {
        self.persona(qualified)
            .or_else(|| {
                let (pack_id, local) = split_qualified(qualified)?;
                self.packs.get(pack_id)?.persona(local)
            })
            .ok_or_else(|| PackError::not_found("persona", qualified))
    }

    /// Every `(pack, scenario)` pair, sorted by pack id then local name.
    pub fn catalog(&self) -> Vec<CatalogEntry> {
        self.packs
            .values()
            .flat_map(|pack| {
                let entities = pack.entity_names();
                pack.scenarios.iter().map(move |(key, scenario)| CatalogEntry {
                    pack_id: pack.id.clone(),
                    pack_name: pack.name.clone(),
                    business_type: pack.business_type().to_string(),
                    entities: entities.clone(),
                    key: key.clone(),
                    scenario: scenario.clone(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pack(id: &str) -> DataPack {
        loader::load_pack(&PackSource::value(
            id,
            json!({
                "id": id,
                "name": id.to_uppercase(),
                "version": "1.0.0",
                "businessType": "productivity",
                "schemas": {
                    "task": { "type": "object", "properties": { "title": { "type": "string" } } }
                },
                "scenarios": {
                    "growth": { "id": "growth", "name": "Growth" },
                    "early": { "id": "early-days", "name": "Early" }
                },
                "personas": { "admin": { "id": "admin", "name": "Admin" } }
            }),
        ))
        .unwrap()
    }

    #[test]
    fn scenarios_and_personas_are_namespaced() {
        let mut reg = Registry::new();
        reg.register(pack("alpha")).unwrap();
        reg.register(pack("beta")).unwrap();

        assert_eq!(
            reg.scenario_names(),
            vec!["alpha:early", "alpha:growth", "beta:early", "beta:growth"]
        );
        assert_eq!(reg.scenario("beta:growth").unwrap().name, "Growth");
        assert_eq!(reg.persona("alpha:admin").unwrap().id, "admin");
        assert!(reg.scenario("growth").is_none());
    }

    #[test]
    fn resolve_scenario_accepts_declared_id() {
        let mut reg = Registry::new();
        reg.register(pack("alpha")).unwrap();
        let (p, s) = reg.resolve_scenario("alpha:early-days").unwrap();
        assert_eq!(p.id, "alpha");
        assert_eq!(s.name, "Early");
        assert!(matches!(
            reg.resolve_scenario("alpha:missing"),
            Err(PackError::NotFound { kind: "scenario", .. })
        ));
    }

    #[test]
    fn register_rejects_existing_id() {
        let mut reg = Registry::new();
        reg.register(pack("alpha")).unwrap();
        assert_eq!(
            reg.register(pack("alpha")).unwrap_err(),
            PackError::DuplicateId {
                id: "alpha".to_string()
            }
        );
    }

    #[test]
    fn register_all_is_atomic() {
        let mut reg = Registry::new();
        reg.register(pack("alpha")).unwrap();
        let err = reg.register_all(vec![pack("beta"), pack("alpha")]).unwrap_err();
        assert!(matches!(err, PackError::DuplicateId { ref id } if id == "alpha"));
        assert_eq!(reg.pack_ids(), vec!["alpha"]);
    }

    #[test]
    fn unregister_removes_namespaced_entries() {
        let mut reg = Registry::new();
        reg.register_all(vec![pack("alpha"), pack("beta")]).unwrap();
        let removed = reg.unregister("alpha").unwrap();
        assert_eq!(removed.id, "alpha");
        assert!(reg.scenario("alpha:growth").is_none());
        assert!(reg.persona("alpha:admin").is_none());
        assert!(reg.scenario("beta:growth").is_some());
        assert!(matches!(
            reg.unregister("alpha"),
            Err(PackError::NotFound { kind: "pack", .. })
        ));
    }

    #[test]
    fn catalog_lists_every_pack_scenario_pair() {
        let mut reg = Registry::new();
        reg.register_all(vec![pack("beta"), pack("alpha")]).unwrap();
        let catalog = reg.catalog();
        let ids: Vec<String> = catalog.iter().map(|e| e.qualified_id()).collect();
        assert_eq!(
            ids,
            vec!["alpha:early", "alpha:growth", "beta:early", "beta:growth"]
        );
        assert_eq!(catalog[0].business_type, "productivity");
        assert_eq!(catalog[0].entities, vec!["task"]);
    }
}
