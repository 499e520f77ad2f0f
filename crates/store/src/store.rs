//! The `Store`: a reducer wrapper with subscriptions and persistence.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use packgen_interchange::Stage;
use rand::Rng;
use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::document::SnapshotDocument;
use crate::error::StoreError;
use crate::persist::{PersistencePort, STORAGE_KEY};
use crate::state::{
    reduce, ConfigurationState, PersistedConfig, ScenarioSelection, Snapshot, StoreConfig,
    Transition, GENERATION_ID_RANGE,
};

/// Handle returned by [`Store::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&ConfigurationState)>;

/// Owns the live configuration state. Every change goes through
/// [`reduce`]; a committed transition is persisted (when a port is
/// attached) and then observed exactly once by each subscriber.
pub struct Store {
    state: ConfigurationState,
    listeners: BTreeMap<SubscriptionId, Listener>,
    next_listener: u64,
    port: Option<Box<dyn PersistencePort>>,
    snapshot_seq: u64,
    last_millis: u64,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.state)
            .field("listeners", &self.listeners.len())
            .field("persistent", &self.port.is_some())
            .finish()
    }
}

impl Store {
    pub fn new() -> Self {
        Store {
            state: ConfigurationState::default(),
            listeners: BTreeMap::new(),
            next_listener: 0,
            port: None,
            snapshot_seq: 0,
            last_millis: 0,
        }
    }

    /// Attach a port and hydrate from whatever it holds under
    /// [`STORAGE_KEY`]. Unreadable or corrupt data falls back to defaults.
    pub fn with_persistence(port: Box<dyn PersistencePort>) -> Self {
        let mut store = Store::new();
        match port.get(STORAGE_KEY) {
            Ok(Some(text)) => match serde_json::from_str::<PersistedConfig>(&text) {
                Ok(persisted) => match reduce(&store.state, &Transition::Hydrate(persisted)) {
                    Ok(next) => store.state = next,
                    Err(e) => tracing::warn!(error = %e, "ignoring persisted configuration"),
                },
                Err(e) => {
                    tracing::warn!(error = %e, "persisted configuration is corrupt; using defaults")
                }
            },
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "could not read persisted configuration"),
        }
        store.port = Some(port);
        store
    }

    /// Detach and return the persistence port, if any.
    pub fn detach_persistence(&mut self) -> Option<Box<dyn PersistencePort>> {
        self.port.take()
    }

    pub fn state(&self) -> &ConfigurationState {
        &self.state
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&ConfigurationState) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_listener);
        self.next_listener += 1;
        self.listeners.insert(id, Box::new(listener));
        id
    }

    /// Returns whether the subscription existed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.remove(&id).is_some()
    }

    /// Apply a transition. On error nothing changes and nobody is notified.
    pub fn dispatch(&mut self, transition: Transition) -> Result<(), StoreError> {
        let next = reduce(&self.state, &transition)?;
        tracing::debug!(transition = transition.name(), "store transition");
        self.state = next;
        self.persist();
        for listener in self.listeners.values_mut() {
            listener(&self.state);
        }
        Ok(())
    }

    fn persist(&mut self) {
        let Some(port) = self.port.as_mut() else {
            return;
        };
        let result = serde_json::to_string(&self.state.persisted())
            .map_err(|e| StoreError::Persistence(e.to_string()))
            .and_then(|text| port.set(STORAGE_KEY, &text));
        if let Err(e) = result {
            tracing::warn!(error = %e, "failed to persist configuration");
        }
    }

    // ── Configuration ───────────────────────────────────────────────

    pub fn activate_category(&mut self, id: &str) -> Result<(), StoreError> {
        self.dispatch(Transition::ActivateCategory(id.to_string()))
    }

    pub fn deactivate_category(&mut self, id: &str) -> Result<(), StoreError> {
        self.dispatch(Transition::DeactivateCategory(id.to_string()))
    }

    pub fn activate_role(&mut self, id: &str) -> Result<(), StoreError> {
        self.dispatch(Transition::ActivateRole(id.to_string()))
    }

    pub fn deactivate_role(&mut self) -> Result<(), StoreError> {
        self.dispatch(Transition::DeactivateRole)
    }

    pub fn set_stage(&mut self, stage: Stage) -> Result<(), StoreError> {
        self.dispatch(Transition::SetStage(stage))
    }

    pub fn set_generation_id(&mut self, id: u64) -> Result<(), StoreError> {
        self.dispatch(Transition::SetGenerationId(id))
    }

    /// Pick a fresh generation id in `0..GENERATION_ID_RANGE` and return it.
    pub fn randomize_generation_id(&mut self) -> Result<u64, StoreError> {
        let id = rand::thread_rng().gen_range(0..GENERATION_ID_RANGE);
        self.set_generation_id(id)?;
        Ok(id)
    }

    pub fn set_scenario(&mut self, selection: ScenarioSelection) -> Result<(), StoreError> {
        self.dispatch(Transition::SetScenario(selection))
    }

    pub fn set_config(&mut self, config: StoreConfig) -> Result<(), StoreError> {
        self.dispatch(Transition::SetConfig(config))
    }

    /// Install the known-category list, dropping orphaned active categories.
    pub fn sync_categories<I, S>(&mut self, ids: I) -> Result<(), StoreError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids: BTreeSet<String> = ids.into_iter().map(Into::into).collect();
        self.dispatch(Transition::SyncCategories(ids))
    }

    pub fn reset(&mut self) -> Result<(), StoreError> {
        self.dispatch(Transition::Reset)
    }

    // ── Generated data ──────────────────────────────────────────────

    pub fn record_generated(&mut self, key: &str, value: Value) -> Result<(), StoreError> {
        self.dispatch(Transition::RecordGenerated {
            key: key.to_string(),
            value,
        })
    }

    pub fn clear_generated(&mut self) -> Result<(), StoreError> {
        self.dispatch(Transition::ClearGenerated)
    }

    // ── Snapshots ───────────────────────────────────────────────────

    /// Capture the live state under `name`. Returns the new snapshot id.
    pub fn create_snapshot(&mut self, name: &str) -> Result<String, StoreError> {
        let now = OffsetDateTime::now_utc();
        let timestamp = now
            .format(&Rfc3339)
            .map_err(|e| StoreError::Persistence(format!("timestamp: {}", e)))?;
        let millis = u64::try_from(now.unix_timestamp_nanos() / 1_000_000).unwrap_or(0);
        let millis = millis.max(self.last_millis);
        let id = format!("snapshot-{}-{}", millis, self.snapshot_seq);

        self.dispatch(Transition::CreateSnapshot {
            id: id.clone(),
            name: name.to_string(),
            timestamp,
        })?;
        self.last_millis = millis;
        self.snapshot_seq += 1;
        Ok(id)
    }

    pub fn restore_snapshot(&mut self, id: &str) -> Result<(), StoreError> {
        self.dispatch(Transition::RestoreSnapshot(id.to_string()))
    }

    pub fn delete_snapshot(&mut self, id: &str) -> Result<(), StoreError> {
        self.dispatch(Transition::DeleteSnapshot(id.to_string()))
    }

    /// Snapshots in creation order.
    pub fn list_snapshots(&self) -> &[Snapshot] {
        &self.state.snapshots
    }

    /// Serialize one snapshot as a self-contained document.
    pub fn export_snapshot(&self, id: &str) -> Result<String, StoreError> {
        let snapshot = self
            .state
            .snapshot(id)
            .ok_or_else(|| StoreError::not_found("snapshot", id))?;
        SnapshotDocument::new(snapshot.clone()).to_json()
    }

    /// Add the snapshot carried by an exported document. Returns its id.
    pub fn import_snapshot(&mut self, document: &str) -> Result<String, StoreError> {
        let doc = SnapshotDocument::from_json(document)?;
        let id = doc.snapshot.id.clone();
        self.dispatch(Transition::ImportSnapshot(doc.snapshot))?;
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::MemoryPort;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn snapshot_ids_are_unique_and_ordered() {
        let mut store = Store::new();
        let a = store.create_snapshot("a").unwrap();
        let b = store.create_snapshot("b").unwrap();
        assert_ne!(a, b);
        assert!(a.starts_with("snapshot-"));
        assert!(a.ends_with("-0"));
        assert!(b.ends_with("-1"));
        let ids: Vec<_> = store.list_snapshots().iter().map(|s| s.id.clone()).collect();
        assert_eq!(ids, vec![a, b]);
    }

    #[test]
    fn failed_transition_does_not_notify() {
        let mut store = Store::new();
        let calls = Rc::new(RefCell::new(0));
        let seen = calls.clone();
        store.subscribe(move |_| *seen.borrow_mut() += 1);

        assert!(store.restore_snapshot("missing").is_err());
        assert_eq!(*calls.borrow(), 0);
        store.set_stage(Stage::Growth).unwrap();
        assert_eq!(*calls.borrow(), 1);
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let mut store = Store::new();
        let calls = Rc::new(RefCell::new(0));
        let seen = calls.clone();
        let id = store.subscribe(move |_| *seen.borrow_mut() += 1);
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.set_generation_id(1).unwrap();
        assert_eq!(*calls.borrow(), 0);
    }

    #[test]
    fn randomized_id_is_in_range() {
        let mut store = Store::new();
        for _ in 0..50 {
            let id = store.randomize_generation_id().unwrap();
            assert!(id < GENERATION_ID_RANGE);
            assert_eq!(store.state().current_generation_id, id);
        }
    }

    #[test]
    fn persists_after_each_transition() {
        let port = MemoryPort::new();
        let mut store = Store::with_persistence(Box::new(port.clone()));
        store.activate_role("admin").unwrap();
        let text = port.get(STORAGE_KEY).unwrap().unwrap();
        let persisted: PersistedConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(persisted.active_role.as_deref(), Some("admin"));
    }

    #[test]
    fn corrupt_persisted_data_falls_back_to_defaults() {
        let mut port = MemoryPort::new();
        port.set(STORAGE_KEY, "{ not json").unwrap();
        let store = Store::with_persistence(Box::new(port));
        assert_eq!(store.state(), &ConfigurationState::default());
    }
}
