use packgen_interchange::Stage;
use serde_json::json;

use super::{check, TestResult};
use crate::persist::{PersistencePort, STORAGE_KEY};
use crate::state::{ConfigurationState, PersistedConfig, DEFAULT_GENERATION_ID};
use crate::store::Store;

pub(super) fn run_roundtrip_tests<P, F>(factory: &F) -> Vec<TestResult>
where
    P: PersistencePort + 'static,
    F: Fn() -> P,
{
    vec![
        TestResult::from_result(
            "roundtrip",
            "transition_writes_subset",
            transition_writes_subset(factory),
        ),
        TestResult::from_result(
            "roundtrip",
            "new_store_hydrates",
            new_store_hydrates(factory),
        ),
        TestResult::from_result(
            "roundtrip",
            "generated_data_and_snapshots_not_persisted",
            generated_data_and_snapshots_not_persisted(factory),
        ),
        TestResult::from_result(
            "roundtrip",
            "corrupt_payload_uses_defaults",
            corrupt_payload_uses_defaults(factory),
        ),
        TestResult::from_result(
            "roundtrip",
            "reset_is_persisted",
            reset_is_persisted(factory),
        ),
    ]
}

fn reopen(store: &mut Store) -> Result<Store, String> {
    let port = store
        .detach_persistence()
        .ok_or_else(|| "store had no port attached".to_string())?;
    Ok(Store::with_persistence(port))
}

fn transition_writes_subset<P, F>(factory: &F) -> Result<(), String>
where
    P: PersistencePort + 'static,
    F: Fn() -> P,
{
    let mut store = Store::with_persistence(Box::new(factory()));
    store.set_stage(Stage::Enterprise).map_err(|e| e.to_string())?;
    let port = store
        .detach_persistence()
        .ok_or_else(|| "store had no port attached".to_string())?;
    let text = port
        .get(STORAGE_KEY)
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("nothing written under {}", STORAGE_KEY))?;
    let persisted: PersistedConfig = serde_json::from_str(&text).map_err(|e| e.to_string())?;
    check(persisted.active_stage == Stage::Enterprise, || {
        format!("persisted stage is {}", persisted.active_stage)
    })
}

fn new_store_hydrates<P, F>(factory: &F) -> Result<(), String>
where
    P: PersistencePort + 'static,
    F: Fn() -> P,
{
    let mut store = Store::with_persistence(Box::new(factory()));
    store.activate_category("productivity").map_err(|e| e.to_string())?;
    store.activate_role("admin").map_err(|e| e.to_string())?;
    store.set_stage(Stage::Growth).map_err(|e| e.to_string())?;
    store.set_generation_id(777).map_err(|e| e.to_string())?;

    let reopened = reopen(&mut store)?;
    let state = reopened.state();
    check(
        state.active_category.as_deref() == Some("productivity")
            && state.active_role.as_deref() == Some("admin")
            && state.active_stage == Stage::Growth
            && state.current_generation_id == 777,
        || format!("hydrated state differs: {:?}", state.persisted()),
    )
}

fn generated_data_and_snapshots_not_persisted<P, F>(factory: &F) -> Result<(), String>
where
    P: PersistencePort + 'static,
    F: Fn() -> P,
{
    let mut store = Store::with_persistence(Box::new(factory()));
    store
        .record_generated("user", json!([{ "id": 1 }]))
        .map_err(|e| e.to_string())?;
    store.create_snapshot("kept in memory").map_err(|e| e.to_string())?;

    let reopened = reopen(&mut store)?;
    check(reopened.state().generated_data.is_empty(), || {
        "generated data leaked into persistence".to_string()
    })?;
    check(reopened.list_snapshots().is_empty(), || {
        "snapshots leaked into persistence".to_string()
    })
}

fn corrupt_payload_uses_defaults<P, F>(factory: &F) -> Result<(), String>
where
    P: PersistencePort + 'static,
    F: Fn() -> P,
{
    let mut port = factory();
    port.set(STORAGE_KEY, "{\"activeStage\": 42")
        .map_err(|e| e.to_string())?;
    let store = Store::with_persistence(Box::new(port));
    check(store.state() == &ConfigurationState::default(), || {
        format!("expected defaults, got {:?}", store.state().persisted())
    })
}

fn reset_is_persisted<P, F>(factory: &F) -> Result<(), String>
where
    P: PersistencePort + 'static,
    F: Fn() -> P,
{
    let mut store = Store::with_persistence(Box::new(factory()));
    store.set_stage(Stage::Enterprise).map_err(|e| e.to_string())?;
    store.set_generation_id(5).map_err(|e| e.to_string())?;
    store.reset().map_err(|e| e.to_string())?;

    let reopened = reopen(&mut store)?;
    let state = reopened.state();
    check(
        state.active_stage == Stage::Early && state.current_generation_id == DEFAULT_GENERATION_ID,
        || format!("reset not persisted: {:?}", state.persisted()),
    )
}
