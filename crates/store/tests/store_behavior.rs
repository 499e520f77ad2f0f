use std::cell::RefCell;
use std::rc::Rc;

use packgen_interchange::Stage;
use packgen_store::conformance::run_conformance_suite;
use packgen_store::{
    ConfigurationState, FilePort, MemoryPort, ScenarioSelection, Store, StoreConfig, StoreError,
    DEFAULT_GENERATION_ID,
};
use proptest::prelude::*;
use serde_json::json;

#[test]
fn stage_defaults_and_reset() {
    let mut store = Store::new();
    assert_eq!(store.state().active_stage, Stage::Early);
    assert_eq!(store.state().current_generation_id, DEFAULT_GENERATION_ID);

    store.set_stage(Stage::Enterprise).unwrap();
    assert_eq!(store.state().active_stage, Stage::Enterprise);

    store.reset().unwrap();
    assert_eq!(store.state().active_stage, Stage::Early);
}

#[test]
fn set_scenario_notifies_once() {
    let mut store = Store::new();
    let seen: Rc<RefCell<Vec<ConfigurationState>>> = Rc::default();
    let sink = seen.clone();
    store.subscribe(move |state| sink.borrow_mut().push(state.clone()));

    store
        .set_scenario(ScenarioSelection {
            category: Some("productivity".to_string()),
            role: Some("admin".to_string()),
            stage: Some(Stage::Growth),
            generation_id: Some(202),
        })
        .unwrap();

    let seen = seen.borrow();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].active_category.as_deref(), Some("productivity"));
    assert_eq!(seen[0].active_role.as_deref(), Some("admin"));
    assert_eq!(seen[0].active_stage, Stage::Growth);
    assert_eq!(seen[0].current_generation_id, 202);
}

#[test]
fn unknown_category_leaves_state_untouched() {
    let mut store = Store::new();
    store.sync_categories(["productivity", "ecommerce"]).unwrap();
    store.activate_category("productivity").unwrap();
    let before = store.state().clone();

    let err = store.activate_category("crm").unwrap_err();
    assert_eq!(
        err,
        StoreError::NotFound {
            kind: "category",
            id: "crm".to_string()
        }
    );
    assert_eq!(store.state(), &before);
}

#[test]
fn sync_drops_orphaned_categories() {
    let mut store = Store::new();
    store.activate_category("legacy").unwrap();
    store.sync_categories(["productivity"]).unwrap();
    assert_eq!(store.state().active_category, None);
    assert!(store.state().active_categories.is_empty());
}

#[test]
fn restore_missing_snapshot_is_not_found() {
    let mut store = Store::new();
    store.set_stage(Stage::Growth).unwrap();
    let before = store.state().clone();
    assert!(matches!(
        store.restore_snapshot("snapshot-0-0"),
        Err(StoreError::NotFound { kind: "snapshot", .. })
    ));
    assert_eq!(store.state(), &before);
}

#[test]
fn reset_keeps_snapshots() {
    let mut store = Store::new();
    store.set_stage(Stage::Enterprise).unwrap();
    let id = store.create_snapshot("enterprise").unwrap();
    store.reset().unwrap();
    assert_eq!(store.list_snapshots().len(), 1);

    store.restore_snapshot(&id).unwrap();
    assert_eq!(store.state().active_stage, Stage::Enterprise);
}

#[test]
fn export_import_into_fresh_store() {
    let mut source = Store::new();
    source.activate_category("ecommerce").unwrap();
    source
        .record_generated("order", json!([{ "id": "o-1" }]))
        .unwrap();
    let id = source.create_snapshot("orders").unwrap();
    let document = source.export_snapshot(&id).unwrap();

    let mut target = Store::new();
    assert_eq!(target.import_snapshot(&document).unwrap(), id);
    assert!(matches!(
        target.import_snapshot(&document),
        Err(StoreError::DuplicateSnapshot { .. })
    ));
    target.restore_snapshot(&id).unwrap();
    assert_eq!(target.state().active_category.as_deref(), Some("ecommerce"));
    assert_eq!(target.state().generated_data["order"][0]["id"], "o-1");
}

#[test]
fn memory_port_conformance() {
    let report = run_conformance_suite(MemoryPort::new);
    assert!(report.failed == 0, "{report}");
    assert!(report.total > 0);
}

#[test]
fn file_port_conformance() {
    let dir = tempfile::tempdir().unwrap();
    let counter = RefCell::new(0);
    let report = run_conformance_suite(|| {
        let mut n = counter.borrow_mut();
        *n += 1;
        FilePort::new(dir.path().join(format!("port-{}/state.json", *n)))
    });
    assert!(report.failed == 0, "{report}");
}

fn stage_strategy() -> impl Strategy<Value = Stage> {
    prop_oneof![Just(Stage::Early), Just(Stage::Growth), Just(Stage::Enterprise)]
}

fn config_strategy() -> impl Strategy<Value = StoreConfig> {
    (
        prop_oneof![Just("en-US"), Just("fr-FR"), Just("de-DE")],
        1usize..50,
        proptest::option::of(prop_oneof![Just("UTC"), Just("Europe/Paris")]),
        proptest::option::of(Just("2024-03-01")),
    )
        .prop_map(|(locale, default_count, time_zone, base_date)| StoreConfig {
            locale: locale.to_string(),
            default_count,
            time_zone: time_zone.map(str::to_string),
            base_date: base_date.map(str::to_string),
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn snapshot_round_trip(
        config in config_strategy(),
        category in proptest::option::of("[a-z]{3,10}"),
        role in proptest::option::of("[a-z]{3,8}"),
        stage in stage_strategy(),
        generation_id in 0u64..100_000,
        count in 0usize..4,
    ) {
        let mut store = Store::new();
        store.set_config(config).unwrap();
        store.set_scenario(ScenarioSelection {
            category,
            role,
            stage: Some(stage),
            generation_id: Some(generation_id),
        }).unwrap();
        for i in 0..count {
            store.record_generated(&format!("entity{}", i), json!([i])).unwrap();
        }
        let captured = store.state().clone();
        let id = store.create_snapshot("checkpoint").unwrap();

        store.reset().unwrap();
        store.restore_snapshot(&id).unwrap();

        let restored = store.state();
        prop_assert_eq!(restored.persisted(), captured.persisted());
        prop_assert_eq!(&restored.generated_data, &captured.generated_data);
    }
}

#[test]
fn restore_does_not_revive_dropped_category() {
    let mut store = Store::new();
    store.sync_categories(["crm", "shop"]).unwrap();
    store.activate_category("crm").unwrap();
    let id = store.create_snapshot("crm").unwrap();
    store.sync_categories(["shop"]).unwrap();
    assert!(store.activate_category("crm").is_err());

    store.restore_snapshot(&id).unwrap();
    assert_eq!(store.state().active_category, None);
    assert!(!store.state().active_categories.contains("crm"));
}
