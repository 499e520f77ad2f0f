//! Validates the bundled fixture packs against the formal pack schema at
//! schema/pack-schema.json, and checks that the schema and the loader agree
//! on a few documents the loader rejects.

use std::path::{Path, PathBuf};

fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../..")
}

fn pack_schema_validator() -> jsonschema::Validator {
    let schema_path = workspace_root().join("schema/pack-schema.json");
    let schema_src = std::fs::read_to_string(&schema_path)
        .unwrap_or_else(|e| panic!("Failed to read schema at {}: {}", schema_path.display(), e));
    let schema_value: serde_json::Value = serde_json::from_str(&schema_src).unwrap();
    jsonschema::validator_for(&schema_value)
        .unwrap_or_else(|e| panic!("Failed to compile schema: {}", e))
}

fn fixture_packs() -> Vec<PathBuf> {
    let dir = workspace_root().join("packs");
    let mut paths: Vec<_> = std::fs::read_dir(&dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().map_or(false, |e| e == "json"))
        .collect();
    paths.sort();
    paths
}

#[test]
fn validate_fixture_packs_against_schema() {
    let validator = pack_schema_validator();
    let mut tested = 0usize;
    let mut failures = Vec::new();

    for path in fixture_packs() {
        let json_src = std::fs::read_to_string(&path).unwrap();
        let instance: serde_json::Value = serde_json::from_str(&json_src).unwrap();
        if let Err(error) = validator.validate(&instance) {
            failures.push(format!("{}: {}", path.display(), error));
        }
        tested += 1;
    }

    assert!(tested >= 2, "expected at least two fixture packs, found {}", tested);
    if !failures.is_empty() {
        panic!(
            "{} of {} packs failed schema validation:\n{}",
            failures.len(),
            tested,
            failures.join("\n")
        );
    }
}

#[test]
fn fixture_packs_pass_loader_validation() {
    for path in fixture_packs() {
        let json_src = std::fs::read_to_string(&path).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&json_src).unwrap();
        if let Err(e) = packgen_core::validate_pack(&doc, &path.display().to_string()) {
            panic!("{}", e);
        }
    }
}

#[test]
fn schema_and_loader_both_reject_bad_documents() {
    let validator = pack_schema_validator();
    let bad = [
        serde_json::json!({ "id": "Bad Id", "name": "x", "version": "1", "schemas": { "a": { "type": "string" } } }),
        serde_json::json!({ "id": "ok", "name": "x", "version": "1", "schemas": {} }),
        serde_json::json!({ "id": "ok", "name": "x", "version": "1", "schemas": { "a": { "description": "untyped" } } }),
        serde_json::json!({ "id": "ok", "name": "x", "schemas": { "a": { "type": "string" } } }),
        serde_json::json!({
            "id": "ok", "name": "x", "version": "1",
            "schemas": { "a": { "type": "string" } },
            "scenarios": { "s": { "name": "no id" } }
        }),
    ];
    for doc in &bad {
        assert!(!validator.is_valid(doc), "schema accepted {}", doc);
        assert!(
            packgen_core::validate_pack(doc, "inline").is_err(),
            "loader accepted {}",
            doc
        );
    }
}
