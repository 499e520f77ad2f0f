//! Structural validation of raw pack documents.
//!
//! Runs every rule against the untyped JSON and collects all violations,
//! so authors see the full list in one pass. A document that passes is
//! guaranteed to deserialize with `packgen_interchange::from_pack`.

use std::collections::BTreeSet;

use packgen_interchange::schema::{ref_target, schema_type, CompositionKind};
use serde_json::Value;

use crate::error::{ValidationError, Violation};

const PRIMITIVE_TYPES: [&str; 5] = ["string", "number", "integer", "boolean", "null"];

/// Validate a raw pack document. `origin` names the pack in the error when
/// its `id` is unreadable.
pub fn validate_pack(doc: &Value, origin: &str) -> Result<(), ValidationError> {
    let mut violations = Vec::new();

    let Some(root) = doc.as_object() else {
        return Err(ValidationError {
            pack: origin.to_string(),
            violations: vec![Violation::new("#", "document root must be an object")],
        });
    };

    let pack = match root.get("id").and_then(|v| v.as_str()) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => origin.to_string(),
    };

    validate_id(root.get("id"), &mut violations);
    for field in ["name", "version"] {
        match root.get(field) {
            Some(Value::String(s)) if !s.trim().is_empty() => {}
            Some(Value::String(_)) => {
                violations.push(Violation::new(format!("#/{}", field), "must not be empty"))
            }
            Some(_) => violations.push(Violation::new(format!("#/{}", field), "must be a string")),
            None => violations.push(Violation::new(
                format!("#/{}", field),
                "missing required string",
            )),
        }
    }
    for field in ["description", "businessType"] {
        if let Some(v) = root.get(field) {
            if !v.is_string() && !v.is_null() {
                violations.push(Violation::new(format!("#/{}", field), "must be a string"));
            }
        }
    }

    let schema_names = validate_schemas(root.get("schemas"), &mut violations);
    validate_scenarios(root.get("scenarios"), &schema_names, &mut violations);
    let persona_names = validate_personas(root.get("personas"), &mut violations);
    validate_routes(
        root.get("routes"),
        &schema_names,
        &persona_names,
        &mut violations,
    );

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { pack, violations })
    }
}

/// Whether `id` is a valid pack id (`^[a-z0-9-]+$`).
pub fn is_valid_pack_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}

fn validate_id(id: Option<&Value>, violations: &mut Vec<Violation>) {
    match id {
        Some(Value::String(s)) if is_valid_pack_id(s) => {}
        Some(Value::String(s)) if s.is_empty() => {
            violations.push(Violation::new("#/id", "must not be empty"))
        }
        Some(Value::String(s)) => violations.push(Violation::new(
            "#/id",
            format!("'{}' must match ^[a-z0-9-]+$", s),
        )),
        Some(_) => violations.push(Violation::new("#/id", "must be a string")),
        None => violations.push(Violation::new("#/id", "missing required string")),
    }
}

// ── Schemas ─────────────────────────────────────────────────────────

fn validate_schemas(schemas: Option<&Value>, violations: &mut Vec<Violation>) -> BTreeSet<String> {
    let map = match schemas {
        Some(Value::Object(map)) => map,
        Some(_) => {
            violations.push(Violation::new("#/schemas", "must be an object"));
            return BTreeSet::new();
        }
        None => {
            violations.push(Violation::new("#/schemas", "missing required map"));
            return BTreeSet::new();
        }
    };
    if map.is_empty() {
        violations.push(Violation::new("#/schemas", "must declare at least one schema"));
    }

    let names: BTreeSet<String> = map.keys().cloned().collect();
    for (name, node) in map {
        validate_schema_node(node, &format!("#/schemas/{}", name), &names, violations);
    }
    names
}

fn validate_schema_node(
    node: &Value,
    path: &str,
    schema_names: &BTreeSet<String>,
    violations: &mut Vec<Violation>,
) {
    let Some(obj) = node.as_object() else {
        violations.push(Violation::new(path, "schema node must be an object"));
        return;
    };

    if let Some(reference) = obj.get("$ref") {
        match reference.as_str() {
            Some(r) if schema_names.contains(ref_target(r)) => {}
            Some(r) => violations.push(Violation::new(path, format!("unresolved $ref '{}'", r))),
            None => violations.push(Violation::new(path, "'$ref' must be a string")),
        }
        return;
    }

    for (keyword, _) in CompositionKind::KEYWORDS {
        if let Some(members) = obj.get(keyword) {
            match members.as_array() {
                Some(arr) if arr.is_empty() => violations.push(Violation::new(
                    path,
                    format!("'{}' must not be empty", keyword),
                )),
                Some(arr) => {
                    for (i, member) in arr.iter().enumerate() {
                        let member_path = format!("{}/{}/{}", path, keyword, i);
                        validate_schema_node(member, &member_path, schema_names, violations);
                    }
                }
                None => violations.push(Violation::new(
                    path,
                    format!("'{}' must be an array", keyword),
                )),
            }
            return;
        }
    }

    let Some(type_name) = schema_type(node) else {
        violations.push(Violation::new(
            path,
            "missing 'type', '$ref', or composition keyword",
        ));
        return;
    };

    match type_name {
        "object" => match obj.get("properties") {
            Some(Value::Object(props)) => {
                for (prop, sub) in props {
                    let sub_path = format!("{}/properties/{}", path, prop);
                    validate_schema_node(sub, &sub_path, schema_names, violations);
                }
                if let Some(required) = obj.get("required") {
                    let all_strings = required
                        .as_array()
                        .map(|arr| arr.iter().all(|v| v.is_string()))
                        .unwrap_or(false);
                    if !all_strings {
                        violations.push(Violation::new(
                            format!("{}/required", path),
                            "must be an array of property names",
                        ));
                    }
                }
            }
            Some(_) => violations.push(Violation::new(
                format!("{}/properties", path),
                "must be an object",
            )),
            None => violations.push(Violation::new(path, "object schema missing 'properties'")),
        },
        "array" => {
            match obj.get("items") {
                Some(items) => validate_schema_node(
                    items,
                    &format!("{}/items", path),
                    schema_names,
                    violations,
                ),
                None => violations.push(Violation::new(path, "array schema missing 'items'")),
            }
            check_bounds(obj, path, "minItems", "maxItems", violations);
        }
        t if PRIMITIVE_TYPES.contains(&t) => {
            check_bounds(obj, path, "minimum", "maximum", violations);
            check_bounds(obj, path, "minLength", "maxLength", violations);
            if let Some(values) = obj.get("enum") {
                let ok = values.as_array().map(|a| !a.is_empty()).unwrap_or(false);
                if !ok {
                    violations.push(Violation::new(
                        format!("{}/enum", path),
                        "must be a non-empty array",
                    ));
                }
            }
        }
        other => violations.push(Violation::new(path, format!("unsupported type '{}'", other))),
    }
}

fn check_bounds(
    obj: &serde_json::Map<String, Value>,
    path: &str,
    min_key: &str,
    max_key: &str,
    violations: &mut Vec<Violation>,
) {
    let min = obj.get(min_key).and_then(|v| v.as_f64());
    let max = obj.get(max_key).and_then(|v| v.as_f64());
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            violations.push(Violation::new(
                path,
                format!("{} ({}) exceeds {} ({})", min_key, min, max_key, max),
            ));
        }
    }
}

// ── Scenarios, personas, routes ─────────────────────────────────────

fn validate_scenarios(
    scenarios: Option<&Value>,
    schema_names: &BTreeSet<String>,
    violations: &mut Vec<Violation>,
) {
    let Some(map) = optional_section(scenarios, "#/scenarios", violations) else {
        return;
    };

    for (key, entry) in map {
        let path = format!("#/scenarios/{}", key);
        if !require_id_and_name(entry, &path, violations) {
            continue;
        }
        let Some(config) = entry.get("config") else {
            continue;
        };
        if !config.is_object() {
            violations.push(Violation::new(format!("{}/config", path), "must be an object"));
            continue;
        }
        if let Some(seed) = config.get("seed") {
            if seed.as_u64().is_none() {
                violations.push(Violation::new(
                    format!("{}/config/seed", path),
                    "must be a non-negative integer",
                ));
            }
        }
        if let Some(volume) = config.get("volume") {
            let Some(volume) = volume.as_object() else {
                violations.push(Violation::new(
                    format!("{}/config/volume", path),
                    "must be an object",
                ));
                continue;
            };
            for (entity, count) in volume {
                let entity_path = format!("{}/config/volume/{}", path, entity);
                if !schema_names.contains(entity) {
                    violations.push(Violation::new(
                        &entity_path,
                        format!("unknown entity '{}': not a declared schema", entity),
                    ));
                }
                if count.as_u64().is_none() {
                    violations.push(Violation::new(&entity_path, "must be a non-negative integer"));
                }
            }
        }
    }
}

fn validate_personas(personas: Option<&Value>, violations: &mut Vec<Violation>) -> BTreeSet<String> {
    let Some(map) = optional_section(personas, "#/personas", violations) else {
        return BTreeSet::new();
    };

    for (key, entry) in map {
        let path = format!("#/personas/{}", key);
        if !require_id_and_name(entry, &path, violations) {
            continue;
        }
        for field in ["maskedFields", "hiddenFields"] {
            if let Some(v) = entry.get(field) {
                let ok = v
                    .as_array()
                    .map(|arr| arr.iter().all(|f| f.is_string()))
                    .unwrap_or(false);
                if !ok {
                    violations.push(Violation::new(
                        format!("{}/{}", path, field),
                        "must be an array of field names",
                    ));
                }
            }
        }
        if let Some(overrides) = entry.get("overrides") {
            if !overrides.is_object() && !overrides.is_null() {
                violations.push(Violation::new(
                    format!("{}/overrides", path),
                    "must be an object",
                ));
            }
        }
    }
    map.keys().cloned().collect()
}

fn validate_routes(
    routes: Option<&Value>,
    schema_names: &BTreeSet<String>,
    persona_names: &BTreeSet<String>,
    violations: &mut Vec<Violation>,
) {
    let Some(map) = optional_section(routes, "#/routes", violations) else {
        return;
    };

    for (route, entry) in map {
        let path = format!("#/routes/{}", route);
        match entry.get("schema") {
            Some(Value::String(s)) if schema_names.contains(s) => {}
            Some(Value::String(s)) => violations.push(Violation::new(
                format!("{}/schema", path),
                format!("references unknown schema '{}'", s),
            )),
            Some(_) => violations.push(Violation::new(format!("{}/schema", path), "must be a string")),
            None => violations.push(Violation::new(&path, "missing required 'schema'")),
        }
        if let Some(persona) = entry.get("persona") {
            match persona.as_str() {
                Some(p) if persona_names.contains(p) => {}
                Some(p) => violations.push(Violation::new(
                    format!("{}/persona", path),
                    format!("references unknown persona '{}'", p),
                )),
                None => violations.push(Violation::new(
                    format!("{}/persona", path),
                    "must be a string",
                )),
            }
        }
        if let Some(count) = entry.get("count") {
            if count.as_u64().is_none() {
                violations.push(Violation::new(
                    format!("{}/count", path),
                    "must be a non-negative integer",
                ));
            }
        }
    }
}

fn optional_section<'a>(
    section: Option<&'a Value>,
    path: &str,
    violations: &mut Vec<Violation>,
) -> Option<&'a serde_json::Map<String, Value>> {
    match section {
        None | Some(Value::Null) => None,
        Some(Value::Object(map)) => Some(map),
        Some(_) => {
            violations.push(Violation::new(path, "must be an object"));
            None
        }
    }
}

/// Returns false when the entry is not an object at all.
fn require_id_and_name(entry: &Value, path: &str, violations: &mut Vec<Violation>) -> bool {
    if !entry.is_object() {
        violations.push(Violation::new(path, "must be an object"));
        return false;
    }
    for field in ["id", "name"] {
        let ok = entry
            .get(field)
            .and_then(|v| v.as_str())
            .map(|s| !s.is_empty())
            .unwrap_or(false);
        if !ok {
            violations.push(Violation::new(
                format!("{}/{}", path, field),
                "missing required string",
            ));
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_pack() -> Value {
        json!({
            "id": "task-board",
            "name": "Task Board",
            "version": "0.1.0",
            "schemas": {
                "user": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "string", "format": "uuid" },
                        "team": { "$ref": "#/schemas/team" }
                    },
                    "required": ["id"]
                },
                "team": {
                    "type": "object",
                    "properties": { "name": { "type": "string" } }
                }
            },
            "scenarios": {
                "early": { "id": "early", "name": "Early", "config": { "volume": { "user": 5 } } }
            },
            "personas": {
                "guest": { "id": "guest", "name": "Guest", "hiddenFields": ["team"] }
            },
            "routes": {
                "/users": { "schema": "user", "persona": "guest", "count": 3 }
            }
        })
    }

    #[test]
    fn valid_pack_passes() {
        assert_eq!(validate_pack(&valid_pack(), "test"), Ok(()));
    }

    #[test]
    fn pack_id_pattern() {
        assert!(is_valid_pack_id("core-2"));
        assert!(!is_valid_pack_id("Core"));
        assert!(!is_valid_pack_id("core_2"));
        assert!(!is_valid_pack_id(""));
    }

    #[test]
    fn collects_every_violation() {
        let doc = json!({
            "id": "Bad_Id",
            "schemas": {
                "user": { "properties": {} },
                "list": { "type": "array" }
            },
            "scenarios": { "s": { "id": "s" } },
            "routes": { "/x": { "schema": "missing" } }
        });
        let err = validate_pack(&doc, "fixture.json").unwrap_err();
        assert_eq!(err.pack, "Bad_Id");
        let paths: Vec<&str> = err.violations.iter().map(|v| v.path.as_str()).collect();
        assert!(paths.contains(&"#/id"));
        assert!(paths.contains(&"#/name"));
        assert!(paths.contains(&"#/version"));
        assert!(paths.contains(&"#/schemas/user"));
        assert!(paths.contains(&"#/schemas/list"));
        assert!(paths.contains(&"#/scenarios/s/name"));
        assert!(paths.contains(&"#/routes//x/schema"));
        assert_eq!(err.violations.len(), 7);
    }

    #[test]
    fn empty_schema_map_is_rejected() {
        let mut doc = valid_pack();
        doc["schemas"] = json!({});
        doc["scenarios"] = json!({});
        doc["routes"] = json!({});
        let err = validate_pack(&doc, "t").unwrap_err();
        assert!(err
            .violations
            .iter()
            .any(|v| v.path == "#/schemas" && v.message.contains("at least one")));
    }

    #[test]
    fn unresolved_ref_is_reported() {
        let mut doc = valid_pack();
        doc["schemas"]["user"]["properties"]["team"] = json!({ "$ref": "#/schemas/nope" });
        let err = validate_pack(&doc, "t").unwrap_err();
        assert_eq!(err.violations.len(), 1);
        assert!(err.violations[0].message.contains("nope"));
    }

    #[test]
    fn conflicting_bounds_are_reported() {
        let mut doc = valid_pack();
        doc["schemas"]["team"]["properties"]["size"] =
            json!({ "type": "integer", "minimum": 10, "maximum": 2 });
        let err = validate_pack(&doc, "t").unwrap_err();
        assert_eq!(err.violations[0].path, "#/schemas/team/properties/size");
    }

    #[test]
    fn unknown_route_persona_and_volume_entity() {
        let mut doc = valid_pack();
        doc["routes"]["/users"]["persona"] = json!("admin");
        doc["scenarios"]["early"]["config"]["volume"]["ghost"] = json!(2);
        let err = validate_pack(&doc, "t").unwrap_err();
        assert_eq!(err.violations.len(), 2);
    }

    #[test]
    fn non_object_root_names_origin() {
        let err = validate_pack(&json!([1, 2]), "packs/a.json").unwrap_err();
        assert_eq!(err.pack, "packs/a.json");
    }
}
