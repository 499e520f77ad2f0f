//! Deserialization from pack JSON documents into typed structs.
//!
//! The main entry point is [`from_pack`], which takes a
//! `&serde_json::Value` and produces a [`DataPack`].

use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;

use crate::schema::SchemaDef;
use crate::types::*;

/// Errors during pack JSON deserialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterchangeError {
    /// The pack is missing a required top-level field.
    MissingField { field: String },
    /// A scenario, persona, or route entry is malformed.
    EntryError {
        kind: String,
        key: String,
        message: String,
    },
    /// A schema node has an unsupported shape.
    InvalidSchema { path: String, message: String },
    /// The document structure is invalid.
    InvalidPack(String),
}

impl fmt::Display for InterchangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterchangeError::MissingField { field } => {
                write!(f, "pack missing required field: '{}'", field)
            }
            InterchangeError::EntryError { kind, key, message } => {
                write!(f, "{} '{}': {}", kind, key, message)
            }
            InterchangeError::InvalidSchema { path, message } => {
                write!(f, "schema {}: {}", path, message)
            }
            InterchangeError::InvalidPack(msg) => {
                write!(f, "invalid pack: {}", msg)
            }
        }
    }
}

impl std::error::Error for InterchangeError {}

/// Deserialize a pack JSON document into typed structs.
///
/// Unknown top-level keys are ignored for forward compatibility.
pub fn from_pack(doc: &serde_json::Value) -> Result<DataPack, InterchangeError> {
    if !doc.is_object() {
        return Err(InterchangeError::InvalidPack(
            "document root must be an object".to_string(),
        ));
    }

    let id = required_str(doc, "id")?;
    let name = required_str(doc, "name")?;
    let version = required_str(doc, "version")?;
    let description = optional_str(doc, "description");
    let business_type = optional_str(doc, "businessType");

    let schema_map = doc
        .get("schemas")
        .and_then(|s| s.as_object())
        .ok_or_else(|| InterchangeError::MissingField {
            field: "schemas".to_string(),
        })?;

    let mut schemas = BTreeMap::new();
    for (schema_name, node) in schema_map {
        let path = format!("#/schemas/{}", schema_name);
        schemas.insert(schema_name.clone(), SchemaDef::from_json(node, &path)?);
    }

    let scenarios = parse_entries::<Scenario>(doc, "scenarios", "scenario")?;
    let personas = parse_entries::<Persona>(doc, "personas", "persona")?;
    let routes = parse_entries::<RouteConfig>(doc, "routes", "route")?;

    Ok(DataPack {
        id,
        name,
        description,
        version,
        business_type,
        schemas,
        scenarios,
        personas,
        routes,
    })
}

// ── Parsing helpers ─────────────────────────────────────────────────

fn required_str(obj: &serde_json::Value, field: &str) -> Result<String, InterchangeError> {
    obj.get(field)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| InterchangeError::MissingField {
            field: field.to_string(),
        })
}

fn optional_str(obj: &serde_json::Value, field: &str) -> Option<String> {
    obj.get(field)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

/// Parse an optional `map<key, T>` section. A missing section is empty.
fn parse_entries<T: DeserializeOwned>(
    doc: &serde_json::Value,
    section: &str,
    kind: &str,
) -> Result<BTreeMap<String, T>, InterchangeError> {
    let map = match doc.get(section) {
        None | Some(serde_json::Value::Null) => return Ok(BTreeMap::new()),
        Some(v) => v.as_object().ok_or_else(|| {
            InterchangeError::InvalidPack(format!("'{}' must be an object", section))
        })?,
    };

    let mut out = BTreeMap::new();
    for (key, entry) in map {
        let parsed = serde_json::from_value::<T>(entry.clone()).map_err(|e| {
            InterchangeError::EntryError {
                kind: kind.to_string(),
                key: key.clone(),
                message: e.to_string(),
            }
        })?;
        out.insert(key.clone(), parsed);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal_pack() -> serde_json::Value {
        json!({
            "id": "crm",
            "name": "CRM",
            "version": "1.0.0",
            "schemas": {
                "contact": {
                    "type": "object",
                    "properties": { "email": { "type": "string", "format": "email" } },
                    "required": ["email"]
                }
            },
            "scenarios": {
                "growth": {
                    "id": "growth",
                    "name": "Growth",
                    "config": { "seed": 7, "volume": { "contact": 25 } }
                }
            },
            "personas": {
                "viewer": { "id": "viewer", "name": "Viewer", "maskedFields": ["email"] }
            },
            "routes": {
                "/contacts": { "schema": "contact", "count": 10 }
            }
        })
    }

    #[test]
    fn parses_complete_pack() {
        let pack = from_pack(&minimal_pack()).unwrap();
        assert_eq!(pack.id, "crm");
        assert_eq!(pack.business_type(), "crm");
        assert_eq!(pack.schemas.len(), 1);
        assert_eq!(pack.scenarios["growth"].config.seed, Some(7));
        assert_eq!(pack.scenarios["growth"].config.volume["contact"], 25);
        assert!(pack.personas["viewer"].masked_fields.contains("email"));
        assert_eq!(pack.routes["/contacts"].count, Some(10));
    }

    #[test]
    fn optional_sections_default_empty() {
        let mut doc = minimal_pack();
        let obj = doc.as_object_mut().unwrap();
        obj.remove("scenarios");
        obj.remove("personas");
        obj.remove("routes");
        let pack = from_pack(&doc).unwrap();
        assert!(pack.scenarios.is_empty());
        assert!(pack.personas.is_empty());
        assert!(pack.routes.is_empty());
    }

    #[test]
    fn missing_version_is_reported() {
        let mut doc = minimal_pack();
        doc.as_object_mut().unwrap().remove("version");
        assert_eq!(
            from_pack(&doc).unwrap_err(),
            InterchangeError::MissingField {
                field: "version".to_string()
            }
        );
    }

    #[test]
    fn scenario_without_name_is_entry_error() {
        let mut doc = minimal_pack();
        doc["scenarios"]["broken"] = json!({ "id": "broken" });
        let err = from_pack(&doc).unwrap_err();
        match err {
            InterchangeError::EntryError { kind, key, .. } => {
                assert_eq!(kind, "scenario");
                assert_eq!(key, "broken");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn business_type_overrides_id() {
        let mut doc = minimal_pack();
        doc["businessType"] = json!("productivity");
        let pack = from_pack(&doc).unwrap();
        assert_eq!(pack.business_type(), "productivity");
    }
}
