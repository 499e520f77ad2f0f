//! Closed schema tree used to drive synthesis.
//!
//! A pack schema is a JSON-Schema-like document. Only the subset the
//! synthesizer understands is modeled: every node is a primitive, an
//! object with `properties`, an array with `items`, a composition
//! (`allOf` / `anyOf` / `oneOf`), or a `$ref` to another schema in the
//! same pack.

use std::collections::{BTreeMap, BTreeSet};

use crate::deserialize::InterchangeError;

/// A parsed schema node.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaDef {
    Object {
        properties: BTreeMap<String, SchemaDef>,
        required: BTreeSet<String>,
    },
    Array {
        items: Box<SchemaDef>,
        min_items: Option<usize>,
        max_items: Option<usize>,
    },
    Primitive {
        kind: PrimitiveKind,
        constraints: Constraints,
    },
    Composition {
        kind: CompositionKind,
        members: Vec<SchemaDef>,
    },
    /// `$ref` to a named schema. Holds the normalized target name.
    Reference(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    String,
    Number,
    Integer,
    Boolean,
    Null,
}

impl PrimitiveKind {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "string" => Some(PrimitiveKind::String),
            "number" => Some(PrimitiveKind::Number),
            "integer" => Some(PrimitiveKind::Integer),
            "boolean" => Some(PrimitiveKind::Boolean),
            "null" => Some(PrimitiveKind::Null),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositionKind {
    AllOf,
    AnyOf,
    OneOf,
}

impl CompositionKind {
    pub const KEYWORDS: [(&'static str, CompositionKind); 3] = [
        ("allOf", CompositionKind::AllOf),
        ("anyOf", CompositionKind::AnyOf),
        ("oneOf", CompositionKind::OneOf),
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            CompositionKind::AllOf => "allOf",
            CompositionKind::AnyOf => "anyOf",
            CompositionKind::OneOf => "oneOf",
        }
    }
}

/// Value constraints on a primitive node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Constraints {
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub format: Option<String>,
    pub pattern: Option<String>,
    pub enum_values: Option<Vec<serde_json::Value>>,
}

/// Normalize a `$ref` string to the schema name it targets.
///
/// Accepts `#/schemas/Name`, `#/definitions/Name`, `#/$defs/Name`,
/// `#/components/schemas/Name`, and bare `Name`.
pub fn ref_target(reference: &str) -> &str {
    const PREFIXES: [&str; 4] = [
        "#/components/schemas/",
        "#/schemas/",
        "#/definitions/",
        "#/$defs/",
    ];
    PREFIXES
        .iter()
        .find_map(|p| reference.strip_prefix(p))
        .unwrap_or(reference)
}

impl SchemaDef {
    /// Parse a schema node. `path` is used in error messages only.
    pub fn from_json(value: &serde_json::Value, path: &str) -> Result<SchemaDef, InterchangeError> {
        let obj = value.as_object().ok_or_else(|| InterchangeError::InvalidSchema {
            path: path.to_string(),
            message: "schema node must be an object".to_string(),
        })?;

        if let Some(reference) = obj.get("$ref") {
            let reference = reference.as_str().ok_or_else(|| InterchangeError::InvalidSchema {
                path: path.to_string(),
                message: "'$ref' must be a string".to_string(),
            })?;
            return Ok(SchemaDef::Reference(ref_target(reference).to_string()));
        }

        for (keyword, kind) in CompositionKind::KEYWORDS {
            if let Some(members) = obj.get(keyword) {
                let arr = members.as_array().ok_or_else(|| InterchangeError::InvalidSchema {
                    path: path.to_string(),
                    message: format!("'{}' must be an array", keyword),
                })?;
                if arr.is_empty() {
                    return Err(InterchangeError::InvalidSchema {
                        path: path.to_string(),
                        message: format!("'{}' must not be empty", keyword),
                    });
                }
                let members = arr
                    .iter()
                    .enumerate()
                    .map(|(i, m)| SchemaDef::from_json(m, &format!("{}/{}/{}", path, keyword, i)))
                    .collect::<Result<Vec<_>, _>>()?;
                return Ok(SchemaDef::Composition { kind, members });
            }
        }

        let type_name = schema_type(value).ok_or_else(|| InterchangeError::InvalidSchema {
            path: path.to_string(),
            message: "missing 'type', '$ref', or composition keyword".to_string(),
        })?;

        match type_name {
            "object" => parse_object(obj, path),
            "array" => parse_array(obj, path),
            other => {
                let kind = PrimitiveKind::parse(other).ok_or_else(|| {
                    InterchangeError::InvalidSchema {
                        path: path.to_string(),
                        message: format!("unsupported type '{}'", other),
                    }
                })?;
                Ok(SchemaDef::Primitive {
                    kind,
                    constraints: parse_constraints(obj),
                })
            }
        }
    }

    /// Whether this node is (directly) an object schema.
    pub fn is_object(&self) -> bool {
        matches!(self, SchemaDef::Object { .. })
    }
}

/// The effective `type` keyword of a schema node.
///
/// A type array such as `["string", "null"]` resolves to its first
/// non-null member, or `"null"` if that is all it lists.
pub fn schema_type(value: &serde_json::Value) -> Option<&str> {
    match value.get("type")? {
        serde_json::Value::String(s) => Some(s.as_str()),
        serde_json::Value::Array(arr) => {
            let names: Vec<&str> = arr.iter().filter_map(|v| v.as_str()).collect();
            names
                .iter()
                .copied()
                .find(|n| *n != "null")
                .or_else(|| names.first().copied())
        }
        _ => None,
    }
}

fn parse_object(
    obj: &serde_json::Map<String, serde_json::Value>,
    path: &str,
) -> Result<SchemaDef, InterchangeError> {
    let props = match obj.get("properties") {
        Some(p) => p.as_object().ok_or_else(|| InterchangeError::InvalidSchema {
            path: path.to_string(),
            message: "'properties' must be an object".to_string(),
        })?,
        None => {
            return Err(InterchangeError::InvalidSchema {
                path: path.to_string(),
                message: "object schema missing 'properties'".to_string(),
            })
        }
    };

    let mut properties = BTreeMap::new();
    for (name, sub) in props {
        let sub_path = format!("{}/properties/{}", path, name);
        properties.insert(name.clone(), SchemaDef::from_json(sub, &sub_path)?);
    }

    let required = obj
        .get("required")
        .and_then(|r| r.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str().map(|s| s.to_string()))
                .collect::<BTreeSet<_>>()
        })
        .unwrap_or_default();

    Ok(SchemaDef::Object {
        properties,
        required,
    })
}

fn parse_array(
    obj: &serde_json::Map<String, serde_json::Value>,
    path: &str,
) -> Result<SchemaDef, InterchangeError> {
    let items = obj.get("items").ok_or_else(|| InterchangeError::InvalidSchema {
        path: path.to_string(),
        message: "array schema missing 'items'".to_string(),
    })?;
    let items = SchemaDef::from_json(items, &format!("{}/items", path))?;

    Ok(SchemaDef::Array {
        items: Box::new(items),
        min_items: obj.get("minItems").and_then(as_usize),
        max_items: obj.get("maxItems").and_then(as_usize),
    })
}

fn parse_constraints(obj: &serde_json::Map<String, serde_json::Value>) -> Constraints {
    let string_field = |key: &str| obj.get(key).and_then(|v| v.as_str()).map(str::to_string);
    Constraints {
        minimum: obj.get("minimum").and_then(|v| v.as_f64()),
        maximum: obj.get("maximum").and_then(|v| v.as_f64()),
        min_length: obj.get("minLength").and_then(as_usize),
        max_length: obj.get("maxLength").and_then(as_usize),
        format: string_field("format"),
        pattern: string_field("pattern"),
        enum_values: obj
            .get("enum")
            .and_then(|v| v.as_array())
            .filter(|arr| !arr.is_empty())
            .cloned(),
    }
}

fn as_usize(v: &serde_json::Value) -> Option<usize> {
    v.as_u64().map(|n| n as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_object_with_required() {
        let schema = SchemaDef::from_json(
            &json!({
                "type": "object",
                "properties": {
                    "id": { "type": "string" },
                    "age": { "type": "number", "minimum": 0, "maximum": 100 }
                },
                "required": ["id", "age"]
            }),
            "#",
        )
        .unwrap();

        match schema {
            SchemaDef::Object {
                properties,
                required,
            } => {
                assert_eq!(properties.len(), 2);
                assert!(required.contains("age"));
                match &properties["age"] {
                    SchemaDef::Primitive { kind, constraints } => {
                        assert_eq!(*kind, PrimitiveKind::Number);
                        assert_eq!(constraints.maximum, Some(100.0));
                    }
                    other => panic!("expected primitive, got {:?}", other),
                }
            }
            other => panic!("expected object, got {:?}", other),
        }
    }

    #[test]
    fn ref_prefixes_are_normalized() {
        assert_eq!(ref_target("#/schemas/user"), "user");
        assert_eq!(ref_target("#/components/schemas/Order"), "Order");
        assert_eq!(ref_target("#/$defs/x"), "x");
        assert_eq!(ref_target("plain"), "plain");
    }

    #[test]
    fn composition_members_are_parsed() {
        let schema = SchemaDef::from_json(
            &json!({ "oneOf": [{ "type": "string" }, { "$ref": "#/schemas/user" }] }),
            "#",
        )
        .unwrap();
        assert_eq!(
            schema,
            SchemaDef::Composition {
                kind: CompositionKind::OneOf,
                members: vec![
                    SchemaDef::Primitive {
                        kind: PrimitiveKind::String,
                        constraints: Constraints::default(),
                    },
                    SchemaDef::Reference("user".to_string()),
                ],
            }
        );
    }

    #[test]
    fn nullable_type_array_uses_first_non_null() {
        let value = json!({ "type": ["null", "integer"] });
        assert_eq!(schema_type(&value), Some("integer"));
    }

    #[test]
    fn missing_type_is_rejected() {
        let err = SchemaDef::from_json(&json!({ "minimum": 1 }), "#/schemas/x").unwrap_err();
        assert!(err.to_string().contains("#/schemas/x"));
    }

    #[test]
    fn array_without_items_is_rejected() {
        assert!(SchemaDef::from_json(&json!({ "type": "array" }), "#").is_err());
    }
}
