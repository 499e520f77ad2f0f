//! Override merging.

use serde_json::{Map, Value};

/// Shallow top-level merge: every override key replaces (or adds) the
/// generated value under that key. Non-object values are returned as is.
pub fn apply_overrides(generated: Value, overrides: &Map<String, Value>) -> Value {
    match generated {
        Value::Object(mut map) => {
            for (key, value) in overrides {
                map.insert(key.clone(), value.clone());
            }
            Value::Object(map)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn replaces_only_top_level_keys() {
        let generated = json!({ "name": "Ava", "address": { "city": "Lisbon", "zip": "1000" } });
        let overrides = json!({ "address": { "city": "Porto" }, "vip": true });
        let merged = apply_overrides(generated, overrides.as_object().unwrap());
        assert_eq!(
            merged,
            json!({ "name": "Ava", "address": { "city": "Porto" }, "vip": true })
        );
    }

    #[test]
    fn scalars_pass_through() {
        let overrides = json!({ "a": 1 });
        assert_eq!(apply_overrides(json!(7), overrides.as_object().unwrap()), json!(7));
    }
}
