//! Persona-specific rendering of generated records.
//!
//! Field paths are dotted (`owner.email`). Arrays met along a path are
//! walked element-wise, so `lines.product.sku` reaches every line item.

use packgen_interchange::Persona;
use serde_json::Value;

use crate::overrides::apply_overrides;

/// Replacement for masked values that are not strings.
pub const MASK: &str = "***";

/// Characters a masked string keeps visible at its end.
pub const VISIBLE_SUFFIX: usize = 4;

#[derive(Clone, Copy)]
enum Action {
    Hide,
    Mask,
}

/// Remove the persona's hidden fields and mask its masked fields.
pub fn redact(record: &Value, persona: &Persona) -> Value {
    let mut out = record.clone();
    for path in &persona.hidden_fields {
        apply(&mut out, &segments(path), Action::Hide);
    }
    for path in &persona.masked_fields {
        apply(&mut out, &segments(path), Action::Mask);
    }
    out
}

/// Apply the persona's overrides, then redact.
pub fn render_for_persona(record: &Value, persona: &Persona) -> Value {
    let overridden = match (&persona.overrides, record) {
        (Some(overrides), Value::Array(items)) => Value::Array(
            items
                .iter()
                .map(|item| apply_overrides(item.clone(), overrides))
                .collect(),
        ),
        (Some(overrides), _) => apply_overrides(record.clone(), overrides),
        (None, _) => record.clone(),
    };
    redact(&overridden, persona)
}

fn segments(path: &str) -> Vec<&str> {
    path.split('.').filter(|s| !s.is_empty()).collect()
}

fn apply(value: &mut Value, path: &[&str], action: Action) {
    match value {
        Value::Array(items) => {
            for item in items {
                apply(item, path, action);
            }
        }
        Value::Object(map) => {
            let Some((head, rest)) = path.split_first() else {
                return;
            };
            if rest.is_empty() {
                match action {
                    Action::Hide => {
                        map.remove(*head);
                    }
                    Action::Mask => {
                        if let Some(v) = map.get_mut(*head) {
                            *v = mask_value(v);
                        }
                    }
                }
            } else if let Some(child) = map.get_mut(*head) {
                apply(child, rest, action);
            }
        }
        _ => {}
    }
}

fn mask_value(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(mask_string(s)),
        Value::Array(items) => Value::Array(items.iter().map(mask_value).collect()),
        Value::Null => Value::Null,
        _ => Value::String(MASK.to_string()),
    }
}

/// Replace all but the last four characters with `*`. Strings of four
/// characters or fewer are masked entirely.
pub fn mask_string(s: &str) -> String {
    let len = s.chars().count();
    if len <= VISIBLE_SUFFIX {
        return "*".repeat(len);
    }
    let hidden = len - VISIBLE_SUFFIX;
    let mut out = "*".repeat(hidden);
    out.extend(s.chars().skip(hidden));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn persona(masked: &[&str], hidden: &[&str]) -> Persona {
        Persona {
            id: "viewer".to_string(),
            name: "Viewer".to_string(),
            masked_fields: masked.iter().map(|s| s.to_string()).collect(),
            hidden_fields: hidden.iter().map(|s| s.to_string()).collect(),
            ..Persona::default()
        }
    }

    #[test]
    fn masks_strings_keeping_suffix() {
        assert_eq!(mask_string("4111111111111111"), "************1111");
        assert_eq!(mask_string("abcd"), "****");
        assert_eq!(mask_string(""), "");
    }

    #[test]
    fn hides_and_masks_nested_paths() {
        let record = json!({
            "email": "ava.patel@example.com",
            "salary": 92000,
            "owner": { "email": "x@example.com", "name": "Kim" },
            "lines": [ { "card": "1234567890" }, { "card": "0987654321" } ]
        });
        let p = persona(&["email", "salary", "lines.card"], &["owner.email"]);
        let out = redact(&record, &p);
        assert_eq!(out["email"], "*****************.com");
        assert_eq!(out["salary"], MASK);
        assert_eq!(out["owner"], json!({ "name": "Kim" }));
        assert_eq!(out["lines"][0]["card"], "******7890");
        assert_eq!(out["lines"][1]["card"], "******4321");
    }

    #[test]
    fn redact_is_pure() {
        let record = json!({ "email": "ava@example.com" });
        let p = persona(&["email"], &[]);
        let _ = redact(&record, &p);
        assert_eq!(record["email"], "ava@example.com");
    }

    #[test]
    fn missing_paths_are_ignored() {
        let record = json!({ "name": "Ava" });
        let p = persona(&["nope.deeper"], &["also.missing"]);
        assert_eq!(redact(&record, &p), record);
    }

    #[test]
    fn overrides_apply_before_redaction() {
        let mut p = persona(&["role"], &[]);
        p.overrides = json!({ "role": "guest-user" }).as_object().cloned();
        let out = render_for_persona(&json!([{ "role": "admin" }, { "role": "owner" }]), &p);
        assert_eq!(out, json!([{ "role": "******user" }, { "role": "******user" }]));
    }
}
