use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process;

use packgen_core::{load_pack, PackError, PackSource};
use serde::Serialize;

use crate::{Context, OutputFormat};

static PACK_SCHEMA_STR: &str = include_str!("../../../../schema/pack-schema.json");

#[derive(Debug, Serialize)]
struct FileReport {
    path: String,
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<String>,
}

pub(crate) fn cmd_validate(paths: &[PathBuf], schema: bool, ctx: &Context) {
    let files = expand(paths, ctx);
    let validator = schema.then(|| compile_schema(ctx));

    let mut reports = Vec::new();
    let mut seen: BTreeMap<String, String> = BTreeMap::new();
    for file in &files {
        let label = file.display().to_string();
        let mut errors = Vec::new();

        if let Some(validator) = &validator {
            errors.extend(schema_errors(validator, file));
        }

        let id = match load_pack(&PackSource::path(file)) {
            Ok(pack) => {
                if let Some(first) = seen.get(&pack.id) {
                    errors.push(format!("duplicate pack id '{}' (also in {})", pack.id, first));
                } else {
                    seen.insert(pack.id.clone(), label.clone());
                }
                Some(pack.id)
            }
            Err(PackError::Validation(v)) => {
                errors.extend(v.violations.iter().map(|v| v.to_string()));
                None
            }
            Err(e) => {
                errors.push(e.to_string());
                None
            }
        };

        reports.push(FileReport {
            path: label,
            valid: errors.is_empty(),
            id,
            errors,
        });
    }

    let all_valid = reports.iter().all(|r| r.valid);
    match ctx.output {
        OutputFormat::Json => {
            let json = serde_json::json!({ "valid": all_valid, "results": reports });
            let text = serde_json::to_string_pretty(&json).unwrap_or_default();
            if all_valid {
                println!("{}", text);
            } else {
                eprintln!("{}", text);
            }
        }
        OutputFormat::Text => {
            if !ctx.quiet {
                for r in &reports {
                    if r.valid {
                        println!("valid: {} ({})", r.path, r.id.as_deref().unwrap_or("?"));
                    } else {
                        eprintln!("invalid: {}", r.path);
                        for err in &r.errors {
                            eprintln!("  - {}", err);
                        }
                    }
                }
            }
        }
    }
    if !all_valid {
        process::exit(1);
    }
}

/// Files as given, directories expanded to their `*.json` entries in
/// name order.
fn expand(paths: &[PathBuf], ctx: &Context) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if !path.is_dir() {
            files.push(path.clone());
            continue;
        }
        let entries = match std::fs::read_dir(path) {
            Ok(entries) => entries,
            Err(e) => ctx.fail(&format!("error reading directory '{}': {}", path.display(), e)),
        };
        let mut found: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        found.sort();
        files.extend(found);
    }
    files
}

fn compile_schema(ctx: &Context) -> jsonschema::Validator {
    let schema: serde_json::Value = match serde_json::from_str(PACK_SCHEMA_STR) {
        Ok(s) => s,
        Err(e) => ctx.fail(&format!(
            "internal error: failed to parse embedded pack schema: {}",
            e
        )),
    };
    match jsonschema::validator_for(&schema) {
        Ok(v) => v,
        Err(e) => ctx.fail(&format!("internal error: failed to compile schema: {}", e)),
    }
}

fn schema_errors(validator: &jsonschema::Validator, file: &Path) -> Vec<String> {
    let doc: serde_json::Value = match std::fs::read_to_string(file)
        .map_err(|e| e.to_string())
        .and_then(|s| serde_json::from_str(&s).map_err(|e| e.to_string()))
    {
        Ok(doc) => doc,
        // The loader reports unreadable or malformed files.
        Err(_) => return Vec::new(),
    };
    validator
        .iter_errors(&doc)
        .map(|e| format!("schema: {}", e))
        .collect()
}
