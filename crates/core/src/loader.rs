//! Pack loading: read, validate, deserialize, and batch duplicate checks.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use packgen_interchange::{from_pack, DataPack};

use crate::error::{PackError, ValidationError, Violation};
use crate::source::{FileSystemProvider, SourceProvider};
use crate::validate::validate_pack;

/// Where a pack document comes from.
#[derive(Debug, Clone)]
pub enum PackSource {
    /// A JSON file read through a [`SourceProvider`].
    Path(PathBuf),
    /// Document text already in memory. `label` names it in errors.
    Text { label: String, text: String },
    /// An already-parsed JSON document.
    Value {
        label: String,
        value: serde_json::Value,
    },
}

impl PackSource {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        PackSource::Path(path.into())
    }

    pub fn text(label: impl Into<String>, text: impl Into<String>) -> Self {
        PackSource::Text {
            label: label.into(),
            text: text.into(),
        }
    }

    pub fn value(label: impl Into<String>, value: serde_json::Value) -> Self {
        PackSource::Value {
            label: label.into(),
            value,
        }
    }

    /// Human-readable origin used in error messages.
    pub fn label(&self) -> String {
        match self {
            PackSource::Path(p) => p.display().to_string(),
            PackSource::Text { label, .. } | PackSource::Value { label, .. } => label.clone(),
        }
    }
}

/// Load and validate a single pack from the filesystem or memory.
pub fn load_pack(source: &PackSource) -> Result<DataPack, PackError> {
    load_pack_with_provider(source, &FileSystemProvider)
}

/// Load and validate a single pack, reading paths through `provider`.
pub fn load_pack_with_provider(
    source: &PackSource,
    provider: &dyn SourceProvider,
) -> Result<DataPack, PackError> {
    let origin = source.label();
    let doc = match source {
        PackSource::Path(path) => {
            let text = provider.read_source(path).map_err(|e| PackError::Load {
                origin: origin.clone(),
                message: e.to_string(),
            })?;
            parse_json(&text, &origin)?
        }
        PackSource::Text { text, .. } => parse_json(text, &origin)?,
        PackSource::Value { value, .. } => value.clone(),
    };

    validate_pack(&doc, &origin)?;

    // Validation covers every shape from_pack relies on; anything it
    // still rejects is reported the same way.
    from_pack(&doc).map_err(|e| {
        let pack = doc
            .get("id")
            .and_then(|v| v.as_str())
            .unwrap_or(&origin)
            .to_string();
        PackError::Validation(ValidationError {
            pack,
            violations: vec![Violation::new("#", e.to_string())],
        })
    })
}

/// Load a batch of packs. Fails as a whole if any pack fails or if two
/// packs share an id.
pub fn load_packs(sources: &[PackSource]) -> Result<Vec<DataPack>, PackError> {
    load_packs_with_provider(sources, &FileSystemProvider)
}

pub fn load_packs_with_provider(
    sources: &[PackSource],
    provider: &dyn SourceProvider,
) -> Result<Vec<DataPack>, PackError> {
    let packs = sources
        .iter()
        .map(|s| load_pack_with_provider(s, provider))
        .collect::<Result<Vec<_>, _>>()?;
    check_batch_duplicates(&packs)?;
    tracing::info!(count = packs.len(), "loaded pack batch");
    Ok(packs)
}

/// Load every `*.json` pack directly inside `dir` as one batch.
pub fn load_dir(dir: &Path) -> Result<Vec<DataPack>, PackError> {
    load_dir_with_provider(dir, &FileSystemProvider)
}

pub fn load_dir_with_provider(
    dir: &Path,
    provider: &dyn SourceProvider,
) -> Result<Vec<DataPack>, PackError> {
    let paths = provider.list_packs(dir).map_err(|e| PackError::Load {
        origin: dir.display().to_string(),
        message: e.to_string(),
    })?;
    let sources: Vec<PackSource> = paths.into_iter().map(PackSource::Path).collect();
    load_packs_with_provider(&sources, provider)
}

pub(crate) fn check_batch_duplicates(packs: &[DataPack]) -> Result<(), PackError> {
    let mut seen: BTreeMap<&str, usize> = BTreeMap::new();
    for (i, pack) in packs.iter().enumerate() {
        if seen.insert(pack.id.as_str(), i).is_some() {
            return Err(PackError::DuplicateId {
                id: pack.id.clone(),
            });
        }
    }
    Ok(())
}

fn parse_json(text: &str, origin: &str) -> Result<serde_json::Value, PackError> {
    serde_json::from_str(text).map_err(|e| {
        PackError::Validation(ValidationError {
            pack: origin.to_string(),
            violations: vec![Violation::new("#", format!("invalid JSON: {}", e))],
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::InMemoryProvider;
    use serde_json::json;

    fn pack_json(id: &str) -> serde_json::Value {
        json!({
            "id": id,
            "name": format!("Pack {}", id),
            "version": "1.0.0",
            "schemas": {
                "item": { "type": "object", "properties": { "sku": { "type": "string" } } }
            }
        })
    }

    #[test]
    fn loads_inline_value() {
        let pack = load_pack(&PackSource::value("inline", pack_json("shop"))).unwrap();
        assert_eq!(pack.id, "shop");
        assert!(pack.schema("item").is_some());
    }

    #[test]
    fn missing_file_is_load_error() {
        let provider = InMemoryProvider::new();
        let err = load_pack_with_provider(&PackSource::path("packs/none.json"), &provider)
            .unwrap_err();
        match err {
            PackError::Load { origin, .. } => assert_eq!(origin, "packs/none.json"),
            other => panic!("expected LoadError, got {:?}", other),
        }
    }

    #[test]
    fn malformed_json_is_validation_error() {
        let err = load_pack(&PackSource::text("broken.json", "{ not json")).unwrap_err();
        match err {
            PackError::Validation(v) => {
                assert_eq!(v.pack, "broken.json");
                assert!(v.violations[0].message.starts_with("invalid JSON"));
            }
            other => panic!("expected ValidationError, got {:?}", other),
        }
    }

    #[test]
    fn duplicate_ids_fail_the_batch() {
        let sources = vec![
            PackSource::value("a", pack_json("core")),
            PackSource::value("b", pack_json("core")),
        ];
        let err = load_packs(&sources).unwrap_err();
        assert_eq!(
            err,
            PackError::DuplicateId {
                id: "core".to_string()
            }
        );
    }

    #[test]
    fn load_dir_reads_sorted_json_files() {
        let provider = InMemoryProvider::new()
            .with_file("packs/b.json", pack_json("beta").to_string())
            .with_file("packs/a.json", pack_json("alpha").to_string());
        let packs = load_dir_with_provider(Path::new("packs"), &provider).unwrap();
        let ids: Vec<&str> = packs.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["alpha", "beta"]);
    }
}
