//! `packgen.toml`: workspace configuration for the `packgen` binary.
//!
//! Every section is optional.
//!
//! ```toml
//! [packs]
//! dirs = ["packs"]
//!
//! [store]
//! state_file = ".packgen/state.json"
//! snapshot_dir = ".packgen/snapshots"
//!
//! [generate]
//! count = 10
//! locale = "en-US"
//! base_date = "2024-01-01"
//!
//! [log]
//! filter = "info"
//! ```

use std::path::{Path, PathBuf};

use packgen_store::StoreConfig;
use packgen_synth::GenerationDefaults;
use serde::{Deserialize, Serialize};

/// File looked up in the working directory when `--config` is absent.
pub(crate) const DEFAULT_CONFIG_FILE: &str = "packgen.toml";

// ── Types ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct PackgenConfig {
    pub packs: PacksSection,
    pub store: StoreSection,
    pub generate: GenerateSection,
    pub log: LogSection,
}

/// `[packs]`: directories scanned for `*.json` pack documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct PacksSection {
    pub dirs: Vec<PathBuf>,
}

impl Default for PacksSection {
    fn default() -> Self {
        PacksSection {
            dirs: vec![PathBuf::from("packs")],
        }
    }
}

/// `[store]`: where configuration state and exported snapshots live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct StoreSection {
    pub state_file: PathBuf,
    pub snapshot_dir: PathBuf,
}

impl Default for StoreSection {
    fn default() -> Self {
        StoreSection {
            state_file: PathBuf::from(".packgen/state.json"),
            snapshot_dir: PathBuf::from(".packgen/snapshots"),
        }
    }
}

/// `[generate]`: defaults for generation requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct GenerateSection {
    pub count: usize,
    pub locale: String,
    pub time_zone: Option<String>,
    pub base_date: Option<String>,
}

impl Default for GenerateSection {
    fn default() -> Self {
        let defaults = GenerationDefaults::default();
        GenerateSection {
            count: defaults.default_count,
            locale: defaults.locale,
            time_zone: None,
            base_date: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct LogSection {
    pub filter: Option<String>,
}

// ── Functions ─────────────────────────────────────────────────────────────────

impl PackgenConfig {
    /// Relative paths in the config resolve against the config file's
    /// directory.
    fn rebase(mut self, base: &Path) -> Self {
        let join = |p: &PathBuf| {
            if p.is_relative() {
                base.join(p)
            } else {
                p.clone()
            }
        };
        self.packs.dirs = self.packs.dirs.iter().map(join).collect();
        self.store.state_file = join(&self.store.state_file);
        self.store.snapshot_dir = join(&self.store.snapshot_dir);
        self
    }

    /// Defaults for the store's persisted `config` member.
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            locale: self.generate.locale.clone(),
            default_count: self.generate.count,
            time_zone: self.generate.time_zone.clone(),
            base_date: self.generate.base_date.clone(),
        }
    }
}

/// Read and parse a config file from `path`.
///
/// Returns a human-readable error string on failure.
pub(crate) fn read_config(path: &Path) -> Result<PackgenConfig, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("could not read '{}': {}", path.display(), e))?;
    let config: PackgenConfig = toml::from_str(&content)
        .map_err(|e| format!("could not parse '{}': {}", path.display(), e))?;
    let base = path.parent().unwrap_or_else(|| Path::new(""));
    Ok(config.rebase(base))
}

/// Load `explicit` if given, else `./packgen.toml` when it exists, else
/// defaults.
pub(crate) fn load_config(explicit: Option<&Path>) -> Result<PackgenConfig, String> {
    match explicit {
        Some(path) => read_config(path),
        None => {
            let path = Path::new(DEFAULT_CONFIG_FILE);
            if path.exists() {
                read_config(path)
            } else {
                Ok(PackgenConfig::default())
            }
        }
    }
}

/// Turn store configuration into synthesizer defaults.
pub(crate) fn generation_defaults(config: &StoreConfig) -> GenerationDefaults {
    GenerationDefaults {
        locale: config.locale.clone(),
        default_count: config.default_count,
        time_zone: config.time_zone.clone(),
        base_date: config.base_date.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config: PackgenConfig = toml::from_str("").unwrap();
        assert_eq!(config, PackgenConfig::default());
        assert_eq!(config.generate.count, 10);
        assert_eq!(config.packs.dirs, vec![PathBuf::from("packs")]);
    }

    #[test]
    fn partial_sections_fill_in_defaults() {
        let config: PackgenConfig = toml::from_str(
            r#"
            [generate]
            count = 3
            base_date = "2030-06-01"

            [log]
            filter = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.generate.count, 3);
        assert_eq!(config.generate.locale, "en-US");
        assert_eq!(config.generate.base_date.as_deref(), Some("2030-06-01"));
        assert_eq!(config.log.filter.as_deref(), Some("debug"));
        assert_eq!(config.store, StoreSection::default());
    }

    #[test]
    fn relative_paths_follow_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("packgen.toml");
        std::fs::write(
            &path,
            "[packs]\ndirs = [\"data/packs\"]\n[store]\nstate_file = \"/abs/state.json\"\n",
        )
        .unwrap();
        let config = read_config(&path).unwrap();
        assert_eq!(config.packs.dirs, vec![dir.path().join("data/packs")]);
        assert_eq!(config.store.state_file, PathBuf::from("/abs/state.json"));
        assert_eq!(config.store.snapshot_dir, dir.path().join(".packgen/snapshots"));
    }

    #[test]
    fn unknown_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("packgen.toml");
        std::fs::write(&path, "[generate]\ncount = \"many\"\n").unwrap();
        let err = read_config(&path).unwrap_err();
        assert!(err.contains("could not parse"));
    }
}
