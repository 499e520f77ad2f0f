//! Source provider abstraction for filesystem-independent pack loading.
//!
//! The [`SourceProvider`] trait abstracts file I/O so packs can be loaded
//! from disk, from memory in tests, or from any other byte store.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Trait that abstracts file I/O for the loader.
pub trait SourceProvider {
    /// Read the document text at `path`.
    fn read_source(&self, path: &Path) -> Result<String, std::io::Error>;

    /// List pack documents (`*.json`) directly inside `dir`, sorted.
    fn list_packs(&self, dir: &Path) -> Result<Vec<PathBuf>, std::io::Error>;
}

/// Default filesystem-backed source provider.
pub struct FileSystemProvider;

impl SourceProvider for FileSystemProvider {
    fn read_source(&self, path: &Path) -> Result<String, std::io::Error> {
        std::fs::read_to_string(path)
    }

    fn list_packs(&self, dir: &Path) -> Result<Vec<PathBuf>, std::io::Error> {
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|e| e == "json") {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }
}

/// In-memory source provider for testing.
///
/// Maps paths to document text. Directory listing returns every stored
/// path whose parent is the requested directory.
#[derive(Default)]
pub struct InMemoryProvider {
    files: BTreeMap<PathBuf, String>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        self.files.insert(path.into(), text.into());
        self
    }
}

impl SourceProvider for InMemoryProvider {
    fn read_source(&self, path: &Path) -> Result<String, std::io::Error> {
        self.files.get(path).cloned().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("file not found in memory: {}", path.display()),
            )
        })
    }

    fn list_packs(&self, dir: &Path) -> Result<Vec<PathBuf>, std::io::Error> {
        Ok(self
            .files
            .keys()
            .filter(|p| p.parent() == Some(dir) && p.extension().is_some_and(|e| e == "json"))
            .cloned()
            .collect())
    }
}
