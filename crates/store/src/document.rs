//! Self-contained snapshot export documents.

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::state::Snapshot;

/// Value of the `format` field in every exported document.
pub const SNAPSHOT_FORMAT: &str = "packgen-snapshot";

/// Document version this crate writes and accepts.
pub const SNAPSHOT_VERSION: u32 = 1;

/// `{format, version, snapshot}` wrapper around one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotDocument {
    pub format: String,
    pub version: u32,
    pub snapshot: Snapshot,
}

impl SnapshotDocument {
    pub fn new(snapshot: Snapshot) -> Self {
        SnapshotDocument {
            format: SNAPSHOT_FORMAT.to_string(),
            version: SNAPSHOT_VERSION,
            snapshot,
        }
    }

    pub fn to_json(&self) -> Result<String, StoreError> {
        serde_json::to_string_pretty(self).map_err(|e| StoreError::InvalidDocument(e.to_string()))
    }

    /// Parse a document, rejecting foreign formats and other versions.
    pub fn from_json(text: &str) -> Result<Self, StoreError> {
        let doc: SnapshotDocument =
            serde_json::from_str(text).map_err(|e| StoreError::InvalidDocument(e.to_string()))?;
        if doc.format != SNAPSHOT_FORMAT {
            return Err(StoreError::InvalidDocument(format!(
                "unexpected format '{}', expected '{}'",
                doc.format, SNAPSHOT_FORMAT
            )));
        }
        if doc.version != SNAPSHOT_VERSION {
            return Err(StoreError::InvalidDocument(format!(
                "unsupported version {}",
                doc.version
            )));
        }
        Ok(doc)
    }
}
