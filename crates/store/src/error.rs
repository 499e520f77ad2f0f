/// All errors that can be returned by the configuration store and its
/// persistence ports. A failed transition never mutates state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A snapshot or category id is unknown.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// A snapshot with this id already exists.
    #[error("snapshot already exists: {id}")]
    DuplicateSnapshot { id: String },

    /// A snapshot document could not be read.
    #[error("invalid snapshot document: {0}")]
    InvalidDocument(String),

    /// A persistence backend failed (I/O, serialization, etc.).
    #[error("persistence error: {0}")]
    Persistence(String),
}

impl StoreError {
    pub(crate) fn not_found(kind: &'static str, id: &str) -> Self {
        StoreError::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}
