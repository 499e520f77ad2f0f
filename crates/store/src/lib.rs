//! packgen-store: the configuration state machine.
//!
//! [`ConfigurationState`] plus the pure [`reduce`] function define every
//! transition. [`Store`] wraps them with subscriptions, snapshot id
//! allocation, and optional persistence through a [`PersistencePort`].

pub mod conformance;
pub mod document;
pub mod error;
pub mod persist;
pub mod state;
pub mod store;

pub use document::{SnapshotDocument, SNAPSHOT_FORMAT, SNAPSHOT_VERSION};
pub use error::StoreError;
pub use persist::{FilePort, MemoryPort, PersistencePort, STORAGE_KEY};
pub use state::{
    reduce, ConfigurationState, PersistedConfig, ScenarioSelection, Snapshot, SnapshotState,
    StoreConfig, Transition, DEFAULT_GENERATION_ID, GENERATION_ID_RANGE,
};
pub use store::{Store, SubscriptionId};
