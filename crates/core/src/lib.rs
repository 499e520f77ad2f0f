//! packgen-core: pack loading, validation, and registry.
//!
//! # Public API
//!
//! - [`load_pack()`], [`load_packs()`], [`load_dir()`] -- read and validate
//!   pack documents
//! - [`validate_pack()`] -- run every structural rule, collecting violations
//! - [`Registry`] -- namespaced lookup over registered packs
//! - [`PackError`] -- loader and lookup error type
//! - [`SourceProvider`] -- I/O abstraction used by the loader

pub mod error;
pub mod loader;
pub mod registry;
pub mod source;
pub mod validate;

// ── Convenience re-exports ───────────────────────────────────────────

pub use error::{PackError, ValidationError, Violation};
pub use loader::{
    load_dir, load_dir_with_provider, load_pack, load_pack_with_provider, load_packs,
    load_packs_with_provider, PackSource,
};
pub use registry::Registry;
pub use source::{FileSystemProvider, InMemoryProvider, SourceProvider};
pub use validate::{is_valid_pack_id, validate_pack};
