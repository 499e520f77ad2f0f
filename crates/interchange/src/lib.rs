//! packgen-interchange: Shared pack document types and deserialization.
//!
//! Provides typed structs for every part of a data pack (schemas,
//! scenarios, personas, routes), the `DescriptionAnalysis` produced by the
//! external business-description analyzer, the catalog projections the
//! matcher consumes, and a single `from_pack()` entry point that
//! deserializes a `serde_json::Value` document into a `DataPack`.
//!
//! Structural validation with full violation reporting lives in
//! packgen-core; this crate only turns an already-valid document into
//! typed values and fails on the first problem it meets.

pub mod analysis;
pub mod catalog;
pub mod deserialize;
pub mod schema;
pub mod types;

pub use analysis::{BusinessContext, DescriptionAnalysis};
pub use catalog::{CatalogEntry, ScenarioInfo, ScenarioSelection};
pub use deserialize::{from_pack, InterchangeError};
pub use schema::{ref_target, CompositionKind, Constraints, PrimitiveKind, SchemaDef};
pub use types::*;
