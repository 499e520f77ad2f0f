//! packgen-synth: deterministic, schema-driven record synthesis.
//!
//! Accepts a parsed [`SchemaDef`] and a numeric seed and produces a
//! `serde_json::Value`. Fixed `(schema, seed)` pairs produce identical
//! values across calls and process restarts. Every call owns its own
//! seeded stream, so concurrent calls never share state.
//!
//! Beyond single values the crate renders records for a persona
//! ([`redact`], [`render_for_persona`]), runs [`GenerationRequest`]s,
//! and generates whole scenarios at a given stage ([`generate_scenario`]).

pub mod context;
pub mod dates;
pub mod error;
pub mod generate;
pub mod overrides;
pub mod pattern;
pub mod redact;
pub mod rng;
mod strings;

use packgen_interchange::SchemaDef;
use serde_json::{Map, Value};

pub use context::{generate_scenario, GenerationContext, GenerationDefaults, GenerationRequest};
pub use dates::DateWindow;
pub use error::SchemaError;
pub use generate::{Synthesizer, MAX_ARRAY_ITEMS, MAX_RECORDS, MAX_REF_DEPTH};
pub use overrides::apply_overrides;
pub use redact::{redact, render_for_persona};
pub use rng::derive_seed;

/// Generate one value from a self-contained schema (no `$ref`).
pub fn generate(
    schema: &SchemaDef,
    seed: u64,
    overrides: Option<&Map<String, Value>>,
) -> Result<Value, SchemaError> {
    Synthesizer::new().generate(schema, seed, overrides)
}

/// Generate `n` values from a self-contained schema; element `i` uses
/// seed `seed + i`.
pub fn generate_many(
    n: usize,
    schema: &SchemaDef,
    seed: u64,
    overrides: Option<&Map<String, Value>>,
) -> Result<Vec<Value>, SchemaError> {
    Synthesizer::new().generate_many(n, schema, seed, overrides)
}
