//! The schema synthesizer.
//!
//! Walks a [`SchemaDef`] with one seeded stream. Each object node draws a
//! single word from its stream and gives every property its own child
//! stream derived from that word and the property name, so values of one
//! property do not depend on which siblings exist. Array elements share
//! the array's stream in index order.

use std::collections::BTreeMap;

use packgen_interchange::{CompositionKind, Constraints, PrimitiveKind, SchemaDef};
use rand::{Rng, RngCore};
use serde_json::{Map, Number, Value};

use crate::context::GenerationContext;
use crate::dates::DateWindow;
use crate::error::SchemaError;
use crate::overrides::apply_overrides;
use crate::rng::{self, SeedRng, OPTIONAL_FIELD_PROBABILITY};
use crate::strings;

/// Maximum `$ref` expansions along one path.
pub const MAX_REF_DEPTH: usize = 8;

/// Array length bounds used when a schema sets neither.
pub const DEFAULT_ARRAY_ITEMS: (usize, usize) = (1, 5);

/// Numeric range used when a schema sets neither bound.
pub const DEFAULT_NUMBER_RANGE: (f64, f64) = (0.0, 1000.0);

/// Longest array one schema node may produce. A larger `maxItems` is
/// clamped; a larger `minItems` is a conflict.
pub const MAX_ARRAY_ITEMS: usize = 1_000;

/// Most records one `generate_many` call may produce.
pub const MAX_RECORDS: usize = 100_000;

/// Deterministic value generator over a set of named schema definitions.
#[derive(Debug, Clone, Default)]
pub struct Synthesizer<'a> {
    definitions: Option<&'a BTreeMap<String, SchemaDef>>,
    dates: DateWindow,
}

impl<'a> Synthesizer<'a> {
    /// A synthesizer without definitions. Any `$ref` is unresolvable.
    pub fn new() -> Self {
        Self::default()
    }

    /// A synthesizer resolving `$ref` against `definitions` (usually a
    /// pack's `schemas` map).
    pub fn with_definitions(definitions: &'a BTreeMap<String, SchemaDef>) -> Self {
        Synthesizer {
            definitions: Some(definitions),
            dates: DateWindow::default(),
        }
    }

    pub fn dates(mut self, dates: DateWindow) -> Self {
        self.dates = dates;
        self
    }

    /// Generate one value. The same `(schema, seed)` always yields the
    /// same value.
    pub fn generate(
        &self,
        schema: &SchemaDef,
        seed: u64,
        overrides: Option<&Map<String, Value>>,
    ) -> Result<Value, SchemaError> {
        let mut rng = rng::seeded(seed);
        let value = self.node(schema, &mut rng, "$", None, 0)?;
        Ok(match overrides {
            Some(o) => apply_overrides(value, o),
            None => value,
        })
    }

    /// Generate `n` values; element `i` uses seed `seed + i` (wrapping).
    pub fn generate_many(
        &self,
        n: usize,
        schema: &SchemaDef,
        seed: u64,
        overrides: Option<&Map<String, Value>>,
    ) -> Result<Vec<Value>, SchemaError> {
        if n > MAX_RECORDS {
            return Err(SchemaError::InvalidInput {
                field: "count",
                value: n.to_string(),
                message: format!("at most {} records per call", MAX_RECORDS),
            });
        }
        (0..n)
            .map(|i| self.generate(schema, seed.wrapping_add(i as u64), overrides))
            .collect()
    }

    /// Generate one value using the context's effective seed and date
    /// settings.
    pub fn generate_with_context(
        &self,
        schema: &SchemaDef,
        ctx: &GenerationContext,
    ) -> Result<Value, SchemaError> {
        let dates = ctx.date_window(self.dates)?;
        self.clone()
            .dates(dates)
            .generate(schema, ctx.effective_seed(), None)
    }

    // ── Tree walk ───────────────────────────────────────────────────

    fn node(
        &self,
        schema: &SchemaDef,
        rng: &mut SeedRng,
        path: &str,
        hint: Option<&str>,
        depth: usize,
    ) -> Result<Value, SchemaError> {
        match schema {
            SchemaDef::Reference(name) => {
                let target = self.follow(name, path, depth)?;
                self.node(target, rng, path, hint, depth + 1)
            }
            SchemaDef::Composition {
                kind: CompositionKind::AllOf,
                members,
            } => {
                let merged = self.merge_all(members, rng, path, depth)?;
                self.node(&merged, rng, path, hint, depth)
            }
            SchemaDef::Composition { members, .. } => {
                let member = pick_member(members, rng, path)?;
                self.node(member, rng, path, hint, depth)
            }
            SchemaDef::Object {
                properties,
                required,
            } => {
                let word = rng.next_u64();
                let mut out = Map::new();
                for (name, sub) in properties {
                    let mut child = rng::seeded(rng::derive_seed(word, name));
                    let field = child_path(path, name);
                    if required.contains(name) {
                        let value = self.node(sub, &mut child, &field, Some(name), depth)?;
                        out.insert(name.clone(), value);
                    } else if child.gen_bool(OPTIONAL_FIELD_PROBABILITY) {
                        match self.node(sub, &mut child, &field, Some(name), depth) {
                            Ok(value) => {
                                out.insert(name.clone(), value);
                            }
                            Err(SchemaError::RecursionLimit { .. }) => {}
                            Err(e) => return Err(e),
                        }
                    }
                }
                Ok(Value::Object(out))
            }
            SchemaDef::Array {
                items,
                min_items,
                max_items,
            } => {
                let (lo, hi) = array_bounds(*min_items, *max_items, path)?;
                let len = rng.gen_range(lo..=hi);
                let mut out = Vec::with_capacity(len);
                for i in 0..len {
                    let element = format!("{}[{}]", path, i);
                    match self.node(items, rng, &element, None, depth) {
                        Ok(value) => out.push(value),
                        Err(SchemaError::RecursionLimit { .. }) if lo == 0 => {
                            return Ok(Value::Array(Vec::new()))
                        }
                        Err(e) => return Err(e),
                    }
                }
                Ok(Value::Array(out))
            }
            SchemaDef::Primitive { kind, constraints } => {
                self.primitive(*kind, constraints, rng, path, hint)
            }
        }
    }

    fn follow(&self, name: &str, path: &str, depth: usize) -> Result<&'a SchemaDef, SchemaError> {
        let target = self
            .definitions
            .and_then(|defs| defs.get(name))
            .ok_or_else(|| SchemaError::UnresolvedRef {
                reference: name.to_string(),
                path: path.to_string(),
            })?;
        if depth >= MAX_REF_DEPTH {
            return Err(SchemaError::RecursionLimit {
                reference: name.to_string(),
                path: path.to_string(),
                limit: MAX_REF_DEPTH,
            });
        }
        Ok(target)
    }

    fn primitive(
        &self,
        kind: PrimitiveKind,
        c: &Constraints,
        rng: &mut SeedRng,
        path: &str,
        hint: Option<&str>,
    ) -> Result<Value, SchemaError> {
        if let Some(values) = &c.enum_values {
            if values.is_empty() {
                return Err(SchemaError::conflict(path, "enum lists no values"));
            }
            return Ok(values[rng.gen_range(0..values.len())].clone());
        }
        match kind {
            PrimitiveKind::String => {
                strings::synthesize(c, hint, rng, &self.dates, path).map(Value::String)
            }
            PrimitiveKind::Integer => {
                let (lo, hi) = numeric_bounds(c);
                let (lo, hi) = (lo.ceil(), hi.floor());
                if lo > hi {
                    return Err(bounds_conflict(path, c));
                }
                Ok(Value::from(rng.gen_range(lo as i64..=hi as i64)))
            }
            PrimitiveKind::Number => {
                let (lo, hi) = numeric_bounds(c);
                if lo > hi {
                    return Err(bounds_conflict(path, c));
                }
                if !(hi - lo).is_finite() {
                    return Err(SchemaError::conflict(
                        path,
                        format!("range from {} to {} is too wide to sample", lo, hi),
                    ));
                }
                let raw = if lo == hi { lo } else { rng.gen_range(lo..=hi) };
                let rounded = ((raw * 100.0).round() / 100.0).clamp(lo, hi);
                Ok(Number::from_f64(rounded).map_or(Value::Null, Value::Number))
            }
            PrimitiveKind::Boolean => Ok(Value::Bool(rng.gen_bool(0.5))),
            PrimitiveKind::Null => Ok(Value::Null),
        }
    }

    // ── allOf merging ───────────────────────────────────────────────

    fn merge_all(
        &self,
        members: &[SchemaDef],
        rng: &mut SeedRng,
        path: &str,
        depth: usize,
    ) -> Result<SchemaDef, SchemaError> {
        let mut merged: Option<SchemaDef> = None;
        for member in members {
            let flat = self.flatten(member, rng, path, depth)?;
            merged = Some(match merged {
                None => flat,
                Some(acc) => merge(acc, flat, path)?,
            });
        }
        merged.ok_or_else(|| SchemaError::conflict(path, "allOf lists no schemas"))
    }

    /// Resolve references and compositions until a concrete node remains.
    fn flatten(
        &self,
        schema: &SchemaDef,
        rng: &mut SeedRng,
        path: &str,
        depth: usize,
    ) -> Result<SchemaDef, SchemaError> {
        match schema {
            SchemaDef::Reference(name) => {
                let target = self.follow(name, path, depth)?;
                self.flatten(target, rng, path, depth + 1)
            }
            SchemaDef::Composition {
                kind: CompositionKind::AllOf,
                members,
            } => self.merge_all(members, rng, path, depth),
            SchemaDef::Composition { members, .. } => {
                let member = pick_member(members, rng, path)?;
                self.flatten(member, rng, path, depth)
            }
            other => Ok(other.clone()),
        }
    }
}

fn merge(a: SchemaDef, b: SchemaDef, path: &str) -> Result<SchemaDef, SchemaError> {
    match (a, b) {
        (
            SchemaDef::Object {
                mut properties,
                mut required,
            },
            SchemaDef::Object {
                properties: more,
                required: more_required,
            },
        ) => {
            properties.extend(more);
            required.extend(more_required);
            Ok(SchemaDef::Object {
                properties,
                required,
            })
        }
        (
            SchemaDef::Array {
                min_items: min_a,
                max_items: max_a,
                ..
            },
            SchemaDef::Array {
                items,
                min_items: min_b,
                max_items: max_b,
            },
        ) => Ok(SchemaDef::Array {
            items,
            min_items: tighter(min_a, min_b, usize::max),
            max_items: tighter(max_a, max_b, usize::min),
        }),
        (
            SchemaDef::Primitive {
                kind: kind_a,
                constraints: ca,
            },
            SchemaDef::Primitive {
                kind: kind_b,
                constraints: cb,
            },
        ) => {
            let kind = match (kind_a, kind_b) {
                (a, b) if a == b => a,
                (PrimitiveKind::Integer, PrimitiveKind::Number)
                | (PrimitiveKind::Number, PrimitiveKind::Integer) => PrimitiveKind::Integer,
                (a, b) => {
                    return Err(SchemaError::conflict(
                        path,
                        format!("allOf combines {:?} with {:?}", a, b),
                    ))
                }
            };
            Ok(SchemaDef::Primitive {
                kind,
                constraints: merge_constraints(ca, cb, path)?,
            })
        }
        _ => Err(SchemaError::conflict(
            path,
            "allOf combines schemas of different types",
        )),
    }
}

fn merge_constraints(a: Constraints, b: Constraints, path: &str) -> Result<Constraints, SchemaError> {
    let enum_values = match (a.enum_values, b.enum_values) {
        (Some(x), Some(y)) => {
            let common: Vec<Value> = x.into_iter().filter(|v| y.contains(v)).collect();
            if common.is_empty() {
                return Err(SchemaError::conflict(path, "allOf enums share no value"));
            }
            Some(common)
        }
        (x, y) => y.or(x),
    };
    Ok(Constraints {
        minimum: tighter(a.minimum, b.minimum, f64::max),
        maximum: tighter(a.maximum, b.maximum, f64::min),
        min_length: tighter(a.min_length, b.min_length, usize::max),
        max_length: tighter(a.max_length, b.max_length, usize::min),
        format: b.format.or(a.format),
        pattern: b.pattern.or(a.pattern),
        enum_values,
    })
}

fn tighter<T>(a: Option<T>, b: Option<T>, pick: fn(T, T) -> T) -> Option<T> {
    match (a, b) {
        (Some(x), Some(y)) => Some(pick(x, y)),
        (x, y) => x.or(y),
    }
}

fn pick_member<'s>(
    members: &'s [SchemaDef],
    rng: &mut SeedRng,
    path: &str,
) -> Result<&'s SchemaDef, SchemaError> {
    if members.is_empty() {
        return Err(SchemaError::conflict(path, "composition lists no schemas"));
    }
    Ok(&members[rng.gen_range(0..members.len())])
}

fn array_bounds(
    min: Option<usize>,
    max: Option<usize>,
    path: &str,
) -> Result<(usize, usize), SchemaError> {
    let (default_lo, default_hi) = DEFAULT_ARRAY_ITEMS;
    if let Some(lo) = min.filter(|&lo| lo > MAX_ARRAY_ITEMS) {
        return Err(SchemaError::conflict(
            path,
            format!("minItems ({}) exceeds the limit of {}", lo, MAX_ARRAY_ITEMS),
        ));
    }
    let (lo, hi) = match (min, max) {
        (Some(lo), Some(hi)) if lo > hi => {
            return Err(SchemaError::conflict(
                path,
                format!("minItems ({}) exceeds maxItems ({})", lo, hi),
            ))
        }
        (Some(lo), Some(hi)) => (lo, hi),
        (Some(lo), None) => (lo, lo.max(default_hi)),
        (None, Some(hi)) => (default_lo.min(hi), hi),
        (None, None) => DEFAULT_ARRAY_ITEMS,
    };
    Ok((lo, hi.min(MAX_ARRAY_ITEMS)))
}

fn numeric_bounds(c: &Constraints) -> (f64, f64) {
    let (default_lo, default_hi) = DEFAULT_NUMBER_RANGE;
    let span = default_hi - default_lo;
    match (c.minimum, c.maximum) {
        (Some(lo), Some(hi)) => (lo, hi),
        (Some(lo), None) if lo <= default_hi => (lo, default_hi),
        (Some(lo), None) => (lo, lo + span),
        (None, Some(hi)) if hi >= default_lo => (default_lo, hi),
        (None, Some(hi)) => (hi - span, hi),
        (None, None) => DEFAULT_NUMBER_RANGE,
    }
}

fn bounds_conflict(path: &str, c: &Constraints) -> SchemaError {
    SchemaError::conflict(
        path,
        format!(
            "no value between minimum ({}) and maximum ({})",
            c.minimum.map_or("none".to_string(), |v| v.to_string()),
            c.maximum.map_or("none".to_string(), |v| v.to_string())
        ),
    )
}

fn child_path(path: &str, name: &str) -> String {
    if path == "$" {
        name.to_string()
    } else {
        format!("{}.{}", path, name)
    }
}
