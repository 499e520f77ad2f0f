//! Generation contexts, requests, and whole-scenario generation.

use std::collections::BTreeMap;

use packgen_interchange::{DataPack, Scenario, Stage};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::dates::{self, DateWindow};
use crate::error::SchemaError;
use crate::generate::Synthesizer;
use crate::rng::derive_seed;

/// Per-call generation parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationContext {
    pub seed: u64,
    /// Stable record id. When present, the same id always yields the same
    /// data regardless of call order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    /// `UTC`, `Z`, or a fixed `±HH:MM` offset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
    /// `YYYY-MM-DD` start of the date window.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_date: Option<String>,
}

impl GenerationContext {
    pub fn new(seed: u64) -> Self {
        GenerationContext {
            seed,
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_time_zone(mut self, tz: impl Into<String>) -> Self {
        self.time_zone = Some(tz.into());
        self
    }

    pub fn with_base_date(mut self, date: impl Into<String>) -> Self {
        self.base_date = Some(date.into());
        self
    }

    /// The seed actually used: `seed`, or a derivation of `(seed, id)`.
    pub fn effective_seed(&self) -> u64 {
        match &self.id {
            Some(id) => derive_seed(self.seed, id),
            None => self.seed,
        }
    }

    /// Apply this context's base date and time zone on top of `fallback`.
    pub fn date_window(&self, fallback: DateWindow) -> Result<DateWindow, SchemaError> {
        let mut window = match &self.base_date {
            Some(d) => DateWindow::starting(dates::parse_date(d, "baseDate")?),
            None => fallback,
        };
        if let Some(tz) = &self.time_zone {
            match dates::parse_time_zone(tz) {
                Some(offset) => window = window.with_offset(offset),
                None => tracing::debug!(time_zone = %tz, "named time zone not resolved, using UTC"),
            }
        }
        Ok(window)
    }
}

/// Store-level defaults applied when a scenario or request is silent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationDefaults {
    pub locale: String,
    pub default_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_date: Option<String>,
}

impl Default for GenerationDefaults {
    fn default() -> Self {
        GenerationDefaults {
            locale: "en-US".to_string(),
            default_count: 10,
            time_zone: None,
            base_date: None,
        }
    }
}

// ── Requests ────────────────────────────────────────────────────────

/// A request for records from one pack: either one schema or every
/// schema of the pack (its category).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    /// Pack id. Generates every schema of that pack.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub seed: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overrides: Option<Map<String, Value>>,
}

impl GenerationRequest {
    /// Run the request against `pack`.
    ///
    /// A schema request returns an array of records. A category request
    /// returns an object mapping each schema name to its records, each
    /// schema seeded from the request seed and its name.
    pub fn execute(
        &self,
        pack: &DataPack,
        defaults: &GenerationDefaults,
    ) -> Result<Value, SchemaError> {
        let ctx = GenerationContext {
            seed: self.seed,
            id: self.id.clone(),
            locale: Some(defaults.locale.clone()),
            time_zone: defaults.time_zone.clone(),
            base_date: defaults.base_date.clone(),
        };
        let synth = Synthesizer::with_definitions(&pack.schemas)
            .dates(ctx.date_window(DateWindow::default())?);
        let count = self.count.unwrap_or(defaults.default_count);
        let seed = ctx.effective_seed();
        let overrides = self.overrides.as_ref();

        match (&self.schema, &self.category) {
            (Some(name), _) => {
                let schema = pack.schema(name).ok_or_else(|| SchemaError::UnknownSchema {
                    pack: pack.id.clone(),
                    name: name.clone(),
                })?;
                let records = synth.generate_many(count, schema, seed, overrides)?;
                Ok(Value::Array(records))
            }
            (None, Some(category)) if category == &pack.id => {
                let mut out = Map::new();
                for (name, schema) in &pack.schemas {
                    let records =
                        synth.generate_many(count, schema, derive_seed(seed, name), overrides)?;
                    out.insert(name.clone(), Value::Array(records));
                }
                Ok(Value::Object(out))
            }
            (None, Some(category)) => Err(SchemaError::InvalidInput {
                field: "category",
                value: category.clone(),
                message: format!("request was routed to pack '{}'", pack.id),
            }),
            (None, None) => Err(SchemaError::InvalidInput {
                field: "request",
                value: String::new(),
                message: "names neither a schema nor a category".to_string(),
            }),
        }
    }
}

// ── Scenarios ───────────────────────────────────────────────────────

/// Generate every entity of a scenario at the given stage.
///
/// Counts come from the scenario `volume` (or `defaults.default_count` for
/// every schema when the scenario declares none), multiplied by the stage.
/// The base seed is the scenario seed, else `generation_id`; each entity
/// draws from a seed derived from the base and its name.
pub fn generate_scenario(
    pack: &DataPack,
    scenario: &Scenario,
    stage: Stage,
    generation_id: u64,
    defaults: &GenerationDefaults,
) -> Result<BTreeMap<String, Vec<Value>>, SchemaError> {
    let base_seed = scenario.config.seed.unwrap_or(generation_id);
    let window = scenario_window(scenario, defaults)?;
    let synth = Synthesizer::with_definitions(&pack.schemas).dates(window);

    let volumes: BTreeMap<String, usize> = if scenario.config.volume.is_empty() {
        pack.schemas
            .keys()
            .map(|name| (name.clone(), defaults.default_count))
            .collect()
    } else {
        scenario.config.volume.clone()
    };

    let mut out = BTreeMap::new();
    for (entity, base_count) in volumes {
        let schema = pack.schema(&entity).ok_or_else(|| SchemaError::UnknownSchema {
            pack: pack.id.clone(),
            name: entity.clone(),
        })?;
        let count = base_count.saturating_mul(stage.volume_multiplier());
        let records = synth.generate_many(count, schema, derive_seed(base_seed, &entity), None)?;
        tracing::debug!(
            pack = %pack.id,
            scenario = %scenario.id,
            entity = %entity,
            count,
            "generated scenario entity"
        );
        out.insert(entity, records);
    }
    Ok(out)
}

fn scenario_window(
    scenario: &Scenario,
    defaults: &GenerationDefaults,
) -> Result<DateWindow, SchemaError> {
    let window = match (&scenario.config.date_range, &defaults.base_date) {
        (Some(range), _) => DateWindow::between(
            dates::parse_date(&range.start, "dateRange")?,
            dates::parse_date(&range.end, "dateRange")?,
        )?,
        (None, Some(base)) => DateWindow::starting(dates::parse_date(base, "baseDate")?),
        (None, None) => DateWindow::default(),
    };
    let ctx = GenerationContext {
        time_zone: defaults.time_zone.clone(),
        ..GenerationContext::default()
    };
    ctx.date_window(window)
}
