use clap::Args;
use packgen_interchange::{qualified_name, Persona, Stage};
use packgen_synth::{apply_overrides, generate_scenario, render_for_persona, GenerationRequest};
use serde_json::{Map, Value};

use crate::commands::snapshot;
use crate::config::generation_defaults;
use crate::Context;

#[derive(Debug, Args)]
pub(crate) struct GenerateArgs {
    /// Pack id (default: the active category)
    #[arg(long)]
    pub pack: Option<String>,
    /// Schema to generate; without it every schema of the pack is generated
    #[arg(long, conflicts_with = "scenario")]
    pub schema: Option<String>,
    /// Scenario name (local to the pack, or "<pack>:<scenario>")
    #[arg(long)]
    pub scenario: Option<String>,
    /// Seed (default: the current generation id)
    #[arg(long)]
    pub seed: Option<u64>,
    /// Record id; derives a per-record seed from the seed and this id
    #[arg(long)]
    pub id: Option<String>,
    /// Records per schema (default: from config)
    #[arg(long)]
    pub count: Option<usize>,
    /// Stage for scenario volumes (default: the active stage)
    #[arg(long)]
    pub stage: Option<Stage>,
    /// Render the output for this persona (masking and hiding fields)
    #[arg(long)]
    pub persona: Option<String>,
    /// JSON object merged over every generated record
    #[arg(long)]
    pub overrides: Option<String>,
    /// Record the output and save it in a snapshot with this name
    #[arg(long)]
    pub snapshot: Option<String>,
}

pub(crate) fn cmd_generate(args: &GenerateArgs, ctx: &Context) {
    let registry = ctx.registry();
    let mut store = ctx.store(&registry);
    let state = store.state().clone();

    let pack_id = match args.pack.clone().or(state.active_category.clone()) {
        Some(id) => id,
        None => ctx.fail("error: no pack selected; pass --pack or activate a category"),
    };
    let Some(pack) = registry.pack(&pack_id) else {
        ctx.fail(&format!("error: pack not found: {}", pack_id));
    };
    let overrides = args.overrides.as_deref().map(|text| parse_overrides(text, ctx));
    let defaults = generation_defaults(&state.config);
    let seed = args.seed.unwrap_or(state.current_generation_id);

    let (key, mut data) = if let Some(name) = &args.scenario {
        let qualified = qualify(&pack.id, name);
        let (pack, scenario) = match registry.resolve_scenario(&qualified) {
            Ok(found) => found,
            Err(e) => ctx.fail(&format!("error: {}", e)),
        };
        let stage = args.stage.unwrap_or(state.active_stage);
        let entities = match generate_scenario(pack, scenario, stage, seed, &defaults) {
            Ok(entities) => entities,
            Err(e) => ctx.fail(&format!("error: {}", e)),
        };
        let data: Map<String, Value> = entities
            .into_iter()
            .map(|(entity, records)| (entity, Value::Array(records)))
            .collect();
        (qualified, Value::Object(data))
    } else {
        let request = GenerationRequest {
            schema: args.schema.clone(),
            category: args.schema.is_none().then(|| pack.id.clone()),
            seed,
            id: args.id.clone(),
            count: args.count,
            overrides: None,
        };
        let data = match request.execute(pack, &defaults) {
            Ok(data) => data,
            Err(e) => ctx.fail(&format!("error: {}", e)),
        };
        let key = match &args.schema {
            Some(schema) => qualified_name(&pack.id, schema),
            None => pack.id.clone(),
        };
        (key, data)
    };

    if let Some(overrides) = &overrides {
        data = map_records(data, &|record| apply_overrides(record, overrides));
    }
    if let Some(name) = &args.persona {
        let persona: Persona = match registry.resolve_persona(&qualify(&pack.id, name)) {
            Ok(p) => p.clone(),
            Err(e) => ctx.fail(&format!("error: {}", e)),
        };
        data = map_records(data, &|record| render_for_persona(&record, &persona));
    }

    if let Some(name) = &args.snapshot {
        let saved = store
            .record_generated(&key, data.clone())
            .and_then(|()| store.create_snapshot(name));
        match saved {
            Ok(id) => {
                snapshot::save(&store, &id, ctx);
                tracing::info!(snapshot = %id, key = %key, "generated data saved");
            }
            Err(e) => ctx.fail(&format!("error: {}", e)),
        }
    }

    ctx.print_json(&data);
}

fn qualify(pack_id: &str, name: &str) -> String {
    if name.contains(':') {
        name.to_string()
    } else {
        qualified_name(pack_id, name)
    }
}

fn parse_overrides(text: &str, ctx: &Context) -> Map<String, Value> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => map,
        Ok(_) => ctx.fail("error: --overrides must be a JSON object"),
        Err(e) => ctx.fail(&format!("error: invalid --overrides JSON: {}", e)),
    }
}

/// Apply `f` to every record: arrays element-wise, and the arrays inside
/// a `{schema: [records]}` object.
fn map_records(data: Value, f: &dyn Fn(Value) -> Value) -> Value {
    match data {
        Value::Array(items) => Value::Array(items.into_iter().map(f).collect()),
        Value::Object(map) if map.values().all(Value::is_array) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, map_records(v, f)))
                .collect(),
        ),
        other => f(other),
    }
}
