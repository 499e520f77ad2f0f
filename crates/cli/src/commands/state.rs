use clap::Subcommand;
use packgen_interchange::Stage;
use packgen_store::{ConfigurationState, Store, StoreConfig, StoreError};
use serde::Serialize;

use crate::{Context, OutputFormat};

#[derive(Debug, Subcommand)]
pub(crate) enum StateCommand {
    /// Print the active configuration
    Show,
    /// Activate a category (pack id)
    Activate { category: String },
    /// Deactivate a category
    Deactivate { category: String },
    /// Activate a persona role
    Role { id: String },
    /// Clear the active role
    ClearRole,
    /// Set the business stage (early, growth, enterprise)
    Stage { stage: Stage },
    /// Set the generation id
    GenerationId { id: u64 },
    /// Pick a random generation id
    Randomize,
    /// Return the live configuration to defaults (snapshots are kept)
    Reset,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StateView<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    active_category: Option<&'a str>,
    active_categories: Vec<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    active_role: Option<&'a str>,
    active_stage: Stage,
    current_generation_id: u64,
    config: &'a StoreConfig,
    snapshots: usize,
}

impl<'a> StateView<'a> {
    fn new(state: &'a ConfigurationState) -> Self {
        StateView {
            active_category: state.active_category.as_deref(),
            active_categories: state.active_categories.iter().map(String::as_str).collect(),
            active_role: state.active_role.as_deref(),
            active_stage: state.active_stage,
            current_generation_id: state.current_generation_id,
            config: &state.config,
            snapshots: state.snapshots.len(),
        }
    }
}

pub(crate) fn cmd_state(command: StateCommand, ctx: &Context) {
    let registry = ctx.registry();
    let mut store = ctx.store(&registry);

    if let Err(e) = apply(&mut store, command) {
        ctx.fail(&format!("error: {}", e));
    }
    print_state(store.state(), ctx);
}

fn apply(store: &mut Store, command: StateCommand) -> Result<(), StoreError> {
    match command {
        StateCommand::Show => Ok(()),
        StateCommand::Activate { category } => store.activate_category(&category),
        StateCommand::Deactivate { category } => store.deactivate_category(&category),
        StateCommand::Role { id } => store.activate_role(&id),
        StateCommand::ClearRole => store.deactivate_role(),
        StateCommand::Stage { stage } => store.set_stage(stage),
        StateCommand::GenerationId { id } => store.set_generation_id(id),
        StateCommand::Randomize => store.randomize_generation_id().map(|_| ()),
        StateCommand::Reset => store.reset(),
    }
}

fn print_state(state: &ConfigurationState, ctx: &Context) {
    let view = StateView::new(state);
    match ctx.output {
        OutputFormat::Json => ctx.print_json(&view),
        OutputFormat::Text => {
            if ctx.quiet {
                return;
            }
            println!("category:      {}", view.active_category.unwrap_or("(none)"));
            println!("role:          {}", view.active_role.unwrap_or("(none)"));
            println!("stage:         {}", view.active_stage);
            println!("generation id: {}", view.current_generation_id);
            println!("locale:        {}", view.config.locale);
            println!("default count: {}", view.config.default_count);
            println!("snapshots:     {}", view.snapshots);
        }
    }
}
