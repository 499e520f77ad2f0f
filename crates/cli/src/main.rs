mod commands;
mod config;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use packgen_core::Registry;
use packgen_store::{FilePort, Store};
use tracing_subscriber::EnvFilter;

use commands::generate::GenerateArgs;
use commands::snapshot::SnapshotCommand;
use commands::state::StateCommand;
use config::PackgenConfig;

/// Environment variable consulted for the log filter when `--log` is absent.
const LOG_ENV: &str = "PACKGEN_LOG";

const DEFAULT_LOG_FILTER: &str = "warn";

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Declarative mock-data packs: validate, generate, and match scenarios.
#[derive(Parser)]
#[command(
    name = "packgen",
    version,
    about = "Declarative mock-data packs: validate, generate, and match scenarios"
)]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Path to packgen.toml (default: ./packgen.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter directive, e.g. "debug" or "packgen_store=debug"
    #[arg(long, global = true)]
    log: Option<String>,

    /// Pack directory to load instead of the configured ones (repeatable)
    #[arg(long = "packs", global = true)]
    pack_dirs: Vec<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate pack documents (files or directories of *.json)
    Validate {
        /// Pack files or directories
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Also check each document against the bundled JSON Schema
        #[arg(long)]
        schema: bool,
    },

    /// List registered packs with their scenarios and personas
    Packs,

    /// Generate records from a pack schema, a whole pack, or a scenario
    Generate(GenerateArgs),

    /// Rank registered scenarios against a business analysis
    Match {
        /// Path to a DescriptionAnalysis JSON document
        #[arg(long)]
        analysis: PathBuf,
        /// Activate the best match in the configuration store
        #[arg(long)]
        apply: bool,
    },

    /// Inspect or change the active configuration
    State {
        #[command(subcommand)]
        command: StateCommand,
    },

    /// Create, list, restore, and move snapshots
    Snapshot {
        #[command(subcommand)]
        command: SnapshotCommand,
    },
}

/// Everything a subcommand needs besides its own arguments.
pub(crate) struct Context {
    pub config: PackgenConfig,
    pub pack_dirs: Vec<PathBuf>,
    pub output: OutputFormat,
    pub quiet: bool,
}

impl Context {
    /// Report `msg` and exit with status 1.
    pub fn fail(&self, msg: &str) -> ! {
        report_error(msg, self.output, self.quiet);
        process::exit(1);
    }

    /// Load every configured pack directory into one registry.
    pub fn registry(&self) -> Registry {
        let mut registry = Registry::new();
        for dir in &self.pack_dirs {
            if !dir.is_dir() {
                tracing::warn!(dir = %dir.display(), "pack directory not found; skipping");
                continue;
            }
            if let Err(e) = registry.load_dir(dir) {
                self.fail(&format!("error: {}", e));
            }
        }
        tracing::info!(packs = registry.len(), "registry loaded");
        registry
    }

    /// Open the persisted store, re-import saved snapshots, and align it
    /// with the registry and config file.
    pub fn store(&self, registry: &Registry) -> Store {
        let port = FilePort::new(&self.config.store.state_file);
        let mut store = Store::with_persistence(Box::new(port));
        commands::snapshot::load_saved(&mut store, &self.config.store.snapshot_dir);

        if !registry.is_empty() {
            if let Err(e) = store.sync_categories(registry.pack_ids()) {
                self.fail(&format!("error: {}", e));
            }
        }
        let configured = self.config.store_config();
        if store.state().config != configured {
            if let Err(e) = store.set_config(configured) {
                self.fail(&format!("error: {}", e));
            }
        }
        store
    }

    /// Print `value` as pretty JSON on stdout.
    pub fn print_json<T: serde::Serialize>(&self, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(s) => println!("{}", s),
            Err(e) => self.fail(&format!("serialization error: {}", e)),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let config = match config::load_config(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            init_logging(cli.log.as_deref(), None);
            report_error(&format!("error: {}", e), cli.output, cli.quiet);
            process::exit(1);
        }
    };
    init_logging(cli.log.as_deref(), config.log.filter.as_deref());

    let pack_dirs = if cli.pack_dirs.is_empty() {
        config.packs.dirs.clone()
    } else {
        cli.pack_dirs.clone()
    };
    let ctx = Context {
        config,
        pack_dirs,
        output: cli.output,
        quiet: cli.quiet,
    };

    match cli.command {
        Commands::Validate { paths, schema } => {
            commands::validate::cmd_validate(&paths, schema, &ctx);
        }
        Commands::Packs => {
            commands::packs::cmd_packs(&ctx);
        }
        Commands::Generate(args) => {
            commands::generate::cmd_generate(&args, &ctx);
        }
        Commands::Match { analysis, apply } => {
            commands::scenario_match::cmd_match(&analysis, apply, &ctx);
        }
        Commands::State { command } => {
            commands::state::cmd_state(command, &ctx);
        }
        Commands::Snapshot { command } => {
            commands::snapshot::cmd_snapshot(command, &ctx);
        }
    }
}

/// Install the stderr subscriber. Filter precedence: `--log`, then
/// `PACKGEN_LOG`, then `[log] filter`, then `warn`.
fn init_logging(flag: Option<&str>, configured: Option<&str>) {
    let directive = flag
        .map(str::to_string)
        .or_else(|| std::env::var(LOG_ENV).ok().filter(|v| !v.trim().is_empty()))
        .or_else(|| configured.map(str::to_string))
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

    let (filter, rejected) = match EnvFilter::try_new(&directive) {
        Ok(f) => (f, None),
        Err(e) => (EnvFilter::new(DEFAULT_LOG_FILTER), Some(e)),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
    if let Some(e) = rejected {
        tracing::warn!(directive = %directive, error = %e, "invalid log filter; using default");
    }
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}
