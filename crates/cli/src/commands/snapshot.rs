//! Snapshot subcommands. Snapshots live only in memory inside a store,
//! so the CLI keeps each one as an exported document under
//! `[store] snapshot_dir` and re-imports them on start.

use std::path::{Path, PathBuf};

use clap::Subcommand;
use packgen_store::{SnapshotDocument, Store};

use crate::{Context, OutputFormat};

#[derive(Debug, Subcommand)]
pub(crate) enum SnapshotCommand {
    /// Capture the active configuration under a name
    Create { name: String },
    /// List saved snapshots in creation order
    List,
    /// Replace the active configuration with a snapshot
    Restore { id: String },
    /// Delete a snapshot
    Delete { id: String },
    /// Write a snapshot document to a file (or stdout)
    Export {
        id: String,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Add a snapshot from an exported document
    Import { file: PathBuf },
}

pub(crate) fn cmd_snapshot(command: SnapshotCommand, ctx: &Context) {
    let registry = ctx.registry();
    let mut store = ctx.store(&registry);

    match command {
        SnapshotCommand::Create { name } => {
            let id = match store.create_snapshot(&name) {
                Ok(id) => id,
                Err(e) => ctx.fail(&format!("error: {}", e)),
            };
            save(&store, &id, ctx);
            report(ctx, "created", &id);
        }
        SnapshotCommand::List => list(&store, ctx),
        SnapshotCommand::Restore { id } => {
            if let Err(e) = store.restore_snapshot(&id) {
                ctx.fail(&format!("error: {}", e));
            }
            report(ctx, "restored", &id);
        }
        SnapshotCommand::Delete { id } => {
            if let Err(e) = store.delete_snapshot(&id) {
                ctx.fail(&format!("error: {}", e));
            }
            let path = document_path(&ctx.config.store.snapshot_dir, &id);
            if let Err(e) = std::fs::remove_file(&path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    ctx.fail(&format!("error removing '{}': {}", path.display(), e));
                }
            }
            report(ctx, "deleted", &id);
        }
        SnapshotCommand::Export { id, out } => {
            let document = match store.export_snapshot(&id) {
                Ok(doc) => doc,
                Err(e) => ctx.fail(&format!("error: {}", e)),
            };
            match out {
                Some(path) => {
                    if let Err(e) = std::fs::write(&path, document) {
                        ctx.fail(&format!("error writing '{}': {}", path.display(), e));
                    }
                    report(ctx, "exported", &id);
                }
                None => println!("{}", document),
            }
        }
        SnapshotCommand::Import { file } => {
            let text = match std::fs::read_to_string(&file) {
                Ok(s) => s,
                Err(e) => ctx.fail(&format!("error reading file '{}': {}", file.display(), e)),
            };
            let id = match store.import_snapshot(&text) {
                Ok(id) => id,
                Err(e) => ctx.fail(&format!("error: {}", e)),
            };
            save(&store, &id, ctx);
            report(ctx, "imported", &id);
        }
    }
}

fn list(store: &Store, ctx: &Context) {
    let snapshots = store.list_snapshots();
    match ctx.output {
        OutputFormat::Json => ctx.print_json(&snapshots),
        OutputFormat::Text => {
            if snapshots.is_empty() && !ctx.quiet {
                println!("no snapshots");
            }
            for s in snapshots {
                println!(
                    "{}  {}  {}  [{}, generation {}]",
                    s.id, s.name, s.timestamp, s.state.active_stage, s.state.generation_id
                );
            }
        }
    }
}

fn report(ctx: &Context, action: &str, id: &str) {
    match ctx.output {
        OutputFormat::Json => {
            let mut body = serde_json::Map::new();
            body.insert(action.to_string(), serde_json::Value::from(id));
            ctx.print_json(&body);
        }
        OutputFormat::Text => {
            if !ctx.quiet {
                println!("{} {}", action, id);
            }
        }
    }
}

fn document_path(dir: &Path, id: &str) -> PathBuf {
    dir.join(format!("{}.json", id))
}

/// Write snapshot `id` to the snapshot directory.
pub(crate) fn save(store: &Store, id: &str, ctx: &Context) {
    let dir = &ctx.config.store.snapshot_dir;
    let result = store
        .export_snapshot(id)
        .map_err(|e| e.to_string())
        .and_then(|doc| {
            std::fs::create_dir_all(dir).map_err(|e| e.to_string())?;
            std::fs::write(document_path(dir, id), doc).map_err(|e| e.to_string())
        });
    if let Err(e) = result {
        ctx.fail(&format!("error saving snapshot '{}': {}", id, e));
    }
}

/// Import every saved document in `dir`, oldest first. Unreadable
/// documents are skipped with a warning.
pub(crate) fn load_saved(store: &mut Store, dir: &Path) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    let mut documents: Vec<(String, String, String)> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .filter_map(|path| {
            let text = match std::fs::read_to_string(&path) {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping snapshot");
                    return None;
                }
            };
            match SnapshotDocument::from_json(&text) {
                Ok(doc) => Some((doc.snapshot.timestamp, doc.snapshot.id, text)),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping snapshot");
                    None
                }
            }
        })
        .collect();
    documents.sort();

    for (_, id, text) in documents {
        if let Err(e) = store.import_snapshot(&text) {
            tracing::warn!(snapshot = %id, error = %e, "could not import saved snapshot");
        }
    }
}
