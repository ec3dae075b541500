//! Full-tree export and import against a store file.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use taakl_store::Store;
use taakl_sync_engine::SyncEngine;
use tracing::info;

/// Writes an account's full-tree snapshot to a JSON file.
pub fn export(
    store_path: &Path,
    username: &str,
    out: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(Store::load(store_path)?);
    let account = store
        .account_by_username(username)
        .ok_or_else(|| format!("no account named {username:?}"))?;

    let snapshot = SyncEngine::new(Arc::clone(&store), &account).export_full()?;
    fs::write(out, serde_json::to_string_pretty(&snapshot)?)?;

    info!("Exported {username:?} to {out:?}");
    println!(
        "Exported {} clients and {} nodes to {}",
        snapshot.clients.len(),
        snapshot.nodes.len(),
        out.display()
    );
    Ok(())
}

/// Imports a full-tree snapshot file into an account.
pub fn import(
    store_path: &Path,
    username: &str,
    input: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(Store::load(store_path)?);
    let account = store
        .account_by_username(username)
        .ok_or_else(|| format!("no account named {username:?}"))?;

    let payload: serde_json::Value = serde_json::from_str(&fs::read_to_string(input)?)?;
    let stats = SyncEngine::new(Arc::clone(&store), &account).import_full(&payload)?;
    store.save(store_path)?;

    info!("Imported {input:?} into {username:?}");
    println!(
        "Imported {} records ({} clients, {} projects, {} tasks, {} sessions, {} nodes, {} node sessions)",
        stats.total(),
        stats.clients,
        stats.projects,
        stats.tasks,
        stats.sessions,
        stats.nodes,
        stats.node_sessions
    );
    Ok(())
}
