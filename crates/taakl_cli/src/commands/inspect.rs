//! Inspect command implementation.

use serde::Serialize;
use std::path::Path;
use taakl_store::Store;

/// Store inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Store file path.
    pub path: String,
    /// Registered accounts.
    pub accounts: Vec<AccountStats>,
}

/// Record counts for one account.
#[derive(Debug, Serialize)]
pub struct AccountStats {
    /// Login name.
    pub username: String,
    /// Clients, deleted included.
    pub clients: usize,
    /// Projects, deleted included.
    pub projects: usize,
    /// Tasks, deleted included.
    pub tasks: usize,
    /// Sessions, deleted included.
    pub sessions: usize,
    /// Nodes, deleted included.
    pub nodes: usize,
    /// Node sessions, deleted included.
    pub node_sessions: usize,
    /// Settings keys.
    pub settings: usize,
    /// Root-level node identifiers.
    pub root_nodes: usize,
}

/// Runs the inspect command.
pub fn run(store_path: &Path, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    if !store_path.exists() {
        return Err(format!("No store found at {store_path:?}").into());
    }
    let store = Store::load(store_path)?;

    let mut result = InspectResult {
        path: store_path.display().to_string(),
        accounts: Vec::new(),
    };

    for account in store.accounts() {
        let stats = store.read(account.id, |data| AccountStats {
            username: account.username.clone(),
            clients: data.clients.len(),
            projects: data.projects.len(),
            tasks: data.tasks.len(),
            sessions: data.sessions.len(),
            nodes: data.nodes.len(),
            node_sessions: data.node_sessions.len(),
            settings: data.settings.len(),
            root_nodes: data.meta.root_order.len(),
        })?;
        result.accounts.push(stats);
    }

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&result)?),
        _ => print_text_output(&result),
    }

    Ok(())
}

fn print_text_output(result: &InspectResult) {
    println!("Taakl Store Inspection");
    println!("======================");
    println!();
    println!("Path: {}", result.path);
    println!("Accounts: {}", result.accounts.len());

    for account in &result.accounts {
        println!();
        println!("[{}]", account.username);
        println!("  clients:       {}", account.clients);
        println!("  projects:      {}", account.projects);
        println!("  tasks:         {}", account.tasks);
        println!("  sessions:      {}", account.sessions);
        println!("  nodes:         {}", account.nodes);
        println!("  node sessions: {}", account.node_sessions);
        println!("  settings keys: {}", account.settings);
        println!("  root nodes:    {}", account.root_nodes);
    }
}
