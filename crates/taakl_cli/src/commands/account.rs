//! Account commands.

use std::path::Path;
use taakl_sync_server::{ServerConfig, TaaklServer};
use tracing::info;

/// Registers an account and prints its sync key and first token.
pub fn create(
    store_path: &Path,
    username: &str,
    password: &str,
    email: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    info!("Creating account {username:?} in {store_path:?}");

    let server = TaaklServer::new(ServerConfig::default().with_store_path(store_path))?;
    let session = server.register(username, password, email)?;
    server.save()?;

    println!("Account created");
    println!("  username: {}", session.account.username);
    println!("  sync key: {}", session.account.uuid);
    println!("  token:    {}", session.token);
    Ok(())
}

/// Issues a fresh token for an existing account.
pub fn token(
    store_path: &Path,
    username: &str,
    password: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let server = TaaklServer::new(ServerConfig::default().with_store_path(store_path))?;
    let session = server.login(username, password)?;
    server.save()?;

    println!("{}", session.token);
    Ok(())
}
