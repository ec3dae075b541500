//! Server configuration.

use std::path::PathBuf;

/// Configuration for the sync server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Where the store file lives; `None` keeps everything in memory.
    pub store_path: Option<PathBuf>,
    /// How long issued tokens stay valid.
    pub token_expiry_days: i64,
}

impl ServerConfig {
    /// Sets the store file path.
    #[must_use]
    pub fn with_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = Some(path.into());
        self
    }

    /// Sets the token expiry in days.
    #[must_use]
    pub fn with_token_expiry_days(mut self, days: i64) -> Self {
        self.token_expiry_days = days;
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            store_path: None,
            token_expiry_days: 30,
        }
    }
}
