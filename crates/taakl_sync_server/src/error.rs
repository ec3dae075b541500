//! Error types for the sync server.

use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur in the server layer.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The request body is malformed or missing required fields.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The caller could not be authenticated.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Registration with a username that already exists.
    #[error("username already exists: {0}")]
    UsernameTaken(String),

    /// The sync core failed; the enclosing transaction was rolled back.
    #[error("engine error: {0}")]
    Engine(#[from] taakl_sync_engine::EngineError),

    /// The store failed outside the sync core.
    #[error("store error: {0}")]
    Store(#[from] taakl_store::StoreError),
}

impl ServerError {
    /// Returns true if this is a client error (4xx).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ServerError::InvalidRequest(_)
                | ServerError::AuthenticationFailed(_)
                | ServerError::UsernameTaken(_)
        )
    }

    /// Returns true if this is a server error (5xx).
    pub fn is_server_error(&self) -> bool {
        !self.is_client_error()
    }
}
