//! The server facade: token resolution plus dispatch.

use crate::auth::{AuthSession, Authenticator};
use crate::config::ServerConfig;
use crate::error::ServerResult;
use crate::handler::{HandlerContext, RequestHandler};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use taakl_store::{AccountRecord, Store};
use taakl_sync_protocol::{ImportStats, Snapshot, SyncOutcome, SyncRequest};

/// The sync server.
///
/// Owns the store, the authenticator, and the request handler. An HTTP
/// layer maps routes onto these methods, passing the raw bearer token and
/// the parsed JSON body; everything below this line is transport-agnostic.
///
/// # Example
///
/// ```
/// use taakl_sync_server::{ServerConfig, TaaklServer};
/// use taakl_sync_protocol::SyncRequest;
///
/// let server = TaaklServer::new(ServerConfig::default()).unwrap();
/// let session = server.register("mara", "correct-horse", None).unwrap();
///
/// let outcome = server.sync(&session.token, &SyncRequest::default()).unwrap();
/// assert_eq!(outcome.stats.processed, 0);
/// ```
pub struct TaaklServer {
    store: Arc<Store>,
    auth: Authenticator,
    handler: RequestHandler,
    config: ServerConfig,
}

impl TaaklServer {
    /// Creates a server, loading the store file if one is configured.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let store = match &config.store_path {
            Some(path) => Store::load_or_default(path)?,
            None => Store::in_memory(),
        };
        Ok(Self::with_store(config, Arc::new(store)))
    }

    /// Creates a server over an existing store.
    pub fn with_store(config: ServerConfig, store: Arc<Store>) -> Self {
        let auth = Authenticator::new(Arc::clone(&store), config.token_expiry_days);
        let context = Arc::new(HandlerContext::new(config.clone(), Arc::clone(&store)));
        let handler = RequestHandler::new(context);
        Self {
            store,
            auth,
            handler,
            config,
        }
    }

    // ---- account surface ----

    /// Registers a new account and returns its first session.
    pub fn register(
        &self,
        username: &str,
        password: &str,
        email: Option<String>,
    ) -> ServerResult<AuthSession> {
        self.auth.register(username, password, email)
    }

    /// Logs into an existing account.
    pub fn login(&self, username: &str, password: &str) -> ServerResult<AuthSession> {
        self.auth.login(username, password)
    }

    /// Revokes a token. Unknown tokens are a no-op, like the original.
    pub fn logout(&self, token: &str) -> bool {
        self.auth.logout(token)
    }

    /// Resolves a token to its account.
    pub fn me(&self, token: &str) -> ServerResult<AccountRecord> {
        self.auth.authenticate(token)
    }

    // ---- sync surface ----

    /// Incremental sync for the token's account.
    pub fn sync(&self, token: &str, request: &SyncRequest) -> ServerResult<SyncOutcome> {
        let account = self.auth.authenticate(token)?;
        self.handler.handle_sync(&account, request)
    }

    /// Full-tree upload for the token's account.
    pub fn full_upload(&self, token: &str, body: &Value) -> ServerResult<ImportStats> {
        let account = self.auth.authenticate(token)?;
        self.handler.handle_full_upload(&account, body)
    }

    /// Full-tree download for the token's account.
    pub fn full_download(&self, token: &str) -> ServerResult<Snapshot> {
        let account = self.auth.authenticate(token)?;
        self.handler.handle_full_download(&account)
    }

    /// Settings read for the token's account.
    pub fn get_settings(&self, token: &str) -> ServerResult<BTreeMap<String, Value>> {
        let account = self.auth.authenticate(token)?;
        self.handler.handle_get_settings(&account)
    }

    /// Settings upsert for the token's account.
    pub fn save_settings(&self, token: &str, body: &Value) -> ServerResult<()> {
        let account = self.auth.authenticate(token)?;
        self.handler.handle_save_settings(&account, body)
    }

    // ---- lifecycle ----

    /// Persists the store to the configured path, if any.
    pub fn save(&self) -> ServerResult<()> {
        if let Some(path) = &self.config.store_path {
            self.store.save(path)?;
        }
        Ok(())
    }

    /// The underlying store handle.
    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }
}
