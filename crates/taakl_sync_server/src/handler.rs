//! Request handlers for the sync endpoints.

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use taakl_store::{AccountRecord, Store};
use taakl_sync_engine::SyncEngine;
use taakl_sync_protocol::{ImportStats, Snapshot, SyncOutcome, SyncRequest};
use tracing::info;

/// Shared context for request handling.
pub struct HandlerContext {
    /// Server configuration.
    pub config: ServerConfig,
    /// The store, shared across all handlers.
    pub store: Arc<Store>,
}

impl HandlerContext {
    /// Creates a new handler context.
    pub fn new(config: ServerConfig, store: Arc<Store>) -> Self {
        Self { config, store }
    }
}

/// Handles the sync surface for already-authenticated callers.
///
/// Every method takes the resolved account; token handling lives in
/// [`crate::Authenticator`]. A fresh [`SyncEngine`] is built per call, the
/// way the original spun up one sync context per request.
pub struct RequestHandler {
    context: Arc<HandlerContext>,
}

impl RequestHandler {
    /// Creates a new request handler.
    pub fn new(context: Arc<HandlerContext>) -> Self {
        Self { context }
    }

    fn engine(&self, account: &AccountRecord) -> SyncEngine {
        SyncEngine::new(Arc::clone(&self.context.store), account)
    }

    /// Handles an incremental sync request.
    pub fn handle_sync(
        &self,
        account: &AccountRecord,
        request: &SyncRequest,
    ) -> ServerResult<SyncOutcome> {
        let outcome = self
            .engine(account)
            .process_sync(&request.changes, request.last_sync_time)?;
        Ok(outcome)
    }

    /// Handles a full-tree upload.
    ///
    /// Accepts both the wrapped (`{"ttData": {...}}`) and unwrapped body
    /// forms. A snapshot carrying neither legacy clients nor generalized
    /// nodes is an invalid request.
    pub fn handle_full_upload(
        &self,
        account: &AccountRecord,
        body: &Value,
    ) -> ServerResult<ImportStats> {
        let payload = body.get("ttData").unwrap_or(body);
        if !payload.is_object() || payload.as_object().is_some_and(|o| o.is_empty()) {
            return Err(ServerError::InvalidRequest(
                "invalid data format - empty data".into(),
            ));
        }

        let has_legacy = payload
            .get("clients")
            .and_then(Value::as_object)
            .is_some_and(|o| !o.is_empty());
        let has_nodes = payload
            .get("nodes")
            .and_then(Value::as_object)
            .is_some_and(|o| !o.is_empty());
        if !has_legacy && !has_nodes {
            return Err(ServerError::InvalidRequest(
                "invalid data format - missing clients or nodes".into(),
            ));
        }

        let stats = self.engine(account).import_full(payload)?;
        info!(
            username = %account.username,
            total = stats.total(),
            "full import completed"
        );
        Ok(stats)
    }

    /// Handles a full-tree download.
    pub fn handle_full_download(&self, account: &AccountRecord) -> ServerResult<Snapshot> {
        Ok(self.engine(account).export_full()?)
    }

    /// Returns the account's settings map.
    pub fn handle_get_settings(
        &self,
        account: &AccountRecord,
    ) -> ServerResult<BTreeMap<String, Value>> {
        Ok(self.engine(account).settings()?)
    }

    /// Upserts settings from a request body.
    ///
    /// Accepts both the wrapped (`{"settings": {...}}`) and unwrapped
    /// forms; an empty map is an invalid request.
    pub fn handle_save_settings(
        &self,
        account: &AccountRecord,
        body: &Value,
    ) -> ServerResult<()> {
        let payload = body.get("settings").unwrap_or(body);
        let incoming = payload
            .as_object()
            .filter(|o| !o.is_empty())
            .ok_or_else(|| ServerError::InvalidRequest("invalid settings format".into()))?;

        let map: BTreeMap<String, Value> = incoming
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        self.engine(account).save_settings(&map)?;
        Ok(())
    }
}
