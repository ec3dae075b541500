//! The per-account sync engine.

use crate::applier::Applier;
use crate::error::{EngineError, EngineResult};
use crate::{codec, collector, settings};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use taakl_model::Timestamp;
use taakl_store::{AccountId, AccountRecord, Store};
use taakl_sync_protocol::{ImportStats, Mutation, Snapshot, SyncOutcome, SyncStats};
use tracing::debug;

/// The sync engine for one authenticated account.
///
/// Constructed per request by the collaborator layer after it has resolved
/// the caller to an account; the store handle is injected, never global.
/// Each incremental batch and each full import runs inside one store
/// transaction: rejections are counted, faults roll the whole thing back.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use taakl_model::{EntityKind, Timestamp};
/// use taakl_store::Store;
/// use taakl_sync_engine::SyncEngine;
/// use taakl_sync_protocol::Mutation;
///
/// let store = Arc::new(Store::in_memory());
/// let account = store
///     .create_account("mara", "key-1", "sha256$s$d", None, Timestamp::now())
///     .unwrap();
/// let engine = SyncEngine::new(Arc::clone(&store), &account);
///
/// let outcome = engine
///     .process_sync(
///         &[Mutation::insert(EntityKind::Client, "c1").with_field("name", "Acme")],
///         None,
///     )
///     .unwrap();
/// assert_eq!(outcome.stats.accepted, 1);
/// ```
pub struct SyncEngine {
    store: Arc<Store>,
    account: AccountId,
    account_uuid: String,
}

impl SyncEngine {
    /// Creates an engine bound to one account.
    pub fn new(store: Arc<Store>, account: &AccountRecord) -> Self {
        Self {
            store,
            account: account.id,
            account_uuid: account.uuid.clone(),
        }
    }

    /// Processes one incremental sync batch.
    ///
    /// Applies the mutations in submitted order (later mutations see the
    /// effects of earlier ones), then collects every server-side change
    /// after `cutoff`, all inside one transaction. A missing cutoff means
    /// "return everything".
    pub fn process_sync(
        &self,
        changes: &[Mutation],
        cutoff: Option<Timestamp>,
    ) -> EngineResult<SyncOutcome> {
        let now = Timestamp::now();
        let (mut stats, collected) =
            self.store
                .transaction::<_, EngineError>(self.account, |data| {
                    let mut stats = SyncStats::default();
                    let mut applier = Applier::new(data, now);
                    for mutation in changes {
                        stats.processed += 1;
                        if applier.apply(mutation) {
                            stats.accepted += 1;
                        } else {
                            stats.conflicts += 1;
                        }
                    }
                    let collected = collector::collect_since(data, cutoff);
                    Ok((stats, collected))
                })?;

        stats.returned = collected.len();
        debug!(
            account = %self.account,
            processed = stats.processed,
            accepted = stats.accepted,
            conflicts = stats.conflicts,
            returned = stats.returned,
            "processed sync batch"
        );

        Ok(SyncOutcome {
            server_time: now,
            changes: collected,
            stats,
        })
    }

    /// Exports the account's full tree as one snapshot.
    pub fn export_full(&self) -> EngineResult<Snapshot> {
        Ok(self
            .store
            .read(self.account, |data| {
                codec::export_full(data, &self.account_uuid)
            })?)
    }

    /// Imports a full-tree snapshot (either or both shapes), upserting by
    /// identifier inside one transaction.
    pub fn import_full(&self, payload: &Value) -> EngineResult<ImportStats> {
        let now = Timestamp::now();
        let stats = self
            .store
            .transaction::<_, EngineError>(self.account, |data| {
                Ok(codec::import_full(data, payload, now))
            })?;
        debug!(account = %self.account, total = stats.total(), "imported full tree");
        Ok(stats)
    }

    /// Reads the account's settings map.
    pub fn settings(&self) -> EngineResult<BTreeMap<String, Value>> {
        Ok(self.store.read(self.account, settings::get_settings)?)
    }

    /// Upserts the given settings keys.
    pub fn save_settings(&self, incoming: &BTreeMap<String, Value>) -> EngineResult<()> {
        self.store
            .transaction::<_, EngineError>(self.account, |data| {
                settings::save_settings(data, incoming);
                Ok(())
            })
    }
}
