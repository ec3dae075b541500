//! Property tests for change collection.

use proptest::prelude::*;
use std::sync::Arc;
use taakl_model::{EntityKind, Timestamp};
use taakl_store::Store;
use taakl_sync_engine::SyncEngine;
use taakl_sync_protocol::Mutation;

fn engine() -> SyncEngine {
    let store = Arc::new(Store::in_memory());
    let account = store
        .create_account("mara", "key-1", "sha256$s$d", None, Timestamp::now())
        .unwrap();
    SyncEngine::new(store, &account)
}

fn arb_kind() -> impl Strategy<Value = EntityKind> {
    prop::sample::select(EntityKind::ALL.to_vec())
}

fn arb_uuid() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["a", "b", "c", "d", "e"])
        .prop_map(|s| s.to_string())
}

/// Inserts, updates, and deletes over a small identifier pool. Parents are
/// drawn from the same pool, so some mutations resolve and some reject.
/// Both paths must stay well-behaved.
fn arb_mutation() -> impl Strategy<Value = Mutation> {
    (0..3u8, arb_kind(), arb_uuid(), arb_uuid()).prop_map(|(action, kind, uuid, parent)| {
        match action {
            0 => Mutation::insert(kind, uuid).with_parent(parent),
            1 => Mutation::update(kind, uuid).with_field("name", "changed"),
            _ => Mutation::delete(kind, uuid, Timestamp::now()),
        }
    })
}

proptest! {
    /// The cutoff is strictly-greater: records stamped at the previous
    /// call's server time never reappear when nothing changed since.
    #[test]
    fn server_time_cutoff_drains_the_feed(batch in prop::collection::vec(arb_mutation(), 0..25)) {
        let engine = engine();
        let outcome = engine.process_sync(&batch, None).unwrap();
        let drained = engine.process_sync(&[], Some(outcome.server_time)).unwrap();
        prop_assert_eq!(drained.stats.returned, 0);
    }

    /// No entity ever appears twice in one collection pass. Identifiers
    /// are only unique within their parent scope, so the key includes the
    /// resolved parent.
    #[test]
    fn collection_never_duplicates_entities(batch in prop::collection::vec(arb_mutation(), 0..25)) {
        let engine = engine();
        let outcome = engine.process_sync(&batch, None).unwrap();

        let mut seen = std::collections::HashSet::new();
        for change in &outcome.changes {
            prop_assert!(seen.insert((
                change.entity_type.clone(),
                change.uuid.clone(),
                change.parent_uuid.clone(),
            )));
        }
    }

    /// Batch statistics always partition the processed count.
    #[test]
    fn stats_partition_processed(batch in prop::collection::vec(arb_mutation(), 0..25)) {
        let engine = engine();
        let outcome = engine.process_sync(&batch, None).unwrap();
        prop_assert_eq!(outcome.stats.processed, batch.len());
        prop_assert_eq!(
            outcome.stats.accepted + outcome.stats.conflicts,
            outcome.stats.processed
        );
    }
}
