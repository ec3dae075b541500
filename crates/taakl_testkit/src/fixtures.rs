//! Test fixtures and store helpers.

use serde_json::{json, Value};
use std::sync::Arc;
use taakl_model::{EntityKind, Timestamp};
use taakl_store::{AccountRecord, Store};
use taakl_sync_engine::SyncEngine;
use taakl_sync_protocol::Mutation;
use tempfile::TempDir;

/// A store with one registered account, ready for sync calls.
pub struct TestAccount {
    /// The shared store.
    pub store: Arc<Store>,
    /// The registered account.
    pub account: AccountRecord,
    /// The temporary directory backing a file store, kept alive for the
    /// fixture's lifetime.
    _temp_dir: Option<TempDir>,
}

impl TestAccount {
    /// Creates an in-memory store with one account.
    pub fn memory() -> Self {
        let store = Arc::new(Store::in_memory());
        let account = store
            .create_account(
                "tester",
                "test-sync-key",
                "sha256$salt$digest",
                None,
                Timestamp::now(),
            )
            .expect("fresh store cannot have a duplicate username");
        Self {
            store,
            account,
            _temp_dir: None,
        }
    }

    /// Creates a file-backed store with one account; the file lives in a
    /// temporary directory cleaned up on drop.
    pub fn file() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp directory");
        let path = temp_dir.path().join("taakl.json");
        let store = Arc::new(Store::load_or_default(&path).expect("fresh store must load"));
        let account = store
            .create_account(
                "tester",
                "test-sync-key",
                "sha256$salt$digest",
                None,
                Timestamp::now(),
            )
            .expect("fresh store cannot have a duplicate username");
        store.save(&path).expect("failed to write store file");
        Self {
            store,
            account,
            _temp_dir: Some(temp_dir),
        }
    }

    /// A sync engine bound to the fixture account.
    pub fn engine(&self) -> SyncEngine {
        SyncEngine::new(Arc::clone(&self.store), &self.account)
    }

    /// Applies the sample tree and asserts every mutation was accepted.
    pub fn seed_sample_tree(&self) {
        let outcome = self
            .engine()
            .process_sync(&sample_tree(), None)
            .expect("seeding must not fault");
        assert_eq!(
            outcome.stats.conflicts, 0,
            "sample tree must apply cleanly"
        );
    }
}

impl Default for TestAccount {
    fn default() -> Self {
        Self::memory()
    }
}

/// A small tree touching both schema generations: one client → project →
/// task → session chain plus a group node with a task node and session.
pub fn sample_tree() -> Vec<Mutation> {
    vec![
        Mutation::insert(EntityKind::Client, "c1").with_field("name", "Acme"),
        Mutation::insert(EntityKind::Project, "p1")
            .with_parent("c1")
            .with_field("name", "Website"),
        Mutation::insert(EntityKind::Task, "t1")
            .with_parent("p1")
            .with_field("name", "Ship the redesign")
            .with_field("priority", 2),
        Mutation::insert(EntityKind::Session, "s1")
            .with_parent("t1")
            .with_field("start_time", "2024-03-01 09:00:00"),
        Mutation::insert(EntityKind::Node, "n1")
            .with_field("name", "Inbox")
            .with_field("type", "group"),
        Mutation::insert(EntityKind::Node, "n2")
            .with_parent("n1")
            .with_field("name", "Write docs")
            .with_field("type", "task"),
        Mutation::insert(EntityKind::NodeSession, "ns1")
            .with_parent("n2")
            .with_field("start_time", "2024-03-02 08:00:00"),
    ]
}

/// A full-tree snapshot body matching [`sample_tree`], as a client would
/// upload it.
pub fn sample_snapshot() -> Value {
    json!({
        "dataVersion": 2,
        "clients": {
            "c1": {
                "id": "c1",
                "name": "Acme",
                "projects": {
                    "p1": {
                        "id": "p1",
                        "name": "Website",
                        "tasks": {
                            "t1": {
                                "id": "t1",
                                "name": "Ship the redesign",
                                "status": "new",
                                "priority": "2",
                                "billable": "1",
                                "starred": "0",
                                "sessions": {
                                    "s1": {
                                        "id": "s1",
                                        "start_time": "2024-03-01 09:00:00"
                                    }
                                }
                            }
                        }
                    }
                }
            }
        },
        "nodes": {
            "n1": {
                "id": "n1",
                "name": "Inbox",
                "type": "group",
                "parentId": null,
                "childOrder": ["n2"],
                "collapsed": false
            },
            "n2": {
                "id": "n2",
                "name": "Write docs",
                "type": "task",
                "parentId": "n1",
                "status": "new",
                "priority": "3",
                "billable": "1",
                "starred": "0",
                "sessions": {
                    "ns1": {"id": "ns1", "start_time": "2024-03-02 08:00:00"}
                }
            }
        },
        "rootOrder": ["n1"],
        "settings": {"theme": "dark"}
    })
}
