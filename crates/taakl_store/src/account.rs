//! Accounts and their per-account data.

use crate::record::{
    ClientRecord, NodeRecord, NodeSessionRecord, ProjectRecord, SessionRecord, TaskRecord,
    UserDataMeta,
};
use crate::table::{RowId, Table};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use taakl_model::Timestamp;

/// Internal account identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct AccountId(u64);

impl AccountId {
    /// Creates an account id from its raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw id value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "account:{}", self.0)
    }
}

/// One registered account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountRecord {
    /// Internal account id.
    pub id: AccountId,
    /// Stable opaque identifier, exposed as the sync key.
    pub uuid: String,
    /// Login name, unique across the store.
    pub username: String,
    /// Salted password digest (`sha256$<salt>$<digest>`).
    pub password_digest: String,
    /// Contact address, if given at registration.
    pub email: Option<String>,
    /// Registration time.
    pub created_at: Timestamp,
}

/// One issued bearer token, stored by digest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRecord {
    /// SHA-256 digest of the token, hex-encoded.
    pub digest: String,
    /// The account this token authenticates.
    pub account: AccountId,
    /// Expiry time; the token is dead afterwards.
    pub expires_at: Timestamp,
}

/// All synced data belonging to one account.
///
/// Tables hold live and soft-deleted records alike; soft-deleted records
/// stay addressable for conflict comparison and change collection but are
/// excluded from full exports and from parent resolution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountData {
    /// Legacy clients.
    pub clients: Table<ClientRecord>,
    /// Legacy projects.
    pub projects: Table<ProjectRecord>,
    /// Legacy tasks.
    pub tasks: Table<TaskRecord>,
    /// Legacy sessions.
    pub sessions: Table<SessionRecord>,
    /// Generalized nodes.
    pub nodes: Table<NodeRecord>,
    /// Node sessions.
    pub node_sessions: Table<NodeSessionRecord>,
    /// Settings, stored in serialized string form.
    pub settings: BTreeMap<String, String>,
    /// Schema version and root order.
    pub meta: UserDataMeta,
}

impl AccountData {
    /// Looks up a client by identifier.
    pub fn client_by_uuid(&self, uuid: &str) -> Option<(RowId, &ClientRecord)> {
        self.clients.find(|c| c.uuid == uuid)
    }

    /// Looks up a project by identifier.
    pub fn project_by_uuid(&self, uuid: &str) -> Option<(RowId, &ProjectRecord)> {
        self.projects.find(|p| p.uuid == uuid)
    }

    /// Looks up a task by identifier.
    pub fn task_by_uuid(&self, uuid: &str) -> Option<(RowId, &TaskRecord)> {
        self.tasks.find(|t| t.uuid == uuid)
    }

    /// Looks up a session by identifier.
    pub fn session_by_uuid(&self, uuid: &str) -> Option<(RowId, &SessionRecord)> {
        self.sessions.find(|s| s.uuid == uuid)
    }

    /// Looks up a node by identifier.
    pub fn node_by_uuid(&self, uuid: &str) -> Option<(RowId, &NodeRecord)> {
        self.nodes.find(|n| n.uuid == uuid)
    }

    /// Looks up a node session by identifier.
    pub fn node_session_by_uuid(&self, uuid: &str) -> Option<(RowId, &NodeSessionRecord)> {
        self.node_sessions.find(|s| s.uuid == uuid)
    }

    /// Appends a node identifier to the root order if not already present.
    pub fn add_to_root_order(&mut self, uuid: &str) {
        if !self.meta.root_order.iter().any(|u| u == uuid) {
            self.meta.root_order.push(uuid.to_string());
        }
    }
}
