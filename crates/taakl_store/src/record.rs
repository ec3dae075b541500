//! Record types for both schema generations.
//!
//! Every syncable record carries a client-generated identifier, a
//! last-modified timestamp, and an optional soft-delete marker. Structured
//! payload data (`meta`) is stored as an opaque serialized blob alongside
//! the first-class columns.

use crate::table::RowId;
use serde::{Deserialize, Serialize};
use taakl_model::Timestamp;

/// Common behavior of all syncable records.
///
/// Conflict resolution and change collection only ever need these accessors,
/// so last-write-wins logic is written once against this trait rather than
/// once per schema generation.
pub trait SyncRecord {
    /// The client-generated identifier.
    fn uuid(&self) -> &str;
    /// Last-modified time, advanced to server time on every committed change.
    fn updated_at(&self) -> Timestamp;
    /// Soft-delete marker; `None` means live.
    fn deleted_at(&self) -> Option<Timestamp>;
    /// Sets or clears the soft-delete marker.
    fn set_deleted_at(&mut self, at: Option<Timestamp>);
    /// Advances the last-modified time.
    fn touch(&mut self, now: Timestamp);
}

macro_rules! impl_sync_record {
    ($($ty:ty),+) => {
        $(impl SyncRecord for $ty {
            fn uuid(&self) -> &str {
                &self.uuid
            }
            fn updated_at(&self) -> Timestamp {
                self.updated_at
            }
            fn deleted_at(&self) -> Option<Timestamp> {
                self.deleted_at
            }
            fn set_deleted_at(&mut self, at: Option<Timestamp>) {
                self.deleted_at = at;
            }
            fn touch(&mut self, now: Timestamp) {
                self.updated_at = now;
            }
        })+
    };
}

/// Legacy top-level client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientRecord {
    /// Client-generated identifier, unique per account.
    pub uuid: String,
    /// Display name.
    pub name: String,
    /// Opaque serialized payload blob.
    pub meta: Option<String>,
    /// Last-modified time.
    pub updated_at: Timestamp,
    /// Soft-delete marker.
    pub deleted_at: Option<Timestamp>,
}

impl ClientRecord {
    /// Creates a client with per-type defaults.
    pub fn new(uuid: String, now: Timestamp) -> Self {
        Self {
            uuid,
            name: "Unnamed Client".into(),
            meta: None,
            updated_at: now,
            deleted_at: None,
        }
    }
}

/// Legacy project, owned by one client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectRecord {
    /// Client-generated identifier, unique per owning client.
    pub uuid: String,
    /// Owning client row.
    pub client: RowId,
    /// Display name.
    pub name: String,
    /// Opaque serialized payload blob.
    pub meta: Option<String>,
    /// Last-modified time.
    pub updated_at: Timestamp,
    /// Soft-delete marker.
    pub deleted_at: Option<Timestamp>,
}

impl ProjectRecord {
    /// Creates a project with per-type defaults.
    pub fn new(uuid: String, client: RowId, now: Timestamp) -> Self {
        Self {
            uuid,
            client,
            name: "Unnamed Project".into(),
            meta: None,
            updated_at: now,
            deleted_at: None,
        }
    }
}

/// Legacy task, owned by one project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Client-generated identifier, unique per owning project.
    pub uuid: String,
    /// Owning project row.
    pub project: RowId,
    /// Display name.
    pub name: String,
    /// Workflow status.
    pub status: String,
    /// Priority level.
    pub priority: i64,
    /// Whether time on this task is billable.
    pub billable: bool,
    /// Estimated effort in hours.
    pub estimate: Option<f64>,
    /// Due date, passed through as given by the client.
    pub due: Option<String>,
    /// Starred flag.
    pub starred: bool,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Opaque serialized payload blob.
    pub meta: Option<String>,
    /// Last-modified time.
    pub updated_at: Timestamp,
    /// Soft-delete marker.
    pub deleted_at: Option<Timestamp>,
}

impl TaskRecord {
    /// Creates a task with per-type defaults: status "new", priority 1,
    /// billable, not starred.
    pub fn new(uuid: String, project: RowId, now: Timestamp) -> Self {
        Self {
            uuid,
            project,
            name: "Unnamed Task".into(),
            status: "new".into(),
            priority: 1,
            billable: true,
            estimate: None,
            due: None,
            starred: false,
            notes: None,
            meta: None,
            updated_at: now,
            deleted_at: None,
        }
    }
}

/// Legacy work session, owned by one task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Client-generated identifier, unique per owning task.
    pub uuid: String,
    /// Owning task row.
    pub task: RowId,
    /// Session start.
    pub start_time: Timestamp,
    /// Session end, if finished.
    pub end_time: Option<Timestamp>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Opaque serialized payload blob.
    pub meta: Option<String>,
    /// Last-modified time.
    pub updated_at: Timestamp,
    /// Soft-delete marker.
    pub deleted_at: Option<Timestamp>,
}

impl SessionRecord {
    /// Creates a session starting now.
    pub fn new(uuid: String, task: RowId, now: Timestamp) -> Self {
        Self {
            uuid,
            task,
            start_time: now,
            end_time: None,
            notes: None,
            meta: None,
            updated_at: now,
            deleted_at: None,
        }
    }
}

/// Generalized tree node.
///
/// `node_type` discriminates containers ("group") from leaves with time
/// tracking ("task"); only task nodes carry the task-specific fields on
/// export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Client-generated identifier, unique per account.
    pub uuid: String,
    /// Parent node identifier; `None` marks a root node.
    pub parent_uuid: Option<String>,
    /// Display name.
    pub name: String,
    /// Node type discriminator.
    pub node_type: String,
    /// Ordered child identifiers.
    pub child_order: Vec<String>,
    /// Whether the node is collapsed in tree views.
    pub collapsed: bool,
    /// Workflow status (task nodes).
    pub status: String,
    /// Priority level (task nodes).
    pub priority: i64,
    /// Whether time on this node is billable (task nodes).
    pub billable: bool,
    /// Estimated effort in hours (task nodes).
    pub estimate: Option<f64>,
    /// Due date, passed through as given by the client.
    pub due: Option<String>,
    /// Starred flag (task nodes).
    pub starred: bool,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Opaque serialized payload blob.
    pub meta: Option<String>,
    /// Last-modified time.
    pub updated_at: Timestamp,
    /// Soft-delete marker.
    pub deleted_at: Option<Timestamp>,
}

impl NodeRecord {
    /// Creates a node with per-type defaults: type "task", status "new",
    /// priority 3, billable, not starred, not collapsed.
    pub fn new(uuid: String, parent_uuid: Option<String>, now: Timestamp) -> Self {
        Self {
            uuid,
            parent_uuid,
            name: "Unnamed".into(),
            node_type: "task".into(),
            child_order: Vec::new(),
            collapsed: false,
            status: "new".into(),
            priority: 3,
            billable: true,
            estimate: None,
            due: None,
            starred: false,
            notes: None,
            meta: None,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Whether this node is a task leaf (as opposed to a container).
    pub fn is_task(&self) -> bool {
        self.node_type == "task"
    }
}

/// Work session owned by one node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSessionRecord {
    /// Client-generated identifier, unique per owning node.
    pub uuid: String,
    /// Owning node row.
    pub node: RowId,
    /// Session start.
    pub start_time: Timestamp,
    /// Session end, if finished.
    pub end_time: Option<Timestamp>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Opaque serialized payload blob.
    pub meta: Option<String>,
    /// Last-modified time.
    pub updated_at: Timestamp,
    /// Soft-delete marker.
    pub deleted_at: Option<Timestamp>,
}

impl NodeSessionRecord {
    /// Creates a node session starting now.
    pub fn new(uuid: String, node: RowId, now: Timestamp) -> Self {
        Self {
            uuid,
            node,
            start_time: now,
            end_time: None,
            notes: None,
            meta: None,
            updated_at: now,
            deleted_at: None,
        }
    }
}

impl_sync_record!(
    ClientRecord,
    ProjectRecord,
    TaskRecord,
    SessionRecord,
    NodeRecord,
    NodeSessionRecord
);

/// Per-account schema metadata: the schema generation in use and the
/// ordered list of root-level node identifiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDataMeta {
    /// Schema version marker.
    pub data_version: i64,
    /// Ordered root node identifiers.
    pub root_order: Vec<String>,
}

impl Default for UserDataMeta {
    fn default() -> Self {
        Self {
            data_version: 2,
            root_order: Vec::new(),
        }
    }
}
