//! Full-tree snapshot shapes for bulk import/export.
//!
//! A snapshot is one self-contained view of an account: the legacy nested
//! tree and the generalized flat node map travel side by side. Numeric-
//! looking task fields (`priority`, `billable`, `starred`) are rendered as
//! strings for wire-format compatibility with legacy clients.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A full-tree snapshot of one account.
///
/// Export always emits every section; import treats missing sections as
/// empty. Only non-deleted records appear at any level.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    /// Schema version marker.
    #[serde(rename = "dataVersion")]
    pub data_version: i64,
    /// The account's opaque sync key.
    #[serde(rename = "userKey")]
    pub user_key: String,
    /// Legacy nested tree, clients keyed by identifier.
    pub clients: BTreeMap<String, ClientTree>,
    /// Generalized flat node map, keyed by identifier.
    pub nodes: BTreeMap<String, NodeEntry>,
    /// Ordered root-level node identifiers.
    #[serde(rename = "rootOrder")]
    pub root_order: Vec<String>,
    /// Full settings map.
    pub settings: BTreeMap<String, Value>,
}

/// A client with its nested projects.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientTree {
    /// Client identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Projects keyed by identifier.
    pub projects: BTreeMap<String, ProjectTree>,
}

/// A project with its nested tasks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectTree {
    /// Project identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Tasks keyed by identifier.
    pub tasks: BTreeMap<String, TaskTree>,
}

/// A task with its nested sessions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskTree {
    /// Task identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Workflow status.
    pub status: String,
    /// Priority, as a string on the wire.
    pub priority: String,
    /// Billable flag, as a string on the wire.
    pub billable: String,
    /// Estimated effort in hours.
    pub estimate: Option<f64>,
    /// Due date.
    pub due: Option<String>,
    /// Starred flag, as a string on the wire.
    pub starred: String,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Sessions keyed by identifier.
    pub sessions: BTreeMap<String, SessionEntry>,
}

/// A work session under a task or a task node.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionEntry {
    /// Session identifier.
    pub id: String,
    /// Session start.
    pub start_time: String,
    /// Session end, if finished.
    pub end_time: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// One generalized node in the flat map.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeEntry {
    /// Node identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Node type discriminator.
    #[serde(rename = "type")]
    pub node_type: String,
    /// Parent node identifier; absent for roots.
    #[serde(rename = "parentId")]
    pub parent_id: Option<String>,
    /// Ordered child identifiers, decoded from their stored serialized
    /// form.
    #[serde(rename = "childOrder")]
    pub child_order: Vec<String>,
    /// Whether the node is collapsed in tree views.
    pub collapsed: bool,
    /// Task-specific fields; present only when the node type is "task".
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub task: Option<NodeTaskFields>,
}

/// Task-specific fields of a task-typed node.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeTaskFields {
    /// Workflow status.
    pub status: String,
    /// Priority, as a string on the wire.
    pub priority: String,
    /// Billable flag, as a string on the wire.
    pub billable: String,
    /// Estimated effort in hours.
    pub estimate: Option<f64>,
    /// Due date.
    pub due: Option<String>,
    /// Starred flag, as a string on the wire.
    pub starred: String,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Node sessions keyed by identifier.
    pub sessions: BTreeMap<String, SessionEntry>,
}
