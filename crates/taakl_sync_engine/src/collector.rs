//! The change collector: everything changed after a cutoff.

use crate::ancestry::{self, AnyRecord};
use serde_json::{json, Value};
use taakl_model::{EntityKind, Timestamp};
use taakl_store::{AccountData, NodeRecord, SyncRecord};
use taakl_sync_protocol::{ChangeAction, ChangeRecord, FieldMap};

/// Collects one change record per entity whose last-modified time is
/// strictly after `cutoff`, soft-deleted records included.
///
/// A missing cutoff means "return everything". Enumeration order is legacy
/// types fully before generalized types (clients, projects, tasks,
/// sessions, nodes, node sessions), then insertion order within a type,
/// which is stable for a given storage state.
pub(crate) fn collect_since(data: &AccountData, cutoff: Option<Timestamp>) -> Vec<ChangeRecord> {
    let cutoff = cutoff.unwrap_or_else(Timestamp::epoch);
    let mut changes = Vec::new();

    for (_, record) in data.clients.iter() {
        if record.updated_at > cutoff {
            changes.push(change_for(data, EntityKind::Client, AnyRecord::Client(record)));
        }
    }
    for (_, record) in data.projects.iter() {
        if record.updated_at > cutoff {
            changes.push(change_for(data, EntityKind::Project, AnyRecord::Project(record)));
        }
    }
    for (_, record) in data.tasks.iter() {
        if record.updated_at > cutoff {
            changes.push(change_for(data, EntityKind::Task, AnyRecord::Task(record)));
        }
    }
    for (_, record) in data.sessions.iter() {
        if record.updated_at > cutoff {
            changes.push(change_for(data, EntityKind::Session, AnyRecord::Session(record)));
        }
    }
    for (_, record) in data.nodes.iter() {
        if record.updated_at > cutoff {
            changes.push(change_for(data, EntityKind::Node, AnyRecord::Node(record)));
        }
    }
    for (_, record) in data.node_sessions.iter() {
        if record.updated_at > cutoff {
            changes.push(change_for(
                data,
                EntityKind::NodeSession,
                AnyRecord::NodeSession(record),
            ));
        }
    }

    changes
}

fn change_for(data: &AccountData, kind: EntityKind, record: AnyRecord<'_>) -> ChangeRecord {
    let sync = record.sync();
    let action = if sync.deleted_at().is_some() {
        ChangeAction::Delete
    } else {
        ChangeAction::Update
    };
    ChangeRecord::new(
        action,
        kind,
        sync.uuid(),
        ancestry::parent_uuid(data, record),
        payload_for(record),
    )
}

/// Externally meaningful fields only; internal row references never leak.
fn payload_for(record: AnyRecord<'_>) -> FieldMap {
    let mut data = FieldMap::new();
    match record {
        AnyRecord::Client(c) => {
            data.insert("id".into(), json!(c.uuid));
            data.insert("name".into(), json!(c.name));
        }
        AnyRecord::Project(p) => {
            data.insert("id".into(), json!(p.uuid));
            data.insert("name".into(), json!(p.name));
        }
        AnyRecord::Task(t) => {
            data.insert("id".into(), json!(t.uuid));
            data.insert("name".into(), json!(t.name));
            data.insert("status".into(), json!(t.status));
            data.insert("priority".into(), json!(t.priority.to_string()));
            data.insert("billable".into(), flag(t.billable));
            data.insert("estimate".into(), json!(t.estimate));
            data.insert("due".into(), json!(t.due));
            data.insert("starred".into(), flag(t.starred));
            data.insert("notes".into(), json!(t.notes));
        }
        AnyRecord::Session(s) => {
            data.insert("id".into(), json!(s.uuid));
            data.insert("start_time".into(), json!(s.start_time.to_string()));
            data.insert(
                "end_time".into(),
                json!(s.end_time.map(|t| t.to_string())),
            );
            data.insert("notes".into(), json!(s.notes));
        }
        AnyRecord::Node(n) => {
            data.insert("id".into(), json!(n.uuid));
            data.insert("name".into(), json!(n.name));
            data.insert("type".into(), json!(n.node_type));
            data.insert("parentId".into(), json!(n.parent_uuid));
            data.insert("childOrder".into(), json!(n.child_order));
            data.insert("collapsed".into(), json!(n.collapsed));
            if n.is_task() {
                append_node_task_fields(&mut data, n);
            }
        }
        AnyRecord::NodeSession(s) => {
            data.insert("id".into(), json!(s.uuid));
            data.insert("start_time".into(), json!(s.start_time.to_string()));
            data.insert(
                "end_time".into(),
                json!(s.end_time.map(|t| t.to_string())),
            );
            data.insert("notes".into(), json!(s.notes));
        }
    }
    data
}

fn append_node_task_fields(data: &mut FieldMap, n: &NodeRecord) {
    data.insert("status".into(), json!(n.status));
    data.insert("priority".into(), json!(n.priority.to_string()));
    data.insert("billable".into(), flag(n.billable));
    data.insert("estimate".into(), json!(n.estimate));
    data.insert("due".into(), json!(n.due));
    data.insert("starred".into(), flag(n.starred));
    data.insert("notes".into(), json!(n.notes));
}

/// Legacy clients expect flags as "1"/"0" strings.
fn flag(value: bool) -> Value {
    Value::String(if value { "1" } else { "0" }.into())
}
