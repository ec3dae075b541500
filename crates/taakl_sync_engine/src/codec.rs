//! The full-tree codec: whole-account export and upsert-based import.
//!
//! Export walks the store into the nested legacy tree and the flat node
//! map side by side. Import is additive and convergent: upsert by
//! identifier, never hard-delete, resurrect on every upsert. Both shapes
//! may arrive in one snapshot and are processed parents-first so children
//! can resolve.

use crate::{ancestry, coerce, settings};
use serde_json::Value;
use std::collections::BTreeMap;
use taakl_model::{EntityKind, Timestamp};
use taakl_store::{
    AccountData, ClientRecord, NodeRecord, NodeSessionRecord, ProjectRecord, SessionRecord,
    TaskRecord,
};
use taakl_sync_protocol::{
    ClientTree, ImportStats, NodeEntry, NodeTaskFields, ProjectTree, SessionEntry, Snapshot,
    TaskTree,
};

/// Legacy clients expect flags as "1"/"0" strings.
fn flag_str(value: bool) -> String {
    if value { "1" } else { "0" }.to_string()
}

// ---- export ----

/// Produces one self-contained snapshot of the account's live records.
pub(crate) fn export_full(data: &AccountData, user_key: &str) -> Snapshot {
    let mut snapshot = Snapshot {
        data_version: data.meta.data_version,
        user_key: user_key.to_string(),
        root_order: data.meta.root_order.clone(),
        settings: settings::get_settings(data),
        ..Snapshot::default()
    };

    for (client_row, client) in data.clients.iter() {
        if client.deleted_at.is_some() {
            continue;
        }
        let mut client_tree = ClientTree {
            id: client.uuid.clone(),
            name: client.name.clone(),
            projects: BTreeMap::new(),
        };

        for (project_row, project) in data.projects.iter() {
            if project.client != client_row || project.deleted_at.is_some() {
                continue;
            }
            let mut project_tree = ProjectTree {
                id: project.uuid.clone(),
                name: project.name.clone(),
                tasks: BTreeMap::new(),
            };

            for (task_row, task) in data.tasks.iter() {
                if task.project != project_row || task.deleted_at.is_some() {
                    continue;
                }
                let mut task_tree = TaskTree {
                    id: task.uuid.clone(),
                    name: task.name.clone(),
                    status: task.status.clone(),
                    priority: task.priority.to_string(),
                    billable: flag_str(task.billable),
                    estimate: task.estimate,
                    due: task.due.clone(),
                    starred: flag_str(task.starred),
                    notes: task.notes.clone(),
                    sessions: BTreeMap::new(),
                };

                for (_, session) in data.sessions.iter() {
                    if session.task != task_row || session.deleted_at.is_some() {
                        continue;
                    }
                    task_tree
                        .sessions
                        .insert(session.uuid.clone(), session_entry_for(session));
                }
                project_tree.tasks.insert(task.uuid.clone(), task_tree);
            }
            client_tree
                .projects
                .insert(project.uuid.clone(), project_tree);
        }
        snapshot.clients.insert(client.uuid.clone(), client_tree);
    }

    for (node_row, node) in data.nodes.iter() {
        if node.deleted_at.is_some() {
            continue;
        }
        let task = node.is_task().then(|| {
            let mut fields = NodeTaskFields {
                status: node.status.clone(),
                priority: node.priority.to_string(),
                billable: flag_str(node.billable),
                estimate: node.estimate,
                due: node.due.clone(),
                starred: flag_str(node.starred),
                notes: node.notes.clone(),
                sessions: BTreeMap::new(),
            };
            for (_, session) in data.node_sessions.iter() {
                if session.node != node_row || session.deleted_at.is_some() {
                    continue;
                }
                fields.sessions.insert(
                    session.uuid.clone(),
                    SessionEntry {
                        id: session.uuid.clone(),
                        start_time: session.start_time.to_string(),
                        end_time: session.end_time.map(|t| t.to_string()),
                        notes: session.notes.clone(),
                    },
                );
            }
            fields
        });

        snapshot.nodes.insert(
            node.uuid.clone(),
            NodeEntry {
                id: node.uuid.clone(),
                name: node.name.clone(),
                node_type: node.node_type.clone(),
                parent_id: node.parent_uuid.clone(),
                child_order: node.child_order.clone(),
                collapsed: node.collapsed,
                task,
            },
        );
    }

    snapshot
}

fn session_entry_for(session: &SessionRecord) -> SessionEntry {
    SessionEntry {
        id: session.uuid.clone(),
        start_time: session.start_time.to_string(),
        end_time: session.end_time.map(|t| t.to_string()),
        notes: session.notes.clone(),
    }
}

// ---- import ----

/// Imports a snapshot in either or both shapes, returning per-type counts
/// of records processed (children skipped for an unresolvable parent are
/// still counted).
pub(crate) fn import_full(data: &mut AccountData, payload: &Value, now: Timestamp) -> ImportStats {
    let mut stats = ImportStats::default();

    if let Some(clients) = payload.get("clients").and_then(Value::as_object) {
        for (client_uuid, client_data) in clients {
            upsert_client(data, client_uuid, client_data, now);
            stats.clients += 1;

            let projects = client_data.get("projects").and_then(Value::as_object);
            for (project_uuid, project_data) in projects.into_iter().flatten() {
                upsert_project(data, project_uuid, project_data, client_uuid, now);
                stats.projects += 1;

                let tasks = project_data.get("tasks").and_then(Value::as_object);
                for (task_uuid, task_data) in tasks.into_iter().flatten() {
                    upsert_task(data, task_uuid, task_data, project_uuid, now);
                    stats.tasks += 1;

                    let sessions = task_data.get("sessions").and_then(Value::as_object);
                    for (session_uuid, session_data) in sessions.into_iter().flatten() {
                        upsert_session(data, session_uuid, session_data, task_uuid, now);
                        stats.sessions += 1;
                    }
                }
            }
        }
    }

    if let Some(nodes) = payload.get("nodes").and_then(Value::as_object) {
        for (node_uuid, node_data) in nodes {
            upsert_node(data, node_uuid, node_data, now);
            stats.nodes += 1;

            let sessions = node_data.get("sessions").and_then(Value::as_object);
            for (session_uuid, session_data) in sessions.into_iter().flatten() {
                upsert_node_session(data, session_uuid, session_data, node_uuid, now);
                stats.node_sessions += 1;
            }
        }
    }

    data.meta.data_version = payload
        .get("dataVersion")
        .and_then(coerce::as_i64)
        .unwrap_or(2);
    data.meta.root_order = payload
        .get("rootOrder")
        .and_then(coerce::as_string_list)
        .unwrap_or_default();

    if let Some(incoming) = payload.get("settings").and_then(Value::as_object) {
        let map: BTreeMap<String, Value> = incoming
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        settings::save_settings(data, &map);
    }

    stats
}

fn upsert_client(data: &mut AccountData, uuid: &str, value: &Value, now: Timestamp) {
    let name = value
        .get("name")
        .and_then(coerce::as_string)
        .unwrap_or_else(|| "Unnamed Client".into());

    let existing = data.client_by_uuid(uuid).map(|(row, _)| row);
    let row = existing.unwrap_or_else(|| data.clients.insert(ClientRecord::new(uuid.into(), now)));
    if let Some(rec) = data.clients.get_mut(row) {
        rec.name = name;
        rec.deleted_at = None;
        rec.updated_at = now;
    }
}

fn upsert_project(
    data: &mut AccountData,
    uuid: &str,
    value: &Value,
    client_uuid: &str,
    now: Timestamp,
) {
    let Some(client) = ancestry::live_parent(data, EntityKind::Project, client_uuid) else {
        return;
    };
    let name = value
        .get("name")
        .and_then(coerce::as_string)
        .unwrap_or_else(|| "Unnamed Project".into());

    let existing = data
        .projects
        .find(|p| p.uuid == uuid && p.client == client)
        .map(|(row, _)| row);
    let row = existing
        .unwrap_or_else(|| data.projects.insert(ProjectRecord::new(uuid.into(), client, now)));
    if let Some(rec) = data.projects.get_mut(row) {
        rec.name = name;
        rec.deleted_at = None;
        rec.updated_at = now;
    }
}

fn upsert_task(
    data: &mut AccountData,
    uuid: &str,
    value: &Value,
    project_uuid: &str,
    now: Timestamp,
) {
    let Some(project) = ancestry::live_parent(data, EntityKind::Task, project_uuid) else {
        return;
    };

    let existing = data
        .tasks
        .find(|t| t.uuid == uuid && t.project == project)
        .map(|(row, _)| row);
    let row = existing
        .unwrap_or_else(|| data.tasks.insert(TaskRecord::new(uuid.into(), project, now)));
    if let Some(rec) = data.tasks.get_mut(row) {
        rec.name = value
            .get("name")
            .and_then(coerce::as_string)
            .unwrap_or_else(|| "Unnamed Task".into());
        rec.status = value
            .get("status")
            .and_then(coerce::as_string)
            .unwrap_or_else(|| "new".into());
        rec.priority = value.get("priority").and_then(coerce::as_i64).unwrap_or(1);
        rec.billable = value
            .get("billable")
            .and_then(coerce::as_bool)
            .unwrap_or(true);
        rec.estimate = value.get("estimate").and_then(coerce::as_f64);
        rec.due = value.get("due").and_then(coerce::as_string);
        rec.starred = value
            .get("starred")
            .and_then(coerce::as_bool)
            .unwrap_or(false);
        rec.notes = value.get("notes").and_then(coerce::as_string);
        rec.deleted_at = None;
        rec.updated_at = now;
    }
}

fn upsert_session(
    data: &mut AccountData,
    uuid: &str,
    value: &Value,
    task_uuid: &str,
    now: Timestamp,
) {
    let Some(task) = ancestry::live_parent(data, EntityKind::Session, task_uuid) else {
        return;
    };

    let existing = data
        .sessions
        .find(|s| s.uuid == uuid && s.task == task)
        .map(|(row, _)| row);
    let row = existing
        .unwrap_or_else(|| data.sessions.insert(SessionRecord::new(uuid.into(), task, now)));
    if let Some(rec) = data.sessions.get_mut(row) {
        rec.start_time = value
            .get("start_time")
            .and_then(coerce::as_timestamp)
            .unwrap_or(now);
        rec.end_time = value.get("end_time").and_then(coerce::as_timestamp);
        rec.notes = value.get("notes").and_then(coerce::as_string);
        rec.deleted_at = None;
        rec.updated_at = now;
    }
}

fn upsert_node(data: &mut AccountData, uuid: &str, value: &Value, now: Timestamp) {
    let existing = data.node_by_uuid(uuid).map(|(row, _)| row);
    let row =
        existing.unwrap_or_else(|| data.nodes.insert(NodeRecord::new(uuid.into(), None, now)));
    if let Some(rec) = data.nodes.get_mut(row) {
        rec.name = value
            .get("name")
            .and_then(coerce::as_string)
            .unwrap_or_else(|| "Unnamed".into());
        rec.node_type = value
            .get("type")
            .and_then(coerce::as_string)
            .unwrap_or_else(|| "task".into());
        rec.parent_uuid = value.get("parentId").and_then(coerce::as_string);
        rec.child_order = value
            .get("childOrder")
            .and_then(coerce::as_string_list)
            .unwrap_or_default();
        rec.collapsed = value
            .get("collapsed")
            .and_then(coerce::as_bool)
            .unwrap_or(false);
        rec.status = value
            .get("status")
            .and_then(coerce::as_string)
            .unwrap_or_else(|| "new".into());
        rec.priority = value.get("priority").and_then(coerce::as_i64).unwrap_or(3);
        rec.billable = value
            .get("billable")
            .and_then(coerce::as_bool)
            .unwrap_or(true);
        rec.estimate = value.get("estimate").and_then(coerce::as_f64);
        rec.due = value
            .get("due")
            .map(coerce::as_nonempty_string)
            .unwrap_or(None);
        rec.starred = value
            .get("starred")
            .and_then(coerce::as_bool)
            .unwrap_or(false);
        rec.notes = value.get("notes").and_then(coerce::as_string);
        rec.deleted_at = None;
        rec.updated_at = now;
    }
}

fn upsert_node_session(
    data: &mut AccountData,
    uuid: &str,
    value: &Value,
    node_uuid: &str,
    now: Timestamp,
) {
    let Some(node) = ancestry::live_parent(data, EntityKind::NodeSession, node_uuid) else {
        return;
    };

    let existing = data
        .node_sessions
        .find(|s| s.uuid == uuid && s.node == node)
        .map(|(row, _)| row);
    let row = existing.unwrap_or_else(|| {
        data.node_sessions
            .insert(NodeSessionRecord::new(uuid.into(), node, now))
    });
    if let Some(rec) = data.node_sessions.get_mut(row) {
        rec.start_time = value
            .get("start_time")
            .and_then(coerce::as_timestamp)
            .unwrap_or(now);
        rec.end_time = value.get("end_time").and_then(coerce::as_timestamp);
        rec.notes = value.get("notes").and_then(coerce::as_string);
        rec.deleted_at = None;
        rec.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    fn sample_payload() -> Value {
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
                                    "name": "Ship",
                                    "status": "active",
                                    "priority": "2",
                                    "billable": "1",
                                    "starred": "0",
                                    "sessions": {
                                        "s1": {
                                            "id": "s1",
                                            "start_time": "2024-03-01 09:00:00",
                                            "end_time": "2024-03-01 10:30:00"
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
                    "priority": "5",
                    "billable": "0",
                    "starred": "1",
                    "sessions": {
                        "ns1": {"id": "ns1", "start_time": "2024-03-02 08:00:00"}
                    }
                }
            },
            "rootOrder": ["n1"],
            "settings": {"theme": "dark"}
        })
    }

    #[test]
    fn import_builds_both_trees_and_counts() {
        let mut data = AccountData::default();
        let stats = import_full(&mut data, &sample_payload(), ts("2024-03-05 12:00:00"));

        assert_eq!(stats.clients, 1);
        assert_eq!(stats.projects, 1);
        assert_eq!(stats.tasks, 1);
        assert_eq!(stats.sessions, 1);
        assert_eq!(stats.nodes, 2);
        assert_eq!(stats.node_sessions, 1);
        assert_eq!(stats.total(), 7);

        let (_, task) = data.task_by_uuid("t1").unwrap();
        assert_eq!(task.status, "active");
        assert_eq!(task.priority, 2);

        let (_, node) = data.node_by_uuid("n2").unwrap();
        assert_eq!(node.parent_uuid.as_deref(), Some("n1"));
        assert_eq!(node.priority, 5);
        assert!(!node.billable);

        assert_eq!(data.meta.root_order, ["n1"]);
        assert_eq!(data.settings["theme"], "dark");
    }

    #[test]
    fn import_resurrects_deleted_records() {
        let mut data = AccountData::default();
        import_full(&mut data, &sample_payload(), ts("2024-03-05 12:00:00"));

        let (row, _) = data.client_by_uuid("c1").unwrap();
        data.clients.get_mut(row).unwrap().deleted_at = Some(ts("2024-03-06 09:00:00"));

        import_full(&mut data, &sample_payload(), ts("2024-03-07 12:00:00"));
        assert!(data.client_by_uuid("c1").unwrap().1.deleted_at.is_none());
    }

    #[test]
    fn import_never_duplicates() {
        let mut data = AccountData::default();
        import_full(&mut data, &sample_payload(), ts("2024-03-05 12:00:00"));
        import_full(&mut data, &sample_payload(), ts("2024-03-06 12:00:00"));

        assert_eq!(data.clients.len(), 1);
        assert_eq!(data.projects.len(), 1);
        assert_eq!(data.tasks.len(), 1);
        assert_eq!(data.sessions.len(), 1);
        assert_eq!(data.nodes.len(), 2);
        assert_eq!(data.node_sessions.len(), 1);
    }

    #[test]
    fn orphan_children_are_skipped() {
        let mut data = AccountData::default();
        let now = ts("2024-03-05 12:00:00");

        upsert_project(&mut data, "p9", &json!({"name": "Orphan"}), "ghost", now);
        assert!(data.project_by_uuid("p9").is_none());

        // A soft-deleted owner does not resolve as a parent either.
        import_full(&mut data, &sample_payload(), now);
        let (row, _) = data.client_by_uuid("c1").unwrap();
        data.clients.get_mut(row).unwrap().deleted_at = Some(ts("2024-03-06 09:00:00"));
        upsert_project(&mut data, "p2", &json!({"name": "Late"}), "c1", now);
        assert!(data.project_by_uuid("p2").is_none());
    }

    #[test]
    fn import_counts_tally_processed_records() {
        let mut data = AccountData::default();
        let (stats_direct, stats_skipped) = {
            let payload = json!({
                "clients": {
                    "c1": {
                        "name": "Acme",
                        "projects": {"p1": {"name": "Website"}}
                    }
                }
            });
            let direct = import_full(&mut data, &payload, ts("2024-03-05 12:00:00"));

            // Same shape again: every record walked counts as processed,
            // whether it landed as an insert or an overwrite.
            let again = import_full(&mut data, &payload, ts("2024-03-05 13:00:00"));
            (direct, again)
        };
        assert_eq!(stats_direct.projects, 1);
        assert_eq!(stats_skipped.projects, 1);
        assert_eq!(data.projects.len(), 1);
    }

    #[test]
    fn export_skips_deleted_at_every_level() {
        let mut data = AccountData::default();
        import_full(&mut data, &sample_payload(), ts("2024-03-05 12:00:00"));

        let (row, _) = data.task_by_uuid("t1").unwrap();
        data.tasks.get_mut(row).unwrap().deleted_at = Some(ts("2024-03-06 09:00:00"));

        let snapshot = export_full(&data, "key-1");
        assert_eq!(snapshot.user_key, "key-1");
        let client = &snapshot.clients["c1"];
        assert!(client.projects["p1"].tasks.is_empty());
        assert_eq!(snapshot.nodes.len(), 2);
    }

    #[test]
    fn export_renders_legacy_string_typing() {
        let mut data = AccountData::default();
        import_full(&mut data, &sample_payload(), ts("2024-03-05 12:00:00"));

        let snapshot = export_full(&data, "key-1");
        let task = &snapshot.clients["c1"].projects["p1"].tasks["t1"];
        assert_eq!(task.priority, "2");
        assert_eq!(task.billable, "1");
        assert_eq!(task.starred, "0");

        let group = &snapshot.nodes["n1"];
        assert!(group.task.is_none());
        let node = &snapshot.nodes["n2"];
        let fields = node.task.as_ref().unwrap();
        assert_eq!(fields.priority, "5");
        assert_eq!(fields.billable, "0");
        assert_eq!(fields.sessions["ns1"].start_time, "2024-03-02 08:00:00");
    }

    #[test]
    fn import_of_export_is_idempotent() {
        let mut data = AccountData::default();
        import_full(&mut data, &sample_payload(), ts("2024-03-05 12:00:00"));

        let exported = export_full(&data, "key-1");
        let as_value = serde_json::to_value(&exported).unwrap();

        let mut second = AccountData::default();
        import_full(&mut second, &as_value, ts("2024-03-06 12:00:00"));
        import_full(&mut second, &as_value, ts("2024-03-07 12:00:00"));

        assert_eq!(second.clients.len(), data.clients.len());
        assert_eq!(second.tasks.len(), data.tasks.len());
        assert_eq!(second.nodes.len(), data.nodes.len());
        assert_eq!(second.node_sessions.len(), data.node_sessions.len());

        let reexported = export_full(&second, "key-1");
        assert_eq!(
            serde_json::to_value(&reexported).unwrap(),
            serde_json::to_value(&exported).unwrap()
        );
    }
}
