//! The change applier: accepts or rejects one client mutation at a time.

use crate::{ancestry, coerce, lww};
use taakl_model::{EntityKind, Timestamp};
use taakl_store::{
    AccountData, ClientRecord, NodeRecord, NodeSessionRecord, ProjectRecord, SessionRecord,
    SyncRecord, TaskRecord,
};
use taakl_sync_protocol::{Action, FieldMap, Mutation};

/// Applies mutations against one account's data.
///
/// Every outcome is a plain accept/reject: rejections (malformed mutation,
/// duplicate identifier, unresolvable parent, stale timestamp) are counted
/// by the caller, never raised. The applier runs inside the batch
/// transaction, so mutations applied earlier in the batch are visible to
/// later conflict checks.
pub(crate) struct Applier<'a> {
    data: &'a mut AccountData,
    now: Timestamp,
}

impl<'a> Applier<'a> {
    pub fn new(data: &'a mut AccountData, now: Timestamp) -> Self {
        Self { data, now }
    }

    /// Applies one mutation. Returns whether it was accepted.
    pub fn apply(&mut self, mutation: &Mutation) -> bool {
        let (Some(action), Some(kind)) = (mutation.resolved_action(), mutation.kind()) else {
            return false;
        };
        if mutation.uuid.is_empty() {
            return false;
        }

        // The asserted time decides acceptance; stored times always advance
        // to server time on commit.
        let asserted = mutation.timestamp.unwrap_or(self.now);

        match action {
            Action::Insert => self.insert(kind, mutation),
            Action::Update => self.update(kind, mutation, asserted),
            Action::Delete => self.delete(kind, &mutation.uuid, asserted),
        }
    }

    fn insert(&mut self, kind: EntityKind, m: &Mutation) -> bool {
        let uuid = m.uuid.clone();
        match kind {
            EntityKind::Client => {
                if self.data.client_by_uuid(&uuid).is_some() {
                    return false;
                }
                let mut rec = ClientRecord::new(uuid, self.now);
                apply_client_fields(&mut rec, &m.data);
                self.data.clients.insert(rec);
                true
            }
            EntityKind::Project => {
                let Some(client) = self.resolve_insert_parent(kind, m) else {
                    return false;
                };
                if self
                    .data
                    .projects
                    .find(|p| p.uuid == uuid && p.client == client)
                    .is_some()
                {
                    return false;
                }
                let mut rec = ProjectRecord::new(uuid, client, self.now);
                apply_project_fields(&mut rec, &m.data);
                self.data.projects.insert(rec);
                true
            }
            EntityKind::Task => {
                let Some(project) = self.resolve_insert_parent(kind, m) else {
                    return false;
                };
                if self
                    .data
                    .tasks
                    .find(|t| t.uuid == uuid && t.project == project)
                    .is_some()
                {
                    return false;
                }
                let mut rec = TaskRecord::new(uuid, project, self.now);
                apply_task_fields(&mut rec, &m.data);
                self.data.tasks.insert(rec);
                true
            }
            EntityKind::Session => {
                let Some(task) = self.resolve_insert_parent(kind, m) else {
                    return false;
                };
                if self
                    .data
                    .sessions
                    .find(|s| s.uuid == uuid && s.task == task)
                    .is_some()
                {
                    return false;
                }
                let mut rec = SessionRecord::new(uuid, task, self.now);
                apply_session_fields(&mut rec, &m.data);
                self.data.sessions.insert(rec);
                true
            }
            EntityKind::Node => {
                if self.data.node_by_uuid(&uuid).is_some() {
                    return false;
                }
                // A node may be a root, but a named parent must resolve.
                if let Some(parent) = m.parent_uuid.as_deref() {
                    if ancestry::live_parent(self.data, kind, parent).is_none() {
                        return false;
                    }
                }
                let mut rec = NodeRecord::new(uuid.clone(), m.parent_uuid.clone(), self.now);
                apply_node_fields(&mut rec, &m.data);
                self.data.nodes.insert(rec);
                if m.parent_uuid.is_none() {
                    self.data.add_to_root_order(&uuid);
                }
                true
            }
            EntityKind::NodeSession => {
                let Some(node) = self.resolve_insert_parent(kind, m) else {
                    return false;
                };
                if self
                    .data
                    .node_sessions
                    .find(|s| s.uuid == uuid && s.node == node)
                    .is_some()
                {
                    return false;
                }
                let mut rec = NodeSessionRecord::new(uuid, node, self.now);
                apply_node_session_fields(&mut rec, &m.data);
                self.data.node_sessions.insert(rec);
                true
            }
        }
    }

    fn resolve_insert_parent(
        &self,
        kind: EntityKind,
        m: &Mutation,
    ) -> Option<taakl_store::RowId> {
        let parent = m.parent_uuid.as_deref()?;
        ancestry::live_parent(self.data, kind, parent)
    }

    fn update(&mut self, kind: EntityKind, m: &Mutation, asserted: Timestamp) -> bool {
        let Some(resolved) = ancestry::resolve(self.data, kind, &m.uuid) else {
            return false;
        };
        if !lww::accepts(resolved.record.sync(), asserted) {
            return false;
        }
        let row = resolved.row;
        let now = self.now;

        match kind {
            EntityKind::Client => {
                let Some(rec) = self.data.clients.get_mut(row) else {
                    return false;
                };
                // An accepted write overrides an older delete.
                rec.deleted_at = None;
                apply_client_fields(rec, &m.data);
                apply_deleted_flag(rec, &m.data, asserted);
                rec.updated_at = now;
            }
            EntityKind::Project => {
                let Some(rec) = self.data.projects.get_mut(row) else {
                    return false;
                };
                rec.deleted_at = None;
                apply_project_fields(rec, &m.data);
                rec.updated_at = now;
            }
            EntityKind::Task => {
                let Some(rec) = self.data.tasks.get_mut(row) else {
                    return false;
                };
                rec.deleted_at = None;
                apply_task_fields(rec, &m.data);
                rec.updated_at = now;
            }
            EntityKind::Session => {
                let Some(rec) = self.data.sessions.get_mut(row) else {
                    return false;
                };
                rec.deleted_at = None;
                apply_session_fields(rec, &m.data);
                rec.updated_at = now;
            }
            EntityKind::Node => {
                let Some(rec) = self.data.nodes.get_mut(row) else {
                    return false;
                };
                rec.deleted_at = None;
                apply_node_fields(rec, &m.data);
                if let Some(parent) = m.data.get("parentId").and_then(coerce::as_nonempty_string)
                {
                    rec.parent_uuid = Some(parent);
                }
                rec.updated_at = now;
            }
            EntityKind::NodeSession => {
                let Some(rec) = self.data.node_sessions.get_mut(row) else {
                    return false;
                };
                rec.deleted_at = None;
                apply_node_session_fields(rec, &m.data);
                rec.updated_at = now;
            }
        }
        true
    }

    fn delete(&mut self, kind: EntityKind, uuid: &str, asserted: Timestamp) -> bool {
        let Some(resolved) = ancestry::resolve(self.data, kind, uuid) else {
            return false;
        };
        if !lww::accepts(resolved.record.sync(), asserted) {
            return false;
        }
        let row = resolved.row;
        let now = self.now;
        ancestry::with_record_mut(self.data, kind, row, |rec| {
            rec.set_deleted_at(Some(asserted));
            rec.touch(now);
        })
        .is_some()
    }
}

fn apply_client_fields(rec: &mut ClientRecord, data: &FieldMap) {
    if let Some(name) = data.get("name").and_then(coerce::as_string) {
        rec.name = name;
    }
    if let Some(blob) = data.get("meta").and_then(coerce::as_blob) {
        rec.meta = Some(blob);
    }
}

/// Clients may carry an explicit `deleted` flag in update payloads; it
/// sets or clears the tombstone directly at the asserted time.
fn apply_deleted_flag(rec: &mut ClientRecord, data: &FieldMap, asserted: Timestamp) {
    if let Some(flag) = data.get("deleted").and_then(coerce::as_bool) {
        rec.deleted_at = flag.then_some(asserted);
    }
}

fn apply_project_fields(rec: &mut ProjectRecord, data: &FieldMap) {
    if let Some(name) = data.get("name").and_then(coerce::as_string) {
        rec.name = name;
    }
    if let Some(blob) = data.get("meta").and_then(coerce::as_blob) {
        rec.meta = Some(blob);
    }
}

fn apply_task_fields(rec: &mut TaskRecord, data: &FieldMap) {
    if let Some(name) = data.get("name").and_then(coerce::as_string) {
        rec.name = name;
    }
    if let Some(status) = data.get("status").and_then(coerce::as_string) {
        rec.status = status;
    }
    if let Some(priority) = data.get("priority").and_then(coerce::as_i64) {
        rec.priority = priority;
    }
    if let Some(billable) = data.get("billable").and_then(coerce::as_bool) {
        rec.billable = billable;
    }
    if let Some(estimate) = data.get("estimate").and_then(coerce::as_f64) {
        rec.estimate = Some(estimate);
    }
    if let Some(due) = data.get("due").and_then(coerce::as_string) {
        rec.due = Some(due);
    }
    if let Some(starred) = data.get("starred").and_then(coerce::as_bool) {
        rec.starred = starred;
    }
    if let Some(notes) = data.get("notes").and_then(coerce::as_string) {
        rec.notes = Some(notes);
    }
    if let Some(blob) = data.get("meta").and_then(coerce::as_blob) {
        rec.meta = Some(blob);
    }
}

fn apply_session_fields(rec: &mut SessionRecord, data: &FieldMap) {
    if let Some(start) = data.get("start_time").and_then(coerce::as_timestamp) {
        rec.start_time = start;
    }
    if let Some(end) = data.get("end_time").and_then(coerce::as_timestamp) {
        rec.end_time = Some(end);
    }
    if let Some(notes) = data.get("notes").and_then(coerce::as_string) {
        rec.notes = Some(notes);
    }
    if let Some(blob) = data.get("meta").and_then(coerce::as_blob) {
        rec.meta = Some(blob);
    }
}

fn apply_node_session_fields(rec: &mut NodeSessionRecord, data: &FieldMap) {
    if let Some(start) = data.get("start_time").and_then(coerce::as_timestamp) {
        rec.start_time = start;
    }
    if let Some(end) = data.get("end_time").and_then(coerce::as_timestamp) {
        rec.end_time = Some(end);
    }
    if let Some(notes) = data.get("notes").and_then(coerce::as_string) {
        rec.notes = Some(notes);
    }
    if let Some(blob) = data.get("meta").and_then(coerce::as_blob) {
        rec.meta = Some(blob);
    }
}

fn apply_node_fields(rec: &mut NodeRecord, data: &FieldMap) {
    if let Some(name) = data.get("name").and_then(coerce::as_string) {
        rec.name = name;
    }
    if let Some(node_type) = data.get("type").and_then(coerce::as_string) {
        rec.node_type = node_type;
    }
    if let Some(order) = data.get("childOrder").and_then(coerce::as_string_list) {
        rec.child_order = order;
    }
    if let Some(collapsed) = data.get("collapsed").and_then(coerce::as_bool) {
        rec.collapsed = collapsed;
    }
    if let Some(status) = data.get("status").and_then(coerce::as_string) {
        rec.status = status;
    }
    if let Some(priority) = data.get("priority").and_then(coerce::as_i64) {
        rec.priority = priority;
    }
    if let Some(billable) = data.get("billable").and_then(coerce::as_bool) {
        rec.billable = billable;
    }
    if let Some(estimate) = data.get("estimate").and_then(coerce::as_f64) {
        rec.estimate = Some(estimate);
    }
    if let Some(value) = data.get("due") {
        if !value.is_null() {
            // An empty due string clears the date.
            rec.due = coerce::as_nonempty_string(value);
        }
    }
    if let Some(starred) = data.get("starred").and_then(coerce::as_bool) {
        rec.starred = starred;
    }
    if let Some(notes) = data.get("notes").and_then(coerce::as_string) {
        rec.notes = Some(notes);
    }
    if let Some(blob) = data.get("meta").and_then(coerce::as_blob) {
        rec.meta = Some(blob);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    fn apply_all(data: &mut AccountData, now: Timestamp, mutations: &[Mutation]) -> Vec<bool> {
        let mut applier = Applier::new(data, now);
        mutations.iter().map(|m| applier.apply(m)).collect()
    }

    fn seeded_client_project(data: &mut AccountData, now: Timestamp) {
        let accepted = apply_all(
            data,
            now,
            &[
                Mutation::insert(EntityKind::Client, "c1").with_field("name", "Acme"),
                Mutation::insert(EntityKind::Project, "p1")
                    .with_parent("c1")
                    .with_field("name", "Website"),
            ],
        );
        assert_eq!(accepted, [true, true]);
    }

    #[test]
    fn malformed_mutations_are_rejected_without_touching_the_store() {
        let mut data = AccountData::default();
        let now = Timestamp::now();
        let rejected = apply_all(
            &mut data,
            now,
            &[
                Mutation::default(),
                Mutation {
                    action: "upsert".into(),
                    entity_type: "client".into(),
                    uuid: "c1".into(),
                    ..Mutation::default()
                },
                Mutation {
                    action: "insert".into(),
                    entity_type: "widget".into(),
                    uuid: "w1".into(),
                    ..Mutation::default()
                },
                Mutation::insert(EntityKind::Client, ""),
            ],
        );
        assert_eq!(rejected, [false, false, false, false]);
        assert!(data.clients.is_empty());
    }

    #[test]
    fn duplicate_insert_is_rejected_and_store_unchanged() {
        let mut data = AccountData::default();
        let now = Timestamp::now();
        seeded_client_project(&mut data, now);

        let rejected = apply_all(
            &mut data,
            now,
            &[Mutation::insert(EntityKind::Client, "c1").with_field("name", "Other")],
        );
        assert_eq!(rejected, [false]);
        assert_eq!(data.clients.len(), 1);
        assert_eq!(data.client_by_uuid("c1").unwrap().1.name, "Acme");
    }

    #[test]
    fn insert_requires_resolvable_live_parent() {
        let mut data = AccountData::default();
        let now = Timestamp::now();

        // No parent given, parent unknown, then a deleted parent.
        let results = apply_all(
            &mut data,
            now,
            &[
                Mutation::insert(EntityKind::Project, "p1"),
                Mutation::insert(EntityKind::Project, "p1").with_parent("ghost"),
                Mutation::insert(EntityKind::Client, "c1"),
                Mutation::delete(EntityKind::Client, "c1", now),
                Mutation::insert(EntityKind::Project, "p1").with_parent("c1"),
            ],
        );
        assert_eq!(results, [false, false, true, true, false]);
        assert!(data.projects.is_empty());
    }

    #[test]
    fn task_insert_fills_defaults() {
        let mut data = AccountData::default();
        let now = Timestamp::now();
        seeded_client_project(&mut data, now);
        apply_all(
            &mut data,
            now,
            &[Mutation::insert(EntityKind::Task, "t1").with_parent("p1")],
        );

        let (_, task) = data.task_by_uuid("t1").unwrap();
        assert_eq!(task.name, "Unnamed Task");
        assert_eq!(task.status, "new");
        assert_eq!(task.priority, 1);
        assert!(task.billable);
    }

    #[test]
    fn update_applies_only_present_fields() {
        let mut data = AccountData::default();
        let now = Timestamp::now();
        seeded_client_project(&mut data, now);
        apply_all(
            &mut data,
            now,
            &[Mutation::insert(EntityKind::Task, "t1")
                .with_parent("p1")
                .with_field("name", "Ship")
                .with_field("priority", 2)],
        );

        let accepted = apply_all(
            &mut data,
            now,
            &[Mutation::update(EntityKind::Task, "t1").with_field("status", "done")],
        );
        assert_eq!(accepted, [true]);

        let (_, task) = data.task_by_uuid("t1").unwrap();
        assert_eq!(task.status, "done");
        assert_eq!(task.name, "Ship");
        assert_eq!(task.priority, 2);
    }

    #[test]
    fn stale_update_is_rejected_and_record_unchanged() {
        let mut data = AccountData::default();
        let now = ts("2024-03-01 12:00:00");
        seeded_client_project(&mut data, now);

        let rejected = apply_all(
            &mut data,
            ts("2024-03-01 12:00:05"),
            &[Mutation::update(EntityKind::Client, "c1")
                .with_timestamp(ts("2024-03-01 11:00:00"))
                .with_field("name", "Stale")],
        );
        assert_eq!(rejected, [false]);
        assert_eq!(data.client_by_uuid("c1").unwrap().1.name, "Acme");
    }

    #[test]
    fn equal_timestamps_go_to_the_incoming_update() {
        let mut data = AccountData::default();
        let now = ts("2024-03-01 12:00:00");
        seeded_client_project(&mut data, now);

        let accepted = apply_all(
            &mut data,
            ts("2024-03-01 12:00:05"),
            &[Mutation::update(EntityKind::Client, "c1")
                .with_timestamp(now)
                .with_field("name", "Tied")],
        );
        assert_eq!(accepted, [true]);
        assert_eq!(data.client_by_uuid("c1").unwrap().1.name, "Tied");
    }

    #[test]
    fn accepted_mutations_advance_updated_at_to_server_time() {
        let mut data = AccountData::default();
        let inserted_at = ts("2024-03-01 12:00:00");
        seeded_client_project(&mut data, inserted_at);

        let processed_at = ts("2024-03-02 09:00:00");
        apply_all(
            &mut data,
            processed_at,
            &[Mutation::update(EntityKind::Client, "c1")
                .with_timestamp(ts("2024-03-01 18:00:00"))
                .with_field("name", "Renamed")],
        );
        // The asserted time won the conflict check but is not stored.
        assert_eq!(data.client_by_uuid("c1").unwrap().1.updated_at, processed_at);
    }

    #[test]
    fn update_older_than_tombstone_is_rejected() {
        let mut data = AccountData::default();
        let now = ts("2024-03-01 12:00:00");
        apply_all(
            &mut data,
            now,
            &[Mutation::insert(EntityKind::Node, "n1").with_field("name", "Inbox")],
        );

        let t1 = ts("2024-03-01 13:00:00");
        let t0 = ts("2024-03-01 12:30:00");
        let results = apply_all(
            &mut data,
            ts("2024-03-01 14:00:00"),
            &[
                Mutation::delete(EntityKind::Node, "n1", t1),
                Mutation::update(EntityKind::Node, "n1")
                    .with_timestamp(t0)
                    .with_field("name", "Resurrected"),
            ],
        );
        assert_eq!(results, [true, false]);

        let (_, node) = data.node_by_uuid("n1").unwrap();
        assert!(node.deleted_at.is_some());
        assert_eq!(node.name, "Inbox");
    }

    #[test]
    fn update_at_or_after_tombstone_resurrects() {
        let mut data = AccountData::default();
        let now = ts("2024-03-01 12:00:00");
        apply_all(
            &mut data,
            now,
            &[Mutation::insert(EntityKind::Node, "n1")],
        );

        let t1 = ts("2024-03-01 13:00:00");
        let results = apply_all(
            &mut data,
            ts("2024-03-01 14:00:00"),
            &[
                Mutation::delete(EntityKind::Node, "n1", t1),
                Mutation::update(EntityKind::Node, "n1")
                    .with_timestamp(t1)
                    .with_field("name", "Back"),
            ],
        );
        assert_eq!(results, [true, true]);

        let (_, node) = data.node_by_uuid("n1").unwrap();
        assert!(node.deleted_at.is_none());
        assert_eq!(node.name, "Back");
    }

    #[test]
    fn delete_is_idempotent_for_non_older_timestamps() {
        let mut data = AccountData::default();
        let now = ts("2024-03-01 12:00:00");
        seeded_client_project(&mut data, now);

        let t1 = ts("2024-03-01 13:00:00");
        let t2 = ts("2024-03-01 13:30:00");
        let results = apply_all(
            &mut data,
            ts("2024-03-01 14:00:00"),
            &[
                Mutation::delete(EntityKind::Client, "c1", t1),
                Mutation::delete(EntityKind::Client, "c1", t2),
                Mutation::delete(EntityKind::Client, "c1", ts("2024-03-01 12:59:00")),
            ],
        );
        assert_eq!(results, [true, true, false]);
        assert_eq!(
            data.client_by_uuid("c1").unwrap().1.deleted_at,
            Some(t2)
        );
    }

    #[test]
    fn delete_of_unknown_record_is_rejected() {
        let mut data = AccountData::default();
        let results = apply_all(
            &mut data,
            Timestamp::now(),
            &[Mutation::delete(EntityKind::Task, "ghost", Timestamp::now())],
        );
        assert_eq!(results, [false]);
    }

    #[test]
    fn root_node_insert_appends_to_root_order_once() {
        let mut data = AccountData::default();
        let now = Timestamp::now();
        data.add_to_root_order("n1");

        let results = apply_all(
            &mut data,
            now,
            &[
                Mutation::insert(EntityKind::Node, "n1"),
                Mutation::insert(EntityKind::Node, "n2"),
                Mutation::insert(EntityKind::Node, "n3").with_parent("n1"),
            ],
        );
        assert_eq!(results, [true, true, true]);
        assert_eq!(data.meta.root_order, ["n1", "n2"]);
    }

    #[test]
    fn node_insert_under_unknown_parent_is_rejected() {
        let mut data = AccountData::default();
        let results = apply_all(
            &mut data,
            Timestamp::now(),
            &[Mutation::insert(EntityKind::Node, "n1").with_parent("ghost")],
        );
        assert_eq!(results, [false]);
        assert!(data.nodes.is_empty());
    }

    #[test]
    fn client_deleted_flag_sets_and_clears_the_marker() {
        let mut data = AccountData::default();
        let now = ts("2024-03-01 12:00:00");
        seeded_client_project(&mut data, now);

        let later = ts("2024-03-01 13:00:00");
        apply_all(
            &mut data,
            later,
            &[Mutation::update(EntityKind::Client, "c1")
                .with_timestamp(later)
                .with_field("deleted", true)],
        );
        assert_eq!(data.client_by_uuid("c1").unwrap().1.deleted_at, Some(later));

        let even_later = ts("2024-03-01 14:00:00");
        apply_all(
            &mut data,
            even_later,
            &[Mutation::update(EntityKind::Client, "c1")
                .with_timestamp(even_later)
                .with_field("deleted", false)],
        );
        assert!(data.client_by_uuid("c1").unwrap().1.deleted_at.is_none());
    }

    #[test]
    fn same_batch_insert_is_visible_to_later_updates() {
        let mut data = AccountData::default();
        let now = Timestamp::now();
        let results = apply_all(
            &mut data,
            now,
            &[
                Mutation::insert(EntityKind::Client, "c1"),
                Mutation::update(EntityKind::Client, "c1").with_field("name", "Filled in"),
            ],
        );
        assert_eq!(results, [true, true]);
        assert_eq!(data.client_by_uuid("c1").unwrap().1.name, "Filled in");
    }

    #[test]
    fn node_payload_fields_apply_with_legacy_typing() {
        let mut data = AccountData::default();
        let now = Timestamp::now();
        apply_all(
            &mut data,
            now,
            &[Mutation::insert(EntityKind::Node, "n1")
                .with_field("name", "Build")
                .with_field("type", "task")
                .with_field("priority", json!("5"))
                .with_field("billable", json!("0"))
                .with_field("childOrder", json!(["a", "b"]))
                .with_field("due", "")],
        );

        let (_, node) = data.node_by_uuid("n1").unwrap();
        assert_eq!(node.priority, 5);
        assert!(!node.billable);
        assert_eq!(node.child_order, ["a", "b"]);
        assert_eq!(node.due, None);
    }
}
