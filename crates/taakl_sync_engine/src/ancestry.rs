//! Ownership-chain resolution.
//!
//! Every child entity is addressed on the wire by (kind, identifier) and
//! owns its place in the tree through internal row references. This module
//! is the one place those chains are walked: the applier resolves records
//! and parents through it, the collector resolves parent identifiers
//! through it.

use taakl_model::EntityKind;
use taakl_store::{
    AccountData, ClientRecord, NodeRecord, NodeSessionRecord, ProjectRecord, RowId, SessionRecord,
    SyncRecord, TaskRecord,
};

/// A record of any syncable kind, borrowed from the account's tables.
#[derive(Debug, Clone, Copy)]
pub(crate) enum AnyRecord<'a> {
    Client(&'a ClientRecord),
    Project(&'a ProjectRecord),
    Task(&'a TaskRecord),
    Session(&'a SessionRecord),
    Node(&'a NodeRecord),
    NodeSession(&'a NodeSessionRecord),
}

impl<'a> AnyRecord<'a> {
    /// The record's shared sync surface.
    pub fn sync(&self) -> &'a dyn SyncRecord {
        match self {
            AnyRecord::Client(r) => *r,
            AnyRecord::Project(r) => *r,
            AnyRecord::Task(r) => *r,
            AnyRecord::Session(r) => *r,
            AnyRecord::Node(r) => *r,
            AnyRecord::NodeSession(r) => *r,
        }
    }
}

/// A record resolved by identifier, with its place in the ownership chain.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Resolved<'a> {
    /// Internal row id, for the follow-up mutable access.
    pub row: RowId,
    /// The resolved record.
    pub record: AnyRecord<'a>,
}

/// Resolves (kind, identifier) to a record, soft-deleted records included, since
/// conflict comparison needs tombstones to stay addressable.
pub(crate) fn resolve<'a>(
    data: &'a AccountData,
    kind: EntityKind,
    uuid: &str,
) -> Option<Resolved<'a>> {
    let (row, record) = match kind {
        EntityKind::Client => {
            let (row, r) = data.client_by_uuid(uuid)?;
            (row, AnyRecord::Client(r))
        }
        EntityKind::Project => {
            let (row, r) = data.project_by_uuid(uuid)?;
            (row, AnyRecord::Project(r))
        }
        EntityKind::Task => {
            let (row, r) = data.task_by_uuid(uuid)?;
            (row, AnyRecord::Task(r))
        }
        EntityKind::Session => {
            let (row, r) = data.session_by_uuid(uuid)?;
            (row, AnyRecord::Session(r))
        }
        EntityKind::Node => {
            let (row, r) = data.node_by_uuid(uuid)?;
            (row, AnyRecord::Node(r))
        }
        EntityKind::NodeSession => {
            let (row, r) = data.node_session_by_uuid(uuid)?;
            (row, AnyRecord::NodeSession(r))
        }
    };
    Some(Resolved { row, record })
}

/// Resolves the live parent row for an insert of `child`.
///
/// Soft-deleted records never resolve as parents: a child cannot be
/// attached under a tombstone.
pub(crate) fn live_parent(
    data: &AccountData,
    child: EntityKind,
    parent_uuid: &str,
) -> Option<RowId> {
    match child {
        EntityKind::Client => None,
        EntityKind::Project => data
            .client_by_uuid(parent_uuid)
            .filter(|(_, c)| c.deleted_at.is_none())
            .map(|(row, _)| row),
        EntityKind::Task => data
            .project_by_uuid(parent_uuid)
            .filter(|(_, p)| p.deleted_at.is_none())
            .map(|(row, _)| row),
        EntityKind::Session => data
            .task_by_uuid(parent_uuid)
            .filter(|(_, t)| t.deleted_at.is_none())
            .map(|(row, _)| row),
        EntityKind::Node | EntityKind::NodeSession => data
            .node_by_uuid(parent_uuid)
            .filter(|(_, n)| n.deleted_at.is_none())
            .map(|(row, _)| row),
    }
}

/// Resolves a record's parent back to its stable identifier by walking the
/// owning chain; internal row references never leak onto the wire.
pub(crate) fn parent_uuid(data: &AccountData, record: AnyRecord<'_>) -> Option<String> {
    match record {
        AnyRecord::Client(_) => None,
        AnyRecord::Project(p) => data.clients.get(p.client).map(|c| c.uuid.clone()),
        AnyRecord::Task(t) => data.projects.get(t.project).map(|p| p.uuid.clone()),
        AnyRecord::Session(s) => data.tasks.get(s.task).map(|t| t.uuid.clone()),
        AnyRecord::Node(n) => n.parent_uuid.clone(),
        AnyRecord::NodeSession(s) => data.nodes.get(s.node).map(|n| n.uuid.clone()),
    }
}

/// Runs a closure against the record's shared sync surface, mutably.
pub(crate) fn with_record_mut<T>(
    data: &mut AccountData,
    kind: EntityKind,
    row: RowId,
    f: impl FnOnce(&mut dyn SyncRecord) -> T,
) -> Option<T> {
    match kind {
        EntityKind::Client => data.clients.get_mut(row).map(|r| f(r)),
        EntityKind::Project => data.projects.get_mut(row).map(|r| f(r)),
        EntityKind::Task => data.tasks.get_mut(row).map(|r| f(r)),
        EntityKind::Session => data.sessions.get_mut(row).map(|r| f(r)),
        EntityKind::Node => data.nodes.get_mut(row).map(|r| f(r)),
        EntityKind::NodeSession => data.node_sessions.get_mut(row).map(|r| f(r)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taakl_model::Timestamp;

    fn seeded() -> AccountData {
        let now = Timestamp::now();
        let mut data = AccountData::default();
        let client = data.clients.insert(ClientRecord::new("c1".into(), now));
        let project = data
            .projects
            .insert(ProjectRecord::new("p1".into(), client, now));
        let task = data.tasks.insert(TaskRecord::new("t1".into(), project, now));
        data.sessions
            .insert(SessionRecord::new("s1".into(), task, now));
        data
    }

    #[test]
    fn resolve_walks_every_kind() {
        let data = seeded();
        for (kind, uuid) in [
            (EntityKind::Client, "c1"),
            (EntityKind::Project, "p1"),
            (EntityKind::Task, "t1"),
            (EntityKind::Session, "s1"),
        ] {
            let resolved = resolve(&data, kind, uuid).unwrap();
            assert_eq!(resolved.record.sync().uuid(), uuid);
        }
        assert!(resolve(&data, EntityKind::Task, "nope").is_none());
    }

    #[test]
    fn parent_uuid_walks_back_to_identifiers() {
        let data = seeded();
        let task = resolve(&data, EntityKind::Task, "t1").unwrap();
        assert_eq!(parent_uuid(&data, task.record).as_deref(), Some("p1"));

        let session = resolve(&data, EntityKind::Session, "s1").unwrap();
        assert_eq!(parent_uuid(&data, session.record).as_deref(), Some("t1"));

        let client = resolve(&data, EntityKind::Client, "c1").unwrap();
        assert_eq!(parent_uuid(&data, client.record), None);
    }

    #[test]
    fn deleted_parents_do_not_resolve_for_inserts() {
        let mut data = seeded();
        assert!(live_parent(&data, EntityKind::Task, "p1").is_some());

        let (row, _) = data.project_by_uuid("p1").unwrap();
        data.projects.get_mut(row).unwrap().deleted_at = Some(Timestamp::now());
        assert!(live_parent(&data, EntityKind::Task, "p1").is_none());
        // Still resolvable for conflict comparison.
        assert!(resolve(&data, EntityKind::Project, "p1").is_some());
    }
}
