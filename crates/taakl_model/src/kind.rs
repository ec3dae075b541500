//! Syncable entity kinds.

use std::fmt;

/// The six syncable entity types.
///
/// The legacy schema (`Client` → `Project` → `Task` → `Session`) and the
/// generalized schema (`Node` with optional `NodeSession` children) coexist
/// in one account; both generations sync through the same machinery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// Legacy top-level client record.
    Client,
    /// Legacy project, owned by a client.
    Project,
    /// Legacy task, owned by a project.
    Task,
    /// Legacy work session, owned by a task.
    Session,
    /// Generalized tree node, account-scoped.
    Node,
    /// Work session owned by a node.
    NodeSession,
}

impl EntityKind {
    /// All kinds in change-collection order: legacy types fully before
    /// generalized types.
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Client,
        EntityKind::Project,
        EntityKind::Task,
        EntityKind::Session,
        EntityKind::Node,
        EntityKind::NodeSession,
    ];

    /// Returns the wire name for this kind.
    pub fn as_wire(&self) -> &'static str {
        match self {
            EntityKind::Client => "client",
            EntityKind::Project => "project",
            EntityKind::Task => "task",
            EntityKind::Session => "session",
            EntityKind::Node => "node",
            EntityKind::NodeSession => "node_session",
        }
    }

    /// Parses a wire name. Unknown names yield `None`.
    pub fn from_wire(name: &str) -> Option<Self> {
        match name {
            "client" => Some(EntityKind::Client),
            "project" => Some(EntityKind::Project),
            "task" => Some(EntityKind::Task),
            "session" => Some(EntityKind::Session),
            "node" => Some(EntityKind::Node),
            "node_session" => Some(EntityKind::NodeSession),
            _ => None,
        }
    }

    /// Whether an insert of this kind must name a resolvable parent.
    ///
    /// Nodes are the exception both ways: a node insert may be a root
    /// (no parent) or carry a parent reference that must resolve.
    pub fn requires_parent(&self) -> bool {
        matches!(
            self,
            EntityKind::Project
                | EntityKind::Task
                | EntityKind::Session
                | EntityKind::NodeSession
        )
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_roundtrip() {
        for kind in EntityKind::ALL {
            assert_eq!(EntityKind::from_wire(kind.as_wire()), Some(kind));
        }
        assert_eq!(EntityKind::from_wire("widget"), None);
        assert_eq!(EntityKind::from_wire(""), None);
    }

    #[test]
    fn legacy_kinds_enumerate_before_generalized() {
        let order: Vec<_> = EntityKind::ALL.iter().map(|k| k.as_wire()).collect();
        assert_eq!(
            order,
            ["client", "project", "task", "session", "node", "node_session"]
        );
    }

    #[test]
    fn parent_requirements() {
        assert!(!EntityKind::Client.requires_parent());
        assert!(!EntityKind::Node.requires_parent());
        assert!(EntityKind::Project.requires_parent());
        assert!(EntityKind::Session.requires_parent());
        assert!(EntityKind::NodeSession.requires_parent());
    }
}
