//! Server-side change records returned to clients.

use crate::FieldMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use taakl_model::EntityKind;

/// The action a collected change represents.
///
/// Collection is tombstone-based: a soft-deleted record collects as
/// `Delete`, everything else as `Update` (inserts the client has not seen
/// are indistinguishable from updates and travel the same way).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeAction {
    /// Live record changed (or was created) after the cutoff.
    Update,
    /// Record was soft-deleted.
    Delete,
}

impl fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeAction::Update => f.write_str("update"),
            ChangeAction::Delete => f.write_str("delete"),
        }
    }
}

/// One server-side change the client has not yet seen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeRecord {
    /// Update or delete.
    pub action: ChangeAction,
    /// Wire entity type name.
    #[serde(rename = "type")]
    pub entity_type: String,
    /// Entity identifier.
    pub uuid: String,
    /// Parent identifier, resolved through the ownership chain.
    #[serde(rename = "parentUuid", skip_serializing_if = "Option::is_none")]
    pub parent_uuid: Option<String>,
    /// Externally meaningful fields only; internal row references never
    /// appear here.
    pub data: FieldMap,
}

impl ChangeRecord {
    /// Creates a change record.
    pub fn new(
        action: ChangeAction,
        kind: EntityKind,
        uuid: impl Into<String>,
        parent_uuid: Option<String>,
        data: FieldMap,
    ) -> Self {
        Self {
            action,
            entity_type: kind.as_wire().into(),
            uuid: uuid.into(),
            parent_uuid,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_wire_shape() {
        let mut data = FieldMap::new();
        data.insert("name".into(), "Acme".into());
        let record = ChangeRecord::new(
            ChangeAction::Delete,
            EntityKind::Client,
            "c1",
            None,
            data,
        );

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["action"], "delete");
        assert_eq!(json["type"], "client");
        assert_eq!(json["uuid"], "c1");
        assert_eq!(json["data"]["name"], "Acme");
        assert!(json.get("parentUuid").is_none());
    }

    #[test]
    fn parent_uuid_serializes_when_present() {
        let record = ChangeRecord::new(
            ChangeAction::Update,
            EntityKind::Project,
            "p1",
            Some("c1".into()),
            FieldMap::new(),
        );
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["parentUuid"], "c1");
    }
}
