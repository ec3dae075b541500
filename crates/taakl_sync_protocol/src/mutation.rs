//! Client-asserted mutations.

use crate::FieldMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use taakl_model::{EntityKind, Timestamp};

/// The three mutation actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Create a new entity.
    Insert,
    /// Change fields of an existing entity.
    Update,
    /// Soft-delete an existing entity.
    Delete,
}

impl Action {
    /// Returns the wire name for this action.
    pub fn as_wire(&self) -> &'static str {
        match self {
            Action::Insert => "insert",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }

    /// Parses a wire name. Unknown names yield `None`.
    pub fn from_wire(name: &str) -> Option<Self> {
        match name {
            "insert" => Some(Action::Insert),
            "update" => Some(Action::Update),
            "delete" => Some(Action::Delete),
            _ => None,
        }
    }
}

/// One client-asserted change to one entity.
///
/// Action, type, and identifier travel as raw strings so that malformed
/// input stays a data-driven rejection (a conflict in the stats) instead of
/// a decode failure; [`Mutation::resolved_action`] and [`Mutation::kind`]
/// resolve them. The asserted `timestamp` is used only for conflict comparison;
/// the stored last-modified time is always advanced to server time on
/// acceptance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Mutation {
    /// Wire action name.
    pub action: String,
    /// Wire entity type name.
    #[serde(rename = "type")]
    pub entity_type: String,
    /// Client-generated entity identifier.
    pub uuid: String,
    /// Field payload; absent fields keep their prior values.
    pub data: FieldMap,
    /// Client-asserted timestamp; absent means "now" for insert/update.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Timestamp>,
    /// Parent identifier, required by insert for child entity types.
    #[serde(rename = "parentUuid", skip_serializing_if = "Option::is_none")]
    pub parent_uuid: Option<String>,
}

impl Mutation {
    /// Creates an insert mutation.
    pub fn insert(kind: EntityKind, uuid: impl Into<String>) -> Self {
        Self {
            action: Action::Insert.as_wire().into(),
            entity_type: kind.as_wire().into(),
            uuid: uuid.into(),
            ..Self::default()
        }
    }

    /// Creates an update mutation.
    pub fn update(kind: EntityKind, uuid: impl Into<String>) -> Self {
        Self {
            action: Action::Update.as_wire().into(),
            entity_type: kind.as_wire().into(),
            uuid: uuid.into(),
            ..Self::default()
        }
    }

    /// Creates a delete mutation with the asserted delete time.
    pub fn delete(kind: EntityKind, uuid: impl Into<String>, at: Timestamp) -> Self {
        Self {
            action: Action::Delete.as_wire().into(),
            entity_type: kind.as_wire().into(),
            uuid: uuid.into(),
            timestamp: Some(at),
            ..Self::default()
        }
    }

    /// Sets the parent identifier.
    #[must_use]
    pub fn with_parent(mut self, parent_uuid: impl Into<String>) -> Self {
        self.parent_uuid = Some(parent_uuid.into());
        self
    }

    /// Sets the asserted timestamp.
    #[must_use]
    pub fn with_timestamp(mut self, at: Timestamp) -> Self {
        self.timestamp = Some(at);
        self
    }

    /// Adds one payload field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// The resolved action, if the wire name is known.
    pub fn resolved_action(&self) -> Option<Action> {
        Action::from_wire(&self.action)
    }

    /// The resolved entity kind, if the wire name is known.
    pub fn kind(&self) -> Option<EntityKind> {
        EntityKind::from_wire(&self.entity_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_wire_names_roundtrip() {
        for action in [Action::Insert, Action::Update, Action::Delete] {
            assert_eq!(Action::from_wire(action.as_wire()), Some(action));
        }
        assert_eq!(Action::from_wire("upsert"), None);
    }

    #[test]
    fn decodes_wire_shape() {
        let raw = r#"{
            "action": "insert",
            "type": "project",
            "uuid": "p1",
            "parentUuid": "c1",
            "data": {"name": "Website"},
            "timestamp": "2024-03-01 10:00:00"
        }"#;
        let m: Mutation = serde_json::from_str(raw).unwrap();
        assert_eq!(m.resolved_action(), Some(Action::Insert));
        assert_eq!(m.kind(), Some(EntityKind::Project));
        assert_eq!(m.parent_uuid.as_deref(), Some("c1"));
        assert_eq!(m.data["name"], "Website");
        assert_eq!(m.timestamp.unwrap().to_string(), "2024-03-01 10:00:00");
    }

    #[test]
    fn missing_fields_decode_to_empty() {
        let m: Mutation = serde_json::from_str("{}").unwrap();
        assert!(m.action.is_empty());
        assert!(m.uuid.is_empty());
        assert!(m.timestamp.is_none());
        assert_eq!(m.resolved_action(), None);
    }

    #[test]
    fn builder_produces_wire_names() {
        let m = Mutation::insert(EntityKind::Task, "t1")
            .with_parent("p1")
            .with_field("name", "Ship it");
        assert_eq!(m.action, "insert");
        assert_eq!(m.entity_type, "task");
        assert_eq!(m.data["name"], "Ship it");
    }
}
