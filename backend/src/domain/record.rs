//! Store Records
//!
//! The storage-neutral shape every entity is persisted as: an entity kind,
//! a numeric id and a flat map of named fields.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::entity::{DomainError, DomainResult};

/// Raw identity assigned by the record store
pub type RecordId = i64;

/// Named field values of one record
pub type Fields = serde_json::Map<String, Value>;

/// The entity types the record store knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    TierList,
    Tier,
    TierItem,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::TierList => "tier list",
            EntityKind::Tier => "tier",
            EntityKind::TierItem => "item",
        }
    }

    pub fn table(&self) -> &'static str {
        match self {
            EntityKind::TierList => "tier_lists",
            EntityKind::Tier => "tiers",
            EntityKind::TierItem => "tier_items",
        }
    }

    /// Stored fields, id excluded
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            EntityKind::TierList => &["title", "description", "visibility", "owner_id", "created_at"],
            EntityKind::Tier => &["tier_list_id", "label", "color", "sort_order"],
            EntityKind::TierItem => &["tier_id", "name", "image_ref", "position"],
        }
    }

    pub fn has_column(&self, field: &str) -> bool {
        field == "id" || self.columns().contains(&field)
    }

    /// Records of another kind that are deleted along with this one
    pub fn dependents(&self) -> Option<(EntityKind, &'static str)> {
        match self {
            EntityKind::TierList => Some((EntityKind::Tier, "tier_list_id")),
            EntityKind::Tier => Some((EntityKind::TierItem, "tier_id")),
            EntityKind::TierItem => None,
        }
    }

    /// The record this kind must be attached to, and the field pointing at it
    pub fn parent(&self) -> Option<(EntityKind, &'static str)> {
        match self {
            EntityKind::TierList => None,
            EntityKind::Tier => Some((EntityKind::TierList, "tier_list_id")),
            EntityKind::TierItem => Some((EntityKind::Tier, "tier_id")),
        }
    }
}

/// One stored row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub fields: Fields,
}

impl Record {
    pub fn new(id: RecordId, fields: Fields) -> Self {
        Self { id, fields }
    }

    fn malformed(&self, field: &str, expected: &str) -> DomainError {
        DomainError::Storage(format!("record {}: field `{}` is not {}", self.id, field, expected))
    }

    pub fn string(&self, field: &str) -> DomainResult<String> {
        self.fields
            .get(field)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| self.malformed(field, "a string"))
    }

    pub fn opt_string(&self, field: &str) -> DomainResult<Option<String>> {
        match self.fields.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(self.malformed(field, "a string or null")),
        }
    }

    pub fn int(&self, field: &str) -> DomainResult<i64> {
        self.fields
            .get(field)
            .and_then(Value::as_i64)
            .ok_or_else(|| self.malformed(field, "an integer"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_accessors() {
        let fields = json!({ "label": "S", "sort_order": 2, "note": null })
            .as_object()
            .cloned()
            .unwrap();
        let record = Record::new(9, fields);

        assert_eq!(record.string("label").unwrap(), "S");
        assert_eq!(record.int("sort_order").unwrap(), 2);
        assert_eq!(record.opt_string("note").unwrap(), None);
        assert_eq!(record.opt_string("absent").unwrap(), None);
        assert!(matches!(record.int("label"), Err(DomainError::Storage(_))));
    }

    #[test]
    fn test_columns() {
        assert!(EntityKind::TierItem.has_column("tier_id"));
        assert!(EntityKind::TierItem.has_column("id"));
        assert!(!EntityKind::TierItem.has_column("label"));
    }
}
