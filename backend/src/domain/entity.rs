//! Domain Layer - Core Entity Trait
//!
//! This trait defines the basic contract for all persisted entities.
//! All entities have a unique ID and convert to and from store records.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;

use super::record::{EntityKind, Fields, Record, RecordId};

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub RecordId);

        impl $name {
            pub fn get(self) -> RecordId {
                self.0
            }
        }

        impl From<RecordId> for $name {
            fn from(id: RecordId) -> Self {
                Self(id)
            }
        }

        impl From<$name> for RecordId {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

record_id!(
    /// Persisted tier list identity
    ListId
);
record_id!(
    /// Persisted tier identity
    TierId
);
record_id!(
    /// Persisted item identity
    ItemId
);
record_id!(
    /// Acting identity, supplied by the identity provider and never resolved here
    UserId
);

/// Core trait for all persisted entities
pub trait Entity: Sized + Send + Sync + Clone {
    /// The type of the entity's unique identifier
    type Id: Copy + Eq + Hash + Send + Sync + From<RecordId> + Into<RecordId>;

    /// Record kind this entity is stored as
    const KIND: EntityKind;

    /// Stored fields, without the id and without child collections
    fn to_fields(&self) -> Fields;

    /// Rebuild from a stored record. Child collections come back empty.
    fn from_record(record: &Record) -> DomainResult<Self>;
}

/// Common result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level errors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum DomainError {
    /// Rejected before any store access
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Not found: {0}")]
    NotFound(String),
    /// Actor is not allowed to touch the list. Carries no detail on purpose.
    #[error("Access denied")]
    Denied,
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Storage error: {0}")]
    Storage(String),
}

impl DomainError {
    pub fn not_found(kind: EntityKind, id: impl Into<RecordId>) -> Self {
        DomainError::NotFound(format!("{} {}", kind.as_str(), id.into()))
    }

    /// The failure class callers must answer by re-fetching before retrying
    pub fn is_conflict_or_storage(&self) -> bool {
        matches!(self, DomainError::Conflict(_) | DomainError::Storage(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_transparent_on_the_wire() {
        let id = TierId(42);
        assert_eq!(serde_json::to_string(&id).unwrap(), "42");
        assert_eq!(serde_json::from_str::<TierId>("42").unwrap(), id);
        assert_eq!(RecordId::from(id), 42);
    }

    #[test]
    fn test_error_classes() {
        assert!(DomainError::Conflict("x".into()).is_conflict_or_storage());
        assert!(DomainError::Storage("x".into()).is_conflict_or_storage());
        assert!(!DomainError::Denied.is_conflict_or_storage());
        assert_eq!(
            DomainError::not_found(EntityKind::Tier, TierId(3)).to_string(),
            "Not found: tier 3"
        );
    }
}
