//! Repository Layer - Core Traits
//!
//! Defines the abstract record store all persistence goes through.
//! Implementations can use SQLite, in-memory tables, etc.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{DomainError, DomainResult, Entity, EntityKind, Fields, Record, RecordId};

/// Row selection for `list`
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    All,
    /// Field equals value
    Eq(&'static str, Value),
}

impl Filter {
    pub fn eq(field: &'static str, value: impl Into<RecordId>) -> Self {
        Filter::Eq(field, Value::from(value.into()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// Sort key for `list`. Ties always fall back to ascending id, which is
/// insertion sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
    pub field: &'static str,
    pub direction: Direction,
}

impl Order {
    pub fn asc(field: &'static str) -> Self {
        Self { field, direction: Direction::Asc }
    }

    pub fn desc(field: &'static str) -> Self {
        Self { field, direction: Direction::Desc }
    }

    pub fn by_id() -> Self {
        Self::asc("id")
    }
}

/// Store operations, as counted and fault-injected by test stores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Get,
    Create,
    Update,
    Delete,
    List,
}

/// Core record store
///
/// All access happens inside a transaction. Only one transaction is open
/// at a time; a second `begin` waits until the first commits or is dropped.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn begin<'a>(&'a self) -> DomainResult<Box<dyn RecordTransaction + 'a>>;
}

/// One atomic unit of work. Dropping it without `commit` rolls back.
#[async_trait]
pub trait RecordTransaction: Send {
    /// Find a record by id
    async fn get(&mut self, kind: EntityKind, id: RecordId) -> DomainResult<Option<Record>>;

    /// Insert a record; every column of `kind` must be present
    async fn create(&mut self, kind: EntityKind, fields: Fields) -> DomainResult<RecordId>;

    /// Overwrite the given fields only. Missing id is `NotFound`.
    async fn update(&mut self, kind: EntityKind, id: RecordId, fields: Fields) -> DomainResult<()>;

    /// Delete a record and, recursively, its dependents. Missing id is `NotFound`.
    async fn delete(&mut self, kind: EntityKind, id: RecordId) -> DomainResult<()>;

    /// Select records in order
    async fn list(&mut self, kind: EntityKind, filter: &Filter, order: Order) -> DomainResult<Vec<Record>>;

    async fn commit(self: Box<Self>) -> DomainResult<()>;

    async fn rollback(self: Box<Self>) -> DomainResult<()>;
}

/// Reject fields that `kind` does not store; on create, require all of them
pub(crate) fn check_fields(kind: EntityKind, fields: &Fields, require_all: bool) -> DomainResult<()> {
    if let Some(unknown) = fields.keys().find(|k| *k == "id" || !kind.has_column(k)) {
        return Err(DomainError::InvalidInput(format!(
            "{} has no writable field `{}`",
            kind.as_str(),
            unknown
        )));
    }
    if require_all {
        if let Some(missing) = kind.columns().iter().find(|c| !fields.contains_key(**c)) {
            return Err(DomainError::InvalidInput(format!("{} requires field `{}`", kind.as_str(), missing)));
        }
    }
    Ok(())
}

pub(crate) fn check_order(kind: EntityKind, filter: &Filter, order: Order) -> DomainResult<()> {
    let filtered = match filter {
        Filter::All => None,
        Filter::Eq(field, _) => Some(*field),
    };
    for field in filtered.into_iter().chain(std::iter::once(order.field)) {
        if !kind.has_column(field) {
            return Err(DomainError::InvalidInput(format!("{} has no field `{}`", kind.as_str(), field)));
        }
    }
    Ok(())
}

// ========================
// Typed helpers
// ========================

/// Find an entity by id
pub async fn find<T, X>(tx: &mut X, id: T::Id) -> DomainResult<Option<T>>
where
    T: Entity,
    X: RecordTransaction + ?Sized,
{
    match tx.get(T::KIND, id.into()).await? {
        Some(record) => Ok(Some(T::from_record(&record)?)),
        None => Ok(None),
    }
}

/// List entities matching `filter`
pub async fn find_where<T, X>(tx: &mut X, filter: &Filter, order: Order) -> DomainResult<Vec<T>>
where
    T: Entity,
    X: RecordTransaction + ?Sized,
{
    tx.list(T::KIND, filter, order)
        .await?
        .iter()
        .map(T::from_record)
        .collect()
}

/// Insert an entity, ignoring its current id, and return the assigned one
pub async fn insert<T, X>(tx: &mut X, entity: &T) -> DomainResult<T::Id>
where
    T: Entity,
    X: RecordTransaction + ?Sized,
{
    let id = tx.create(T::KIND, entity.to_fields()).await?;
    Ok(T::Id::from(id))
}
