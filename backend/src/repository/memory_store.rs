//! In-Memory Record Store
//!
//! Same contract as the SQLite store, kept in ordered maps. Counts every
//! call and can be told to fail a given call, which the reconcile tests use
//! to observe write amplification and atomicity.

use async_trait::async_trait;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use tokio::sync::{Mutex, MutexGuard};

use super::traits::{check_fields, check_order, Direction, Filter, Order, RecordStore, RecordTransaction, StoreOp};
use crate::domain::{DomainError, DomainResult, EntityKind, Fields, Record, RecordId};

#[derive(Debug, Clone, Default)]
struct Tables {
    rows: HashMap<EntityKind, BTreeMap<RecordId, Fields>>,
    next_id: RecordId,
}

impl Tables {
    fn table(&self, kind: EntityKind) -> Option<&BTreeMap<RecordId, Fields>> {
        self.rows.get(&kind)
    }

    fn table_mut(&mut self, kind: EntityKind) -> &mut BTreeMap<RecordId, Fields> {
        self.rows.entry(kind).or_default()
    }

    fn contains(&self, kind: EntityKind, id: RecordId) -> bool {
        self.table(kind).is_some_and(|t| t.contains_key(&id))
    }

    /// Foreign key check for the parent reference carried in `fields`
    fn check_parent(&self, kind: EntityKind, fields: &Fields) -> DomainResult<()> {
        let Some((parent, field)) = kind.parent() else {
            return Ok(());
        };
        let Some(value) = fields.get(field) else {
            return Ok(());
        };
        match value.as_i64() {
            Some(id) if self.contains(parent, id) => Ok(()),
            _ => Err(DomainError::Conflict(format!(
                "{} references missing {} {}",
                kind.as_str(),
                parent.as_str(),
                value
            ))),
        }
    }

    fn remove_cascade(&mut self, kind: EntityKind, id: RecordId) {
        if let Some((child, field)) = kind.dependents() {
            let children: Vec<RecordId> = self
                .table(child)
                .map(|t| {
                    t.iter()
                        .filter(|(_, f)| f.get(field).and_then(Value::as_i64) == Some(id))
                        .map(|(child_id, _)| *child_id)
                        .collect()
                })
                .unwrap_or_default();
            for child_id in children {
                self.remove_cascade(child, child_id);
            }
        }
        self.table_mut(kind).remove(&id);
    }
}

/// Call counts since creation (or the last `reset_stats`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub begins: usize,
    pub gets: usize,
    pub creates: usize,
    pub updates: usize,
    pub deletes: usize,
    pub lists: usize,
}

impl StoreStats {
    /// create + update + delete
    pub fn writes(&self) -> usize {
        self.creates + self.updates + self.deletes
    }

    pub fn total(&self) -> usize {
        self.begins + self.gets + self.lists + self.writes()
    }
}

#[derive(Default)]
struct Counters {
    begins: AtomicUsize,
    gets: AtomicUsize,
    creates: AtomicUsize,
    updates: AtomicUsize,
    deletes: AtomicUsize,
    lists: AtomicUsize,
}

impl Counters {
    fn slot(&self, op: StoreOp) -> &AtomicUsize {
        match op {
            StoreOp::Get => &self.gets,
            StoreOp::Create => &self.creates,
            StoreOp::Update => &self.updates,
            StoreOp::Delete => &self.deletes,
            StoreOp::List => &self.lists,
        }
    }
}

#[derive(Debug)]
struct Fault {
    op: StoreOp,
    remaining: usize,
}

/// Record store backed by process memory
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    counters: Counters,
    faults: std::sync::Mutex<Vec<Fault>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> StoreStats {
        let c = &self.counters;
        StoreStats {
            begins: c.begins.load(AtomicOrdering::SeqCst),
            gets: c.gets.load(AtomicOrdering::SeqCst),
            creates: c.creates.load(AtomicOrdering::SeqCst),
            updates: c.updates.load(AtomicOrdering::SeqCst),
            deletes: c.deletes.load(AtomicOrdering::SeqCst),
            lists: c.lists.load(AtomicOrdering::SeqCst),
        }
    }

    pub fn reset_stats(&self) {
        let c = &self.counters;
        for counter in [&c.begins, &c.gets, &c.creates, &c.updates, &c.deletes, &c.lists] {
            counter.store(0, AtomicOrdering::SeqCst);
        }
    }

    /// Make the `nth` (1-based) upcoming call of `op` fail with a storage error
    pub fn fail_on(&self, op: StoreOp, nth: usize) {
        let mut faults = self.faults.lock().unwrap_or_else(|e| e.into_inner());
        faults.push(Fault { op, remaining: nth.max(1) });
    }

    /// Count a call and apply any armed fault for it
    fn record(&self, op: StoreOp) -> DomainResult<()> {
        self.counters.slot(op).fetch_add(1, AtomicOrdering::SeqCst);

        let mut faults = self.faults.lock().unwrap_or_else(|e| e.into_inner());
        let mut tripped = false;
        faults.retain_mut(|fault| {
            if fault.op != op || tripped {
                return true;
            }
            fault.remaining -= 1;
            if fault.remaining == 0 {
                tripped = true;
                return false;
            }
            true
        });

        if tripped {
            log::debug!("[MemoryStore] injected failure on {:?}", op);
            return Err(DomainError::Storage(format!("injected failure on {:?}", op)));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn begin<'a>(&'a self) -> DomainResult<Box<dyn RecordTransaction + 'a>> {
        let guard = self.tables.lock().await;
        self.counters.begins.fetch_add(1, AtomicOrdering::SeqCst);
        let working = guard.clone();
        Ok(Box::new(MemoryTransaction { store: self, guard, working }))
    }
}

/// Works on a private copy of the tables; `commit` swaps it in
pub struct MemoryTransaction<'a> {
    store: &'a MemoryStore,
    guard: MutexGuard<'a, Tables>,
    working: Tables,
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(v: Option<&Value>) -> u8 {
        match v {
            None | Some(Value::Null) => 0,
            Some(Value::Bool(_)) | Some(Value::Number(_)) => 1,
            Some(_) => 2,
        }
    }

    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => x
                .as_f64()
                .unwrap_or_default()
                .total_cmp(&y.as_f64().unwrap_or_default()),
        },
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

impl MemoryTransaction<'_> {
    fn field_value(id: RecordId, fields: &Fields, field: &str) -> Option<Value> {
        if field == "id" {
            Some(Value::from(id))
        } else {
            fields.get(field).cloned()
        }
    }
}

#[async_trait]
impl RecordTransaction for MemoryTransaction<'_> {
    async fn get(&mut self, kind: EntityKind, id: RecordId) -> DomainResult<Option<Record>> {
        self.store.record(StoreOp::Get)?;
        Ok(self
            .working
            .table(kind)
            .and_then(|t| t.get(&id))
            .map(|fields| Record::new(id, fields.clone())))
    }

    async fn create(&mut self, kind: EntityKind, fields: Fields) -> DomainResult<RecordId> {
        self.store.record(StoreOp::Create)?;
        check_fields(kind, &fields, true)?;
        self.working.check_parent(kind, &fields)?;

        self.working.next_id += 1;
        let id = self.working.next_id;
        self.working.table_mut(kind).insert(id, fields);
        Ok(id)
    }

    async fn update(&mut self, kind: EntityKind, id: RecordId, fields: Fields) -> DomainResult<()> {
        self.store.record(StoreOp::Update)?;
        check_fields(kind, &fields, false)?;
        if !self.working.contains(kind, id) {
            return Err(DomainError::not_found(kind, id));
        }
        self.working.check_parent(kind, &fields)?;

        if let Some(row) = self.working.table_mut(kind).get_mut(&id) {
            row.extend(fields);
        }
        Ok(())
    }

    async fn delete(&mut self, kind: EntityKind, id: RecordId) -> DomainResult<()> {
        self.store.record(StoreOp::Delete)?;
        if !self.working.contains(kind, id) {
            return Err(DomainError::not_found(kind, id));
        }
        self.working.remove_cascade(kind, id);
        Ok(())
    }

    async fn list(&mut self, kind: EntityKind, filter: &Filter, order: Order) -> DomainResult<Vec<Record>> {
        self.store.record(StoreOp::List)?;
        check_order(kind, filter, order)?;

        let Some(table) = self.working.table(kind) else {
            return Ok(Vec::new());
        };

        let mut rows: Vec<(RecordId, &Fields)> = table
            .iter()
            .filter(|(id, fields)| match filter {
                Filter::All => true,
                Filter::Eq(field, value) => Self::field_value(**id, fields, field).as_ref() == Some(value),
            })
            .map(|(id, fields)| (*id, fields))
            .collect();

        // BTreeMap iteration is ascending id, so a stable sort keeps the tie-break
        rows.sort_by(|(a_id, a), (b_id, b)| {
            let a = Self::field_value(*a_id, a, order.field);
            let b = Self::field_value(*b_id, b, order.field);
            let ord = compare_values(a.as_ref(), b.as_ref());
            match order.direction {
                Direction::Asc => ord,
                Direction::Desc => ord.reverse(),
            }
        });

        Ok(rows
            .into_iter()
            .map(|(id, fields)| Record::new(id, fields.clone()))
            .collect())
    }

    async fn commit(self: Box<Self>) -> DomainResult<()> {
        let MemoryTransaction { mut guard, working, .. } = *self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> DomainResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn list_fields(title: &str) -> Fields {
        json!({
            "title": title,
            "description": null,
            "visibility": "PRIVATE",
            "owner_id": 1,
            "created_at": 0,
        })
        .as_object()
        .cloned()
        .unwrap()
    }

    #[tokio::test]
    async fn test_fault_fires_once_on_the_nth_call() {
        let store = MemoryStore::new();
        store.fail_on(StoreOp::Create, 2);

        let mut tx = store.begin().await.unwrap();
        assert!(tx.create(EntityKind::TierList, list_fields("a")).await.is_ok());
        assert!(matches!(
            tx.create(EntityKind::TierList, list_fields("b")).await,
            Err(DomainError::Storage(_))
        ));
        assert!(tx.create(EntityKind::TierList, list_fields("c")).await.is_ok());
        drop(tx);

        assert_eq!(store.stats().creates, 3);
        assert_eq!(store.stats().begins, 1);
    }

    #[tokio::test]
    async fn test_stats_reset() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        tx.get(EntityKind::Tier, 1).await.unwrap();
        tx.commit().await.unwrap();
        assert_eq!(store.stats().total(), 2);

        store.reset_stats();
        assert_eq!(store.stats(), StoreStats::default());
    }

    #[test]
    fn test_value_ordering() {
        assert_eq!(compare_values(Some(&json!(2)), Some(&json!(10))), Ordering::Less);
        assert_eq!(compare_values(Some(&json!("b")), Some(&json!("a"))), Ordering::Greater);
        assert_eq!(compare_values(None, Some(&json!(0))), Ordering::Less);
    }
}
