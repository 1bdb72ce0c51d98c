//! SQLite Record Store
//!
//! One shared connection behind an async mutex. A transaction holds the
//! lock from `BEGIN` until `COMMIT` or rollback, so saves never interleave.

use async_trait::async_trait;
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{params_from_iter, Connection, OptionalExtension};
use serde_json::Value;
use std::path::Path;
use tokio::sync::{Mutex, MutexGuard};

use super::db::init_db;
use super::traits::{check_fields, check_order, Direction, Filter, Order, RecordStore, RecordTransaction};
use crate::domain::{DomainError, DomainResult, EntityKind, Fields, Record, RecordId};

/// SQLite implementation of the record store
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn: Mutex::new(conn) }
    }

    /// Open (or create) a database file and run migrations
    pub fn open(path: &Path) -> DomainResult<Self> {
        Ok(Self::new(init_db(path)?))
    }

    pub fn open_in_memory() -> DomainResult<Self> {
        Self::open(Path::new(":memory:"))
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn begin<'a>(&'a self) -> DomainResult<Box<dyn RecordTransaction + 'a>> {
        let conn = self.conn.lock().await;
        conn.execute_batch("BEGIN IMMEDIATE")?;
        Ok(Box::new(SqliteTransaction { conn, finished: false }))
    }
}

pub struct SqliteTransaction<'a> {
    conn: MutexGuard<'a, Connection>,
    finished: bool,
}

impl Drop for SqliteTransaction<'_> {
    fn drop(&mut self) {
        if !self.finished {
            if let Err(e) = self.conn.execute_batch("ROLLBACK") {
                log::error!("rollback failed: {}", e);
            }
        }
    }
}

fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => SqlValue::Real(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        other => SqlValue::Text(other.to_string()),
    }
}

fn from_sql(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Value::from(f),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(_) => Value::Null,
    }
}

fn select_list(kind: EntityKind) -> String {
    let mut columns = vec!["id"];
    columns.extend_from_slice(kind.columns());
    format!("SELECT {} FROM {}", columns.join(", "), kind.table())
}

fn row_to_record(kind: EntityKind, row: &rusqlite::Row<'_>) -> rusqlite::Result<Record> {
    let id: RecordId = row.get(0)?;
    let mut fields = Fields::new();
    for (i, column) in kind.columns().iter().enumerate() {
        fields.insert(column.to_string(), from_sql(row.get_ref(i + 1)?));
    }
    Ok(Record::new(id, fields))
}

#[async_trait]
impl RecordTransaction for SqliteTransaction<'_> {
    async fn get(&mut self, kind: EntityKind, id: RecordId) -> DomainResult<Option<Record>> {
        let sql = format!("{} WHERE id = ?1", select_list(kind));
        let record = self
            .conn
            .query_row(&sql, [id], |row| row_to_record(kind, row))
            .optional()?;
        Ok(record)
    }

    async fn create(&mut self, kind: EntityKind, fields: Fields) -> DomainResult<RecordId> {
        check_fields(kind, &fields, true)?;
        let columns = kind.columns();
        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            kind.table(),
            columns.join(", "),
            placeholders.join(", ")
        );
        let values = columns.iter().map(|c| fields.get(*c).map(to_sql).unwrap_or(SqlValue::Null));
        self.conn.execute(&sql, params_from_iter(values))?;
        Ok(self.conn.last_insert_rowid())
    }

    async fn update(&mut self, kind: EntityKind, id: RecordId, fields: Fields) -> DomainResult<()> {
        check_fields(kind, &fields, false)?;
        if fields.is_empty() {
            return match self.get(kind, id).await? {
                Some(_) => Ok(()),
                None => Err(DomainError::not_found(kind, id)),
            };
        }

        let assignments: Vec<String> = fields
            .keys()
            .enumerate()
            .map(|(i, k)| format!("{} = ?{}", k, i + 1))
            .collect();
        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?{}",
            kind.table(),
            assignments.join(", "),
            fields.len() + 1
        );
        let values = fields.values().map(to_sql).chain(std::iter::once(SqlValue::Integer(id)));
        let changed = self.conn.execute(&sql, params_from_iter(values))?;
        if changed == 0 {
            return Err(DomainError::not_found(kind, id));
        }
        Ok(())
    }

    async fn delete(&mut self, kind: EntityKind, id: RecordId) -> DomainResult<()> {
        // Dependents go through ON DELETE CASCADE
        let sql = format!("DELETE FROM {} WHERE id = ?1", kind.table());
        let changed = self.conn.execute(&sql, [id])?;
        if changed == 0 {
            return Err(DomainError::not_found(kind, id));
        }
        Ok(())
    }

    async fn list(&mut self, kind: EntityKind, filter: &Filter, order: Order) -> DomainResult<Vec<Record>> {
        check_order(kind, filter, order)?;
        let direction = match order.direction {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        };
        let (clause, params) = match filter {
            Filter::All => (String::new(), Vec::new()),
            Filter::Eq(field, value) => (format!(" WHERE {} = ?1", field), vec![to_sql(value)]),
        };
        let sql = format!(
            "{}{} ORDER BY {} {}, id ASC",
            select_list(kind),
            clause,
            order.field,
            direction
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(params), |row| row_to_record(kind, row))?;
        let records = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    async fn commit(self: Box<Self>) -> DomainResult<()> {
        let mut tx = self;
        tx.conn.execute_batch("COMMIT")?;
        tx.finished = true;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> DomainResult<()> {
        let mut tx = self;
        tx.finished = true;
        tx.conn.execute_batch("ROLLBACK")?;
        Ok(())
    }
}
