//! Database Connection and Setup
//!
//! Opens the SQLite connection and runs migrations.

use rusqlite::{Connection, ErrorCode};
use std::path::Path;

use crate::domain::{DomainError, DomainResult};

impl From<rusqlite::Error> for DomainError {
    fn from(e: rusqlite::Error) -> Self {
        match e.sqlite_error_code() {
            Some(ErrorCode::ConstraintViolation) | Some(ErrorCode::DatabaseBusy) | Some(ErrorCode::DatabaseLocked) => {
                DomainError::Conflict(e.to_string())
            }
            _ => DomainError::Storage(e.to_string()),
        }
    }
}

/// Open a database file (or `:memory:`) and bring its schema up to date
pub fn init_db(db_path: &Path) -> DomainResult<Connection> {
    let conn = if db_path == Path::new(":memory:") {
        Connection::open_in_memory()?
    } else {
        if let Some(dir) = db_path.parent() {
            std::fs::create_dir_all(dir)
                .map_err(|e| DomainError::Storage(format!("Failed to create db dir: {}", e)))?;
        }
        Connection::open(db_path)?
    };

    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    run_migrations(&conn)?;
    Ok(conn)
}

/// Check if a column exists in a table
fn column_exists(conn: &Connection, table: &str, column: &str) -> DomainResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Run database migrations
fn run_migrations(conn: &Connection) -> DomainResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS tier_lists (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            visibility TEXT NOT NULL DEFAULT 'PRIVATE',
            owner_id INTEGER NOT NULL,
            created_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS tiers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            tier_list_id INTEGER NOT NULL REFERENCES tier_lists(id) ON DELETE CASCADE,
            label TEXT NOT NULL,
            color TEXT NOT NULL,
            sort_order INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS tier_items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            tier_id INTEGER NOT NULL REFERENCES tiers(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            image_ref TEXT NOT NULL
        );",
    )?;

    // Added after the first release
    if !column_exists(conn, "tier_lists", "description")? {
        conn.execute("ALTER TABLE tier_lists ADD COLUMN description TEXT", ())?;
    }

    if !column_exists(conn, "tier_items", "position")? {
        conn.execute("ALTER TABLE tier_items ADD COLUMN position INTEGER NOT NULL DEFAULT 0", ())?;
    }

    // Create indexes for faster parent-child queries
    conn.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_tiers_list ON tiers(tier_list_id);
         CREATE INDEX IF NOT EXISTS idx_items_tier ON tier_items(tier_id);
         CREATE INDEX IF NOT EXISTS idx_lists_owner ON tier_lists(owner_id);",
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = init_db(Path::new(":memory:")).unwrap();
        run_migrations(&conn).unwrap();
        assert!(column_exists(&conn, "tier_lists", "description").unwrap());
        assert!(column_exists(&conn, "tier_items", "position").unwrap());
        assert!(!column_exists(&conn, "tier_items", "color").unwrap());
    }

    #[test]
    fn test_file_database_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("tierlist.db");
        init_db(&path).unwrap();
        assert!(path.exists());
    }
}
