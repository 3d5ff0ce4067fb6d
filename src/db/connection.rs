use std::fs;
use std::path::Path;

use rusqlite::Connection;
use tracing::{debug, info};

use crate::error::{sql, StoreError};

/// Open (or create) the database file at `path`, make sure the parent folder
/// exists, and run the lazy schema setup.
pub fn open(path: &Path) -> Result<Connection, StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| StoreError::DataDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    let conn = Connection::open(path).map_err(sql("open SQLite database"))?;
    ensure_schema(&conn)?;
    info!(path = %path.display(), "opened database");
    Ok(conn)
}

/// Throwaway database used by tests and by `--database :memory:`.
pub fn open_in_memory() -> Result<Connection, StoreError> {
    let conn = Connection::open_in_memory().map_err(sql("open in-memory database"))?;
    ensure_schema(&conn)?;
    Ok(conn)
}

/// Create the four tables if they are missing. Safe to run on every start.
/// Foreign keys are switched on per connection so memberships cascade when an
/// item or list goes away.
pub fn ensure_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute("PRAGMA foreign_keys = ON", [])
        .map_err(sql("enable foreign keys"))?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE
        )",
        [],
    )
    .map_err(sql("create items table"))?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS item_lists (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            list_name TEXT NOT NULL UNIQUE
        )",
        [],
    )
    .map_err(sql("create item_lists table"))?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS item_lists_items (
            item_list_id INTEGER NOT NULL,
            item_id INTEGER NOT NULL,
            PRIMARY KEY (item_list_id, item_id),
            FOREIGN KEY(item_list_id) REFERENCES item_lists(id) ON DELETE CASCADE,
            FOREIGN KEY(item_id) REFERENCES items(id) ON DELETE CASCADE
        )",
        [],
    )
    .map_err(sql("create item_lists_items table"))?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS settings (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            value TEXT
        )",
        [],
    )
    .map_err(sql("create settings table"))?;

    debug!("schema ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_names(conn: &Connection) -> Vec<String> {
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .unwrap();
        stmt.query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<String>, _>>()
            .unwrap()
    }

    #[test]
    fn creates_all_tables() {
        let conn = open_in_memory().unwrap();
        let names = table_names(&conn);
        for table in ["items", "item_lists", "item_lists_items", "settings"] {
            assert!(names.iter().any(|n| n == table), "missing {table}");
        }
    }

    #[test]
    fn schema_setup_is_idempotent() {
        let conn = open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        ensure_schema(&conn).unwrap();
    }

    #[test]
    fn open_creates_missing_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("choice.sqlite");
        open(&path).unwrap();
        assert!(path.exists());
    }
}
