///! Relational cache - SQLite file holding the flat tables and the load ledger

use rusqlite::{Connection, Transaction};
use std::path::Path;
use tracing::info;

use crate::error::Result;

/// UlsStore owns the connection to the on-disk cache.
///
/// The cache is reused between runs; concurrent runs against the same file
/// are not supported.
pub struct UlsStore {
    conn: Connection,
}

impl UlsStore {
    /// Open or create the cache at the given path, creating parent directories.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    /// Create an in-memory cache (useful for tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Delete the cache file so the next `open` starts empty.
    pub fn remove(path: &Path) -> Result<bool> {
        if !path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(path)?;
        info!("Removed cache database {:?}", path);
        Ok(true)
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Begin a transaction; dropped without commit it rolls back.
    pub fn transaction(&mut self) -> Result<Transaction<'_>> {
        Ok(self.conn.transaction()?)
    }
}

/// Check whether a table exists in the cache.
pub fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1")?;
    Ok(stmt.exists([table])?)
}

/// Number of columns of an existing table.
pub fn table_width(conn: &Connection, table: &str) -> Result<usize> {
    let mut stmt = conn.prepare("SELECT COUNT(*) FROM pragma_table_info(?1)")?;
    let width: i64 = stmt.query_row([table], |row| row.get(0))?;
    Ok(width as usize)
}

/// Number of rows in a table.
pub fn row_count(conn: &Connection, table: &str) -> Result<u64> {
    let sql = format!("SELECT COUNT(*) FROM {}", super::types::quote_ident(table));
    let count: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
    Ok(count as u64)
}
