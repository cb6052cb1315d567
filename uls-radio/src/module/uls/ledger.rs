///! Load ledger - which source archives are already merged into the cache
///!
///! Presence of an entry means the archive's rows are in the relation set.
///! It does not track content changes: an archive is reloaded only when it
///! was never marked, or when the caller forces a clean cache.

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};
use uls_common::SourceArchive;

use super::store::table_exists;
use crate::error::Result;

pub const LEDGER_TABLE: &str = "loaded_zips";

/// Ledger view over a connection or an open transaction
pub struct LoadLedger<'a> {
    conn: &'a Connection,
}

impl<'a> LoadLedger<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Create the ledger table if it does not exist yet.
    pub fn ensure(&self) -> Result<()> {
        if !table_exists(self.conn, LEDGER_TABLE)? {
            self.create()?;
            tracing::debug!("Created load ledger table {}", LEDGER_TABLE);
        }
        Ok(())
    }

    /// Drop every entry, forcing all archives to load again.
    pub fn reset(&self) -> Result<()> {
        self.create()?;
        tracing::info!("Load ledger reset");
        Ok(())
    }

    fn create(&self) -> Result<()> {
        self.conn.execute_batch(&format!(
            "DROP TABLE IF EXISTS \"{table}\";
             CREATE TABLE \"{table}\" (
                 zip_filename TEXT PRIMARY KEY,
                 date TEXT
             );",
            table = LEDGER_TABLE
        ))?;
        Ok(())
    }

    pub fn is_loaded(&self, archive: SourceArchive) -> Result<bool> {
        Ok(self.loaded_at(archive)?.is_some())
    }

    /// Timestamp (RFC 3339, UTC) of the last successful load
    pub fn loaded_at(&self, archive: SourceArchive) -> Result<Option<String>> {
        let date = self
            .conn
            .query_row(
                "SELECT date FROM loaded_zips WHERE zip_filename = ?1",
                [archive.file_name()],
                |row| row.get::<_, Option<String>>(0),
            )
            .optional()?;
        Ok(date.map(|d| d.unwrap_or_default()))
    }

    /// Upsert (archive, now). Last write wins.
    pub fn mark_loaded(&self, archive: SourceArchive) -> Result<()> {
        let timestamp = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT OR REPLACE INTO loaded_zips (zip_filename, date) VALUES (?1, ?2)",
            [archive.file_name(), timestamp.as_str()],
        )?;
        tracing::debug!("Marked {} as loaded at {}", archive, timestamp);
        Ok(())
    }

    /// All recorded archives with their load timestamps
    pub fn entries(&self) -> Result<Vec<(String, String)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT zip_filename, COALESCE(date, '') FROM loaded_zips ORDER BY zip_filename")?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::uls::store::UlsStore;

    #[test]
    fn test_mark_and_check() {
        let store = UlsStore::open_in_memory().unwrap();
        let ledger = LoadLedger::new(store.conn());
        ledger.ensure().unwrap();

        assert!(!ledger.is_loaded(SourceArchive::LmPriv).unwrap());
        ledger.mark_loaded(SourceArchive::LmPriv).unwrap();
        assert!(ledger.is_loaded(SourceArchive::LmPriv).unwrap());
        assert!(!ledger.is_loaded(SourceArchive::Coast).unwrap());
    }

    #[test]
    fn test_mark_is_idempotent() {
        let store = UlsStore::open_in_memory().unwrap();
        let ledger = LoadLedger::new(store.conn());
        ledger.ensure().unwrap();

        ledger.mark_loaded(SourceArchive::Paging).unwrap();
        ledger.mark_loaded(SourceArchive::Paging).unwrap();

        let entries = ledger.entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, "l_paging.zip");
        assert!(!entries[0].1.is_empty());
    }

    #[test]
    fn test_ensure_keeps_entries_and_reset_clears() {
        let store = UlsStore::open_in_memory().unwrap();
        let ledger = LoadLedger::new(store.conn());
        ledger.ensure().unwrap();
        ledger.mark_loaded(SourceArchive::Micro).unwrap();

        ledger.ensure().unwrap();
        assert!(ledger.is_loaded(SourceArchive::Micro).unwrap());

        ledger.reset().unwrap();
        assert!(!ledger.is_loaded(SourceArchive::Micro).unwrap());
    }

    #[test]
    fn test_uncommitted_mark_is_not_visible() {
        let mut store = UlsStore::open_in_memory().unwrap();
        LoadLedger::new(store.conn()).ensure().unwrap();

        {
            let tx = store.transaction().unwrap();
            LoadLedger::new(&tx).mark_loaded(SourceArchive::Market).unwrap();
            // dropped without commit
        }

        assert!(!LoadLedger::new(store.conn()).is_loaded(SourceArchive::Market).unwrap());
    }
}
