///! Ingestion pipeline - ledger-gated download, extract and load per archive

use anyhow::Result;
use std::path::Path;
use tracing::{error, info, warn};
use uls_common::SourceArchive;

use super::archive::{ArchiveFetcher, find_file};
use super::ledger::LoadLedger;
use super::loader::{FlatFileLoader, LoadOutcome};
use super::store::UlsStore;
use super::types::FlatTable;

/// Summary of one ingestion run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub loaded: Vec<SourceArchive>,
    pub cached: Vec<SourceArchive>,
    pub failed: Vec<SourceArchive>,
}

impl std::fmt::Display for IngestReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} loaded, {} cached, {} failed",
            self.loaded.len(),
            self.cached.len(),
            self.failed.len()
        )
    }
}

/// Load the five flat files of an extracted archive and mark it loaded.
///
/// Everything runs in one transaction: either every table is merged and
/// the ledger entry written, or nothing is. A missing flat file is logged
/// and reported as [`LoadOutcome::Missing`] without failing the archive.
pub fn load_extracted(
    store: &mut UlsStore,
    loader: &FlatFileLoader,
    archive: SourceArchive,
    dir: &Path,
    fresh: bool,
) -> crate::error::Result<Vec<(FlatTable, LoadOutcome)>> {
    let tx = store.transaction()?;
    let mut outcomes = Vec::with_capacity(FlatTable::ALL.len());

    for table in FlatTable::ALL {
        let outcome = match find_file(dir, table.dat_file()) {
            Some(path) => loader.load(&tx, &path, table.name(), fresh)?,
            None => {
                warn!("{} not found in {:?}, skipping", table.dat_file(), dir);
                LoadOutcome::Missing
            }
        };
        outcomes.push((table, outcome));
    }

    LoadLedger::new(&tx).mark_loaded(archive)?;
    tx.commit()?;

    info!("Marked {} as loaded", archive);
    Ok(outcomes)
}

/// Bring every requested archive into the cache.
///
/// Archives already in the ledger are skipped unless `force` is set. A
/// failure on one archive is logged and the run moves on to the next.
pub async fn ingest_archives(
    store: &mut UlsStore,
    fetcher: &ArchiveFetcher,
    loader: &FlatFileLoader,
    archives: &[SourceArchive],
    force: bool,
) -> Result<IngestReport> {
    let mut report = IngestReport::default();

    for &archive in archives {
        let fresh = !LoadLedger::new(store.conn()).is_loaded(archive)?;

        if !fresh && !force {
            info!("{} already loaded, using cached data", archive);
            report.cached.push(archive);
            continue;
        }

        match ingest_one(store, fetcher, loader, archive).await {
            Ok(()) => report.loaded.push(archive),
            Err(e) => {
                error!("Failed to ingest {}: {:#}", archive, e);
                report.failed.push(archive);
            }
        }
        fetcher.cleanup(archive);
    }

    info!("Ingestion finished: {}", report);
    Ok(report)
}

async fn ingest_one(
    store: &mut UlsStore,
    fetcher: &ArchiveFetcher,
    loader: &FlatFileLoader,
    archive: SourceArchive,
) -> Result<()> {
    fetcher.download(archive).await?;
    let dir = fetcher.extract(archive)?;

    let outcomes = load_extracted(store, loader, archive, &dir, true)?;
    for (table, outcome) in &outcomes {
        info!("{} {}: {}", archive, table, outcome);
    }
    let rows: u64 = outcomes.iter().map(|(_, outcome)| outcome.rows()).sum();
    info!("{}: {} rows merged", archive, rows);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::uls::store::{row_count, table_exists};
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) {
        std::fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn test_load_extracted_marks_ledger() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "EN.dat", "EN|1|a|b\nEN|2|c|d\n");
        write(dir.path(), "HD.dat", "HD|1|x\n");
        write(dir.path(), "EM.dat", "EM|1|y\n");
        write(dir.path(), "LM.dat", "LM|1|z\n");
        write(dir.path(), "LO.dat", "LO|1|w\n");

        let mut store = UlsStore::open_in_memory().unwrap();
        LoadLedger::new(store.conn()).ensure().unwrap();
        let loader = FlatFileLoader::default();

        let outcomes = load_extracted(&mut store, &loader, SourceArchive::LmPriv, dir.path(), true).unwrap();
        assert_eq!(outcomes.len(), 5);
        assert_eq!(outcomes[0].1, LoadOutcome::Created { rows: 2, columns: 4 });
        assert!(LoadLedger::new(store.conn()).is_loaded(SourceArchive::LmPriv).unwrap());

        let again = load_extracted(&mut store, &loader, SourceArchive::LmPriv, dir.path(), false).unwrap();
        assert!(again.iter().all(|(_, outcome)| *outcome == LoadOutcome::Cached));
        assert_eq!(row_count(store.conn(), "EN").unwrap(), 2);
    }

    #[test]
    fn test_load_extracted_tolerates_missing_file() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        write(&dir.path().join("sub"), "EN.dat", "EN|1|a\n");
        write(dir.path(), "HD.dat", "HD|1|x\n");

        let mut store = UlsStore::open_in_memory().unwrap();
        LoadLedger::new(store.conn()).ensure().unwrap();

        let outcomes =
            load_extracted(&mut store, &FlatFileLoader::default(), SourceArchive::Coast, dir.path(), true).unwrap();
        assert_eq!(outcomes[0], (FlatTable::En, LoadOutcome::Created { rows: 1, columns: 3 }));
        assert_eq!(outcomes[2], (FlatTable::Em, LoadOutcome::Missing));
        assert!(LoadLedger::new(store.conn()).is_loaded(SourceArchive::Coast).unwrap());
    }

    #[test]
    fn test_load_extracted_rolls_back_on_storage_error() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "EN.dat", "EN|1|a|b\n");
        write(dir.path(), "HD.dat", "HD|1|x\n");
        write(dir.path(), "EM.dat", "EM|1|y\n");

        let mut store = UlsStore::open_in_memory().unwrap();
        LoadLedger::new(store.conn()).ensure().unwrap();
        store
            .conn()
            .execute_batch(
                "CREATE TABLE HD (col_0 TEXT, col_1 TEXT, col_2 TEXT);
                 CREATE TRIGGER hd_reject BEFORE INSERT ON HD BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
            )
            .unwrap();

        let err = load_extracted(&mut store, &FlatFileLoader::default(), SourceArchive::LmPriv, dir.path(), true)
            .unwrap_err();
        assert!(matches!(err, crate::error::UlsError::Storage(_)));

        // EN was created earlier in the same transaction
        assert!(!table_exists(store.conn(), "EN").unwrap());
        assert_eq!(row_count(store.conn(), "HD").unwrap(), 0);
        assert!(!LoadLedger::new(store.conn()).is_loaded(SourceArchive::LmPriv).unwrap());
    }

    #[test]
    fn test_outcome_rows_sum() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "EN.dat", "EN|1|a\nEN|2|b\n");
        write(dir.path(), "LO.dat", "LO|1|c\n");

        let mut store = UlsStore::open_in_memory().unwrap();
        LoadLedger::new(store.conn()).ensure().unwrap();

        let outcomes =
            load_extracted(&mut store, &FlatFileLoader::default(), SourceArchive::Micro, dir.path(), true).unwrap();
        let rows: u64 = outcomes.iter().map(|(_, outcome)| outcome.rows()).sum();
        assert_eq!(rows, 3);
    }

    #[tokio::test]
    async fn test_ingest_skips_loaded_and_survives_failures() {
        let dir = TempDir::new().unwrap();
        let mut store = UlsStore::open_in_memory().unwrap();
        let ledger = LoadLedger::new(store.conn());
        ledger.ensure().unwrap();
        ledger.mark_loaded(SourceArchive::LmPriv).unwrap();

        // nothing listens on the discard port, so the download fails fast
        let fetcher =
            ArchiveFetcher::new("http://127.0.0.1:9/", dir.path(), std::time::Duration::from_secs(5)).unwrap();
        let report = ingest_archives(
            &mut store,
            &fetcher,
            &FlatFileLoader::default(),
            &[SourceArchive::LmPriv, SourceArchive::Coast],
            false,
        )
        .await
        .unwrap();

        assert_eq!(report.cached, vec![SourceArchive::LmPriv]);
        assert_eq!(report.failed, vec![SourceArchive::Coast]);
        assert!(report.loaded.is_empty());
        assert!(!LoadLedger::new(store.conn()).is_loaded(SourceArchive::Coast).unwrap());
    }

    #[test]
    fn test_report_display() {
        let report = IngestReport {
            loaded: vec![SourceArchive::LmPriv],
            cached: vec![],
            failed: vec![SourceArchive::Coast, SourceArchive::Micro],
        };
        assert_eq!(report.to_string(), "1 loaded, 0 cached, 2 failed");
    }
}
