///! Flat-file loader - pipe-delimited ULS files into positional tables
///!
///! The column count of a table is detected by sampling the head of its
///! source file and stays fixed for the table's lifetime. Rows are padded or
///! truncated to that width before insertion.

use rusqlite::{Connection, params_from_iter};
use std::fs::File;
use std::path::Path;
use tracing::{debug, info, warn};

use super::store::{table_exists, table_width};
use super::types::{column_name, quote_ident};
use crate::error::Result;

/// Lines sampled to detect a file's column count
pub const DEFAULT_SAMPLE_LINES: usize = 100;

const DELIMITER: u8 = b'|';

/// What happened to one flat file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Table created and filled
    Created { rows: u64, columns: usize },
    /// Rows appended to an existing table
    Appended { rows: u64, columns: usize },
    /// Table already present and the load was not fresh
    Cached,
    /// Source file does not exist
    Missing,
    /// Source file has no rows
    Empty,
}

impl LoadOutcome {
    pub fn rows(&self) -> u64 {
        match self {
            LoadOutcome::Created { rows, .. } | LoadOutcome::Appended { rows, .. } => *rows,
            _ => 0,
        }
    }
}

impl std::fmt::Display for LoadOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadOutcome::Created { rows, columns } => write!(f, "created ({} rows, {} columns)", rows, columns),
            LoadOutcome::Appended { rows, columns } => write!(f, "appended ({} rows, {} columns)", rows, columns),
            LoadOutcome::Cached => write!(f, "cached"),
            LoadOutcome::Missing => write!(f, "missing"),
            LoadOutcome::Empty => write!(f, "empty"),
        }
    }
}

/// Loads pipe-delimited flat files into generic text tables
#[derive(Debug, Clone)]
pub struct FlatFileLoader {
    sample_lines: usize,
}

impl Default for FlatFileLoader {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_LINES)
    }
}

impl FlatFileLoader {
    pub fn new(sample_lines: usize) -> Self {
        Self {
            sample_lines: sample_lines.max(1),
        }
    }

    fn reader(path: &Path) -> Result<csv::Reader<File>> {
        let reader = csv::ReaderBuilder::new()
            .delimiter(DELIMITER)
            .has_headers(false)
            .flexible(true) // field count varies per line
            .from_path(path)?;
        Ok(reader)
    }

    /// Maximum field count over the first `sample_lines` lines.
    pub fn detect_column_count(&self, path: &Path) -> Result<usize> {
        let mut reader = Self::reader(path)?;
        let mut width = 0;

        for record in reader.byte_records().take(self.sample_lines) {
            width = width.max(record?.len());
        }

        Ok(width)
    }

    /// Load `path` into `table`.
    ///
    /// An existing table is left untouched unless `fresh` is set, in which
    /// case rows are appended at the table's original width. Runs on the
    /// given connection, so callers wrap it in a transaction for
    /// all-or-nothing loads.
    pub fn load(&self, conn: &Connection, path: &Path, table: &str, fresh: bool) -> Result<LoadOutcome> {
        if !path.exists() {
            warn!("{:?} not found, skipping table {}", path, table);
            return Ok(LoadOutcome::Missing);
        }

        let exists = table_exists(conn, table)?;

        if exists && !fresh {
            info!("Table {} exists. Using existing table and row data", table);
            return Ok(LoadOutcome::Cached);
        }

        let columns = if exists {
            info!("Table {} exists. Appending row data", table);
            table_width(conn, table)?
        } else {
            let detected = self.detect_column_count(path)?;
            if detected == 0 {
                warn!("{:?} has no rows, skipping table {}", path, table);
                return Ok(LoadOutcome::Empty);
            }
            create_table(conn, table, detected)?;
            detected
        };

        info!("Loading {} from {:?}", table, path);
        let rows = insert_rows(conn, path, table, columns)?;
        info!("Inserted {} rows into {}", rows, table);

        Ok(if exists {
            LoadOutcome::Appended { rows, columns }
        } else {
            LoadOutcome::Created { rows, columns }
        })
    }
}

fn create_table(conn: &Connection, table: &str, columns: usize) -> Result<()> {
    let cols: Vec<String> = (0..columns)
        .map(|i| format!("{} TEXT", quote_ident(&column_name(i))))
        .collect();

    conn.execute_batch(&format!(
        "DROP TABLE IF EXISTS {table};\nCREATE TABLE {table} ({cols});",
        table = quote_ident(table),
        cols = cols.join(", ")
    ))?;

    debug!("Created table {} with {} columns", table, columns);
    Ok(())
}

fn insert_rows(conn: &Connection, path: &Path, table: &str, columns: usize) -> Result<u64> {
    let placeholders = vec!["?"; columns].join(",");
    let sql = format!("INSERT INTO {} VALUES ({})", quote_ident(table), placeholders);
    let mut stmt = conn.prepare(&sql)?;

    let mut reader = FlatFileLoader::reader(path)?;
    let mut rows = 0u64;

    for record in reader.byte_records() {
        let record = record?;
        let fields = normalize_width(record.iter().map(decode_latin1).collect(), columns);
        stmt.execute(params_from_iter(fields.iter()))?;
        rows += 1;
    }

    Ok(rows)
}

/// Pad with empty strings or truncate to exactly `columns` fields.
pub fn normalize_width(mut fields: Vec<String>, columns: usize) -> Vec<String> {
    fields.resize(columns, String::new());
    fields
}

/// Decode a single-byte (ISO-8859-1) field. Every byte maps to one char,
/// so no input can fail the load.
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}
