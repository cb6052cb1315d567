///! ULS data pipeline
///!
///! Archives are fetched and unpacked, their flat files loaded into the
///! SQLite relation set under the load ledger, and the relation set searched
///! for license records.

mod types;
pub use types::{FlatTable, column_name, quote_ident};

pub mod columns;
pub use columns::{ColumnRef, ENTITY_KEY_INDEX, entity_key};

mod store;
pub use store::{UlsStore, row_count, table_exists, table_width};

mod ledger;
pub use ledger::{LEDGER_TABLE, LoadLedger};

mod loader;
pub use loader::{DEFAULT_SAMPLE_LINES, FlatFileLoader, LoadOutcome, decode_latin1, normalize_width};

mod query;
pub use query::{Field, Join, JoinKind, LicenseSearch, Predicate, QueryEngine, SelectQuery, debug_sql};

mod archive;
pub use archive::{ArchiveFetcher, DEFAULT_BASE_URL, extract_zip, find_file};

mod ingest;
pub use ingest::{IngestReport, ingest_archives, load_extracted};
