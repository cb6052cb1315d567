///! Column map - positional columns to record fields
///!
///! Flat tables only know `col_N`. The meaning of each position lives here
///! and nowhere else, so the storage layer stays schema-less.

use super::types::{FlatTable, column_name};

/// A positional column of one flat table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnRef {
    pub table: FlatTable,
    pub index: usize,
}

impl ColumnRef {
    pub const fn new(table: FlatTable, index: usize) -> Self {
        Self { table, index }
    }

    /// Qualified SQL reference, e.g. `EM.col_7`
    pub fn sql(&self) -> String {
        format!("{}.{}", self.table.name(), column_name(self.index))
    }
}

/// Position of the entity key (unique system identifier) in every table
pub const ENTITY_KEY_INDEX: usize = 1;

pub const fn entity_key(table: FlatTable) -> ColumnRef {
    ColumnRef::new(table, ENTITY_KEY_INDEX)
}

pub const EM_CALL_SIGN: ColumnRef = ColumnRef::new(FlatTable::Em, 4);
pub const EM_FREQUENCY: ColumnRef = ColumnRef::new(FlatTable::Em, 7);

pub const EN_ENTITY_NAME: ColumnRef = ColumnRef::new(FlatTable::En, 7);
pub const EN_CITY: ColumnRef = ColumnRef::new(FlatTable::En, 16);
pub const EN_STATE: ColumnRef = ColumnRef::new(FlatTable::En, 17);
pub const EN_ZIP: ColumnRef = ColumnRef::new(FlatTable::En, 18);

pub const HD_STATUS: ColumnRef = ColumnRef::new(FlatTable::Hd, 5);
pub const HD_SERVICE: ColumnRef = ColumnRef::new(FlatTable::Hd, 6);

pub const LM_ELIGIBILITY: ColumnRef = ColumnRef::new(FlatTable::Lm, 6);

pub const LO_CITY: ColumnRef = ColumnRef::new(FlatTable::Lo, 12);
pub const LO_COUNTY: ColumnRef = ColumnRef::new(FlatTable::Lo, 13);
