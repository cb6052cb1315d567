///! Flat table vocabulary for the ULS relation set
///!
///! Every source archive carries the same five pipe-delimited files; each one
///! is loaded into a table of the same name with positional `col_N` columns.

/// One of the five loaded tables, star-joined on the entity key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlatTable {
    /// Entity (licensee name and address)
    En,
    /// License header (service code, status)
    Hd,
    /// Emission / frequency rows
    Em,
    /// License class (eligibility)
    Lm,
    /// Location (county)
    Lo,
}

impl FlatTable {
    /// Tables in load order
    pub const ALL: [FlatTable; 5] = [
        FlatTable::En,
        FlatTable::Hd,
        FlatTable::Em,
        FlatTable::Lm,
        FlatTable::Lo,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FlatTable::En => "EN",
            FlatTable::Hd => "HD",
            FlatTable::Em => "EM",
            FlatTable::Lm => "LM",
            FlatTable::Lo => "LO",
        }
    }

    /// Source file inside an extracted archive
    pub fn dat_file(&self) -> &'static str {
        match self {
            FlatTable::En => "EN.dat",
            FlatTable::Hd => "HD.dat",
            FlatTable::Em => "EM.dat",
            FlatTable::Lm => "LM.dat",
            FlatTable::Lo => "LO.dat",
        }
    }
}

impl std::fmt::Display for FlatTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Positional column name used by every flat table
pub fn column_name(index: usize) -> String {
    format!("col_{}", index)
}

/// Quote an SQL identifier, doubling embedded quotes
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
