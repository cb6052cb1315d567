///! Query engine - license search across the relation set
///!
///! The SELECT is described as data (projection, joins, predicates, grouping,
///! ordering) and rendered to SQL in one place, so join and filter
///! composition can be checked without a live store.
///!
///! Results are grouped by frequency. Distinct licenses that happen to share
///! a frequency value collapse into one row; this deduplication is
///! approximate by design of the search and callers must accept it.

use rusqlite::Connection;
use tracing::{debug, error, info};
use uls_common::{LicenseRecord, StatusFilter};

use super::columns::{self, ColumnRef, entity_key};
use super::types::FlatTable;
use crate::error::{Result, UlsError};

/// A projected value: a raw column, or one trimmed and upper-cased
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Raw(ColumnRef),
    Normalized(ColumnRef),
}

impl Field {
    pub fn sql(&self) -> String {
        match self {
            Field::Raw(col) => col.sql(),
            Field::Normalized(col) => format!("TRIM(UPPER({}))", col.sql()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    /// Row is dropped when the joined table has no match
    Inner,
    /// Optional enrichment, unmatched columns come back NULL
    Left,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    pub kind: JoinKind,
    pub table: FlatTable,
    /// Equality conditions, combined with AND
    pub on: Vec<(ColumnRef, ColumnRef)>,
}

impl Join {
    fn sql(&self) -> String {
        let keyword = match self.kind {
            JoinKind::Inner => "JOIN",
            JoinKind::Left => "LEFT JOIN",
        };
        let conditions: Vec<String> = self
            .on
            .iter()
            .map(|(left, right)| format!("{} = {}", left.sql(), right.sql()))
            .collect();
        format!("{} {} ON {}", keyword, self.table.name(), conditions.join(" AND "))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Eq(Field, String),
    In(Field, Vec<String>),
}

impl Predicate {
    fn render(&self, params: &mut Vec<String>) -> String {
        match self {
            Predicate::Eq(field, value) => {
                params.push(value.clone());
                format!("{} = ?", field.sql())
            }
            Predicate::In(field, values) => {
                params.extend(values.iter().cloned());
                format!("{} IN ({})", field.sql(), vec!["?"; values.len()].join(","))
            }
        }
    }
}

/// Structured SELECT over flat tables
#[derive(Debug, Clone)]
pub struct SelectQuery {
    pub projection: Vec<(Field, &'static str)>,
    pub from: FlatTable,
    pub joins: Vec<Join>,
    pub predicates: Vec<Predicate>,
    pub group_by: Option<Field>,
    pub order_by: Vec<String>,
}

impl SelectQuery {
    /// Render to SQL text plus positional parameters
    pub fn to_sql(&self) -> (String, Vec<String>) {
        let mut params = Vec::new();

        let columns: Vec<String> = self
            .projection
            .iter()
            .map(|(field, alias)| format!("{} AS {}", field.sql(), alias))
            .collect();

        let mut sql = format!("SELECT {}\nFROM {}", columns.join(", "), self.from.name());

        for join in &self.joins {
            sql.push('\n');
            sql.push_str(&join.sql());
        }

        if !self.predicates.is_empty() {
            let clauses: Vec<String> = self.predicates.iter().map(|p| p.render(&mut params)).collect();
            sql.push_str("\nWHERE ");
            sql.push_str(&clauses.join(" AND "));
        }

        if let Some(group) = &self.group_by {
            sql.push_str(&format!("\nGROUP BY {}", group.sql()));
        }

        if !self.order_by.is_empty() {
            sql.push_str(&format!("\nORDER BY {}", self.order_by.join(", ")));
        }

        (sql, params)
    }
}

/// Search criteria for [`QueryEngine::search`]
#[derive(Debug, Clone, Default)]
pub struct LicenseSearch {
    /// Radio service codes, matched with OR. Required.
    pub service_codes: Vec<String>,
    pub zip_codes: Vec<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub status: StatusFilter,
}

impl LicenseSearch {
    /// Build the license query. Fails only when no service code is given.
    pub fn to_query(&self) -> Result<SelectQuery> {
        let service_codes: Vec<String> = self
            .service_codes
            .iter()
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect();

        if service_codes.is_empty() {
            return Err(UlsError::Configuration("at least one service code is required".to_string()));
        }

        let projection = vec![
            (Field::Raw(columns::EM_FREQUENCY), "frequency_assigned"),
            (Field::Raw(columns::EM_CALL_SIGN), "call_sign"),
            (Field::Normalized(columns::EN_ENTITY_NAME), "entity_name"),
            (Field::Normalized(columns::LM_ELIGIBILITY), "eligibility"),
            (Field::Normalized(columns::EN_CITY), "city"),
            (Field::Raw(columns::EN_STATE), "state"),
            (Field::Raw(columns::EN_ZIP), "zip_code"),
            (Field::Normalized(columns::LO_COUNTY), "county"),
            (Field::Raw(columns::HD_SERVICE), "service_code"),
            (Field::Raw(columns::HD_STATUS), "status"),
        ];

        let hd_key = entity_key(FlatTable::Hd);
        let joins = vec![
            Join {
                kind: JoinKind::Inner,
                table: FlatTable::Hd,
                on: vec![(entity_key(FlatTable::Em), hd_key)],
            },
            Join {
                kind: JoinKind::Inner,
                table: FlatTable::En,
                on: vec![(hd_key, entity_key(FlatTable::En))],
            },
            Join {
                kind: JoinKind::Left,
                table: FlatTable::Lm,
                on: vec![(hd_key, entity_key(FlatTable::Lm))],
            },
            // the city key keeps unrelated county rows of the same license out
            Join {
                kind: JoinKind::Left,
                table: FlatTable::Lo,
                on: vec![(hd_key, entity_key(FlatTable::Lo)), (columns::LO_CITY, columns::EN_CITY)],
            },
        ];

        let mut predicates = vec![Predicate::In(Field::Raw(columns::HD_SERVICE), service_codes)];

        if let Some(city) = self.city.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            predicates.push(Predicate::Eq(Field::Normalized(columns::EN_CITY), city.to_uppercase()));
        }

        let zip_codes: Vec<String> = self
            .zip_codes
            .iter()
            .map(|z| z.trim().to_string())
            .filter(|z| !z.is_empty())
            .collect();
        if !zip_codes.is_empty() {
            predicates.push(Predicate::In(Field::Raw(columns::EN_ZIP), zip_codes));
        }

        if let Some(state) = self.state.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            predicates.push(Predicate::Eq(Field::Raw(columns::EN_STATE), state.to_uppercase()));
        }

        if let Some(code) = self.status.status_code() {
            predicates.push(Predicate::Eq(Field::Raw(columns::HD_STATUS), code.to_string()));
        }

        let frequency = columns::EM_FREQUENCY.sql();

        Ok(SelectQuery {
            projection,
            from: FlatTable::Em,
            joins,
            predicates,
            group_by: Some(Field::Raw(columns::EM_FREQUENCY)),
            order_by: vec![format!("CAST({} AS REAL) ASC", frequency), format!("{} ASC", frequency)],
        })
    }
}

/// Inline parameters into SQL text for logging
pub fn debug_sql(sql: &str, params: &[String]) -> String {
    let mut printable = String::with_capacity(sql.len());
    let mut params = params.iter().peekable();

    for c in sql.chars() {
        match (c, params.next_if(|_| c == '?')) {
            (_, Some(p)) => printable.push_str(&format!("'{}'", p.replace('\'', "''"))),
            (c, None) => printable.push(c),
        }
    }

    printable
}

/// Read-only search over the relation set
pub struct QueryEngine<'a> {
    conn: &'a Connection,
}

impl<'a> QueryEngine<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Search licenses, ordered by ascending frequency.
    ///
    /// Storage errors (missing table, malformed join) are logged and yield
    /// an empty result. Only an invalid request is returned as an error.
    pub fn search(&self, search: &LicenseSearch) -> Result<Vec<LicenseRecord>> {
        let query = search.to_query()?;

        match self.run(&query) {
            Ok(records) => {
                if records.is_empty() {
                    info!("No results found");
                }
                Ok(records)
            }
            Err(e) => {
                error!("Query error: {}", e);
                Ok(Vec::new())
            }
        }
    }

    /// Run a query and map rows positionally onto license records.
    pub fn run(&self, query: &SelectQuery) -> Result<Vec<LicenseRecord>> {
        let (sql, params) = query.to_sql();
        debug!("Executed SQL query:\n{}", debug_sql(&sql, &params));

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(params.iter()), |row| {
            let text = |i: usize| -> rusqlite::Result<String> {
                Ok(row.get::<_, Option<String>>(i)?.unwrap_or_default())
            };
            Ok(LicenseRecord {
                frequency: text(0)?,
                call_sign: text(1)?,
                entity_name: text(2)?,
                eligibility: text(3)?,
                city: text(4)?,
                state: text(5)?,
                zip_code: text(6)?,
                county: text(7)?,
                service_code: text(8)?,
                status: text(9)?,
            })
        })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        debug!("Query returned {} records", records.len());
        Ok(records)
    }

    /// Distinct service codes present in the header table
    pub fn list_service_codes(&self) -> Result<Vec<String>> {
        let service = columns::HD_SERVICE.sql();
        let sql = format!(
            "SELECT DISTINCT {col} FROM {table} WHERE {col} IS NOT NULL AND {col} <> '' ORDER BY {col}",
            col = service,
            table = FlatTable::Hd.name()
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut codes = Vec::new();
        for row in rows {
            codes.push(row?);
        }
        Ok(codes)
    }
}
