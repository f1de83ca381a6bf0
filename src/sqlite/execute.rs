//! Table scans.
//!
//! Reads every row of a table whose root page is a single leaf page. Missing
//! tables, non-leaf roots and undecodable cells give an empty result with a
//! [`QueryStatus`] saying why, rather than an error; only failing to read a
//! page from the file is an `Err`.

use super::btree::LeafTablePage;
use super::core::record::{Record, SqlValue};
use super::db::SQLiteDatabase;
use super::error::{Error, Result};
use super::storage::table::TableReader;
use std::collections::HashMap;
use tracing::{info, warn};

/// Key under which every row carries its rowid
pub const ROWID_COLUMN: &str = "_rowid_";

/// Column name to value; includes [`ROWID_COLUMN`]
pub type Row = HashMap<String, SqlValue>;

/// Why a query did or did not produce rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryStatus {
    Ok,
    /// No table with that name in the schema
    NotFound,
    /// The root page is not a leaf table page
    UnsupportedPageType(u8),
    /// A cell or the schema entry could not be decoded
    Malformed(String),
}

/// Result of scanning a table
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    /// Declared column names, in order
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    pub status: QueryStatus,
}

impl QueryResult {
    fn empty(columns: Vec<String>, status: QueryStatus) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            status,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == QueryStatus::Ok
    }
}

impl SQLiteDatabase {
    /// Returns every row of `table_name`.
    ///
    /// The same statuses apply while resolving the name: a page 1 that is not
    /// a leaf gives [`QueryStatus::UnsupportedPageType`] and an undecodable
    /// schema row gives [`QueryStatus::Malformed`].
    pub fn query_table(&self, table_name: &str) -> Result<QueryResult> {
        let schema = match TableReader::new(self).find_table(table_name) {
            Ok(Some(schema)) => schema,
            Ok(None) => {
                info!("Table {:?} not found", table_name);
                return Ok(QueryResult::empty(Vec::new(), QueryStatus::NotFound));
            }
            Err(Error::UnsupportedPageType(page_type)) => {
                info!(
                    "Schema page has type {:#04x}, cannot resolve {:?}",
                    page_type, table_name
                );
                return Ok(QueryResult::empty(
                    Vec::new(),
                    QueryStatus::UnsupportedPageType(page_type),
                ));
            }
            Err(e) if e.is_storage() => return Err(e),
            Err(e) => return Ok(malformed(Vec::new(), table_name, e)),
        };

        let columns = schema.column_names();
        if schema.root_page == 0 {
            warn!("Table {:?} has no usable root page", table_name);
            return Ok(QueryResult::empty(
                columns,
                QueryStatus::Malformed("invalid root page".to_string()),
            ));
        }

        let page = self.read_page(schema.root_page)?;
        let leaf = match LeafTablePage::new(&page) {
            Ok(leaf) => leaf,
            Err(Error::UnsupportedPageType(page_type)) => {
                info!(
                    "Root page {} of {:?} has type {:#04x}, no rows decoded",
                    schema.root_page, table_name, page_type
                );
                return Ok(QueryResult::empty(
                    columns,
                    QueryStatus::UnsupportedPageType(page_type),
                ));
            }
            Err(e) => return Ok(malformed(columns, table_name, e)),
        };

        let mut rows = Vec::with_capacity(leaf.num_cells());
        for cell in leaf.cells() {
            let decoded = cell.and_then(|cell| {
                let record = Record::parse(cell.payload)?;
                Ok(build_row(&columns, cell.rowid, record.values()))
            });
            match decoded {
                Ok(row) => rows.push(row),
                Err(e) => return Ok(malformed(columns, table_name, e)),
            }
        }

        info!("Read {} rows from {:?}", rows.len(), table_name);
        Ok(QueryResult {
            columns,
            rows,
            status: QueryStatus::Ok,
        })
    }
}

fn malformed(columns: Vec<String>, table_name: &str, error: Error) -> QueryResult {
    warn!("Failed to decode {:?}: {}", table_name, error);
    QueryResult::empty(columns, QueryStatus::Malformed(error.to_string()))
}

/// Pairs values with column names; values past the declared columns are
/// named `col_<index>`.
fn build_row(columns: &[String], rowid: i64, values: Vec<SqlValue>) -> Row {
    let mut row: Row = values
        .into_iter()
        .enumerate()
        .map(|(i, value)| {
            let name = columns
                .get(i)
                .cloned()
                .unwrap_or_else(|| format!("col_{}", i));
            (name, value)
        })
        .collect();
    row.insert(ROWID_COLUMN.to_string(), SqlValue::Integer(rowid));
    row
}
