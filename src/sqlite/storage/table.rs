//! Schema resolution from the `sqlite_schema` table on page 1.
//!
//! Each record in sqlite_schema has 5 columns in order:
//! - type: "table", "index", "view" or "trigger"
//! - name: name of the object
//! - tbl_name: table name this refers to
//! - rootpage: page number of root b-tree
//! - sql: CREATE statement

use crate::sqlite::btree::LeafTablePage;
use crate::sqlite::core::record::{Record, SqlValue};
use crate::sqlite::core::schema::TableSchema;
use crate::sqlite::db::SQLiteDatabase;
use crate::sqlite::error::Result;
use tracing::{debug, info};

const SCHEMA_PAGE: u32 = 1;

const TYPE_COLUMN: usize = 0;
const NAME_COLUMN: usize = 1;
const TBL_NAME_COLUMN: usize = 2;
const ROOTPAGE_COLUMN: usize = 3;
const SQL_COLUMN: usize = 4;

pub struct TableReader<'a> {
    db: &'a SQLiteDatabase,
}

impl<'a> TableReader<'a> {
    pub fn new(db: &'a SQLiteDatabase) -> Self {
        Self { db }
    }

    /// Names of every `table` row, in cell order. Only the type and name
    /// columns are decoded.
    pub fn list_tables(&self) -> Result<Vec<String>> {
        let mut tables = Vec::new();
        self.for_each_table(|record| {
            if let Some(name) = text_column(record, NAME_COLUMN) {
                tables.push(name);
            }
        })?;

        info!("Found tables: {:?}", tables);
        Ok(tables)
    }

    /// Full definitions of every `table` row, in cell order
    pub fn table_schemas(&self) -> Result<Vec<TableSchema>> {
        let mut schemas = Vec::new();
        self.for_each_table(|record| schemas.push(schema_from_record(record)))?;
        Ok(schemas)
    }

    /// The first table named exactly `table_name`
    pub fn find_table(&self, table_name: &str) -> Result<Option<TableSchema>> {
        let schema = self
            .table_schemas()?
            .into_iter()
            .find(|schema| schema.name == table_name);
        debug!("Schema for {:?}: {:?}", table_name, schema);
        Ok(schema)
    }

    fn for_each_table(&self, mut visit: impl FnMut(&Record<'_>)) -> Result<()> {
        let page = self.db.read_page(SCHEMA_PAGE)?;
        let leaf = LeafTablePage::new(&page)?;
        debug!("sqlite_schema has {} cells", leaf.num_cells());

        for cell in leaf.cells() {
            let cell = cell?;
            let record = Record::parse(cell.payload)?;
            match text_column(&record, TYPE_COLUMN).as_deref() {
                Some("table") => visit(&record),
                kind => debug!("Skipping schema row {} of type {:?}", cell.rowid, kind),
            }
        }
        Ok(())
    }
}

fn text_column(record: &Record<'_>, index: usize) -> Option<String> {
    record.value(index).and_then(SqlValue::into_text)
}

fn schema_from_record(record: &Record<'_>) -> TableSchema {
    let root_page = record
        .value(ROOTPAGE_COLUMN)
        .and_then(|value| value.as_integer())
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(0);

    TableSchema {
        kind: text_column(record, TYPE_COLUMN).unwrap_or_default(),
        name: text_column(record, NAME_COLUMN).unwrap_or_default(),
        tbl_name: text_column(record, TBL_NAME_COLUMN).unwrap_or_default(),
        root_page,
        sql: text_column(record, SQL_COLUMN).unwrap_or_default(),
    }
}
