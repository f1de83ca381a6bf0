//! Read-only decoding of SQLite database files.

pub mod btree;
pub mod core;
pub mod db;
pub mod error;
pub mod execute;
pub mod statement;
pub mod storage;

pub use db::{Page, SQLiteDatabase, SQLiteDatabaseInfo};
pub use error::{Error, Result};
pub use execute::{QueryResult, QueryStatus, Row, ROWID_COLUMN};
