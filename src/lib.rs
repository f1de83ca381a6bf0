pub mod sqlite;

pub use sqlite::core::record::SqlValue;
pub use sqlite::core::schema::TableSchema;
pub use sqlite::{Error, QueryResult, QueryStatus, Row, SQLiteDatabase};
