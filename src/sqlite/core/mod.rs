pub mod bytes;
pub mod header;
pub mod record;
pub mod schema;
pub mod varint;
