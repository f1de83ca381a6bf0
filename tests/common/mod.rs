//! Builds small SQLite database files byte by byte for tests.
#![allow(dead_code)]

use sqlite_reader::sqlite::core::header::DatabaseHeader;
use sqlite_reader::sqlite::core::varint::encode_varint;
use std::io::Write;
use tempfile::NamedTempFile;

pub const PAGE_SIZE: usize = 512;

/// A column value as it will be stored in a record
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Int(i64),
    Text(String),
    /// Any serial type with its body bytes, stored as given
    Raw(u64, Vec<u8>),
}

pub fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}

/// Encodes values in the record format, picking the narrowest integer type
pub fn record(values: &[Value]) -> Vec<u8> {
    let mut types = Vec::new();
    let mut body = Vec::new();

    for value in values {
        let (code, bytes) = match value {
            Value::Null => (0, Vec::new()),
            Value::Int(0) => (8, Vec::new()),
            Value::Int(1) => (9, Vec::new()),
            Value::Int(n) if i8::try_from(*n).is_ok() => (1, (*n as i8).to_be_bytes().to_vec()),
            Value::Int(n) if i16::try_from(*n).is_ok() => (2, (*n as i16).to_be_bytes().to_vec()),
            Value::Int(n) if (-8_388_608..=8_388_607).contains(n) => {
                (3, (*n as i32).to_be_bytes()[1..].to_vec())
            }
            Value::Int(n) if i32::try_from(*n).is_ok() => (4, (*n as i32).to_be_bytes().to_vec()),
            Value::Int(n) => (6, n.to_be_bytes().to_vec()),
            Value::Text(s) => (13 + 2 * s.len() as u64, s.as_bytes().to_vec()),
            Value::Raw(code, bytes) => (*code, bytes.clone()),
        };
        types.extend(encode_varint(code));
        body.extend(bytes);
    }

    let mut header_len = types.len() + 1;
    if encode_varint(header_len as u64).len() > 1 {
        header_len += 1;
    }
    let mut out = encode_varint(header_len as u64);
    out.extend(types);
    out.extend(body);
    out
}

/// A leaf table page holding `cells` (rowid, record), content written from
/// the end of the page backwards like SQLite does
pub fn leaf_page(page_size: usize, header_offset: usize, cells: &[(u64, Vec<u8>)]) -> Vec<u8> {
    let mut page = vec![0u8; page_size];
    page[header_offset] = 0x0d;
    page[header_offset + 3..header_offset + 5].copy_from_slice(&(cells.len() as u16).to_be_bytes());

    let mut content = page_size;
    for (i, (rowid, payload)) in cells.iter().enumerate() {
        let mut cell = encode_varint(payload.len() as u64);
        cell.extend(encode_varint(*rowid));
        cell.extend_from_slice(payload);
        content -= cell.len();
        page[content..content + cell.len()].copy_from_slice(&cell);

        let ptr = header_offset + 8 + i * 2;
        page[ptr..ptr + 2].copy_from_slice(&(content as u16).to_be_bytes());
    }
    page[header_offset + 5..header_offset + 7].copy_from_slice(&(content as u16).to_be_bytes());
    page
}

/// Database under construction: schema rows for page 1 and the pages after it
pub struct Fixture {
    page_size: usize,
    schema: Vec<Vec<Value>>,
    pages: Vec<Vec<u8>>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_page_size(PAGE_SIZE)
    }

    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            page_size,
            schema: Vec::new(),
            pages: Vec::new(),
        }
    }

    /// Adds a table whose rows live on one new leaf page; returns that page number
    pub fn table(&mut self, name: &str, sql: &str, rows: &[(u64, Vec<Value>)]) -> u32 {
        let cells: Vec<(u64, Vec<u8>)> = rows
            .iter()
            .map(|(rowid, values)| (*rowid, record(values)))
            .collect();
        let root = self.page(leaf_page(self.page_size, 0, &cells));
        self.schema_row("table", name, name, root, sql);
        root
    }

    /// Appends a raw page and returns its page number
    pub fn page(&mut self, bytes: Vec<u8>) -> u32 {
        assert_eq!(bytes.len(), self.page_size);
        self.pages.push(bytes);
        self.pages.len() as u32 + 1
    }

    pub fn schema_row(&mut self, kind: &str, name: &str, tbl_name: &str, root: u32, sql: &str) {
        self.schema.push(vec![
            text(kind),
            text(name),
            text(tbl_name),
            Value::Int(root as i64),
            text(sql),
        ]);
    }

    pub fn bytes(&self) -> Vec<u8> {
        let cells: Vec<(u64, Vec<u8>)> = self
            .schema
            .iter()
            .enumerate()
            .map(|(i, values)| (i as u64 + 1, record(values)))
            .collect();
        let mut first = leaf_page(self.page_size, DatabaseHeader::HEADER_SIZE, &cells);

        let raw_page_size: u16 = if self.page_size == 65_536 {
            1
        } else {
            self.page_size as u16
        };
        let page_count = self.pages.len() as u32 + 1;

        first[..16].copy_from_slice(DatabaseHeader::MAGIC_STRING);
        first[16..18].copy_from_slice(&raw_page_size.to_be_bytes());
        first[18] = 1;
        first[19] = 1;
        first[21] = 64;
        first[22] = 32;
        first[23] = 32;
        first[24..28].copy_from_slice(&1u32.to_be_bytes());
        first[28..32].copy_from_slice(&page_count.to_be_bytes());
        first[40..44].copy_from_slice(&1u32.to_be_bytes());
        first[44..48].copy_from_slice(&4u32.to_be_bytes());
        first[56..60].copy_from_slice(&1u32.to_be_bytes());
        first[92..96].copy_from_slice(&1u32.to_be_bytes());
        first[96..100].copy_from_slice(&3_045_000u32.to_be_bytes());

        let mut out = first;
        for page in &self.pages {
            out.extend_from_slice(page);
        }
        out
    }

    pub fn write(&self) -> NamedTempFile {
        write_bytes(&self.bytes())
    }
}

pub fn write_bytes(bytes: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(bytes).expect("write temp file");
    file.flush().expect("flush temp file");
    file
}

/// The two-row `t(id INTEGER, name TEXT)` database
pub fn people() -> Fixture {
    let mut fixture = Fixture::new();
    fixture.table(
        "t",
        "CREATE TABLE t(id INTEGER, name TEXT)",
        &[
            (1, vec![Value::Int(1), text("alice")]),
            (2, vec![Value::Int(2), text("bob")]),
        ],
    );
    fixture
}
