//! SQLite Record Format Implementation
//!
//! This module handles parsing SQLite records (rows) according to the file format specification.
//!
//! ## Record Format
//!
//! A record is the payload of a cell and consists of:
//!
//! - A header containing:
//!   - Header size (varint), counting itself
//!   - Serial type codes (sequence of varints), one per column
//! - The column values, back to back, each sized by its serial type
//!
//! The serial type codes in the header describe the data type and size of each field:
//!
//! - 0: NULL
//! - 1: 8-bit signed int
//! - 2: 16-bit signed int
//! - 3: 24-bit signed int
//! - 4: 32-bit signed int
//! - 5: 48-bit signed int
//! - 6: 64-bit signed int
//! - 7: IEEE 754 64-bit float
//! - 8: 0 (literal)
//! - 9: 1 (literal)
//! - 10,11: Internal use
//! - N >= 12, even: BLOB of (N-12)/2 bytes
//! - N >= 13, odd: Text of (N-13)/2 bytes
//!
//! Only the 8 to 32-bit integers, the two literals and text are turned into
//! values. The other classes are sized exactly, so later columns still line up,
//! but come back as [`SqlValue::Undecoded`].

use super::bytes::{read_i16, read_i24, read_i32, read_i8};
use super::varint::Varint;
use crate::sqlite::error::{Error, Result};
use std::fmt::Display;
use tracing::debug;

/// Storage class and width of one column, as given by its serial type code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerialType {
    Null,
    Int8,
    Int16,
    Int24,
    Int32,
    Int48,
    Int64,
    Float64,
    Zero,
    One,
    Blob(usize),
    Text(usize),
}

impl SerialType {
    pub fn from_code(code: u64) -> Result<Self> {
        let serial_type = match code {
            0 => Self::Null,
            1 => Self::Int8,
            2 => Self::Int16,
            3 => Self::Int24,
            4 => Self::Int32,
            5 => Self::Int48,
            6 => Self::Int64,
            7 => Self::Float64,
            8 => Self::Zero,
            9 => Self::One,
            10 | 11 => return Err(Error::ReservedSerialType(code)),
            n if n % 2 == 0 => Self::Blob(content_len((n - 12) / 2)?),
            n => Self::Text(content_len((n - 13) / 2)?),
        };
        Ok(serial_type)
    }

    /// Number of body bytes a value of this type occupies
    pub fn size(&self) -> usize {
        match *self {
            Self::Null | Self::Zero | Self::One => 0,
            Self::Int8 => 1,
            Self::Int16 => 2,
            Self::Int24 => 3,
            Self::Int32 => 4,
            Self::Int48 => 6,
            Self::Int64 | Self::Float64 => 8,
            Self::Blob(len) | Self::Text(len) => len,
        }
    }
}

fn content_len(len: u64) -> Result<usize> {
    usize::try_from(len).map_err(|_| Error::TruncatedRecord)
}

/// A single column value
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
    /// A value whose storage class is recognised but not decoded
    Undecoded { serial_type: u64, len: usize },
}

impl SqlValue {
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            SqlValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            SqlValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn into_text(self) -> Option<String> {
        match self {
            SqlValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl Display for SqlValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SqlValue::Null => write!(f, "NULL"),
            SqlValue::Integer(n) => write!(f, "{}", n),
            SqlValue::Real(x) => write!(f, "{}", x),
            SqlValue::Text(s) => write!(f, "{}", s),
            SqlValue::Blob(bytes) => write!(f, "<blob {} bytes>", bytes.len()),
            SqlValue::Undecoded { serial_type, len } => {
                write!(f, "<undecoded type {} ({} bytes)>", serial_type, len)
            }
        }
    }
}

/// Location of one column inside a record body
#[derive(Debug, Clone, Copy)]
struct Column {
    code: u64,
    serial_type: SerialType,
    offset: usize,
}

/// Parser for SQLite records (table rows).
///
/// Borrows the payload bytes of a cell; the header is walked once up front so
/// any column can be decoded on its own.
pub struct Record<'a> {
    data: &'a [u8],
    columns: Vec<Column>,
}

impl<'a> Record<'a> {
    /// Walks the record header in `payload` and lays out every column.
    ///
    /// Fails if the header or any column's bytes would run past the end of
    /// `payload`.
    pub fn parse(payload: &'a [u8]) -> Result<Self> {
        let (header_size, mut position) = payload.try_read_varint()?;
        let header_end = usize::try_from(header_size).map_err(|_| Error::TruncatedRecord)?;
        if header_end > payload.len() || header_end < position {
            return Err(Error::TruncatedRecord);
        }

        let mut columns = Vec::new();
        let mut body_offset = header_end;
        while position < header_end {
            let (code, len) = payload[position..header_end].try_read_varint()?;
            position += len;

            let serial_type = SerialType::from_code(code)?;
            columns.push(Column {
                code,
                serial_type,
                offset: body_offset,
            });
            body_offset = body_offset
                .checked_add(serial_type.size())
                .ok_or(Error::TruncatedRecord)?;
        }

        if body_offset > payload.len() {
            debug!(
                "Record body needs {} bytes, payload has {}",
                body_offset,
                payload.len()
            );
            return Err(Error::TruncatedRecord);
        }

        Ok(Self {
            data: payload,
            columns,
        })
    }

    /// Number of columns described by the header
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Decodes column `index`, or `None` past the last column
    pub fn value(&self, index: usize) -> Option<SqlValue> {
        self.columns.get(index).map(|column| self.decode(column))
    }

    /// Decodes every column in declared order
    pub fn values(&self) -> Vec<SqlValue> {
        self.columns.iter().map(|column| self.decode(column)).collect()
    }

    fn decode(&self, column: &Column) -> SqlValue {
        let offset = column.offset;
        let size = column.serial_type.size();
        // `parse` checked every column against the payload length.
        let integer = match column.serial_type {
            SerialType::Null => return SqlValue::Null,
            SerialType::Zero => return SqlValue::Integer(0),
            SerialType::One => return SqlValue::Integer(1),
            SerialType::Int8 => read_i8(self.data, offset).map(i64::from),
            SerialType::Int16 => read_i16(self.data, offset).map(i64::from),
            SerialType::Int24 => read_i24(self.data, offset).map(i64::from),
            SerialType::Int32 => read_i32(self.data, offset).map(i64::from),
            SerialType::Text(len) => {
                let bytes = &self.data[offset..offset + len];
                return match std::str::from_utf8(bytes) {
                    Ok(text) => SqlValue::Text(text.to_owned()),
                    Err(_) => self.undecoded(column),
                };
            }
            SerialType::Int48 | SerialType::Int64 | SerialType::Float64 | SerialType::Blob(_) => {
                return self.undecoded(column)
            }
        };

        match integer {
            Ok(n) => SqlValue::Integer(n),
            Err(_) => SqlValue::Undecoded {
                serial_type: column.code,
                len: size,
            },
        }
    }

    fn undecoded(&self, column: &Column) -> SqlValue {
        SqlValue::Undecoded {
            serial_type: column.code,
            len: column.serial_type.size(),
        }
    }
}
