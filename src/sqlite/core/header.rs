//! SQLite Database Header Implementation
//!
//! Handles parsing of the SQLite database header (first 100 bytes of the file)
//! according to the file format specification.
//!
//! ## Database Header Format (First 100 bytes)
//!
//! - Bytes 0-15: Header string "SQLite format 3\0"
//! - Bytes 16-17: Page size in bytes (big-endian, 1 means 65536)
//! - Byte 18: File format write version
//! - Byte 19: File format read version
//! - Byte 20: Reserved space at end of each page
//! - Bytes 21-23: Maximum embedded payload fraction, minimum embedded payload fraction, leaf payload fraction
//! - Bytes 24-27: File change counter
//! - Bytes 28-31: Size of database file in pages
//! - Bytes 32-35: First freelist trunk page
//! - Bytes 36-39: Total number of freelist pages
//! - Bytes 40-43: Schema cookie
//! - Bytes 44-47: Schema format number
//! - Bytes 48-51: Default page cache size
//! - Bytes 52-55: Largest root b-tree page number
//! - Bytes 56-59: Database text encoding (1:UTF-8, 2:UTF-16le, 3:UTF-16be)
//! - Bytes 60-63: User version
//! - Bytes 64-67: Incremental vacuum mode
//! - Bytes 68-71: Application ID
//! - Bytes 72-91: Reserved for expansion
//! - Bytes 92-95: Version-valid-for number
//! - Bytes 96-99: SQLite version number

use super::bytes::{read_u16, read_u32, read_u8};
use crate::sqlite::error::{Error, Result};
use tracing::{debug, warn};

/// Represents the SQLite database header (first 100 bytes)
#[derive(Debug, Clone)]
pub struct DatabaseHeader {
    /// Raw page size field (bytes 16-17)
    pub page_size_raw: u16,
    /// Page size in bytes, derived from `page_size_raw`
    pub page_size: u32,
    /// File format write version (byte 18)
    pub write_version: u8,
    /// File format read version (byte 19)
    pub read_version: u8,
    /// Reserved space at end of each page (byte 20)
    pub reserved_space: u8,
    /// Maximum embedded payload fraction (byte 21)
    pub max_payload_fraction: u8,
    /// Minimum embedded payload fraction (byte 22)
    pub min_payload_fraction: u8,
    /// Leaf payload fraction (byte 23)
    pub leaf_payload_fraction: u8,
    /// File change counter (bytes 24-27)
    pub file_change_counter: u32,
    /// Size of database file in pages (bytes 28-31)
    pub database_size: u32,
    /// First freelist trunk page (bytes 32-35)
    pub first_freelist_trunk: u32,
    /// Total number of freelist pages (bytes 36-39)
    pub total_freelist_pages: u32,
    /// Schema cookie (bytes 40-43)
    pub schema_cookie: u32,
    /// Schema format number (bytes 44-47)
    pub schema_format: u32,
    /// Default page cache size (bytes 48-51)
    pub page_cache_size: u32,
    /// Largest root b-tree page number (bytes 52-55)
    pub largest_root_page: u32,
    /// Database text encoding (bytes 56-59)
    pub text_encoding: u32,
    /// User version (bytes 60-63)
    pub user_version: u32,
    /// Incremental vacuum mode (bytes 64-67)
    pub incremental_vacuum: u32,
    /// Application ID (bytes 68-71)
    pub application_id: u32,
    /// Version valid for number (bytes 92-95)
    pub version_valid_for: u32,
    /// SQLite version number (bytes 96-99)
    pub sqlite_version_number: u32,
}

impl DatabaseHeader {
    /// Size of the SQLite database header in bytes
    pub const HEADER_SIZE: usize = 100;

    /// Magic string that should appear at the start of every SQLite file
    pub const MAGIC_STRING: &'static [u8; 16] = b"SQLite format 3\0";

    /// Parses a database header from raw bytes.
    ///
    /// The magic string is checked before any other field is looked at. The
    /// page size field is validated as well, so a header that parses always
    /// carries a usable `page_size`.
    pub fn parse(header_bytes: &[u8]) -> Result<Self> {
        if header_bytes.len() < Self::HEADER_SIZE {
            return Err(Error::OutOfBounds {
                offset: 0,
                width: Self::HEADER_SIZE,
                len: header_bytes.len(),
            });
        }

        if &header_bytes[..16] != Self::MAGIC_STRING {
            warn!("Header magic mismatch: {:?}", &header_bytes[..16]);
            return Err(Error::InvalidHeader);
        }

        let page_size_raw = read_u16(header_bytes, 16)?;
        let page_size = page_size_from_raw(page_size_raw)?;

        let header = DatabaseHeader {
            page_size_raw,
            page_size,
            write_version: read_u8(header_bytes, 18)?,
            read_version: read_u8(header_bytes, 19)?,
            reserved_space: read_u8(header_bytes, 20)?,
            max_payload_fraction: read_u8(header_bytes, 21)?,
            min_payload_fraction: read_u8(header_bytes, 22)?,
            leaf_payload_fraction: read_u8(header_bytes, 23)?,
            file_change_counter: read_u32(header_bytes, 24)?,
            database_size: read_u32(header_bytes, 28)?,
            first_freelist_trunk: read_u32(header_bytes, 32)?,
            total_freelist_pages: read_u32(header_bytes, 36)?,
            schema_cookie: read_u32(header_bytes, 40)?,
            schema_format: read_u32(header_bytes, 44)?,
            page_cache_size: read_u32(header_bytes, 48)?,
            largest_root_page: read_u32(header_bytes, 52)?,
            text_encoding: read_u32(header_bytes, 56)?,
            user_version: read_u32(header_bytes, 60)?,
            incremental_vacuum: read_u32(header_bytes, 64)?,
            application_id: read_u32(header_bytes, 68)?,
            version_valid_for: read_u32(header_bytes, 92)?,
            sqlite_version_number: read_u32(header_bytes, 96)?,
        };

        debug!("Parsed database header: {:?}", header);
        Ok(header)
    }

    /// Returns true if the database uses UTF-8 encoding
    pub fn is_utf8(&self) -> bool {
        self.text_encoding == 1
    }
}

/// Derives the page size from the raw header field.
///
/// 1 stands for 65536; otherwise the value must be a power of two in
/// 512..=32768.
pub fn page_size_from_raw(raw: u16) -> Result<u32> {
    match raw {
        1 => Ok(65_536),
        n if (512..=32_768).contains(&n) && n.is_power_of_two() => Ok(n as u32),
        n => Err(Error::InvalidPageSize(n)),
    }
}
