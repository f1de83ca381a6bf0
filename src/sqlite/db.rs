//! SQLite File Format Implementation
//!
//! This module implements the page store: opening a database file, validating
//! its header and reading whole pages by number.
//!
//! # SQLite File Structure
//!
//! A SQLite database file consists of one or more pages of equal size. Pages
//! are numbered from 1 and page N starts at byte `(N - 1) * page_size`.
//! The first page (page 1) contains:
//!
//! - Database header (100 bytes)
//! - First page of the sqlite_schema table, whose b-tree page header
//!   therefore starts at offset 100 instead of 0
//!
//! Reads are positioned (`pread` style), so a [`SQLiteDatabase`] can be shared
//! between threads without any cursor state. On targets other than Unix and
//! Windows there is no positioned read; there the file cursor is moved under a
//! global lock instead. Nothing is cached; every call to
//! [`SQLiteDatabase::read_page`] goes back to the file.

use super::core::header::DatabaseHeader;
use super::error::{Error, Result};
use super::storage::table::TableReader;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Represents an open SQLite database file
#[derive(Debug)]
pub struct SQLiteDatabase {
    path: PathBuf,
    file: File,
    page_size: u32,
    reserved_space: u8,
}

/// Contains metadata about a SQLite database
#[derive(Debug)]
pub struct SQLiteDatabaseInfo {
    /// Size of each page in bytes
    page_size: u32,
    /// Number of tables in the database
    num_tables: usize,
}

impl SQLiteDatabaseInfo {
    /// Returns the page size in bytes
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Returns the number of tables in the database
    pub fn num_tables(&self) -> usize {
        self.num_tables
    }
}

/// One page of the file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    number: u32,
    data: Vec<u8>,
    usable_size: usize,
}

impl Page {
    pub fn number(&self) -> u32 {
        self.number
    }

    /// Offset of the b-tree page header inside this page's bytes
    pub fn header_offset(&self) -> usize {
        if self.number == 1 {
            DatabaseHeader::HEADER_SIZE
        } else {
            0
        }
    }

    /// Page size less the reserved bytes at the end of the page
    pub fn usable_size(&self) -> usize {
        self.usable_size
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

impl SQLiteDatabase {
    /// Opens a SQLite database file at the given path.
    ///
    /// The 100-byte header is read and validated; a bad magic string or page
    /// size means no handle is returned.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Error::FileNotFound(path.clone()),
            _ => Error::Io(e),
        })?;

        let mut header = [0u8; DatabaseHeader::HEADER_SIZE];
        let read = read_full_at(&file, &mut header, 0)?;
        if read < header.len() {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("database header is {} bytes, expected 100", read),
            )));
        }

        let header = DatabaseHeader::parse(&header)?;
        if !header.is_utf8() {
            warn!(
                "Text encoding {} is not UTF-8; text columns will not decode",
                header.text_encoding
            );
        }
        info!(
            "Opened {} with page size {}",
            path.display(),
            header.page_size
        );

        Ok(Self {
            path,
            file,
            page_size: header.page_size,
            reserved_space: header.reserved_space,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the page size in bytes
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Reads page `page_number` (1-based) in full.
    ///
    /// A page that extends past the end of the file is an error rather than
    /// a partially filled buffer.
    pub fn read_page(&self, page_number: u32) -> Result<Page> {
        if page_number == 0 {
            return Err(Error::InvalidPageNumber(page_number));
        }

        let page_size = self.page_size as usize;
        let offset = (page_number as u64 - 1) * self.page_size as u64;
        debug!("Reading page {} at offset {}", page_number, offset);

        let mut data = vec![0u8; page_size];
        let read = read_full_at(&self.file, &mut data, offset)?;
        if read < page_size {
            return Err(Error::TruncatedPage {
                page: page_number,
                expected: page_size,
                actual: read,
            });
        }

        Ok(Page {
            number: page_number,
            data,
            usable_size: page_size.saturating_sub(self.reserved_space as usize),
        })
    }

    /// Page size and table count, as shown by `.dbinfo`
    pub fn info(&self) -> Result<SQLiteDatabaseInfo> {
        let num_tables = self.list_tables()?.len();
        info!("Found {} tables", num_tables);

        Ok(SQLiteDatabaseInfo {
            page_size: self.page_size,
            num_tables,
        })
    }

    /// Names of all tables in schema order
    pub fn list_tables(&self) -> Result<Vec<String>> {
        TableReader::new(self).list_tables()
    }
}

/// Fills as much of `buf` as the file allows starting at `offset` and returns
/// the number of bytes read.
fn read_full_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match read_at(file, &mut buf[filled..], offset + filled as u64) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(unix)]
fn read_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    use std::os::unix::fs::FileExt;
    file.read_at(buf, offset)
}

#[cfg(windows)]
fn read_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    use std::os::windows::fs::FileExt;
    file.seek_read(buf, offset)
}

/// Targets without positioned reads share the file cursor, so each seek and
/// read pair runs under one process-wide lock.
#[cfg(not(any(unix, windows)))]
fn read_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    use std::io::{Read, Seek, SeekFrom};
    use std::sync::Mutex;

    static CURSOR: Mutex<()> = Mutex::new(());
    let _guard = CURSOR.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let mut file = file;
    file.seek(SeekFrom::Start(offset))?;
    file.read(buf)
}
