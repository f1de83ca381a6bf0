//! Error taxonomy for the SQLite file reader.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while opening or decoding a database file
#[derive(Error, Debug)]
pub enum Error {
    #[error("database file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid SQLite header: magic string mismatch")]
    InvalidHeader,

    #[error("invalid page size field: {0}")]
    InvalidPageSize(u16),

    #[error("invalid page number: {0}")]
    InvalidPageNumber(u32),

    #[error("truncated page {page}: expected {expected} bytes, got {actual}")]
    TruncatedPage {
        page: u32,
        expected: usize,
        actual: usize,
    },

    #[error("unsupported b-tree page type: {0:#04x}")]
    UnsupportedPageType(u8),

    #[error("record runs past the end of its cell")]
    TruncatedRecord,

    #[error("payload of {len} bytes exceeds local maximum {max_local}; overflow pages are not read")]
    OverflowPayload { len: u64, max_local: usize },

    #[error("varint runs past the end of the buffer")]
    MalformedVarint,

    #[error("reserved serial type: {0}")]
    ReservedSerialType(u64),

    #[error("read of {width} bytes at offset {offset} exceeds buffer of {len} bytes")]
    OutOfBounds {
        offset: usize,
        width: usize,
        len: usize,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether the error came from reading the file rather than decoding it
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            Error::FileNotFound(_)
                | Error::Io(_)
                | Error::InvalidPageNumber(_)
                | Error::TruncatedPage { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_errors_are_separated_from_decode_errors() {
        assert!(Error::TruncatedPage {
            page: 2,
            expected: 512,
            actual: 0
        }
        .is_storage());
        assert!(Error::Io(std::io::ErrorKind::UnexpectedEof.into()).is_storage());
        assert!(!Error::TruncatedRecord.is_storage());
        assert!(!Error::UnsupportedPageType(0x05).is_storage());
        assert!(!Error::OverflowPayload {
            len: 478,
            max_local: 477
        }
        .is_storage());
    }
}
