use super::core::bytes::{read_u16, read_u8};
use super::core::varint::Varint;
use super::db::Page;
use super::error::{Error, Result};
use tracing::debug;

/// Kinds of b-tree page, from the first byte of the page header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageType {
    InteriorIndex,
    InteriorTable,
    LeafIndex,
    LeafTable,
}

impl PageType {
    pub fn from_byte(value: u8) -> Option<Self> {
        match value {
            0x02 => Some(Self::InteriorIndex),
            0x05 => Some(Self::InteriorTable),
            0x0a => Some(Self::LeafIndex),
            0x0d => Some(Self::LeafTable),
            _ => None,
        }
    }
}

/// Represents a B-tree page header
///
/// ## B-tree Page Header Format
///
/// - Byte 0: Page type
/// - Bytes 1-2: First freeblock offset
/// - Bytes 3-4: Number of cells
/// - Bytes 5-6: Cell content offset
/// - Byte 7: Number of fragmented free bytes
///
/// Interior pages carry a further 4-byte right-most pointer, which is not
/// read here.
#[derive(Debug, Clone, Copy)]
pub struct BTreePageHeader {
    /// Raw page type byte
    pub page_type: u8,
    /// Offset to first freeblock
    pub first_freeblock: u16,
    /// Number of cells in page
    pub num_cells: u16,
    /// Offset to cell content area
    pub content_offset: u16,
    /// Number of fragmented free bytes
    pub fragmented_free_bytes: u8,
}

impl BTreePageHeader {
    /// Size of a leaf page header in bytes
    pub const LEAF_HEADER_SIZE: usize = 8;

    /// Parses the page header that starts at `header_offset` in `page`
    pub fn parse(page: &[u8], header_offset: usize) -> Result<Self> {
        Ok(Self {
            page_type: read_u8(page, header_offset)?,
            first_freeblock: read_u16(page, header_offset + 1)?,
            num_cells: read_u16(page, header_offset + 3)?,
            content_offset: read_u16(page, header_offset + 5)?,
            fragmented_free_bytes: read_u8(page, header_offset + 7)?,
        })
    }

    pub fn kind(&self) -> Option<PageType> {
        PageType::from_byte(self.page_type)
    }
}

/// A cell of a leaf table page: the rowid and the record payload
#[derive(Debug, Clone, Copy)]
pub struct Cell<'a> {
    pub rowid: i64,
    /// Start of the cell relative to the page
    pub offset: usize,
    pub payload: &'a [u8],
}

/// A leaf table b-tree page (type 0x0d)
pub struct LeafTablePage<'a> {
    data: &'a [u8],
    max_local: usize,
    cell_pointers: Vec<usize>,
}

impl<'a> LeafTablePage<'a> {
    /// Checks the page type and reads the cell pointer array.
    ///
    /// Any page type other than a leaf table page is
    /// [`Error::UnsupportedPageType`].
    pub fn new(page: &'a Page) -> Result<Self> {
        debug!("Reading cells of page {}", page.number());
        Self::from_bytes(page.data(), page.header_offset(), page.usable_size())
    }

    /// `usable_size` is the page size less the reserved bytes at the end of
    /// each page; it bounds how much payload a cell can hold locally.
    pub fn from_bytes(data: &'a [u8], header_offset: usize, usable_size: usize) -> Result<Self> {
        let header = BTreePageHeader::parse(data, header_offset)?;
        if header.kind() != Some(PageType::LeafTable) {
            debug!(
                "Page type {:#04x} is not a leaf table page",
                header.page_type
            );
            return Err(Error::UnsupportedPageType(header.page_type));
        }

        // Pointers are relative to the start of the page, not the header.
        let array_start = header_offset + BTreePageHeader::LEAF_HEADER_SIZE;
        let cell_pointers = (0..header.num_cells as usize)
            .map(|i| read_u16(data, array_start + i * 2).map(usize::from))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            data,
            max_local: usable_size.saturating_sub(35),
            cell_pointers,
        })
    }

    /// Returns number of cells in the page
    pub fn num_cells(&self) -> usize {
        self.cell_pointers.len()
    }

    /// Cells in cell pointer array order
    pub fn cells(&self) -> impl Iterator<Item = Result<Cell<'a>>> + '_ {
        self.cell_pointers
            .iter()
            .map(move |&offset| read_cell(self.data, offset, self.max_local))
    }
}

/// Reads the cell at `offset`: payload length varint, rowid varint, payload.
///
/// A payload longer than `max_local` spills onto overflow pages, which are
/// not followed; such a cell is [`Error::OverflowPayload`].
fn read_cell(data: &[u8], offset: usize, max_local: usize) -> Result<Cell<'_>> {
    let bytes = data.get(offset..).ok_or(Error::TruncatedRecord)?;
    let (payload_len, len_size) = bytes.try_read_varint()?;
    let (rowid, rowid_size) = bytes[len_size..].try_read_varint()?;

    if payload_len > max_local as u64 {
        debug!(
            "Cell at {} has payload {} over local maximum {}",
            offset, payload_len, max_local
        );
        return Err(Error::OverflowPayload {
            len: payload_len,
            max_local,
        });
    }

    let start = len_size + rowid_size;
    let end = usize::try_from(payload_len)
        .ok()
        .and_then(|len| start.checked_add(len))
        .filter(|&end| end <= bytes.len())
        .ok_or(Error::TruncatedRecord)?;

    Ok(Cell {
        rowid: rowid as i64,
        offset,
        payload: &bytes[start..end],
    })
}
