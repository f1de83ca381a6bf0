//! Fixed-width big-endian field readers.
//!
//! Every multi-byte integer in the file format (header fields, page headers,
//! cell pointers, record integers) is big-endian. These helpers read one at a
//! given offset and report an out-of-range read instead of panicking.

use crate::sqlite::error::{Error, Result};
use nom::number::complete::{be_i16, be_i24, be_i32, be_i8, be_u16, be_u32};
use nom::IResult;

fn read_with<'a, T, F>(buf: &'a [u8], offset: usize, width: usize, parser: F) -> Result<T>
where
    F: FnOnce(&'a [u8]) -> IResult<&'a [u8], T, nom::error::Error<&'a [u8]>>,
{
    let out_of_bounds = || Error::OutOfBounds {
        offset,
        width,
        len: buf.len(),
    };
    let input = buf.get(offset..).ok_or_else(out_of_bounds)?;
    parser(input)
        .map(|(_, value)| value)
        .map_err(|_| out_of_bounds())
}

pub fn read_u8(buf: &[u8], offset: usize) -> Result<u8> {
    buf.get(offset).copied().ok_or(Error::OutOfBounds {
        offset,
        width: 1,
        len: buf.len(),
    })
}

pub fn read_u16(buf: &[u8], offset: usize) -> Result<u16> {
    read_with(buf, offset, 2, be_u16)
}

pub fn read_u32(buf: &[u8], offset: usize) -> Result<u32> {
    read_with(buf, offset, 4, be_u32)
}

pub fn read_i8(buf: &[u8], offset: usize) -> Result<i8> {
    read_with(buf, offset, 1, be_i8)
}

pub fn read_i16(buf: &[u8], offset: usize) -> Result<i16> {
    read_with(buf, offset, 2, be_i16)
}

/// Reads a 24-bit two's complement integer, sign-extended from bit 23
pub fn read_i24(buf: &[u8], offset: usize) -> Result<i32> {
    read_with(buf, offset, 3, be_i24)
}

pub fn read_i32(buf: &[u8], offset: usize) -> Result<i32> {
    read_with(buf, offset, 4, be_i32)
}
