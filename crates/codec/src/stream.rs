//! Strict one-value stream reader
//!
//! Reads exactly one encoded value's byte span from an `io::Read` by
//! parsing headers, without touching any trailing data on the stream. This
//! is what makes multiplexed streams (several values back to back) safe to
//! decode one value at a time.

use byteorder::{BigEndian, ByteOrder};
use std::io::Read;

use packforge_core::limits::MAX_SKIP_DEPTH;
use packforge_core::{DecodeError, Error};

use crate::codes;

/// Read exactly one well-formed encoded value from `reader`.
///
/// The reader is left positioned at the first byte after the value. I/O
/// errors propagate unchanged; malformed headers surface as
/// [`DecodeError`].
pub fn read_value_block<R: Read>(reader: &mut R) -> Result<Vec<u8>, Error> {
    let mut out = Vec::new();
    read_block_into(reader, &mut out, 0)?;
    Ok(out)
}

fn copy_exact<R: Read>(reader: &mut R, out: &mut Vec<u8>, n: usize) -> Result<(), Error> {
    let start = out.len();
    out.resize(start + n, 0);
    reader.read_exact(&mut out[start..])?;
    Ok(())
}

/// Copy `width` length-field bytes and return the decoded length
fn copy_length_field<R: Read>(
    reader: &mut R,
    out: &mut Vec<u8>,
    width: usize,
) -> Result<usize, Error> {
    let start = out.len();
    copy_exact(reader, out, width)?;
    let field = &out[start..];
    Ok(match width {
        1 => field[0] as usize,
        2 => BigEndian::read_u16(field) as usize,
        _ => BigEndian::read_u32(field) as usize,
    })
}

fn read_block_into<R: Read>(
    reader: &mut R,
    out: &mut Vec<u8>,
    depth: usize,
) -> Result<(), Error> {
    if depth > MAX_SKIP_DEPTH {
        return Err(DecodeError::DepthLimitExceeded {
            max: MAX_SKIP_DEPTH,
        }
        .into());
    }

    let mut code_buf = [0u8; 1];
    reader.read_exact(&mut code_buf)?;
    let code = code_buf[0];
    out.push(code);

    if codes::is_positive_fixint(code) || codes::is_negative_fixint(code) {
        return Ok(());
    }
    if codes::is_fixstr(code) {
        return copy_exact(reader, out, (code & 0x1f) as usize);
    }
    if codes::is_fixarray(code) {
        return copy_elements(reader, out, (code & 0x0f) as usize, depth);
    }
    if codes::is_fixmap(code) {
        return copy_elements(reader, out, 2 * (code & 0x0f) as usize, depth);
    }

    match code {
        codes::NIL | codes::FALSE | codes::TRUE => Ok(()),
        codes::UINT8 | codes::INT8 => copy_exact(reader, out, 1),
        codes::UINT16 | codes::INT16 => copy_exact(reader, out, 2),
        codes::UINT32 | codes::INT32 | codes::FLOAT32 => copy_exact(reader, out, 4),
        codes::UINT64 | codes::INT64 | codes::FLOAT64 => copy_exact(reader, out, 8),
        codes::STR8 | codes::BIN8 => {
            let length = copy_length_field(reader, out, 1)?;
            copy_exact(reader, out, length)
        }
        codes::STR16 | codes::BIN16 => {
            let length = copy_length_field(reader, out, 2)?;
            copy_exact(reader, out, length)
        }
        codes::STR32 | codes::BIN32 => {
            let length = copy_length_field(reader, out, 4)?;
            copy_exact(reader, out, length)
        }
        codes::FIXEXT1 => copy_exact(reader, out, 2),
        codes::FIXEXT2 => copy_exact(reader, out, 3),
        codes::FIXEXT4 => copy_exact(reader, out, 5),
        codes::FIXEXT8 => copy_exact(reader, out, 9),
        codes::FIXEXT16 => copy_exact(reader, out, 17),
        codes::EXT8 => {
            let length = copy_length_field(reader, out, 1)?;
            copy_exact(reader, out, 1 + length)
        }
        codes::EXT16 => {
            let length = copy_length_field(reader, out, 2)?;
            copy_exact(reader, out, 1 + length)
        }
        codes::EXT32 => {
            let length = copy_length_field(reader, out, 4)?;
            copy_exact(reader, out, 1 + length)
        }
        codes::ARRAY16 => {
            let count = copy_length_field(reader, out, 2)?;
            copy_elements(reader, out, count, depth)
        }
        codes::ARRAY32 => {
            let count = copy_length_field(reader, out, 4)?;
            copy_elements(reader, out, count, depth)
        }
        codes::MAP16 => {
            let count = copy_length_field(reader, out, 2)?;
            copy_elements(reader, out, 2 * count, depth)
        }
        codes::MAP32 => {
            let count = copy_length_field(reader, out, 4)?;
            copy_elements(reader, out, 2 * count, depth)
        }
        actual => Err(DecodeError::UnexpectedCode {
            expected: "any element",
            actual,
        }
        .into()),
    }
}

fn copy_elements<R: Read>(
    reader: &mut R,
    out: &mut Vec<u8>,
    count: usize,
    depth: usize,
) -> Result<(), Error> {
    for _ in 0..count {
        read_block_into(reader, out, depth + 1)?;
    }
    Ok(())
}
