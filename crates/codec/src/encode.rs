//! Primitive wire-format encoders
//!
//! Every function writes one wire element through a [`WriteBuffer`]
//! reservation and returns the number of bytes written. Compact integer and
//! header writers pick the narrowest representation that round-trips the
//! value; `_force` variants always emit the fixed-width form so byte
//! offsets stay stable across payloads.
//!
//! All multi-byte fields are big-endian.

use byteorder::{BigEndian, ByteOrder};
use std::time::{SystemTime, UNIX_EPOCH};

use packforge_buffer::WriteBuffer;

use crate::codes;

/// Write the nil sentinel
pub fn write_nil(target: &mut WriteBuffer) -> usize {
    target.reserve_and_commit(1)[0] = codes::NIL;
    1
}

/// Write a boolean
pub fn write_bool(target: &mut WriteBuffer, value: bool) -> usize {
    target.reserve_and_commit(1)[0] = if value { codes::TRUE } else { codes::FALSE };
    1
}

/// Write an unsigned integer in the narrowest encoding that holds it
pub fn write_u64(target: &mut WriteBuffer, value: u64) -> usize {
    if value <= codes::MAX_FIX_POSITIVE as u64 {
        target.reserve_and_commit(1)[0] = value as u8;
        1
    } else if value <= u8::MAX as u64 {
        let out = target.reserve_and_commit(2);
        out[0] = codes::UINT8;
        out[1] = value as u8;
        2
    } else if value <= u16::MAX as u64 {
        let out = target.reserve_and_commit(3);
        out[0] = codes::UINT16;
        BigEndian::write_u16(&mut out[1..], value as u16);
        3
    } else if value <= u32::MAX as u64 {
        let out = target.reserve_and_commit(5);
        out[0] = codes::UINT32;
        BigEndian::write_u32(&mut out[1..], value as u32);
        5
    } else {
        let out = target.reserve_and_commit(9);
        out[0] = codes::UINT64;
        BigEndian::write_u64(&mut out[1..], value);
        9
    }
}

/// Compact u8 write
pub fn write_u8(target: &mut WriteBuffer, value: u8) -> usize {
    write_u64(target, value as u64)
}

/// Compact u16 write
pub fn write_u16(target: &mut WriteBuffer, value: u16) -> usize {
    write_u64(target, value as u64)
}

/// Compact u32 write
pub fn write_u32(target: &mut WriteBuffer, value: u32) -> usize {
    write_u64(target, value as u64)
}

/// Write a signed integer in the narrowest encoding that holds it.
///
/// Non-negative values use the unsigned code family; negative values use
/// negative fixint or the signed family.
pub fn write_i64(target: &mut WriteBuffer, value: i64) -> usize {
    if value >= 0 {
        write_u64(target, value as u64)
    } else if value >= codes::MIN_FIX_NEGATIVE as i64 {
        target.reserve_and_commit(1)[0] = value as u8;
        1
    } else if value >= i8::MIN as i64 {
        let out = target.reserve_and_commit(2);
        out[0] = codes::INT8;
        out[1] = value as u8;
        2
    } else if value >= i16::MIN as i64 {
        let out = target.reserve_and_commit(3);
        out[0] = codes::INT16;
        BigEndian::write_i16(&mut out[1..], value as i16);
        3
    } else if value >= i32::MIN as i64 {
        let out = target.reserve_and_commit(5);
        out[0] = codes::INT32;
        BigEndian::write_i32(&mut out[1..], value as i32);
        5
    } else {
        let out = target.reserve_and_commit(9);
        out[0] = codes::INT64;
        BigEndian::write_i64(&mut out[1..], value);
        9
    }
}

/// Compact i8 write
pub fn write_i8(target: &mut WriteBuffer, value: i8) -> usize {
    write_i64(target, value as i64)
}

/// Compact i16 write
pub fn write_i16(target: &mut WriteBuffer, value: i16) -> usize {
    write_i64(target, value as i64)
}

/// Compact i32 write
pub fn write_i32(target: &mut WriteBuffer, value: i32) -> usize {
    write_i64(target, value as i64)
}

/// Write a positive fixint without range dispatch.
///
/// Caller guarantees `value <= 0x7f`; checked only in debug builds.
pub fn write_positive_fixint_unchecked(target: &mut WriteBuffer, value: u8) -> usize {
    debug_assert!(value <= codes::MAX_FIX_POSITIVE);
    target.reserve_and_commit(1)[0] = value;
    1
}

/// Always emit the uint8 form (2 bytes)
pub fn write_u8_force(target: &mut WriteBuffer, value: u8) -> usize {
    let out = target.reserve_and_commit(2);
    out[0] = codes::UINT8;
    out[1] = value;
    2
}

/// Always emit the uint16 form (3 bytes)
pub fn write_u16_force(target: &mut WriteBuffer, value: u16) -> usize {
    let out = target.reserve_and_commit(3);
    out[0] = codes::UINT16;
    BigEndian::write_u16(&mut out[1..], value);
    3
}

/// Always emit the uint32 form (5 bytes)
pub fn write_u32_force(target: &mut WriteBuffer, value: u32) -> usize {
    let out = target.reserve_and_commit(5);
    out[0] = codes::UINT32;
    BigEndian::write_u32(&mut out[1..], value);
    5
}

/// Always emit the uint64 form (9 bytes)
pub fn write_u64_force(target: &mut WriteBuffer, value: u64) -> usize {
    let out = target.reserve_and_commit(9);
    out[0] = codes::UINT64;
    BigEndian::write_u64(&mut out[1..], value);
    9
}

/// Always emit the int8 form (2 bytes)
pub fn write_i8_force(target: &mut WriteBuffer, value: i8) -> usize {
    let out = target.reserve_and_commit(2);
    out[0] = codes::INT8;
    out[1] = value as u8;
    2
}

/// Always emit the int16 form (3 bytes)
pub fn write_i16_force(target: &mut WriteBuffer, value: i16) -> usize {
    let out = target.reserve_and_commit(3);
    out[0] = codes::INT16;
    BigEndian::write_i16(&mut out[1..], value);
    3
}

/// Always emit the int32 form (5 bytes)
pub fn write_i32_force(target: &mut WriteBuffer, value: i32) -> usize {
    let out = target.reserve_and_commit(5);
    out[0] = codes::INT32;
    BigEndian::write_i32(&mut out[1..], value);
    5
}

/// Always emit the int64 form (9 bytes)
pub fn write_i64_force(target: &mut WriteBuffer, value: i64) -> usize {
    let out = target.reserve_and_commit(9);
    out[0] = codes::INT64;
    BigEndian::write_i64(&mut out[1..], value);
    9
}

/// Write a single-precision float (5 bytes)
pub fn write_f32(target: &mut WriteBuffer, value: f32) -> usize {
    let out = target.reserve_and_commit(5);
    out[0] = codes::FLOAT32;
    BigEndian::write_f32(&mut out[1..], value);
    5
}

/// Write a double-precision float (9 bytes)
pub fn write_f64(target: &mut WriteBuffer, value: f64) -> usize {
    let out = target.reserve_and_commit(9);
    out[0] = codes::FLOAT64;
    BigEndian::write_f64(&mut out[1..], value);
    9
}

/// Write a UTF-8 string with a compact length header
pub fn write_str(target: &mut WriteBuffer, value: &str) -> usize {
    let bytes = value.as_bytes();
    let len = bytes.len();
    if len <= codes::MAX_FIXSTR_LEN {
        let out = target.reserve_and_commit(1 + len);
        out[0] = codes::FIXSTR_PREFIX | len as u8;
        out[1..].copy_from_slice(bytes);
        1 + len
    } else if len <= u8::MAX as usize {
        let out = target.reserve_and_commit(2 + len);
        out[0] = codes::STR8;
        out[1] = len as u8;
        out[2..].copy_from_slice(bytes);
        2 + len
    } else if len <= u16::MAX as usize {
        let out = target.reserve_and_commit(3 + len);
        out[0] = codes::STR16;
        BigEndian::write_u16(&mut out[1..3], len as u16);
        out[3..].copy_from_slice(bytes);
        3 + len
    } else {
        let out = target.reserve_and_commit(5 + len);
        out[0] = codes::STR32;
        BigEndian::write_u32(&mut out[1..5], len as u32);
        out[5..].copy_from_slice(bytes);
        5 + len
    }
}

/// Write a string with the str32 header regardless of length
pub fn write_str_force(target: &mut WriteBuffer, value: &str) -> usize {
    let bytes = value.as_bytes();
    let len = bytes.len();
    let out = target.reserve_and_commit(5 + len);
    out[0] = codes::STR32;
    BigEndian::write_u32(&mut out[1..5], len as u32);
    out[5..].copy_from_slice(bytes);
    5 + len
}

/// Fixstr fast path for strings the caller knows fit a 5-bit length.
///
/// Caller guarantees `value.len() <= 31`; checked only in debug builds.
pub fn write_fixstr_unchecked(target: &mut WriteBuffer, value: &str) -> usize {
    let bytes = value.as_bytes();
    debug_assert!(bytes.len() <= codes::MAX_FIXSTR_LEN);
    let out = target.reserve_and_commit(1 + bytes.len());
    out[0] = codes::FIXSTR_PREFIX | bytes.len() as u8;
    out[1..].copy_from_slice(bytes);
    1 + bytes.len()
}

/// Write a binary blob with a compact length header
pub fn write_bin(target: &mut WriteBuffer, value: &[u8]) -> usize {
    let len = value.len();
    if len <= u8::MAX as usize {
        let out = target.reserve_and_commit(2 + len);
        out[0] = codes::BIN8;
        out[1] = len as u8;
        out[2..].copy_from_slice(value);
        2 + len
    } else if len <= u16::MAX as usize {
        let out = target.reserve_and_commit(3 + len);
        out[0] = codes::BIN16;
        BigEndian::write_u16(&mut out[1..3], len as u16);
        out[3..].copy_from_slice(value);
        3 + len
    } else {
        let out = target.reserve_and_commit(5 + len);
        out[0] = codes::BIN32;
        BigEndian::write_u32(&mut out[1..5], len as u32);
        out[5..].copy_from_slice(value);
        5 + len
    }
}

/// Write an array length header in the narrowest width
pub fn write_array_header(target: &mut WriteBuffer, count: usize) -> usize {
    if count <= codes::MAX_FIXARRAY_LEN {
        target.reserve_and_commit(1)[0] = codes::FIXARRAY_PREFIX | count as u8;
        1
    } else if count <= u16::MAX as usize {
        let out = target.reserve_and_commit(3);
        out[0] = codes::ARRAY16;
        BigEndian::write_u16(&mut out[1..], count as u16);
        3
    } else {
        debug_assert!(count <= u32::MAX as usize);
        let out = target.reserve_and_commit(5);
        out[0] = codes::ARRAY32;
        BigEndian::write_u32(&mut out[1..], count as u32);
        5
    }
}

/// Write an array32 header regardless of count; the 4-byte count field can
/// be patched after the elements are emitted
pub fn write_array_header_force(target: &mut WriteBuffer, count: usize) -> usize {
    debug_assert!(count <= u32::MAX as usize);
    let out = target.reserve_and_commit(5);
    out[0] = codes::ARRAY32;
    BigEndian::write_u32(&mut out[1..], count as u32);
    5
}

/// Fixarray fast path; caller guarantees `count <= 15`
pub fn write_fixarray_header_unchecked(target: &mut WriteBuffer, count: usize) -> usize {
    debug_assert!(count <= codes::MAX_FIXARRAY_LEN);
    target.reserve_and_commit(1)[0] = codes::FIXARRAY_PREFIX | count as u8;
    1
}

/// Write a map pair-count header in the narrowest width
pub fn write_map_header(target: &mut WriteBuffer, count: usize) -> usize {
    if count <= codes::MAX_FIXARRAY_LEN {
        target.reserve_and_commit(1)[0] = codes::FIXMAP_PREFIX | count as u8;
        1
    } else if count <= u16::MAX as usize {
        let out = target.reserve_and_commit(3);
        out[0] = codes::MAP16;
        BigEndian::write_u16(&mut out[1..], count as u16);
        3
    } else {
        debug_assert!(count <= u32::MAX as usize);
        let out = target.reserve_and_commit(5);
        out[0] = codes::MAP32;
        BigEndian::write_u32(&mut out[1..], count as u32);
        5
    }
}

/// Write a map32 header regardless of count
pub fn write_map_header_force(target: &mut WriteBuffer, count: usize) -> usize {
    debug_assert!(count <= u32::MAX as usize);
    let out = target.reserve_and_commit(5);
    out[0] = codes::MAP32;
    BigEndian::write_u32(&mut out[1..], count as u32);
    5
}

/// Fixmap fast path; caller guarantees `count <= 15`
pub fn write_fixmap_header_unchecked(target: &mut WriteBuffer, count: usize) -> usize {
    debug_assert!(count <= codes::MAX_FIXARRAY_LEN);
    target.reserve_and_commit(1)[0] = codes::FIXMAP_PREFIX | count as u8;
    1
}

/// Write an extension element: a one-byte application type tag plus a
/// length-prefixed payload. Payload lengths 1/2/4/8/16 use the fixext
/// forms.
pub fn write_ext(target: &mut WriteBuffer, type_tag: i8, payload: &[u8]) -> usize {
    let len = payload.len();
    match len {
        1 | 2 | 4 | 8 | 16 => {
            let code = match len {
                1 => codes::FIXEXT1,
                2 => codes::FIXEXT2,
                4 => codes::FIXEXT4,
                8 => codes::FIXEXT8,
                _ => codes::FIXEXT16,
            };
            let out = target.reserve_and_commit(2 + len);
            out[0] = code;
            out[1] = type_tag as u8;
            out[2..].copy_from_slice(payload);
            2 + len
        }
        len if len <= u8::MAX as usize => {
            let out = target.reserve_and_commit(3 + len);
            out[0] = codes::EXT8;
            out[1] = len as u8;
            out[2] = type_tag as u8;
            out[3..].copy_from_slice(payload);
            3 + len
        }
        len if len <= u16::MAX as usize => {
            let out = target.reserve_and_commit(4 + len);
            out[0] = codes::EXT16;
            BigEndian::write_u16(&mut out[1..3], len as u16);
            out[3] = type_tag as u8;
            out[4..].copy_from_slice(payload);
            4 + len
        }
        len => {
            debug_assert!(len <= u32::MAX as usize);
            let out = target.reserve_and_commit(6 + len);
            out[0] = codes::EXT32;
            BigEndian::write_u32(&mut out[1..5], len as u32);
            out[5] = type_tag as u8;
            out[6..].copy_from_slice(payload);
            6 + len
        }
    }
}

/// Write a `SystemTime` as the standard timestamp extension (type -1),
/// choosing the 32-, 64-, or 96-bit form by range
pub fn write_timestamp(target: &mut WriteBuffer, time: SystemTime) -> usize {
    let (secs, nanos) = match time.duration_since(UNIX_EPOCH) {
        Ok(since) => (since.as_secs() as i64, since.subsec_nanos()),
        Err(err) => {
            let before = err.duration();
            let mut secs = -(before.as_secs() as i64);
            let mut nanos = before.subsec_nanos();
            if nanos > 0 {
                secs -= 1;
                nanos = 1_000_000_000 - nanos;
            }
            (secs, nanos)
        }
    };

    if secs >= 0 && secs <= u32::MAX as i64 && nanos == 0 {
        // timestamp 32
        let mut payload = [0u8; 4];
        BigEndian::write_u32(&mut payload, secs as u32);
        write_ext(target, codes::TIMESTAMP_EXT_TYPE, &payload)
    } else if secs >= 0 && secs < (1i64 << 34) {
        // timestamp 64: 30-bit nanos, 34-bit seconds
        let packed = ((nanos as u64) << 34) | secs as u64;
        let mut payload = [0u8; 8];
        BigEndian::write_u64(&mut payload, packed);
        write_ext(target, codes::TIMESTAMP_EXT_TYPE, &payload)
    } else {
        // timestamp 96
        let mut payload = [0u8; 12];
        BigEndian::write_u32(&mut payload[..4], nanos);
        BigEndian::write_i64(&mut payload[4..], secs);
        write_ext(target, codes::TIMESTAMP_EXT_TYPE, &payload)
    }
}
