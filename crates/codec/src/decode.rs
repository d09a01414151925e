//! Primitive wire-format decoders
//!
//! Every function reads one wire element from `(bytes, offset)` and returns
//! `(value, bytes_consumed)`. Input is validated before any slice access;
//! malformed data surfaces as [`DecodeError`], never a panic and never a
//! partial value.

use byteorder::{BigEndian, ByteOrder};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use packforge_core::limits::MAX_SKIP_DEPTH;
use packforge_core::DecodeError;

use crate::codes;

fn require(bytes: &[u8], offset: usize, needed: usize) -> Result<(), DecodeError> {
    match bytes.len().checked_sub(offset) {
        Some(remaining) if remaining >= needed => Ok(()),
        _ => Err(DecodeError::UnexpectedEof),
    }
}

fn require_payload(bytes: &[u8], offset: usize, length: usize) -> Result<(), DecodeError> {
    match bytes.len().checked_sub(offset) {
        Some(remaining) if remaining >= length => Ok(()),
        Some(remaining) => Err(DecodeError::LengthOverrun { length, remaining }),
        None => Err(DecodeError::UnexpectedEof),
    }
}

fn code_at(bytes: &[u8], offset: usize) -> Result<u8, DecodeError> {
    bytes.get(offset).copied().ok_or(DecodeError::UnexpectedEof)
}

/// True when the next byte is the nil sentinel.
///
/// Nullable decode paths call this first and consume exactly one byte on a
/// hit. Returns false at end of input.
pub fn is_nil(bytes: &[u8], offset: usize) -> bool {
    bytes.get(offset) == Some(&codes::NIL)
}

/// Consume the nil sentinel
pub fn read_nil(bytes: &[u8], offset: usize) -> Result<((), usize), DecodeError> {
    match code_at(bytes, offset)? {
        codes::NIL => Ok(((), 1)),
        actual => Err(DecodeError::UnexpectedCode {
            expected: "nil",
            actual,
        }),
    }
}

/// Read a boolean
pub fn read_bool(bytes: &[u8], offset: usize) -> Result<(bool, usize), DecodeError> {
    match code_at(bytes, offset)? {
        codes::FALSE => Ok((false, 1)),
        codes::TRUE => Ok((true, 1)),
        actual => Err(DecodeError::UnexpectedCode {
            expected: "bool",
            actual,
        }),
    }
}

/// Either side of the integer code family, before range narrowing
enum RawInt {
    Signed(i64),
    Unsigned(u64),
}

fn read_int_raw(bytes: &[u8], offset: usize) -> Result<(RawInt, usize), DecodeError> {
    let code = code_at(bytes, offset)?;
    if codes::is_positive_fixint(code) {
        return Ok((RawInt::Unsigned(code as u64), 1));
    }
    if codes::is_negative_fixint(code) {
        return Ok((RawInt::Signed(code as i8 as i64), 1));
    }
    match code {
        codes::UINT8 => {
            require(bytes, offset, 2)?;
            Ok((RawInt::Unsigned(bytes[offset + 1] as u64), 2))
        }
        codes::UINT16 => {
            require(bytes, offset, 3)?;
            Ok((
                RawInt::Unsigned(BigEndian::read_u16(&bytes[offset + 1..]) as u64),
                3,
            ))
        }
        codes::UINT32 => {
            require(bytes, offset, 5)?;
            Ok((
                RawInt::Unsigned(BigEndian::read_u32(&bytes[offset + 1..]) as u64),
                5,
            ))
        }
        codes::UINT64 => {
            require(bytes, offset, 9)?;
            Ok((
                RawInt::Unsigned(BigEndian::read_u64(&bytes[offset + 1..])),
                9,
            ))
        }
        codes::INT8 => {
            require(bytes, offset, 2)?;
            Ok((RawInt::Signed(bytes[offset + 1] as i8 as i64), 2))
        }
        codes::INT16 => {
            require(bytes, offset, 3)?;
            Ok((
                RawInt::Signed(BigEndian::read_i16(&bytes[offset + 1..]) as i64),
                3,
            ))
        }
        codes::INT32 => {
            require(bytes, offset, 5)?;
            Ok((
                RawInt::Signed(BigEndian::read_i32(&bytes[offset + 1..]) as i64),
                5,
            ))
        }
        codes::INT64 => {
            require(bytes, offset, 9)?;
            Ok((RawInt::Signed(BigEndian::read_i64(&bytes[offset + 1..])), 9))
        }
        actual => Err(DecodeError::UnexpectedCode {
            expected: "integer",
            actual,
        }),
    }
}

/// Read any integer code whose value fits u64
pub fn read_u64(bytes: &[u8], offset: usize) -> Result<(u64, usize), DecodeError> {
    match read_int_raw(bytes, offset)? {
        (RawInt::Unsigned(value), consumed) => Ok((value, consumed)),
        (RawInt::Signed(value), consumed) => {
            if value >= 0 {
                Ok((value as u64, consumed))
            } else {
                Err(DecodeError::OutOfRange { target: "u64" })
            }
        }
    }
}

/// Read any integer code whose value fits i64
pub fn read_i64(bytes: &[u8], offset: usize) -> Result<(i64, usize), DecodeError> {
    match read_int_raw(bytes, offset)? {
        (RawInt::Signed(value), consumed) => Ok((value, consumed)),
        (RawInt::Unsigned(value), consumed) => i64::try_from(value)
            .map(|value| (value, consumed))
            .map_err(|_| DecodeError::OutOfRange { target: "i64" }),
    }
}

macro_rules! narrowing_reader {
    ($name:ident, $ty:ty, $wide:ident) => {
        /// Read any integer code whose value fits the target type
        pub fn $name(bytes: &[u8], offset: usize) -> Result<($ty, usize), DecodeError> {
            let (value, consumed) = $wide(bytes, offset)?;
            <$ty>::try_from(value)
                .map(|value| (value, consumed))
                .map_err(|_| DecodeError::OutOfRange {
                    target: stringify!($ty),
                })
        }
    };
}

narrowing_reader!(read_u8, u8, read_u64);
narrowing_reader!(read_u16, u16, read_u64);
narrowing_reader!(read_u32, u32, read_u64);
narrowing_reader!(read_i8, i8, read_i64);
narrowing_reader!(read_i16, i16, read_i64);
narrowing_reader!(read_i32, i32, read_i64);

/// Read a float32
pub fn read_f32(bytes: &[u8], offset: usize) -> Result<(f32, usize), DecodeError> {
    match code_at(bytes, offset)? {
        codes::FLOAT32 => {
            require(bytes, offset, 5)?;
            Ok((BigEndian::read_f32(&bytes[offset + 1..]), 5))
        }
        actual => Err(DecodeError::UnexpectedCode {
            expected: "float32",
            actual,
        }),
    }
}

/// Read a float64; a float32 payload widens losslessly
pub fn read_f64(bytes: &[u8], offset: usize) -> Result<(f64, usize), DecodeError> {
    match code_at(bytes, offset)? {
        codes::FLOAT64 => {
            require(bytes, offset, 9)?;
            Ok((BigEndian::read_f64(&bytes[offset + 1..]), 9))
        }
        codes::FLOAT32 => {
            require(bytes, offset, 5)?;
            Ok((BigEndian::read_f32(&bytes[offset + 1..]) as f64, 5))
        }
        actual => Err(DecodeError::UnexpectedCode {
            expected: "float",
            actual,
        }),
    }
}

/// Decode a string length header, returning `(length, header_size)`
fn read_str_header(bytes: &[u8], offset: usize) -> Result<(usize, usize), DecodeError> {
    let code = code_at(bytes, offset)?;
    if codes::is_fixstr(code) {
        return Ok(((code & 0x1f) as usize, 1));
    }
    match code {
        codes::STR8 => {
            require(bytes, offset, 2)?;
            Ok((bytes[offset + 1] as usize, 2))
        }
        codes::STR16 => {
            require(bytes, offset, 3)?;
            Ok((BigEndian::read_u16(&bytes[offset + 1..]) as usize, 3))
        }
        codes::STR32 => {
            require(bytes, offset, 5)?;
            Ok((BigEndian::read_u32(&bytes[offset + 1..]) as usize, 5))
        }
        actual => Err(DecodeError::UnexpectedCode {
            expected: "string",
            actual,
        }),
    }
}

/// Read a UTF-8 string
pub fn read_str(bytes: &[u8], offset: usize) -> Result<(String, usize), DecodeError> {
    let (value, consumed) = read_str_slice(bytes, offset)?;
    Ok((value.to_owned(), consumed))
}

/// Read a UTF-8 string as a borrowed slice of the input
pub fn read_str_slice(bytes: &[u8], offset: usize) -> Result<(&str, usize), DecodeError> {
    let (length, header) = read_str_header(bytes, offset)?;
    require_payload(bytes, offset + header, length)?;
    let start = offset + header;
    let value = std::str::from_utf8(&bytes[start..start + length])
        .map_err(|_| DecodeError::InvalidUtf8)?;
    Ok((value, header + length))
}

/// Read a binary blob
pub fn read_bin(bytes: &[u8], offset: usize) -> Result<(Vec<u8>, usize), DecodeError> {
    let (value, consumed) = read_bin_slice(bytes, offset)?;
    Ok((value.to_vec(), consumed))
}

/// Read a binary blob as a borrowed slice of the input
pub fn read_bin_slice(bytes: &[u8], offset: usize) -> Result<(&[u8], usize), DecodeError> {
    let code = code_at(bytes, offset)?;
    let (length, header) = match code {
        codes::BIN8 => {
            require(bytes, offset, 2)?;
            (bytes[offset + 1] as usize, 2)
        }
        codes::BIN16 => {
            require(bytes, offset, 3)?;
            (BigEndian::read_u16(&bytes[offset + 1..]) as usize, 3)
        }
        codes::BIN32 => {
            require(bytes, offset, 5)?;
            (BigEndian::read_u32(&bytes[offset + 1..]) as usize, 5)
        }
        actual => {
            return Err(DecodeError::UnexpectedCode {
                expected: "binary",
                actual,
            })
        }
    };
    require_payload(bytes, offset + header, length)?;
    let start = offset + header;
    Ok((&bytes[start..start + length], header + length))
}

/// Read an array element-count header
pub fn read_array_header(bytes: &[u8], offset: usize) -> Result<(usize, usize), DecodeError> {
    let code = code_at(bytes, offset)?;
    if codes::is_fixarray(code) {
        return Ok(((code & 0x0f) as usize, 1));
    }
    match code {
        codes::ARRAY16 => {
            require(bytes, offset, 3)?;
            Ok((BigEndian::read_u16(&bytes[offset + 1..]) as usize, 3))
        }
        codes::ARRAY32 => {
            require(bytes, offset, 5)?;
            Ok((BigEndian::read_u32(&bytes[offset + 1..]) as usize, 5))
        }
        actual => Err(DecodeError::UnexpectedCode {
            expected: "array header",
            actual,
        }),
    }
}

/// Read a map pair-count header
pub fn read_map_header(bytes: &[u8], offset: usize) -> Result<(usize, usize), DecodeError> {
    let code = code_at(bytes, offset)?;
    if codes::is_fixmap(code) {
        return Ok(((code & 0x0f) as usize, 1));
    }
    match code {
        codes::MAP16 => {
            require(bytes, offset, 3)?;
            Ok((BigEndian::read_u16(&bytes[offset + 1..]) as usize, 3))
        }
        codes::MAP32 => {
            require(bytes, offset, 5)?;
            Ok((BigEndian::read_u32(&bytes[offset + 1..]) as usize, 5))
        }
        actual => Err(DecodeError::UnexpectedCode {
            expected: "map header",
            actual,
        }),
    }
}

/// Read an extension element, returning `(type_tag, payload)`
pub fn read_ext(bytes: &[u8], offset: usize) -> Result<((i8, &[u8]), usize), DecodeError> {
    let code = code_at(bytes, offset)?;
    let (length, header) = match code {
        codes::FIXEXT1 => (1, 2),
        codes::FIXEXT2 => (2, 2),
        codes::FIXEXT4 => (4, 2),
        codes::FIXEXT8 => (8, 2),
        codes::FIXEXT16 => (16, 2),
        codes::EXT8 => {
            require(bytes, offset, 3)?;
            (bytes[offset + 1] as usize, 3)
        }
        codes::EXT16 => {
            require(bytes, offset, 4)?;
            (BigEndian::read_u16(&bytes[offset + 1..]) as usize, 4)
        }
        codes::EXT32 => {
            require(bytes, offset, 6)?;
            (BigEndian::read_u32(&bytes[offset + 1..]) as usize, 6)
        }
        actual => {
            return Err(DecodeError::UnexpectedCode {
                expected: "extension",
                actual,
            })
        }
    };
    require(bytes, offset, header)?;
    let type_tag = bytes[offset + header - 1] as i8;
    require_payload(bytes, offset + header, length)?;
    let start = offset + header;
    Ok(((type_tag, &bytes[start..start + length]), header + length))
}

/// Read a standard timestamp extension (type -1) into a `SystemTime`
pub fn read_timestamp(bytes: &[u8], offset: usize) -> Result<(SystemTime, usize), DecodeError> {
    let ((type_tag, payload), consumed) = read_ext(bytes, offset)?;
    if type_tag != codes::TIMESTAMP_EXT_TYPE {
        return Err(DecodeError::UnexpectedCode {
            expected: "timestamp extension",
            actual: type_tag as u8,
        });
    }
    let (secs, nanos) = match payload.len() {
        4 => (BigEndian::read_u32(payload) as i64, 0),
        8 => {
            let packed = BigEndian::read_u64(payload);
            ((packed & ((1 << 34) - 1)) as i64, (packed >> 34) as u32)
        }
        12 => (
            BigEndian::read_i64(&payload[4..]),
            BigEndian::read_u32(&payload[..4]),
        ),
        _ => {
            return Err(DecodeError::UnexpectedCode {
                expected: "timestamp payload of 4, 8, or 12 bytes",
                actual: payload.len() as u8,
            })
        }
    };
    let time = if secs >= 0 {
        UNIX_EPOCH + Duration::new(secs as u64, nanos)
    } else {
        // Negative seconds count backward from the epoch; nanos still run
        // forward within the second.
        UNIX_EPOCH - Duration::from_secs(secs.unsigned_abs()) + Duration::new(0, nanos)
    };
    Ok((time, consumed))
}

/// Byte length of exactly one well-formed element at `offset`, recursing
/// through containers. Used to discard values without materializing them.
pub fn skip_value(bytes: &[u8], offset: usize) -> Result<usize, DecodeError> {
    skip_with_depth(bytes, offset, 0)
}

fn skip_with_depth(bytes: &[u8], offset: usize, depth: usize) -> Result<usize, DecodeError> {
    if depth > MAX_SKIP_DEPTH {
        return Err(DecodeError::DepthLimitExceeded {
            max: MAX_SKIP_DEPTH,
        });
    }
    let code = code_at(bytes, offset)?;
    if codes::is_positive_fixint(code) || codes::is_negative_fixint(code) {
        return Ok(1);
    }
    if codes::is_fixstr(code) {
        let length = (code & 0x1f) as usize;
        require_payload(bytes, offset + 1, length)?;
        return Ok(1 + length);
    }
    if codes::is_fixarray(code) {
        return skip_elements(bytes, offset + 1, (code & 0x0f) as usize, depth).map(|n| 1 + n);
    }
    if codes::is_fixmap(code) {
        return skip_elements(bytes, offset + 1, 2 * (code & 0x0f) as usize, depth).map(|n| 1 + n);
    }
    match code {
        codes::NIL | codes::FALSE | codes::TRUE => Ok(1),
        codes::UINT8 | codes::INT8 => {
            require(bytes, offset, 2)?;
            Ok(2)
        }
        codes::UINT16 | codes::INT16 => {
            require(bytes, offset, 3)?;
            Ok(3)
        }
        codes::UINT32 | codes::INT32 | codes::FLOAT32 => {
            require(bytes, offset, 5)?;
            Ok(5)
        }
        codes::UINT64 | codes::INT64 | codes::FLOAT64 => {
            require(bytes, offset, 9)?;
            Ok(9)
        }
        codes::STR8 | codes::STR16 | codes::STR32 => {
            let (length, header) = read_str_header(bytes, offset)?;
            require_payload(bytes, offset + header, length)?;
            Ok(header + length)
        }
        codes::BIN8 | codes::BIN16 | codes::BIN32 => {
            let (_, consumed) = read_bin_slice(bytes, offset)?;
            Ok(consumed)
        }
        codes::FIXEXT1
        | codes::FIXEXT2
        | codes::FIXEXT4
        | codes::FIXEXT8
        | codes::FIXEXT16
        | codes::EXT8
        | codes::EXT16
        | codes::EXT32 => {
            let (_, consumed) = read_ext(bytes, offset)?;
            Ok(consumed)
        }
        codes::ARRAY16 | codes::ARRAY32 => {
            let (count, header) = read_array_header(bytes, offset)?;
            skip_elements(bytes, offset + header, count, depth).map(|n| header + n)
        }
        codes::MAP16 | codes::MAP32 => {
            let (count, header) = read_map_header(bytes, offset)?;
            skip_elements(bytes, offset + header, 2 * count, depth).map(|n| header + n)
        }
        actual => Err(DecodeError::UnexpectedCode {
            expected: "any element",
            actual,
        }),
    }
}

fn skip_elements(
    bytes: &[u8],
    mut offset: usize,
    count: usize,
    depth: usize,
) -> Result<usize, DecodeError> {
    let start = offset;
    for _ in 0..count {
        offset += skip_with_depth(bytes, offset, depth + 1)?;
    }
    Ok(offset - start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode;
    use packforge_buffer::{SegmentPool, WriteBuffer};
    use std::sync::Arc;

    fn encoded(f: impl FnOnce(&mut WriteBuffer) -> usize) -> Vec<u8> {
        let mut target = WriteBuffer::with_pool(Arc::new(SegmentPool::new()));
        f(&mut target);
        target.to_vec()
    }

    #[test]
    fn test_nil_detection() {
        assert!(is_nil(&[0xc0], 0));
        assert!(!is_nil(&[0x01], 0));
        assert!(!is_nil(&[], 0));
        assert_eq!(read_nil(&[0xc0], 0).unwrap(), ((), 1));
        assert!(matches!(
            read_nil(&[0x01], 0),
            Err(DecodeError::UnexpectedCode { .. })
        ));
    }

    #[test]
    fn test_bool_roundtrip() {
        for value in [true, false] {
            let bytes = encoded(|t| encode::write_bool(t, value));
            assert_eq!(read_bool(&bytes, 0).unwrap(), (value, 1));
        }
    }

    #[test]
    fn test_integer_roundtrip_all_widths() {
        let values: &[i64] = &[
            0,
            1,
            127,
            128,
            255,
            256,
            65535,
            65536,
            u32::MAX as i64,
            u32::MAX as i64 + 1,
            -1,
            -32,
            -33,
            -128,
            -129,
            -32768,
            -32769,
            i32::MIN as i64,
            i32::MIN as i64 - 1,
            i64::MIN,
            i64::MAX,
        ];
        for &value in values {
            let bytes = encoded(|t| encode::write_i64(t, value));
            let (decoded, consumed) = read_i64(&bytes, 0).unwrap();
            assert_eq!(decoded, value);
            assert_eq!(consumed, bytes.len());
        }
    }

    #[test]
    fn test_unsigned_roundtrip() {
        for value in [0u64, 127, 200, 70_000, u64::MAX] {
            let bytes = encoded(|t| encode::write_u64(t, value));
            assert_eq!(read_u64(&bytes, 0).unwrap(), (value, bytes.len()));
        }
    }

    #[test]
    fn test_narrowing_rejects_out_of_range() {
        let bytes = encoded(|t| encode::write_u64(t, 300));
        assert!(matches!(
            read_u8(&bytes, 0),
            Err(DecodeError::OutOfRange { target: "u8" })
        ));

        let bytes = encoded(|t| encode::write_i64(t, -1));
        assert!(matches!(
            read_u64(&bytes, 0),
            Err(DecodeError::OutOfRange { target: "u64" })
        ));

        let bytes = encoded(|t| encode::write_u64(t, u64::MAX));
        assert!(matches!(
            read_i64(&bytes, 0),
            Err(DecodeError::OutOfRange { target: "i64" })
        ));
    }

    #[test]
    fn test_narrowing_accepts_cross_family() {
        // A positive value written through the signed writer decodes as
        // unsigned, and vice versa.
        let bytes = encoded(|t| encode::write_i64(t, 100));
        assert_eq!(read_u32(&bytes, 0).unwrap().0, 100);

        let bytes = encoded(|t| encode::write_u64(t, 100));
        assert_eq!(read_i8(&bytes, 0).unwrap().0, 100);
    }

    #[test]
    fn test_float_roundtrip_and_widening() {
        let bytes = encoded(|t| encode::write_f32(t, 10.31231));
        assert_eq!(read_f32(&bytes, 0).unwrap(), (10.31231f32, 5));
        assert_eq!(read_f64(&bytes, 0).unwrap(), (10.31231f32 as f64, 5));

        let bytes = encoded(|t| encode::write_f64(t, -0.5));
        assert_eq!(read_f64(&bytes, 0).unwrap(), (-0.5, 9));
        assert!(matches!(
            read_f32(&bytes, 0),
            Err(DecodeError::UnexpectedCode { .. })
        ));
    }

    #[test]
    fn test_str_roundtrip_all_headers() {
        for value in [
            String::new(),
            "foobar".to_string(),
            "x".repeat(31),
            "x".repeat(32),
            "x".repeat(256),
            "x".repeat(70_000),
            "\u{1F600}\u{4E2D}\u{6587}".to_string(),
        ] {
            let bytes = encoded(|t| encode::write_str(t, &value));
            let (decoded, consumed) = read_str(&bytes, 0).unwrap();
            assert_eq!(decoded, value);
            assert_eq!(consumed, bytes.len());
        }
    }

    #[test]
    fn test_str_invalid_utf8() {
        let bytes = [0xa2, 0xff, 0xfe];
        assert!(matches!(read_str(&bytes, 0), Err(DecodeError::InvalidUtf8)));
    }

    #[test]
    fn test_str_length_overrun() {
        // fixstr promising 5 bytes with only 2 present
        let bytes = [0xa5, b'a', b'b'];
        assert!(matches!(
            read_str(&bytes, 0),
            Err(DecodeError::LengthOverrun {
                length: 5,
                remaining: 2
            })
        ));
    }

    #[test]
    fn test_bin_roundtrip() {
        for value in [vec![], vec![1u8, 10, 100, 245], vec![7u8; 300]] {
            let bytes = encoded(|t| encode::write_bin(t, &value));
            let (decoded, consumed) = read_bin(&bytes, 0).unwrap();
            assert_eq!(decoded, value);
            assert_eq!(consumed, bytes.len());
        }
    }

    #[test]
    fn test_array_map_headers_roundtrip() {
        for count in [0usize, 7, 15, 16, 999, 65535, 65536] {
            let bytes = encoded(|t| encode::write_array_header(t, count));
            assert_eq!(read_array_header(&bytes, 0).unwrap(), (count, bytes.len()));

            let bytes = encoded(|t| encode::write_map_header(t, count));
            assert_eq!(read_map_header(&bytes, 0).unwrap(), (count, bytes.len()));
        }
        // Forced headers decode through the same readers.
        let bytes = encoded(|t| encode::write_array_header_force(t, 3));
        assert_eq!(read_array_header(&bytes, 0).unwrap(), (3, 5));
    }

    #[test]
    fn test_ext_roundtrip() {
        for payload in [vec![7u8], vec![1u8, 2], vec![0u8; 4], vec![3u8; 7], vec![9u8; 300]] {
            let bytes = encoded(|t| encode::write_ext(t, 10, &payload));
            let ((type_tag, decoded), consumed) = read_ext(&bytes, 0).unwrap();
            assert_eq!(type_tag, 10);
            assert_eq!(decoded, payload.as_slice());
            assert_eq!(consumed, bytes.len());
        }
    }

    #[test]
    fn test_timestamp_roundtrip() {
        let times = [
            UNIX_EPOCH + Duration::from_secs(1_600_000_000),
            UNIX_EPOCH + Duration::new(1_600_000_000, 123_456_789),
            UNIX_EPOCH + Duration::new(1u64 << 35, 42),
            UNIX_EPOCH - Duration::from_secs(10),
            UNIX_EPOCH - Duration::new(10, 250_000_000),
        ];
        for time in times {
            let bytes = encoded(|t| encode::write_timestamp(t, time));
            let (decoded, consumed) = read_timestamp(&bytes, 0).unwrap();
            assert_eq!(decoded, time);
            assert_eq!(consumed, bytes.len());
        }
    }

    #[test]
    fn test_skip_value_scalars_and_containers() {
        let mut target = WriteBuffer::with_pool(Arc::new(SegmentPool::new()));
        encode::write_i32(&mut target, 1);
        encode::write_array_header(&mut target, 3);
        encode::write_i32(&mut target, 1);
        encode::write_str(&mut target, "ten");
        encode::write_bin(&mut target, &[1, 2, 3]);
        encode::write_i32(&mut target, 100);
        let bytes = target.to_vec();

        let mut offset = 0;
        offset += skip_value(&bytes, offset).unwrap(); // the leading int
        offset += skip_value(&bytes, offset).unwrap(); // the whole array
        assert_eq!(read_i32(&bytes, offset).unwrap().0, 100);
    }

    #[test]
    fn test_skip_value_map() {
        let mut target = WriteBuffer::with_pool(Arc::new(SegmentPool::new()));
        encode::write_map_header(&mut target, 2);
        encode::write_i32(&mut target, 1);
        encode::write_i32(&mut target, 10);
        encode::write_i32(&mut target, 111);
        encode::write_i32(&mut target, 200);
        encode::write_i32(&mut target, 100);
        let bytes = target.to_vec();

        let consumed = skip_value(&bytes, 0).unwrap();
        assert_eq!(read_i32(&bytes, consumed).unwrap().0, 100);
    }

    #[test]
    fn test_skip_value_truncated_container() {
        // array of 3 with only 1 element present
        let bytes = [0x93, 0x01];
        assert!(skip_value(&bytes, 0).is_err());
    }

    #[test]
    fn test_skip_value_depth_guard() {
        // Deep nesting of one-element arrays followed by a nil.
        let mut bytes = vec![0x91; MAX_SKIP_DEPTH + 8];
        bytes.push(0xc0);
        assert!(matches!(
            skip_value(&bytes, 0),
            Err(DecodeError::DepthLimitExceeded { .. })
        ));
    }

    #[test]
    fn test_never_used_code_is_malformed() {
        assert!(matches!(
            skip_value(&[0xc1], 0),
            Err(DecodeError::UnexpectedCode { actual: 0xc1, .. })
        ));
    }

    #[test]
    fn test_decode_at_offset() {
        let mut bytes = vec![0xde, 0xad];
        bytes.extend(encoded(|t| encode::write_str(t, "zzz")));
        let (value, consumed) = read_str(&bytes, 2).unwrap();
        assert_eq!(value, "zzz");
        assert_eq!(consumed, 4);
    }
}
