//! The ignore formatter
//!
//! For fields intentionally excluded from the wire while still holding a
//! slot in a fixed-shape array encoding. This is the only place in the
//! engine where a decoded element is deliberately discarded.

use std::marker::PhantomData;

use packforge_buffer::WriteBuffer;
use packforge_codec::{decode, encode};
use packforge_core::Error;

use crate::formatter::Formatter;
use crate::registry::FormatterRegistry;

/// Serializes any value as nil; deserializes by skipping one well-formed
/// element and returning the type's default
#[derive(Debug)]
pub struct IgnoreFormatter<T>(PhantomData<fn() -> T>);

impl<T> Default for IgnoreFormatter<T> {
    fn default() -> Self {
        IgnoreFormatter(PhantomData)
    }
}

impl<T: Default + Send + Sync> Formatter<T> for IgnoreFormatter<T> {
    fn serialize(
        &self,
        target: &mut WriteBuffer,
        _value: &T,
        _registry: &FormatterRegistry,
    ) -> Result<usize, Error> {
        Ok(encode::write_nil(target))
    }

    fn deserialize(
        &self,
        bytes: &[u8],
        offset: usize,
        _registry: &FormatterRegistry,
    ) -> Result<(T, usize), Error> {
        let consumed = decode::skip_value(bytes, offset)?;
        Ok((T::default(), consumed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_writes_nil() {
        let registry = FormatterRegistry::standard();
        let formatter = IgnoreFormatter::<String>::default();
        let mut target = WriteBuffer::new();
        let written = formatter
            .serialize(&mut target, &"discarded".to_string(), &registry)
            .unwrap();
        assert_eq!(written, 1);
        assert_eq!(target.to_vec(), vec![0xc0]);
    }

    #[test]
    fn test_deserialize_skips_and_defaults() {
        let registry = FormatterRegistry::standard();
        let formatter = IgnoreFormatter::<i32>::default();

        // Skipped slot holds a nested array; the next element must stay
        // reachable.
        let mut target = WriteBuffer::new();
        encode::write_array_header(&mut target, 2);
        encode::write_str(&mut target, "ab");
        encode::write_i64(&mut target, 9000);
        encode::write_i32(&mut target, 77);
        let bytes = target.to_vec();

        let (value, consumed) = formatter.deserialize(&bytes, 0, &registry).unwrap();
        assert_eq!(value, 0);
        assert_eq!(decode::read_i32(&bytes, consumed).unwrap().0, 77);
    }

    #[test]
    fn test_deserialize_fails_on_malformed_slot() {
        let registry = FormatterRegistry::standard();
        let formatter = IgnoreFormatter::<i32>::default();
        // 0xc1 is never a valid element.
        assert!(formatter.deserialize(&[0xc1], 0, &registry).is_err());
    }
}
