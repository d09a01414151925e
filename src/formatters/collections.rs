//! Collection formatters: sequences and maps
//!
//! Sequences are length-prefixed arrays; maps alternate key/value pairs
//! after a pair-count header. Element formatters are re-resolved from the
//! registry once per call.

use std::collections::HashMap;
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;

use packforge_buffer::WriteBuffer;
use packforge_codec::{decode, encode};
use packforge_core::Error;

use crate::formatter::{Formatter, WireType};
use crate::registry::FormatterRegistry;

/// Cap on speculative pre-allocation from untrusted count headers;
/// oversized claims still fail element-by-element
const PREALLOC_CAP: usize = 4096;

/// Formatter for `Vec<T>`
#[derive(Debug)]
pub struct VecFormatter<T>(PhantomData<fn() -> T>);

impl<T> Default for VecFormatter<T> {
    fn default() -> Self {
        VecFormatter(PhantomData)
    }
}

impl<T: WireType> Formatter<Vec<T>> for VecFormatter<T> {
    fn serialize(
        &self,
        target: &mut WriteBuffer,
        value: &Vec<T>,
        registry: &FormatterRegistry,
    ) -> Result<usize, Error> {
        let formatter = registry.formatter::<T>()?;
        let mut written = encode::write_array_header(target, value.len());
        for item in value {
            written += formatter.serialize(target, item, registry)?;
        }
        Ok(written)
    }

    fn deserialize(
        &self,
        bytes: &[u8],
        offset: usize,
        registry: &FormatterRegistry,
    ) -> Result<(Vec<T>, usize), Error> {
        let formatter = registry.formatter::<T>()?;
        let start = offset;
        let (count, consumed) = decode::read_array_header(bytes, offset)?;
        let mut offset = offset + consumed;

        let mut out = Vec::with_capacity(count.min(PREALLOC_CAP));
        for _ in 0..count {
            let (value, consumed) = formatter.deserialize(bytes, offset, registry)?;
            out.push(value);
            offset += consumed;
        }
        Ok((out, offset - start))
    }
}

impl<T: WireType> WireType for Vec<T> {
    fn formatter() -> Arc<dyn Formatter<Self>> {
        Arc::new(VecFormatter::<T>::default())
    }
}

/// Formatter for `HashMap<K, V>`
#[derive(Debug)]
pub struct HashMapFormatter<K, V>(PhantomData<fn() -> (K, V)>);

impl<K, V> Default for HashMapFormatter<K, V> {
    fn default() -> Self {
        HashMapFormatter(PhantomData)
    }
}

impl<K, V> Formatter<HashMap<K, V>> for HashMapFormatter<K, V>
where
    K: WireType + Eq + Hash,
    V: WireType,
{
    fn serialize(
        &self,
        target: &mut WriteBuffer,
        value: &HashMap<K, V>,
        registry: &FormatterRegistry,
    ) -> Result<usize, Error> {
        let key_formatter = registry.formatter::<K>()?;
        let value_formatter = registry.formatter::<V>()?;
        let mut written = encode::write_map_header(target, value.len());
        for (key, item) in value {
            written += key_formatter.serialize(target, key, registry)?;
            written += value_formatter.serialize(target, item, registry)?;
        }
        Ok(written)
    }

    fn deserialize(
        &self,
        bytes: &[u8],
        offset: usize,
        registry: &FormatterRegistry,
    ) -> Result<(HashMap<K, V>, usize), Error> {
        let key_formatter = registry.formatter::<K>()?;
        let value_formatter = registry.formatter::<V>()?;
        let start = offset;
        let (count, consumed) = decode::read_map_header(bytes, offset)?;
        let mut offset = offset + consumed;

        let mut out = HashMap::with_capacity(count.min(PREALLOC_CAP));
        for _ in 0..count {
            let (key, consumed) = key_formatter.deserialize(bytes, offset, registry)?;
            offset += consumed;
            let (value, consumed) = value_formatter.deserialize(bytes, offset, registry)?;
            offset += consumed;
            out.insert(key, value);
        }
        Ok((out, offset - start))
    }
}

impl<K, V> WireType for HashMap<K, V>
where
    K: WireType + Eq + Hash,
    V: WireType,
{
    fn formatter() -> Arc<dyn Formatter<Self>> {
        Arc::new(HashMapFormatter::<K, V>::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip<T: WireType + PartialEq + std::fmt::Debug>(value: T) -> Vec<u8> {
        let registry = FormatterRegistry::standard();
        let formatter = registry.formatter::<T>().unwrap();
        let mut target = WriteBuffer::new();
        formatter.serialize(&mut target, &value, &registry).unwrap();
        let bytes = target.to_vec();
        let (decoded, consumed) = formatter.deserialize(&bytes, 0, &registry).unwrap();
        assert_eq!(decoded, value);
        assert_eq!(consumed, bytes.len());
        bytes
    }

    #[test]
    fn test_vec_roundtrip() {
        roundtrip::<Vec<i32>>(vec![]);
        roundtrip(vec![1i32, 10, 100, 1000, 10000, i16::MAX as i32, i32::MAX]);
        roundtrip(vec!["a".to_string(), String::new(), "ccc".to_string()]);
        roundtrip((0..1000i64).collect::<Vec<_>>());
    }

    #[test]
    fn test_vec_wire_shape() {
        let bytes = roundtrip(vec![1u8, 10, 100]);
        assert_eq!(bytes, vec![0x93, 1, 10, 100]);
    }

    #[test]
    fn test_nested_vec() {
        roundtrip(vec![vec![1i32, 2], vec![], vec![3]]);
    }

    #[test]
    fn test_hashmap_roundtrip() {
        let mut map = HashMap::new();
        map.insert(1i32, "one".to_string());
        map.insert(2, "two".to_string());
        map.insert(-7, String::new());
        roundtrip(map);

        roundtrip::<HashMap<String, Vec<u64>>>(HashMap::new());
    }

    #[test]
    fn test_truncated_array_fails() {
        let registry = FormatterRegistry::standard();
        let formatter = registry.formatter::<Vec<i32>>().unwrap();
        // fixarray of 3 with only two elements present
        let err = formatter.deserialize(&[0x93, 1, 2], 0, &registry).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn test_huge_count_header_fails_without_oom() {
        let registry = FormatterRegistry::standard();
        let formatter = registry.formatter::<Vec<i32>>().unwrap();
        // array32 claiming u32::MAX elements, no payload
        let err = formatter
            .deserialize(&[0xdd, 0xff, 0xff, 0xff, 0xff], 0, &registry)
            .unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }
}
