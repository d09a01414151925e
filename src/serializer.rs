//! Serializer facade
//!
//! The entry points application code calls: value-to-bytes and back, plus
//! sync and async stream variants. Every `_with`-less function runs
//! against the process default registry, which is the standard registry
//! unless [`set_default_registry`] replaced it before first use.
//!
//! Stream deserialization has two modes. Lenient ([`deserialize_from`])
//! drains the stream to end into a pool-rented scratch buffer, growing
//! geometrically, then decodes from the start; it cannot be used when more
//! data follows the value on the same stream. Strict
//! ([`deserialize_from_strict`]) parses headers to consume exactly one
//! value's byte span, leaving the stream positioned at the next value.

use once_cell::sync::OnceCell;
use std::io::{Read, Write};
use std::sync::Arc;
use thiserror::Error as ThisError;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};

use packforge_buffer::{Segment, SegmentPool, WriteBuffer};
use packforge_codec::stream;
use packforge_core::limits::DEFAULT_SEGMENT_SIZE;
use packforge_core::Error;

use crate::formatter::WireType;
use crate::registry::FormatterRegistry;

static DEFAULT_REGISTRY: OnceCell<Arc<FormatterRegistry>> = OnceCell::new();

/// Failures of default-registry management
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum DefaultRegistryError {
    /// The default registry was already materialized, by an explicit set
    /// or by first use
    #[error("default registry already initialized")]
    AlreadyInitialized,
}

/// Replace the process default registry.
///
/// Legal only before any resolver-less entry point has run; afterward the
/// default is frozen and this fails.
pub fn set_default_registry(registry: Arc<FormatterRegistry>) -> Result<(), DefaultRegistryError> {
    DEFAULT_REGISTRY
        .set(registry)
        .map_err(|_| DefaultRegistryError::AlreadyInitialized)
}

/// The process default registry, materializing the standard registry on
/// first use
pub fn default_registry() -> Arc<FormatterRegistry> {
    DEFAULT_REGISTRY
        .get_or_init(|| Arc::new(FormatterRegistry::standard()))
        .clone()
}

/// Serialize `value` to a byte vector with the default registry
pub fn serialize<T: WireType>(value: &T) -> Result<Vec<u8>, Error> {
    serialize_with(value, &default_registry())
}

/// Serialize `value` to a byte vector with an explicit registry
pub fn serialize_with<T: WireType>(
    value: &T,
    registry: &FormatterRegistry,
) -> Result<Vec<u8>, Error> {
    let formatter = registry.formatter::<T>()?;
    let mut target = WriteBuffer::new();
    formatter.serialize(&mut target, value, registry)?;
    Ok(target.to_vec())
}

/// Serialize `value` to a writer, returning the bytes written
pub fn serialize_to_writer<T: WireType, W: Write>(
    writer: &mut W,
    value: &T,
) -> Result<usize, Error> {
    serialize_to_writer_with(writer, value, &default_registry())
}

/// Serialize `value` to a writer with an explicit registry
pub fn serialize_to_writer_with<T: WireType, W: Write>(
    writer: &mut W,
    value: &T,
    registry: &FormatterRegistry,
) -> Result<usize, Error> {
    let formatter = registry.formatter::<T>()?;
    let mut target = WriteBuffer::new();
    formatter.serialize(&mut target, value, registry)?;
    Ok(target.flush_to_writer(writer)?)
}

/// Serialize `value` to an async writer; encoding runs synchronously and
/// only the flush suspends
pub async fn serialize_to_async<T: WireType, W: AsyncWrite + Unpin>(
    writer: &mut W,
    value: &T,
) -> Result<usize, Error> {
    serialize_to_async_with(writer, value, &default_registry()).await
}

/// Async stream serialization with an explicit registry
pub async fn serialize_to_async_with<T: WireType, W: AsyncWrite + Unpin>(
    writer: &mut W,
    value: &T,
    registry: &FormatterRegistry,
) -> Result<usize, Error> {
    let formatter = registry.formatter::<T>()?;
    let mut target = WriteBuffer::new();
    formatter.serialize(&mut target, value, registry)?;
    Ok(target.flush_to_async(writer).await?)
}

/// Deserialize one value from `bytes` with the default registry.
///
/// Trailing bytes after the value are ignored.
pub fn deserialize<T: WireType>(bytes: &[u8]) -> Result<T, Error> {
    deserialize_with(bytes, &default_registry())
}

/// Deserialize one value from `bytes` with an explicit registry
pub fn deserialize_with<T: WireType>(
    bytes: &[u8],
    registry: &FormatterRegistry,
) -> Result<T, Error> {
    let formatter = registry.formatter::<T>()?;
    let (value, _) = formatter.deserialize(bytes, 0, registry)?;
    Ok(value)
}

/// Lenient stream deserialization: drain to end-of-stream, then decode.
///
/// Cannot be used when more data follows the encoded value on the same
/// stream; use [`deserialize_from_strict`] there.
pub fn deserialize_from<T: WireType, R: Read>(reader: &mut R) -> Result<T, Error> {
    deserialize_from_with(reader, &default_registry())
}

/// Lenient stream deserialization with an explicit registry
pub fn deserialize_from_with<T: WireType, R: Read>(
    reader: &mut R,
    registry: &FormatterRegistry,
) -> Result<T, Error> {
    let pool = SegmentPool::shared();
    let mut segment = pool.rent(DEFAULT_SEGMENT_SIZE);
    let filled = fill_from_reader(reader, &pool, &mut segment);
    let result =
        filled.and_then(|length| deserialize_with(&segment.as_slice()[..length], registry));
    pool.return_segment(segment, false);
    result
}

/// Strict stream deserialization: consume exactly one encoded value's
/// bytes, leaving trailing stream data unread
pub fn deserialize_from_strict<T: WireType, R: Read>(reader: &mut R) -> Result<T, Error> {
    deserialize_from_strict_with(reader, &default_registry())
}

/// Strict stream deserialization with an explicit registry
pub fn deserialize_from_strict_with<T: WireType, R: Read>(
    reader: &mut R,
    registry: &FormatterRegistry,
) -> Result<T, Error> {
    let block = stream::read_value_block(reader)?;
    deserialize_with(&block, registry)
}

/// Async lenient stream deserialization.
///
/// There is no strict async variant; strict reads issue many small reads
/// and belong on a buffered synchronous source.
pub async fn deserialize_from_async<T: WireType, R: AsyncRead + Unpin>(
    reader: &mut R,
) -> Result<T, Error> {
    deserialize_from_async_with(reader, &default_registry()).await
}

/// Async lenient stream deserialization with an explicit registry
pub async fn deserialize_from_async_with<T: WireType, R: AsyncRead + Unpin>(
    reader: &mut R,
    registry: &FormatterRegistry,
) -> Result<T, Error> {
    let pool = SegmentPool::shared();
    let mut segment = pool.rent(DEFAULT_SEGMENT_SIZE);
    let mut length = 0;
    let result = loop {
        match reader.read(&mut segment.as_mut_slice()[length..]).await {
            Err(err) => break Err(Error::Io(err)),
            Ok(0) => break deserialize_with(&segment.as_slice()[..length], registry),
            Ok(read) => {
                length += read;
                if length == segment.capacity() {
                    grow_scratch(&pool, &mut segment, length);
                }
            }
        }
    };
    pool.return_segment(segment, false);
    result
}

fn fill_from_reader<R: Read>(
    reader: &mut R,
    pool: &SegmentPool,
    segment: &mut Segment,
) -> Result<usize, Error> {
    let mut length = 0;
    loop {
        let read = reader.read(&mut segment.as_mut_slice()[length..])?;
        if read == 0 {
            return Ok(length);
        }
        length += read;
        if length == segment.capacity() {
            grow_scratch(pool, segment, length);
        }
    }
}

fn grow_scratch(pool: &SegmentPool, segment: &mut Segment, length: usize) {
    let mut bigger = pool.rent(length * 2);
    bigger.as_mut_slice()[..length].copy_from_slice(&segment.as_slice()[..length]);
    pool.return_segment(std::mem::replace(segment, bigger), false);
}
