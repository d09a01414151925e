//! Packforge - MessagePack-compatible binary serialization engine
//!
//! Packforge serializes typed values to the MessagePack wire format and
//! back, with per-type encode/decode strategies composed through a
//! pluggable, type-indexed registry.
//!
//! # Quick Start
//!
//! ```
//! use packforge::{serialize, deserialize};
//!
//! let value = (42i32, "answer".to_string(), vec![1u8, 2, 3]);
//! let bytes = serialize(&value)?;
//! let decoded: (i32, String, Vec<u8>) = deserialize(&bytes)?;
//! assert_eq!(decoded, value);
//! # Ok::<(), packforge::Error>(())
//! ```
//!
//! # Architecture
//!
//! Three layers sit beneath the facade, each its own crate:
//!
//! - [`packforge_buffer`]: a pooled-segment [`WriteBuffer`] with a
//!   reserve/commit protocol, so encoders never allocate per scalar write
//! - [`packforge_codec`]: the wire-format primitive encoders and decoders,
//!   compact and forced-width, plus the strict one-value stream reader
//! - this crate: the [`Formatter`] contract, the [`FormatterRegistry`]
//!   resolver chain with its lock-free lookup cache, the built-in
//!   formatter suite, and the serializer entry points
//!
//! Custom encodings register through a [`LayerMap`]; layers always win
//! over the built-in synthesis, so any type's wire form can be overridden
//! without touching the type.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod formatter;
pub mod formatters;
pub mod registry;
pub mod serializer;

pub use formatter::{Formatter, WireType};
pub use registry::{FormatterRegistry, FormatterSlot, LayerMap, ResolverLayer};
pub use serializer::{
    default_registry, deserialize, deserialize_from, deserialize_from_async,
    deserialize_from_async_with, deserialize_from_strict, deserialize_from_strict_with,
    deserialize_from_with, deserialize_with, serialize, serialize_to_async,
    serialize_to_async_with, serialize_to_writer, serialize_to_writer_with, serialize_with,
    set_default_registry, DefaultRegistryError,
};

pub use packforge_buffer::{PoolStats, Segment, SegmentPool, WriteBuffer};
pub use packforge_codec::{codes, decode, encode, stream};
pub use packforge_core::{DecodeError, Error, FormatterNotFound, Result};
