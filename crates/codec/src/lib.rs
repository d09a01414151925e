//! Wire-format primitive codec for the packforge serialization engine
//!
//! Pure encode/decode functions for every element of the binary format:
//! nil, booleans, the integer width families (compact and forced), floats,
//! strings, binary blobs, array/map headers, extensions, and the standard
//! timestamp extension. Encoders write through a
//! [`WriteBuffer`](packforge_buffer::WriteBuffer) reservation; decoders
//! work over `(bytes, offset)` and report exactly how many bytes they
//! consumed.
//!
//! The `stream` module reads exactly one value's byte span from an
//! `io::Read` for multiplexed streams.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codes;
pub mod decode;
pub mod encode;
pub mod stream;
