//! Error types for the serialization engine
//!
//! We use `thiserror` for automatic `Display` and `Error` trait
//! implementations. Decode failures stop at the first error; no partial
//! value is ever returned to the caller.

use std::io;
use thiserror::Error;

/// Result type alias for facade-level operations
pub type Result<T> = std::result::Result<T, Error>;

/// Malformed-input errors raised while decoding wire data.
///
/// Every variant means the input bytes cannot produce a value of the
/// requested type. Decoding never repairs, pads, or truncates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Input ended before the current element was complete
    #[error("Unexpected end of data")]
    UnexpectedEof,

    /// A specific format code was required but a different one was found
    #[error("Unexpected format code: expected {expected}, got {actual:#04x}")]
    UnexpectedCode {
        /// Human-readable name of the expected code family
        expected: &'static str,
        /// The code byte actually read
        actual: u8,
    },

    /// String payload was not valid UTF-8
    #[error("Invalid UTF-8 string")]
    InvalidUtf8,

    /// An integer on the wire does not fit the requested type
    #[error("Integer does not fit in {target}")]
    OutOfRange {
        /// Name of the target type
        target: &'static str,
    },

    /// A fixed-shape composite carried the wrong element count
    #[error("Wrong element count: expected {expected}, got {actual}")]
    ArityMismatch {
        /// Element count the formatter requires
        expected: usize,
        /// Element count found in the header
        actual: usize,
    },

    /// An enum string matched no declared member and no fallback parse
    #[error("Unknown enum name: {0}")]
    UnknownEnumName(String),

    /// Container nesting exceeded the recursion guard
    #[error("Value nesting exceeds {max} levels")]
    DepthLimitExceeded {
        /// The configured nesting ceiling
        max: usize,
    },

    /// A length header promises more bytes than the input holds
    #[error("Length header of {length} bytes exceeds remaining input of {remaining}")]
    LengthOverrun {
        /// Payload length claimed by the header
        length: usize,
        /// Bytes actually remaining after the header
        remaining: usize,
    },
}

/// No resolver layer produced a formatter for the requested type.
///
/// Fatal to the call; resolution is never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("No formatter registered for type {type_name}")]
pub struct FormatterNotFound {
    /// `std::any::type_name` of the unresolved type
    pub type_name: &'static str,
}

/// Top-level error surfaced by the serializer facade
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed wire data
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Formatter resolution failed
    #[error(transparent)]
    FormatterNotFound(#[from] FormatterNotFound),

    /// I/O error from an underlying stream, propagated unchanged
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A fixed-size sink cannot hold the serialized bytes
    #[error("Cannot fit {needed} bytes into a sink with {available} bytes free")]
    SinkTooSmall {
        /// Total committed bytes awaiting flush
        needed: usize,
        /// Free space in the destination
        available: usize,
    },
}
