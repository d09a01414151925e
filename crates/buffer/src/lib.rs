//! Pooled write buffers for the packforge serialization engine
//!
//! This crate implements the memory layer the primitive encoders write
//! through:
//! - `SegmentPool`: size-tiered reuse of fixed-capacity byte segments
//! - `WriteBuffer`: a segment chain with a reserve/commit protocol, so
//!   encoders never pay an allocation per scalar write
//!
//! A `WriteBuffer` is a single-writer, scoped-lifetime object. The pool is
//! safe for concurrent rent/return from independent buffers.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod pool;
pub mod write_buffer;

pub use pool::{PoolStats, Segment, SegmentPool};
pub use write_buffer::WriteBuffer;
