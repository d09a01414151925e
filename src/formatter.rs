//! The formatter contract
//!
//! A [`Formatter`] is the per-type strategy pairing one encode and one
//! decode routine. Formatters for composite types own no element
//! formatters; they borrow the registry on every call and re-resolve, so
//! mutually recursive and generic type graphs work regardless of
//! construction order.

use std::sync::Arc;

use packforge_buffer::WriteBuffer;
use packforge_core::Error;

use crate::registry::FormatterRegistry;

/// Per-type serialization strategy.
///
/// Implementations are stateless (or hold only construction-time tables,
/// like the enum name maps) and are shared as `Arc<dyn Formatter<T>>`
/// across threads.
pub trait Formatter<T>: Send + Sync {
    /// Encode `value` into `target`, returning the bytes written.
    ///
    /// Fails only when a nested formatter resolution fails; wire encoding
    /// itself is infallible.
    fn serialize(
        &self,
        target: &mut WriteBuffer,
        value: &T,
        registry: &FormatterRegistry,
    ) -> Result<usize, Error>;

    /// Decode one value starting at `offset`, returning it with the byte
    /// count consumed. Stops at the first malformed element; never returns
    /// a partial value.
    fn deserialize(
        &self,
        bytes: &[u8],
        offset: usize,
        registry: &FormatterRegistry,
    ) -> Result<(T, usize), Error>;
}

/// Types with a canonical wire representation.
///
/// `formatter()` synthesizes the type's default formatter; blanket impls
/// over `Option`, `Vec`, `HashMap`, tuples, and the multi-dimensional
/// array types compose element formatters statically, standing in for the
/// open-generic runtime instantiation this engine's lineage used.
/// Registry layers always take priority over this synthesis.
pub trait WireType: Sized + Send + Sync + 'static {
    /// The canonical formatter for this type
    fn formatter() -> Arc<dyn Formatter<Self>>;
}
