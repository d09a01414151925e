//! Nullable wrapping
//!
//! Absence is the one-byte nil sentinel; presence uses the wrapped type's
//! own header with no extra envelope, so `Some(v)` and plain `v` are
//! byte-identical on the wire.

use std::marker::PhantomData;
use std::sync::Arc;

use packforge_buffer::WriteBuffer;
use packforge_codec::{decode, encode};
use packforge_core::Error;

use crate::formatter::{Formatter, WireType};
use crate::registry::FormatterRegistry;

/// Formatter for `Option<T>`, re-resolving the element formatter per call
#[derive(Debug)]
pub struct OptionFormatter<T>(PhantomData<fn() -> T>);

impl<T> Default for OptionFormatter<T> {
    fn default() -> Self {
        OptionFormatter(PhantomData)
    }
}

impl<T: WireType> Formatter<Option<T>> for OptionFormatter<T> {
    fn serialize(
        &self,
        target: &mut WriteBuffer,
        value: &Option<T>,
        registry: &FormatterRegistry,
    ) -> Result<usize, Error> {
        match value {
            None => Ok(encode::write_nil(target)),
            Some(inner) => registry.formatter::<T>()?.serialize(target, inner, registry),
        }
    }

    fn deserialize(
        &self,
        bytes: &[u8],
        offset: usize,
        registry: &FormatterRegistry,
    ) -> Result<(Option<T>, usize), Error> {
        if decode::is_nil(bytes, offset) {
            return Ok((None, 1));
        }
        let (value, consumed) = registry
            .formatter::<T>()?
            .deserialize(bytes, offset, registry)?;
        Ok((Some(value), consumed))
    }
}

impl<T: WireType> WireType for Option<T> {
    fn formatter() -> Arc<dyn Formatter<Self>> {
        Arc::new(OptionFormatter::<T>::default())
    }
}
