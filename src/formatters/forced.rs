//! Forced fixed-width integer formatters
//!
//! These always emit the full-width code for their type, never a fixint or
//! narrower form, so consumers that patch bytes at known offsets see a
//! stable layout. Decode accepts any integer code, so forced and compact
//! payloads interoperate. Register these through a layer to override the
//! compact default for a type, or use them directly from hand-written
//! record formatters.

use std::sync::Arc;

use packforge_buffer::WriteBuffer;
use packforge_codec::{decode, encode};
use packforge_core::Error;

use crate::formatter::{Formatter, WireType};
use crate::registry::FormatterRegistry;

macro_rules! force_formatter {
    ($name:ident, $nullable:ident, $ty:ty, $write:path, $read:path) => {
        #[doc = concat!("Fixed-width formatter for `", stringify!($ty), "`")]
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl Formatter<$ty> for $name {
            fn serialize(
                &self,
                target: &mut WriteBuffer,
                value: &$ty,
                _registry: &FormatterRegistry,
            ) -> Result<usize, Error> {
                Ok($write(target, *value))
            }

            fn deserialize(
                &self,
                bytes: &[u8],
                offset: usize,
                _registry: &FormatterRegistry,
            ) -> Result<($ty, usize), Error> {
                Ok($read(bytes, offset)?)
            }
        }

        #[doc = concat!(
            "Fixed-width formatter for `Option<",
            stringify!($ty),
            ">`; absence is nil"
        )]
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $nullable;

        impl Formatter<Option<$ty>> for $nullable {
            fn serialize(
                &self,
                target: &mut WriteBuffer,
                value: &Option<$ty>,
                _registry: &FormatterRegistry,
            ) -> Result<usize, Error> {
                match value {
                    None => Ok(encode::write_nil(target)),
                    Some(inner) => Ok($write(target, *inner)),
                }
            }

            fn deserialize(
                &self,
                bytes: &[u8],
                offset: usize,
                _registry: &FormatterRegistry,
            ) -> Result<(Option<$ty>, usize), Error> {
                if decode::is_nil(bytes, offset) {
                    return Ok((None, 1));
                }
                let (value, consumed) = $read(bytes, offset)?;
                Ok((Some(value), consumed))
            }
        }
    };
}

force_formatter!(
    ForceU8Formatter,
    NullableForceU8Formatter,
    u8,
    encode::write_u8_force,
    decode::read_u8
);
force_formatter!(
    ForceU16Formatter,
    NullableForceU16Formatter,
    u16,
    encode::write_u16_force,
    decode::read_u16
);
force_formatter!(
    ForceU32Formatter,
    NullableForceU32Formatter,
    u32,
    encode::write_u32_force,
    decode::read_u32
);
force_formatter!(
    ForceU64Formatter,
    NullableForceU64Formatter,
    u64,
    encode::write_u64_force,
    decode::read_u64
);
force_formatter!(
    ForceI8Formatter,
    NullableForceI8Formatter,
    i8,
    encode::write_i8_force,
    decode::read_i8
);
force_formatter!(
    ForceI16Formatter,
    NullableForceI16Formatter,
    i16,
    encode::write_i16_force,
    decode::read_i16
);
force_formatter!(
    ForceI32Formatter,
    NullableForceI32Formatter,
    i32,
    encode::write_i32_force,
    decode::read_i32
);
force_formatter!(
    ForceI64Formatter,
    NullableForceI64Formatter,
    i64,
    encode::write_i64_force,
    decode::read_i64
);

macro_rules! force_vec_formatter {
    ($name:ident, $ty:ty, $write:path, $read:path) => {
        #[doc = concat!(
            "Sequence formatter writing every `",
            stringify!($ty),
            "` element in its fixed-width form"
        )]
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl Formatter<Vec<$ty>> for $name {
            fn serialize(
                &self,
                target: &mut WriteBuffer,
                value: &Vec<$ty>,
                _registry: &FormatterRegistry,
            ) -> Result<usize, Error> {
                let mut written = encode::write_array_header(target, value.len());
                for item in value {
                    written += $write(target, *item);
                }
                Ok(written)
            }

            fn deserialize(
                &self,
                bytes: &[u8],
                offset: usize,
                _registry: &FormatterRegistry,
            ) -> Result<(Vec<$ty>, usize), Error> {
                let start = offset;
                let (count, consumed) = decode::read_array_header(bytes, offset)?;
                let mut offset = offset + consumed;
                let mut out = Vec::with_capacity(count.min(4096));
                for _ in 0..count {
                    let (value, consumed) = $read(bytes, offset)?;
                    out.push(value);
                    offset += consumed;
                }
                Ok((out, offset - start))
            }
        }
    };
}

force_vec_formatter!(ForceU16VecFormatter, u16, encode::write_u16_force, decode::read_u16);
force_vec_formatter!(ForceU32VecFormatter, u32, encode::write_u32_force, decode::read_u32);
force_vec_formatter!(ForceU64VecFormatter, u64, encode::write_u64_force, decode::read_u64);
force_vec_formatter!(ForceI16VecFormatter, i16, encode::write_i16_force, decode::read_i16);
force_vec_formatter!(ForceI32VecFormatter, i32, encode::write_i32_force, decode::read_i32);
force_vec_formatter!(ForceI64VecFormatter, i64, encode::write_i64_force, decode::read_i64);

/// Convenience: a layer registering the forced formatter for every integer
/// type, for callers that want offset-stable payloads throughout
pub fn forced_integer_layer() -> crate::registry::LayerMap {
    let mut layer = crate::registry::LayerMap::new();
    layer.register::<u8>(Arc::new(ForceU8Formatter));
    layer.register::<u16>(Arc::new(ForceU16Formatter));
    layer.register::<u32>(Arc::new(ForceU32Formatter));
    layer.register::<u64>(Arc::new(ForceU64Formatter));
    layer.register::<i8>(Arc::new(ForceI8Formatter));
    layer.register::<i16>(Arc::new(ForceI16Formatter));
    layer.register::<i32>(Arc::new(ForceI32Formatter));
    layer.register::<i64>(Arc::new(ForceI64Formatter));
    layer
}
