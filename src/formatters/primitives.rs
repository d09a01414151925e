//! Formatters for the scalar wire types
//!
//! Integers use the compact width policy (narrowest code that round-trips
//! the value); readers accept any integer code whose value fits the target
//! type. `Vec<u8>` resolves to an array of integers through the collection
//! blanket; callers who want the `bin` family wrap values in [`Bin`] or
//! register [`RawBytesFormatter`] as an override.

use std::sync::Arc;

use packforge_buffer::WriteBuffer;
use packforge_codec::{decode, encode};
use packforge_core::Error;

use crate::formatter::{Formatter, WireType};
use crate::registry::FormatterRegistry;

macro_rules! scalar_formatter {
    ($name:ident, $ty:ty, $write:path, $read:path) => {
        #[doc = concat!("Compact formatter for `", stringify!($ty), "`")]
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

        impl WireType for $ty {
            fn formatter() -> Arc<dyn Formatter<Self>> {
                Arc::new($name)
            }
        }
    };
}

scalar_formatter!(BoolFormatter, bool, encode::write_bool, decode::read_bool);
scalar_formatter!(U8Formatter, u8, encode::write_u8, decode::read_u8);
scalar_formatter!(U16Formatter, u16, encode::write_u16, decode::read_u16);
scalar_formatter!(U32Formatter, u32, encode::write_u32, decode::read_u32);
scalar_formatter!(U64Formatter, u64, encode::write_u64, decode::read_u64);
scalar_formatter!(I8Formatter, i8, encode::write_i8, decode::read_i8);
scalar_formatter!(I16Formatter, i16, encode::write_i16, decode::read_i16);
scalar_formatter!(I32Formatter, i32, encode::write_i32, decode::read_i32);
scalar_formatter!(I64Formatter, i64, encode::write_i64, decode::read_i64);
scalar_formatter!(F32Formatter, f32, encode::write_f32, decode::read_f32);
scalar_formatter!(F64Formatter, f64, encode::write_f64, decode::read_f64);

/// Formatter for `String` with the compact length-header policy
#[derive(Debug, Clone, Copy, Default)]
pub struct StringFormatter;

impl Formatter<String> for StringFormatter {
    fn serialize(
        &self,
        target: &mut WriteBuffer,
        value: &String,
        _registry: &FormatterRegistry,
    ) -> Result<usize, Error> {
        Ok(encode::write_str(target, value))
    }

    fn deserialize(
        &self,
        bytes: &[u8],
        offset: usize,
        _registry: &FormatterRegistry,
    ) -> Result<(String, usize), Error> {
        Ok(decode::read_str(bytes, offset)?)
    }
}

impl WireType for String {
    fn formatter() -> Arc<dyn Formatter<Self>> {
        Arc::new(StringFormatter)
    }
}

/// Byte payload that encodes through the `bin` family instead of an
/// integer array
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Bin(pub Vec<u8>);

/// Formatter for [`Bin`]
#[derive(Debug, Clone, Copy, Default)]
pub struct BinFormatter;

impl Formatter<Bin> for BinFormatter {
    fn serialize(
        &self,
        target: &mut WriteBuffer,
        value: &Bin,
        _registry: &FormatterRegistry,
    ) -> Result<usize, Error> {
        Ok(encode::write_bin(target, &value.0))
    }

    fn deserialize(
        &self,
        bytes: &[u8],
        offset: usize,
        _registry: &FormatterRegistry,
    ) -> Result<(Bin, usize), Error> {
        let (value, consumed) = decode::read_bin(bytes, offset)?;
        Ok((Bin(value), consumed))
    }
}

impl WireType for Bin {
    fn formatter() -> Arc<dyn Formatter<Self>> {
        Arc::new(BinFormatter)
    }
}

/// `bin`-family formatter for plain `Vec<u8>`, registered as a layer
/// override when callers prefer blobs over integer arrays
#[derive(Debug, Clone, Copy, Default)]
pub struct RawBytesFormatter;

impl Formatter<Vec<u8>> for RawBytesFormatter {
    fn serialize(
        &self,
        target: &mut WriteBuffer,
        value: &Vec<u8>,
        _registry: &FormatterRegistry,
    ) -> Result<usize, Error> {
        Ok(encode::write_bin(target, value))
    }

    fn deserialize(
        &self,
        bytes: &[u8],
        offset: usize,
        _registry: &FormatterRegistry,
    ) -> Result<(Vec<u8>, usize), Error> {
        Ok(decode::read_bin(bytes, offset)?)
    }
}
