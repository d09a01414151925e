//! Tuple formatters, arities 1 through 8
//!
//! A tuple is a fixed-shape array: the element count header must match the
//! arity exactly on decode, anything else is a hard failure.

use std::marker::PhantomData;
use std::sync::Arc;

use packforge_buffer::WriteBuffer;
use packforge_codec::{decode, encode};
use packforge_core::{DecodeError, Error};

use crate::formatter::{Formatter, WireType};
use crate::registry::FormatterRegistry;

macro_rules! tuple_formatter {
    ($name:ident, $arity:expr, $($ty:ident : $var:ident => $idx:tt),+) => {
        #[doc = concat!("Formatter for ", stringify!($arity), "-tuples")]
        pub struct $name<$($ty),+>(PhantomData<fn() -> ($($ty,)+)>);

        impl<$($ty),+> Default for $name<$($ty),+> {
            fn default() -> Self {
                $name(PhantomData)
            }
        }

        impl<$($ty: WireType),+> Formatter<($($ty,)+)> for $name<$($ty),+> {
            fn serialize(
                &self,
                target: &mut WriteBuffer,
                value: &($($ty,)+),
                registry: &FormatterRegistry,
            ) -> Result<usize, Error> {
                let mut written = encode::write_array_header(target, $arity);
                $(
                    written += registry
                        .formatter::<$ty>()?
                        .serialize(target, &value.$idx, registry)?;
                )+
                Ok(written)
            }

            fn deserialize(
                &self,
                bytes: &[u8],
                offset: usize,
                registry: &FormatterRegistry,
            ) -> Result<(($($ty,)+), usize), Error> {
                let start = offset;
                let (count, consumed) = decode::read_array_header(bytes, offset)?;
                if count != $arity {
                    return Err(DecodeError::ArityMismatch {
                        expected: $arity,
                        actual: count,
                    }
                    .into());
                }
                let mut offset = offset + consumed;
                $(
                    let ($var, consumed) = registry
                        .formatter::<$ty>()?
                        .deserialize(bytes, offset, registry)?;
                    offset += consumed;
                )+
                Ok((($($var,)+), offset - start))
            }
        }

        impl<$($ty: WireType),+> WireType for ($($ty,)+) {
            fn formatter() -> Arc<dyn Formatter<Self>> {
                Arc::new($name::<$($ty),+>::default())
            }
        }
    };
}

tuple_formatter!(Tuple1Formatter, 1, T1: v1 => 0);
tuple_formatter!(Tuple2Formatter, 2, T1: v1 => 0, T2: v2 => 1);
tuple_formatter!(Tuple3Formatter, 3, T1: v1 => 0, T2: v2 => 1, T3: v3 => 2);
tuple_formatter!(Tuple4Formatter, 4, T1: v1 => 0, T2: v2 => 1, T3: v3 => 2, T4: v4 => 3);
tuple_formatter!(Tuple5Formatter, 5, T1: v1 => 0, T2: v2 => 1, T3: v3 => 2, T4: v4 => 3, T5: v5 => 4);
tuple_formatter!(Tuple6Formatter, 6, T1: v1 => 0, T2: v2 => 1, T3: v3 => 2, T4: v4 => 3, T5: v5 => 4, T6: v6 => 5);
tuple_formatter!(Tuple7Formatter, 7, T1: v1 => 0, T2: v2 => 1, T3: v3 => 2, T4: v4 => 3, T5: v5 => 4, T6: v6 => 5, T7: v7 => 6);
tuple_formatter!(Tuple8Formatter, 8, T1: v1 => 0, T2: v2 => 1, T3: v3 => 2, T4: v4 => 3, T5: v5 => 4, T6: v6 => 5, T7: v7 => 6, T8: v8 => 7);

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
    fn test_tuple_roundtrips() {
        roundtrip((42i32,));
        roundtrip((1u8, "two".to_string()));
        roundtrip((true, -5i64, 2.5f64));
        roundtrip((1i32, 2i32, 3i32, 4i32, 5i32, 6i32, 7i32, 8i32));
        roundtrip((Some(1i32), None::<String>, vec![1u16, 2]));
    }

    #[test]
    fn test_tuple_wire_shape() {
        let bytes = roundtrip((1i32, 2i32));
        assert_eq!(bytes, vec![0x92, 1, 2]);
    }

    #[test]
    fn test_wrong_arity_is_hard_failure() {
        let registry = FormatterRegistry::standard();
        // A 3-element array decoded by the 2-tuple formatter.
        let formatter = registry.formatter::<(i32, i32)>().unwrap();
        let err = formatter
            .deserialize(&[0x93, 1, 2, 3], 0, &registry)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Decode(DecodeError::ArityMismatch {
                expected: 2,
                actual: 3
            })
        ));
    }
}
