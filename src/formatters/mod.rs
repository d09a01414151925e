//! Built-in formatters
//!
//! Scalars, strings, binary payloads, nullable wrapping, collections,
//! tuples, multi-dimensional arrays, forced fixed-width integers,
//! enum-as-string, the ignore formatter, and timestamps. Each composite
//! formatter re-resolves its element formatters through the registry per
//! call, so overrides and recursive type graphs behave uniformly.

pub mod collections;
pub mod enums;
pub mod forced;
pub mod ignore;
pub mod multidim;
pub mod option;
pub mod primitives;
pub mod timestamp;
pub mod tuple;

pub use collections::{HashMapFormatter, VecFormatter};
pub use enums::{EnumAsStringFormatter, NamedEnum};
pub use forced::{
    forced_integer_layer, ForceI16Formatter, ForceI32Formatter, ForceI64Formatter,
    ForceI8Formatter, ForceU16Formatter, ForceU32Formatter, ForceU64Formatter, ForceU8Formatter,
};
pub use ignore::IgnoreFormatter;
pub use multidim::{Array2, Array3, Array4, MultiArray, MultiDimFormatter};
pub use option::OptionFormatter;
pub use primitives::{Bin, BinFormatter, RawBytesFormatter, StringFormatter};
pub use timestamp::TimestampFormatter;
pub use tuple::{
    Tuple1Formatter, Tuple2Formatter, Tuple3Formatter, Tuple4Formatter, Tuple5Formatter,
    Tuple6Formatter, Tuple7Formatter, Tuple8Formatter,
};
