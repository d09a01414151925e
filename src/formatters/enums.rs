//! Enum-as-string serialization
//!
//! Serializes an enum through its declared member name rather than its
//! numeric value, so the wire stays readable and reorder-tolerant. Values
//! with no declared name (bit-flag combinations, mostly) fall back to the
//! decimal rendering of their underlying bits: a pinned format, identical
//! across runs and runtime versions, and reversible through `from_bits`.

use std::collections::HashMap;
use std::hash::Hash;

use packforge_buffer::WriteBuffer;
use packforge_codec::{decode, encode};
use packforge_core::{DecodeError, Error};

use crate::formatter::Formatter;
use crate::registry::FormatterRegistry;

/// Static reflection surface for enums serialized by name.
///
/// `MEMBERS` enumerates the declared members once, at type-definition
/// time; `bits`/`from_bits` carry the fallback path for values outside the
/// declared set.
pub trait NamedEnum: Copy + Eq + Hash + Send + Sync + 'static {
    /// Declared `(name, value)` pairs in declaration order
    const MEMBERS: &'static [(&'static str, Self)];

    /// The value's underlying bits
    fn bits(&self) -> u64;

    /// Rebuild a value from bits; `None` when the bits are not
    /// representable
    fn from_bits(bits: u64) -> Option<Self>;
}

/// Formatter writing enum values as their declared names.
///
/// The bidirectional name table is built once at construction; the
/// formatter holds no other state.
pub struct EnumAsStringFormatter<T: NamedEnum> {
    name_to_value: HashMap<&'static str, T>,
    value_to_name: HashMap<T, &'static str>,
}

impl<T: NamedEnum> EnumAsStringFormatter<T> {
    /// Build the name tables from the declared members.
    ///
    /// When several members share a value (aliases), the first declared
    /// name is the one written.
    pub fn new() -> Self {
        let mut name_to_value = HashMap::with_capacity(T::MEMBERS.len());
        let mut value_to_name = HashMap::with_capacity(T::MEMBERS.len());
        for &(name, value) in T::MEMBERS {
            name_to_value.insert(name, value);
            value_to_name.entry(value).or_insert(name);
        }
        EnumAsStringFormatter {
            name_to_value,
            value_to_name,
        }
    }
}

impl<T: NamedEnum> Default for EnumAsStringFormatter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: NamedEnum> Formatter<T> for EnumAsStringFormatter<T> {
    fn serialize(
        &self,
        target: &mut WriteBuffer,
        value: &T,
        _registry: &FormatterRegistry,
    ) -> Result<usize, Error> {
        match self.value_to_name.get(value) {
            Some(name) => Ok(encode::write_str(target, name)),
            None => Ok(encode::write_str(target, &value.bits().to_string())),
        }
    }

    fn deserialize(
        &self,
        bytes: &[u8],
        offset: usize,
        _registry: &FormatterRegistry,
    ) -> Result<(T, usize), Error> {
        let (name, consumed) = decode::read_str_slice(bytes, offset)?;
        if let Some(&value) = self.name_to_value.get(name) {
            return Ok((value, consumed));
        }
        match name.parse::<u64>().ok().and_then(T::from_bits) {
            Some(value) => Ok((value, consumed)),
            None => Err(DecodeError::UnknownEnumName(name.to_owned()).into()),
        }
    }
}
