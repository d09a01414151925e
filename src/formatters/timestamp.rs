//! `SystemTime` through the standard timestamp extension (type -1)

use std::sync::Arc;
use std::time::SystemTime;

use packforge_buffer::WriteBuffer;
use packforge_codec::{decode, encode};
use packforge_core::Error;

use crate::formatter::{Formatter, WireType};
use crate::registry::FormatterRegistry;

/// Formatter encoding `SystemTime` as the 32-, 64-, or 96-bit timestamp
/// extension, whichever is the narrowest that holds the instant
#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampFormatter;

impl Formatter<SystemTime> for TimestampFormatter {
    fn serialize(
        &self,
        target: &mut WriteBuffer,
        value: &SystemTime,
        _registry: &FormatterRegistry,
    ) -> Result<usize, Error> {
        Ok(encode::write_timestamp(target, *value))
    }

    fn deserialize(
        &self,
        bytes: &[u8],
        offset: usize,
        _registry: &FormatterRegistry,
    ) -> Result<(SystemTime, usize), Error> {
        Ok(decode::read_timestamp(bytes, offset)?)
    }
}

impl WireType for SystemTime {
    fn formatter() -> Arc<dyn Formatter<Self>> {
        Arc::new(TimestampFormatter)
    }
}
