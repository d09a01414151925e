//! Multi-dimensional arrays
//!
//! The wire envelope is `[dim_0, …, dim_{k-1}, flat_element_array]` and
//! the flat sequence is row-major: the last dimension varies fastest.
//! Producer and consumer must agree on that ordering exactly, so
//! [`MultiArray`] stores its elements in row-major flat order and the
//! formatter never reorders.

use std::marker::PhantomData;
use std::sync::Arc;

use packforge_buffer::WriteBuffer;
use packforge_codec::{decode, encode};
use packforge_core::{DecodeError, Error};

use crate::formatter::{Formatter, WireType};
use crate::registry::FormatterRegistry;

/// Cap on speculative pre-allocation from untrusted count headers
const PREALLOC_CAP: usize = 4096;

/// A `K`-dimensional array over row-major flat storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiArray<T, const K: usize> {
    dims: [usize; K],
    data: Vec<T>,
}

/// Two-dimensional array
pub type Array2<T> = MultiArray<T, 2>;
/// Three-dimensional array
pub type Array3<T> = MultiArray<T, 3>;
/// Four-dimensional array
pub type Array4<T> = MultiArray<T, 4>;

impl<T, const K: usize> MultiArray<T, K> {
    /// Build from dimension sizes and row-major flat data.
    ///
    /// # Panics
    ///
    /// Panics when `data.len()` differs from the product of `dims`.
    pub fn from_parts(dims: [usize; K], data: Vec<T>) -> Self {
        let expected: usize = dims.iter().product();
        assert_eq!(
            expected,
            data.len(),
            "flat data length must equal the product of the dimensions"
        );
        MultiArray { dims, data }
    }

    /// Dimension sizes
    pub fn dims(&self) -> [usize; K] {
        self.dims
    }

    /// Total element count
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the array holds no elements
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Element at a multi-dimensional index, row-major
    pub fn get(&self, index: [usize; K]) -> Option<&T> {
        let mut flat = 0usize;
        for d in 0..K {
            if index[d] >= self.dims[d] {
                return None;
            }
            flat = flat * self.dims[d] + index[d];
        }
        self.data.get(flat)
    }

    /// The row-major flat storage
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }
}

/// Formatter for [`MultiArray`], any element type and rank
#[derive(Debug)]
pub struct MultiDimFormatter<T, const K: usize>(PhantomData<fn() -> T>);

impl<T, const K: usize> Default for MultiDimFormatter<T, K> {
    fn default() -> Self {
        MultiDimFormatter(PhantomData)
    }
}

impl<T: WireType, const K: usize> Formatter<MultiArray<T, K>> for MultiDimFormatter<T, K> {
    fn serialize(
        &self,
        target: &mut WriteBuffer,
        value: &MultiArray<T, K>,
        registry: &FormatterRegistry,
    ) -> Result<usize, Error> {
        let formatter = registry.formatter::<T>()?;
        let mut written = encode::write_array_header(target, K + 1);
        for dim in value.dims {
            written += encode::write_u64(target, dim as u64);
        }
        written += encode::write_array_header(target, value.len());
        for item in &value.data {
            written += formatter.serialize(target, item, registry)?;
        }
        Ok(written)
    }

    fn deserialize(
        &self,
        bytes: &[u8],
        offset: usize,
        registry: &FormatterRegistry,
    ) -> Result<(MultiArray<T, K>, usize), Error> {
        let formatter = registry.formatter::<T>()?;
        let start = offset;

        let (count, consumed) = decode::read_array_header(bytes, offset)?;
        let mut offset = offset + consumed;
        if count != K + 1 {
            return Err(DecodeError::ArityMismatch {
                expected: K + 1,
                actual: count,
            }
            .into());
        }

        let mut dims = [0usize; K];
        for dim in dims.iter_mut() {
            let (value, consumed) = decode::read_u64(bytes, offset)?;
            offset += consumed;
            *dim = usize::try_from(value)
                .map_err(|_| DecodeError::OutOfRange { target: "usize" })?;
        }

        let expected = dims
            .iter()
            .try_fold(1usize, |product, &dim| product.checked_mul(dim))
            .ok_or(DecodeError::OutOfRange { target: "usize" })?;

        let (flat_count, consumed) = decode::read_array_header(bytes, offset)?;
        offset += consumed;
        if flat_count != expected {
            return Err(DecodeError::ArityMismatch {
                expected,
                actual: flat_count,
            }
            .into());
        }

        let mut data = Vec::with_capacity(flat_count.min(PREALLOC_CAP));
        for _ in 0..flat_count {
            let (value, consumed) = formatter.deserialize(bytes, offset, registry)?;
            data.push(value);
            offset += consumed;
        }
        Ok((MultiArray { dims, data }, offset - start))
    }
}

impl<T: WireType, const K: usize> WireType for MultiArray<T, K> {
    fn formatter() -> Arc<dyn Formatter<Self>> {
        Arc::new(MultiDimFormatter::<T, K>::default())
    }
}
