//! Growable write buffer over pooled segments
//!
//! Encoders obtain contiguous scratch space with `reserve`, write into it,
//! and account for it with `commit`. At most one reservation may be
//! outstanding; violating the ordering is an encoder bug and panics rather
//! than returning an error.

use smallvec::SmallVec;
use std::io::Write;
use std::sync::Arc;

use tokio::io::{AsyncWrite, AsyncWriteExt};

use packforge_core::limits::DEFAULT_SEGMENT_SIZE;
use packforge_core::Error;

use crate::pool::{Segment, SegmentPool};

/// An ordered chain of pooled segments accumulating encoded bytes.
///
/// Single-writer and non-reentrant: one logical call chain writes, flushes,
/// and disposes. Segments are returned to the pool on every exit path,
/// including drops on error paths.
pub struct WriteBuffer {
    pool: Arc<SegmentPool>,
    /// `(segment, bytes_written)` in output order; most buffers never
    /// spill past the inline capacity
    segments: SmallVec<[(Segment, usize); 4]>,
    total: usize,
    reserved: bool,
}

impl WriteBuffer {
    /// Create a buffer backed by the process-default pool
    pub fn new() -> Self {
        Self::with_pool(SegmentPool::shared())
    }

    /// Create a buffer backed by an explicit pool
    pub fn with_pool(pool: Arc<SegmentPool>) -> Self {
        WriteBuffer {
            pool,
            segments: SmallVec::new(),
            total: 0,
            reserved: false,
        }
    }

    /// Reserve exactly `n` contiguous writable bytes at the tail.
    ///
    /// Rents a new segment sized `max(n, DEFAULT_SEGMENT_SIZE)` when the
    /// current tail cannot fit `n` more bytes. The reservation must be
    /// closed with [`commit`](Self::commit) before the next `reserve`.
    ///
    /// # Panics
    ///
    /// Panics if a prior reservation is still uncommitted.
    pub fn reserve(&mut self, n: usize) -> &mut [u8] {
        if self.reserved {
            panic!("WriteBuffer::reserve called twice without an intervening commit");
        }
        let needs_segment = match self.segments.last() {
            Some((segment, used)) => segment.capacity() - used < n,
            None => true,
        };
        if needs_segment {
            let segment = self.pool.rent(n.max(DEFAULT_SEGMENT_SIZE));
            self.segments.push((segment, 0));
        }
        self.reserved = true;
        let (segment, used) = self
            .segments
            .last_mut()
            .expect("reserve ensures a tail segment");
        let start = *used;
        &mut segment.as_mut_slice()[start..start + n]
    }

    /// Advance the tail and total length by exactly `n` committed bytes.
    ///
    /// # Panics
    ///
    /// Panics without a preceding [`reserve`](Self::reserve).
    pub fn commit(&mut self, n: usize) {
        if !self.reserved {
            panic!("WriteBuffer::commit called without a preceding reserve");
        }
        let (segment, used) = self
            .segments
            .last_mut()
            .expect("an open reservation implies a tail segment");
        debug_assert!(*used + n <= segment.capacity());
        *used += n;
        self.total += n;
        self.reserved = false;
    }

    /// Reserve and immediately commit `n` bytes, returning the slice to
    /// fill. For encoders that always write exactly the reserved length.
    pub fn reserve_and_commit(&mut self, n: usize) -> &mut [u8] {
        self.reserve(n);
        self.commit(n);
        let (segment, used) = self
            .segments
            .last_mut()
            .expect("commit leaves the tail segment in place");
        let start = *used - n;
        &mut segment.as_mut_slice()[start..*used]
    }

    /// Transfer all bytes of `other` to the tail of `self`, consuming it.
    ///
    /// Head segments of `other` that fit in the caller's spare tail
    /// capacity are copied in place (and their segments returned to the
    /// pool); the remainder are linked without copying, bounding
    /// segment-list growth.
    pub fn append(&mut self, mut other: WriteBuffer) {
        debug_assert!(!self.reserved && !other.reserved);
        let source = std::mem::take(&mut other.segments);
        other.total = 0;

        let mut linking = false;
        for (segment, used) in source {
            if !linking {
                if let Some((tail, tail_used)) = self.segments.last_mut() {
                    let spare = tail.capacity() - *tail_used;
                    if used < spare {
                        tail.as_mut_slice()[*tail_used..*tail_used + used]
                            .copy_from_slice(&segment.as_slice()[..used]);
                        *tail_used += used;
                        self.total += used;
                        self.pool.return_segment(segment, false);
                        continue;
                    }
                }
                linking = true;
            }
            self.total += used;
            self.segments.push((segment, used));
        }
    }

    /// Committed byte count, O(1)
    pub fn total_bytes(&self) -> usize {
        self.total
    }

    /// Whether any bytes have been committed
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Copy all committed bytes into a fresh `Vec`, then release the
    /// segments and reset the buffer to empty.
    pub fn to_vec(&mut self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.total);
        for (segment, used) in &self.segments {
            out.extend_from_slice(&segment.as_slice()[..*used]);
        }
        self.release();
        out
    }

    /// Copy all committed bytes into `out`, then release and reset.
    ///
    /// Fails with [`Error::SinkTooSmall`] without consuming the buffer when
    /// `out` cannot hold the committed bytes.
    pub fn write_into(&mut self, out: &mut [u8]) -> Result<usize, Error> {
        if out.len() < self.total {
            return Err(Error::SinkTooSmall {
                needed: self.total,
                available: out.len(),
            });
        }
        let mut cursor = 0;
        for (segment, used) in &self.segments {
            out[cursor..cursor + used].copy_from_slice(&segment.as_slice()[..*used]);
            cursor += used;
        }
        let written = self.total;
        self.release();
        Ok(written)
    }

    /// Write all committed bytes to `writer` in segment order, then release
    /// and reset. On an I/O error the buffer is left intact; its segments
    /// still return to the pool on drop.
    pub fn flush_to_writer<W: Write>(&mut self, writer: &mut W) -> std::io::Result<usize> {
        for (segment, used) in &self.segments {
            writer.write_all(&segment.as_slice()[..*used])?;
        }
        let written = self.total;
        self.release();
        Ok(written)
    }

    /// Asynchronous variant of [`flush_to_writer`](Self::flush_to_writer);
    /// suspends only at the I/O boundary.
    pub async fn flush_to_async<W: AsyncWrite + Unpin>(
        &mut self,
        writer: &mut W,
    ) -> std::io::Result<usize> {
        for (segment, used) in &self.segments {
            writer.write_all(&segment.as_slice()[..*used]).await?;
        }
        let written = self.total;
        self.release();
        Ok(written)
    }

    fn release(&mut self) {
        for (segment, _) in std::mem::take(&mut self.segments) {
            self.pool.return_segment(segment, false);
        }
        self.total = 0;
        self.reserved = false;
    }
}

impl Default for WriteBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for WriteBuffer {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for WriteBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriteBuffer")
            .field("segments", &self.segments.len())
            .field("total_bytes", &self.total)
            .field("reserved", &self.reserved)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer() -> WriteBuffer {
        WriteBuffer::with_pool(Arc::new(SegmentPool::new()))
    }

    #[test]
    fn test_reserve_commit_accumulates() {
        let mut buf = buffer();
        let slice = buf.reserve(3);
        slice.copy_from_slice(&[1, 2, 3]);
        buf.commit(3);

        let slice = buf.reserve(2);
        slice.copy_from_slice(&[4, 5]);
        buf.commit(2);

        assert_eq!(buf.total_bytes(), 5);
        assert_eq!(buf.to_vec(), vec![1, 2, 3, 4, 5]);
        assert_eq!(buf.total_bytes(), 0);
    }

    #[test]
    fn test_reserve_and_commit_combinator() {
        let mut buf = buffer();
        buf.reserve_and_commit(4).copy_from_slice(&[9, 8, 7, 6]);
        assert_eq!(buf.total_bytes(), 4);
        assert_eq!(buf.to_vec(), vec![9, 8, 7, 6]);
    }

    #[test]
    #[should_panic(expected = "reserve called twice")]
    fn test_double_reserve_panics() {
        let mut buf = buffer();
        buf.reserve(1);
        buf.reserve(1);
    }

    #[test]
    #[should_panic(expected = "without a preceding reserve")]
    fn test_commit_without_reserve_panics() {
        let mut buf = buffer();
        buf.commit(1);
    }

    #[test]
    #[should_panic(expected = "reserve called twice")]
    fn test_double_reserve_panics_for_large_sizes() {
        let mut buf = buffer();
        buf.reserve(DEFAULT_SEGMENT_SIZE * 2);
        buf.reserve(8);
    }

    #[test]
    fn test_growth_across_segments() {
        let mut buf = buffer();
        // Fill past one default segment so a second is rented.
        let chunk = vec![0xAB; DEFAULT_SEGMENT_SIZE - 10];
        buf.reserve_and_commit(chunk.len()).copy_from_slice(&chunk);
        buf.reserve_and_commit(100).copy_from_slice(&[0xCD; 100]);

        assert_eq!(buf.total_bytes(), chunk.len() + 100);
        let out = buf.to_vec();
        assert_eq!(&out[..chunk.len()], chunk.as_slice());
        assert_eq!(&out[chunk.len()..], &[0xCD; 100]);
    }

    #[test]
    fn test_oversized_reserve_gets_dedicated_segment() {
        let mut buf = buffer();
        let big = DEFAULT_SEGMENT_SIZE * 3;
        let slice = buf.reserve(big);
        assert_eq!(slice.len(), big);
        buf.commit(big);
        assert_eq!(buf.total_bytes(), big);
    }

    #[test]
    fn test_append_copies_small_head_into_spare_capacity() {
        let mut dst = buffer();
        dst.reserve_and_commit(3).copy_from_slice(&[1, 2, 3]);

        let mut src = buffer();
        src.reserve_and_commit(2).copy_from_slice(&[4, 5]);

        dst.append(src);
        assert_eq!(dst.total_bytes(), 5);
        assert_eq!(dst.segments.len(), 1);
        assert_eq!(dst.to_vec(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_append_links_large_segments() {
        let mut dst = buffer();
        dst.reserve_and_commit(3).copy_from_slice(&[1, 2, 3]);

        let mut src = buffer();
        let big = vec![7u8; DEFAULT_SEGMENT_SIZE];
        src.reserve_and_commit(big.len()).copy_from_slice(&big);

        dst.append(src);
        assert_eq!(dst.total_bytes(), 3 + big.len());
        assert_eq!(dst.segments.len(), 2);
        let out = dst.to_vec();
        assert_eq!(&out[..3], &[1, 2, 3]);
        assert_eq!(&out[3..], big.as_slice());
    }

    #[test]
    fn test_append_into_empty_buffer() {
        let mut dst = buffer();
        let mut src = buffer();
        src.reserve_and_commit(2).copy_from_slice(&[8, 9]);
        dst.append(src);
        assert_eq!(dst.to_vec(), vec![8, 9]);
    }

    #[test]
    fn test_write_into_exact_and_too_small() {
        let mut buf = buffer();
        buf.reserve_and_commit(4).copy_from_slice(&[1, 2, 3, 4]);

        let mut small = [0u8; 2];
        let err = buf.write_into(&mut small).unwrap_err();
        assert!(matches!(
            err,
            Error::SinkTooSmall {
                needed: 4,
                available: 2
            }
        ));
        // Buffer must be intact after the failed flush.
        assert_eq!(buf.total_bytes(), 4);

        let mut out = [0u8; 4];
        assert_eq!(buf.write_into(&mut out).unwrap(), 4);
        assert_eq!(out, [1, 2, 3, 4]);
        assert_eq!(buf.total_bytes(), 0);
    }

    #[test]
    fn test_flush_to_writer() {
        let mut buf = buffer();
        buf.reserve_and_commit(3).copy_from_slice(&[5, 6, 7]);

        let mut sink = Vec::new();
        assert_eq!(buf.flush_to_writer(&mut sink).unwrap(), 3);
        assert_eq!(sink, vec![5, 6, 7]);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_drop_returns_segments_to_pool() {
        let pool = Arc::new(SegmentPool::new());
        {
            let mut buf = WriteBuffer::with_pool(pool.clone());
            buf.reserve_and_commit(16).copy_from_slice(&[0; 16]);
        }
        assert_eq!(pool.stats().returned_segments, 1);
    }
}
