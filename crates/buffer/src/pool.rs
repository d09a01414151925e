//! Size-tiered segment pool
//!
//! Segments are reused through power-of-two buckets split across two tiers:
//! small (up to 64 KiB) and large (up to 32 MiB). Requests above the large
//! ceiling are served by one-off allocations that are never pooled. Renting
//! never blocks on allocation and never fails.

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use packforge_core::limits::{LARGE_SEGMENT_CEILING, SMALL_SEGMENT_CEILING};

/// Smallest bucket capacity; tiny rent requests are rounded up to this
const MIN_BUCKET_SIZE: usize = 1024;

/// Retained segments per small-tier bucket
const SMALL_BUCKET_RETAIN: usize = 64;

/// Retained segments per large-tier bucket
const LARGE_BUCKET_RETAIN: usize = 8;

/// A pooled byte segment with fixed capacity.
///
/// Owned exclusively by one `WriteBuffer` while active; ownership transfers
/// back to the pool on return.
pub struct Segment {
    data: Box<[u8]>,
}

impl Segment {
    fn with_capacity(capacity: usize) -> Self {
        Segment {
            data: vec![0u8; capacity].into_boxed_slice(),
        }
    }

    /// Fixed capacity of this segment in bytes
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Read access to the full capacity
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Write access to the full capacity
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    fn zero(&mut self) {
        self.data.fill(0);
    }
}

impl std::fmt::Debug for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Segment")
            .field("capacity", &self.capacity())
            .finish()
    }
}

/// Snapshot of pool activity counters.
///
/// Counters are updated with relaxed ordering; a snapshot is internally
/// consistent enough for tests and monitoring, not for accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    /// Segments created by heap allocation (pool misses and oversize requests)
    pub fresh_allocations: u64,
    /// Rent requests served from a bucket
    pub pool_hits: u64,
    /// Segments accepted back into a bucket
    pub returned_segments: u64,
    /// Segments dropped on return (bucket full or oversize)
    pub dropped_segments: u64,
}

#[derive(Default)]
struct PoolCounters {
    fresh_allocations: AtomicU64,
    pool_hits: AtomicU64,
    returned_segments: AtomicU64,
    dropped_segments: AtomicU64,
}

/// One size tier: a run of power-of-two buckets under independent locks
struct Tier {
    buckets: Vec<Mutex<Vec<Segment>>>,
    min_capacity: usize,
    retain: usize,
}

impl Tier {
    fn new(min_capacity: usize, max_capacity: usize, retain: usize) -> Self {
        debug_assert!(min_capacity.is_power_of_two());
        debug_assert!(max_capacity.is_power_of_two());
        let bucket_count = (max_capacity / min_capacity).trailing_zeros() as usize + 1;
        Tier {
            buckets: (0..bucket_count).map(|_| Mutex::new(Vec::new())).collect(),
            min_capacity,
            retain,
        }
    }

    fn bucket_capacity(&self, min_size: usize) -> usize {
        min_size.next_power_of_two().max(self.min_capacity)
    }

    fn bucket_index(&self, capacity: usize) -> usize {
        (capacity / self.min_capacity).trailing_zeros() as usize
    }

    fn take(&self, min_size: usize) -> Option<Segment> {
        let idx = self.bucket_index(self.bucket_capacity(min_size));
        self.buckets[idx].lock().pop()
    }

    fn put(&self, segment: Segment) -> bool {
        let idx = self.bucket_index(segment.capacity());
        let mut bucket = self.buckets[idx].lock();
        if bucket.len() < self.retain {
            bucket.push(segment);
            true
        } else {
            false
        }
    }

    /// Whether `capacity` is exactly one of this tier's bucket sizes
    fn holds(&self, capacity: usize) -> bool {
        capacity.is_power_of_two()
            && capacity >= self.min_capacity
            && self.bucket_index(capacity) < self.buckets.len()
    }
}

/// Two-tier pooled segment allocator.
///
/// Safe for concurrent rent/return from independent write buffers; each
/// bucket has its own lock and counters are atomic.
pub struct SegmentPool {
    small: Tier,
    large: Tier,
    counters: PoolCounters,
}

static DEFAULT_POOL: Lazy<Arc<SegmentPool>> = Lazy::new(|| Arc::new(SegmentPool::new()));

impl SegmentPool {
    /// Create an independent pool (tests and embedding scenarios)
    pub fn new() -> Self {
        SegmentPool {
            small: Tier::new(MIN_BUCKET_SIZE, SMALL_SEGMENT_CEILING, SMALL_BUCKET_RETAIN),
            large: Tier::new(
                SMALL_SEGMENT_CEILING * 2,
                LARGE_SEGMENT_CEILING,
                LARGE_BUCKET_RETAIN,
            ),
            counters: PoolCounters::default(),
        }
    }

    /// The process-wide default pool
    pub fn shared() -> Arc<SegmentPool> {
        DEFAULT_POOL.clone()
    }

    /// Rent a segment with capacity >= `min_size`.
    ///
    /// Prefers a pooled segment; falls back to a fresh allocation when the
    /// bucket is empty or the request exceeds the large-tier ceiling.
    /// Never blocks on allocation, never fails.
    pub fn rent(&self, min_size: usize) -> Segment {
        if min_size > LARGE_SEGMENT_CEILING {
            tracing::debug!(min_size, "segment request above pool ceiling, allocating uncapped");
            self.counters
                .fresh_allocations
                .fetch_add(1, Ordering::Relaxed);
            return Segment::with_capacity(min_size);
        }

        let tier = self.tier_for(min_size);
        match tier.take(min_size) {
            Some(segment) => {
                self.counters.pool_hits.fetch_add(1, Ordering::Relaxed);
                segment
            }
            None => {
                self.counters
                    .fresh_allocations
                    .fetch_add(1, Ordering::Relaxed);
                Segment::with_capacity(tier.bucket_capacity(min_size))
            }
        }
    }

    /// Return a segment for reuse.
    ///
    /// `clear` zeroes the contents first, for segments that may have held
    /// sensitive data. Oversize segments and segments arriving at a full
    /// bucket are dropped.
    pub fn return_segment(&self, mut segment: Segment, clear: bool) {
        if clear {
            segment.zero();
        }
        let capacity = segment.capacity();
        let accepted = if self.small.holds(capacity) {
            self.small.put(segment)
        } else if self.large.holds(capacity) {
            self.large.put(segment)
        } else {
            false
        };
        if accepted {
            self.counters
                .returned_segments
                .fetch_add(1, Ordering::Relaxed);
        } else {
            self.counters
                .dropped_segments
                .fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Snapshot the activity counters
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            fresh_allocations: self.counters.fresh_allocations.load(Ordering::Relaxed),
            pool_hits: self.counters.pool_hits.load(Ordering::Relaxed),
            returned_segments: self.counters.returned_segments.load(Ordering::Relaxed),
            dropped_segments: self.counters.dropped_segments.load(Ordering::Relaxed),
        }
    }

    fn tier_for(&self, min_size: usize) -> &Tier {
        if min_size <= SMALL_SEGMENT_CEILING {
            &self.small
        } else {
            &self.large
        }
    }
}

impl Default for SegmentPool {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SegmentPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SegmentPool")
            .field("stats", &self.stats())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rent_satisfies_capacity() {
        let pool = SegmentPool::new();
        for size in [1, 100, 1024, 4097, 65536, 70000, 1 << 20] {
            let segment = pool.rent(size);
            assert!(segment.capacity() >= size, "size {size}");
        }
    }

    #[test]
    fn test_rent_reuses_returned_segment() {
        let pool = SegmentPool::new();
        let segment = pool.rent(8 * 1024);
        pool.return_segment(segment, false);

        let before = pool.stats().fresh_allocations;
        let segment = pool.rent(8 * 1024);
        assert!(segment.capacity() >= 8 * 1024);
        let after = pool.stats();
        assert_eq!(after.fresh_allocations, before);
        assert_eq!(after.pool_hits, 1);
    }

    #[test]
    fn test_repeated_rent_return_does_not_grow_allocations() {
        let pool = SegmentPool::new();
        for _ in 0..1000 {
            let segment = pool.rent(16 * 1024);
            assert!(segment.capacity() >= 16 * 1024);
            pool.return_segment(segment, false);
        }
        let stats = pool.stats();
        assert_eq!(stats.fresh_allocations, 1);
        assert_eq!(stats.pool_hits, 999);
    }

    #[test]
    fn test_return_clear_zeroes_contents() {
        let pool = SegmentPool::new();
        let mut segment = pool.rent(1024);
        segment.as_mut_slice()[..4].copy_from_slice(&[1, 2, 3, 4]);
        pool.return_segment(segment, true);

        let segment = pool.rent(1024);
        assert_eq!(&segment.as_slice()[..4], &[0, 0, 0, 0]);
    }

    #[test]
    fn test_oversize_request_is_uncapped() {
        let pool = SegmentPool::new();
        let size = LARGE_SEGMENT_CEILING + 1;
        let segment = pool.rent(size);
        assert_eq!(segment.capacity(), size);

        pool.return_segment(segment, false);
        assert_eq!(pool.stats().dropped_segments, 1);
    }

    #[test]
    fn test_bucket_retention_cap() {
        let pool = SegmentPool::new();
        let mut rented = Vec::new();
        for _ in 0..SMALL_BUCKET_RETAIN + 5 {
            rented.push(pool.rent(2048));
        }
        for segment in rented {
            pool.return_segment(segment, false);
        }
        let stats = pool.stats();
        assert_eq!(stats.returned_segments, SMALL_BUCKET_RETAIN as u64);
        assert_eq!(stats.dropped_segments, 5);
    }

    #[test]
    fn test_tier_split_at_boundary() {
        let pool = SegmentPool::new();
        let small = pool.rent(SMALL_SEGMENT_CEILING);
        assert_eq!(small.capacity(), SMALL_SEGMENT_CEILING);
        let large = pool.rent(SMALL_SEGMENT_CEILING + 1);
        assert_eq!(large.capacity(), SMALL_SEGMENT_CEILING * 2);
    }

    #[test]
    fn test_concurrent_rent_return() {
        let pool = Arc::new(SegmentPool::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let pool = pool.clone();
            handles.push(std::thread::spawn(move || {
                for _ in 0..200 {
                    let segment = pool.rent(4096);
                    assert!(segment.capacity() >= 4096);
                    pool.return_segment(segment, false);
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        let stats = pool.stats();
        assert_eq!(stats.pool_hits + stats.fresh_allocations, 8 * 200);
    }

    #[test]
    fn test_shared_pool_is_singleton() {
        let a = SegmentPool::shared();
        let b = SegmentPool::shared();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
