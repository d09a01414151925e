//! Size limits shared across the engine

/// Boundary between the small and large segment pool tiers (64 KiB)
pub const SMALL_SEGMENT_CEILING: usize = 64 * 1024;

/// Hard ceiling of the large pool tier (32 MiB); bigger requests are
/// served by uncapped one-off allocations and never pooled
pub const LARGE_SEGMENT_CEILING: usize = 32 * 1024 * 1024;

/// Default capacity of a freshly rented write-buffer segment
pub const DEFAULT_SEGMENT_SIZE: usize = 64 * 1024;

/// Maximum container nesting accepted by `skip_value` and the strict
/// stream reader
pub const MAX_SKIP_DEPTH: usize = 512;
