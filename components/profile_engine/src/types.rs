//! Shared profiling types

use std::fmt;

/// The two independent profiling dimensions the inspector exposes.
///
/// Each kind has its own engine, its own session state, and its own
/// artifact path; nothing is coordinated across kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileKind {
    /// Time-bounded CPU sampling run.
    Cpu,
    /// Windowed heap-allocation run.
    Heap,
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileKind::Cpu => write!(f, "cpu"),
            ProfileKind::Heap => write!(f, "heap"),
        }
    }
}

/// Point-in-time view of the allocation counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeapSnapshot {
    /// Blocks currently live (allocated and not yet freed).
    pub live_blocks: u64,
    /// Bytes currently live.
    pub live_bytes: u64,
    /// High-water mark of live bytes since process start.
    pub peak_bytes: u64,
    /// Cumulative bytes handed out by the allocator.
    pub total_allocated_bytes: u64,
    /// Cumulative bytes returned to the allocator.
    pub total_freed_bytes: u64,
    /// Cumulative number of allocations.
    pub total_allocations: u64,
}

/// Allocation-size histogram over power-of-two size classes.
///
/// Bucket `i` counts allocations whose size fell in `(2^(i-1), 2^i]`;
/// bucket 0 counts zero and one byte allocations. Counts are cumulative
/// since process start.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeapHistogram {
    /// Blocks currently live.
    pub blocks: u64,
    /// Bytes currently live.
    pub total_bytes: u64,
    /// Per-size-class allocation counts.
    pub buckets: Vec<u64>,
}
