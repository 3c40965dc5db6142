//! Allocation tracking via a wrapper allocator
//!
//! `StatsAllocator` wraps the system allocator and maintains process-global
//! counters: live blocks/bytes, peak bytes, cumulative totals, and a
//! power-of-two size-class histogram. When growth recording is enabled it
//! also captures a backtrace each time the live-bytes peak grows past a
//! stride, feeding the growth-stacks endpoint.
//!
//! The host opts in by installing it as the global allocator:
//!
//! ```ignore
//! #[global_allocator]
//! static ALLOC: profile_engine::StatsAllocator = profile_engine::StatsAllocator::new();
//! ```
//!
//! Without the installation every counter stays at zero and the heap
//! endpoints report an empty process, which is still well-formed output.

use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use backtrace::Backtrace;

use crate::types::{HeapHistogram, HeapSnapshot};

/// Number of power-of-two size classes tracked by the histogram.
pub const HISTOGRAM_BUCKETS: usize = 48;

/// New growth backtraces are recorded each time the live-bytes peak moves
/// past this stride.
const GROWTH_STRIDE_BYTES: u64 = 1 << 20;

/// Upper bound on retained growth sites.
const MAX_GROWTH_SITES: usize = 128;

static LIVE_BLOCKS: AtomicU64 = AtomicU64::new(0);
static LIVE_BYTES: AtomicU64 = AtomicU64::new(0);
static PEAK_BYTES: AtomicU64 = AtomicU64::new(0);
static TOTAL_ALLOCATED: AtomicU64 = AtomicU64::new(0);
static TOTAL_FREED: AtomicU64 = AtomicU64::new(0);
static TOTAL_ALLOCATIONS: AtomicU64 = AtomicU64::new(0);

#[allow(clippy::declare_interior_mutable_const)]
const BUCKET_ZERO: AtomicU64 = AtomicU64::new(0);
static HISTOGRAM: [AtomicU64; HISTOGRAM_BUCKETS] = [BUCKET_ZERO; HISTOGRAM_BUCKETS];

static GROWTH_RECORDING: AtomicBool = AtomicBool::new(true);
static LAST_RECORDED_PEAK: AtomicU64 = AtomicU64::new(0);
static GROWTH_SITES: Mutex<Vec<GrowthSite>> = Mutex::new(Vec::new());

thread_local! {
    // Guards against the recorder's own allocations re-entering it.
    static IN_RECORDER: Cell<bool> = const { Cell::new(false) };
}

#[derive(Clone)]
struct GrowthSite {
    live_bytes: u64,
    stack: Backtrace,
}

/// Wrapper over the system allocator that feeds the heap counters.
#[derive(Debug, Default)]
pub struct StatsAllocator;

impl StatsAllocator {
    /// Create the allocator; usable in a `#[global_allocator]` static.
    pub const fn new() -> Self {
        Self
    }
}

unsafe impl GlobalAlloc for StatsAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = System.alloc(layout);
        if !ptr.is_null() {
            record_alloc(layout.size() as u64);
        }
        ptr
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        let ptr = System.alloc_zeroed(layout);
        if !ptr.is_null() {
            record_alloc(layout.size() as u64);
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout);
        record_dealloc(layout.size() as u64);
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let new_ptr = System.realloc(ptr, layout, new_size);
        if !new_ptr.is_null() {
            record_dealloc(layout.size() as u64);
            record_alloc(new_size as u64);
        }
        new_ptr
    }
}

fn record_alloc(size: u64) {
    LIVE_BLOCKS.fetch_add(1, Ordering::Relaxed);
    TOTAL_ALLOCATED.fetch_add(size, Ordering::Relaxed);
    TOTAL_ALLOCATIONS.fetch_add(1, Ordering::Relaxed);
    HISTOGRAM[size_class(size)].fetch_add(1, Ordering::Relaxed);

    let live = LIVE_BYTES.fetch_add(size, Ordering::Relaxed) + size;
    let mut peak = PEAK_BYTES.load(Ordering::Relaxed);
    while live > peak {
        match PEAK_BYTES.compare_exchange_weak(peak, live, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => {
                maybe_record_growth(live);
                break;
            }
            Err(current) => peak = current,
        }
    }
}

fn record_dealloc(size: u64) {
    LIVE_BLOCKS.fetch_sub(1, Ordering::Relaxed);
    LIVE_BYTES.fetch_sub(size, Ordering::Relaxed);
    TOTAL_FREED.fetch_add(size, Ordering::Relaxed);
}

/// Size class for the histogram: bucket `i` covers `(2^(i-1), 2^i]`.
fn size_class(size: u64) -> usize {
    if size <= 1 {
        return 0;
    }
    let class = 64 - (size - 1).leading_zeros() as usize;
    class.min(HISTOGRAM_BUCKETS - 1)
}

fn maybe_record_growth(live: u64) {
    if !GROWTH_RECORDING.load(Ordering::Relaxed) {
        return;
    }
    let last = LAST_RECORDED_PEAK.load(Ordering::Relaxed);
    if live < last.saturating_add(GROWTH_STRIDE_BYTES) {
        return;
    }
    if LAST_RECORDED_PEAK
        .compare_exchange(last, live, Ordering::Relaxed, Ordering::Relaxed)
        .is_err()
    {
        return;
    }

    IN_RECORDER.with(|flag| {
        if flag.get() {
            return;
        }
        flag.set(true);
        // Capturing the backtrace allocates; the flag keeps those
        // allocations from re-entering the recorder. A contended lock
        // means another thread is recording, so this site is skipped.
        let stack = Backtrace::new_unresolved();
        if let Ok(mut sites) = GROWTH_SITES.try_lock() {
            if sites.len() < MAX_GROWTH_SITES {
                sites.push(GrowthSite {
                    live_bytes: live,
                    stack,
                });
            }
        }
        flag.set(false);
    });
}

/// Enable or disable growth-site backtrace recording. Counters are always
/// maintained; only the backtrace capture is gated.
pub fn set_growth_recording(enabled: bool) {
    GROWTH_RECORDING.store(enabled, Ordering::Relaxed);
}

/// Snapshot the allocation counters.
pub fn heap_snapshot() -> HeapSnapshot {
    HeapSnapshot {
        live_blocks: LIVE_BLOCKS.load(Ordering::Relaxed),
        live_bytes: LIVE_BYTES.load(Ordering::Relaxed),
        peak_bytes: PEAK_BYTES.load(Ordering::Relaxed),
        total_allocated_bytes: TOTAL_ALLOCATED.load(Ordering::Relaxed),
        total_freed_bytes: TOTAL_FREED.load(Ordering::Relaxed),
        total_allocations: TOTAL_ALLOCATIONS.load(Ordering::Relaxed),
    }
}

/// Snapshot the size-class histogram together with the live totals.
pub fn histogram_snapshot() -> HeapHistogram {
    HeapHistogram {
        blocks: LIVE_BLOCKS.load(Ordering::Relaxed),
        total_bytes: LIVE_BYTES.load(Ordering::Relaxed),
        buckets: HISTOGRAM
            .iter()
            .map(|bucket| bucket.load(Ordering::Relaxed))
            .collect(),
    }
}

/// Render the recorded growth sites with resolved symbol names.
pub(crate) fn growth_sites_report() -> String {
    let mut sites: Vec<GrowthSite> = match GROWTH_SITES.lock() {
        Ok(sites) => sites.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    };

    let mut report = format!("heap growth stacks: {} sites\n", sites.len());
    for site in &mut sites {
        site.stack.resolve();
        report.push_str(&format!("\nlive {} bytes at:\n", site.live_bytes));
        for frame in site.stack.frames() {
            for symbol in frame.symbols() {
                match symbol.name() {
                    Some(name) => report.push_str(&format!("  {}\n", name)),
                    None => report.push_str("  <unresolved>\n"),
                }
            }
        }
    }
    report
}
