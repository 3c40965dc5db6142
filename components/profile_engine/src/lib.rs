//! Profiling engines and runtime heap introspection
//!
//! This module provides the profiling side of the inspector: the
//! `ProfileEngine` seam the session coordinator drives, plus the concrete
//! CPU and heap implementations and the snapshot surface the one-shot
//! endpoints read from.
//!
//! # Features
//!
//! - **CpuEngine**: sampling CPU profiler writing a pprof-protobuf artifact
//! - **HeapEngine**: windowed heap run over the allocation tracker
//! - **StatsAllocator**: opt-in `GlobalAlloc` wrapper feeding the tracker
//! - **TrackedHeapRuntime**: heap stats/growth/histogram text snapshots
//! - **BacktraceSymbolizer**: code-address to symbol-name resolution

mod alloc;
mod cpu;
mod engine;
mod heap;
mod symbolize;
mod types;

pub use alloc::{
    heap_snapshot, histogram_snapshot, set_growth_recording, StatsAllocator, HISTOGRAM_BUCKETS,
};
pub use cpu::CpuEngine;
pub use engine::{EngineError, ProfileEngine};
pub use heap::{HeapEngine, HeapRuntime, TrackedHeapRuntime};
pub use symbolize::{BacktraceSymbolizer, Symbolizer};
pub use types::{HeapHistogram, HeapSnapshot, ProfileKind};
