//! In-process profiling diagnostics over HTTP
//!
//! `pprof-inspect` embeds a small diagnostics endpoint set into a running
//! server. Operators trigger time-bounded CPU and heap profiling runs and
//! fetch the artifacts over HTTP, without restarting the process;
//! concurrent requests for the same profile share a single underlying run.
//!
//! # Example
//!
//! ```no_run
//! use pprof_inspect::{Inspector, InspectorConfig};
//!
//! #[tokio::main]
//! async fn main() -> pprof_inspect::Result<()> {
//!     let inspector = Inspector::new(InspectorConfig::new(9280))?;
//!     inspector.start().await?;
//!
//!     // The embedding server keeps running; profiles are fetched with
//!     // e.g. `pprof http://localhost:9280/pprof/profile?seconds=30`.
//!     Ok(())
//! }
//! ```
//!
//! To feed the heap endpoints, install the tracking allocator in the host
//! binary:
//!
//! ```ignore
//! #[global_allocator]
//! static ALLOC: pprof_inspect::StatsAllocator = pprof_inspect::StatsAllocator::new();
//! ```

#![warn(missing_docs)]

pub use inspector_component::{
    Inspector, InspectorConfig, InspectorError, Result, ServerConfig, StatsAllocator,
    HEAP_SAMPLE_ENV,
};
