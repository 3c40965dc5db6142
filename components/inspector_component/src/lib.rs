//! Embeddable diagnostics endpoint component
//!
//! This component assembles the HTTP front end, the profiling engines,
//! and the session coordinator into one `Inspector` an embedding server
//! starts alongside its own listeners. Operators then fetch CPU and heap
//! profiling artifacts from the `/pprof/*` routes without restarting the
//! process.

mod component;
mod config;
mod dispatch;
mod error;

pub use component::Inspector;
pub use config::{InspectorConfig, HEAP_SAMPLE_ENV};
pub use error::{InspectorError, Result};

// Re-export the pieces an embedding host reaches for directly.
pub use inspect_http::ServerConfig;
pub use profile_engine::StatsAllocator;
