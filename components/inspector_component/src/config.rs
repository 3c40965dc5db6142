//! Inspector configuration

use std::path::PathBuf;

use inspect_http::ServerConfig;
use serde::{Deserialize, Serialize};

/// Environment variable that switches the heap endpoint to immediate
/// single-sample mode.
pub const HEAP_SAMPLE_ENV: &str = "PPROF_HEAP_SAMPLE";

/// Configuration for the inspector component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectorConfig {
    /// HTTP front-end configuration
    pub server: ServerConfig,

    /// Path the CPU profile artifact is written to
    pub cpu_artifact_path: PathBuf,

    /// Path the heap report artifact is written to
    pub heap_artifact_path: PathBuf,

    /// Heap endpoint mode override. `None` consults the
    /// `PPROF_HEAP_SAMPLE` environment variable at construction.
    pub heap_sample_mode: Option<bool>,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            cpu_artifact_path: PathBuf::from("profile.dat"),
            heap_artifact_path: PathBuf::from("/tmp/heap-profile.dat"),
            heap_sample_mode: None,
        }
    }
}

impl InspectorConfig {
    /// Create a configuration binding the given port.
    pub fn new(port: u16) -> Self {
        Self {
            server: ServerConfig::new(port),
            ..Default::default()
        }
    }

    /// Replace the HTTP front-end configuration.
    pub fn with_server(mut self, server: ServerConfig) -> Self {
        self.server = server;
        self
    }

    /// Set the CPU artifact path.
    pub fn with_cpu_artifact_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cpu_artifact_path = path.into();
        self
    }

    /// Set the heap artifact path.
    pub fn with_heap_artifact_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.heap_artifact_path = path.into();
        self
    }

    /// Force the heap endpoint mode instead of consulting the
    /// environment.
    pub fn with_heap_sample_mode(mut self, sample_mode: bool) -> Self {
        self.heap_sample_mode = Some(sample_mode);
        self
    }

    /// Resolve the effective heap endpoint mode.
    pub(crate) fn resolve_heap_sample_mode(&self) -> bool {
        self.heap_sample_mode
            .unwrap_or_else(|| std::env::var_os(HEAP_SAMPLE_ENV).is_some())
    }
}
