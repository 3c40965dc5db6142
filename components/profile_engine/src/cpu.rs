//! Sampling CPU engine backed by pprof

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use pprof::protos::Message;
use pprof::{ProfilerGuard, ProfilerGuardBuilder};
use tracing::debug;

use crate::engine::{EngineError, ProfileEngine};

/// Default sampling frequency. 99 Hz rather than 100 to avoid lock-step
/// with other periodic timers.
const DEFAULT_FREQUENCY_HZ: i32 = 99;

/// CPU profiling engine.
///
/// `start` installs a sampling guard; `stop` builds the report, encodes it
/// as a pprof protobuf, and writes it to the artifact path supplied at
/// construction.
pub struct CpuEngine {
    artifact_path: PathBuf,
    frequency: i32,
    guard: Mutex<Option<ProfilerGuard<'static>>>,
}

impl CpuEngine {
    /// Create an engine writing its artifact to `artifact_path`.
    pub fn new(artifact_path: impl Into<PathBuf>) -> Self {
        Self {
            artifact_path: artifact_path.into(),
            frequency: DEFAULT_FREQUENCY_HZ,
            guard: Mutex::new(None),
        }
    }

    /// Override the sampling frequency in Hz.
    pub fn with_frequency(mut self, frequency: i32) -> Self {
        self.frequency = frequency;
        self
    }

    /// Path the artifact is written to on `stop`.
    pub fn artifact_path(&self) -> &Path {
        &self.artifact_path
    }
}

impl ProfileEngine for CpuEngine {
    fn start(&self) -> Result<(), EngineError> {
        let mut guard = self.guard.lock();
        if guard.is_some() {
            return Err(EngineError::RunActive);
        }

        debug!(frequency = self.frequency, "starting CPU sampling run");
        let built = ProfilerGuardBuilder::default()
            .frequency(self.frequency)
            // Keep the profiler out of its own stack-walking machinery.
            .blocklist(&["libc", "libgcc", "pthread", "vdso"])
            .build()?;
        *guard = Some(built);
        Ok(())
    }

    fn flush(&self) {
        // Samples live in memory until the report is built on stop.
    }

    fn stop(&self) -> Result<(), EngineError> {
        let guard = self.guard.lock().take().ok_or(EngineError::RunNotActive)?;

        let report = guard.report().build()?;
        let profile = report.pprof()?;
        let mut bytes = Vec::new();
        profile
            .encode(&mut bytes)
            .map_err(|error| EngineError::Report(error.to_string()))?;
        drop(guard);

        debug!(
            bytes = bytes.len(),
            path = %self.artifact_path.display(),
            "writing CPU profile artifact"
        );
        fs::write(&self.artifact_path, &bytes)?;
        Ok(())
    }

    fn read_artifact(&self) -> Result<Vec<u8>, EngineError> {
        Ok(fs::read(&self.artifact_path)?)
    }
}
