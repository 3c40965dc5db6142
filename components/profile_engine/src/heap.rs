//! Heap engine and runtime heap snapshots
//!
//! The heap engine runs a windowed allocation-tracking session: a baseline
//! snapshot at start, a text report of the delta (plus growth sites and the
//! size-class histogram) written to the artifact path at stop.
//! `TrackedHeapRuntime` serves the synchronous snapshot endpoints from the
//! same counters.

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::debug;

use crate::alloc::{growth_sites_report, heap_snapshot, histogram_snapshot, set_growth_recording};
use crate::engine::{EngineError, ProfileEngine};
use crate::types::{HeapHistogram, HeapSnapshot};

/// Text snapshots of the process heap for the one-shot endpoints.
pub trait HeapRuntime: Send + Sync {
    /// Fixed-layout stats block.
    fn stats_text(&self) -> String;

    /// Growth-stacks report.
    fn growth_text(&self) -> String;

    /// Size-class histogram with live totals.
    fn histogram(&self) -> HeapHistogram;

    /// Immediate point-in-time heap sample.
    fn sample_text(&self) -> String;
}

/// Heap engine over the allocation tracker.
pub struct HeapEngine {
    artifact_path: PathBuf,
    baseline: Mutex<Option<HeapSnapshot>>,
}

impl HeapEngine {
    /// Create an engine writing its report to `artifact_path`.
    pub fn new(artifact_path: impl Into<PathBuf>) -> Self {
        Self {
            artifact_path: artifact_path.into(),
            baseline: Mutex::new(None),
        }
    }

    /// Path the report is written to on `stop`.
    pub fn artifact_path(&self) -> &Path {
        &self.artifact_path
    }

    fn render_report(baseline: HeapSnapshot, current: HeapSnapshot) -> String {
        let mut report = String::new();
        report.push_str("heap profile\n");
        report.push_str(&format!(
            "allocated during window: {} bytes in {} allocations\n",
            current
                .total_allocated_bytes
                .saturating_sub(baseline.total_allocated_bytes),
            current
                .total_allocations
                .saturating_sub(baseline.total_allocations),
        ));
        report.push_str(&format!(
            "freed during window:     {} bytes\n",
            current
                .total_freed_bytes
                .saturating_sub(baseline.total_freed_bytes),
        ));
        report.push_str(&format!(
            "live at completion:      {} bytes in {} blocks (peak {} bytes)\n",
            current.live_bytes, current.live_blocks, current.peak_bytes,
        ));
        report.push('\n');
        report.push_str(&growth_sites_report());
        report.push('\n');

        let histogram = histogram_snapshot();
        report.push_str("allocation size classes (cumulative)\n");
        for (bucket, count) in histogram.buckets.iter().enumerate() {
            if *count > 0 {
                report.push_str(&format!("  class {:2}: {}\n", bucket, count));
            }
        }
        report
    }
}

impl ProfileEngine for HeapEngine {
    fn start(&self) -> Result<(), EngineError> {
        let mut baseline = self.baseline.lock();
        if baseline.is_some() {
            return Err(EngineError::RunActive);
        }

        debug!("starting heap tracking run");
        set_growth_recording(true);
        *baseline = Some(heap_snapshot());
        Ok(())
    }

    fn flush(&self) {
        // The tracker's counters are always current.
    }

    fn stop(&self) -> Result<(), EngineError> {
        let baseline = self
            .baseline
            .lock()
            .take()
            .ok_or(EngineError::RunNotActive)?;

        let report = Self::render_report(baseline, heap_snapshot());
        debug!(
            bytes = report.len(),
            path = %self.artifact_path.display(),
            "writing heap report artifact"
        );
        fs::write(&self.artifact_path, report.as_bytes())?;
        Ok(())
    }

    fn read_artifact(&self) -> Result<Vec<u8>, EngineError> {
        Ok(fs::read(&self.artifact_path)?)
    }
}

/// `HeapRuntime` over the global allocation counters.
#[derive(Debug, Default)]
pub struct TrackedHeapRuntime;

impl TrackedHeapRuntime {
    /// Create the runtime view.
    pub fn new() -> Self {
        Self
    }
}

impl HeapRuntime for TrackedHeapRuntime {
    fn stats_text(&self) -> String {
        let snapshot = heap_snapshot();
        format!(
            "heap statistics\n\
             live blocks:     {:>20}\n\
             live bytes:      {:>20}\n\
             peak bytes:      {:>20}\n\
             total allocated: {:>20}\n\
             total freed:     {:>20}\n\
             allocations:     {:>20}\n",
            snapshot.live_blocks,
            snapshot.live_bytes,
            snapshot.peak_bytes,
            snapshot.total_allocated_bytes,
            snapshot.total_freed_bytes,
            snapshot.total_allocations,
        )
    }

    fn growth_text(&self) -> String {
        growth_sites_report()
    }

    fn histogram(&self) -> HeapHistogram {
        histogram_snapshot()
    }

    fn sample_text(&self) -> String {
        let snapshot = heap_snapshot();
        let mut sample = format!(
            "heap sample: {} live bytes in {} blocks\n\n",
            snapshot.live_bytes, snapshot.live_blocks,
        );
        sample.push_str(&growth_sites_report());
        sample
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_artifact(name: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("heap-engine-test-{}-{}", std::process::id(), name));
        path
    }

    #[test]
    fn test_start_stop_writes_report() {
        let path = temp_artifact("run");
        let engine = HeapEngine::new(&path);

        engine.start().unwrap();
        engine.flush();
        engine.stop().unwrap();

        let artifact = engine.read_artifact().unwrap();
        let text = String::from_utf8(artifact).unwrap();
        assert!(text.starts_with("heap profile\n"));
        assert!(text.contains("live at completion:"));

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_double_start_is_an_error() {
        let engine = HeapEngine::new(temp_artifact("double"));
        engine.start().unwrap();
        assert!(matches!(engine.start(), Err(EngineError::RunActive)));
        engine.stop().unwrap();
        fs::remove_file(engine.artifact_path()).ok();
    }

    #[test]
    fn test_stop_without_start_is_an_error() {
        let engine = HeapEngine::new(temp_artifact("stop"));
        assert!(matches!(engine.stop(), Err(EngineError::RunNotActive)));
    }

    #[test]
    fn test_stats_text_layout() {
        let runtime = TrackedHeapRuntime::new();
        let stats = runtime.stats_text();
        assert!(stats.starts_with("heap statistics\n"));
        assert_eq!(stats.lines().count(), 7);
    }

    #[test]
    fn test_histogram_bucket_count() {
        let runtime = TrackedHeapRuntime::new();
        assert_eq!(
            runtime.histogram().buckets.len(),
            crate::alloc::HISTOGRAM_BUCKETS
        );
    }
}
