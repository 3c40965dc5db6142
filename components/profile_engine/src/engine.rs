//! The profiling-engine seam driven by the session coordinator

use thiserror::Error;

/// Errors surfaced by a profiling engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A run is already active; engines are not reentrant.
    #[error("profiling run already active")]
    RunActive,

    /// No run is active to stop or flush.
    #[error("no profiling run active")]
    RunNotActive,

    /// The underlying profiler failed to start or sample.
    #[error("profiler error: {0}")]
    Profiler(#[from] pprof::Error),

    /// Report generation or encoding failed.
    #[error("failed to build profile report: {0}")]
    Report(String),

    /// Reading or writing the artifact file failed.
    #[error("artifact I/O error: {0}")]
    Artifact(#[from] std::io::Error),
}

/// One time-bounded profiling run per engine.
///
/// The coordinator guarantees at most one active run per kind, so a
/// well-behaved caller never observes `RunActive`. All methods are
/// synchronous; `read_artifact` is a blocking file read and is only
/// called from the completion dispatcher task.
pub trait ProfileEngine: Send + Sync {
    /// Begin a profiling run.
    fn start(&self) -> Result<(), EngineError>;

    /// Push any buffered samples toward the artifact. Engines that keep
    /// samples in memory until `stop` treat this as a no-op.
    fn flush(&self);

    /// End the run and write the artifact to the engine's configured path.
    fn stop(&self) -> Result<(), EngineError>;

    /// Read back the artifact produced by the last completed run.
    fn read_artifact(&self) -> Result<Vec<u8>, EngineError>;
}
