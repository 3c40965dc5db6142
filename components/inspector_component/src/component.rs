//! Main inspector component implementation

use std::sync::atomic::{AtomicBool, AtomicU16, Ordering};
use std::sync::Arc;

use inspect_http::{ConnectionFanout, ConnectionRegistry, InspectServer};
use parking_lot::Mutex;
use pprof_endpoints::{spawn_completion_dispatcher, CompletionTimer, SessionCoordinator};
use profile_engine::{
    BacktraceSymbolizer, CpuEngine, HeapEngine, ProfileEngine, ProfileKind, TrackedHeapRuntime,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::InspectorConfig;
use crate::dispatch::EndpointDispatcher;
use crate::error::{InspectorError, Result};

/// In-process diagnostics endpoint set.
///
/// Owns the HTTP front end, the profiling engines, and the session
/// coordinator, and wires them together. The embedding server creates one
/// `Inspector`, starts it, and keeps it for the life of the process.
///
/// # Example
///
/// ```no_run
/// use inspector_component::{Inspector, InspectorConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let inspector = Inspector::new(InspectorConfig::new(9280))?;
///     inspector.start().await?;
///
///     println!("profiling endpoints on port {}", inspector.port());
///     Ok(())
/// }
/// ```
pub struct Inspector {
    /// Configuration for this component
    config: InspectorConfig,

    /// Live connections, shared between server and coordinator
    registry: Arc<ConnectionRegistry>,

    /// Session coordinator
    coordinator: Arc<SessionCoordinator>,

    /// Route dispatch handed to the server
    dispatcher: Arc<EndpointDispatcher>,

    /// Completion events, consumed when the dispatcher task first spawns
    completion_events: Mutex<Option<mpsc::UnboundedReceiver<ProfileKind>>>,

    /// Server task handle (when running)
    server_handle: Mutex<Option<JoinHandle<()>>>,

    /// Completion dispatcher task handle. Spawned on the first start and
    /// kept across stop/start cycles so armed sessions can still complete.
    completion_handle: Mutex<Option<JoinHandle<()>>>,

    /// Whether the inspector is currently running
    running: AtomicBool,

    /// Actual port the server is bound to (may differ from config when
    /// using an ephemeral port)
    actual_port: AtomicU16,
}

impl Inspector {
    /// Create an inspector from the given configuration.
    ///
    /// Builds the engines with their injected artifact paths, resolves
    /// the heap endpoint mode, and assembles the coordinator. Nothing is
    /// bound or spawned until [`start`](Self::start).
    pub fn new(config: InspectorConfig) -> Result<Self> {
        debug!("creating inspector with config: {:?}", config);

        let registry = Arc::new(ConnectionRegistry::new());
        let cpu_engine: Arc<dyn ProfileEngine> =
            Arc::new(CpuEngine::new(config.cpu_artifact_path.clone()));
        let heap_engine: Arc<dyn ProfileEngine> =
            Arc::new(HeapEngine::new(config.heap_artifact_path.clone()));

        let (timer, completion_events) = CompletionTimer::new();
        let coordinator = Arc::new(SessionCoordinator::new(
            cpu_engine,
            heap_engine,
            Arc::clone(&registry) as Arc<dyn ConnectionFanout>,
            Arc::new(timer),
        ));

        let heap_sample_mode = config.resolve_heap_sample_mode();
        let dispatcher = Arc::new(EndpointDispatcher {
            coordinator: Arc::clone(&coordinator),
            runtime: Arc::new(TrackedHeapRuntime::new()),
            symbolizer: Arc::new(BacktraceSymbolizer::new()),
            heap_sample_mode,
        });

        Ok(Self {
            config,
            registry,
            coordinator,
            dispatcher,
            completion_events: Mutex::new(Some(completion_events)),
            server_handle: Mutex::new(None),
            completion_handle: Mutex::new(None),
            running: AtomicBool::new(false),
            actual_port: AtomicU16::new(0),
        })
    }

    /// Start serving.
    ///
    /// Binds the configured address (port 0 selects an ephemeral port),
    /// then spawns the accept loop, plus the completion dispatcher task
    /// on the first start.
    pub async fn start(&self) -> Result<()> {
        if self.running.load(Ordering::SeqCst) {
            return Err(InspectorError::AlreadyRunning);
        }

        let addr = format!(
            "{}:{}",
            self.config.server.bind_address, self.config.server.port
        );
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        let actual_port = listener.local_addr()?.port();
        self.actual_port.store(actual_port, Ordering::SeqCst);
        self.running.store(true, Ordering::SeqCst);

        info!(
            "inspector listening on {}:{}",
            self.config.server.bind_address, actual_port
        );

        if let Some(completion_events) = self.completion_events.lock().take() {
            let handle =
                spawn_completion_dispatcher(completion_events, Arc::clone(&self.coordinator));
            *self.completion_handle.lock() = Some(handle);
        }

        let server = InspectServer::new(
            self.config.server.clone(),
            Arc::clone(&self.registry),
            Arc::clone(&self.dispatcher) as Arc<dyn inspect_http::RequestDispatcher>,
        );
        let server_handle = tokio::spawn(async move {
            if let Err(e) = server.run_on(listener).await {
                tracing::error!("inspect server stopped: {}", e);
            }
        });
        *self.server_handle.lock() = Some(server_handle);

        Ok(())
    }

    /// Stop accepting connections.
    ///
    /// The completion dispatcher keeps running so an already-armed session
    /// still completes; it is torn down when the inspector is dropped.
    pub async fn stop(&self) -> Result<()> {
        if !self.running.load(Ordering::SeqCst) {
            return Err(InspectorError::NotRunning);
        }

        if let Some(handle) = self.server_handle.lock().take() {
            handle.abort();
        }

        self.running.store(false, Ordering::SeqCst);
        info!("inspector stopped");
        Ok(())
    }

    /// Whether the inspector is currently serving.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Port the server is actually bound to. Zero before the first start.
    pub fn port(&self) -> u16 {
        self.actual_port.load(Ordering::SeqCst)
    }

    /// The session coordinator, for introspection.
    pub fn coordinator(&self) -> &Arc<SessionCoordinator> {
        &self.coordinator
    }
}

impl Drop for Inspector {
    fn drop(&mut self) {
        if let Some(handle) = self.server_handle.lock().take() {
            handle.abort();
        }
        if let Some(handle) = self.completion_handle.lock().take() {
            handle.abort();
        }
    }
}
