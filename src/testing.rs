//! In-memory collaborators for unit tests.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing_subscriber::EnvFilter;

use crate::codec::XorCodec;
use crate::environment::{
    Environment, HandlerSet, PageLocation, Registration, RegistrationOptions, RenderingSurface,
    RewriterConfig, StaticRewriter, SurfaceEvent, SurfaceHandler, TransportConnection,
    TransportFactory, TransportOptions, WorkerHost, WorkerState,
};
use crate::error::{Error, Result};
use crate::identifiers::SubscriptionId;

// ============================================================================
// Constants
// ============================================================================

pub(crate) const SECURE_PAGE: &str = "https://proxy.example.com/";
pub(crate) const INSECURE_PAGE: &str = "http://proxy.example.com/";
pub(crate) const PREFIX: &str = "/uv/service/";

/// Installs a test subscriber once; `RUST_LOG` controls verbosity.
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ============================================================================
// FakeWorker
// ============================================================================

pub(crate) struct FakeWorker {
    pub supported: AtomicBool,
    pub register_calls: AtomicUsize,
    pub ready_calls: AtomicUsize,
    pub fail_register: Mutex<Option<Error>>,
    pub panic_register: AtomicBool,
    pub activation_delay: Mutex<Duration>,
    pub ready_state: Mutex<WorkerState>,
}

impl FakeWorker {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            supported: AtomicBool::new(true),
            register_calls: AtomicUsize::new(0),
            ready_calls: AtomicUsize::new(0),
            fail_register: Mutex::new(None),
            panic_register: AtomicBool::new(false),
            activation_delay: Mutex::new(Duration::from_millis(50)),
            ready_state: Mutex::new(WorkerState::Activated),
        })
    }

    pub fn registrations(&self) -> usize {
        self.register_calls.load(Ordering::SeqCst)
    }

    pub fn fail_with(&self, err: Error) {
        *self.fail_register.lock() = Some(err);
    }

    pub fn recover(&self) {
        *self.fail_register.lock() = None;
    }
}

#[async_trait]
impl WorkerHost for FakeWorker {
    fn is_supported(&self) -> bool {
        self.supported.load(Ordering::SeqCst)
    }

    async fn register(
        &self,
        script_path: &str,
        options: RegistrationOptions,
    ) -> Result<Registration> {
        self.register_calls.fetch_add(1, Ordering::SeqCst);
        if self.panic_register.swap(false, Ordering::SeqCst) {
            panic!("worker host crashed during register");
        }
        let failure = self.fail_register.lock().clone();
        if let Some(err) = failure {
            return Err(err);
        }

        Ok(Registration {
            scope: options.scope,
            script: script_path.to_string(),
            state: WorkerState::Installing,
        })
    }

    async fn ready(&self, scope: &str) -> Result<Registration> {
        self.ready_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.activation_delay.lock();
        tokio::time::sleep(delay).await;

        Ok(Registration {
            scope: scope.to_string(),
            script: "/uv/sw.js".to_string(),
            state: *self.ready_state.lock(),
        })
    }
}

// ============================================================================
// FakeTransport
// ============================================================================

pub(crate) struct FakeConnection {
    pub current: Mutex<Option<String>>,
    pub set_calls: AtomicUsize,
    pub last_options: Mutex<Vec<TransportOptions>>,
    pub fail_set: Mutex<Option<Error>>,
}

#[async_trait]
impl TransportConnection for FakeConnection {
    async fn get_transport(&self) -> Result<Option<String>> {
        Ok(self.current.lock().clone())
    }

    async fn set_transport(
        &self,
        module_path: &str,
        options: Vec<TransportOptions>,
    ) -> Result<()> {
        self.set_calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;

        let failure = self.fail_set.lock().clone();
        if let Some(err) = failure {
            return Err(err);
        }

        *self.current.lock() = Some(module_path.to_string());
        *self.last_options.lock() = options;
        Ok(())
    }
}

pub(crate) struct FakeTransport {
    pub connect_calls: AtomicUsize,
    pub connection: Arc<FakeConnection>,
}

impl FakeTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            connect_calls: AtomicUsize::new(0),
            connection: Arc::new(FakeConnection {
                current: Mutex::new(None),
                set_calls: AtomicUsize::new(0),
                last_options: Mutex::new(Vec::new()),
                fail_set: Mutex::new(None),
            }),
        })
    }

    pub fn configures(&self) -> usize {
        self.connection.set_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TransportFactory for FakeTransport {
    async fn connect(&self, _worker_path: &str) -> Result<Arc<dyn TransportConnection>> {
        self.connect_calls.fetch_add(1, Ordering::SeqCst);
        let connection: Arc<dyn TransportConnection> = self.connection.clone();
        Ok(connection)
    }
}

// ============================================================================
// FakeSurface
// ============================================================================

pub(crate) struct FakeSurface {
    pub attached: AtomicBool,
    pub source: Mutex<String>,
    pub history: Mutex<Vec<String>>,
    pub handlers: HandlerSet,
}

impl FakeSurface {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            attached: AtomicBool::new(true),
            source: Mutex::new(String::new()),
            history: Mutex::new(Vec::new()),
            handlers: HandlerSet::new(),
        })
    }

    pub fn emit(&self, event: SurfaceEvent) {
        self.handlers.emit(event);
    }
}

impl RenderingSurface for FakeSurface {
    fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }

    fn source(&self) -> String {
        self.source.lock().clone()
    }

    fn set_source(&self, source: &str) -> Result<()> {
        if !self.is_attached() {
            return Err(Error::SurfaceMissing);
        }
        *self.source.lock() = source.to_string();
        self.history.lock().push(source.to_string());
        Ok(())
    }

    fn subscribe(&self, handler: SurfaceHandler) -> SubscriptionId {
        self.handlers.insert(handler)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.handlers.remove(id);
    }
}

// ============================================================================
// Environment
// ============================================================================

pub(crate) struct Fixture {
    pub env: Environment,
    pub worker: Arc<FakeWorker>,
    pub transport: Arc<FakeTransport>,
}

pub(crate) fn rewriter_config() -> RewriterConfig {
    RewriterConfig::new(PREFIX, Arc::new(XorCodec))
}

pub(crate) fn fixture(page: &str) -> Fixture {
    init_tracing();

    let worker = FakeWorker::new();
    let transport = FakeTransport::new();
    let location = match PageLocation::parse(page) {
        Ok(location) => location,
        Err(e) => panic!("bad test page {page}: {e}"),
    };

    let env = Environment {
        location,
        worker: worker.clone(),
        rewriter: Arc::new(StaticRewriter::new(rewriter_config())),
        transport: transport.clone(),
    };

    Fixture {
        env,
        worker,
        transport,
    }
}
