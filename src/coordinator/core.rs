//! Readiness coordinator.
//!
//! The [`ReadinessCoordinator`] owns the background worker registration and
//! the transport connection, and hands out one shared [`TransportSession`].
//!
//! # Single Flight
//!
//! The first `ensure_ready` caller spawns the attempt as its own task; every
//! caller (the first included) parks on a oneshot waiter. Concurrent callers
//! therefore collapse onto one registration and one transport configure, and
//! dropping a caller never cancels the shared attempt. A supervisor task
//! answers the waiters if the attempt dies without doing so.
//!
//! `reset` bumps a generation counter. An attempt from an older generation
//! still answers its own waiters but never caches its session.
//!
//! # Example
//!
//! ```ignore
//! let coordinator = ReadinessCoordinator::new(env, config);
//! let session = coordinator.ensure_ready().await?;
//! println!("tunnel: {}", session.endpoint());
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{oneshot, watch};
use tokio::time::{Instant, sleep_until, timeout};
use tracing::{debug, error, info, warn};

use crate::config::SessionConfig;
use crate::environment::{
    Environment, Registration, RegistrationOptions, RewriterConfig, TransportConnection,
    TransportOptions,
};
use crate::error::{Error, Result};

use super::session::TransportSession;
use super::state::ReadinessState;

// ============================================================================
// Types
// ============================================================================

/// Callers waiting on one attempt.
type Waiters = Arc<Mutex<Vec<oneshot::Sender<Result<TransportSession>>>>>;

/// Mutable coordinator state.
struct CoordinatorState {
    /// Incremented by every reset.
    generation: u64,
    /// Cached session once `Ready`.
    session: Option<TransportSession>,
    /// Connection handle, kept across failed attempts.
    connection: Option<Arc<dyn TransportConnection>>,
    /// Waiters of the attempt in flight, if any.
    in_flight: Option<Waiters>,
    /// No attempt may start before this instant.
    cooldown_until: Option<Instant>,
}

/// Shared inner state.
struct CoordinatorInner {
    env: Environment,
    config: SessionConfig,
    state: Mutex<CoordinatorState>,
    readiness: watch::Sender<ReadinessState>,
}

// ============================================================================
// ReadinessCoordinator
// ============================================================================

/// Brings worker and transport to `Ready` exactly once.
///
/// Cheap to clone; clones share the same state.
#[derive(Clone)]
pub struct ReadinessCoordinator {
    inner: Arc<CoordinatorInner>,
}

impl fmt::Debug for ReadinessCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadinessCoordinator")
            .field("state", &*self.inner.readiness.borrow())
            .field("location", &self.inner.env.location.to_string())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// ReadinessCoordinator - Public API
// ============================================================================

impl ReadinessCoordinator {
    /// Creates an idle coordinator.
    #[must_use]
    pub fn new(env: Environment, config: SessionConfig) -> Self {
        let (readiness, _rx) = watch::channel(ReadinessState::Idle);

        Self {
            inner: Arc::new(CoordinatorInner {
                env,
                config,
                state: Mutex::new(CoordinatorState {
                    generation: 0,
                    session: None,
                    connection: None,
                    in_flight: None,
                    cooldown_until: None,
                }),
                readiness,
            }),
        }
    }

    /// Returns the shared session, initializing it if needed.
    ///
    /// Safe to call concurrently: all callers share one attempt.
    ///
    /// # Errors
    ///
    /// - [`Error::WorkerUnsupported`] if the host cannot run workers
    /// - [`Error::InsecureOrigin`] if the page is neither `https` nor allow-listed
    /// - [`Error::WorkerRegistration`] if registration or activation fails
    /// - [`Error::WorkerRegistration`] if the rewriter config never becomes available
    /// - [`Error::TransportConfiguration`] if the transport cannot be set up
    pub async fn ensure_ready(&self) -> Result<TransportSession> {
        self.wait_cooldown().await;

        let rx = {
            let mut state = self.inner.state.lock();

            if let Some(session) = &state.session {
                return Ok(session.clone());
            }

            let (tx, rx) = oneshot::channel();
            if let Some(waiters) = state.in_flight.clone() {
                waiters.lock().push(tx);
                debug!("Joined in-flight readiness attempt");
            } else {
                let waiters: Waiters = Arc::new(Mutex::new(vec![tx]));
                state.in_flight = Some(Arc::clone(&waiters));

                let generation = state.generation;
                let inner = Arc::clone(&self.inner);
                let attempt = {
                    let inner = Arc::clone(&inner);
                    let waiters = Arc::clone(&waiters);
                    tokio::spawn(async move { inner.run_attempt(generation, waiters).await })
                };
                tokio::spawn(async move {
                    if let Err(e) = attempt.await {
                        inner.abandon_attempt(generation, &waiters, &e.to_string());
                    }
                });
                debug!(generation, "Started readiness attempt");
            }
            rx
        };

        rx.await
            .map_err(|_| Error::worker_registration("Readiness attempt abandoned"))?
    }

    /// Discards the cached session and returns to `Idle`.
    ///
    /// The next `ensure_ready` waits out the configured cooldown first.
    pub fn reset(&self) {
        let cooldown = self.inner.config.reinit_cooldown();
        {
            let mut state = self.inner.state.lock();
            state.generation += 1;
            state.session = None;
            state.connection = None;
            state.in_flight = None;
            state.cooldown_until = Some(Instant::now() + cooldown);

            self.inner.readiness.send_replace(ReadinessState::Idle);
            info!(
                generation = state.generation,
                cooldown_ms = cooldown.as_millis() as u64,
                "Readiness coordinator reset"
            );
        }
    }

    /// Resets, then initializes again.
    ///
    /// # Errors
    ///
    /// Same as [`ReadinessCoordinator::ensure_ready`].
    pub async fn reinitialize(&self) -> Result<TransportSession> {
        info!("Reinitializing readiness coordinator");
        self.reset();
        self.ensure_ready().await
    }

    /// Returns the current state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> ReadinessState {
        self.inner.readiness.borrow().clone()
    }

    /// Returns the configuration this coordinator runs on.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    /// Returns a receiver that observes state transitions.
    #[inline]
    #[must_use]
    pub fn watch_state(&self) -> watch::Receiver<ReadinessState> {
        self.inner.readiness.subscribe()
    }

    /// Returns `true` once a session is cached.
    #[inline]
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.inner.state.lock().session.is_some()
    }

    /// Returns the cached session without initializing.
    #[inline]
    #[must_use]
    pub fn session(&self) -> Option<TransportSession> {
        self.inner.state.lock().session.clone()
    }

    /// Sleeps until no reset cooldown is pending.
    async fn wait_cooldown(&self) {
        loop {
            let until = self.inner.state.lock().cooldown_until;
            match until {
                Some(deadline) if deadline > Instant::now() => {
                    debug!("Waiting for reset cooldown");
                    sleep_until(deadline).await;
                }
                _ => break,
            }
        }
    }
}

// ============================================================================
// CoordinatorInner - Attempt
// ============================================================================

impl CoordinatorInner {
    /// Runs one attempt and answers its waiters.
    async fn run_attempt(self: Arc<Self>, generation: u64, waiters: Waiters) {
        let result = self.initialize(generation).await;

        {
            let mut state = self.state.lock();
            if state.generation == generation {
                state.in_flight = None;
                match &result {
                    Ok(session) => {
                        state.session = Some(session.clone());
                        self.readiness.send_replace(ReadinessState::Ready);
                        info!(
                            session_id = %session.id(),
                            endpoint = %session.endpoint(),
                            "Transport session ready"
                        );
                    }
                    Err(e) => {
                        self.readiness.send_replace(ReadinessState::Failed {
                            reason: e.to_string(),
                        });
                        error!(error = %e, "Readiness attempt failed");
                    }
                }
            } else {
                warn!(
                    generation,
                    current = state.generation,
                    "Readiness attempt superseded by reset; result not cached"
                );
            }
        }

        let waiters: Vec<_> = waiters.lock().drain(..).collect();
        debug!(count = waiters.len(), "Answering readiness waiters");
        for tx in waiters {
            let _ = tx.send(result.clone());
        }
    }

    /// Fails the waiters of an attempt whose task died before answering.
    fn abandon_attempt(&self, generation: u64, waiters: &Waiters, reason: &str) {
        let err = Error::worker_registration(format!("Readiness attempt aborted: {reason}"));

        {
            let mut state = self.state.lock();
            let current = state
                .in_flight
                .as_ref()
                .is_some_and(|in_flight| Arc::ptr_eq(in_flight, waiters));
            if state.generation == generation && current {
                state.in_flight = None;
                self.readiness.send_replace(ReadinessState::Failed {
                    reason: err.to_string(),
                });
            }
        }
        error!(generation, error = %err, "Readiness attempt aborted");

        let waiters: Vec<_> = waiters.lock().drain(..).collect();
        for tx in waiters {
            let _ = tx.send(Err(err.clone()));
        }
    }

    /// Walks the state machine up to `TransportReady`.
    async fn initialize(&self, generation: u64) -> Result<TransportSession> {
        self.transition(generation, ReadinessState::WorkerRegistering);
        let (registration, rewriter) = self.start_worker().await?;
        self.transition(generation, ReadinessState::WorkerReady);

        self.transition(generation, ReadinessState::TransportConfiguring);
        let (connection, endpoint) = self.configure_transport(generation).await?;
        self.transition(generation, ReadinessState::TransportReady);

        Ok(TransportSession::new(
            connection,
            endpoint,
            self.config.transport_module.clone(),
            rewriter,
            registration,
        ))
    }

    /// Publishes `next` if `generation` is still current.
    fn transition(&self, generation: u64, next: ReadinessState) {
        let state = self.state.lock();
        if state.generation == generation {
            debug!(state = next.name(), "Readiness transition");
            self.readiness.send_replace(next);
        }
    }
}

// ============================================================================
// CoordinatorInner - Worker
// ============================================================================

impl CoordinatorInner {
    /// Registers the worker, waits for it to be active, then for the rewriter.
    async fn start_worker(&self) -> Result<(Registration, RewriterConfig)> {
        let worker = &self.env.worker;
        let location = &self.env.location;

        if !worker.is_supported() {
            return Err(Error::WorkerUnsupported);
        }

        if !location.permits_workers(&self.config.insecure_allowed_hosts) {
            return Err(Error::insecure_origin(location.hostname()));
        }

        let options = RegistrationOptions::scope(&self.config.worker_scope);
        worker
            .register(&self.config.worker_script, options)
            .await
            .map_err(worker_failure)?;
        debug!(
            script = %self.config.worker_script,
            scope = %self.config.worker_scope,
            "Worker registered"
        );

        let registration = worker
            .ready(&self.config.worker_scope)
            .await
            .map_err(worker_failure)?;
        if !registration.is_active() {
            return Err(Error::worker_registration(format!(
                "Registration for {} is not active ({:?})",
                registration.scope, registration.state
            )));
        }
        debug!(scope = %registration.scope, "Worker active");

        let wait = self.config.config_timeout();
        let rewriter = timeout(wait, self.env.rewriter.wait_config())
            .await
            .map_err(|_| {
                worker_failure(Error::timeout("rewriter config", wait.as_millis() as u64))
            })?
            .map_err(worker_failure)?;
        debug!(prefix = %rewriter.prefix(), codec = rewriter.codec().name(), "Rewriter config available");

        Ok((registration, rewriter))
    }
}

// ============================================================================
// CoordinatorInner - Transport
// ============================================================================

impl CoordinatorInner {
    /// Connects (once) and installs the transport module if needed.
    async fn configure_transport(
        &self,
        generation: u64,
    ) -> Result<(Arc<dyn TransportConnection>, url::Url)> {
        let connection = self.connection(generation).await?;

        let endpoint = self
            .env
            .location
            .tunnel_endpoint(&self.config.tunnel_path)
            .map_err(transport_failure)?;
        let module = &self.config.transport_module;

        let current = connection.get_transport().await.map_err(transport_failure)?;
        if current.as_deref() == Some(module.as_str()) {
            debug!(module = %module, "Transport already configured");
        } else {
            connection
                .set_transport(module, vec![TransportOptions::wisp(endpoint.as_str())])
                .await
                .map_err(transport_failure)?;
            info!(module = %module, endpoint = %endpoint, "Transport configured");
        }

        Ok((connection, endpoint))
    }

    /// Returns the connection handle, creating it on first use.
    async fn connection(&self, generation: u64) -> Result<Arc<dyn TransportConnection>> {
        if let Some(connection) = self.state.lock().connection.clone() {
            return Ok(connection);
        }

        let connection = self
            .env
            .transport
            .connect(&self.config.transport_worker)
            .await
            .map_err(transport_failure)?;
        debug!(worker = %self.config.transport_worker, "Transport connection created");

        let mut state = self.state.lock();
        if state.generation == generation {
            state.connection = Some(Arc::clone(&connection));
        }
        Ok(connection)
    }
}

// ============================================================================
// Error Mapping
// ============================================================================

/// Keeps worker-category errors, wraps anything else as a registration error.
fn worker_failure(err: Error) -> Error {
    if err.is_worker_error() {
        err
    } else {
        Error::worker_registration(err.to_string())
    }
}

/// Keeps transport errors, wraps anything else as a transport error.
fn transport_failure(err: Error) -> Error {
    if err.is_transport_error() {
        err
    } else {
        Error::transport(err.to_string())
    }
}

// ============================================================================
// Tests
// ============================================================================
