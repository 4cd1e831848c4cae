//! Session controller implementation.
//!
//! Sequences one navigation at a time and publishes what the UI shows.
//! A newer search supersedes an older one: the older one's surface handler
//! and display timer are dropped and its late results are ignored.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, error, info, trace};

use crate::config::{Platform, SessionConfig, Timing};
use crate::coordinator::ReadinessCoordinator;
use crate::environment::RenderingSurface;
use crate::error::{Error, Result};
use crate::identifiers::NavigationId;
use crate::navigation::{
    DisplayTimer, NavigationExecutor, NavigationOutcome, NavigationRequest, SurfaceSubscription,
};
use crate::resolver::{UrlResolver, classify};

use super::builder::SessionControllerBuilder;
use super::state::{SessionSnapshot, SessionUiState};

// ============================================================================
// ActiveNavigation
// ============================================================================

/// Guards owned by the current navigation.
#[derive(Default)]
struct ActiveNavigation {
    id: Option<NavigationId>,
    subscription: Option<SurfaceSubscription>,
    timer: Option<DisplayTimer>,
}

impl ActiveNavigation {
    #[inline]
    fn is_current(&self, id: NavigationId) -> bool {
        self.id == Some(id)
    }

    /// Takes the guards out so they drop after the lock is released.
    fn take_guards(&mut self) -> (Option<SurfaceSubscription>, Option<DisplayTimer>) {
        (self.subscription.take(), self.timer.take())
    }
}

// ============================================================================
// SessionController
// ============================================================================

/// Owns the UI state and drives navigations.
///
/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct SessionController {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: SessionConfig,
    platform: Platform,
    timing: Timing,
    resolver: UrlResolver,
    coordinator: ReadinessCoordinator,
    executor: NavigationExecutor,
    view: watch::Sender<SessionSnapshot>,
    /// Never held across an await or while calling into the surface.
    active: Mutex<ActiveNavigation>,
}

impl fmt::Debug for SessionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionController")
            .field("platform", &self.inner.platform)
            .field("state", &self.state())
            .field("readiness", &self.inner.coordinator.state())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// SessionController - Construction
// ============================================================================

impl SessionController {
    /// Creates a builder.
    #[inline]
    #[must_use]
    pub fn builder() -> SessionControllerBuilder {
        SessionControllerBuilder::new()
    }

    pub(crate) fn new(
        config: SessionConfig,
        platform: Platform,
        coordinator: ReadinessCoordinator,
        surface: Arc<dyn RenderingSurface>,
    ) -> Self {
        let timing = config.timing(platform);
        let resolver = UrlResolver::new(config.search_template.clone());
        let (view, _) = watch::channel(SessionSnapshot::default());

        debug!(
            platform = ?platform,
            settle_ms = timing.settle_delay.as_millis() as u64,
            display_timeout_ms = timing.display_timeout.as_millis() as u64,
            "Session controller created"
        );

        Self {
            inner: Arc::new(ControllerInner {
                config,
                platform,
                timing,
                resolver,
                coordinator,
                executor: NavigationExecutor::new(surface),
                view,
                active: Mutex::new(ActiveNavigation::default()),
            }),
        }
    }
}

// ============================================================================
// SessionController - Actions
// ============================================================================

impl SessionController {
    /// Resolves `query` and navigates the surface to it.
    ///
    /// Empty or whitespace-only input is ignored. Returns `Ok(())` without
    /// touching the surface when a later search or [`go_home`](Self::go_home)
    /// supersedes this one while it waits.
    ///
    /// # Errors
    ///
    /// - [`Error::SurfaceMissing`] if the surface is detached
    /// - Any readiness error from [`ReadinessCoordinator::ensure_ready`]
    /// - Whatever the surface reports when its source cannot be set
    ///
    /// On error the UI is back on [`SessionUiState::Home`] with a message set.
    pub async fn search(&self, query: &str) -> Result<()> {
        let raw = query.trim();
        if raw.is_empty() {
            debug!("Ignoring empty search");
            return Ok(());
        }

        let inner = &self.inner;
        let resolved = inner.resolver.resolve(raw);
        let nav_id = NavigationId::next();

        info!(
            navigation_id = %nav_id,
            input = %raw,
            kind = ?classify(raw),
            resolved = %resolved,
            "Search submitted"
        );

        inner.begin(nav_id, &resolved);

        if let Err(e) = inner.executor.ensure_surface() {
            return Err(inner.fail(nav_id, e));
        }

        let session = match inner.coordinator.ensure_ready().await {
            Ok(session) => session,
            Err(e) => return Err(inner.fail(nav_id, e)),
        };

        if !inner.is_current(nav_id) {
            debug!(navigation_id = %nav_id, "Superseded while waiting for readiness");
            return Ok(());
        }

        let settle = inner.timing.settle_delay;
        if !settle.is_zero() {
            trace!(navigation_id = %nav_id, settle_ms = settle.as_millis() as u64, "Settling");
            tokio::time::sleep(settle).await;

            if !inner.is_current(nav_id) {
                debug!(navigation_id = %nav_id, "Superseded while settling");
                return Ok(());
            }
        }

        let subscription = {
            let weak = Arc::downgrade(&self.inner);
            inner.executor.observe(move |outcome| {
                if let Some(inner) = weak.upgrade() {
                    inner.on_outcome(nav_id, outcome);
                }
            })
        };
        let timer = {
            let weak: Weak<ControllerInner> = Arc::downgrade(&self.inner);
            inner
                .executor
                .display_timeout(inner.timing.display_timeout, move || {
                    if let Some(inner) = weak.upgrade() {
                        inner.on_display_timeout(nav_id);
                    }
                })
        };

        if !inner.attach(nav_id, subscription, timer) {
            debug!(navigation_id = %nav_id, "Superseded before navigating");
            return Ok(());
        }

        let request = NavigationRequest::new(nav_id, raw, resolved, &session);
        if let Err(e) = inner.executor.navigate(request) {
            return Err(inner.fail(nav_id, e));
        }

        Ok(())
    }

    /// Returns to the start screen.
    ///
    /// Always succeeds. Cancels the current navigation's handler and timer,
    /// clears the error and resets the surface to the blank source.
    pub fn go_home(&self) {
        let inner = &self.inner;

        let guards = {
            let mut active = inner.active.lock();
            active.id = None;
            active.take_guards()
        };
        drop(guards);

        inner.executor.clear(&inner.config.blank_source);
        inner.view.send_replace(SessionSnapshot::default());

        info!("Returned home");
    }

    /// Reloads the current destination.
    ///
    /// Does nothing unless a destination is shown.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SurfaceMissing`] if the surface is detached.
    pub fn reload(&self) -> Result<()> {
        if self.state() != SessionUiState::Active {
            debug!("Nothing to reload");
            return Ok(());
        }

        self.inner.executor.reload()
    }

    /// Tears the readiness session down and builds it again.
    ///
    /// The UI state is left alone; a failure sets the error message.
    ///
    /// # Errors
    ///
    /// Any readiness error from [`ReadinessCoordinator::reinitialize`].
    pub async fn reinitialize(&self) -> Result<()> {
        info!("Reinitializing session");

        match self.inner.coordinator.reinitialize().await {
            Ok(session) => {
                info!(session_id = %session.id(), "Session reinitialized");
                self.inner.view.send_modify(|view| {
                    view.error = None;
                    view.error_detail = None;
                });
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Reinitialization failed");
                self.inner.view.send_modify(|view| {
                    view.error = Some(e.user_message().to_string());
                    view.error_detail = Some(e.to_string());
                });
                Err(e)
            }
        }
    }
}

// ============================================================================
// SessionController - Accessors
// ============================================================================

impl SessionController {
    /// Returns a copy of the current UI state.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.view.borrow().clone()
    }

    /// Returns the current screen.
    #[inline]
    #[must_use]
    pub fn state(&self) -> SessionUiState {
        self.inner.view.borrow().state
    }

    /// Returns the user-facing error message, if any.
    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.inner.view.borrow().error.clone()
    }

    /// Subscribes to UI state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.inner.view.subscribe()
    }

    /// Returns the readiness coordinator.
    #[inline]
    #[must_use]
    pub fn coordinator(&self) -> &ReadinessCoordinator {
        &self.inner.coordinator
    }

    /// Returns the platform class.
    #[inline]
    #[must_use]
    pub fn platform(&self) -> Platform {
        self.inner.platform
    }

    /// Returns the platform-specific timing.
    #[inline]
    #[must_use]
    pub fn timing(&self) -> Timing {
        self.inner.timing
    }

    /// Returns what `input` would resolve to, without navigating.
    #[must_use]
    pub fn preview(&self, input: &str) -> String {
        self.inner.resolver.resolve(input.trim())
    }
}

// ============================================================================
// ControllerInner
// ============================================================================

impl ControllerInner {
    fn is_current(&self, id: NavigationId) -> bool {
        self.active.lock().is_current(id)
    }

    /// Makes `id` the current navigation and shows the loading screen.
    fn begin(&self, id: NavigationId, resolved: &str) {
        let previous = {
            let mut active = self.active.lock();
            let superseded = active.id.replace(id);
            (superseded, active.take_guards())
        };

        if let (Some(old), _) = &previous {
            debug!(navigation_id = %old, superseded_by = %id, "Navigation superseded");
        }
        drop(previous);

        self.view.send_modify(|view| {
            view.state = SessionUiState::Loading;
            view.error = None;
            view.error_detail = None;
            view.current_url = Some(resolved.to_string());
        });
    }

    /// Stores the guards if `id` is still current.
    fn attach(&self, id: NavigationId, subscription: SurfaceSubscription, timer: DisplayTimer) -> bool {
        let mut active = self.active.lock();
        if !active.is_current(id) {
            drop(active);
            drop(subscription);
            drop(timer);
            return false;
        }

        let replaced = (active.subscription.replace(subscription), active.timer.replace(timer));
        drop(active);
        drop(replaced);
        true
    }

    /// Ends navigation `id` with `err` and returns the error.
    fn fail(&self, id: NavigationId, err: Error) -> Error {
        error!(navigation_id = %id, error = %err, "Navigation failed");

        let guards = {
            let mut active = self.active.lock();
            if active.is_current(id) {
                active.id = None;
                Some(active.take_guards())
            } else {
                None
            }
        };

        match guards {
            Some(guards) => {
                drop(guards);
                self.show_error(&err);
            }
            None => debug!(navigation_id = %id, "Failure of superseded navigation not shown"),
        }

        err
    }

    fn show_error(&self, err: &Error) {
        self.view.send_modify(|view| {
            view.state = SessionUiState::Home;
            view.error = Some(err.user_message().to_string());
            view.error_detail = Some(err.to_string());
        });
    }

    fn on_outcome(&self, id: NavigationId, outcome: NavigationOutcome) {
        match outcome {
            NavigationOutcome::Loaded => {
                let timer = {
                    let mut active = self.active.lock();
                    if !active.is_current(id) {
                        trace!(navigation_id = %id, "Ignoring load of stale navigation");
                        return;
                    }
                    active.timer.take()
                };
                drop(timer);

                info!(navigation_id = %id, "Surface loaded");
                self.view.send_modify(|view| {
                    view.state = SessionUiState::Active;
                    view.error = None;
                    view.error_detail = None;
                });
            }
            NavigationOutcome::Failed(message) => {
                if !self.is_current(id) {
                    trace!(navigation_id = %id, "Ignoring error of stale navigation");
                    return;
                }
                self.fail(id, Error::navigation_surface(message));
            }
        }
    }

    fn on_display_timeout(&self, id: NavigationId) {
        if !self.is_current(id) {
            return;
        }

        let shown = self.view.send_if_modified(|view| {
            if view.state != SessionUiState::Loading {
                return false;
            }
            view.state = SessionUiState::Active;
            true
        });

        if shown {
            info!(
                navigation_id = %id,
                timeout_ms = self.timing.display_timeout.as_millis() as u64,
                "No load event yet; showing surface"
            );
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
