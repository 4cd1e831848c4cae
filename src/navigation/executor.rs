//! Navigation executor.
//!
//! The single point where a destination URL becomes a surface source.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::environment::{RenderingSurface, SurfaceEvent};
use crate::error::{Error, Result};

use super::request::NavigationRequest;
use super::subscription::{DisplayTimer, SurfaceSubscription};

// ============================================================================
// NavigationOutcome
// ============================================================================

/// What a surface event means for the navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// Document loaded.
    Loaded,
    /// Document failed; carries the surface's message.
    Failed(String),
}

impl NavigationOutcome {
    /// Maps a surface event.
    #[must_use]
    pub fn from_event(event: SurfaceEvent) -> Self {
        match event {
            SurfaceEvent::Load => Self::Loaded,
            SurfaceEvent::Error { message } => Self::Failed(message),
        }
    }

    /// Converts into a result, failures as [`Error::NavigationSurface`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::NavigationSurface`] for [`NavigationOutcome::Failed`].
    pub fn into_result(self) -> Result<()> {
        match self {
            Self::Loaded => Ok(()),
            Self::Failed(message) => Err(Error::navigation_surface(message)),
        }
    }
}

// ============================================================================
// NavigationExecutor
// ============================================================================

/// Drives one rendering surface.
#[derive(Clone)]
pub struct NavigationExecutor {
    surface: Arc<dyn RenderingSurface>,
}

impl fmt::Debug for NavigationExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationExecutor")
            .field("attached", &self.surface.is_attached())
            .finish_non_exhaustive()
    }
}

impl NavigationExecutor {
    /// Creates an executor for `surface`.
    #[inline]
    #[must_use]
    pub fn new(surface: Arc<dyn RenderingSurface>) -> Self {
        Self { surface }
    }

    /// Returns the surface.
    #[inline]
    #[must_use]
    pub fn surface(&self) -> &Arc<dyn RenderingSurface> {
        &self.surface
    }

    /// Fails fast if the surface is not in the document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SurfaceMissing`] if the surface is detached.
    pub fn ensure_surface(&self) -> Result<()> {
        if self.surface.is_attached() {
            Ok(())
        } else {
            Err(Error::SurfaceMissing)
        }
    }

    /// Points the surface at the request's encoded destination.
    ///
    /// Fire-and-forget: completion arrives through [`observe`](Self::observe).
    /// The request is consumed; nothing keeps it once the surface moved.
    ///
    /// # Errors
    ///
    /// - [`Error::SurfaceMissing`] if the surface is detached
    /// - Whatever the surface reports when its source cannot be set
    pub fn navigate(&self, request: NavigationRequest) -> Result<()> {
        self.ensure_surface()?;
        self.surface.set_source(request.encoded_destination())?;

        info!(
            navigation_id = %request.id(),
            destination = %request.resolved_url(),
            source = %request.encoded_destination(),
            "Surface navigated"
        );
        Ok(())
    }

    /// Attaches `handler` to surface events until the guard is dropped.
    pub fn observe<F>(&self, handler: F) -> SurfaceSubscription
    where
        F: Fn(NavigationOutcome) + Send + Sync + 'static,
    {
        let id = self
            .surface
            .subscribe(Arc::new(move |event| handler(NavigationOutcome::from_event(event))));
        debug!(subscription_id = %id, "Surface handler attached");
        SurfaceSubscription::new(Arc::clone(&self.surface), id)
    }

    /// Arms the advisory display timeout.
    ///
    /// `on_elapsed` only clears the loading indicator; it must not treat the
    /// navigation as failed.
    pub fn display_timeout<F>(&self, after: Duration, on_elapsed: F) -> DisplayTimer
    where
        F: FnOnce() + Send + 'static,
    {
        DisplayTimer::spawn(after, on_elapsed)
    }

    /// Re-applies the current source.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SurfaceMissing`] if the surface is detached.
    pub fn reload(&self) -> Result<()> {
        self.ensure_surface()?;
        let source = self.surface.source();
        debug!(source = %source, "Reloading surface");
        self.surface.set_source(&source)
    }

    /// Resets the surface to `blank`. A detached surface is left alone.
    pub fn clear(&self, blank: &str) {
        if !self.surface.is_attached() {
            debug!("Surface detached; nothing to clear");
            return;
        }

        if let Err(e) = self.surface.set_source(blank) {
            warn!(error = %e, "Failed to clear surface");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use parking_lot::Mutex;

    use super::*;
    use crate::config::SessionConfig;
    use crate::coordinator::{ReadinessCoordinator, TransportSession};
    use crate::identifiers::NavigationId;
    use crate::testing::{FakeSurface, PREFIX, SECURE_PAGE, fixture};

    async fn ready_session() -> TransportSession {
        let fx = fixture(SECURE_PAGE);
        ReadinessCoordinator::new(fx.env, SessionConfig::default())
            .ensure_ready()
            .await
            .unwrap()
    }

    fn request(session: &TransportSession, url: &str) -> NavigationRequest {
        NavigationRequest::new(NavigationId::next(), url, url, session)
    }

    #[tokio::test(start_paused = true)]
    async fn test_navigate_sets_prefixed_encoded_source() {
        let session = ready_session().await;
        let surface = FakeSurface::new();
        let executor = NavigationExecutor::new(surface.clone());

        executor
            .navigate(request(&session, "https://example.org/page"))
            .unwrap();

        let expected = format!("{}{}", PREFIX, session.rewriter().encode_url("https://example.org/page"));
        assert_eq!(surface.source(), expected);
        assert_eq!(surface.history.lock().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_navigate_detached_surface() {
        let session = ready_session().await;
        let surface = FakeSurface::new();
        surface.attached.store(false, Ordering::SeqCst);
        let executor = NavigationExecutor::new(surface.clone());

        let err = executor
            .navigate(request(&session, "https://example.org/"))
            .unwrap_err();
        assert!(matches!(err, Error::SurfaceMissing));
        assert!(surface.history.lock().is_empty());
    }

    #[tokio::test]
    async fn test_observe_maps_events_and_detaches_on_drop() {
        let surface = FakeSurface::new();
        let executor = NavigationExecutor::new(surface.clone());
        let seen: Arc<Mutex<Vec<NavigationOutcome>>> = Arc::new(Mutex::new(Vec::new()));

        let subscription = {
            let seen = Arc::clone(&seen);
            executor.observe(move |outcome| seen.lock().push(outcome))
        };
        assert_eq!(surface.handlers.len(), 1);

        surface.emit(SurfaceEvent::Load);
        surface.emit(SurfaceEvent::Error {
            message: "blocked".into(),
        });

        drop(subscription);
        assert!(surface.handlers.is_empty());
        surface.emit(SurfaceEvent::Load);

        let seen = seen.lock().clone();
        assert_eq!(
            seen,
            vec![
                NavigationOutcome::Loaded,
                NavigationOutcome::Failed("blocked".into())
            ]
        );
    }

    #[test]
    fn test_outcome_into_result() {
        assert!(NavigationOutcome::Loaded.into_result().is_ok());
        let err = NavigationOutcome::Failed("x".into()).into_result().unwrap_err();
        assert!(matches!(err, Error::NavigationSurface { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_display_timeout_fires_once() {
        let surface = FakeSurface::new();
        let executor = NavigationExecutor::new(surface);
        let fired = Arc::new(AtomicUsize::new(0));

        let timer = {
            let fired = Arc::clone(&fired);
            executor.display_timeout(Duration::from_millis(100), move || {
                fired.fetch_add(1, Ordering::SeqCst);
            })
        };

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(timer.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_display_timeout_never_fires() {
        let surface = FakeSurface::new();
        let executor = NavigationExecutor::new(surface);
        let fired = Arc::new(AtomicUsize::new(0));

        let timer = {
            let fired = Arc::clone(&fired);
            executor.display_timeout(Duration::from_millis(100), move || {
                fired.fetch_add(1, Ordering::SeqCst);
            })
        };
        drop(timer);

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_clear_and_reload() {
        let surface = FakeSurface::new();
        let executor = NavigationExecutor::new(surface.clone());

        executor.clear("about:blank");
        assert_eq!(surface.source(), "about:blank");

        executor.reload().unwrap();
        assert_eq!(surface.history.lock().len(), 2);
    }
}
