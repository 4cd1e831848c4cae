//! Scoped guards held for the lifetime of one navigation.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::environment::RenderingSurface;
use crate::identifiers::SubscriptionId;

// ============================================================================
// SurfaceSubscription
// ============================================================================

/// Handler registration on a rendering surface.
///
/// Unsubscribes when dropped.
pub struct SurfaceSubscription {
    surface: Arc<dyn RenderingSurface>,
    id: Option<SubscriptionId>,
}

impl SurfaceSubscription {
    pub(crate) fn new(surface: Arc<dyn RenderingSurface>, id: SubscriptionId) -> Self {
        Self {
            surface,
            id: Some(id),
        }
    }

    /// Returns the subscription ID.
    #[inline]
    #[must_use]
    pub fn id(&self) -> Option<SubscriptionId> {
        self.id
    }

    /// Detaches the handler now.
    pub fn dispose(mut self) {
        self.detach();
    }

    fn detach(&mut self) {
        if let Some(id) = self.id.take() {
            self.surface.unsubscribe(id);
            trace!(subscription_id = %id, "Surface handler detached");
        }
    }
}

impl Drop for SurfaceSubscription {
    fn drop(&mut self) {
        self.detach();
    }
}

impl fmt::Debug for SurfaceSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfaceSubscription")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// DisplayTimer
// ============================================================================

/// Advisory timer that clears the loading indicator.
///
/// Never cancels or fails the navigation. Aborted when dropped.
pub struct DisplayTimer {
    handle: JoinHandle<()>,
    after: Duration,
}

impl DisplayTimer {
    /// Spawns a task that runs `on_elapsed` after `after`.
    pub(crate) fn spawn<F>(after: Duration, on_elapsed: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(after).await;
            debug!(after_ms = after.as_millis() as u64, "Display timeout elapsed");
            on_elapsed();
        });

        Self { handle, after }
    }

    /// Returns the configured delay.
    #[inline]
    #[must_use]
    pub fn after(&self) -> Duration {
        self.after
    }

    /// Returns `true` once the timer fired or was cancelled.
    #[inline]
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Cancels the timer.
    pub fn cancel(self) {
        self.handle.abort();
    }
}

impl Drop for DisplayTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

impl fmt::Debug for DisplayTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisplayTimer")
            .field("after", &self.after)
            .field("finished", &self.is_finished())
            .finish()
    }
}
