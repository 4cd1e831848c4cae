//! Rendering surface abstraction.
//!
//! A rendering surface is an embedded document host with a mutable source
//! and `load` / `error` signals. Handlers are registered by id and removed by
//! id; [`HandlerSet`] is the bookkeeping most implementations need.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::error::Result;
use crate::identifiers::SubscriptionId;

// ============================================================================
// Types
// ============================================================================

/// Signal emitted by a rendering surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    /// The document finished loading.
    Load,
    /// The document failed to load.
    Error {
        /// Message reported by the surface.
        message: String,
    },
}

/// Handler callback type.
///
/// Called for each event emitted by the surface.
pub type SurfaceHandler = Arc<dyn Fn(SurfaceEvent) + Send + Sync>;

// ============================================================================
// RenderingSurface
// ============================================================================

/// An embedded document host the client navigates.
pub trait RenderingSurface: Send + Sync {
    /// Returns `true` if the surface is present in the document.
    fn is_attached(&self) -> bool;

    /// Returns the current source.
    fn source(&self) -> String;

    /// Replaces the source. Completion is reported through events.
    fn set_source(&self, source: &str) -> Result<()>;

    /// Registers an event handler.
    fn subscribe(&self, handler: SurfaceHandler) -> SubscriptionId;

    /// Removes a previously registered handler. Unknown ids are ignored.
    fn unsubscribe(&self, id: SubscriptionId);
}

// ============================================================================
// HandlerSet
// ============================================================================

/// Id-keyed set of surface handlers.
#[derive(Default)]
pub struct HandlerSet {
    handlers: Mutex<FxHashMap<SubscriptionId, SurfaceHandler>>,
}

impl HandlerSet {
    /// Creates an empty set.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a handler and returns its id.
    pub fn insert(&self, handler: SurfaceHandler) -> SubscriptionId {
        let id = SubscriptionId::next();
        self.handlers.lock().insert(id, handler);
        trace!(subscription_id = %id, "Surface handler added");
        id
    }

    /// Removes a handler. Returns `true` if it was present.
    pub fn remove(&self, id: SubscriptionId) -> bool {
        let removed = self.handlers.lock().remove(&id).is_some();
        trace!(subscription_id = %id, removed, "Surface handler removed");
        removed
    }

    /// Returns the number of registered handlers.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.lock().len()
    }

    /// Returns `true` if no handler is registered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.lock().is_empty()
    }

    /// Delivers `event` to every handler.
    ///
    /// Handlers run outside the lock and may unsubscribe themselves.
    pub fn emit(&self, event: SurfaceEvent) {
        let handlers: Vec<SurfaceHandler> = self.handlers.lock().values().cloned().collect();
        for handler in handlers {
            handler(event.clone());
        }
    }
}

impl fmt::Debug for HandlerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerSet")
            .field("len", &self.len())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn test_emit_reaches_all_handlers() {
        let set = HandlerSet::new();
        let hits = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let hits = Arc::clone(&hits);
            set.insert(Arc::new(move |_| {
                hits.fetch_add(1, Ordering::SeqCst);
            }));
        }

        set.emit(SurfaceEvent::Load);
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_removed_handler_not_called() {
        let set = HandlerSet::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let id = {
            let hits = Arc::clone(&hits);
            set.insert(Arc::new(move |_| {
                hits.fetch_add(1, Ordering::SeqCst);
            }))
        };

        assert!(set.remove(id));
        assert!(!set.remove(id));
        assert!(set.is_empty());

        set.emit(SurfaceEvent::Load);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_handler_may_unsubscribe_itself() {
        let set = Arc::new(HandlerSet::new());
        let slot: Arc<Mutex<Option<SubscriptionId>>> = Arc::new(Mutex::new(None));

        let handle = Arc::clone(&set);
        let pending = Arc::clone(&slot);
        let id = set.insert(Arc::new(move |_| {
            if let Some(id) = *pending.lock() {
                handle.remove(id);
            }
        }));
        *slot.lock() = Some(id);

        set.emit(SurfaceEvent::Error {
            message: "net::ERR_FAILED".into(),
        });
        assert!(set.is_empty());
    }
}
