//! Type-safe identifiers for navigation entities.
//!
//! Newtype wrappers prevent mixing incompatible IDs at compile time.
//!
//! | Type | Backing | Source |
//! |------|---------|--------|
//! | [`NavigationId`] | `NonZeroU64` | Process-wide counter |
//! | [`SubscriptionId`] | `NonZeroU64` | Process-wide counter |
//! | [`SessionId`] | `Uuid` | Random (v4) |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Counters
// ============================================================================

static NEXT_NAVIGATION_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_SUBSCRIPTION_ID: AtomicU64 = AtomicU64::new(1);

/// Takes the next value from a counter that starts at 1.
#[inline]
fn take(counter: &AtomicU64) -> NonZeroU64 {
    let value = counter.fetch_add(1, Ordering::Relaxed);
    NonZeroU64::new(value).unwrap_or(NonZeroU64::MIN)
}

// ============================================================================
// NavigationId
// ============================================================================

/// Identifies one navigation attempt.
///
/// Surface events and display timeouts carry the id of the navigation they
/// belong to, so late signals from superseded attempts can be ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NavigationId(NonZeroU64);

impl NavigationId {
    /// Allocates a fresh navigation ID.
    #[inline]
    #[must_use]
    pub fn next() -> Self {
        Self(take(&NEXT_NAVIGATION_ID))
    }

    /// Creates from a raw value. Returns `None` for zero.
    #[inline]
    #[must_use]
    pub fn new(id: u64) -> Option<Self> {
        NonZeroU64::new(id).map(Self)
    }

    /// Returns the raw value.
    #[inline]
    #[must_use]
    pub fn as_u64(&self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for NavigationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "nav-{}", self.0)
    }
}

// ============================================================================
// SubscriptionId
// ============================================================================

/// Identifies a handler registered on a rendering surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(NonZeroU64);

impl SubscriptionId {
    /// Allocates a fresh subscription ID.
    #[inline]
    #[must_use]
    pub fn next() -> Self {
        Self(take(&NEXT_SUBSCRIPTION_ID))
    }

    /// Returns the raw value.
    #[inline]
    #[must_use]
    pub fn as_u64(&self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

// ============================================================================
// SessionId
// ============================================================================

/// Identifies one established transport session.
///
/// A coordinator reset produces a session with a new ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generates a random session ID.
    #[inline]
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    #[inline]
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_ids_are_unique() {
        let a = NavigationId::next();
        let b = NavigationId::next();
        assert_ne!(a, b);
        assert!(b > a);
    }

    #[test]
    fn test_navigation_id_rejects_zero() {
        assert!(NavigationId::new(0).is_none());
        assert_eq!(NavigationId::new(7).map(|id| id.as_u64()), Some(7));
    }

    #[test]
    fn test_display_formats() {
        let nav = NavigationId::new(3).unwrap();
        assert_eq!(nav.to_string(), "nav-3");

        let sub = SubscriptionId::next();
        assert!(sub.to_string().starts_with("sub-"));
    }

    #[test]
    fn test_session_ids_differ() {
        assert_ne!(SessionId::generate(), SessionId::generate());
    }
}
