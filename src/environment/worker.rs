//! Background worker registration.

use async_trait::async_trait;

use crate::error::Result;

// ============================================================================
// Types
// ============================================================================

/// Options passed to [`WorkerHost::register`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationOptions {
    /// URL scope the worker controls, e.g. `/uv/`.
    pub scope: String,
}

impl RegistrationOptions {
    /// Creates options for the given scope.
    #[inline]
    #[must_use]
    pub fn scope(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
        }
    }
}

/// Lifecycle state of a registered worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Script is being installed.
    Installing,
    /// Installed but not yet controlling requests.
    Installed,
    /// Activation in progress.
    Activating,
    /// Active: requests in scope are intercepted.
    Activated,
    /// Replaced or failed.
    Redundant,
}

/// A worker registration as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// Scope the registration controls.
    pub scope: String,
    /// Script the registration runs.
    pub script: String,
    /// Current lifecycle state.
    pub state: WorkerState,
}

impl Registration {
    /// Returns `true` once the worker intercepts requests.
    ///
    /// Installed-but-inactive registrations do not count.
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == WorkerState::Activated
    }
}

// ============================================================================
// WorkerHost
// ============================================================================

/// Host mechanism for registering the request-rewriting worker.
#[async_trait]
pub trait WorkerHost: Send + Sync {
    /// Returns `true` if the host can run background workers at all.
    fn is_supported(&self) -> bool;

    /// Registers `script_path` at the given scope.
    async fn register(
        &self,
        script_path: &str,
        options: RegistrationOptions,
    ) -> Result<Registration>;

    /// Resolves once a registration for `scope` is active.
    async fn ready(&self, scope: &str) -> Result<Registration>;
}
