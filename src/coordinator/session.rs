//! Established transport session.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use url::Url;

use crate::environment::{Registration, RewriterConfig, TransportConnection};
use crate::identifiers::SessionId;

// ============================================================================
// TransportSession
// ============================================================================

/// Everything a navigation needs once the coordinator is `Ready`.
///
/// Cheap to clone; all clones share one connection handle.
#[derive(Clone)]
pub struct TransportSession {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    id: SessionId,
    connection: Arc<dyn TransportConnection>,
    endpoint: Url,
    module: String,
    rewriter: RewriterConfig,
    registration: Registration,
}

impl TransportSession {
    /// Assembles a session. Only the coordinator builds these.
    pub(crate) fn new(
        connection: Arc<dyn TransportConnection>,
        endpoint: Url,
        module: String,
        rewriter: RewriterConfig,
        registration: Registration,
    ) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                id: SessionId::generate(),
                connection,
                endpoint,
                module,
                rewriter,
                registration,
            }),
        }
    }

    /// Returns the session ID.
    #[inline]
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.inner.id
    }

    /// Returns the transport connection handle.
    #[inline]
    #[must_use]
    pub fn connection(&self) -> &Arc<dyn TransportConnection> {
        &self.inner.connection
    }

    /// Returns the tunnel endpoint the transport was configured with.
    #[inline]
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.inner.endpoint
    }

    /// Returns the installed transport module.
    #[inline]
    #[must_use]
    pub fn module(&self) -> &str {
        &self.inner.module
    }

    /// Returns the rewriting engine config.
    #[inline]
    #[must_use]
    pub fn rewriter(&self) -> &RewriterConfig {
        &self.inner.rewriter
    }

    /// Returns the active worker registration.
    #[inline]
    #[must_use]
    pub fn registration(&self) -> &Registration {
        &self.inner.registration
    }

    /// Returns `true` if both handles refer to the same session.
    #[inline]
    #[must_use]
    pub fn same_session(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for TransportSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportSession")
            .field("id", &self.inner.id)
            .field("endpoint", &self.inner.endpoint.as_str())
            .field("module", &self.inner.module)
            .field("rewriter", &self.inner.rewriter)
            .finish_non_exhaustive()
    }
}
