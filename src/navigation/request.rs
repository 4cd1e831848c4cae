//! Per-attempt navigation record.

use serde::Serialize;

use crate::coordinator::TransportSession;
use crate::identifiers::NavigationId;

// ============================================================================
// NavigationRequest
// ============================================================================

/// One navigation attempt, fixed once encoded.
///
/// Nothing retains these after the surface has been redirected; the core
/// keeps no history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationRequest {
    id: NavigationId,
    raw_input: String,
    resolved_url: String,
    encoded_destination: String,
}

impl NavigationRequest {
    /// Encodes `resolved_url` through the session's rewriter.
    #[must_use]
    pub fn new(
        id: NavigationId,
        raw_input: impl Into<String>,
        resolved_url: impl Into<String>,
        session: &TransportSession,
    ) -> Self {
        let resolved_url = resolved_url.into();
        let encoded_destination = session.rewriter().encode(&resolved_url);

        Self {
            id,
            raw_input: raw_input.into(),
            resolved_url,
            encoded_destination,
        }
    }

    /// Returns the navigation ID.
    #[inline]
    #[must_use]
    pub fn id(&self) -> NavigationId {
        self.id
    }

    /// Returns what the user typed.
    #[inline]
    #[must_use]
    pub fn raw_input(&self) -> &str {
        &self.raw_input
    }

    /// Returns the resolved destination URL.
    #[inline]
    #[must_use]
    pub fn resolved_url(&self) -> &str {
        &self.resolved_url
    }

    /// Returns the surface source: rewriter prefix + encoded URL.
    #[inline]
    #[must_use]
    pub fn encoded_destination(&self) -> &str {
        &self.encoded_destination
    }
}
