//! Readiness state.

use std::fmt;

// ============================================================================
// ReadinessState
// ============================================================================

/// Progress of the coordinator's initialization.
///
/// `Ready` is terminal-success. `Failed` is terminal for the attempt; the
/// next `ensure_ready` call starts again from the beginning.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ReadinessState {
    /// Nothing attempted yet, or reset.
    #[default]
    Idle,
    /// Registering the background worker.
    WorkerRegistering,
    /// Worker active and rewriter config available.
    WorkerReady,
    /// Installing the transport module.
    TransportConfiguring,
    /// Transport module installed.
    TransportReady,
    /// Session cached and shared.
    Ready,
    /// The last attempt failed.
    Failed {
        /// Display form of the failure.
        reason: String,
    },
}

impl ReadinessState {
    /// Returns `true` for [`ReadinessState::Ready`].
    #[inline]
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    /// Returns `true` for [`ReadinessState::Failed`].
    #[inline]
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Returns `true` while an attempt is running.
    #[inline]
    #[must_use]
    pub fn is_in_progress(&self) -> bool {
        matches!(
            self,
            Self::WorkerRegistering
                | Self::WorkerReady
                | Self::TransportConfiguring
                | Self::TransportReady
        )
    }

    /// Short name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::WorkerRegistering => "worker_registering",
            Self::WorkerReady => "worker_ready",
            Self::TransportConfiguring => "transport_configuring",
            Self::TransportReady => "transport_ready",
            Self::Ready => "ready",
            Self::Failed { .. } => "failed",
        }
    }
}

impl fmt::Display for ReadinessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed { reason } => write!(f, "failed: {reason}"),
            other => f.write_str(other.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predicates() {
        assert!(ReadinessState::Ready.is_ready());
        assert!(ReadinessState::TransportConfiguring.is_in_progress());
        assert!(!ReadinessState::Idle.is_in_progress());

        let failed = ReadinessState::Failed {
            reason: "denied".into(),
        };
        assert!(failed.is_failed());
        assert_eq!(failed.to_string(), "failed: denied");
    }
}
