//! Error types for tunnel navigation.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use tunnel_nav::{Result, SessionController};
//!
//! async fn example(controller: &SessionController) -> Result<()> {
//!     controller.search("example.com").await?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Worker | [`Error::WorkerUnsupported`], [`Error::WorkerRegistration`], [`Error::InsecureOrigin`] |
//! | Transport | [`Error::TransportConfiguration`] |
//! | Surface | [`Error::SurfaceMissing`], [`Error::NavigationSurface`] |
//! | Configuration | [`Error::Config`], [`Error::InvalidUrl`] |
//! | Execution | [`Error::Timeout`] |
//! | External | [`Error::Json`] |
//!
//! `Error` is `Clone`: a single failed readiness attempt is delivered to
//! every caller that was waiting on it.

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;

use thiserror::Error;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// User-Facing Messages
// ============================================================================

/// Shown when the background worker cannot be brought up.
pub const WORKER_FAILURE_MESSAGE: &str = "Failed to register service worker.";

/// Shown when the tunnel transport cannot be configured.
pub const TRANSPORT_FAILURE_MESSAGE: &str = "Failed to configure proxy transport.";

/// Shown when the rendering surface reports a load failure.
pub const SURFACE_FAILURE_MESSAGE: &str = "Failed to load the requested page. Please try again.";

/// Shown for anything else that stops a navigation.
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to navigate to the requested URL.";

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for debugging.
#[derive(Error, Debug, Clone)]
pub enum Error {
    // ========================================================================
    // Worker Errors
    // ========================================================================
    /// Host environment cannot run background workers.
    #[error("Service workers are not supported in this environment")]
    WorkerUnsupported,

    /// Worker registration or activation failed.
    ///
    /// Returned when `register` or the ready wait rejects.
    #[error("Worker registration failed: {message}")]
    WorkerRegistration {
        /// Description of the registration failure.
        message: String,
    },

    /// Page served over an insecure origin that is not allow-listed.
    ///
    /// This is a security gate, never retried automatically.
    #[error("Service workers cannot be registered without https (host: {host})")]
    InsecureOrigin {
        /// Hostname of the page that was rejected.
        host: String,
    },

    // ========================================================================
    // Transport Errors
    // ========================================================================
    /// Transport connection or module configuration failed.
    #[error("Transport configuration failed: {message}")]
    TransportConfiguration {
        /// Description of the transport failure.
        message: String,
    },

    // ========================================================================
    // Surface Errors
    // ========================================================================
    /// The rendering surface is not present.
    #[error("Rendering surface not found")]
    SurfaceMissing,

    /// The rendering surface reported a load failure.
    ///
    /// Invalidates only the navigation attempt, never the transport session.
    #[error("Navigation failed: {message}")]
    NavigationSurface {
        /// Message reported by the surface.
        message: String,
    },

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when session configuration is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// A URL could not be parsed.
    #[error("Invalid URL '{input}': {message}")]
    InvalidUrl {
        /// The rejected input.
        input: String,
        /// Parser message.
        message: String,
    },

    // ========================================================================
    // Execution Errors
    // ========================================================================
    /// Operation timeout.
    ///
    /// Returned when a collaborator does not answer in time.
    #[error("Timeout after {timeout_ms}ms: {operation}")]
    Timeout {
        /// Description of the operation that timed out.
        operation: String,
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// JSON deserialization error.
    #[error("JSON error: {message}")]
    Json {
        /// Message from serde_json.
        message: String,
    },
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a worker registration error.
    #[inline]
    pub fn worker_registration(message: impl Into<String>) -> Self {
        Self::WorkerRegistration {
            message: message.into(),
        }
    }

    /// Creates an insecure origin error.
    #[inline]
    pub fn insecure_origin(host: impl Into<String>) -> Self {
        Self::InsecureOrigin { host: host.into() }
    }

    /// Creates a transport configuration error.
    #[inline]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::TransportConfiguration {
            message: message.into(),
        }
    }

    /// Creates a navigation surface error.
    #[inline]
    pub fn navigation_surface(message: impl Into<String>) -> Self {
        Self::NavigationSurface {
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates an invalid URL error.
    #[inline]
    pub fn invalid_url(input: impl Into<String>, err: url::ParseError) -> Self {
        Self::InvalidUrl {
            input: input.into(),
            message: err.to_string(),
        }
    }

    /// Creates a timeout error.
    #[inline]
    pub fn timeout(operation: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout_ms,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Json {
            message: err.to_string(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if the background worker could not be brought up.
    ///
    /// Insecure-origin rejections count as registration errors.
    #[inline]
    #[must_use]
    pub fn is_worker_error(&self) -> bool {
        matches!(
            self,
            Self::WorkerUnsupported | Self::WorkerRegistration { .. } | Self::InsecureOrigin { .. }
        )
    }

    /// Returns `true` if this is a registration failure (including the security gate).
    #[inline]
    #[must_use]
    pub fn is_registration_error(&self) -> bool {
        matches!(
            self,
            Self::WorkerRegistration { .. } | Self::InsecureOrigin { .. }
        )
    }

    /// Returns `true` if this is a transport error.
    #[inline]
    #[must_use]
    pub fn is_transport_error(&self) -> bool {
        matches!(self, Self::TransportConfiguration { .. })
    }

    /// Returns `true` if this is a rendering surface error.
    #[inline]
    #[must_use]
    pub fn is_surface_error(&self) -> bool {
        matches!(self, Self::SurfaceMissing | Self::NavigationSurface { .. })
    }

    /// Returns `true` if a fresh, user-initiated attempt may succeed.
    ///
    /// Environment capability and security-gate failures are permanent.
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            Self::WorkerUnsupported | Self::InsecureOrigin { .. } | Self::Config { .. }
        )
    }

    /// Returns the user-facing message for this error's category.
    ///
    /// Raw error text is never shown to the end user through this path.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::WorkerUnsupported
            | Self::WorkerRegistration { .. }
            | Self::InsecureOrigin { .. } => WORKER_FAILURE_MESSAGE,
            Self::TransportConfiguration { .. } => TRANSPORT_FAILURE_MESSAGE,
            Self::NavigationSurface { .. } => SURFACE_FAILURE_MESSAGE,
            _ => GENERIC_FAILURE_MESSAGE,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::transport("socket closed");
        assert_eq!(
            err.to_string(),
            "Transport configuration failed: socket closed"
        );
    }

    #[test]
    fn test_insecure_origin_display() {
        let err = Error::insecure_origin("example.net");
        assert!(err.to_string().contains("https"));
        assert!(err.to_string().contains("example.net"));
    }

    #[test]
    fn test_insecure_origin_is_registration_error() {
        let err = Error::insecure_origin("example.net");
        assert!(err.is_registration_error());
        assert!(err.is_worker_error());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_is_transport_error() {
        assert!(Error::transport("x").is_transport_error());
        assert!(!Error::WorkerUnsupported.is_transport_error());
    }

    #[test]
    fn test_is_surface_error() {
        assert!(Error::SurfaceMissing.is_surface_error());
        assert!(Error::navigation_surface("blocked").is_surface_error());
        assert!(!Error::config("x").is_surface_error());
    }

    #[test]
    fn test_user_message_per_category() {
        assert_eq!(
            Error::worker_registration("boom").user_message(),
            WORKER_FAILURE_MESSAGE
        );
        assert_eq!(
            Error::transport("boom").user_message(),
            TRANSPORT_FAILURE_MESSAGE
        );
        assert_eq!(
            Error::navigation_surface("boom").user_message(),
            SURFACE_FAILURE_MESSAGE
        );
        assert_eq!(Error::SurfaceMissing.user_message(), GENERIC_FAILURE_MESSAGE);
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<String>("invalid").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json { .. }));
    }

    #[test]
    fn test_error_is_clone() {
        let err = Error::timeout("rewriter config", 100);
        let cloned = err.clone();
        assert_eq!(err.to_string(), cloned.to_string());
    }
}
