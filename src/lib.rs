//! Tunnel Nav - Readiness and navigation orchestration for a tunneled web proxy.
//!
//! This library drives the client side of a proxy whose pages are fetched
//! through a background worker and a tunnel transport, and displayed in an
//! embedded rendering surface.
//!
//! # Architecture
//!
//! A navigation flows through four components:
//!
//! - **Resolver**: turns free-form input into a destination URL
//! - **Coordinator**: registers the worker and configures the transport,
//!   once, shared by every navigation
//! - **Executor**: points the surface at `prefix + encode(url)`
//! - **Controller**: sequences the above and owns the UI state
//!
//! The host page (worker API, rewriter config, transport client, frame)
//! is abstracted behind the traits in [`environment`].
//!
//! Key design principles:
//!
//! - Concurrent callers share one initialization attempt
//! - A failed attempt is reported to every waiter and never cached
//! - A newer search supersedes an older one
//! - The display timeout only clears the spinner, it never fails a navigation
//!
//! # Quick Start
//!
//! ```ignore
//! use tunnel_nav::{Environment, Result, SessionController};
//!
//! async fn run(env: Environment, frame: Arc<dyn RenderingSurface>) -> Result<()> {
//!     let controller = SessionController::builder()
//!         .environment(env)
//!         .surface(frame)
//!         .user_agent(user_agent)
//!         .build()?;
//!
//!     controller.search("best pizza near me").await?;
//!     controller.go_home();
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`codec`] | URL codecs used by the rewriter |
//! | [`config`] | [`SessionConfig`] and platform timing |
//! | [`coordinator`] | [`ReadinessCoordinator`] and [`TransportSession`] |
//! | [`environment`] | Host collaborator traits |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`navigation`] | [`NavigationExecutor`] and navigation guards |
//! | [`resolver`] | Input classification and [`UrlResolver`] |
//! | [`session`] | [`SessionController`] and UI state |

// ============================================================================
// Modules
// ============================================================================

/// URL codecs.
pub mod codec;

/// Session configuration.
///
/// Use [`SessionConfig::builder()`] for programmatic setup or
/// [`SessionConfig::from_json()`] for embedded config blocks.
pub mod config;

/// Readiness coordination.
///
/// One worker registration and one transport configuration per session.
pub mod coordinator;

/// Host environment abstractions.
///
/// - [`WorkerHost`] - Background worker registration
/// - [`RewriterHost`] - Rewriter config published by the host page
/// - [`TransportFactory`] - Transport client connections
/// - [`RenderingSurface`] - The frame navigations are shown in
pub mod environment;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers.
pub mod identifiers;

/// Surface navigation.
pub mod navigation;

/// Input resolution.
pub mod resolver;

/// User-facing session control.
pub mod session;

#[cfg(test)]
mod testing;

// ============================================================================
// Re-exports
// ============================================================================

// Codec types
pub use codec::{Base64Codec, PlainCodec, UrlCodec, XorCodec};

// Config types
pub use config::{Platform, SessionConfig, SessionConfigBuilder, Timing};

// Coordinator types
pub use coordinator::{ReadinessCoordinator, ReadinessState, TransportSession};

// Environment types
pub use environment::{
    ConfigSignal, Environment, HandlerSet, PageLocation, Registration, RegistrationOptions,
    RenderingSurface, RewriterConfig, RewriterHost, StaticRewriter, SurfaceEvent, SurfaceHandler,
    TransportConnection, TransportFactory, TransportOptions, WorkerHost, WorkerState,
};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{NavigationId, SessionId, SubscriptionId};

// Navigation types
pub use navigation::{NavigationExecutor, NavigationOutcome, NavigationRequest};

// Resolver types
pub use resolver::{InputKind, UrlResolver, classify, resolve};

// Session types
pub use session::{SessionController, SessionControllerBuilder, SessionSnapshot, SessionUiState};
