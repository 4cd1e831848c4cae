//! Host environment collaborators.
//!
//! The core never talks to a browser directly. Everything it needs from the
//! host page is expressed as a trait here and injected as `Arc<dyn Trait>`.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐        ┌──────────────────────────────┐
//! │  ReadinessCoordinator│───────►│ WorkerHost   (register/ready)│
//! │                      │───────►│ RewriterHost (config signal) │
//! │                      │───────►│ TransportFactory → Connection│
//! └──────────────────────┘        └──────────────────────────────┘
//! ┌──────────────────────┐        ┌──────────────────────────────┐
//! │  NavigationExecutor  │───────►│ RenderingSurface (src/events)│
//! └──────────────────────┘        └──────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `location` | Current page URL, security gate inputs, tunnel endpoint |
//! | `rewriter` | Rewriting engine config and its availability signal |
//! | `surface` | Rendering surface trait and handler bookkeeping |
//! | `transport` | Transport factory and connection traits |
//! | `worker` | Background worker registration |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

// ============================================================================
// Submodules
// ============================================================================

/// Current page location.
pub mod location;

/// Rewriting engine configuration.
pub mod rewriter;

/// Rendering surface abstraction.
pub mod surface;

/// Transport library abstraction.
pub mod transport;

/// Background worker registration.
pub mod worker;

// ============================================================================
// Re-exports
// ============================================================================

pub use location::PageLocation;
pub use rewriter::{ConfigSignal, RewriterConfig, RewriterHost, StaticRewriter};
pub use surface::{HandlerSet, RenderingSurface, SurfaceEvent, SurfaceHandler};
pub use transport::{TransportConnection, TransportFactory, TransportOptions};
pub use worker::{Registration, RegistrationOptions, WorkerHost, WorkerState};

// ============================================================================
// Environment
// ============================================================================

/// Collaborators the readiness coordinator depends on.
#[derive(Clone)]
pub struct Environment {
    /// Page the client is served from.
    pub location: PageLocation,
    /// Background worker registration mechanism.
    pub worker: Arc<dyn WorkerHost>,
    /// Rewriting engine config source.
    pub rewriter: Arc<dyn RewriterHost>,
    /// Transport library entry point.
    pub transport: Arc<dyn TransportFactory>,
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}
