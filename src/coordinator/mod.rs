//! Readiness coordination.
//!
//! Brings the background worker and the transport session to a usable state
//! exactly once, shares that state across navigations, and can be reset.
//!
//! # State Machine
//!
//! ```text
//! Idle → WorkerRegistering → WorkerReady → TransportConfiguring → TransportReady → Ready
//!   ▲            │                │                 │                   │
//!   │            └────────────────┴─────────────────┴───────────────────┴──► Failed(reason)
//!   └──────────────────────────── reset() ◄─────────────────────────────────────┘
//! ```
//!
//! A failed attempt is not sticky: the next `ensure_ready` starts over.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `core` | [`ReadinessCoordinator`] and the single-flight attempt |
//! | `session` | [`TransportSession`] handed to navigations |
//! | `state` | [`ReadinessState`] |

// ============================================================================
// Submodules
// ============================================================================

/// Coordinator implementation.
pub mod core;

/// Established transport session.
pub mod session;

/// Readiness state enum.
pub mod state;

// ============================================================================
// Re-exports
// ============================================================================

pub use self::core::ReadinessCoordinator;
pub use session::TransportSession;
pub use state::ReadinessState;
