//! Navigation execution.
//!
//! Turns a resolved destination into the rendering surface's source and
//! reports the surface's load/error signals back up.
//!
//! # Lifecycle
//!
//! 1. [`NavigationExecutor::observe`] - attach a handler for this navigation
//! 2. [`NavigationExecutor::display_timeout`] - arm the UI-only fallback
//! 3. [`NavigationExecutor::navigate`] - set the request's `prefix + encode(url)` as source
//! 4. Drop the [`SurfaceSubscription`] and [`DisplayTimer`] when superseded
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `executor` | [`NavigationExecutor`] |
//! | `request` | [`NavigationRequest`] |
//! | `subscription` | Scoped guards: [`SurfaceSubscription`], [`DisplayTimer`] |

// ============================================================================
// Submodules
// ============================================================================

/// Surface driver.
pub mod executor;

/// Per-attempt navigation record.
pub mod request;

/// Scoped subscription and timer guards.
pub mod subscription;

// ============================================================================
// Re-exports
// ============================================================================

pub use executor::{NavigationExecutor, NavigationOutcome};
pub use request::NavigationRequest;
pub use subscription::{DisplayTimer, SurfaceSubscription};
