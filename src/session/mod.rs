//! User-facing session control.
//!
//! The [`SessionController`] owns what the UI shows and sequences one
//! navigation: resolve → ensure ready → settle → navigate.
//!
//! # State Machine
//!
//! ```text
//! Home ──search──► Loading ──(load | display timeout)──► Active
//!  ▲                  │                                    │
//!  └──(failure, error set)                                 │
//!  └───────────────────────────── go_home ◄────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! let controller = SessionController::builder()
//!     .environment(env)
//!     .surface(surface)
//!     .user_agent(user_agent)
//!     .build()?;
//!
//! controller.search("example.com").await?;
//! controller.go_home();
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `builder` | [`SessionControllerBuilder`] |
//! | `controller` | [`SessionController`] |
//! | `state` | [`SessionUiState`], [`SessionSnapshot`] |

// ============================================================================
// Submodules
// ============================================================================

/// Fluent controller construction.
pub mod builder;

/// Controller implementation.
pub mod controller;

/// UI-visible state.
pub mod state;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::SessionControllerBuilder;
pub use controller::SessionController;
pub use state::{SessionSnapshot, SessionUiState};
