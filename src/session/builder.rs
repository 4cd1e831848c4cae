//! Builder pattern for controller construction.
//!
//! # Example
//!
//! ```ignore
//! let controller = SessionController::builder()
//!     .config(SessionConfig::default())
//!     .environment(env)
//!     .surface(surface)
//!     .user_agent("Mozilla/5.0 (iPhone; ...)")
//!     .build()?;
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use crate::config::{Platform, SessionConfig};
use crate::coordinator::ReadinessCoordinator;
use crate::environment::{Environment, RenderingSurface};
use crate::error::{Error, Result};

use super::controller::SessionController;

// ============================================================================
// SessionControllerBuilder
// ============================================================================

/// Builder for a [`SessionController`].
///
/// Use [`SessionController::builder()`] to create one.
#[derive(Default, Clone)]
pub struct SessionControllerBuilder {
    /// Configuration; defaults when unset.
    config: Option<SessionConfig>,
    /// Collaborators for a new coordinator.
    environment: Option<Environment>,
    /// Existing coordinator to share.
    coordinator: Option<ReadinessCoordinator>,
    /// Rendering surface to drive.
    surface: Option<Arc<dyn RenderingSurface>>,
    /// Platform class for timing.
    platform: Platform,
}

impl fmt::Debug for SessionControllerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionControllerBuilder")
            .field("config", &self.config)
            .field("environment", &self.environment)
            .field("coordinator", &self.coordinator.is_some())
            .field("surface", &self.surface.is_some())
            .field("platform", &self.platform)
            .finish()
    }
}

// ============================================================================
// SessionControllerBuilder Implementation
// ============================================================================

impl SessionControllerBuilder {
    /// Creates an empty builder.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration.
    #[inline]
    #[must_use]
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the collaborators; a fresh coordinator is created from them.
    #[inline]
    #[must_use]
    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Shares an existing coordinator instead of creating one.
    #[inline]
    #[must_use]
    pub fn coordinator(mut self, coordinator: ReadinessCoordinator) -> Self {
        self.coordinator = Some(coordinator);
        self
    }

    /// Sets the rendering surface.
    #[inline]
    #[must_use]
    pub fn surface(mut self, surface: Arc<dyn RenderingSurface>) -> Self {
        self.surface = Some(surface);
        self
    }

    /// Derives the platform from a user agent string.
    #[inline]
    #[must_use]
    pub fn user_agent(mut self, user_agent: &str) -> Self {
        self.platform = Platform::detect(user_agent);
        self
    }

    /// Sets the platform directly.
    #[inline]
    #[must_use]
    pub fn platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Builds the controller with validation.
    ///
    /// A shared coordinator brings its own configuration and collaborators.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if neither environment nor coordinator is set
    /// - [`Error::Config`] if a coordinator is combined with an environment or a config
    /// - [`Error::Config`] if the surface is not set
    /// - [`Error::Config`] if the configuration is invalid
    pub fn build(self) -> Result<SessionController> {
        let surface = self.surface.ok_or_else(|| {
            Error::config(
                "Rendering surface is required. Use .surface() to set it.\n\
                 Example: SessionController::builder().surface(frame)",
            )
        })?;

        let (config, coordinator) = match (self.coordinator, self.environment, self.config) {
            (Some(_), Some(_), _) => {
                return Err(Error::config(
                    "Use either .environment() or .coordinator(), not both.",
                ));
            }
            (Some(_), None, Some(_)) => {
                return Err(Error::config(
                    "A shared coordinator carries its own config; drop .config().",
                ));
            }
            (Some(coordinator), None, None) => (coordinator.config().clone(), coordinator),
            (None, Some(environment), config) => {
                let config = config.unwrap_or_default();
                let coordinator = ReadinessCoordinator::new(environment, config.clone());
                (config, coordinator)
            }
            (None, None, _) => {
                return Err(Error::config(
                    "Environment is required. Use .environment() or .coordinator() to set it.",
                ));
            }
        };
        config.validate()?;

        Ok(SessionController::new(
            config,
            self.platform,
            coordinator,
            surface,
        ))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeSurface, SECURE_PAGE, fixture};

    #[test]
    fn test_build_fails_without_surface() {
        let fx = fixture(SECURE_PAGE);
        let err = SessionControllerBuilder::new()
            .environment(fx.env)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("surface"));
    }

    #[test]
    fn test_build_fails_without_environment() {
        let err = SessionControllerBuilder::new()
            .surface(FakeSurface::new())
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("Environment"));
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let fx = fixture(SECURE_PAGE);
        let mut config = SessionConfig::default();
        config.search_template = "https://search.example/".into();

        let result = SessionControllerBuilder::new()
            .config(config)
            .environment(fx.env)
            .surface(FakeSurface::new())
            .build();
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_user_agent_sets_platform() {
        let builder = SessionControllerBuilder::new().user_agent("Mozilla/5.0 (Linux; Android 14)");
        assert_eq!(builder.platform, Platform::Mobile);
    }

    #[test]
    fn test_coordinator_excludes_environment_and_config() {
        let fx = fixture(SECURE_PAGE);
        let coordinator = ReadinessCoordinator::new(fx.env.clone(), SessionConfig::default());

        let err = SessionControllerBuilder::new()
            .environment(fx.env.clone())
            .coordinator(coordinator.clone())
            .surface(FakeSurface::new())
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("not both"));

        let err = SessionControllerBuilder::new()
            .config(SessionConfig::default())
            .coordinator(coordinator)
            .surface(FakeSurface::new())
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_shared_coordinator_config_is_used() {
        let fx = fixture(SECURE_PAGE);
        let config = SessionConfig::builder().settle_delay_ms(50).build().unwrap();
        let coordinator = ReadinessCoordinator::new(fx.env, config);

        let controller = SessionControllerBuilder::new()
            .coordinator(coordinator)
            .surface(FakeSurface::new())
            .build()
            .unwrap();
        assert_eq!(controller.timing().settle_delay.as_millis(), 50);
    }

    #[tokio::test]
    async fn test_shared_coordinator() {
        let fx = fixture(SECURE_PAGE);
        let coordinator = ReadinessCoordinator::new(fx.env, SessionConfig::default());

        let a = SessionControllerBuilder::new()
            .coordinator(coordinator.clone())
            .surface(FakeSurface::new())
            .build()
            .unwrap();
        let b = SessionControllerBuilder::new()
            .coordinator(coordinator)
            .surface(FakeSurface::new())
            .build()
            .unwrap();

        assert_eq!(a.coordinator().state(), b.coordinator().state());
    }
}
