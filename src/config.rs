//! Session configuration.
//!
//! Every path, delay and template the core uses lives here, so branding and
//! deployment differences are configuration rather than separate code paths.
//!
//! # Example
//!
//! ```no_run
//! use tunnel_nav::SessionConfig;
//!
//! # fn example() -> tunnel_nav::Result<()> {
//! let config = SessionConfig::builder()
//!     .search_template("https://duckduckgo.com/?q=%s")
//!     .settle_delay_ms(150)
//!     .build()?;
//!
//! let from_file = SessionConfig::from_json(r#"{ "workerScope": "/uv/" }"#)?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Placeholder replaced by the percent-encoded query.
pub const QUERY_PLACEHOLDER: &str = "%s";

/// Default search template.
pub const DEFAULT_SEARCH_TEMPLATE: &str = "https://www.google.com/search?q=%s";

/// User agents that get the longer mobile timings.
static MOBILE_UA: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)Android|webOS|iPhone|iPad|iPod|BlackBerry|IEMobile|Opera Mini").ok()
});

// ============================================================================
// Platform
// ============================================================================

/// Coarse platform class derived from the user agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Desktop browser.
    #[default]
    Desktop,
    /// Mobile browser. Worker activation is slower here.
    Mobile,
}

impl Platform {
    /// Classifies a user agent string.
    #[must_use]
    pub fn detect(user_agent: &str) -> Self {
        let mobile = MOBILE_UA
            .as_ref()
            .is_some_and(|re| re.is_match(user_agent));

        if mobile { Self::Mobile } else { Self::Desktop }
    }

    /// Returns `true` for [`Platform::Mobile`].
    #[inline]
    #[must_use]
    pub fn is_mobile(&self) -> bool {
        matches!(self, Self::Mobile)
    }
}

// ============================================================================
// Timing
// ============================================================================

/// Platform-specific delays applied by the session controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Wait between readiness and navigation.
    pub settle_delay: Duration,
    /// Time after which the loading indicator clears without a load event.
    pub display_timeout: Duration,
}

// ============================================================================
// SessionConfig
// ============================================================================

/// Client configuration.
///
/// Deserializes from camelCase JSON; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionConfig {
    /// Search URL with a `%s` placeholder.
    pub search_template: String,

    /// Worker script registered with the host.
    pub worker_script: String,

    /// Scope the worker is registered at.
    pub worker_scope: String,

    /// Hostnames allowed to register workers over plain `http`.
    pub insecure_allowed_hosts: Vec<String>,

    /// Shared worker script of the transport library.
    pub transport_worker: String,

    /// Transport module installed into the transport library.
    pub transport_module: String,

    /// Path of the tunnel endpoint on the page origin.
    pub tunnel_path: String,

    /// Pause enforced after a coordinator reset.
    pub reinit_cooldown_ms: u64,

    /// Settle delay on desktop.
    pub settle_delay_ms: u64,

    /// Settle delay on mobile.
    pub mobile_settle_delay_ms: u64,

    /// Display timeout on desktop.
    pub display_timeout_ms: u64,

    /// Display timeout on mobile.
    pub mobile_display_timeout_ms: u64,

    /// Bound on the wait for the rewriter config.
    pub config_timeout_ms: u64,

    /// Source the surface is reset to when returning home.
    pub blank_source: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            search_template: DEFAULT_SEARCH_TEMPLATE.to_string(),
            worker_script: "/uv/sw.js".to_string(),
            worker_scope: "/uv/".to_string(),
            insecure_allowed_hosts: vec!["localhost".to_string(), "127.0.0.1".to_string()],
            transport_worker: "/baremux/worker.js".to_string(),
            transport_module: "/epoxy/index.mjs".to_string(),
            tunnel_path: "/wisp/".to_string(),
            reinit_cooldown_ms: 500,
            settle_delay_ms: 200,
            mobile_settle_delay_ms: 1000,
            display_timeout_ms: 5000,
            mobile_display_timeout_ms: 10_000,
            config_timeout_ms: 10_000,
            blank_source: "about:blank".to_string(),
        }
    }
}

impl SessionConfig {
    /// Creates a configuration builder.
    #[inline]
    #[must_use]
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::new()
    }

    /// Parses and validates a JSON configuration.
    ///
    /// # Errors
    ///
    /// - [`Error::Json`] if the document is malformed
    /// - [`Error::Config`] if a value is invalid
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        debug!(scope = %config.worker_scope, "Loaded session config from JSON");
        Ok(config)
    }

    /// Returns the delays for `platform`.
    #[must_use]
    pub fn timing(&self, platform: Platform) -> Timing {
        let (settle, display) = match platform {
            Platform::Desktop => (self.settle_delay_ms, self.display_timeout_ms),
            Platform::Mobile => (self.mobile_settle_delay_ms, self.mobile_display_timeout_ms),
        };

        Timing {
            settle_delay: Duration::from_millis(settle),
            display_timeout: Duration::from_millis(display),
        }
    }

    /// Returns the reset cooldown.
    #[inline]
    #[must_use]
    pub fn reinit_cooldown(&self) -> Duration {
        Duration::from_millis(self.reinit_cooldown_ms)
    }

    /// Returns the rewriter config wait bound.
    #[inline]
    #[must_use]
    pub fn config_timeout(&self) -> Duration {
        Duration::from_millis(self.config_timeout_ms)
    }

    /// Checks every field.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if !self.search_template.contains(QUERY_PLACEHOLDER) {
            return Err(Error::config(format!(
                "Search template must contain '{}': {}",
                QUERY_PLACEHOLDER, self.search_template
            )));
        }

        for (name, path) in [
            ("workerScript", &self.worker_script),
            ("workerScope", &self.worker_scope),
            ("transportWorker", &self.transport_worker),
            ("transportModule", &self.transport_module),
            ("tunnelPath", &self.tunnel_path),
        ] {
            if !path.starts_with('/') {
                return Err(Error::config(format!(
                    "{name} must be an absolute path, got '{path}'"
                )));
            }
        }

        if self.blank_source.is_empty() {
            return Err(Error::config("blankSource must not be empty"));
        }

        if self.config_timeout_ms == 0 {
            return Err(Error::config("configTimeoutMs must be greater than zero"));
        }

        Ok(())
    }
}

// ============================================================================
// SessionConfigBuilder
// ============================================================================

/// Builder for [`SessionConfig`].
#[derive(Debug, Default, Clone)]
pub struct SessionConfigBuilder {
    config: SessionConfig,
}

impl SessionConfigBuilder {
    /// Creates a builder holding the defaults.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the search template.
    #[inline]
    #[must_use]
    pub fn search_template(mut self, template: impl Into<String>) -> Self {
        self.config.search_template = template.into();
        self
    }

    /// Sets the worker script and scope.
    #[inline]
    #[must_use]
    pub fn worker(mut self, script: impl Into<String>, scope: impl Into<String>) -> Self {
        self.config.worker_script = script.into();
        self.config.worker_scope = scope.into();
        self
    }

    /// Adds a hostname allowed to register workers over `http`.
    #[inline]
    #[must_use]
    pub fn allow_insecure_host(mut self, host: impl Into<String>) -> Self {
        self.config.insecure_allowed_hosts.push(host.into());
        self
    }

    /// Sets the transport worker and module.
    #[inline]
    #[must_use]
    pub fn transport(mut self, worker: impl Into<String>, module: impl Into<String>) -> Self {
        self.config.transport_worker = worker.into();
        self.config.transport_module = module.into();
        self
    }

    /// Sets the tunnel path.
    #[inline]
    #[must_use]
    pub fn tunnel_path(mut self, path: impl Into<String>) -> Self {
        self.config.tunnel_path = path.into();
        self
    }

    /// Sets the reset cooldown.
    #[inline]
    #[must_use]
    pub fn reinit_cooldown_ms(mut self, ms: u64) -> Self {
        self.config.reinit_cooldown_ms = ms;
        self
    }

    /// Sets the desktop settle delay.
    #[inline]
    #[must_use]
    pub fn settle_delay_ms(mut self, ms: u64) -> Self {
        self.config.settle_delay_ms = ms;
        self
    }

    /// Sets the mobile settle delay.
    #[inline]
    #[must_use]
    pub fn mobile_settle_delay_ms(mut self, ms: u64) -> Self {
        self.config.mobile_settle_delay_ms = ms;
        self
    }

    /// Sets the desktop display timeout.
    #[inline]
    #[must_use]
    pub fn display_timeout_ms(mut self, ms: u64) -> Self {
        self.config.display_timeout_ms = ms;
        self
    }

    /// Sets the mobile display timeout.
    #[inline]
    #[must_use]
    pub fn mobile_display_timeout_ms(mut self, ms: u64) -> Self {
        self.config.mobile_display_timeout_ms = ms;
        self
    }

    /// Sets the rewriter config wait bound.
    #[inline]
    #[must_use]
    pub fn config_timeout_ms(mut self, ms: u64) -> Self {
        self.config.config_timeout_ms = ms;
        self
    }

    /// Sets the blank surface source.
    #[inline]
    #[must_use]
    pub fn blank_source(mut self, source: impl Into<String>) -> Self {
        self.config.blank_source = source.into();
        self
    }

    /// Builds the configuration with validation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a value is invalid.
    pub fn build(self) -> Result<SessionConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

// ============================================================================
// Tests
// ============================================================================
