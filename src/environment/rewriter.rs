//! Rewriting engine configuration.
//!
//! The rewriting engine publishes its config (path prefix + URL codec) some
//! time after the background worker is up. [`ConfigSignal`] is the awaitable
//! form of that publication; nothing in the crate polls for it.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::debug;

use crate::codec::UrlCodec;
use crate::error::{Error, Result};

// ============================================================================
// RewriterConfig
// ============================================================================

/// Prefix and codec the rewriting engine recognizes.
#[derive(Clone)]
pub struct RewriterConfig {
    prefix: String,
    codec: Arc<dyn UrlCodec>,
}

impl RewriterConfig {
    /// Creates a config from a prefix and codec.
    #[inline]
    #[must_use]
    pub fn new(prefix: impl Into<String>, codec: Arc<dyn UrlCodec>) -> Self {
        Self {
            prefix: prefix.into(),
            codec,
        }
    }

    /// Returns the path prefix, e.g. `/uv/service/`.
    #[inline]
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the codec.
    #[inline]
    #[must_use]
    pub fn codec(&self) -> &Arc<dyn UrlCodec> {
        &self.codec
    }

    /// Encodes a URL with the codec only.
    #[inline]
    #[must_use]
    pub fn encode_url(&self, url: &str) -> String {
        self.codec.encode(url)
    }

    /// Returns `prefix + encode_url(url)`.
    #[must_use]
    pub fn encode(&self, url: &str) -> String {
        let encoded = self.codec.encode(url);
        let mut out = String::with_capacity(self.prefix.len() + encoded.len());
        out.push_str(&self.prefix);
        out.push_str(&encoded);
        out
    }
}

impl fmt::Debug for RewriterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RewriterConfig")
            .field("prefix", &self.prefix)
            .field("codec", &self.codec.name())
            .finish()
    }
}

// ============================================================================
// RewriterHost
// ============================================================================

/// Source of the rewriting engine's config.
#[async_trait]
pub trait RewriterHost: Send + Sync {
    /// Resolves once the config is available.
    async fn wait_config(&self) -> Result<RewriterConfig>;
}

// ============================================================================
// StaticRewriter
// ============================================================================

/// A rewriter whose config is known up front.
#[derive(Debug, Clone)]
pub struct StaticRewriter {
    config: RewriterConfig,
}

impl StaticRewriter {
    /// Wraps a fixed config.
    #[inline]
    #[must_use]
    pub fn new(config: RewriterConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl RewriterHost for StaticRewriter {
    async fn wait_config(&self) -> Result<RewriterConfig> {
        Ok(self.config.clone())
    }
}

// ============================================================================
// ConfigSignal
// ============================================================================

/// Config published later by the host page.
///
/// Waiters park on a watch channel until [`ConfigSignal::publish`] runs.
pub struct ConfigSignal {
    tx: watch::Sender<Option<RewriterConfig>>,
}

impl ConfigSignal {
    /// Creates an empty signal.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    /// Makes the config available and wakes every waiter.
    pub fn publish(&self, config: RewriterConfig) {
        debug!(prefix = %config.prefix(), codec = config.codec().name(), "Rewriter config published");
        self.tx.send_replace(Some(config));
    }

    /// Returns `true` once a config has been published.
    #[inline]
    #[must_use]
    pub fn is_published(&self) -> bool {
        self.tx.borrow().is_some()
    }
}

impl Default for ConfigSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ConfigSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigSignal")
            .field("published", &self.is_published())
            .finish()
    }
}

#[async_trait]
impl RewriterHost for ConfigSignal {
    async fn wait_config(&self) -> Result<RewriterConfig> {
        let mut rx = self.tx.subscribe();
        let guard = rx
            .wait_for(Option::is_some)
            .await
            .map_err(|_| Error::worker_registration("Rewriter config channel closed"))?;

        (*guard)
            .clone()
            .ok_or_else(|| Error::worker_registration("Rewriter config missing"))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::codec::PlainCodec;

    fn plain_config() -> RewriterConfig {
        RewriterConfig::new("/uv/service/", Arc::new(PlainCodec))
    }

    #[test]
    fn test_encode_prepends_prefix() {
        let config = plain_config();
        assert_eq!(
            config.encode("https://example.org/"),
            "/uv/service/https%3A%2F%2Fexample.org%2F"
        );
    }

    #[tokio::test]
    async fn test_static_rewriter_resolves_immediately() {
        let host = StaticRewriter::new(plain_config());
        let config = host.wait_config().await.unwrap();
        assert_eq!(config.prefix(), "/uv/service/");
    }

    #[tokio::test(start_paused = true)]
    async fn test_signal_waits_until_published() {
        let signal = Arc::new(ConfigSignal::new());

        let waiter = {
            let signal = Arc::clone(&signal);
            tokio::spawn(async move { signal.wait_config().await })
        };

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert!(!waiter.is_finished());

        signal.publish(plain_config());
        let config = waiter.await.unwrap().unwrap();
        assert_eq!(config.prefix(), "/uv/service/");
    }

    #[tokio::test]
    async fn test_signal_already_published() {
        let signal = ConfigSignal::new();
        signal.publish(plain_config());
        assert!(signal.is_published());
        tokio_test::assert_ok!(signal.wait_config().await);
    }
}
