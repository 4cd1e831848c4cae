//! Transport library abstraction.
//!
//! The transport library turns application-level connections into the
//! tunnel wire protocol. The core only needs to install a transport module
//! and ask which one is installed.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

// ============================================================================
// TransportOptions
// ============================================================================

/// Configuration handed to a transport module.
///
/// Serializes as `{ "wisp": "wss://host/wisp/" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportOptions {
    /// Tunnel endpoint URL.
    pub wisp: String,
}

impl TransportOptions {
    /// Creates options pointing at `endpoint`.
    #[inline]
    #[must_use]
    pub fn wisp(endpoint: impl Into<String>) -> Self {
        Self {
            wisp: endpoint.into(),
        }
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Handle to the transport library's connection.
#[async_trait]
pub trait TransportConnection: Send + Sync {
    /// Returns the module currently installed, if any.
    async fn get_transport(&self) -> Result<Option<String>>;

    /// Installs `module_path` with the given configuration.
    async fn set_transport(&self, module_path: &str, options: Vec<TransportOptions>)
    -> Result<()>;
}

/// Creates the transport connection handle.
///
/// Called at most once per coordinator lifetime between resets.
#[async_trait]
pub trait TransportFactory: Send + Sync {
    /// Connects using the transport library's shared worker script.
    async fn connect(&self, worker_path: &str) -> Result<Arc<dyn TransportConnection>>;
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_wire_format() {
        let options = TransportOptions::wisp("wss://proxy.example.com/wisp/");
        let json = serde_json::to_string(&vec![options]).unwrap();
        assert_eq!(json, r#"[{"wisp":"wss://proxy.example.com/wisp/"}]"#);
    }
}
