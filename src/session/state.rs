//! UI-visible session state.

use serde::Serialize;

// ============================================================================
// SessionUiState
// ============================================================================

/// Which screen the UI shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionUiState {
    /// Start screen, no destination shown.
    #[default]
    Home,
    /// Readiness or navigation pending.
    Loading,
    /// Destination shown.
    Active,
}

// ============================================================================
// SessionSnapshot
// ============================================================================

/// Everything the UI renders, published on every change.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    /// Current screen.
    pub state: SessionUiState,
    /// User-facing error message, one per failure category.
    pub error: Option<String>,
    /// Raw error text for diagnostics.
    pub error_detail: Option<String>,
    /// Resolved destination of the current navigation.
    pub current_url: Option<String>,
}

impl SessionSnapshot {
    /// Returns `true` while loading.
    #[inline]
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state == SessionUiState::Loading
    }

    /// Returns `true` if an error is shown.
    #[inline]
    #[must_use]
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_home_without_error() {
        let snapshot = SessionSnapshot::default();
        assert_eq!(snapshot.state, SessionUiState::Home);
        assert!(!snapshot.is_loading());
        assert!(!snapshot.has_error());
    }

    #[test]
    fn test_serializes_for_ui() {
        let snapshot = SessionSnapshot {
            state: SessionUiState::Loading,
            current_url: Some("https://openai.com".into()),
            ..SessionSnapshot::default()
        };

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["state"], "loading");
        assert_eq!(json["currentUrl"], "https://openai.com");
        assert!(json["errorDetail"].is_null());
    }
}
