//! Free-form input to destination URL.
//!
//! Resolution is ordered, first match wins:
//!
//! 1. Input with a recognized scheme is returned unchanged.
//! 2. Input that parses as `http://<input>` with a dotted host is treated as
//!    a domain and returned as `https://<input>`.
//! 3. Anything else is a search query substituted into the template.
//!
//! A bare word with no dot is therefore always a search, never a
//! single-label host (`localhost` searches). Dotted tokens such as `1.2.3`
//! are treated as domains.
//!
//! # Example
//!
//! ```
//! use tunnel_nav::resolver::resolve;
//!
//! assert_eq!(resolve("openai.com", None), "https://openai.com");
//! assert_eq!(
//!     resolve("best pizza near me", None),
//!     "https://www.google.com/search?q=best%20pizza%20near%20me"
//! );
//! ```

// ============================================================================
// Imports
// ============================================================================

use url::Url;

use crate::config::{DEFAULT_SEARCH_TEMPLATE, QUERY_PLACEHOLDER};

// ============================================================================
// Constants
// ============================================================================

/// Schemes accepted as "already a URL".
///
/// `Url::parse` happily reads `example.com:8080` as scheme `example.com`, so
/// a parse alone is not enough.
const RECOGNIZED_SCHEMES: &[&str] = &[
    "http",
    "https",
    "ws",
    "wss",
    "ftp",
    "file",
    "about",
    "data",
    "blob",
    "mailto",
    "view-source",
];

// ============================================================================
// InputKind
// ============================================================================

/// How an input was interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Absolute URL with a recognized scheme.
    Url,
    /// Bare host, upgraded to `https`.
    Domain,
    /// Search query.
    Search,
}

/// Classifies `input` without building the destination.
#[must_use]
pub fn classify(input: &str) -> InputKind {
    if has_recognized_scheme(input) {
        return InputKind::Url;
    }

    if input.chars().any(char::is_whitespace) {
        return InputKind::Search;
    }

    let looks_like_domain = Url::parse(&format!("http://{input}"))
        .ok()
        .and_then(|url| url.host_str().map(|host| host.contains('.')))
        .unwrap_or(false);

    if looks_like_domain {
        InputKind::Domain
    } else {
        InputKind::Search
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolves `input` into a destination URL.
///
/// `template` defaults to [`DEFAULT_SEARCH_TEMPLATE`]. Total: every input
/// yields a URL string.
#[must_use]
pub fn resolve(input: &str, template: Option<&str>) -> String {
    match classify(input) {
        InputKind::Url => input.to_string(),
        InputKind::Domain => format!("https://{input}"),
        InputKind::Search => {
            let template = template.unwrap_or(DEFAULT_SEARCH_TEMPLATE);
            template.replacen(QUERY_PLACEHOLDER, &encode_uri_component(input), 1)
        }
    }
}

/// Resolver bound to a search template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlResolver {
    template: String,
}

impl UrlResolver {
    /// Creates a resolver with the given template.
    #[inline]
    #[must_use]
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Returns the search template.
    #[inline]
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Resolves `input` with this resolver's template.
    #[inline]
    #[must_use]
    pub fn resolve(&self, input: &str) -> String {
        resolve(input, Some(&self.template))
    }
}

impl Default for UrlResolver {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_TEMPLATE)
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Returns `true` if `input` parses as a URL with a recognized scheme.
fn has_recognized_scheme(input: &str) -> bool {
    Url::parse(input)
        .map(|url| RECOGNIZED_SCHEMES.contains(&url.scheme()))
        .unwrap_or(false)
}

/// Percent-encodes like a browser's `encodeURIComponent`.
///
/// `urlencoding` escapes `!'()*` as well; browsers leave them.
#[must_use]
pub fn encode_uri_component(input: &str) -> String {
    urlencoding::encode(input)
        .replace("%21", "!")
        .replace("%27", "'")
        .replace("%28", "(")
        .replace("%29", ")")
        .replace("%2A", "*")
}

// ============================================================================
// Tests
// ============================================================================
