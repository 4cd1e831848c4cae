//! URL codecs for the rewriting engine.
//!
//! The rewriting engine only recognizes destination URLs in its own encoded
//! form. The codec decides that form; the prefix is configured separately in
//! [`RewriterConfig`](crate::environment::RewriterConfig).
//!
//! | Codec | Encoding |
//! |-------|----------|
//! | [`XorCodec`] | Every odd-indexed char XOR 2, then `encodeURIComponent` |
//! | [`PlainCodec`] | `encodeURIComponent` |
//! | [`Base64Codec`] | URL-safe base64 without padding |

// ============================================================================
// Imports
// ============================================================================

use std::fmt::Debug;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use crate::error::{Error, Result};
use crate::resolver::encode_uri_component;

// ============================================================================
// UrlCodec
// ============================================================================

/// Reversible transform applied to destination URLs.
pub trait UrlCodec: Debug + Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Encodes a URL.
    fn encode(&self, url: &str) -> String;

    /// Decodes a previously encoded URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if `encoded` is not valid for this codec.
    fn decode(&self, encoded: &str) -> Result<String>;
}

/// Percent-decodes `input`, mapping failures to [`Error::InvalidUrl`].
fn percent_decode(input: &str) -> Result<String> {
    urlencoding::decode(input)
        .map(|s| s.into_owned())
        .map_err(|e| Error::InvalidUrl {
            input: input.to_string(),
            message: e.to_string(),
        })
}

// ============================================================================
// XorCodec
// ============================================================================

/// XOR codec (the rewriting engine's default).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct XorCodec;

impl XorCodec {
    /// XORs every odd-indexed char with 2. Self-inverse.
    fn scramble(input: &str) -> String {
        input
            .chars()
            .enumerate()
            .map(|(i, c)| {
                if i % 2 == 1 {
                    char::from_u32(c as u32 ^ 2).unwrap_or(c)
                } else {
                    c
                }
            })
            .collect()
    }
}

impl UrlCodec for XorCodec {
    fn name(&self) -> &'static str {
        "xor"
    }

    fn encode(&self, url: &str) -> String {
        if url.is_empty() {
            return String::new();
        }
        encode_uri_component(&Self::scramble(url))
    }

    fn decode(&self, encoded: &str) -> Result<String> {
        if encoded.is_empty() {
            return Ok(String::new());
        }

        // Anything after the first '?' was appended by the page, not encoded.
        let (body, search) = match encoded.split_once('?') {
            Some((body, search)) => (body, Some(search)),
            None => (encoded, None),
        };

        let mut out = Self::scramble(&percent_decode(body)?);
        if let Some(search) = search {
            out.push('?');
            out.push_str(search);
        }
        Ok(out)
    }
}

// ============================================================================
// PlainCodec
// ============================================================================

/// Percent-encoding only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlainCodec;

impl UrlCodec for PlainCodec {
    fn name(&self) -> &'static str {
        "plain"
    }

    fn encode(&self, url: &str) -> String {
        encode_uri_component(url)
    }

    fn decode(&self, encoded: &str) -> Result<String> {
        percent_decode(encoded)
    }
}

// ============================================================================
// Base64Codec
// ============================================================================

/// URL-safe base64 without padding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Base64Codec;

impl UrlCodec for Base64Codec {
    fn name(&self) -> &'static str {
        "base64"
    }

    fn encode(&self, url: &str) -> String {
        URL_SAFE_NO_PAD.encode(url.as_bytes())
    }

    fn decode(&self, encoded: &str) -> Result<String> {
        let invalid = |message: String| Error::InvalidUrl {
            input: encoded.to_string(),
            message,
        };

        let bytes = URL_SAFE_NO_PAD
            .decode(encoded)
            .map_err(|e| invalid(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| invalid(e.to_string()))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_xor_known_vector() {
        // h t t p s : / / -> odd chars XOR 2
        assert_eq!(XorCodec.encode("https://a.b/"), "hvtrs8%2F-a%2Cb-");
    }

    #[test]
    fn test_xor_leaves_uri_component_marks() {
        // "!a(b)" scrambles to "!c(`)"; only the backtick is escaped.
        assert_eq!(XorCodec.encode("!a(b)"), "!c(%60)");
        assert_eq!(XorCodec.decode("!c(%60)").unwrap(), "!a(b)");
        assert_eq!(PlainCodec.encode("it's*"), "it's*");
    }

    #[test]
    fn test_xor_empty() {
        assert_eq!(XorCodec.encode(""), "");
        assert_eq!(XorCodec.decode("").unwrap(), "");
    }

    #[test]
    fn test_xor_decode_keeps_appended_query() {
        let encoded = XorCodec.encode("https://a.b/");
        let decoded = XorCodec.decode(&format!("{encoded}?lang=en")).unwrap();
        assert_eq!(decoded, "https://a.b/?lang=en");
    }

    #[test]
    fn test_plain_encodes_reserved() {
        assert_eq!(
            PlainCodec.encode("https://example.org/a b"),
            "https%3A%2F%2Fexample.org%2Fa%20b"
        );
    }

    #[test]
    fn test_base64_rejects_garbage() {
        assert!(Base64Codec.decode("***").is_err());
    }

    proptest! {
        #[test]
        fn prop_xor_decode_inverts_encode(url in "[a-zA-Z0-9:/._~-]{0,64}") {
            prop_assert_eq!(XorCodec.decode(&XorCodec.encode(&url)).unwrap(), url);
        }

        #[test]
        fn prop_base64_is_url_safe(url in "\\PC{0,64}") {
            let encoded = Base64Codec.encode(&url);
            prop_assert!(encoded.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        }
    }
}
