//! Encoding utilities for base64 payloads.
//!
//! Binary payloads always travel base64-encoded inside JSON documents, never
//! raw, so they stay embeddable in text-oriented transports.

use anyhow::{anyhow, Result};

/// Encode bytes to base64 string.
pub fn base64_encode(bytes: &[u8]) -> String {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// Decode base64 string to bytes with context-aware error message.
///
/// # Arguments
/// * `b64` - Base64 encoded string
/// * `context` - Description for error messages (e.g., "module binary", "part slice")
pub fn base64_decode(b64: &str, context: &str) -> Result<Vec<u8>> {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD
        .decode(b64)
        .map_err(|e| anyhow!("Failed to decode {} from base64: {}", context, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base64_roundtrip() {
        let original = b"hello world";
        let encoded = base64_encode(original);
        let decoded = base64_decode(&encoded, "test").unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_base64_decode_error() {
        let result = base64_decode("not-valid-base64!!!", "part slice");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("part slice"));
    }

    #[test]
    fn test_base64_empty() {
        assert_eq!(base64_encode(b""), "");
        assert!(base64_decode("", "empty").unwrap().is_empty());
    }
}
