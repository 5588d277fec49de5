//! API key generation, hashing, and webhook HMAC signing utilities (PRD-13).
//!
//! This module lives in `core` (zero internal deps) so it can be used by both
//! the API/repository layer and the worker.

use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha256;

use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Length of the generated API key string (alphanumeric characters).
pub const KEY_LENGTH: usize = 48;

/// Number of leading characters stored as a human-visible prefix.
pub const KEY_PREFIX_LENGTH: usize = 8;

/// Default requests-per-minute limit for a new key.
pub const DEFAULT_RATE_LIMIT: i32 = 100;

/// Scope value granting every scope.
pub const SCOPE_WILDCARD: &str = "*";

// ---------------------------------------------------------------------------
// API key generation
// ---------------------------------------------------------------------------

/// The result of generating a new API key.
pub struct GeneratedApiKey {
    /// The plaintext key (shown to the user exactly once, never stored).
    pub plaintext: String,
    /// The first [`KEY_PREFIX_LENGTH`] characters of the key for display.
    pub prefix: String,
    /// The SHA-256 hex digest of the plaintext key (stored in the database).
    pub hash: String,
}

/// Generate a new random API key.
///
/// Returns the plaintext (shown once), prefix (for identification), and
/// SHA-256 hash (for storage). The plaintext must never be persisted.
pub fn generate_api_key() -> GeneratedApiKey {
    let key: String = rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(KEY_LENGTH)
        .map(char::from)
        .collect();

    let prefix = key[..KEY_PREFIX_LENGTH].to_string();
    let hash = hash_api_key(&key);

    GeneratedApiKey {
        plaintext: key,
        prefix,
        hash,
    }
}

/// Compute the SHA-256 hex digest of an API key.
///
/// Used both during key creation (to store the hash) and during
/// authentication (to look up the key by hash).
pub fn hash_api_key(key: &str) -> String {
    crate::hashing::sha256_hex(key.as_bytes())
}

/// Extract the prefix from a plaintext API key.
pub fn extract_prefix(key: &str) -> &str {
    &key[..KEY_PREFIX_LENGTH.min(key.len())]
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Check that a key is usable: active and not past its expiry.
///
/// Fails closed: an inactive or expired key is Unauthorized regardless of
/// its scopes. Missing keys are rejected before this point (the hash lookup
/// found nothing).
pub fn validate_key_usable(
    is_active: bool,
    expires_at: Option<Timestamp>,
    now: Timestamp,
) -> Result<(), CoreError> {
    if !is_active {
        return Err(CoreError::Unauthorized("API key is inactive".to_string()));
    }
    if let Some(expiry) = expires_at {
        if now >= expiry {
            return Err(CoreError::Unauthorized("API key has expired".to_string()));
        }
    }
    Ok(())
}

/// Whether a key's scope list grants `required`.
///
/// The wildcard `*` grants everything; otherwise an exact scope match is
/// needed.
pub fn scope_allows(scopes: &[String], required: &str) -> bool {
    scopes.iter().any(|s| s == SCOPE_WILDCARD || s == required)
}

/// Check a key's scopes against a required scope, as a Forbidden error.
pub fn validate_scope(scopes: &[String], required: &str) -> Result<(), CoreError> {
    if scope_allows(scopes, required) {
        Ok(())
    } else {
        Err(CoreError::Forbidden(format!(
            "API key lacks required scope '{required}'"
        )))
    }
}

// ---------------------------------------------------------------------------
// Webhook HMAC signing
// ---------------------------------------------------------------------------

type HmacSha256 = Hmac<Sha256>;

/// Compute an HMAC-SHA256 signature for a webhook payload.
///
/// The `secret` is the webhook-specific signing secret. The `payload` is the
/// JSON body being delivered. Returns the hex-encoded signature string.
pub fn compute_webhook_hmac(secret: &str, payload: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(payload.as_bytes());
    let result = mac.finalize();
    hex_encode(result.into_bytes())
}

/// Encode bytes as a lowercase hex string.
fn hex_encode(bytes: impl AsRef<[u8]>) -> String {
    bytes.as_ref().iter().map(|b| format!("{b:02x}")).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    // -- Key generation ----------------------------------------------------

    #[test]
    fn generated_key_has_correct_length() {
        let key = generate_api_key();
        assert_eq!(key.plaintext.len(), KEY_LENGTH);
    }

    #[test]
    fn generated_key_prefix_matches_start() {
        let key = generate_api_key();
        assert_eq!(&key.plaintext[..KEY_PREFIX_LENGTH], key.prefix);
    }

    #[test]
    fn generated_key_hash_is_sha256_hex() {
        let key = generate_api_key();
        assert_eq!(key.hash.len(), 64, "SHA-256 hex digest should be 64 chars");
        assert!(key.hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn hash_matches_regeneration() {
        let key = generate_api_key();
        assert_eq!(key.hash, hash_api_key(&key.plaintext));
    }

    #[test]
    fn different_keys_produce_different_hashes() {
        let a = generate_api_key();
        let b = generate_api_key();
        assert_ne!(a.plaintext, b.plaintext);
        assert_ne!(a.hash, b.hash);
    }

    #[test]
    fn extract_prefix_handles_short_key() {
        assert_eq!(extract_prefix("abc"), "abc");
        assert_eq!(extract_prefix("abcdefghijklmnop"), "abcdefgh");
    }

    // -- Validation --------------------------------------------------------

    #[test]
    fn active_unexpired_key_is_usable() {
        let now = Utc::now();
        assert!(validate_key_usable(true, Some(now + Duration::days(1)), now).is_ok());
        assert!(validate_key_usable(true, None, now).is_ok());
    }

    #[test]
    fn inactive_key_rejected() {
        let now = Utc::now();
        assert!(validate_key_usable(false, None, now).is_err());
    }

    #[test]
    fn expired_key_rejected() {
        let now = Utc::now();
        let result = validate_key_usable(true, Some(now - Duration::seconds(1)), now);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("expired"));
    }

    #[test]
    fn expiry_boundary_fails_closed() {
        let now = Utc::now();
        assert!(validate_key_usable(true, Some(now), now).is_err());
    }

    // -- Scopes ------------------------------------------------------------

    #[test]
    fn wildcard_grants_everything() {
        let scopes = vec![SCOPE_WILDCARD.to_string()];
        assert!(scope_allows(&scopes, "vendors:read"));
        assert!(scope_allows(&scopes, "monitoring:write"));
    }

    #[test]
    fn exact_scope_match_required() {
        let scopes = vec!["vendors:read".to_string()];
        assert!(scope_allows(&scopes, "vendors:read"));
        assert!(!scope_allows(&scopes, "vendors:write"));
    }

    #[test]
    fn missing_scope_is_forbidden() {
        let scopes = vec!["vendors:read".to_string()];
        let err = validate_scope(&scopes, "monitoring:write").unwrap_err();
        assert!(matches!(err, CoreError::Forbidden(_)));
    }

    // -- HMAC signing ------------------------------------------------------

    #[test]
    fn hmac_produces_hex_string() {
        let sig = compute_webhook_hmac("my_secret", r#"{"event":"test"}"#);
        assert_eq!(sig.len(), 64, "HMAC-SHA256 hex should be 64 chars");
        assert!(sig.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn hmac_is_deterministic() {
        assert_eq!(
            compute_webhook_hmac("secret", "payload"),
            compute_webhook_hmac("secret", "payload")
        );
    }

    #[test]
    fn hmac_differs_with_different_secret_or_payload() {
        assert_ne!(
            compute_webhook_hmac("secret_a", "payload"),
            compute_webhook_hmac("secret_b", "payload")
        );
        assert_ne!(
            compute_webhook_hmac("secret", "payload_a"),
            compute_webhook_hmac("secret", "payload_b")
        );
    }
}
