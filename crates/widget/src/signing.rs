//! HMAC identity digest for Chatwoot identity validation.
//!
//! Chatwoot marks a contact as verified when `identifier_hash` equals
//! hex(HMAC-SHA256(inbox secret, identifier)).  The identifier is the
//! visitor's email address.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Hex-encoded HMAC-SHA256 of `identifier` keyed by `secret`.
///
/// Returns `None` for an empty secret: an unsigned identifier must never
/// reach the SDK, so callers fall back to anonymous mode.
pub fn identifier_hash(secret: &str, identifier: &str) -> Option<String> {
    if secret.is_empty() {
        return None;
    }
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(identifier.as_bytes());
    Some(hex::encode(mac.finalize().into_bytes()))
}

/// Check a digest produced elsewhere against the configured secret.
///
/// Comparison is constant-time; case of the hex digits is ignored.
pub fn verify_identifier_hash(secret: &str, identifier: &str, digest: &str) -> bool {
    let Some(expected) = identifier_hash(secret, identifier) else {
        return false;
    };
    let provided = digest.trim().to_ascii_lowercase();
    bool::from(expected.as_bytes().ct_eq(provided.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_known_fixture() {
        assert_eq!(
            identifier_hash("s3cret", "a@example.com").as_deref(),
            Some("34d9be66017eae9ac9b5f7adbb23a4db414c50921b831e74f6bb1bcfb93890cf")
        );
    }

    #[test]
    fn matches_rfc4231_case_2() {
        assert_eq!(
            identifier_hash("Jefe", "what do ya want for nothing?").as_deref(),
            Some("5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843")
        );
    }

    #[test]
    fn deterministic_and_input_sensitive() {
        let a = identifier_hash("s3cret", "a@example.com").unwrap();
        assert_eq!(a, identifier_hash("s3cret", "a@example.com").unwrap());
        assert_ne!(a, identifier_hash("s3cret", "b@example.com").unwrap());
        assert_ne!(a, identifier_hash("other", "a@example.com").unwrap());
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn empty_secret_yields_none() {
        assert!(identifier_hash("", "a@example.com").is_none());
    }

    #[test]
    fn verify_accepts_own_digest_only() {
        let d = identifier_hash("s3cret", "a@example.com").unwrap();
        assert!(verify_identifier_hash("s3cret", "a@example.com", &d));
        assert!(verify_identifier_hash("s3cret", "a@example.com", &d.to_uppercase()));
        assert!(!verify_identifier_hash("s3cret", "b@example.com", &d));
        assert!(!verify_identifier_hash("", "a@example.com", &d));
        assert!(!verify_identifier_hash("s3cret", "a@example.com", "deadbeef"));
    }
}
