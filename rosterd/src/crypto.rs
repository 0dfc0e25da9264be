use base64::{Engine as _, engine::general_purpose};
use rand::prelude::RngExt;
use rand::rng;

/// Generates a cryptographically secure invite token with 256 bits of entropy.
///
/// The token is 32 bytes (256 bits) of cryptographically secure random data
/// encoded as base64url without padding, giving a 43 character opaque string.
/// Predictability here would let an attacker mint their own onboarding links,
/// so the thread-local CSPRNG is non-negotiable.
///
/// Pure with respect to inputs: no storage access, no side effects. Uniqueness
/// across the whole token table is enforced by the database constraint, not
/// here.
pub fn generate_invite_token() -> String {
    let mut token_bytes = [0u8; 32];
    rng().fill(&mut token_bytes);

    general_purpose::URL_SAFE_NO_PAD.encode(token_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_token_format() {
        let token = generate_invite_token();

        // base64url(32 bytes) without padding is 43 characters
        assert_eq!(token.len(), 43);

        // Should only contain base64url characters
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));

        // Should not contain padding
        assert!(!token.contains('='));
    }

    #[test]
    fn test_token_uniqueness() {
        let mut tokens = HashSet::new();

        // Generate 10,000 tokens and ensure they're all unique. A collision
        // here is worth investigating, not shrugging off.
        for _ in 0..10_000 {
            let token = generate_invite_token();
            assert!(tokens.insert(token), "Generated duplicate invite token");
        }
    }

    #[test]
    fn test_token_is_not_constant() {
        let a = generate_invite_token();
        let b = generate_invite_token();
        assert_ne!(a, b);
    }
}
