//! Opaque API token generation and digesting

use rand::RngCore;
use sha2::{Digest, Sha256};

/// Number of random bytes in a freshly minted token.
const TOKEN_BYTES: usize = 32;

/// Generate a new opaque API token.
///
/// Returns `(plaintext, digest)`. The plaintext is shown to the client
/// exactly once; only the digest is ever persisted.
pub fn generate_token() -> (String, String) {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    let plaintext = hex::encode(bytes);
    let digest = digest_token(&plaintext);
    (plaintext, digest)
}

/// Hash a token for storage and lookup.
///
/// SHA-256 with a domain-separation prefix, hex-encoded.
pub fn digest_token(plaintext: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"palaver:token:");
    hasher.update(plaintext.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_token() {
        let (plaintext, digest) = generate_token();
        assert_eq!(plaintext.len(), TOKEN_BYTES * 2);
        assert_eq!(digest, digest_token(&plaintext));
    }

    #[test]
    fn test_tokens_are_unique() {
        let (a, _) = generate_token();
        let (b, _) = generate_token();
        assert_ne!(a, b);
    }

    #[test]
    fn test_digest_is_stable() {
        let d1 = digest_token("abc123");
        let d2 = digest_token("abc123");
        let d3 = digest_token("abc124");
        assert_eq!(d1, d2);
        assert_ne!(d1, d3);
        // hex-encoded SHA-256
        assert_eq!(d1.len(), 64);
    }

    #[test]
    fn test_digest_differs_from_plaintext() {
        let (plaintext, digest) = generate_token();
        assert_ne!(plaintext, digest);
    }
}
