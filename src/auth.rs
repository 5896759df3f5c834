//! Shared-secret check guarding every write endpoint.

use ring::digest::{digest, Digest, SHA256};

/// The single credential for the catalog. Only the SHA-256 digest is kept in
/// memory and candidates are hashed before being compared digest-to-digest.
pub struct SharedSecret {
    digest: Digest,
}

impl SharedSecret {
    pub fn new(secret: &str) -> Self {
        Self {
            digest: digest(&SHA256, secret.as_bytes()),
        }
    }

    /// Returns true when `candidate` equals the configured secret byte-for-byte.
    pub fn verify(&self, candidate: &str) -> bool {
        let candidate = digest(&SHA256, candidate.as_bytes());
        self.digest.as_ref() == candidate.as_ref()
    }
}

impl std::fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SharedSecret(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_exact_match() {
        let secret = SharedSecret::new("hunter2");
        assert!(secret.verify("hunter2"));
    }

    #[test]
    fn test_verify_rejects_near_misses() {
        let secret = SharedSecret::new("hunter2");
        assert!(!secret.verify("hunter"));
        assert!(!secret.verify("Hunter2"));
        assert!(!secret.verify("hunter2 "));
        assert!(!secret.verify(""));
    }

    #[test]
    fn test_debug_hides_secret() {
        let secret = SharedSecret::new("hunter2");
        assert!(!format!("{secret:?}").contains("hunter2"));
    }
}
