//! Password hashing.

use crate::constants::DEFAULT_BCRYPT_COST;
use crate::error::{AuthError, Result};

/// One-way salted password hashing.
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password with a fresh random salt.
    ///
    /// # Errors
    ///
    /// Returns `HashingError` if hashing fails.
    fn hash(&self, plaintext: &str) -> impl std::future::Future<Output = Result<String>> + Send;

    /// Check a plaintext password against a digest.
    ///
    /// Never fails: a malformed digest simply does not match.
    fn verify(&self, plaintext: &str, digest: &str)
    -> impl std::future::Future<Output = bool> + Send;
}

/// bcrypt hasher.
///
/// Hashing is CPU-bound, so both operations run on the blocking pool to keep
/// the async workers free.
#[derive(Debug, Clone, Copy)]
pub struct BcryptPasswordHasher {
    cost: u32,
}

impl BcryptPasswordHasher {
    /// Create a hasher with the given work factor.
    #[must_use]
    pub const fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Work factor used for new hashes.
    #[must_use]
    pub const fn cost(&self) -> u32 {
        self.cost
    }
}

impl Default for BcryptPasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_BCRYPT_COST)
    }
}

impl PasswordHasher for BcryptPasswordHasher {
    async fn hash(&self, plaintext: &str) -> Result<String> {
        let plaintext = plaintext.to_owned();
        let cost = self.cost;

        tokio::task::spawn_blocking(move || bcrypt::hash(plaintext, cost))
            .await
            .map_err(|e| AuthError::HashingError(format!("Hash task failed: {e}")))?
            .map_err(|e| AuthError::HashingError(e.to_string()))
    }

    async fn verify(&self, plaintext: &str, digest: &str) -> bool {
        let plaintext = plaintext.to_owned();
        let digest = digest.to_owned();

        match tokio::task::spawn_blocking(move || bcrypt::verify(plaintext, &digest)).await {
            Ok(Ok(matches)) => matches,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Stored password digest is malformed");
                false
            }
            Err(e) => {
                tracing::error!(error = %e, "Password verify task failed");
                false
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;

    // Minimum bcrypt cost keeps the tests fast.
    const TEST_COST: u32 = 4;

    #[tokio::test]
    async fn test_hash_and_verify() {
        let hasher = BcryptPasswordHasher::new(TEST_COST);
        let digest = hasher.hash("correct horse").await.unwrap();

        assert_ne!(digest, "correct horse");
        assert!(hasher.verify("correct horse", &digest).await);
        assert!(!hasher.verify("wrong horse", &digest).await);
    }

    #[tokio::test]
    async fn test_salted() {
        let hasher = BcryptPasswordHasher::new(TEST_COST);
        let a = hasher.hash("same").await.unwrap();
        let b = hasher.hash("same").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_malformed_digest_does_not_match() {
        let hasher = BcryptPasswordHasher::new(TEST_COST);
        assert!(!hasher.verify("anything", "not-a-bcrypt-hash").await);
        assert!(!hasher.verify("anything", "").await);
    }

    #[test]
    fn test_default_cost() {
        assert_eq!(BcryptPasswordHasher::default().cost(), 10);
    }
}
