use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::PasswordHash;
use argon2::password_hash::PasswordHasher as Argon2PasswordHasher;
use argon2::password_hash::PasswordVerifier;
use argon2::password_hash::SaltString;
use argon2::Argon2;

use super::errors::PasswordError;

/// Well-formed Argon2id hash with the default parameters that no password
/// matches. Verifying against it costs the same as a real verification.
const DECOY_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$ZGVjb3lzYWx0ZGVjb3lzYQ$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

/// Credential verifier.
///
/// Hashes passwords with Argon2id and a fresh random salt per call, and
/// compares candidates against stored PHC strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordHasher;

impl PasswordHasher {
    /// Create a new password hasher instance.
    pub fn new() -> Self {
        Self
    }

    /// Hash a plaintext password securely.
    ///
    /// Two calls with the same input produce different outputs, both of which
    /// verify against the original input.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to hash
    ///
    /// # Returns
    /// PHC string format hash (includes algorithm, parameters, salt, and hash)
    ///
    /// # Errors
    /// * `HashingFailed` - Salt generation or the Argon2 computation failed
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }

    /// Verify a password against a stored hash.
    ///
    /// Returns `false` for a mismatch, a malformed hash, or any internal
    /// verification error. Callers cannot tell these apart.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `hash` - Stored password hash in PHC string format
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::debug!(error = %e, "Stored password hash is malformed");
                return false;
            }
        };

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }

    /// Spend one full verification on `password` when no stored hash exists.
    ///
    /// Always returns `false`. Lets an unknown account fail in the same time
    /// as a wrong password.
    pub fn verify_unknown(&self, password: &str) -> bool {
        self.verify(password, DECOY_HASH)
    }
}
