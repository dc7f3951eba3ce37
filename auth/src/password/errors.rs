use thiserror::Error;

/// Error type for password operations.
///
/// Verification never fails with an error: a malformed stored hash is
/// reported as a mismatch. Only hashing can fail, and that failure is fatal
/// to the calling operation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),
}
