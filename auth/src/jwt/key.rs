use std::fmt;

use super::errors::TokenError;

/// Symmetric secret used to sign and verify every token in the process.
///
/// Built once at startup from configuration. There is no key versioning:
/// replacing the secret invalidates every token issued under the old one.
#[derive(Clone)]
pub struct SigningKey(Vec<u8>);

impl SigningKey {
    /// # Errors
    /// * `InvalidSigningKey` - The secret is empty
    pub fn new(secret: impl Into<Vec<u8>>) -> Result<Self, TokenError> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(TokenError::InvalidSigningKey);
        }
        Ok(Self(secret))
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningKey(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_key_rejected() {
        assert_eq!(
            SigningKey::new(Vec::new()).unwrap_err(),
            TokenError::InvalidSigningKey
        );
        assert!(SigningKey::new("").is_err());
    }

    #[test]
    fn test_debug_does_not_leak_secret() {
        let key = SigningKey::new("super-secret-value").unwrap();
        assert!(!format!("{:?}", key).contains("super-secret-value"));
    }
}
