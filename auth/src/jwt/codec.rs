use chrono::Utc;
use jsonwebtoken::crypto;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::claims::Expiring;
use super::errors::DecodeError;
use super::errors::TokenError;
use super::key::SigningKey;

/// Token codec for encoding and decoding signed tokens.
///
/// Generic over the claims type so access and refresh tokens share one
/// implementation. Uses HS256 (HMAC with SHA-256) with the process-wide
/// signing key.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
}

impl TokenCodec {
    /// Create a new codec bound to `key`.
    pub fn new(key: &SigningKey) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(key.as_bytes()),
            decoding_key: DecodingKey::from_secret(key.as_bytes()),
            algorithm: Algorithm::HS256,
        }
    }

    /// Encode claims into a signed token.
    ///
    /// # Errors
    /// * `EncodingFailed` - Claims could not be serialized or signed
    pub fn encode<T: Serialize>(&self, claims: &T) -> Result<String, TokenError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| TokenError::EncodingFailed(e.to_string()))
    }

    /// Decode and validate a token against the current time.
    ///
    /// # Errors
    /// * `InvalidSignature` - Token is not three segments or the signature does not match
    /// * `Malformed` - Signature is valid but the payload does not parse as `T`
    /// * `Expired` - Claims are well formed but past their expiry
    pub fn decode<T>(&self, token: &str) -> Result<T, DecodeError>
    where
        T: DeserializeOwned + Expiring,
    {
        self.decode_at(token, Utc::now().timestamp())
    }

    /// Decode and validate a token against `current_timestamp` (Unix seconds).
    pub fn decode_at<T>(&self, token: &str, current_timestamp: i64) -> Result<T, DecodeError>
    where
        T: DeserializeOwned + Expiring,
    {
        self.verify_signature(token)?;

        let claims: T = self.parse_claims(token)?;

        if claims.is_expired(current_timestamp) {
            return Err(DecodeError::Expired);
        }

        Ok(claims)
    }

    fn verify_signature(&self, token: &str) -> Result<(), DecodeError> {
        let (message, signature) = token
            .rsplit_once('.')
            .ok_or(DecodeError::InvalidSignature)?;

        if message.split('.').count() != 2 {
            return Err(DecodeError::InvalidSignature);
        }

        match crypto::verify(
            signature,
            message.as_bytes(),
            &self.decoding_key,
            self.algorithm,
        ) {
            Ok(true) => Ok(()),
            _ => Err(DecodeError::InvalidSignature),
        }
    }

    fn parse_claims<T: DeserializeOwned>(&self, token: &str) -> Result<T, DecodeError> {
        let mut validation = Validation::new(self.algorithm);
        // Expiry is checked by `decode_at` once the payload has parsed.
        validation.required_spec_claims.clear();
        validation.validate_exp = false;

        decode::<T>(token, &self.decoding_key, &validation)
            .map(|token_data| token_data.claims)
            .map_err(|e| DecodeError::Malformed(e.to_string()))
    }
}
