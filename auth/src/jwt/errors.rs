use thiserror::Error;

/// Reason a token failed to decode.
///
/// Checks run in a fixed order: signature, then claim structure, then expiry.
/// No claim content is trusted before the signature has been verified.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Token payload is malformed: {0}")]
    Malformed(String),

    #[error("Token is expired")]
    Expired,
}

/// Error type for token issuance and key setup.
///
/// These are internal faults, never authentication failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Signing key must not be empty")]
    InvalidSigningKey,

    #[error("Token lifetime must be between one hour and ten years")]
    InvalidLifetime,
}
