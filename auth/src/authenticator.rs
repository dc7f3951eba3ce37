use std::sync::Arc;

use crate::jwt::ClaimSet;
use crate::jwt::DecodeError;
use crate::jwt::TokenCodec;
use crate::role::Role;

/// Request header carrying the access token.
///
/// Compatibility convention: a plain `token` header, not `Authorization: Bearer`.
pub const TOKEN_HEADER: &str = "token";

/// Verified claims attached to a single request.
///
/// Only the [`Authenticator`] creates one. Downstream code gets read access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedContext {
    claims: ClaimSet,
}

impl AuthenticatedContext {
    pub(crate) fn new(claims: ClaimSet) -> Self {
        Self { claims }
    }

    pub fn claims(&self) -> &ClaimSet {
        &self.claims
    }

    pub fn user_id(&self) -> &str {
        self.claims.uid()
    }

    pub fn email(&self) -> &str {
        self.claims.email()
    }

    pub fn role(&self) -> Role {
        self.claims.role()
    }
}

/// Request authentication errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Client token missing from request")]
    MissingToken,

    #[error("Unauthenticated: {0}")]
    Unauthenticated(#[from] DecodeError),
}

/// Request authenticator.
///
/// Runs extract, decode, attach in order and stops at the first failure.
pub struct Authenticator {
    codec: Arc<TokenCodec>,
}

impl Authenticator {
    pub fn new(codec: Arc<TokenCodec>) -> Self {
        Self { codec }
    }

    /// Authenticate a request from the raw value of its [`TOKEN_HEADER`].
    ///
    /// # Arguments
    /// * `token` - Header value, `None` when the header is absent
    ///
    /// # Returns
    /// Context holding the verified claims
    ///
    /// # Errors
    /// * `MissingToken` - Header absent or blank
    /// * `Unauthenticated` - Token failed to decode; carries the reason for logging
    pub fn authenticate(
        &self,
        token: Option<&str>,
    ) -> Result<AuthenticatedContext, AuthenticationError> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthenticationError::MissingToken)?;

        let claims: ClaimSet = self.codec.decode(token)?;

        Ok(AuthenticatedContext::new(claims))
    }
}
