use std::fmt;
use std::sync::Arc;

use chrono::DateTime;
use chrono::Utc;

use crate::jwt::ClaimSet;
use crate::jwt::Identity;
use crate::jwt::RefreshClaims;
use crate::jwt::TokenCodec;
use crate::jwt::TokenError;
use crate::jwt::TokenLifetime;

/// Access and refresh token issued together for one session.
///
/// A new login supersedes the pair; it is never mutated in place.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Session issuer producing token pairs from user identity.
///
/// Pure computation: persisting the pair is the caller's job, and the pair
/// must not be handed out before that write succeeds.
pub struct SessionIssuer {
    codec: Arc<TokenCodec>,
    access_lifetime: TokenLifetime,
    refresh_lifetime: TokenLifetime,
}

impl SessionIssuer {
    /// Create an issuer with the default lifetimes (24h access, 168h refresh).
    pub fn new(codec: Arc<TokenCodec>) -> Self {
        Self::with_lifetimes(codec, TokenLifetime::access(), TokenLifetime::refresh())
    }

    pub fn with_lifetimes(
        codec: Arc<TokenCodec>,
        access_lifetime: TokenLifetime,
        refresh_lifetime: TokenLifetime,
    ) -> Self {
        Self {
            codec,
            access_lifetime,
            refresh_lifetime,
        }
    }

    /// Issue an access/refresh pair for `identity`, starting now.
    ///
    /// # Errors
    /// * `InvalidLifetime` - An expiry cannot be represented
    /// * `EncodingFailed` - Either token could not be signed
    pub fn issue_tokens(&self, identity: &Identity) -> Result<TokenPair, TokenError> {
        self.issue_tokens_at(identity, Utc::now())
    }

    /// Issue an access/refresh pair for `identity`, starting at `issued_at`.
    pub fn issue_tokens_at(
        &self,
        identity: &Identity,
        issued_at: DateTime<Utc>,
    ) -> Result<TokenPair, TokenError> {
        let access_claims = ClaimSet::new(identity.clone(), issued_at, self.access_lifetime)?;
        let refresh_claims = RefreshClaims::new(issued_at, self.refresh_lifetime)?;

        let access_token = self.codec.encode(&access_claims)?;
        let refresh_token = self.codec.encode(&refresh_claims)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }
}
