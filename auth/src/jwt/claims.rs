use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::errors::TokenError;
use crate::role::Role;

/// Claims that carry an expiry instant.
///
/// The codec checks expiry through this trait after the signature and the
/// payload structure have been validated.
pub trait Expiring {
    /// Expiration time (Unix timestamp).
    fn expires_at(&self) -> i64;

    /// Check if the claims are expired at `current_timestamp`.
    fn is_expired(&self, current_timestamp: i64) -> bool {
        self.expires_at() < current_timestamp
    }
}

/// Identity facts asserted by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub uid: String,
    pub user_type: Role,
}

/// Validity window of an issued token, between one hour and ten years.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenLifetime(Duration);

impl TokenLifetime {
    /// Longest configurable lifetime: ten years.
    pub const MAX_HOURS: i64 = 87_600;

    /// Lifetime of access tokens: 24 hours.
    pub fn access() -> Self {
        Self(Duration::hours(24))
    }

    /// Lifetime of refresh tokens: 168 hours (7 days).
    pub fn refresh() -> Self {
        Self(Duration::hours(168))
    }

    /// # Errors
    /// * `InvalidLifetime` - `hours` is not in `1..=MAX_HOURS`
    pub fn from_hours(hours: i64) -> Result<Self, TokenError> {
        if !(1..=Self::MAX_HOURS).contains(&hours) {
            return Err(TokenError::InvalidLifetime);
        }
        Duration::try_hours(hours)
            .map(Self)
            .ok_or(TokenError::InvalidLifetime)
    }

    /// Expiry instant of a token issued at `issued_at`.
    ///
    /// # Errors
    /// * `InvalidLifetime` - The expiry falls outside the representable range
    pub fn expiry_from(&self, issued_at: DateTime<Utc>) -> Result<DateTime<Utc>, TokenError> {
        issued_at
            .checked_add_signed(self.0)
            .ok_or(TokenError::InvalidLifetime)
    }

    pub fn as_duration(&self) -> Duration {
        self.0
    }
}

/// Claims encoded into an access token.
///
/// The expiry is always set at construction and lies strictly after the
/// issue time. Deserializing a payload without `exp` fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimSet {
    #[serde(flatten)]
    identity: Identity,
    iat: i64,
    exp: i64,
}

impl ClaimSet {
    /// Create claims for `identity`, valid for `lifetime` from `issued_at`.
    ///
    /// # Errors
    /// * `InvalidLifetime` - The expiry cannot be represented
    pub fn new(
        identity: Identity,
        issued_at: DateTime<Utc>,
        lifetime: TokenLifetime,
    ) -> Result<Self, TokenError> {
        Ok(Self {
            identity,
            iat: issued_at.timestamp(),
            exp: lifetime.expiry_from(issued_at)?.timestamp(),
        })
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn email(&self) -> &str {
        &self.identity.email
    }

    pub fn first_name(&self) -> &str {
        &self.identity.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.identity.last_name
    }

    pub fn uid(&self) -> &str {
        &self.identity.uid
    }

    pub fn role(&self) -> Role {
        self.identity.user_type
    }

    /// Issued at (Unix timestamp).
    pub fn issued_at(&self) -> i64 {
        self.iat
    }
}

impl Expiring for ClaimSet {
    fn expires_at(&self) -> i64 {
        self.exp
    }
}

/// Claims encoded into a refresh token.
///
/// Carries no identity: it only proves that a session was issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshClaims {
    iat: i64,
    exp: i64,
}

impl RefreshClaims {
    pub fn new(issued_at: DateTime<Utc>, lifetime: TokenLifetime) -> Result<Self, TokenError> {
        Ok(Self {
            iat: issued_at.timestamp(),
            exp: lifetime.expiry_from(issued_at)?.timestamp(),
        })
    }

    pub fn issued_at(&self) -> i64 {
        self.iat
    }
}

impl Expiring for RefreshClaims {
    fn expires_at(&self) -> i64 {
        self.exp
    }
}
