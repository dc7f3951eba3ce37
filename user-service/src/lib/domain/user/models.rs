use std::fmt;
use std::str::FromStr;

use auth::Identity;
use auth::Role;
use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::user::errors::EmailError;
use crate::user::errors::PasswordPolicyError;
use crate::user::errors::PersonNameError;
use crate::user::errors::PhoneError;
use crate::user::errors::UserIdError;

/// User aggregate entity.
///
/// Represents a registered user together with the last issued token pair.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub email: EmailAddress,
    pub phone: PhoneNumber,
    pub password_hash: String,
    pub user_type: Role,
    pub token: Option<String>,
    pub refresh_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Identity claims asserted by tokens issued for this user.
    pub fn identity(&self) -> Identity {
        Identity {
            email: self.email.as_str().to_string(),
            first_name: self.first_name.as_str().to_string(),
            last_name: self.last_name.as_str().to_string(),
            uid: self.id.to_string(),
            user_type: self.user_type,
        }
    }
}

/// User unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a new random user ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a user ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, UserIdError> {
        Uuid::parse_str(s)
            .map(UserId)
            .map_err(|e| UserIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// First or last name.
///
/// Surrounding whitespace is trimmed; 2-100 characters remain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonName(String);

impl PersonName {
    const MIN_LENGTH: usize = 2;
    const MAX_LENGTH: usize = 100;

    pub fn new(name: String) -> Result<Self, PersonNameError> {
        let name = name.trim().to_string();
        let length = name.chars().count();
        if length < Self::MIN_LENGTH {
            Err(PersonNameError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            })
        } else if length > Self::MAX_LENGTH {
            Err(PersonNameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(Self(name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Email address type
///
/// Validates email format using RFC 5322 compliant parser. Stored trimmed
/// and lowercased, so lookups and uniqueness ignore case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        let email = Self::normalize(&email);
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    /// Canonical form used for storage and lookup.
    pub fn normalize(email: &str) -> String {
        email.trim().to_lowercase()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Phone number normalized to digits with an optional leading `+`.
///
/// Spaces and dashes are dropped so formatting variants compare equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    const MIN_DIGITS: usize = 7;
    const MAX_DIGITS: usize = 15;

    pub fn new(phone: String) -> Result<Self, PhoneError> {
        let trimmed = phone.trim();
        let (prefix, rest) = match trimmed.strip_prefix('+') {
            Some(rest) => ("+", rest),
            None => ("", trimmed),
        };

        let mut digits = String::with_capacity(rest.len());
        for c in rest.chars() {
            match c {
                '0'..='9' => digits.push(c),
                ' ' | '-' => {}
                _ => return Err(PhoneError::InvalidCharacters),
            }
        }

        if digits.len() < Self::MIN_DIGITS || digits.len() > Self::MAX_DIGITS {
            return Err(PhoneError::InvalidLength {
                min: Self::MIN_DIGITS,
                max: Self::MAX_DIGITS,
                actual: digits.len(),
            });
        }

        Ok(Self(format!("{}{}", prefix, digits)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Plaintext password accepted at signup, before hashing.
///
/// Never printed: `Debug` is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    const MIN_LENGTH: usize = 8;

    pub fn new(password: String) -> Result<Self, PasswordPolicyError> {
        if password.chars().count() < Self::MIN_LENGTH {
            return Err(PasswordPolicyError::TooShort {
                min: Self::MIN_LENGTH,
            });
        }
        Ok(Self(password))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// Command to register a new user with domain types
#[derive(Debug)]
pub struct SignupCommand {
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub email: EmailAddress,
    pub phone: PhoneNumber,
    pub password: Password,
    pub user_type: Role,
}

/// Command to log in with email and password.
///
/// Neither field is validated: anything that does not match a stored
/// account fails as invalid credentials.
pub struct LoginCommand {
    pub email: String,
    pub password: String,
}

impl LoginCommand {
    /// Build a login command; the email is normalized like stored addresses.
    pub fn new(email: &str, password: String) -> Self {
        Self {
            email: EmailAddress::normalize(email),
            password,
        }
    }
}

impl fmt::Debug for LoginCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCommand")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// User together with the token pair issued by the current operation.
#[derive(Debug, Clone)]
pub struct UserSession {
    pub user: User,
    pub tokens: auth::TokenPair,
}
