use thiserror::Error;

/// Error for UserId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Error for first/last name validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PersonNameError {
    #[error("Name too short: minimum {min} characters, got {actual}")]
    TooShort { min: usize, actual: usize },

    #[error("Name too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },
}

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Error for PhoneNumber validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PhoneError {
    #[error("Phone number contains invalid characters")]
    InvalidCharacters,

    #[error("Phone number must have between {min} and {max} digits, got {actual}")]
    InvalidLength {
        min: usize,
        max: usize,
        actual: usize,
    },
}

/// Error for password policy failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordPolicyError {
    #[error("Password too short: minimum {min} characters")]
    TooShort { min: usize },
}

/// Top-level error for all user-related operations
#[derive(Debug, Clone, Error)]
pub enum UserError {
    // Value object validation errors (automatically converted via #[from])
    #[error("Invalid user ID: {0}")]
    InvalidUserId(#[from] UserIdError),

    #[error("Invalid name: {0}")]
    InvalidName(#[from] PersonNameError),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Invalid phone: {0}")]
    InvalidPhone(#[from] PhoneError),

    #[error("Invalid password: {0}")]
    InvalidPassword(#[from] PasswordPolicyError),

    #[error("Invalid user type: {0}")]
    InvalidUserType(#[from] auth::RoleError),

    // Domain-level errors
    #[error("User not found: {0}")]
    NotFound(String),

    #[error("Email already exists: {0}")]
    EmailAlreadyExists(String),

    #[error("Phone number already exists: {0}")]
    PhoneAlreadyExists(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    // Internal faults
    #[error("Password error: {0}")]
    Password(#[from] auth::PasswordError),

    #[error("Token error: {0}")]
    Token(#[from] auth::TokenError),

    // Infrastructure errors
    #[error("Database error: {0}")]
    DatabaseError(String),
}
