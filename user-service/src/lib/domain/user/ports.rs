use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::LoginCommand;
use crate::domain::user::models::PhoneNumber;
use crate::domain::user::models::SignupCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::UserSession;
use crate::user::errors::UserError;

/// Port for user domain service operations.
#[async_trait]
pub trait UserServicePort: Send + Sync + 'static {
    /// Register a new user and issue their first token pair.
    ///
    /// # Arguments
    /// * `command` - Validated signup fields
    ///
    /// # Returns
    /// Created user and the issued tokens, already persisted with the record
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `PhoneAlreadyExists` - Phone number is already registered
    /// * `Password` - Hashing failed
    /// * `Token` - Token signing failed
    /// * `DatabaseError` - A duplicate check or the insert failed
    async fn signup(&self, command: SignupCommand) -> Result<UserSession, UserError>;

    /// Verify credentials and issue a new token pair.
    ///
    /// The stored pair is overwritten before the new one is returned.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown email or wrong password (indistinguishable)
    /// * `Token` - Token signing failed
    /// * `DatabaseError` - Lookup or token store failed
    async fn login(&self, command: LoginCommand) -> Result<UserSession, UserError>;

    /// Retrieve user by unique identifier.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn get_user(&self, id: &UserId) -> Result<User, UserError>;

    /// Retrieve all users, newest first.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn list_users(&self) -> Result<Vec<User>, UserError>;
}

/// Persistence operations for user aggregate.
///
/// Each call is treated as atomic and consistent.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist new user, including its issued tokens.
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `PhoneAlreadyExists` - Phone number is already registered
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, user: User) -> Result<User, UserError>;

    /// Retrieve user by identifier.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;

    /// Retrieve user by email address.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError>;

    /// Check whether an email address is already registered.
    async fn exists_by_email(&self, email: &EmailAddress) -> Result<bool, UserError>;

    /// Check whether a phone number is already registered.
    async fn exists_by_phone(&self, phone: &PhoneNumber) -> Result<bool, UserError>;

    /// Retrieve all users from storage, newest first.
    async fn list_all(&self) -> Result<Vec<User>, UserError>;

    /// Overwrite the stored token pair and update timestamp of a user.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn store_issued_tokens(
        &self,
        id: &UserId,
        access_token: &str,
        refresh_token: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<(), UserError>;
}
