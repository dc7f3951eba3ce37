use std::sync::Arc;

use async_trait::async_trait;
use auth::PasswordError;
use auth::PasswordHasher;
use auth::SessionIssuer;
use chrono::Utc;
use tokio::task;

use crate::domain::user::models::LoginCommand;
use crate::domain::user::models::SignupCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::UserSession;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

/// Domain service implementation for user operations.
///
/// Composes the credential verifier and the session issuer with the
/// repository port. Tokens are only returned once the repository holds them.
pub struct UserService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    password_hasher: PasswordHasher,
    session_issuer: Arc<SessionIssuer>,
}

impl<UR> UserService<UR>
where
    UR: UserRepository,
{
    /// Create a new user service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `session_issuer` - Issuer signing token pairs with the process key
    pub fn new(repository: Arc<UR>, session_issuer: Arc<SessionIssuer>) -> Self {
        Self {
            repository,
            password_hasher: PasswordHasher::new(),
            session_issuer,
        }
    }

    /// Hash on the blocking pool; Argon2 is CPU-bound.
    async fn hash_password(&self, password: String) -> Result<String, UserError> {
        let hasher = self.password_hasher;
        task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))?
            .map_err(UserError::from)
    }

    /// Verify on the blocking pool. Without a stored hash a decoy verification
    /// runs so unknown accounts take as long as wrong passwords.
    async fn verify_password(
        &self,
        password: String,
        stored_hash: Option<String>,
    ) -> Result<bool, UserError> {
        let hasher = self.password_hasher;
        task::spawn_blocking(move || match stored_hash {
            Some(hash) => hasher.verify(&password, &hash),
            None => hasher.verify_unknown(&password),
        })
        .await
        .map_err(|e| UserError::from(PasswordError::HashingFailed(e.to_string())))
    }
}

#[async_trait]
impl<UR> UserServicePort for UserService<UR>
where
    UR: UserRepository,
{
    async fn signup(&self, command: SignupCommand) -> Result<UserSession, UserError> {
        // A failed duplicate check aborts the registration.
        if self.repository.exists_by_email(&command.email).await? {
            return Err(UserError::EmailAlreadyExists(command.email.to_string()));
        }
        if self.repository.exists_by_phone(&command.phone).await? {
            return Err(UserError::PhoneAlreadyExists(command.phone.to_string()));
        }

        let password_hash = self
            .hash_password(command.password.expose().to_string())
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Password hashing failed during signup");
                e
            })?;

        let now = Utc::now();
        let mut user = User {
            id: UserId::new(),
            first_name: command.first_name,
            last_name: command.last_name,
            email: command.email,
            phone: command.phone,
            password_hash,
            user_type: command.user_type,
            token: None,
            refresh_token: None,
            created_at: now,
            updated_at: now,
        };

        let tokens = self
            .session_issuer
            .issue_tokens(&user.identity())
            .map_err(|e| {
                tracing::error!(user_id = %user.id, error = %e, "Token issuance failed");
                UserError::from(e)
            })?;
        user.token = Some(tokens.access_token.clone());
        user.refresh_token = Some(tokens.refresh_token.clone());

        let created_user = self.repository.create(user).await?;
        tracing::info!(user_id = %created_user.id, user_type = %created_user.user_type, "User registered");

        Ok(UserSession {
            user: created_user,
            tokens,
        })
    }

    async fn login(&self, command: LoginCommand) -> Result<UserSession, UserError> {
        let user = self.repository.find_by_email(&command.email).await?;
        let stored_hash = user.as_ref().map(|user| user.password_hash.clone());
        let verified = self.verify_password(command.password, stored_hash).await?;

        let Some(mut user) = user else {
            tracing::debug!("Login rejected: unknown email");
            return Err(UserError::InvalidCredentials);
        };

        if !verified {
            tracing::debug!(user_id = %user.id, "Login rejected: password mismatch");
            return Err(UserError::InvalidCredentials);
        }

        let tokens = self
            .session_issuer
            .issue_tokens(&user.identity())
            .map_err(|e| {
                tracing::error!(user_id = %user.id, error = %e, "Token issuance failed");
                UserError::from(e)
            })?;

        let updated_at = Utc::now();
        self.repository
            .store_issued_tokens(
                &user.id,
                &tokens.access_token,
                &tokens.refresh_token,
                updated_at,
            )
            .await
            .map_err(|e| {
                tracing::error!(user_id = %user.id, error = %e, "Failed to store issued tokens");
                match e {
                    UserError::NotFound(id) => {
                        UserError::DatabaseError(format!("user {} disappeared during login", id))
                    }
                    other => other,
                }
            })?;

        user.token = Some(tokens.access_token.clone());
        user.refresh_token = Some(tokens.refresh_token.clone());
        user.updated_at = updated_at;
        tracing::info!(user_id = %user.id, "User logged in");

        Ok(UserSession { user, tokens })
    }

    async fn get_user(&self, id: &UserId) -> Result<User, UserError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))
    }

    async fn list_users(&self) -> Result<Vec<User>, UserError> {
        self.repository.list_all().await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use auth::ClaimSet;
    use auth::Role;
    use auth::SigningKey;
    use auth::TokenCodec;
    use chrono::DateTime;
    use mockall::mock;

    use super::*;
    use crate::domain::user::models::EmailAddress;
    use crate::domain::user::models::Password;
    use crate::domain::user::models::PersonName;
    use crate::domain::user::models::PhoneNumber;
    use crate::outbound::repositories::InMemoryUserRepository;

    // Define mocks in the test module using mockall
    mock! {
        pub TestUserRepository {}

        #[async_trait]
        impl UserRepository for TestUserRepository {
            async fn create(&self, user: User) -> Result<User, UserError>;
            async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;
            async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError>;
            async fn exists_by_email(&self, email: &EmailAddress) -> Result<bool, UserError>;
            async fn exists_by_phone(&self, phone: &PhoneNumber) -> Result<bool, UserError>;
            async fn list_all(&self) -> Result<Vec<User>, UserError>;
            async fn store_issued_tokens(
                &self,
                id: &UserId,
                access_token: &str,
                refresh_token: &str,
                updated_at: DateTime<Utc>,
            ) -> Result<(), UserError>;
        }
    }

    fn codec() -> Arc<TokenCodec> {
        Arc::new(TokenCodec::new(
            &SigningKey::new("test_secret_key_at_least_32_bytes!").unwrap(),
        ))
    }

    fn service(
        repository: MockTestUserRepository,
        codec: &Arc<TokenCodec>,
    ) -> UserService<MockTestUserRepository> {
        UserService::new(
            Arc::new(repository),
            Arc::new(SessionIssuer::new(Arc::clone(codec))),
        )
    }

    fn signup_command() -> SignupCommand {
        SignupCommand {
            first_name: PersonName::new("Ada".to_string()).unwrap(),
            last_name: PersonName::new("Lovelace".to_string()).unwrap(),
            email: EmailAddress::new("a@x.com".to_string()).unwrap(),
            phone: PhoneNumber::new("5551234567".to_string()).unwrap(),
            password: Password::new("password123".to_string()).unwrap(),
            user_type: Role::User,
        }
    }

    fn stored_user(password: &str) -> User {
        let now = Utc::now();
        User {
            id: UserId::new(),
            first_name: PersonName::new("Ada".to_string()).unwrap(),
            last_name: PersonName::new("Lovelace".to_string()).unwrap(),
            email: EmailAddress::new("a@x.com".to_string()).unwrap(),
            phone: PhoneNumber::new("5551234567".to_string()).unwrap(),
            password_hash: PasswordHasher::new().hash(password).unwrap(),
            user_type: Role::User,
            token: None,
            refresh_token: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn login_command(password: &str) -> LoginCommand {
        LoginCommand::new("a@x.com", password.to_string())
    }

    #[tokio::test]
    async fn test_signup_success() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_exists_by_email()
            .times(1)
            .returning(|_| Ok(false));
        repository
            .expect_exists_by_phone()
            .times(1)
            .returning(|_| Ok(false));
        repository
            .expect_create()
            .withf(|user| {
                user.email.as_str() == "a@x.com"
                    && user.password_hash.starts_with("$argon2")
                    && user.token.is_some()
                    && user.refresh_token.is_some()
            })
            .times(1)
            .returning(|user| Ok(user));

        let codec = codec();
        let service = service(repository, &codec);

        let session = service
            .signup(signup_command())
            .await
            .expect("Signup failed");

        assert_eq!(
            session.user.token.as_deref(),
            Some(session.tokens.access_token.as_str())
        );
        assert_eq!(
            session.user.refresh_token.as_deref(),
            Some(session.tokens.refresh_token.as_str())
        );

        let claims: ClaimSet = codec.decode(&session.tokens.access_token).unwrap();
        assert_eq!(claims.uid(), session.user.id.to_string());
        assert_eq!(claims.role(), Role::User);
    }

    #[tokio::test]
    async fn test_signup_duplicate_email() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_exists_by_email()
            .times(1)
            .returning(|_| Ok(true));
        repository.expect_exists_by_phone().times(0);
        repository.expect_create().times(0);

        let service = service(repository, &codec());

        let result = service.signup(signup_command()).await;
        assert!(matches!(
            result.unwrap_err(),
            UserError::EmailAlreadyExists(_)
        ));
    }

    #[tokio::test]
    async fn test_signup_duplicate_phone() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_exists_by_email()
            .times(1)
            .returning(|_| Ok(false));
        repository
            .expect_exists_by_phone()
            .times(1)
            .returning(|_| Ok(true));
        repository.expect_create().times(0);

        let service = service(repository, &codec());

        let result = service.signup(signup_command()).await;
        assert!(matches!(
            result.unwrap_err(),
            UserError::PhoneAlreadyExists(_)
        ));
    }

    #[tokio::test]
    async fn test_signup_duplicate_check_failure_is_fatal() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_exists_by_email()
            .times(1)
            .returning(|_| Err(UserError::DatabaseError("connection reset".to_string())));
        repository.expect_exists_by_phone().times(0);
        repository.expect_create().times(0);

        let service = service(repository, &codec());

        let result = service.signup(signup_command()).await;
        assert!(matches!(result.unwrap_err(), UserError::DatabaseError(_)));
    }

    #[tokio::test]
    async fn test_signup_create_failure() {
        let mut repository = MockTestUserRepository::new();

        repository.expect_exists_by_email().returning(|_| Ok(false));
        repository.expect_exists_by_phone().returning(|_| Ok(false));
        repository
            .expect_create()
            .times(1)
            .returning(|_| Err(UserError::DatabaseError("insert failed".to_string())));

        let service = service(repository, &codec());

        let result = service.signup(signup_command()).await;
        assert!(matches!(result.unwrap_err(), UserError::DatabaseError(_)));
    }

    #[tokio::test]
    async fn test_login_success() {
        let mut repository = MockTestUserRepository::new();
        let user = stored_user("password123");
        let user_id = user.id;

        repository
            .expect_find_by_email()
            .withf(|email| email == "a@x.com")
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));
        repository
            .expect_store_issued_tokens()
            .withf(move |id, access_token, refresh_token, _| {
                *id == user_id && !access_token.is_empty() && access_token != refresh_token
            })
            .times(1)
            .returning(|_, _, _, _| Ok(()));

        let codec = codec();
        let service = service(repository, &codec);

        let session = service
            .login(login_command("password123"))
            .await
            .expect("Login failed");

        assert_eq!(session.user.id, user_id);
        assert_eq!(
            session.user.token.as_deref(),
            Some(session.tokens.access_token.as_str())
        );

        let claims: ClaimSet = codec.decode(&session.tokens.access_token).unwrap();
        assert_eq!(claims.uid(), user_id.to_string());
        assert_eq!(claims.email(), "a@x.com");
    }

    #[tokio::test]
    async fn test_login_unknown_email() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(None));
        repository.expect_store_issued_tokens().times(0);

        let service = service(repository, &codec());

        let result = service.login(login_command("password123")).await;
        assert!(matches!(result.unwrap_err(), UserError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_unknown_email_takes_as_long_as_wrong_password() {
        let service = UserService::new(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(SessionIssuer::new(codec())),
        );
        service.signup(signup_command()).await.unwrap();

        let mut wrong_password = std::time::Duration::ZERO;
        let mut unknown_email = std::time::Duration::ZERO;
        for _ in 0..3 {
            let start = Instant::now();
            let result = service.login(login_command("wrong_password")).await;
            wrong_password += start.elapsed();
            assert!(matches!(result, Err(UserError::InvalidCredentials)));

            let start = Instant::now();
            let result = service
                .login(LoginCommand::new("nobody@x.com", "wrong_password".to_string()))
                .await;
            unknown_email += start.elapsed();
            assert!(matches!(result, Err(UserError::InvalidCredentials)));
        }

        assert!(
            unknown_email * 4 >= wrong_password,
            "unknown email {:?} vs wrong password {:?}",
            unknown_email,
            wrong_password
        );
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let mut repository = MockTestUserRepository::new();
        let user = stored_user("password123");

        repository
            .expect_find_by_email()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));
        repository.expect_store_issued_tokens().times(0);

        let service = service(repository, &codec());

        let result = service.login(login_command("wrong_password")).await;
        assert!(matches!(result.unwrap_err(), UserError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_login_store_failure_returns_no_tokens() {
        let mut repository = MockTestUserRepository::new();
        let user = stored_user("password123");

        repository
            .expect_find_by_email()
            .returning(move |_| Ok(Some(user.clone())));
        repository
            .expect_store_issued_tokens()
            .times(1)
            .returning(|_, _, _, _| Err(UserError::DatabaseError("write failed".to_string())));

        let service = service(repository, &codec());

        let result = service.login(login_command("password123")).await;
        assert!(matches!(result.unwrap_err(), UserError::DatabaseError(_)));
    }

    #[tokio::test]
    async fn test_get_user_success() {
        let mut repository = MockTestUserRepository::new();
        let user = stored_user("password123");
        let user_id = user.id;

        repository
            .expect_find_by_id()
            .withf(move |id| *id == user_id)
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        let service = service(repository, &codec());

        let found = service.get_user(&user_id).await.unwrap();
        assert_eq!(found.id, user_id);
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_id()
            .times(1)
            .returning(|_| Ok(None));

        let service = service(repository, &codec());

        let result = service.get_user(&UserId::new()).await;
        assert!(matches!(result.unwrap_err(), UserError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_users() {
        let mut repository = MockTestUserRepository::new();
        let users = vec![stored_user("password123"), stored_user("password456")];

        repository
            .expect_list_all()
            .times(1)
            .returning(move || Ok(users.clone()));

        let service = service(repository, &codec());

        assert_eq!(service.list_users().await.unwrap().len(), 2);
    }
}
