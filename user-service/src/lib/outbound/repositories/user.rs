use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::PersonName;
use crate::domain::user::models::PhoneNumber;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

const USER_COLUMNS: &str = "id, first_name, last_name, email, phone, password_hash, user_type, \
     token, refresh_token, created_at, updated_at";

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    first_name: String,
    last_name: String,
    email: String,
    phone: String,
    password_hash: String,
    user_type: String,
    token: Option<String>,
    refresh_token: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = UserError;

    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: UserId(r.id),
            first_name: PersonName::new(r.first_name)?,
            last_name: PersonName::new(r.last_name)?,
            email: EmailAddress::new(r.email)?,
            phone: PhoneNumber::new(r.phone)?,
            password_hash: r.password_hash,
            user_type: r.user_type.parse()?,
            token: r.token,
            refresh_token: r.refresh_token,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

fn database_error(e: sqlx::Error) -> UserError {
    UserError::DatabaseError(e.to_string())
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: User) -> Result<User, UserError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, first_name, last_name, email, phone, password_hash,
                               user_type, token, refresh_token, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(user.id.0)
        .bind(user.first_name.as_str())
        .bind(user.last_name.as_str())
        .bind(user.email.as_str())
        .bind(user.phone.as_str())
        .bind(&user.password_hash)
        .bind(user.user_type.as_str())
        .bind(&user.token)
        .bind(&user.refresh_token)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    if db_err.constraint() == Some("users_email_key") {
                        return UserError::EmailAlreadyExists(user.email.to_string());
                    }
                    if db_err.constraint() == Some("users_phone_key") {
                        return UserError::PhoneAlreadyExists(user.phone.to_string());
                    }
                }
            }
            database_error(e)
        })?;

        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
                .bind(id.0)
                .fetch_optional(&self.pool)
                .await
                .map_err(database_error)?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS))
                .bind(email)
                .fetch_optional(&self.pool)
                .await
                .map_err(database_error)?;

        row.map(User::try_from).transpose()
    }

    async fn exists_by_email(&self, email: &EmailAddress) -> Result<bool, UserError> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(database_error)
    }

    async fn exists_by_phone(&self, phone: &PhoneNumber) -> Result<bool, UserError> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE phone = $1)")
            .bind(phone.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(database_error)
    }

    async fn list_all(&self) -> Result<Vec<User>, UserError> {
        let rows: Vec<UserRow> = sqlx::query_as(&format!(
            "SELECT {} FROM users ORDER BY created_at DESC",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(database_error)?;

        rows.into_iter().map(User::try_from).collect()
    }

    async fn store_issued_tokens(
        &self,
        id: &UserId,
        access_token: &str,
        refresh_token: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<(), UserError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET token = $2, refresh_token = $3, updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .bind(access_token)
        .bind(refresh_token)
        .bind(updated_at)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        if result.rows_affected() == 0 {
            return Err(UserError::NotFound(id.to_string()));
        }

        Ok(())
    }
}
