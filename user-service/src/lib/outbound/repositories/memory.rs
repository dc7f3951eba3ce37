use std::collections::HashMap;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::PhoneNumber;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

/// Process-local user store.
///
/// Used when no database is configured and by the integration tests.
/// Enforces the same uniqueness rules as the PostgreSQL schema.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> Result<User, UserError> {
        let mut users = self.users.write().await;

        if users.values().any(|u| u.email == user.email) {
            return Err(UserError::EmailAlreadyExists(user.email.to_string()));
        }
        if users.values().any(|u| u.phone == user.phone) {
            return Err(UserError::PhoneAlreadyExists(user.phone.to_string()));
        }

        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email.as_str() == email)
            .cloned())
    }

    async fn exists_by_email(&self, email: &EmailAddress) -> Result<bool, UserError> {
        Ok(self.users.read().await.values().any(|u| &u.email == email))
    }

    async fn exists_by_phone(&self, phone: &PhoneNumber) -> Result<bool, UserError> {
        Ok(self.users.read().await.values().any(|u| &u.phone == phone))
    }

    async fn list_all(&self) -> Result<Vec<User>, UserError> {
        let mut users: Vec<User> = self.users.read().await.values().cloned().collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    async fn store_issued_tokens(
        &self,
        id: &UserId,
        access_token: &str,
        refresh_token: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<(), UserError> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(id)
            .ok_or_else(|| UserError::NotFound(id.to_string()))?;

        user.token = Some(access_token.to_string());
        user.refresh_token = Some(refresh_token.to_string());
        user.updated_at = updated_at;
        Ok(())
    }
}
