use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::session::ports::SessionStore;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

/// Process-local user store.
///
/// Serves development runs without a database and the HTTP test harness.
/// Writes hold the lock for the whole check-then-write, so uniqueness and
/// last-write-wins on the refresh token hold under concurrent requests.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_unique(users: &HashMap<UserId, User>, user: &User) -> Result<(), UserError> {
        for existing in users.values().filter(|u| u.id != user.id) {
            if existing.username == user.username {
                return Err(UserError::UsernameAlreadyExists(
                    user.username.as_str().to_string(),
                ));
            }
            if existing.email == user.email {
                return Err(UserError::EmailAlreadyExists(user.email.as_str().to_string()));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> Result<User, UserError> {
        let mut users = self.users.write().await;
        Self::check_unique(&users, &user)?;
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_username_or_email(
        &self,
        identifier: &str,
    ) -> Result<Option<User>, UserError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.username.as_str() == identifier || u.email.as_str() == identifier)
            .cloned())
    }

    async fn update(&self, user: User) -> Result<User, UserError> {
        let mut users = self.users.write().await;
        Self::check_unique(&users, &user)?;

        let stored = users
            .get_mut(&user.id)
            .ok_or_else(|| UserError::NotFound(user.id.to_string()))?;

        stored.username = user.username;
        stored.email = user.email;
        stored.fullname = user.fullname;
        stored.avatar = user.avatar;
        stored.cover_image = user.cover_image;
        stored.updated_at = user.updated_at;

        Ok(stored.clone())
    }

    async fn update_password(
        &self,
        id: &UserId,
        password_hash: String,
        clear_refresh_token: bool,
    ) -> Result<(), UserError> {
        let mut users = self.users.write().await;
        let stored = users
            .get_mut(id)
            .ok_or_else(|| UserError::NotFound(id.to_string()))?;

        stored.password_hash = password_hash;
        if clear_refresh_token {
            stored.refresh_token = None;
        }
        stored.updated_at = Utc::now();

        Ok(())
    }
}

#[async_trait]
impl SessionStore for InMemoryUserRepository {
    async fn set_refresh_token(
        &self,
        user_id: &UserId,
        refresh_token: Option<String>,
    ) -> Result<(), UserError> {
        let mut users = self.users.write().await;
        let stored = users
            .get_mut(user_id)
            .ok_or_else(|| UserError::NotFound(user_id.to_string()))?;
        stored.refresh_token = refresh_token;
        Ok(())
    }

    async fn get_refresh_token(&self, user_id: &UserId) -> Result<Option<String>, UserError> {
        self.users
            .read()
            .await
            .get(user_id)
            .map(|u| u.refresh_token.clone())
            .ok_or_else(|| UserError::NotFound(user_id.to_string()))
    }
}
