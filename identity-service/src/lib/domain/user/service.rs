use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::user::models::CreateUserCommand;
use crate::domain::user::models::UpdateAccountCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

/// Domain service implementation for user operations.
///
/// Concrete implementation of UserServicePort with dependency injection.
pub struct UserService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    authenticator: Arc<auth::Authenticator>,
}

impl<UR> UserService<UR>
where
    UR: UserRepository,
{
    /// Create a new user service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `authenticator` - Password hashing (shared with the session service)
    pub fn new(repository: Arc<UR>, authenticator: Arc<auth::Authenticator>) -> Self {
        Self {
            repository,
            authenticator,
        }
    }
}

#[async_trait]
impl<UR> UserServicePort for UserService<UR>
where
    UR: UserRepository,
{
    async fn create_user(&self, command: CreateUserCommand) -> Result<User, UserError> {
        // Argon2 runs on the blocking pool, off the async workers
        let authenticator = Arc::clone(&self.authenticator);
        let password = command.password;
        let password_hash = tokio::task::spawn_blocking(move || authenticator.hash_password(&password))
            .await
            .map_err(|e| auth::PasswordError::HashingFailed(e.to_string()))??;

        let now = Utc::now();
        let user = User {
            id: UserId::new(),
            username: command.username,
            email: command.email,
            fullname: command.fullname,
            avatar: command.avatar,
            cover_image: command.cover_image,
            password_hash,
            refresh_token: None,
            created_at: now,
            updated_at: now,
        };

        let created_user = self.repository.create(user).await?;
        tracing::info!(user_id = %created_user.id, username = %created_user.username, "User registered");

        Ok(created_user)
    }

    async fn get_user(&self, id: &UserId) -> Result<User, UserError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))
    }

    async fn update_account(
        &self,
        id: &UserId,
        command: UpdateAccountCommand,
    ) -> Result<User, UserError> {
        let mut user = self.get_user(id).await?;

        if let Some(fullname) = command.fullname {
            user.fullname = fullname;
        }

        if let Some(email) = command.email {
            user.email = email;
        }

        user.updated_at = Utc::now();
        self.repository.update(user).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;

    use auth::AuthSettings;
    use auth::HashingParams;
    use auth::TokenSettings;
    use chrono::Duration;
    use mockall::mock;
    use mockall::predicate::*;

    use super::*;
    use crate::domain::user::models::EmailAddress;
    use crate::domain::user::models::Username;

    mock! {
        pub TestUserRepository {}

        #[async_trait]
        impl UserRepository for TestUserRepository {
            async fn create(&self, user: User) -> Result<User, UserError>;
            async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;
            async fn find_by_username_or_email(&self, identifier: &str) -> Result<Option<User>, UserError>;
            async fn update(&self, user: User) -> Result<User, UserError>;
            async fn update_password(&self, id: &UserId, password_hash: String, clear_refresh_token: bool) -> Result<(), UserError>;
        }
    }

    fn test_authenticator() -> Arc<auth::Authenticator> {
        Arc::new(
            auth::Authenticator::new(AuthSettings {
                access: TokenSettings::new("access_secret_for_tests_32_bytes_ok", Duration::minutes(15)),
                refresh: TokenSettings::new("refresh_secret_for_tests_32_bytes_ok", Duration::days(10)),
                hashing: HashingParams {
                    memory_kib: 1024,
                    iterations: 1,
                    parallelism: 1,
                },
            })
            .unwrap(),
        )
    }

    fn create_command(username: &str, email: &str) -> CreateUserCommand {
        CreateUserCommand::new(
            Username::new(username.to_string()).unwrap(),
            EmailAddress::new(email.to_string()).unwrap(),
            "Test User".to_string(),
            "https://cdn.example.com/avatar.png".to_string(),
            None,
            "password123".to_string(),
        )
        .unwrap()
    }

    fn existing_user(id: UserId) -> User {
        User {
            id,
            username: Username::new("testuser".to_string()).unwrap(),
            email: EmailAddress::new("test@example.com".to_string()).unwrap(),
            fullname: "Test User".to_string(),
            avatar: "https://cdn.example.com/avatar.png".to_string(),
            cover_image: None,
            password_hash: "$argon2id$test_hash".to_string(),
            refresh_token: Some("live-refresh-token".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_user_success() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_create()
            .withf(|user| {
                user.username.as_str() == "testuser"
                    && user.email.as_str() == "test@example.com"
                    && user.password_hash.starts_with("$argon2id")
                    && user.refresh_token.is_none()
            })
            .times(1)
            .returning(|user| Ok(user));

        let service = UserService::new(Arc::new(repository), test_authenticator());

        let user = service
            .create_user(create_command("testuser", "test@example.com"))
            .await
            .unwrap();

        assert_eq!(user.username.as_str(), "testuser");
        assert_ne!(user.password_hash, "password123");
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_create_user_hashes_off_the_async_worker() {
        let mut repository = MockTestUserRepository::new();
        repository.expect_create().times(1).returning(|user| Ok(user));

        let service = UserService::new(Arc::new(repository), test_authenticator());

        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ticks);
        let ticker = tokio::spawn(async move {
            loop {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::task::yield_now().await;
            }
        });

        let result = service
            .create_user(create_command("testuser", "test@example.com"))
            .await;
        ticker.abort();

        assert!(result.is_ok());
        // The repository mock resolves at once, so only the hashing task can yield
        assert!(ticks.load(Ordering::SeqCst) > 0);
    }

    #[tokio::test]
    async fn test_create_user_duplicate_username() {
        let mut repository = MockTestUserRepository::new();

        repository.expect_create().times(1).returning(|user| {
            Err(UserError::UsernameAlreadyExists(
                user.username.as_str().to_string(),
            ))
        });

        let service = UserService::new(Arc::new(repository), test_authenticator());

        let result = service
            .create_user(create_command("testuser", "other@example.com"))
            .await;
        assert!(matches!(result, Err(UserError::UsernameAlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_id()
            .times(1)
            .returning(|_| Ok(None));

        let service = UserService::new(Arc::new(repository), test_authenticator());

        let result = service.get_user(&UserId::new()).await;
        assert!(matches!(result, Err(UserError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_account_success() {
        let mut repository = MockTestUserRepository::new();
        let user_id = UserId::new();

        repository
            .expect_find_by_id()
            .with(eq(user_id))
            .times(1)
            .returning(move |id| Ok(Some(existing_user(*id))));

        repository
            .expect_update()
            .withf(|user| {
                user.fullname == "New Name"
                    && user.email.as_str() == "new@example.com"
            })
            .times(1)
            .returning(|user| Ok(user));

        let service = UserService::new(Arc::new(repository), test_authenticator());

        let command = UpdateAccountCommand::new(
            Some("New Name".to_string()),
            Some(EmailAddress::new("new@example.com".to_string()).unwrap()),
        )
        .unwrap();

        let user = service.update_account(&user_id, command).await.unwrap();
        assert_eq!(user.fullname, "New Name");
    }

    #[tokio::test]
    async fn test_update_account_not_found() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_id()
            .times(1)
            .returning(|_| Ok(None));
        repository.expect_update().times(0);

        let service = UserService::new(Arc::new(repository), test_authenticator());

        let command = UpdateAccountCommand::new(Some("New Name".to_string()), None).unwrap();
        let result = service.update_account(&UserId::new(), command).await;
        assert!(matches!(result, Err(UserError::NotFound(_))));
    }
}
