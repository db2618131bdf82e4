use std::sync::Arc;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;
use auth::Claims;
use auth::JwtError;
use auth::TokenClass;
use auth::TokenPair;

use crate::domain::session::errors::SessionError;
use crate::domain::session::errors::UnauthenticatedReason;
use crate::domain::session::models::ChangePasswordCommand;
use crate::domain::session::models::LoginCommand;
use crate::domain::session::models::PasswordChanged;
use crate::domain::session::models::Session;
use crate::domain::session::models::SessionPolicy;
use crate::domain::session::ports::SessionServicePort;
use crate::domain::session::ports::SessionStore;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::UserProfile;
use crate::user::ports::UserRepository;

/// Run Argon2 work on the blocking pool so it never stalls the async workers.
async fn blocking<T, F>(work: F) -> Result<T, SessionError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| SessionError::Internal(format!("Password task failed: {}", e)))
}

/// Session lifecycle state machine.
///
/// Per identity: anonymous, then authenticated with exactly one live refresh
/// token, which login and refresh replace and logout clears. The write that
/// makes a new refresh token live is always the last step of an operation,
/// so a failure before it never leaves two live tokens.
pub struct SessionService<UR, SS>
where
    UR: UserRepository,
    SS: SessionStore,
{
    users: Arc<UR>,
    store: Arc<SS>,
    authenticator: Arc<Authenticator>,
    policy: SessionPolicy,
}

impl<UR, SS> SessionService<UR, SS>
where
    UR: UserRepository,
    SS: SessionStore,
{
    /// Create a new session service with injected dependencies.
    ///
    /// # Arguments
    /// * `users` - Identity record lookup and credential writes
    /// * `store` - Live refresh token storage
    /// * `authenticator` - Password verification and token codec
    /// * `policy` - Lifecycle policy
    pub fn new(
        users: Arc<UR>,
        store: Arc<SS>,
        authenticator: Arc<Authenticator>,
        policy: SessionPolicy,
    ) -> Self {
        Self {
            users,
            store,
            authenticator,
            policy,
        }
    }

    fn access_claims(user: &User) -> Claims {
        Claims::new()
            .with_subject(user.id)
            .with_extra("username", user.username.as_str())
            .with_extra("email", user.email.as_str())
            .with_extra("fullname", &user.fullname)
    }

    fn refresh_claims(user: &User) -> Claims {
        Claims::new().with_subject(user.id)
    }

    /// Make the refresh token of `tokens` the live one for `user`.
    async fn make_live(&self, user: &User, tokens: TokenPair) -> Result<Session, SessionError> {
        self.store
            .set_refresh_token(&user.id, Some(tokens.refresh_token.clone()))
            .await?;

        Ok(Session {
            user: user.profile(),
            tokens,
        })
    }

    /// Verify a token of `class` and load the user it names.
    async fn resolve(&self, token: &str, class: TokenClass) -> Result<User, SessionError> {
        let claims = self
            .authenticator
            .validate_token(token, class)
            .map_err(|e| SessionError::Unauthenticated(UnauthenticatedReason::InvalidToken(e)))?;

        let user_id = claims
            .sub
            .as_deref()
            .and_then(|sub| UserId::from_string(sub).ok())
            .ok_or_else(|| {
                SessionError::Unauthenticated(UnauthenticatedReason::InvalidToken(
                    JwtError::MissingClaim("sub".to_string()),
                ))
            })?;

        self.users
            .find_by_id(&user_id)
            .await?
            .ok_or(SessionError::Unauthenticated(
                UnauthenticatedReason::UnknownIdentity,
            ))
    }
}

#[async_trait]
impl<UR, SS> SessionServicePort for SessionService<UR, SS>
where
    UR: UserRepository,
    SS: SessionStore,
{
    async fn login(&self, command: LoginCommand) -> Result<Session, SessionError> {
        let authenticator = Arc::clone(&self.authenticator);
        let password = command.password;

        let Some(user) = self
            .users
            .find_by_username_or_email(&command.identifier)
            .await?
        else {
            // Same Argon2 cost as a wrong password, so timing does not reveal the identifier
            if let Err(err) = blocking(move || authenticator.verify_unknown(&password)).await? {
                tracing::error!(error = %err, "Placeholder password verification failed");
            }
            tracing::debug!("Login rejected: unknown identifier");
            return Err(SessionError::Unauthorized);
        };

        let stored_hash = user.password_hash.clone();
        let access_claims = Self::access_claims(&user);
        let refresh_claims = Self::refresh_claims(&user);

        let tokens = blocking(move || {
            authenticator.authenticate(&password, &stored_hash, access_claims, refresh_claims)
        })
        .await?
        .map_err(|e| match e {
            AuthenticationError::InvalidCredentials => {
                tracing::debug!(user_id = %user.id, "Login rejected: wrong password");
                SessionError::Unauthorized
            }
            AuthenticationError::PasswordError(err) => {
                tracing::error!(user_id = %user.id, error = %err, "Stored password hash is unusable");
                SessionError::Internal(format!("Password verification failed: {}", err))
            }
            AuthenticationError::JwtError(err) => {
                SessionError::Internal(format!("Token generation failed: {}", err))
            }
        })?;

        let session = self.make_live(&user, tokens).await?;
        tracing::info!(user_id = %user.id, "Session opened");

        Ok(session)
    }

    async fn refresh(&self, refresh_token: Option<&str>) -> Result<Session, SessionError> {
        let token = refresh_token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(SessionError::Unauthenticated(
                UnauthenticatedReason::MissingToken,
            ))?;

        let user = self.resolve(token, TokenClass::Refresh).await?;

        let live = self.store.get_refresh_token(&user.id).await?;
        if live.as_deref() != Some(token) {
            tracing::warn!(user_id = %user.id, "Stale refresh token presented");
            return Err(SessionError::Unauthenticated(
                UnauthenticatedReason::StaleToken,
            ));
        }

        let tokens = self
            .authenticator
            .issue_token_pair(Self::access_claims(&user), Self::refresh_claims(&user))
            .map_err(|e| SessionError::Internal(format!("Token generation failed: {}", e)))?;

        let session = self.make_live(&user, tokens).await?;
        tracing::info!(user_id = %user.id, "Session rotated");

        Ok(session)
    }

    async fn logout(&self, user_id: &UserId) -> Result<(), SessionError> {
        self.store.set_refresh_token(user_id, None).await?;
        tracing::info!(user_id = %user_id, "Session closed");
        Ok(())
    }

    async fn change_password(
        &self,
        user_id: &UserId,
        command: ChangePasswordCommand,
    ) -> Result<PasswordChanged, SessionError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| SessionError::NotFound(user_id.to_string()))?;

        let authenticator = Arc::clone(&self.authenticator);
        let stored_hash = user.password_hash;
        let rehashed = blocking(move || -> Result<Option<String>, auth::PasswordError> {
            if !authenticator.verify_password(&command.current_password, &stored_hash)? {
                return Ok(None);
            }
            authenticator.hash_password(&command.new_password).map(Some)
        })
        .await??;

        let Some(password_hash) = rehashed else {
            return Err(SessionError::Unauthorized);
        };
        let session_revoked = self.policy.revoke_on_password_change;

        self.users
            .update_password(user_id, password_hash, session_revoked)
            .await?;

        tracing::info!(user_id = %user_id, session_revoked, "Password changed");

        Ok(PasswordChanged { session_revoked })
    }

    async fn authenticate(&self, access_token: &str) -> Result<UserProfile, SessionError> {
        let user = self.resolve(access_token, TokenClass::Access).await?;
        Ok(user.profile())
    }
}
