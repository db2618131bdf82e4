use async_trait::async_trait;

use crate::domain::session::errors::SessionError;
use crate::domain::session::models::ChangePasswordCommand;
use crate::domain::session::models::LoginCommand;
use crate::domain::session::models::PasswordChanged;
use crate::domain::session::models::Session;
use crate::domain::user::models::UserId;
use crate::domain::user::models::UserProfile;
use crate::user::errors::UserError;

/// Port for the session lifecycle: login, rotation, logout, password change,
/// and access-token authentication of requests.
#[async_trait]
pub trait SessionServicePort: Send + Sync + 'static {
    /// Open a session.
    ///
    /// Replaces any previously live refresh token of the user.
    ///
    /// # Errors
    /// * `Unauthorized` - Unknown identifier or wrong password (indistinguishable)
    /// * `Internal` - Store, hashing or signing failure
    async fn login(&self, command: LoginCommand) -> Result<Session, SessionError>;

    /// Exchange the live refresh token for a new token pair.
    ///
    /// The presented token is dead afterwards.
    ///
    /// # Errors
    /// * `Unauthenticated` - Missing, invalid, expired, orphaned or stale token
    /// * `Internal` - Store or signing failure
    async fn refresh(&self, refresh_token: Option<&str>) -> Result<Session, SessionError>;

    /// Clear the live refresh token. Idempotent.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `Internal` - Store failure
    async fn logout(&self, user_id: &UserId) -> Result<(), SessionError>;

    /// Re-verify the current password and store a new one.
    ///
    /// Nothing is written when the current password is wrong.
    ///
    /// # Errors
    /// * `Unauthorized` - Current password is wrong
    /// * `NotFound` - User does not exist
    /// * `Internal` - Store or hashing failure
    async fn change_password(
        &self,
        user_id: &UserId,
        command: ChangePasswordCommand,
    ) -> Result<PasswordChanged, SessionError>;

    /// Resolve the user behind an access token.
    ///
    /// # Errors
    /// * `Unauthenticated` - Invalid or expired token, or user no longer exists
    /// * `Internal` - Store failure
    async fn authenticate(&self, access_token: &str) -> Result<UserProfile, SessionError>;
}

/// Storage of the live refresh token per identity.
///
/// One token per identity today. A per-device store would key tokens by
/// device in its own table and implement these two calls over the device's
/// slot, leaving the session service untouched.
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    /// Replace (or clear, with `None`) the live refresh token. Last write wins.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn set_refresh_token(
        &self,
        user_id: &UserId,
        refresh_token: Option<String>,
    ) -> Result<(), UserError>;

    /// Read the live refresh token.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn get_refresh_token(&self, user_id: &UserId) -> Result<Option<String>, UserError>;
}
