use auth::TokenPair;

use crate::domain::session::errors::SessionError;
use crate::domain::user::models::UserProfile;

/// Command to open a session with a username-or-email and password.
#[derive(Debug)]
pub struct LoginCommand {
    /// Trimmed, lower-cased username or email
    pub identifier: String,
    pub password: String,
}

impl LoginCommand {
    /// # Errors
    /// * `Validation` - Identifier or password is blank
    pub fn new(identifier: String, password: String) -> Result<Self, SessionError> {
        let identifier = identifier.trim().to_lowercase();
        if identifier.is_empty() {
            return Err(SessionError::Validation(
                "Username or email is required".to_string(),
            ));
        }
        if password.is_empty() {
            return Err(SessionError::Validation("Password is required".to_string()));
        }
        Ok(Self {
            identifier,
            password,
        })
    }
}

/// Command to replace the password of an authenticated user.
#[derive(Debug)]
pub struct ChangePasswordCommand {
    pub current_password: String,
    pub new_password: String,
}

impl ChangePasswordCommand {
    /// # Errors
    /// * `Validation` - Either password is blank
    pub fn new(current_password: String, new_password: String) -> Result<Self, SessionError> {
        if current_password.is_empty() {
            return Err(SessionError::Validation(
                "Current password is required".to_string(),
            ));
        }
        if new_password.trim().is_empty() {
            return Err(SessionError::Validation("New password is required".to_string()));
        }
        Ok(Self {
            current_password,
            new_password,
        })
    }
}

/// An opened or rotated session: who, plus the freshly minted tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user: UserProfile,
    pub tokens: TokenPair,
}

/// Result of a successful password change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordChanged {
    /// The live refresh token was cleared along with the new hash
    pub session_revoked: bool,
}

/// Session lifecycle policy, fixed at start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPolicy {
    pub revoke_on_password_change: bool,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            revoke_on_password_change: true,
        }
    }
}
