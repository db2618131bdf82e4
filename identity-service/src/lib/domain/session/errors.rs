use std::fmt;

use thiserror::Error;

use crate::user::errors::UserError;

/// Why a presented token did not establish a session.
///
/// Kept for logs; clients only ever see a generic message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnauthenticatedReason {
    /// No token presented
    MissingToken,
    /// Malformed, forged, expired or wrong-class token
    InvalidToken(auth::JwtError),
    /// Token subject no longer exists
    UnknownIdentity,
    /// Authentic refresh token that is no longer the live one
    StaleToken,
}

impl fmt::Display for UnauthenticatedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnauthenticatedReason::MissingToken => f.write_str("no token presented"),
            UnauthenticatedReason::InvalidToken(e) => write!(f, "invalid or expired token: {}", e),
            UnauthenticatedReason::UnknownIdentity => f.write_str("token subject does not exist"),
            UnauthenticatedReason::StaleToken => f.write_str("refresh token is stale or reused"),
        }
    }
}

/// Top-level error for session operations.
///
/// Each variant is a stable kind the transport maps to one status code.
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    #[error("Validation error: {0}")]
    Validation(String),

    /// Credentials presented but wrong; also used for unknown identities
    #[error("Invalid credentials")]
    Unauthorized,

    #[error("Unauthenticated: {0}")]
    Unauthenticated(UnauthenticatedReason),

    #[error("User not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<UserError> for SessionError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(id) => SessionError::NotFound(id),
            UserError::UsernameAlreadyExists(_) | UserError::EmailAlreadyExists(_) => {
                SessionError::Conflict(err.to_string())
            }
            UserError::InvalidUserId(_)
            | UserError::InvalidUsername(_)
            | UserError::InvalidEmail(_)
            | UserError::MissingField(_) => SessionError::Validation(err.to_string()),
            UserError::Password(_) | UserError::DatabaseError(_) => {
                SessionError::Internal(err.to_string())
            }
        }
    }
}

impl From<auth::PasswordError> for SessionError {
    fn from(err: auth::PasswordError) -> Self {
        SessionError::Internal(err.to_string())
    }
}
