use thiserror::Error;

use super::claims::TokenClass;

/// Error type for JWT operations.
///
/// Verification failures carry a distinct reason so callers can log them.
/// They should not be echoed to clients.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Malformed token: {0}")]
    Malformed(String),

    #[error("Token signature does not match")]
    SignatureMismatch,

    #[error("Token is expired")]
    Expired,

    #[error("Wrong token class: expected {expected}, found {found}")]
    WrongClass {
        expected: TokenClass,
        found: TokenClass,
    },

    #[error("Missing required claim: {0}")]
    MissingClaim(String),
}
