use std::sync::Arc;

use uuid::Uuid;

use crate::jwt::Claims;
use crate::jwt::Clock;
use crate::jwt::JwtError;
use crate::jwt::SystemClock;
use crate::jwt::TokenClass;
use crate::jwt::TokenCodec;
use crate::jwt::TokenSettings;
use crate::password::HashingParams;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Everything the authenticator needs, fixed at process start.
#[derive(Clone)]
pub struct AuthSettings {
    pub access: TokenSettings,
    pub refresh: TokenSettings,
    pub hashing: HashingParams,
}

/// Authentication coordinator combining password verification and token issuance.
///
/// Provides high-level authentication operations by coordinating
/// password hashing and the access/refresh token codec.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    codec: TokenCodec,
    /// Hash of a random secret with the configured work factor, verified
    /// against when the identity is unknown
    placeholder_hash: String,
}

/// Freshly minted access and refresh tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

impl Authenticator {
    /// Create a new authenticator using the system clock.
    ///
    /// # Arguments
    /// * `settings` - Signing secrets, token lifetimes and hashing work factor
    ///
    /// # Errors
    /// * `InvalidParams` - Hashing work factor is not accepted by Argon2
    pub fn new(settings: AuthSettings) -> Result<Self, PasswordError> {
        Self::with_clock(settings, Arc::new(SystemClock))
    }

    /// Create a new authenticator reading time from `clock`.
    pub fn with_clock(settings: AuthSettings, clock: Arc<dyn Clock>) -> Result<Self, PasswordError> {
        let password_hasher = PasswordHasher::with_params(settings.hashing)?;
        let placeholder_hash = password_hasher.hash(&Uuid::new_v4().to_string())?;

        Ok(Self {
            password_hasher,
            codec: TokenCodec::with_clock(settings.access, settings.refresh, clock),
            placeholder_hash,
        })
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Check a password against a stored hash.
    ///
    /// # Returns
    /// False for a wrong password
    ///
    /// # Errors
    /// * `PasswordError` - Stored hash is malformed
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> Result<bool, PasswordError> {
        self.password_hasher.verify(password, stored_hash)
    }

    /// Run a full password verification for an identity that does not exist.
    ///
    /// Costs the same as checking a real stored hash, so a login for an
    /// unknown identifier takes as long as one with a wrong password.
    /// The outcome is always a mismatch and is discarded.
    ///
    /// # Errors
    /// * `PasswordError` - The Argon2 primitive failed
    pub fn verify_unknown(&self, password: &str) -> Result<(), PasswordError> {
        self.password_hasher
            .verify(password, &self.placeholder_hash)
            .map(|_| ())
    }

    /// Verify credentials and mint an access/refresh token pair.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `stored_hash` - Stored password hash
    /// * `access_claims` - Claims for the access token
    /// * `refresh_claims` - Claims for the refresh token
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `PasswordError` - Password verification failed
    /// * `JwtError` - Token generation failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: &str,
        access_claims: Claims,
        refresh_claims: Claims,
    ) -> Result<TokenPair, AuthenticationError> {
        if !self.password_hasher.verify(password, stored_hash)? {
            return Err(AuthenticationError::InvalidCredentials);
        }

        Ok(self.issue_token_pair(access_claims, refresh_claims)?)
    }

    /// Mint an access/refresh token pair without password verification.
    ///
    /// Used by the refresh flow, where the caller proved possession of a
    /// live refresh token instead.
    pub fn issue_token_pair(
        &self,
        access_claims: Claims,
        refresh_claims: Claims,
    ) -> Result<TokenPair, JwtError> {
        Ok(TokenPair {
            access_token: self.codec.issue(access_claims, TokenClass::Access)?,
            refresh_token: self.codec.issue(refresh_claims, TokenClass::Refresh)?,
        })
    }

    /// Validate a token of the given class and decode its claims.
    ///
    /// # Errors
    /// * `JwtError` - Malformed, forged, expired or wrong-class token
    pub fn validate_token(&self, token: &str, class: TokenClass) -> Result<Claims, JwtError> {
        self.codec.verify(token, class)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::jwt::ManualClock;

    fn test_settings() -> AuthSettings {
        AuthSettings {
            access: TokenSettings::new(
                "test_access_secret_at_least_32_bytes!",
                Duration::minutes(15),
            ),
            refresh: TokenSettings::new(
                "test_refresh_secret_at_least_32_bytes",
                Duration::days(10),
            ),
            hashing: HashingParams {
                memory_kib: 1024,
                iterations: 1,
                parallelism: 1,
            },
        }
    }

    #[test]
    fn test_authenticate_success() {
        let authenticator = Authenticator::new(test_settings()).unwrap();

        let password = "my_password";
        let hash = authenticator
            .hash_password(password)
            .expect("Failed to hash password");

        let pair = authenticator
            .authenticate(
                password,
                &hash,
                Claims::new().with_subject("user123"),
                Claims::new().with_subject("user123"),
            )
            .expect("Authentication failed");

        let access = authenticator
            .validate_token(&pair.access_token, TokenClass::Access)
            .expect("Access token validation failed");
        assert_eq!(access.sub, Some("user123".to_string()));

        let refresh = authenticator
            .validate_token(&pair.refresh_token, TokenClass::Refresh)
            .expect("Refresh token validation failed");
        assert_eq!(refresh.sub, Some("user123".to_string()));
    }

    #[test]
    fn test_authenticate_invalid_password() {
        let authenticator = Authenticator::new(test_settings()).unwrap();

        let hash = authenticator
            .hash_password("my_password")
            .expect("Failed to hash password");

        let result = authenticator.authenticate(
            "wrong_password",
            &hash,
            Claims::new().with_subject("user123"),
            Claims::new().with_subject("user123"),
        );
        assert!(matches!(
            result,
            Err(AuthenticationError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_authenticate_corrupt_hash() {
        let authenticator = Authenticator::new(test_settings()).unwrap();

        let result = authenticator.authenticate(
            "my_password",
            "not-a-phc-string",
            Claims::new(),
            Claims::new(),
        );
        assert!(matches!(
            result,
            Err(AuthenticationError::PasswordError(_))
        ));
    }

    #[test]
    fn test_token_pair_expiry_follows_clock() {
        let clock = Arc::new(ManualClock::new(1_700_000_000));
        let authenticator = Authenticator::with_clock(test_settings(), clock.clone()).unwrap();

        let pair = authenticator
            .issue_token_pair(
                Claims::new().with_subject("user123"),
                Claims::new().with_subject("user123"),
            )
            .unwrap();

        clock.advance(Duration::minutes(15));
        assert_eq!(
            authenticator.validate_token(&pair.access_token, TokenClass::Access),
            Err(JwtError::Expired)
        );
        assert!(authenticator
            .validate_token(&pair.refresh_token, TokenClass::Refresh)
            .is_ok());

        clock.advance(Duration::days(10));
        assert_eq!(
            authenticator.validate_token(&pair.refresh_token, TokenClass::Refresh),
            Err(JwtError::Expired)
        );
    }

    #[test]
    fn test_placeholder_hash_uses_configured_work_factor() {
        let authenticator = Authenticator::new(test_settings()).unwrap();

        assert!(authenticator.placeholder_hash.starts_with("$argon2id$v=19$m=1024,t=1,p=1$"));
        assert!(authenticator.verify_unknown("any_password").is_ok());
        assert!(!authenticator
            .verify_password("any_password", &authenticator.placeholder_hash)
            .unwrap());
    }

    #[test]
    fn test_placeholder_hash_differs_per_instance() {
        let first = Authenticator::new(test_settings()).unwrap();
        let second = Authenticator::new(test_settings()).unwrap();

        assert_ne!(first.placeholder_hash, second.placeholder_hash);
    }

    #[test]
    fn test_validate_invalid_token() {
        let authenticator = Authenticator::new(test_settings()).unwrap();

        let result = authenticator.validate_token("invalid.token.here", TokenClass::Access);
        assert!(result.is_err());
    }
}
