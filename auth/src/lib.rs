//! Authentication utilities library
//!
//! Provides the credential primitives behind identity sessions:
//! - Password hashing (Argon2id, configurable work factor)
//! - Access/refresh token issuance and verification (HS256, one secret per class)
//! - Authentication coordination
//!
//! Services define their own domain traits and adapt these implementations.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash).unwrap());
//! assert!(!hasher.verify("not_my_password", &hash).unwrap());
//! ```
//!
//! ## Tokens
//! ```
//! use auth::{Claims, TokenClass, TokenCodec, TokenSettings};
//! use chrono::Duration;
//!
//! let codec = TokenCodec::new(
//!     TokenSettings::new("access_secret_at_least_32_bytes_long", Duration::minutes(15)),
//!     TokenSettings::new("refresh_secret_at_least_32_bytes_long", Duration::days(10)),
//! );
//! let token = codec
//!     .issue(Claims::new().with_subject("user123"), TokenClass::Access)
//!     .unwrap();
//! let claims = codec.verify(&token, TokenClass::Access).unwrap();
//! assert_eq!(claims.sub.as_deref(), Some("user123"));
//! assert!(codec.verify(&token, TokenClass::Refresh).is_err());
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::AuthSettings;
pub use authenticator::AuthenticationError;
pub use authenticator::Authenticator;
pub use authenticator::TokenPair;
pub use jwt::Claims;
pub use jwt::Clock;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::ManualClock;
pub use jwt::SystemClock;
pub use jwt::TokenClass;
pub use jwt::TokenCodec;
pub use jwt::TokenSettings;
pub use password::HashingParams;
pub use password::PasswordError;
pub use password::PasswordHasher;
