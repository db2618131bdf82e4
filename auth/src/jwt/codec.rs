use std::sync::Arc;

use chrono::Duration;
use uuid::Uuid;

use super::claims::Claims;
use super::claims::TokenClass;
use super::clock::Clock;
use super::clock::SystemClock;
use super::errors::JwtError;
use super::handler::JwtHandler;

/// Signing secret and lifetime for one token class.
#[derive(Clone)]
pub struct TokenSettings {
    pub secret: Vec<u8>,
    pub ttl: Duration,
}

impl TokenSettings {
    pub fn new(secret: impl Into<Vec<u8>>, ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            ttl,
        }
    }
}

/// Issues and verifies access and refresh tokens.
///
/// Each class has its own signing secret and TTL, so a leaked access secret
/// cannot forge refresh tokens and the other way around. Issuance and
/// verification depend only on the input, the secrets and the clock.
pub struct TokenCodec {
    access: JwtHandler,
    refresh: JwtHandler,
    access_ttl: Duration,
    refresh_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenCodec {
    /// Create a codec that reads time from the system clock.
    pub fn new(access: TokenSettings, refresh: TokenSettings) -> Self {
        Self::with_clock(access, refresh, Arc::new(SystemClock))
    }

    pub fn with_clock(
        access: TokenSettings,
        refresh: TokenSettings,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            access: JwtHandler::new(&access.secret),
            refresh: JwtHandler::new(&refresh.secret),
            access_ttl: access.ttl,
            refresh_ttl: refresh.ttl,
            clock,
        }
    }

    /// Configured lifetime for a token class.
    pub fn ttl(&self, class: TokenClass) -> Duration {
        match class {
            TokenClass::Access => self.access_ttl,
            TokenClass::Refresh => self.refresh_ttl,
        }
    }

    /// Sign claims as a token of the given class with the configured TTL.
    pub fn issue(&self, claims: Claims, class: TokenClass) -> Result<String, JwtError> {
        self.issue_with_ttl(claims, class, self.ttl(class))
    }

    /// Sign claims as a token of the given class.
    ///
    /// Overwrites `typ`, `iat`, `exp` and `jti`. The random `jti` keeps two
    /// tokens issued in the same second for the same subject distinct.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn issue_with_ttl(
        &self,
        mut claims: Claims,
        class: TokenClass,
        ttl: Duration,
    ) -> Result<String, JwtError> {
        let now = self.clock.now();

        claims.typ = Some(class);
        claims.iat = Some(now);
        claims.exp = Some(now + ttl.num_seconds());
        claims.jti = Some(Uuid::new_v4().to_string());

        self.handler(class).encode(&claims)
    }

    /// Verify a token as the given class and return its claims.
    ///
    /// # Errors
    /// * `Malformed` - Not a decodable token
    /// * `SignatureMismatch` - Signed with an unknown secret
    /// * `WrongClass` - Authentic token of the other class
    /// * `MissingClaim` - No `typ` or `exp` claim
    /// * `Expired` - `exp` has been reached
    pub fn verify(&self, token: &str, class: TokenClass) -> Result<Claims, JwtError> {
        let claims: Claims = match self.handler(class).decode(token) {
            Ok(claims) => claims,
            Err(JwtError::SignatureMismatch) => {
                return match self.handler(class.other()).decode::<Claims>(token) {
                    Ok(_) => Err(JwtError::WrongClass {
                        expected: class,
                        found: class.other(),
                    }),
                    Err(_) => Err(JwtError::SignatureMismatch),
                };
            }
            Err(e) => return Err(e),
        };

        match claims.typ {
            Some(found) if found != class => {
                return Err(JwtError::WrongClass {
                    expected: class,
                    found,
                })
            }
            Some(_) => {}
            None => return Err(JwtError::MissingClaim("typ".to_string())),
        }

        if claims.exp.is_none() {
            return Err(JwtError::MissingClaim("exp".to_string()));
        }

        if claims.is_expired(self.clock.now()) {
            return Err(JwtError::Expired);
        }

        Ok(claims)
    }

    fn handler(&self, class: TokenClass) -> &JwtHandler {
        match class {
            TokenClass::Access => &self.access,
            TokenClass::Refresh => &self.refresh,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::clock::ManualClock;

    const ACCESS_SECRET: &[u8] = b"access_secret_at_least_32_bytes_long!";
    const REFRESH_SECRET: &[u8] = b"refresh_secret_at_least_32_bytes_long";

    fn codec_with_clock(clock: Arc<ManualClock>) -> TokenCodec {
        TokenCodec::with_clock(
            TokenSettings::new(ACCESS_SECRET, Duration::minutes(15)),
            TokenSettings::new(REFRESH_SECRET, Duration::days(10)),
            clock,
        )
    }

    #[test]
    fn test_issue_and_verify_access() {
        let clock = Arc::new(ManualClock::new(1_700_000_000));
        let codec = codec_with_clock(clock);

        let claims = Claims::new()
            .with_subject("user123")
            .with_extra("username", "alice");
        let token = codec.issue(claims, TokenClass::Access).unwrap();

        let decoded = codec.verify(&token, TokenClass::Access).unwrap();
        assert_eq!(decoded.sub.as_deref(), Some("user123"));
        assert_eq!(decoded.extra_str("username"), Some("alice"));
        assert_eq!(decoded.typ, Some(TokenClass::Access));
        assert_eq!(decoded.iat, Some(1_700_000_000));
        assert_eq!(decoded.exp, Some(1_700_000_000 + 15 * 60));
    }

    #[test]
    fn test_refresh_uses_refresh_ttl() {
        let clock = Arc::new(ManualClock::new(1_700_000_000));
        let codec = codec_with_clock(clock);

        let token = codec
            .issue(Claims::new().with_subject("user123"), TokenClass::Refresh)
            .unwrap();

        let decoded = codec.verify(&token, TokenClass::Refresh).unwrap();
        assert_eq!(decoded.exp, Some(1_700_000_000 + 10 * 24 * 60 * 60));
    }

    #[test]
    fn test_expired_after_ttl() {
        let clock = Arc::new(ManualClock::new(1_700_000_000));
        let codec = codec_with_clock(Arc::clone(&clock));

        let token = codec
            .issue_with_ttl(
                Claims::new().with_subject("user123"),
                TokenClass::Access,
                Duration::seconds(1),
            )
            .unwrap();
        assert!(codec.verify(&token, TokenClass::Access).is_ok());

        clock.advance(Duration::seconds(1));
        assert_eq!(
            codec.verify(&token, TokenClass::Access),
            Err(JwtError::Expired)
        );
    }

    #[test]
    fn test_access_token_rejected_as_refresh() {
        let codec = codec_with_clock(Arc::new(ManualClock::starting_now()));

        let token = codec
            .issue(Claims::new().with_subject("user123"), TokenClass::Access)
            .unwrap();

        assert_eq!(
            codec.verify(&token, TokenClass::Refresh),
            Err(JwtError::WrongClass {
                expected: TokenClass::Refresh,
                found: TokenClass::Access,
            })
        );
    }

    #[test]
    fn test_refresh_token_rejected_as_access() {
        let codec = codec_with_clock(Arc::new(ManualClock::starting_now()));

        let token = codec
            .issue(Claims::new().with_subject("user123"), TokenClass::Refresh)
            .unwrap();

        assert_eq!(
            codec.verify(&token, TokenClass::Access),
            Err(JwtError::WrongClass {
                expected: TokenClass::Access,
                found: TokenClass::Refresh,
            })
        );
    }

    #[test]
    fn test_class_checked_with_shared_secret() {
        let codec = TokenCodec::new(
            TokenSettings::new(ACCESS_SECRET, Duration::minutes(15)),
            TokenSettings::new(ACCESS_SECRET, Duration::days(10)),
        );

        let token = codec
            .issue(Claims::new().with_subject("user123"), TokenClass::Access)
            .unwrap();

        assert!(matches!(
            codec.verify(&token, TokenClass::Refresh),
            Err(JwtError::WrongClass { .. })
        ));
    }

    #[test]
    fn test_foreign_signature() {
        let codec = codec_with_clock(Arc::new(ManualClock::starting_now()));
        let foreign = JwtHandler::new(b"some_other_secret_32_bytes_long_key!");

        let claims = Claims {
            typ: Some(TokenClass::Access),
            exp: Some(i64::MAX / 2),
            ..Claims::new().with_subject("user123")
        };
        let token = foreign.encode(&claims).unwrap();

        assert_eq!(
            codec.verify(&token, TokenClass::Access),
            Err(JwtError::SignatureMismatch)
        );
    }

    #[test]
    fn test_malformed_token() {
        let codec = codec_with_clock(Arc::new(ManualClock::starting_now()));

        assert!(matches!(
            codec.verify("not-a-token", TokenClass::Access),
            Err(JwtError::Malformed(_))
        ));
    }

    #[test]
    fn test_missing_class_claim() {
        let codec = codec_with_clock(Arc::new(ManualClock::starting_now()));
        let token = JwtHandler::new(ACCESS_SECRET)
            .encode(&Claims::new().with_subject("user123"))
            .unwrap();

        assert_eq!(
            codec.verify(&token, TokenClass::Access),
            Err(JwtError::MissingClaim("typ".to_string()))
        );
    }

    #[test]
    fn test_tokens_are_unique() {
        let codec = codec_with_clock(Arc::new(ManualClock::new(1_700_000_000)));

        let first = codec
            .issue(Claims::new().with_subject("user123"), TokenClass::Refresh)
            .unwrap();
        let second = codec
            .issue(Claims::new().with_subject("user123"), TokenClass::Refresh)
            .unwrap();

        assert_ne!(first, second);
    }
}
