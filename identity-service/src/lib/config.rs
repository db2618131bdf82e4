use std::env;

use auth::AuthSettings;
use auth::HashingParams;
use auth::TokenSettings;
use chrono::Duration;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

use crate::domain::session::models::SessionPolicy;
use crate::inbound::http::credentials::CredentialSource;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub password: HashingParams,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub cookies: CookieConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL URL; the in-memory store is used when unset
    pub url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
        }
    }
}

fn default_max_connections() -> u32 {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub access: TokenConfig,
    pub refresh: TokenConfig,
}

#[derive(Deserialize, Clone)]
pub struct TokenConfig {
    pub secret: String,
    pub ttl_seconds: i64,
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"<redacted>")
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    #[serde(default = "default_true")]
    pub revoke_on_password_change: bool,
    #[serde(default)]
    pub credential_source: CredentialSource,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            revoke_on_password_change: true,
            credential_source: CredentialSource::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CookieConfig {
    #[serde(default = "default_true")]
    pub secure: bool,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self { secure: true }
    }
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (JWT__ACCESS__SECRET, SERVER__HTTP_PORT, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    ///
    /// The result is validated; a configuration that cannot run is an error.
    /// Signing secrets live only in `config/development.toml`, so any other
    /// run mode fails unless the environment supplies them.
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        // Example: JWT__ACCESS__SECRET=... overrides jwt.access.secret
        Self::load_for(&run_mode, Environment::default().separator("__"))
    }

    /// Load configuration for `run_mode` with `environment` as the override layer.
    pub fn load_for(run_mode: &str, environment: Environment) -> Result<Self, ConfigError> {
        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(environment)
            .build()?;

        let config: Config = configuration.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Reject settings that would make sessions unsafe or unusable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, token) in [("access", &self.jwt.access), ("refresh", &self.jwt.refresh)] {
            if token.secret.trim().is_empty() {
                return Err(ConfigError::Message(format!(
                    "jwt.{}.secret must be set",
                    name
                )));
            }
            if token.ttl_seconds <= 0 {
                return Err(ConfigError::Message(format!(
                    "jwt.{}.ttl_seconds must be positive",
                    name
                )));
            }
        }

        if self.jwt.access.secret == self.jwt.refresh.secret {
            return Err(ConfigError::Message(
                "jwt.access.secret and jwt.refresh.secret must differ".to_string(),
            ));
        }

        Ok(())
    }

    pub fn auth_settings(&self) -> AuthSettings {
        AuthSettings {
            access: TokenSettings::new(
                self.jwt.access.secret.as_bytes(),
                Duration::seconds(self.jwt.access.ttl_seconds),
            ),
            refresh: TokenSettings::new(
                self.jwt.refresh.secret.as_bytes(),
                Duration::seconds(self.jwt.refresh.ttl_seconds),
            ),
            hashing: self.password,
        }
    }

    pub fn session_policy(&self) -> SessionPolicy {
        SessionPolicy {
            revoke_on_password_change: self.session.revoke_on_password_change,
        }
    }
}
