use std::sync::Arc;

use auth::AuthSettings;
use auth::Authenticator;
use auth::HashingParams;
use auth::ManualClock;
use auth::TokenSettings;
use chrono::Duration;
use identity_service::domain::session::models::SessionPolicy;
use identity_service::domain::session::service::SessionService;
use identity_service::domain::user::service::UserService;
use identity_service::inbound::http::cookies::SessionCookies;
use identity_service::inbound::http::credentials::CredentialSource;
use identity_service::inbound::http::router::create_router;
use identity_service::outbound::repositories::InMemoryUserRepository;
use serde_json::json;
use serde_json::Value;

pub const PASSWORD: &str = "pass_word!";

/// Knobs a test may turn before the server starts
pub struct TestSettings {
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
    pub credentials: CredentialSource,
    pub revoke_on_password_change: bool,
}

impl Default for TestSettings {
    fn default() -> Self {
        Self {
            access_ttl: Duration::minutes(15),
            refresh_ttl: Duration::days(10),
            credentials: CredentialSource::HeaderOrCookie,
            revoke_on_password_change: true,
        }
    }
}

/// Tokens handed out by a login or refresh
pub struct Tokens {
    pub access: String,
    pub refresh: String,
}

/// Test application that spawns a real server over the in-memory store
pub struct TestApp {
    pub address: String,
    pub port: u16,
    /// Keeps cookies between requests, like a browser
    pub api_client: reqwest::Client,
    /// Sends only what the test puts on the request
    pub plain_client: reqwest::Client,
    pub clock: Arc<ManualClock>,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(TestSettings::default()).await
    }

    /// Spawn the application in a background task and return TestApp
    pub async fn spawn_with(settings: TestSettings) -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let clock = Arc::new(ManualClock::starting_now());
        let authenticator = Arc::new(
            Authenticator::with_clock(
                AuthSettings {
                    access: TokenSettings::new(
                        "test-access-secret-for-jwt-signing-32-bytes",
                        settings.access_ttl,
                    ),
                    refresh: TokenSettings::new(
                        "test-refresh-secret-for-jwt-signing-32-bytes",
                        settings.refresh_ttl,
                    ),
                    hashing: HashingParams {
                        memory_kib: 1024,
                        iterations: 1,
                        parallelism: 1,
                    },
                },
                clock.clone(),
            )
            .expect("Failed to create authenticator"),
        );

        let repository = Arc::new(InMemoryUserRepository::new());
        let user_service = Arc::new(UserService::new(
            Arc::clone(&repository),
            Arc::clone(&authenticator),
        ));
        let session_service = Arc::new(SessionService::new(
            Arc::clone(&repository),
            repository,
            authenticator,
            SessionPolicy {
                revoke_on_password_change: settings.revoke_on_password_change,
            },
        ));

        // Plain http in tests, so the cookies cannot be Secure
        let router = create_router(
            user_service,
            session_service,
            settings.credentials,
            SessionCookies::new(false),
        );

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            port,
            api_client: reqwest::Client::builder()
                .cookie_store(true)
                .build()
                .expect("Failed to create reqwest client"),
            plain_client: reqwest::Client::new(),
            clock,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1/users{}", self.address, path)
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(self.url(path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(self.url(path))
    }

    /// Helper to make POST request without the cookie store
    pub fn post_plain(&self, path: &str) -> reqwest::RequestBuilder {
        self.plain_client.post(self.url(path))
    }

    /// Helper to make GET request with Bearer token and no cookies
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.plain_client.get(self.url(path)).bearer_auth(token)
    }

    /// Helper to make POST request with Bearer token and no cookies
    pub fn post_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.plain_client.post(self.url(path)).bearer_auth(token)
    }

    /// Helper to make PATCH request with Bearer token and no cookies
    pub fn patch_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.plain_client.patch(self.url(path)).bearer_auth(token)
    }

    /// Register a user with the shared test password
    pub async fn register(&self, username: &str) -> Value {
        let response = self
            .post_plain("/register")
            .json(&json!({
                "username": username,
                "email": format!("{}@example.com", username),
                "fullname": "Test User",
                "avatar": "https://cdn.example.com/avatar.png",
                "password": PASSWORD
            }))
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
        response.json().await.expect("Failed to parse response")
    }

    /// Log in without cookies and return the tokens from the body
    pub async fn login(&self, identifier: &str, password: &str) -> Tokens {
        let response = self
            .post_plain("/login")
            .json(&json!({ "identifier": identifier, "password": password }))
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), reqwest::StatusCode::OK);
        tokens(response).await
    }

    /// Present `refresh_token` in the body, without cookies
    pub async fn refresh(&self, refresh_token: &str) -> reqwest::Response {
        self.post_plain("/refresh-token")
            .json(&json!({ "refreshToken": refresh_token }))
            .send()
            .await
            .expect("Failed to execute request")
    }
}

pub async fn tokens(response: reqwest::Response) -> Tokens {
    let body: Value = response.json().await.expect("Failed to parse response");
    Tokens {
        access: body["data"]["accessToken"]
            .as_str()
            .expect("accessToken missing")
            .to_string(),
        refresh: body["data"]["refreshToken"]
            .as_str()
            .expect("refreshToken missing")
            .to_string(),
    }
}
