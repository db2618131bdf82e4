use std::sync::Arc;

use auth::Authenticator;
use axum::Router;
use identity_service::config::Config;
use identity_service::domain::session::ports::SessionStore;
use identity_service::domain::session::service::SessionService;
use identity_service::domain::user::ports::UserRepository;
use identity_service::domain::user::service::UserService;
use identity_service::inbound::http::cookies::SessionCookies;
use identity_service::inbound::http::router::create_router;
use identity_service::outbound::repositories::InMemoryUserRepository;
use identity_service::outbound::repositories::PostgresUserRepository;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "identity_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "identity-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        database = config.database.url.is_some(),
        access_ttl_seconds = config.jwt.access.ttl_seconds,
        refresh_ttl_seconds = config.jwt.refresh.ttl_seconds,
        revoke_on_password_change = config.session.revoke_on_password_change,
        credential_source = ?config.session.credential_source,
        "Configuration loaded"
    );

    let authenticator = Arc::new(Authenticator::new(config.auth_settings())?);

    let http_application = match &config.database.url {
        Some(url) => {
            let pg_pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .connect(url)
                .await?;
            tracing::info!(
                max_connections = config.database.max_connections,
                database = "postgresql",
                "Database connection pool created"
            );

            sqlx::migrate!("./migrations").run(&pg_pool).await?;
            tracing::info!(database = "postgresql", "Database migrations completed");

            application(
                Arc::new(PostgresUserRepository::new(pg_pool)),
                authenticator,
                &config,
            )
        }
        None => {
            tracing::warn!("database.url is not set, users and sessions live in memory");
            application(
                Arc::new(InMemoryUserRepository::new()),
                authenticator,
                &config,
            )
        }
    };

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    axum::serve(http_listener, http_application).await?;
    tracing::info!("Server exited successfully");

    Ok(())
}

/// Wire both services over one repository and build the router.
fn application<R>(repository: Arc<R>, authenticator: Arc<Authenticator>, config: &Config) -> Router
where
    R: UserRepository + SessionStore,
{
    let user_service = Arc::new(UserService::new(
        Arc::clone(&repository),
        Arc::clone(&authenticator),
    ));
    let session_service = Arc::new(SessionService::new(
        Arc::clone(&repository),
        repository,
        authenticator,
        config.session_policy(),
    ));

    create_router(
        user_service,
        session_service,
        config.session.credential_source,
        SessionCookies::new(config.cookies.secure),
    )
}
