use std::sync::Arc;

use auth::Authenticator;
use auth_service::config::Config;
use auth_service::domain::user::ports::UserRepository;
use auth_service::domain::user::service::UserService;
use auth_service::domain::user::service::UserServiceSettings;
use auth_service::inbound::http::router::create_router;
use auth_service::outbound::identity::OAuthIdentityProvider;
use auth_service::outbound::repositories::InMemoryUserRepository;
use auth_service::outbound::repositories::PostgresUserRepository;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "auth_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "auth-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        public_url = %config.server.public_url,
        token_ttl_minutes = config.jwt.expiration_minutes,
        normalize_email = config.auth.normalize_email,
        google_oauth = config.oauth.google.is_some(),
        github_oauth = config.oauth.github.is_some(),
        "Configuration loaded"
    );

    let authenticator = Arc::new(Authenticator::new(
        config.jwt.secret.as_bytes(),
        config.jwt.token_ttl(),
    ));
    let identity_provider = Arc::new(OAuthIdentityProvider::new(config.oauth.clone())?);

    match config.database.url.as_deref() {
        Some(database_url) => {
            let pg_pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .connect(database_url)
                .await?;
            tracing::info!(
                max_connections = config.database.max_connections,
                database = "postgresql",
                "Database connection pool created"
            );

            sqlx::migrate!("./migrations").run(&pg_pool).await?;
            tracing::info!(database = "postgresql", "Database migrations completed");

            let repository = Arc::new(PostgresUserRepository::new(pg_pool));
            serve(&config, repository, identity_provider, authenticator).await
        }
        None => {
            tracing::warn!("No database URL configured; using the in-memory store");
            let repository = Arc::new(InMemoryUserRepository::new());
            serve(&config, repository, identity_provider, authenticator).await
        }
    }
}

async fn serve<UR: UserRepository>(
    config: &Config,
    repository: Arc<UR>,
    identity_provider: Arc<OAuthIdentityProvider>,
    authenticator: Arc<Authenticator>,
) -> Result<(), anyhow::Error> {
    let settings = UserServiceSettings {
        normalize_email: config.auth.normalize_email,
        public_url: config.server.public_url.clone(),
    };
    let user_service = Arc::new(UserService::new(
        repository,
        identity_provider,
        authenticator,
        settings,
    ));

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    axum::serve(http_listener, create_router(user_service))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server exited successfully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
}
