use std::sync::Arc;

use auth::Authenticator;
use credential_service::config::Config;
use credential_service::domain::principal::models::PrincipalKind;
use credential_service::domain::principal::service::PrincipalService;
use credential_service::inbound::http::router::create_router;
use credential_service::outbound::repositories::PostgresClubStore;
use credential_service::outbound::repositories::PostgresUserStore;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "credential_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "credential-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        max_connections = config.database.max_connections,
        token_ttl_seconds = config.jwt.ttl_seconds,
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = config.database.max_connections,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let club_authenticator = Arc::new(
        Authenticator::new(config.jwt.secret.as_bytes(), config.jwt.ttl())
            .with_key_id(PrincipalKind::Club.as_str()),
    );
    let user_authenticator = Arc::new(
        Authenticator::new(config.jwt.secret.as_bytes(), config.jwt.ttl())
            .with_key_id(PrincipalKind::User.as_str()),
    );

    let club_service = Arc::new(PrincipalService::new(
        PrincipalKind::Club,
        Arc::new(PostgresClubStore::new(pg_pool.clone())),
        club_authenticator,
    ));
    let user_service = Arc::new(PrincipalService::new(
        PrincipalKind::User,
        Arc::new(PostgresUserStore::new(pg_pool)),
        user_authenticator,
    ));

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(club_service, user_service);

    if let Err(e) = axum::serve(http_listener, http_application).await {
        tracing::error!(error = %e, "Server error");
        return Err(e.into());
    }

    tracing::info!("Server exited successfully");
    Ok(())
}
