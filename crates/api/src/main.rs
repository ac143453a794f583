//! Toolgate API server

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use toolgate_api::{auth::CredentialStore, create_router, search, AppState, Config};
use toolgate_shared::{create_pool, run_migrations, SqliteUserRepository};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    init_tracing();

    let config = Config::from_env().context("invalid configuration")?;
    tracing::info!(
        database_url = %config.database_url,
        algorithm = ?config.algorithm,
        token_ttl_minutes = config.access_token_expire_minutes,
        debug = config.debug,
        "Starting toolgate-api v{}",
        env!("CARGO_PKG_VERSION")
    );

    let pool = create_pool(&config.database_url)
        .await
        .context("failed to open credential database")?;
    run_migrations(&pool)
        .await
        .context("failed to run database migrations")?;

    let credentials = CredentialStore::new(Arc::new(SqliteUserRepository::new(pool)));
    let search = search::provider_from_config(&config)
        .context("failed to initialize Google Drive search")?;

    let bind_address = config.bind_address();
    let state = AppState::new(config, credentials, search);
    let app = create_router(state);

    let listener = TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {}", bind_address))?;
    tracing::info!(address = %bind_address, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

/// `LOG_FORMAT=json` switches to structured output
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("toolgate_api=info,toolgate_shared=info,tower_http=info"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
