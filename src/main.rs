// Main entry point for the DevHub API

use devhub_api::api::{create_router, AppState};
use devhub_api::config::Config;
use devhub_api::infra::pg_store::PgDocumentStore;
use devhub_api::proxy::GithubClient;
use devhub_api::state::Stores;

use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load and validate configuration first (before any logging)
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    // 2. Tracing can only be initialized once
    init_tracing(&config)?;

    info!(
        bind_address = %config.bind_address,
        port = config.port,
        "Starting DevHub API"
    );

    // 3. Document store: Postgres when configured, memory otherwise
    let (stores, audit_pool) = match config.database_url {
        Some(ref database_url) => {
            let pg = Arc::new(
                PgDocumentStore::connect(database_url, config.db_pool_max_size)
                    .await
                    .map_err(|e| {
                        error!(error = %e, "Failed to connect to database");
                        e
                    })?,
            );
            pg.migrate().await?;
            let pool = pg.pool().clone();
            info!("Postgres document store initialized");
            (Stores::from_backend(pg), Some(pool))
        }
        None => {
            warn!("DATABASE_URL not set, using in-memory store; data is lost on restart");
            (Stores::memory(), None)
        }
    };

    // 4. GitHub lookup client
    let github = Arc::new(
        GithubClient::new(
            &config.github_api_url,
            config.github_token.clone(),
            config.github_timeout_secs,
        )
        .map_err(|e| {
            error!(error = %e, "Failed to create GitHub client");
            e
        })?,
    );

    // 5. Application state and router
    let app_state = AppState::new(config.clone(), stores, github, audit_pool)?;
    let router = create_router(&app_state).with_state(app_state);

    // 6. Start HTTP server
    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
        error!(error = %e, addr = %addr, "Failed to bind to address");
        e
    })?;

    info!(addr = %addr, "Server listening");

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!(error = %e, "Server error");
            e
        })?;

    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing subscriber based on configuration
///
/// RUST_LOG, when set, overrides LOG_LEVEL.
fn init_tracing(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;

    let subscriber = fmt()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_env_filter(filter);

    if config.log_format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Ctrl+C received, starting graceful shutdown");
        },
        _ = terminate => {
            info!("SIGTERM received, starting graceful shutdown");
        },
    }
}
