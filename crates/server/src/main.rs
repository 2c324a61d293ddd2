//! FixIt server entry point.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::http::{HeaderValue, Method, header};
use fixit_api::{AppState, app};
use fixit_common::Config;
use fixit_core::{AuthService, CategoryStoreRef, ComplaintStoreRef, MemoryStore, UserStoreRef};
use fixit_db::repositories::{CategoryRepository, ComplaintRepository, UserRepository};
use tokio::signal;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

/// PostgreSQL repositories when a database is configured, memory otherwise.
async fn open_stores(
    config: &Config,
) -> Result<(UserStoreRef, ComplaintStoreRef, CategoryStoreRef), Box<dyn std::error::Error>> {
    if config.database.url.is_none() {
        warn!("database.url is not set; data lives in memory and is lost on exit");
        let store = Arc::new(MemoryStore::new());
        return Ok((store.clone(), store.clone(), store));
    }

    let db = fixit_db::init(config).await?;
    info!("Connected to database");

    info!("Running database migrations...");
    fixit_db::migrate(&db).await?;
    info!("Migrations completed");

    let db = Arc::new(db);
    Ok((
        Arc::new(UserRepository::new(Arc::clone(&db))),
        Arc::new(ComplaintRepository::new(Arc::clone(&db))),
        Arc::new(CategoryRepository::new(db)),
    ))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fixit=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting FixIt server...");

    // Load configuration
    let config = Config::load()?;

    let (users, complaints, categories) = open_stores(&config).await?;
    let state = AppState::new(users, complaints, categories, AuthService::new(&config.auth));

    let seeded = state.category_service.seed_defaults().await?;
    if seeded > 0 {
        info!(count = seeded, "Default categories created");
    }

    let cors = CorsLayer::new()
        .allow_origin(config.server.allowed_origin.parse::<HeaderValue>()?)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true);

    let app = app(state)
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server with graceful shutdown
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
