//! # Storefront API Server
//!
//! ## Startup
//! 1. Load `.env` (if present) and initialize tracing
//! 2. Read configuration and the pricing table
//! 3. Open the database and apply migrations
//! 4. Serve until Ctrl+C or SIGTERM, then close the pool

use storefront_api::{init_tracing, router, ApiConfig, AppState};
use storefront_db::{Database, DbConfig};
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    init_tracing();

    info!("Starting Storefront API v{}", env!("CARGO_PKG_VERSION"));

    let config = ApiConfig::load()?;
    let pricing = config.load_pricing()?;
    info!(
        rules = ?config.pricing_rules_path,
        default_rule = %pricing.default_rule(),
        "Pricing table loaded"
    );

    let db = Database::new(
        DbConfig::new(config.db_path.clone()).max_connections(config.db_max_connections),
    )
    .await?;
    info!(path = %config.db_path.display(), "Database ready");

    let addr = config.socket_addr()?;
    let app = router(AppState::new(db.clone(), pricing), config.body_limit_bytes);

    let listener = TcpListener::bind(addr).await?;
    info!("Storefront API listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Completes on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
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
                error!(error = %e, "Failed to install SIGTERM handler");
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

    info!("Shutdown signal received");
}
