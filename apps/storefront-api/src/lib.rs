//! # Storefront API
//!
//! HTTP surface of the storefront: catalog reads, the admin product write
//! path (with server-side price derivation) and checkout.
//!
//! ## Module Structure
//! ```text
//! storefront-api/src/
//! ├── lib.rs        ◄── You are here (router, tracing setup)
//! ├── main.rs       ◄── Binary entry point
//! ├── config.rs     ◄── Environment configuration
//! ├── error.rs      ◄── ApiError → HTTP status + JSON
//! ├── state.rs      ◄── Shared handler state
//! └── routes/       ◄── One module per resource
//! ```

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tracing_subscriber::EnvFilter;

pub use config::{ApiConfig, ConfigError};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use state::AppState;

/// Initializes the tracing subscriber.
///
/// `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,storefront=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Builds the application router.
pub fn router(state: AppState, body_limit: usize) -> Router {
    Router::new()
        .route("/api/health", get(routes::health::health))
        .route(
            "/api/manufacturers",
            get(routes::manufacturers::list_manufacturers),
        )
        .route(
            "/api/products",
            get(routes::products::list_products).post(routes::products::create_product),
        )
        .route(
            "/api/products/{id}",
            get(routes::products::get_product)
                .put(routes::products::update_product)
                .delete(routes::products::delete_product),
        )
        .route("/api/purchase", post(routes::purchase::purchase))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
