//! Store reachability and migration status.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use storefront_db::MigrationStatus;

use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub migrations: Option<MigrationStatus>,
}

/// `GET /api/health`
///
/// 200 when the store answers `SELECT 1` and every migration is applied,
/// 503 otherwise.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database = state.db.health_check().await;

    let migrations = if database {
        state.db.migration_status().await.ok()
    } else {
        None
    };

    let healthy = database && migrations.is_some_and(|m| m.is_current());

    let (status, code) = if healthy {
        ("ok", StatusCode::OK)
    } else {
        ("unavailable", StatusCode::SERVICE_UNAVAILABLE)
    };

    (
        code,
        Json(HealthResponse {
            status,
            database,
            migrations,
        }),
    )
}
