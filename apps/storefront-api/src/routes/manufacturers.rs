use axum::extract::State;
use axum::Json;
use storefront_core::Manufacturer;

use crate::error::ApiResult;
use crate::state::AppState;

/// `GET /api/manufacturers`
pub async fn list_manufacturers(State(state): State<AppState>) -> ApiResult<Json<Vec<Manufacturer>>> {
    Ok(Json(state.db.manufacturers().list().await?))
}
