//! Checkout endpoint.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Serialize;
use storefront_core::{PurchaseReceipt, PurchaseRequest};
use tracing::debug;

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseResponse {
    pub status: &'static str,
    #[serde(flatten)]
    pub receipt: PurchaseReceipt,
}

/// `POST /api/purchase`
///
/// Responds only after the transaction has committed or rolled back.
/// `unitPrice` on a line is accepted and ignored; no price is charged here.
pub async fn purchase(
    State(state): State<AppState>,
    body: Result<Json<PurchaseRequest>, JsonRejection>,
) -> ApiResult<Json<PurchaseResponse>> {
    let Json(request) = body?;

    let receipt = state.db.checkout().process_purchase(&request.items).await?;

    debug!(
        lines = receipt.lines_applied,
        units = receipt.units_decremented,
        "Purchase committed"
    );

    Ok(Json(PurchaseResponse {
        status: "ok",
        receipt,
    }))
}
