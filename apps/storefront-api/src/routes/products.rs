//! # Product Endpoints
//!
//! Catalog reads plus the admin write path. Prices are never taken from the
//! request body: every create and update runs the cost through the pricing
//! table held in [`AppState`].

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use storefront_core::{CoreError, Page, ProductDetail, ProductDraft, ProductInput, ProductPage};
use tracing::{debug, info};

use crate::error::ApiResult;
use crate::state::AppState;

/// Query string of `GET /api/products`.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogQuery {
    /// `offers` restricts the listing to products on offer.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl CatalogQuery {
    fn offers_only(&self) -> bool {
        self.kind
            .as_deref()
            .is_some_and(|kind| kind.eq_ignore_ascii_case("offers"))
    }
}

/// `GET /api/products`
pub async fn list_products(
    State(state): State<AppState>,
    query: Result<Query<CatalogQuery>, QueryRejection>,
) -> ApiResult<Json<ProductPage>> {
    let Query(query) = query?;
    let page = Page::new(query.page, query.limit);

    let products = state.db.products().list(query.offers_only(), page).await?;
    Ok(Json(products))
}

/// `GET /api/products/{id}`
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ProductDetail>> {
    match state.db.products().get_by_id(&id).await? {
        Some(detail) => Ok(Json(detail)),
        None => Err(CoreError::ProductNotFound(id).into()),
    }
}

/// `POST /api/products`
pub async fn create_product(
    State(state): State<AppState>,
    body: Result<Json<ProductInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ProductDetail>)> {
    let Json(input) = body?;
    let draft = price_input(&state, input).await?;

    let detail = state.db.products().create(&draft).await?;

    info!(
        id = %detail.product.id,
        manufacturer = %detail.product.manufacturer_id,
        dozen = %draft.prices.dozen_price,
        offer = %draft.prices.offer_price,
        "Product created"
    );
    Ok((StatusCode::CREATED, Json(detail)))
}

/// `PUT /api/products/{id}`
///
/// Variations are replaced as a set. An absent `image` keeps the stored one.
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<ProductInput>, JsonRejection>,
) -> ApiResult<Json<ProductDetail>> {
    let Json(input) = body?;
    let draft = price_input(&state, input).await?;

    let detail = state.db.products().update(&id, &draft).await?;

    info!(id = %id, variations = detail.variations.len(), "Product updated");
    Ok(Json(detail))
}

/// `DELETE /api/products/{id}`
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.db.products().delete(&id).await?;

    info!(id = %id, "Product deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Validates the body, checks the manufacturer and derives prices.
async fn price_input(state: &AppState, input: ProductInput) -> ApiResult<ProductDraft> {
    let manufacturer_id = input.manufacturer_id.trim().to_string();

    if !manufacturer_id.is_empty()
        && state.db.manufacturers().get_by_id(&manufacturer_id).await?.is_none()
    {
        return Err(CoreError::ManufacturerNotFound(manufacturer_id).into());
    }

    let draft = input.into_draft(&state.pricing)?;
    debug!(
        manufacturer = %draft.manufacturer_id,
        rule = %state.pricing.rule_for(&draft.manufacturer_id),
        "Derived prices"
    );
    Ok(draft)
}
