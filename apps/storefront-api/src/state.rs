//! Shared handler state.

use std::sync::Arc;

use storefront_core::PricingTable;
use storefront_db::Database;

/// State cloned into every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub pricing: Arc<PricingTable>,
}

impl AppState {
    pub fn new(db: Database, pricing: PricingTable) -> Self {
        AppState {
            db,
            pricing: Arc::new(pricing),
        }
    }
}
