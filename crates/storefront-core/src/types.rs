//! # Domain Types
//!
//! Core domain types used throughout the storefront.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐        │
//! │  │  Manufacturer   │   │    Product      │   │   Variation     │        │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │        │
//! │  │  id             │◄──│  manufacturer_id│   │  id             │        │
//! │  │  name           │   │  id (UUID)      │◄──│  product_id     │        │
//! │  └─────────────────┘   │  cost_cents     │   │  color, size    │        │
//! │                        │  dozen / offer  │   │  stock ≥ 0      │        │
//! │                        │  stock (Σ)      │   └─────────────────┘        │
//! │                        └─────────────────┘                              │
//! │                                                                         │
//! │  Write path:  ProductInput ──(validate + price)──► ProductDraft         │
//! │  Read path:   Product + Variations + name ──► ProductDetail             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Stock Invariant
//! A product with variations stores `stock = Σ variation.stock`. The draft
//! computes the sum; checkout decrements both sides in one transaction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::pricing::{parse_cost, DerivedPrices, PricingTable};
use crate::validation;
use crate::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};

// =============================================================================
// Manufacturer
// =============================================================================

/// A manufacturer. Its id selects the markup rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Manufacturer {
    pub id: String,
    pub name: String,
}

// =============================================================================
// Product
// =============================================================================

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Manufacturer's article code, when known.
    pub article_code: Option<String>,

    pub description: String,

    pub manufacturer_id: String,

    /// Cost in cents.
    pub cost_cents: i64,

    /// Standard price in cents, derived from cost at write time.
    pub dozen_price_cents: i64,

    /// Promotional price in cents, derived from cost at write time.
    pub offer_price_cents: i64,

    /// Listed under `type=offers`.
    pub is_on_offer: bool,

    /// Aggregate stock. Equals the variation sum when variations exist.
    pub stock: i64,

    pub category: Option<String>,

    /// Image reference (URL or data URI). Never interpreted.
    pub image: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Variation
// =============================================================================

/// One color/size combination of a product with its own stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Variation {
    pub id: String,
    pub product_id: String,
    pub color: String,
    pub size: String,
    pub stock: i64,
}

/// A product as the catalog shows it: with manufacturer name and variations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub manufacturer_name: Option<String>,
    pub variations: Vec<Variation>,
}

/// One page of the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub products: Vec<ProductDetail>,
    pub page: u32,
    pub limit: u32,
    pub total: i64,
}

// =============================================================================
// Pagination
// =============================================================================

/// Normalized page request. Page numbers start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: u32,
    pub limit: u32,
}

impl Page {
    /// Clamps raw query parameters: page ≥ 1, limit in `1..=MAX_PAGE_LIMIT`.
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        Page {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT),
        }
    }

    /// Row offset for SQL `OFFSET`.
    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.limit)
    }
}

impl Default for Page {
    fn default() -> Self {
        Page::new(None, None)
    }
}

// =============================================================================
// Write Inputs
// =============================================================================

/// A decimal amount as typed by a person: form text or a JSON number.
///
/// Numbers are turned back into their shortest decimal text before parsing,
/// so `0.3` stays `0.3`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(untagged)]
pub enum DecimalInput {
    Text(String),
    Number(f64),
}

impl DecimalInput {
    /// Raw text handed to [`parse_cost`].
    pub fn to_text(&self) -> String {
        match self {
            DecimalInput::Text(text) => text.clone(),
            DecimalInput::Number(number) => number.to_string(),
        }
    }
}

impl From<&str> for DecimalInput {
    fn from(value: &str) -> Self {
        DecimalInput::Text(value.to_string())
    }
}

/// A variation as submitted by the admin form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct VariationInput {
    pub color: String,
    pub size: String,
    pub stock: i64,
}

/// Product create/update body.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    #[serde(default)]
    pub article_code: Option<String>,
    pub description: String,
    pub manufacturer_id: String,
    pub cost: DecimalInput,
    #[serde(default)]
    pub is_on_offer: bool,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    /// Stock for products sold without variations. Ignored when
    /// `variations` is non-empty.
    #[serde(default)]
    pub stock: Option<i64>,
    #[serde(default)]
    pub variations: Vec<VariationInput>,
}

/// A validated, priced product ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDraft {
    pub article_code: Option<String>,
    pub description: String,
    pub manufacturer_id: String,
    pub cost: Money,
    pub prices: DerivedPrices,
    pub is_on_offer: bool,
    pub category: Option<String>,
    pub image: Option<String>,
    pub stock: i64,
    pub variations: Vec<VariationInput>,
}

impl ProductInput {
    /// Validates the input and derives its prices.
    ///
    /// ## Errors
    /// * `CoreError::Validation` - a field breaks a rule
    /// * `CoreError::PriceNotComputable` - cost is not numeric
    pub fn into_draft(self, pricing: &PricingTable) -> CoreResult<ProductDraft> {
        let description = self.description.trim().to_string();
        let manufacturer_id = self.manufacturer_id.trim().to_string();
        validation::validate_description(&description)?;
        validation::validate_manufacturer_id(&manufacturer_id)?;

        let article_code = non_blank(self.article_code);
        if let Some(code) = &article_code {
            validation::validate_article_code(code)?;
        }

        let raw_cost = self.cost.to_text();
        let not_computable = || CoreError::PriceNotComputable {
            manufacturer_id: manufacturer_id.clone(),
            cost: raw_cost.clone(),
        };

        let cost = parse_cost(&raw_cost).ok_or_else(not_computable)?;
        validation::validate_cost(cost)?;
        let prices = pricing
            .derive_from_decimal(&manufacturer_id, cost)
            .ok_or_else(not_computable)?;
        let cost = Money::from_decimal(cost).ok_or_else(not_computable)?;

        let variations: Vec<VariationInput> = self
            .variations
            .into_iter()
            .map(|v| VariationInput {
                color: v.color.trim().to_string(),
                size: v.size.trim().to_string(),
                stock: v.stock,
            })
            .collect();
        validation::validate_variations(&variations)?;

        let stock = if variations.is_empty() {
            let stock = self.stock.unwrap_or(0);
            validation::validate_stock("stock", stock)?;
            stock
        } else {
            variations
                .iter()
                .try_fold(0i64, |sum, v| sum.checked_add(v.stock))
                .ok_or_else(|| ValidationError::OutOfRange {
                    field: "stock".to_string(),
                    min: 0,
                    max: i64::MAX,
                })?
        };

        Ok(ProductDraft {
            article_code,
            description,
            manufacturer_id,
            cost,
            prices,
            is_on_offer: self.is_on_offer,
            category: non_blank(self.category),
            image: non_blank(self.image),
            stock,
            variations,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn input(cost: &str) -> ProductInput {
        ProductInput {
            article_code: Some(" ART-1 ".to_string()),
            description: "Remera lisa".to_string(),
            manufacturer_id: "13".to_string(),
            cost: cost.into(),
            is_on_offer: false,
            category: Some("".to_string()),
            image: None,
            stock: Some(4),
            variations: vec![],
        }
    }

    #[test]
    fn test_draft_derives_prices() {
        let draft = input("100").into_draft(&PricingTable::builtin()).unwrap();

        assert_eq!(draft.cost.cents(), 10000);
        assert_eq!(draft.prices.dozen_price.cents(), 10584);
        assert_eq!(draft.prices.offer_price.cents(), 1085);
        assert_eq!(draft.article_code.as_deref(), Some("ART-1"));
        assert_eq!(draft.category, None);
        assert_eq!(draft.stock, 4);
    }

    #[test]
    fn test_draft_rejects_non_numeric_cost() {
        let err = input("abc").into_draft(&PricingTable::builtin()).unwrap_err();
        assert!(matches!(err, CoreError::PriceNotComputable { .. }));
    }

    #[test]
    fn test_draft_rejects_negative_cost() {
        let err = input("-5").into_draft(&PricingTable::builtin()).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_draft_stock_is_variation_sum() {
        let mut product = input("10");
        product.stock = Some(999);
        product.variations = vec![
            VariationInput {
                color: "Rojo".to_string(),
                size: "M".to_string(),
                stock: 3,
            },
            VariationInput {
                color: "Rojo".to_string(),
                size: "L".to_string(),
                stock: 2,
            },
        ];

        let draft = product.into_draft(&PricingTable::builtin()).unwrap();
        assert_eq!(draft.stock, 5);
    }

    #[test]
    fn test_draft_rejects_duplicate_variation() {
        let mut product = input("10");
        product.variations = vec![
            VariationInput {
                color: "Rojo".to_string(),
                size: "M".to_string(),
                stock: 3,
            },
            VariationInput {
                color: " Rojo".to_string(),
                size: "M ".to_string(),
                stock: 1,
            },
        ];

        let err = product.into_draft(&PricingTable::builtin()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::Duplicate { .. })
        ));
    }

    #[test]
    fn test_decimal_input_number_text() {
        assert_eq!(DecimalInput::Number(0.3).to_text(), "0.3");
        assert_eq!(DecimalInput::Number(100.0).to_text(), "100");
    }

    #[test]
    fn test_page_clamps() {
        assert_eq!(Page::new(None, None), Page { page: 1, limit: 150 });
        assert_eq!(Page::new(Some(0), Some(0)), Page { page: 1, limit: 1 });
        assert_eq!(Page::new(Some(3), Some(10_000)).limit, 500);
        assert_eq!(Page::new(Some(3), Some(20)).offset(), 40);
    }

    #[test]
    fn test_product_detail_flattens() {
        let now = Utc::now();
        let detail = ProductDetail {
            product: Product {
                id: "p".to_string(),
                article_code: None,
                description: "Buzo".to_string(),
                manufacturer_id: "16".to_string(),
                cost_cents: 100,
                dozen_price_cents: 200,
                offer_price_cents: 150,
                is_on_offer: true,
                stock: 0,
                category: None,
                image: None,
                created_at: now,
                updated_at: now,
            },
            manufacturer_name: Some("Acme".to_string()),
            variations: vec![],
        };

        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["dozenPriceCents"], 200);
        assert_eq!(json["manufacturerName"], "Acme");
        assert!(json["variations"].as_array().unwrap().is_empty());
    }
}
