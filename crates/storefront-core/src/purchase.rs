//! # Purchase Lines
//!
//! The shapes that flow between the cart, the checkout processor and the
//! browser: what the customer asked for, what was applied, and why a line
//! could not be applied.
//!
//! ## Line Kinds
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  PurchaseLine { product, color?, size?, quantity }                      │
//! │                                                                         │
//! │  color + size ──► LineTarget::Variant                                   │
//! │                   decrements variations.stock AND products.stock        │
//! │                                                                         │
//! │  neither      ──► LineTarget::Plain                                     │
//! │                   decrements products.stock, only for products          │
//! │                   that have no variations                               │
//! │                                                                         │
//! │  only one     ──► rejected by validation before the store is touched    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::DecimalInput;

// =============================================================================
// Request Side
// =============================================================================

/// One line of a cart submitted for checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseLine {
    pub product_id: String,
    pub quantity: i64,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    /// Price shown in the cart. Display only; checkout never reads it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub unit_price: Option<DecimalInput>,
}

/// Which stock rows a line touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineTarget<'a> {
    Variant { color: &'a str, size: &'a str },
    Plain,
}

impl PurchaseLine {
    /// Line for a product without variations.
    pub fn plain(product_id: impl Into<String>, quantity: i64) -> Self {
        PurchaseLine {
            product_id: product_id.into(),
            quantity,
            color: None,
            size: None,
            unit_price: None,
        }
    }

    /// Line for one color/size variation of a product.
    pub fn variant(
        product_id: impl Into<String>,
        color: impl Into<String>,
        size: impl Into<String>,
        quantity: i64,
    ) -> Self {
        PurchaseLine {
            product_id: product_id.into(),
            quantity,
            color: Some(color.into()),
            size: Some(size.into()),
            unit_price: None,
        }
    }

    /// Returns the stock target, or `None` when only one of color/size is set.
    ///
    /// Selectors are trimmed the same way product writes trim them; a blank
    /// selector counts as absent.
    pub fn target(&self) -> Option<LineTarget<'_>> {
        match (selector(&self.color), selector(&self.size)) {
            (Some(color), Some(size)) => Some(LineTarget::Variant { color, size }),
            (None, None) => Some(LineTarget::Plain),
            _ => None,
        }
    }
}

fn selector(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Request body of `POST /api/purchase`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PurchaseRequest {
    pub items: Vec<PurchaseLine>,
}

// =============================================================================
// Outcome Side
// =============================================================================

/// Summary of a committed purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseReceipt {
    pub lines_applied: usize,
    pub units_decremented: i64,
}

/// Why a line's guarded decrement matched no row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShortfallReason {
    /// No product with this id.
    UnknownProduct,
    /// Product exists but has no such color/size.
    UnknownVariant,
    /// Plain line against a product that is sold by variation.
    VariantRequired,
    /// Row exists but holds fewer units than requested.
    Insufficient,
}

/// A purchase line that could not be applied.
///
/// Carries everything the browser needs to tell the customer which line
/// failed and how many units remain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StockError {
    pub line_index: usize,
    pub product_id: String,
    pub color: Option<String>,
    pub size: Option<String>,
    pub requested: i64,
    /// Units on hand at the moment of failure, when the row exists.
    pub available: Option<i64>,
    pub reason: ShortfallReason,
}

impl fmt::Display for StockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: product {}", self.line_index, self.product_id)?;
        if let (Some(color), Some(size)) = (&self.color, &self.size) {
            write!(f, " ({color} / {size})")?;
        }

        match self.reason {
            ShortfallReason::UnknownProduct => f.write_str(" does not exist"),
            ShortfallReason::UnknownVariant => f.write_str(" has no such variation"),
            ShortfallReason::VariantRequired => {
                f.write_str(" is sold by variation; color and size are required")
            }
            ShortfallReason::Insufficient => write!(
                f,
                " has insufficient stock: available {}, requested {}",
                self.available.unwrap_or(0),
                self.requested
            ),
        }
    }
}

impl std::error::Error for StockError {}

// =============================================================================
// Unit Tests
// =============================================================================
