//! # Validation Module
//!
//! Input validation utilities for the storefront.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Browser                                                       │
//! │  ├── Basic format checks (empty, length)                                │
//! │  └── Immediate user feedback                                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: HTTP handler (Rust)                                           │
//! │  ├── Type validation (deserialization)                                  │
//! │  └── THIS MODULE: Business rule validation                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                             │
//! │  ├── CHECK (stock >= 0)                                                 │
//! │  ├── UNIQUE (product_id, color, size)                                   │
//! │  └── Foreign key constraints                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use storefront_core::purchase::PurchaseLine;
//! use storefront_core::validation::{validate_purchase, validate_quantity};
//!
//! assert!(validate_quantity(5).is_ok());
//! assert!(validate_purchase(&[PurchaseLine::plain("p-1", 2)]).is_ok());
//! assert!(validate_purchase(&[]).is_err());
//! ```

use std::collections::HashSet;

use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::purchase::PurchaseLine;
use crate::types::VariationInput;
use crate::{MAX_ITEM_QUANTITY, MAX_PURCHASE_LINES};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

fn require_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates a product description.
///
/// ## Rules
/// - Must not be empty
/// - At most 500 characters
pub fn validate_description(description: &str) -> ValidationResult<()> {
    require_text("description", description, 500)
}

/// Validates a manufacturer id (the pricing rule key).
pub fn validate_manufacturer_id(id: &str) -> ValidationResult<()> {
    require_text("manufacturerId", id, 50)
}

/// Validates a manufacturer article code.
pub fn validate_article_code(code: &str) -> ValidationResult<()> {
    require_text("articleCode", code, 50)
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity value.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Checkout: one line                                                     │
/// │                                                                         │
/// │  Cart line quantity: 5                                                  │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_quantity(5) ← THIS FUNCTION                                   │
/// │       │                                                                 │
/// │       ├── qty <= 0? → Error: "quantity must be positive"                │
/// │       │                                                                 │
/// │       ├── qty > 999? → Error: "quantity must be between 1 and 999"      │
/// │       │                                                                 │
/// │       └── OK → line goes to the guarded decrement                       │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    validate_quantity_field("quantity", qty)
}

fn validate_quantity_field(field: &str, qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a stock level. Zero is allowed; negative is not.
pub fn validate_stock(field: &str, stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a parsed cost.
///
/// ## Rules
/// - Must be non-negative
/// - Zero is allowed (free samples)
pub fn validate_cost(cost: Decimal) -> ValidationResult<()> {
    if cost.is_sign_negative() && !cost.is_zero() {
        return Err(ValidationError::OutOfRange {
            field: "cost".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates the variation set of a product.
///
/// ## Rules
/// - Color and size are required (≤ 50 characters each)
/// - Stock is non-negative
/// - No two variations share the same color and size
pub fn validate_variations(variations: &[VariationInput]) -> ValidationResult<()> {
    let mut seen = HashSet::with_capacity(variations.len());

    for (index, variation) in variations.iter().enumerate() {
        require_text(&format!("variations[{index}].color"), &variation.color, 50)?;
        require_text(&format!("variations[{index}].size"), &variation.size, 50)?;
        validate_stock(&format!("variations[{index}].stock"), variation.stock)?;

        if !seen.insert((variation.color.as_str(), variation.size.as_str())) {
            return Err(ValidationError::Duplicate {
                field: "variation".to_string(),
                value: format!("{} / {}", variation.color, variation.size),
            });
        }
    }

    Ok(())
}

/// Validates a checkout request before any stock is touched.
///
/// ## Rules
/// - At least one line, at most MAX_PURCHASE_LINES
/// - Product id present on every line
/// - Quantity in `1..=MAX_ITEM_QUANTITY`
/// - Color and size given together or not at all
pub fn validate_purchase(lines: &[PurchaseLine]) -> ValidationResult<()> {
    if lines.is_empty() {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    if lines.len() > MAX_PURCHASE_LINES {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_PURCHASE_LINES as i64,
        });
    }

    for (index, line) in lines.iter().enumerate() {
        if line.product_id.trim().is_empty() {
            return Err(ValidationError::Required {
                field: format!("items[{index}].productId"),
            });
        }

        validate_quantity_field(&format!("items[{index}].quantity"), line.quantity)?;

        if line.target().is_none() {
            let blank = |v: &Option<String>| v.as_deref().map_or(true, |v| v.trim().is_empty());
            let missing = if blank(&line.color) { "color" } else { "size" };
            return Err(ValidationError::Required {
                field: format!("items[{index}].{missing}"),
            });
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_validate_description() {
        assert!(validate_description("Remera lisa").is_ok());
        assert!(validate_description("   ").is_err());
        assert!(validate_description(&"A".repeat(501)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_cost() {
        assert!(validate_cost(Decimal::ZERO).is_ok());
        assert!(validate_cost(Decimal::from_str("12.5").unwrap()).is_ok());
        assert!(validate_cost(Decimal::from_str("-0.01").unwrap()).is_err());
    }

    #[test]
    fn test_validate_variations() {
        let v = |color: &str, size: &str, stock| VariationInput {
            color: color.to_string(),
            size: size.to_string(),
            stock,
        };

        assert!(validate_variations(&[]).is_ok());
        assert!(validate_variations(&[v("Rojo", "M", 0), v("Rojo", "L", 2)]).is_ok());
        assert!(validate_variations(&[v("", "M", 1)]).is_err());
        assert!(validate_variations(&[v("Rojo", "M", -1)]).is_err());
        assert!(validate_variations(&[v("Rojo", "M", 1), v("Rojo", "M", 2)]).is_err());
    }

    #[test]
    fn test_validate_purchase_shape() {
        assert_eq!(
            validate_purchase(&[]),
            Err(ValidationError::Required {
                field: "items".to_string()
            })
        );

        let too_many = vec![PurchaseLine::plain("p", 1); MAX_PURCHASE_LINES + 1];
        assert!(validate_purchase(&too_many).is_err());

        assert!(validate_purchase(&[PurchaseLine::plain("p", 0)]).is_err());
        assert!(validate_purchase(&[PurchaseLine::plain(" ", 1)]).is_err());
        assert!(validate_purchase(&[PurchaseLine::variant("p", "Rojo", "M", 2)]).is_ok());
    }

    #[test]
    fn test_validate_purchase_partial_variant() {
        let mut line = PurchaseLine::plain("p", 1);
        line.color = Some("Rojo".to_string());

        assert_eq!(
            validate_purchase(&[PurchaseLine::plain("q", 1), line]),
            Err(ValidationError::Required {
                field: "items[1].size".to_string()
            })
        );
    }
}
