//! # Error Types
//!
//! Domain-specific error types for storefront-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  storefront-core errors (this file)                                     │
//! │  ├── CoreError        - General domain errors                           │
//! │  ├── ValidationError  - Input validation failures                       │
//! │  └── PricingError     - Rule-table parsing failures                     │
//! │                                                                         │
//! │  storefront-core::purchase                                              │
//! │  └── StockError       - Why a purchase line could not be applied        │
//! │                                                                         │
//! │  storefront-db errors (separate crate)                                  │
//! │  ├── DbError          - Database operation failures                     │
//! │  └── CheckoutError    - Outcome of a failed purchase                    │
//! │                                                                         │
//! │  storefront-api errors (in app)                                         │
//! │  └── ApiError         - What the browser sees (JSON)                    │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Browser       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Note on invalid cost input
//! A cost that does not parse is NOT an error value here. The pricing engine
//! returns `None` (the "undefined price") and callers decide what to do.

use thiserror::Error;

use crate::purchase::StockError;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They should be caught and translated to user-friendly messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product cannot be found.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Manufacturer referenced by a product does not exist.
    #[error("Manufacturer not found: {0}")]
    ManufacturerNotFound(String),

    /// The pricing engine could not derive prices from the given cost.
    ///
    /// ## When This Occurs
    /// - Admin typed a non-numeric cost ("abc", "", "NaN")
    /// - Cost so large the markup overflows
    ///
    /// The product is NOT saved; derived prices are never persisted as null.
    #[error("Cannot derive prices for manufacturer {manufacturer_id} from cost '{cost}'")]
    PriceNotComputable {
        manufacturer_id: String,
        cost: String,
    },

    /// A purchase line could not be applied.
    ///
    /// ## User Workflow
    /// ```text
    /// Checkout (qty: 5 of Remera / Rojo / M)
    ///      │
    ///      ▼
    /// Guarded decrement: stock=3, needs 5 → 0 rows updated
    ///      │
    ///      ▼
    /// InsufficientStock { line 0, requested 5, available 3 }
    ///      │
    ///      ▼
    /// UI shows: "Only 3 left" and keeps the cart
    /// ```
    #[error(transparent)]
    InsufficientStock(#[from] StockError),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, unparseable cost).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., the same color/size twice in one product).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Pricing Error
// =============================================================================

/// Errors raised while building a pricing table from configuration.
///
/// Evaluating a table never fails; only loading one can.
#[derive(Debug, Error)]
pub enum PricingError {
    /// The rule file is not valid TOML or has the wrong shape.
    #[error("Invalid pricing rule file: {0}")]
    InvalidRuleFile(#[from] toml::de::Error),

    /// A rule name that is not one of the known markup rules.
    #[error("Unknown markup rule '{0}' (expected A, B, C, D or standard)")]
    UnknownRule(String),
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
