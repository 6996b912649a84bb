//! # storefront-core: Pure Business Logic for the Storefront
//!
//! This crate holds the storefront's business rules as pure functions with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Storefront Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                    Browser                                      │    │
//! │  │    Catalog ──► Cart ──► Checkout      Admin product form        │    │
//! │  └─────────────────────────────┬───────────────────────────────────┘    │
//! │                                │ JSON over HTTP                         │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐    │
//! │  │                    storefront-api (axum)                        │    │
//! │  │    /api/products, /api/purchase, /api/manufacturers             │    │
//! │  └─────────────────────────────┬───────────────────────────────────┘    │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐    │
//! │  │               ★ storefront-core (THIS CRATE) ★                  │    │
//! │  │                                                                 │    │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐    │    │
//! │  │   │   types   │  │  pricing  │  │ purchase  │  │ validation│    │    │
//! │  │   │  Product  │  │ MarkupRule│  │   Line    │  │   rules   │    │    │
//! │  │   │ Variation │  │  Table    │  │ StockError│  │   checks  │    │    │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘    │    │
//! │  │                                                                 │    │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS            │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐    │
//! │  │                storefront-db (Database Layer)                   │    │
//! │  │        SQLite queries, migrations, checkout transaction         │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Variation, Manufacturer, inputs)
//! - [`money`] - Money type with integer cents
//! - [`pricing`] - Manufacturer markup rules and the pricing table
//! - [`purchase`] - Checkout line items, receipts and stock failures
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use storefront_core::pricing::derive_prices;
//!
//! // Manufacturer 13 uses rule A
//! let prices = derive_prices("13", "100").unwrap();
//! assert_eq!(prices.dozen_price.to_string(), "$105.84");
//! assert_eq!(prices.offer_price.to_string(), "$10.85");
//!
//! // Unparseable cost gives the undefined price, never a panic
//! assert!(derive_prices("13", "abc").is_none());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod pricing;
pub mod purchase;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, PricingError, ValidationError};
pub use money::Money;
pub use pricing::{derive_prices, DerivedPrices, MarkupRule, PricingTable};
pub use purchase::{
    LineTarget, PurchaseLine, PurchaseReceipt, PurchaseRequest, ShortfallReason, StockError,
};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines accepted in one checkout.
///
/// ## Business Reason
/// Keeps a single stock transaction short; a real cart is far smaller.
pub const MAX_PURCHASE_LINES: usize = 100;

/// Maximum quantity of a single line
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10)
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Catalog page size when the client does not ask for one.
pub const DEFAULT_PAGE_LIMIT: u32 = 150;

/// Largest catalog page a client may request.
pub const MAX_PAGE_LIMIT: u32 = 500;
