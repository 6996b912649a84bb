//! # Repository Module
//!
//! Database repository implementations for the storefront.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  HTTP handler                                                           │
//! │       │                                                                 │
//! │       │  db.products().list(offers_only, page)                          │
//! │       │  db.checkout().process_purchase(&lines)                         │
//! │       ▼                                                                 │
//! │  ProductRepository          CheckoutProcessor                           │
//! │  ├── list / get_by_id       └── process_purchase                        │
//! │  ├── create / update                                                    │
//! │  └── delete                 ManufacturerRepository                      │
//! │                             ├── list / get_by_id                        │
//! │       │                     └── insert                                  │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Catalog and product CRUD
//! - [`ManufacturerRepository`](manufacturer::ManufacturerRepository) - Manufacturer lookup
//! - [`CheckoutProcessor`](checkout::CheckoutProcessor) - The stock transaction

pub mod checkout;
pub mod manufacturer;
pub mod product;
