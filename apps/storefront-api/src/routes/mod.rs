//! # HTTP Routes
//!
//! ```text
//! GET    /api/health
//! GET    /api/manufacturers
//! GET    /api/products?type=offers&page=1&limit=150
//! POST   /api/products
//! GET    /api/products/{id}
//! PUT    /api/products/{id}
//! DELETE /api/products/{id}
//! POST   /api/purchase
//! ```

pub mod health;
pub mod manufacturers;
pub mod products;
pub mod purchase;
