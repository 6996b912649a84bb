//! # Checkout Transaction Processor
//!
//! Applies a cart to inventory: every line is decremented, or none is.
//!
//! ## One Purchase, One Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  validate_purchase(lines)          ← no store access yet                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN                                                                  │
//! │    line 0 (variant):                                                    │
//! │      UPDATE variations SET stock = stock - q                            │
//! │        WHERE product_id=? AND color=? AND size=? AND stock >= q         │
//! │      UPDATE products SET stock = stock - q                              │
//! │        WHERE id=? AND stock >= q                                        │
//! │    line 1 (plain):                                                      │
//! │      UPDATE products SET stock = stock - q                              │
//! │        WHERE id=? AND stock >= q AND NOT EXISTS (variations)            │
//! │    ...                                                                  │
//! │       │                                                                 │
//! │       ├── every UPDATE hit 1 row ──► COMMIT ──► PurchaseReceipt         │
//! │       │                                                                 │
//! │       └── some UPDATE hit 0 rows ──► read why ──► ROLLBACK              │
//! │                                            └──► InsufficientStock       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why No Read-Then-Write
//! The stock check IS the `WHERE stock >= q` of the update. SQLite
//! serializes writers, so two checkouts racing for the last unit cannot both
//! match: the second one sees the committed zero and matches no row.
//!
//! Reads happen only after a guard failed, to explain the failure.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use crate::error::{CheckoutError, CheckoutResult};
use storefront_core::validation::validate_purchase;
use storefront_core::{LineTarget, PurchaseLine, PurchaseReceipt, ShortfallReason, StockError};

/// Which guarded update matched no row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Guard<'a> {
    Variation { color: &'a str, size: &'a str },
    ProductAggregate,
    Plain,
}

/// Runs purchases against the store.
#[derive(Debug, Clone)]
pub struct CheckoutProcessor {
    pool: SqlitePool,
}

impl CheckoutProcessor {
    /// Creates a new CheckoutProcessor.
    pub fn new(pool: SqlitePool) -> Self {
        CheckoutProcessor { pool }
    }

    /// Atomically decrements stock for every line of a purchase.
    ///
    /// ## Returns
    /// * `Ok(PurchaseReceipt)` - committed; every line applied
    /// * `Err(CheckoutError::Invalid)` - malformed request, store untouched
    /// * `Err(CheckoutError::InsufficientStock)` - rolled back, nothing changed
    /// * `Err(CheckoutError::StoreUnavailable)` - store fault, nothing changed
    ///
    /// Nothing is retried here. A dropped future drops the transaction,
    /// which rolls back.
    pub async fn process_purchase(&self, lines: &[PurchaseLine]) -> CheckoutResult<PurchaseReceipt> {
        validate_purchase(lines)?;

        debug!(lines = lines.len(), "Starting purchase");

        let mut tx = self.pool.begin().await?;

        let mut units_decremented = 0i64;
        for (index, line) in lines.iter().enumerate() {
            if let Err(err) = apply_line(&mut tx, index, line).await {
                if let CheckoutError::InsufficientStock(shortfall) = &err {
                    info!(
                        line_index = shortfall.line_index,
                        product_id = %shortfall.product_id,
                        reason = ?shortfall.reason,
                        requested = shortfall.requested,
                        available = ?shortfall.available,
                        "Purchase rejected, rolling back"
                    );
                } else {
                    warn!(error = %err, line_index = index, "Purchase failed, rolling back");
                }

                tx.rollback().await?;
                return Err(err);
            }
            units_decremented += line.quantity;
        }

        tx.commit().await?;

        info!(
            lines_applied = lines.len(),
            units_decremented, "Purchase committed"
        );

        Ok(PurchaseReceipt {
            lines_applied: lines.len(),
            units_decremented,
        })
    }
}

// =============================================================================
// Line Application
// =============================================================================

async fn apply_line(
    conn: &mut SqliteConnection,
    index: usize,
    line: &PurchaseLine,
) -> CheckoutResult<()> {
    let qty = line.quantity;

    match line.target() {
        Some(LineTarget::Variant { color, size }) => {
            let updated = sqlx::query(
                r#"
                UPDATE variations SET stock = stock - ?1
                WHERE product_id = ?2 AND color = ?3 AND size = ?4 AND stock >= ?1
                "#,
            )
            .bind(qty)
            .bind(&line.product_id)
            .bind(color)
            .bind(size)
            .execute(&mut *conn)
            .await?
            .rows_affected();

            if updated == 0 {
                return Err(shortfall(conn, index, line, Guard::Variation { color, size })
                    .await?
                    .into());
            }

            let updated = sqlx::query(
                "UPDATE products SET stock = stock - ?1 WHERE id = ?2 AND stock >= ?1",
            )
            .bind(qty)
            .bind(&line.product_id)
            .execute(&mut *conn)
            .await?
            .rows_affected();

            if updated == 0 {
                return Err(shortfall(conn, index, line, Guard::ProductAggregate)
                    .await?
                    .into());
            }
        }
        Some(LineTarget::Plain) => {
            let updated = sqlx::query(
                r#"
                UPDATE products SET stock = stock - ?1
                WHERE id = ?2 AND stock >= ?1
                  AND NOT EXISTS (SELECT 1 FROM variations WHERE product_id = ?2)
                "#,
            )
            .bind(qty)
            .bind(&line.product_id)
            .execute(&mut *conn)
            .await?
            .rows_affected();

            if updated == 0 {
                return Err(shortfall(conn, index, line, Guard::Plain).await?.into());
            }
        }
        None => {
            // validate_purchase rejects these; kept total for direct callers
            return Err(CheckoutError::Invalid(
                storefront_core::ValidationError::Required {
                    field: format!("items[{index}].size"),
                },
            ));
        }
    }

    debug!(line_index = index, product_id = %line.product_id, qty, "Line applied");
    Ok(())
}

/// Reads the current rows (inside the same transaction) to explain a guard
/// that matched nothing.
async fn shortfall(
    conn: &mut SqliteConnection,
    index: usize,
    line: &PurchaseLine,
    guard: Guard<'_>,
) -> CheckoutResult<StockError> {
    let product_stock: Option<i64> = sqlx::query_scalar("SELECT stock FROM products WHERE id = ?1")
        .bind(&line.product_id)
        .fetch_optional(&mut *conn)
        .await?;

    let (reason, available) = match (product_stock, guard) {
        (None, _) => (ShortfallReason::UnknownProduct, None),

        (Some(_), Guard::Variation { color, size }) => {
            let variation_stock: Option<i64> = sqlx::query_scalar(
                "SELECT stock FROM variations WHERE product_id = ?1 AND color = ?2 AND size = ?3",
            )
            .bind(&line.product_id)
            .bind(color)
            .bind(size)
            .fetch_optional(&mut *conn)
            .await?;

            match variation_stock {
                None => (ShortfallReason::UnknownVariant, None),
                Some(stock) => (ShortfallReason::Insufficient, Some(stock)),
            }
        }

        (Some(stock), Guard::ProductAggregate) => (ShortfallReason::Insufficient, Some(stock)),

        (Some(stock), Guard::Plain) => {
            let has_variations: bool = sqlx::query_scalar(
                "SELECT EXISTS (SELECT 1 FROM variations WHERE product_id = ?1)",
            )
            .bind(&line.product_id)
            .fetch_one(&mut *conn)
            .await?;

            if has_variations {
                (ShortfallReason::VariantRequired, None)
            } else {
                (ShortfallReason::Insufficient, Some(stock))
            }
        }
    };

    Ok(StockError {
        line_index: index,
        product_id: line.product_id.clone(),
        color: line.color.clone(),
        size: line.size.clone(),
        requested: line.quantity,
        available,
        reason,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use storefront_core::{DecimalInput, Manufacturer, PricingTable, ProductInput, VariationInput};

    async fn setup() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.manufacturers()
            .insert(&Manufacturer {
                id: "13".to_string(),
                name: "Alfa".to_string(),
            })
            .await
            .unwrap();
        db
    }

    async fn product(db: &Database, stock: i64, variations: &[(&str, &str, i64)]) -> String {
        let draft = ProductInput {
            article_code: None,
            description: "Buzo".to_string(),
            manufacturer_id: "13".to_string(),
            cost: DecimalInput::Text("50".to_string()),
            is_on_offer: false,
            category: None,
            image: None,
            stock: Some(stock),
            variations: variations
                .iter()
                .map(|(color, size, stock)| VariationInput {
                    color: color.to_string(),
                    size: size.to_string(),
                    stock: *stock,
                })
                .collect(),
        }
        .into_draft(&PricingTable::builtin())
        .unwrap();

        db.products().create(&draft).await.unwrap().product.id
    }

    async fn stocks(db: &Database, id: &str) -> (i64, Vec<i64>) {
        let detail = db.products().get_by_id(id).await.unwrap().unwrap();
        (
            detail.product.stock,
            detail.variations.iter().map(|v| v.stock).collect(),
        )
    }

    #[tokio::test]
    async fn test_variant_purchase_to_zero_then_rejected() {
        let db = setup().await;
        let id = product(&db, 0, &[("Rojo", "M", 5)]).await;

        let receipt = db
            .checkout()
            .process_purchase(&[PurchaseLine::variant(&id, "Rojo", "M", 5)])
            .await
            .unwrap();
        assert_eq!(receipt.lines_applied, 1);
        assert_eq!(receipt.units_decremented, 5);
        assert_eq!(stocks(&db, &id).await, (0, vec![0]));

        let err = db
            .checkout()
            .process_purchase(&[PurchaseLine::variant(&id, "Rojo", "M", 1)])
            .await
            .unwrap_err();

        match err {
            CheckoutError::InsufficientStock(e) => {
                assert_eq!(e.reason, ShortfallReason::Insufficient);
                assert_eq!(e.available, Some(0));
                assert_eq!(e.requested, 1);
                assert_eq!(e.line_index, 0);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(stocks(&db, &id).await, (0, vec![0]));
    }

    #[tokio::test]
    async fn test_aggregate_guard_rolls_back_variant_decrement() {
        let db = setup().await;
        let id = product(&db, 0, &[("Rojo", "M", 5)]).await;

        // aggregate drifted below the variation sum
        sqlx::query("UPDATE products SET stock = 0 WHERE id = ?1")
            .bind(&id)
            .execute(db.pool())
            .await
            .unwrap();

        let err = db
            .checkout()
            .process_purchase(&[PurchaseLine::variant(&id, "Rojo", "M", 1)])
            .await
            .unwrap_err();

        match err {
            CheckoutError::InsufficientStock(e) => {
                assert_eq!(e.reason, ShortfallReason::Insufficient);
                assert_eq!(e.available, Some(0));
                assert_eq!(e.requested, 1);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(stocks(&db, &id).await, (0, vec![5]));
    }

    #[tokio::test]
    async fn test_variant_selector_is_trimmed() {
        let db = setup().await;
        let id = product(&db, 0, &[("Rojo", "M", 3)]).await;

        db.checkout()
            .process_purchase(&[PurchaseLine::variant(&id, "Rojo ", " M", 2)])
            .await
            .unwrap();

        assert_eq!(stocks(&db, &id).await, (1, vec![1]));
    }

    #[tokio::test]
    async fn test_second_line_failure_rolls_back_first() {
        let db = setup().await;
        let a = product(&db, 0, &[("Rojo", "M", 3)]).await;
        let b = product(&db, 0, &[("Azul", "L", 1)]).await;

        let err = db
            .checkout()
            .process_purchase(&[
                PurchaseLine::variant(&a, "Rojo", "M", 2),
                PurchaseLine::variant(&b, "Azul", "L", 2),
            ])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CheckoutError::InsufficientStock(StockError { line_index: 1, .. })
        ));
        assert_eq!(stocks(&db, &a).await, (3, vec![3]));
        assert_eq!(stocks(&db, &b).await, (1, vec![1]));
    }

    #[tokio::test]
    async fn test_plain_line_decrements_product_only() {
        let db = setup().await;
        let id = product(&db, 10, &[]).await;

        db.checkout()
            .process_purchase(&[PurchaseLine::plain(&id, 4)])
            .await
            .unwrap();

        assert_eq!(stocks(&db, &id).await, (6, vec![]));
    }

    #[tokio::test]
    async fn test_plain_line_on_variant_product_requires_variant() {
        let db = setup().await;
        let id = product(&db, 0, &[("Rojo", "M", 5)]).await;

        let err = db
            .checkout()
            .process_purchase(&[PurchaseLine::plain(&id, 1)])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CheckoutError::InsufficientStock(StockError {
                reason: ShortfallReason::VariantRequired,
                ..
            })
        ));
        assert_eq!(stocks(&db, &id).await, (5, vec![5]));
    }

    #[tokio::test]
    async fn test_unknown_product_and_variant() {
        let db = setup().await;
        let id = product(&db, 0, &[("Rojo", "M", 5)]).await;

        let err = db
            .checkout()
            .process_purchase(&[PurchaseLine::plain("missing", 1)])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::InsufficientStock(StockError {
                reason: ShortfallReason::UnknownProduct,
                available: None,
                ..
            })
        ));

        let err = db
            .checkout()
            .process_purchase(&[PurchaseLine::variant(&id, "Verde", "M", 1)])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::InsufficientStock(StockError {
                reason: ShortfallReason::UnknownVariant,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_repeated_lines_accumulate() {
        let db = setup().await;
        let id = product(&db, 0, &[("Rojo", "M", 3)]).await;

        let err = db
            .checkout()
            .process_purchase(&[
                PurchaseLine::variant(&id, "Rojo", "M", 2),
                PurchaseLine::variant(&id, "Rojo", "M", 2),
            ])
            .await
            .unwrap_err();

        match err {
            CheckoutError::InsufficientStock(e) => {
                assert_eq!(e.line_index, 1);
                // first line's decrement is visible inside the transaction
                assert_eq!(e.available, Some(1));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(stocks(&db, &id).await, (3, vec![3]));
    }

    #[tokio::test]
    async fn test_invalid_request_never_touches_store() {
        let db = setup().await;
        db.close().await;

        let err = db.checkout().process_purchase(&[]).await.unwrap_err();
        assert!(matches!(err, CheckoutError::Invalid(_)));
    }

    #[tokio::test]
    async fn test_closed_store_is_unavailable() {
        let db = setup().await;
        db.close().await;

        let err = db
            .checkout()
            .process_purchase(&[PurchaseLine::plain("p", 1)])
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::StoreUnavailable(_)));
    }
}
