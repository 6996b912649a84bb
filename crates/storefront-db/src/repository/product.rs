//! # Product Repository
//!
//! Database operations for products and their variations.
//!
//! ## Key Operations
//! - Paginated catalog listing (with manufacturer name and variations)
//! - Create / update / delete, each in one transaction
//!
//! ## Variation Set Replacement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    PUT /api/products/{id}                               │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    UPDATE products SET ..., stock = Σ new variations                    │
//! │    DELETE FROM variations WHERE product_id = ?                          │
//! │    INSERT INTO variations ... (one per color/size)                      │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  A reader never sees the product without its variations, and           │
//! │  products.stock always equals the variation sum after commit.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use storefront_core::{
    Page, Product, ProductDetail, ProductDraft, ProductPage, Variation, VariationInput,
};

/// Product columns joined with the manufacturer name.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    #[sqlx(flatten)]
    product: Product,
    manufacturer_name: Option<String>,
}

const PRODUCT_COLUMNS: &str = r#"
    p.id,
    p.article_code,
    p.description,
    p.manufacturer_id,
    p.cost_cents,
    p.dozen_price_cents,
    p.offer_price_cents,
    p.is_on_offer,
    p.stock,
    p.category,
    p.image,
    p.created_at,
    p.updated_at,
    m.name AS manufacturer_name
"#;

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// // First page of offers
/// let page = repo.list(true, Page::default()).await?;
///
/// // Get by ID
/// let product = repo.get_by_id("uuid-here").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists one page of the catalog, newest first.
    ///
    /// ## Arguments
    /// * `offers_only` - only products flagged `is_on_offer`
    /// * `page` - page number and size (already clamped)
    ///
    /// Both queries run in one read transaction so the variations match the
    /// products of the page.
    pub async fn list(&self, offers_only: bool, page: Page) -> DbResult<ProductPage> {
        debug!(offers_only, page = page.page, limit = page.limit, "Listing products");

        let mut tx = self.pool.begin().await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM products WHERE (?1 = 0 OR is_on_offer = 1)",
        )
        .bind(offers_only)
        .fetch_one(&mut *tx)
        .await?;

        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products p
            LEFT JOIN manufacturers m ON m.id = p.manufacturer_id
            WHERE (?1 = 0 OR p.is_on_offer = 1)
            ORDER BY p.created_at DESC, p.id
            LIMIT ?2 OFFSET ?3
            "#
        ))
        .bind(offers_only)
        .bind(i64::from(page.limit))
        .bind(page.offset())
        .fetch_all(&mut *tx)
        .await?;

        let variations = sqlx::query_as::<_, Variation>(
            r#"
            SELECT v.id, v.product_id, v.color, v.size, v.stock
            FROM variations v
            WHERE v.product_id IN (
                SELECT id FROM products
                WHERE (?1 = 0 OR is_on_offer = 1)
                ORDER BY created_at DESC, id
                LIMIT ?2 OFFSET ?3
            )
            ORDER BY v.color, v.size
            "#,
        )
        .bind(offers_only)
        .bind(i64::from(page.limit))
        .bind(page.offset())
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        let mut by_product: HashMap<String, Vec<Variation>> = HashMap::new();
        for variation in variations {
            by_product
                .entry(variation.product_id.clone())
                .or_default()
                .push(variation);
        }

        let products: Vec<ProductDetail> = rows
            .into_iter()
            .map(|row| {
                let variations = by_product.remove(&row.product.id).unwrap_or_default();
                ProductDetail {
                    product: row.product,
                    manufacturer_name: row.manufacturer_name,
                    variations,
                }
            })
            .collect();

        debug!(count = products.len(), total, "Listed products");

        Ok(ProductPage {
            products,
            page: page.page,
            limit: page.limit,
            total,
        })
    }

    /// Gets a product by its ID, with manufacturer name and variations.
    ///
    /// ## Returns
    /// * `Ok(Some(ProductDetail))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<ProductDetail>> {
        let mut conn = self.pool.acquire().await?;
        fetch_detail(&mut conn, id).await
    }

    /// Creates a product and its variations atomically.
    ///
    /// ## Returns
    /// * `Ok(ProductDetail)` - the stored product
    /// * `Err(DbError::ForeignKeyViolation)` - manufacturer does not exist
    pub async fn create(&self, draft: &ProductDraft) -> DbResult<ProductDetail> {
        let id = generate_product_id();
        let now = Utc::now();

        debug!(id = %id, manufacturer_id = %draft.manufacturer_id, "Creating product");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO products (
                id, article_code, description, manufacturer_id,
                cost_cents, dozen_price_cents, offer_price_cents,
                is_on_offer, stock, category, image,
                created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4,
                ?5, ?6, ?7,
                ?8, ?9, ?10, ?11,
                ?12, ?12
            )
            "#,
        )
        .bind(&id)
        .bind(&draft.article_code)
        .bind(&draft.description)
        .bind(&draft.manufacturer_id)
        .bind(draft.cost.cents())
        .bind(draft.prices.dozen_price.cents())
        .bind(draft.prices.offer_price.cents())
        .bind(draft.is_on_offer)
        .bind(draft.stock)
        .bind(&draft.category)
        .bind(&draft.image)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        insert_variations(&mut tx, &id, &draft.variations).await?;

        let detail = fetch_detail(&mut tx, &id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", &id))?;

        tx.commit().await?;

        info!(
            id = %id,
            variations = draft.variations.len(),
            stock = draft.stock,
            dozen_price = %draft.prices.dozen_price,
            "Product created"
        );
        Ok(detail)
    }

    /// Updates a product and replaces its variation set atomically.
    ///
    /// A draft without an image keeps the stored image reference.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    pub async fn update(&self, id: &str, draft: &ProductDraft) -> DbResult<ProductDetail> {
        debug!(id = %id, "Updating product");

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE products SET
                article_code = ?2,
                description = ?3,
                manufacturer_id = ?4,
                cost_cents = ?5,
                dozen_price_cents = ?6,
                offer_price_cents = ?7,
                is_on_offer = ?8,
                stock = ?9,
                category = ?10,
                image = COALESCE(?11, image),
                updated_at = ?12
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&draft.article_code)
        .bind(&draft.description)
        .bind(&draft.manufacturer_id)
        .bind(draft.cost.cents())
        .bind(draft.prices.dozen_price.cents())
        .bind(draft.prices.offer_price.cents())
        .bind(draft.is_on_offer)
        .bind(draft.stock)
        .bind(&draft.category)
        .bind(&draft.image)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        sqlx::query("DELETE FROM variations WHERE product_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        insert_variations(&mut tx, id, &draft.variations).await?;

        let detail = fetch_detail(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))?;

        tx.commit().await?;

        info!(id = %id, variations = draft.variations.len(), "Product updated");
        Ok(detail)
    }

    /// Deletes a product and its variations atomically.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM variations WHERE product_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        tx.commit().await?;

        info!(id = %id, "Product deleted");
        Ok(())
    }

    /// Counts all products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Connection-level helpers (shared by pool and transaction paths)
// =============================================================================

async fn fetch_detail(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<ProductDetail>> {
    let row = sqlx::query_as::<_, ProductRow>(&format!(
        r#"
        SELECT {PRODUCT_COLUMNS}
        FROM products p
        LEFT JOIN manufacturers m ON m.id = p.manufacturer_id
        WHERE p.id = ?1
        "#
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let variations = fetch_variations(conn, id).await?;

    Ok(Some(ProductDetail {
        product: row.product,
        manufacturer_name: row.manufacturer_name,
        variations,
    }))
}

async fn fetch_variations(conn: &mut SqliteConnection, product_id: &str) -> DbResult<Vec<Variation>> {
    let variations = sqlx::query_as::<_, Variation>(
        r#"
        SELECT id, product_id, color, size, stock
        FROM variations
        WHERE product_id = ?1
        ORDER BY color, size
        "#,
    )
    .bind(product_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(variations)
}

async fn insert_variations(
    conn: &mut SqliteConnection,
    product_id: &str,
    variations: &[VariationInput],
) -> DbResult<()> {
    for variation in variations {
        sqlx::query(
            r#"
            INSERT INTO variations (id, product_id, color, size, stock)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(product_id)
        .bind(&variation.color)
        .bind(&variation.size)
        .bind(variation.stock)
        .execute(&mut *conn)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate(
                "variation",
                format!("{} / {}", variation.color, variation.size),
            ),
            other => other,
        })?;
    }

    Ok(())
}

/// Generates a new product ID (UUID v4).
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use storefront_core::{DecimalInput, Manufacturer, PricingTable, ProductInput};

    async fn setup() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        for (id, name) in [("13", "Alfa"), ("17", "Gamma")] {
            db.manufacturers()
                .insert(&Manufacturer {
                    id: id.to_string(),
                    name: name.to_string(),
                })
                .await
                .unwrap();
        }
        db
    }

    fn draft(manufacturer_id: &str, cost: &str, variations: &[(&str, &str, i64)]) -> ProductDraft {
        ProductInput {
            article_code: None,
            description: "Remera".to_string(),
            manufacturer_id: manufacturer_id.to_string(),
            cost: DecimalInput::Text(cost.to_string()),
            is_on_offer: false,
            category: None,
            image: Some("img/remera.jpg".to_string()),
            stock: Some(7),
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
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let db = setup().await;
        let repo = db.products();

        let created = repo
            .create(&draft("13", "100", &[("Rojo", "M", 3), ("Azul", "L", 2)]))
            .await
            .unwrap();

        assert_eq!(created.product.stock, 5);
        assert_eq!(created.product.dozen_price_cents, 10584);
        assert_eq!(created.product.offer_price_cents, 1085);
        assert_eq!(created.manufacturer_name.as_deref(), Some("Alfa"));
        assert_eq!(created.variations.len(), 2);

        let fetched = repo.get_by_id(&created.product.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_create_unknown_manufacturer_fails() {
        let db = setup().await;

        let err = db.products().create(&draft("404", "10", &[])).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
        assert_eq!(db.products().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_replaces_variations_and_keeps_image() {
        let db = setup().await;
        let repo = db.products();

        let created = repo
            .create(&draft("13", "100", &[("Rojo", "M", 3)]))
            .await
            .unwrap();

        let mut changed = draft("17", "100", &[("Verde", "S", 4), ("Verde", "M", 6)]);
        changed.image = None;

        let updated = repo.update(&created.product.id, &changed).await.unwrap();

        assert_eq!(updated.product.stock, 10);
        assert_eq!(updated.product.dozen_price_cents, 12500);
        assert_eq!(updated.product.image.as_deref(), Some("img/remera.jpg"));
        assert_eq!(updated.manufacturer_name.as_deref(), Some("Gamma"));
        let colors: Vec<_> = updated.variations.iter().map(|v| v.color.as_str()).collect();
        assert_eq!(colors, vec!["Verde", "Verde"]);
    }

    #[tokio::test]
    async fn test_update_missing_product() {
        let db = setup().await;

        let err = db
            .products()
            .update("missing", &draft("13", "1", &[]))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_removes_variations() {
        let db = setup().await;
        let repo = db.products();

        let created = repo
            .create(&draft("13", "100", &[("Rojo", "M", 3)]))
            .await
            .unwrap();

        repo.delete(&created.product.id).await.unwrap();

        assert!(repo.get_by_id(&created.product.id).await.unwrap().is_none());
        let orphans: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM variations WHERE product_id = ?1")
            .bind(&created.product.id)
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(orphans, 0);
        assert!(matches!(
            repo.delete(&created.product.id).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_offers_and_pagination() {
        let db = setup().await;
        let repo = db.products();

        for i in 0..5 {
            let mut d = draft("13", "10", &[("Rojo", "M", i)]);
            d.is_on_offer = i % 2 == 0;
            repo.create(&d).await.unwrap();
        }

        let all = repo.list(false, Page::new(Some(1), Some(2))).await.unwrap();
        assert_eq!(all.total, 5);
        assert_eq!(all.products.len(), 2);
        assert!(all.products.iter().all(|p| p.variations.len() == 1));

        let last = repo.list(false, Page::new(Some(3), Some(2))).await.unwrap();
        assert_eq!(last.products.len(), 1);

        let offers = repo.list(true, Page::default()).await.unwrap();
        assert_eq!(offers.total, 3);
        assert!(offers.products.iter().all(|p| p.product.is_on_offer));
    }
}
