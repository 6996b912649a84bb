//! # Manufacturer Repository
//!
//! Manufacturers are a small lookup table. Their ids are the keys of the
//! pricing table, so they are plain text (`"13"`), not UUIDs.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use storefront_core::Manufacturer;

/// Repository for manufacturer database operations.
#[derive(Debug, Clone)]
pub struct ManufacturerRepository {
    pool: SqlitePool,
}

impl ManufacturerRepository {
    /// Creates a new ManufacturerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ManufacturerRepository { pool }
    }

    /// Lists all manufacturers ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Manufacturer>> {
        let manufacturers = sqlx::query_as::<_, Manufacturer>(
            "SELECT id, name FROM manufacturers ORDER BY name, id",
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = manufacturers.len(), "Listed manufacturers");
        Ok(manufacturers)
    }

    /// Gets a manufacturer by id.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Manufacturer>> {
        let manufacturer =
            sqlx::query_as::<_, Manufacturer>("SELECT id, name FROM manufacturers WHERE id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(manufacturer)
    }

    /// Inserts a manufacturer.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - id already exists
    pub async fn insert(&self, manufacturer: &Manufacturer) -> DbResult<()> {
        debug!(id = %manufacturer.id, name = %manufacturer.name, "Inserting manufacturer");

        sqlx::query("INSERT INTO manufacturers (id, name) VALUES (?1, ?2)")
            .bind(&manufacturer.id)
            .bind(&manufacturer.name)
            .execute(&self.pool)
            .await
            .map_err(|e| match DbError::from(e) {
                DbError::UniqueViolation { field, .. } => {
                    DbError::duplicate(field, manufacturer.id.clone())
                }
                other => other,
            })?;

        Ok(())
    }

    /// Counts manufacturers.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM manufacturers")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    fn manufacturer(id: &str, name: &str) -> Manufacturer {
        Manufacturer {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_list_get() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.manufacturers();

        repo.insert(&manufacturer("16", "Zeta")).await.unwrap();
        repo.insert(&manufacturer("13", "Alfa")).await.unwrap();

        let all = repo.list().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "Alfa");

        assert_eq!(repo.get_by_id("16").await.unwrap().unwrap().name, "Zeta");
        assert!(repo.get_by_id("99").await.unwrap().is_none());
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_id() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.manufacturers();

        repo.insert(&manufacturer("13", "Alfa")).await.unwrap();
        let err = repo.insert(&manufacturer("13", "Otra")).await.unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { value, .. } if value == "13"));
    }
}
