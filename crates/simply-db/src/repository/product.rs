//! # Product Repository
//!
//! SQLite implementation of [`ProductStore`].
//!
//! ## Key Operations
//! - Catalog listing (all active, or only what can be sold right now)
//! - Barcode lookup for the till scanner
//! - CRUD with partial updates
//! - Explicit stock edits
//!
//! Checkout decrements and deletion increments live in the sale repository,
//! inside the sale's transaction.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::store::ProductStore;
use simply_core::{NewProduct, Product, ProductPatch};

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let batom = repo.get_by_barcode("7891234567890").await?;
/// let catalog = repo.list_active().await?;
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

    async fn fetch_required(&self, id: &str) -> DbResult<Product> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }
}

#[async_trait]
impl ProductStore for ProductRepository {
    async fn list_active(&self) -> DbResult<Vec<Product>> {
        debug!("Listing active products");

        let products = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE active = 1 ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    async fn list_available(&self) -> DbResult<Vec<Product>> {
        debug!("Listing products available for sale");

        let products = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE active = 1 AND stock_quantity > 0 ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        debug!(id = %id, "Getting product by ID");

        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Exact match only; a scanner never sends partial codes.
    async fn get_by_barcode(&self, barcode: &str) -> DbResult<Option<Product>> {
        debug!(barcode = %barcode, "Getting product by barcode");

        let product = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE barcode = ?1 AND active = 1",
        )
        .bind(barcode)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    async fn create(&self, new: &NewProduct) -> DbResult<Product> {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: new.name.clone(),
            description: new.description.clone(),
            price_cents: new.price_cents,
            cost_cents: new.cost_cents,
            stock_quantity: new.stock_quantity,
            min_stock_level: new.min_stock_level,
            barcode: new.barcode.clone(),
            image_url: new.image_url.clone(),
            category_id: new.category_id.clone(),
            active: new.active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        };

        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, description, price_cents, cost_cents,
                stock_quantity, min_stock_level, barcode, image_url,
                category_id, active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(product.cost_cents)
        .bind(product.stock_quantity)
        .bind(product.min_stock_level)
        .bind(&product.barcode)
        .bind(&product.image_url)
        .bind(&product.category_id)
        .bind(product.active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::UniqueViolation {
                field,
                value: product.barcode.clone().unwrap_or_default(),
            },
            other => other,
        })?;

        Ok(product)
    }

    async fn update(&self, id: &str, patch: &ProductPatch) -> DbResult<Product> {
        debug!(id = %id, "Updating product");

        let mut product = self.fetch_required(id).await?;
        patch.apply(&mut product);
        product.updated_at = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                description = ?3,
                price_cents = ?4,
                cost_cents = ?5,
                stock_quantity = ?6,
                min_stock_level = ?7,
                barcode = ?8,
                image_url = ?9,
                category_id = ?10,
                active = ?11,
                updated_at = ?12
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(product.cost_cents)
        .bind(product.stock_quantity)
        .bind(product.min_stock_level)
        .bind(&product.barcode)
        .bind(&product.image_url)
        .bind(&product.category_id)
        .bind(product.active)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(product)
    }

    async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    async fn set_stock(&self, id: &str, quantity: i64) -> DbResult<Product> {
        debug!(id = %id, quantity = quantity, "Setting stock");

        let result = sqlx::query(
            "UPDATE products SET stock_quantity = ?2, updated_at = ?3 WHERE id = ?1",
        )
        .bind(id)
        .bind(quantity)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        self.fetch_required(id).await
    }

    async fn count_active(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn count_low_stock(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM products WHERE active = 1 AND stock_quantity <= min_stock_level",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
