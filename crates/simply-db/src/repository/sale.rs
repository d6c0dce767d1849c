//! # Sale Repository
//!
//! SQLite implementation of [`SaleStore`].
//!
//! ## Checkout Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN IMMEDIATE                                                        │
//! │    sale_number = MAX(sale_number) + 1                                   │
//! │    INSERT sales                                                         │
//! │    INSERT sale_items (one per cart line)                                │
//! │    for each product:                                                    │
//! │      UPDATE products SET stock = stock - qty                            │
//! │        WHERE id = ? AND stock >= qty      ← 0 rows? ROLLBACK           │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Two tills selling the last unit at the same time: the second decrement
//! matches no row and the second sale is never recorded.
//!
//! Deletion runs the mirror image: stock increments, item rows, sale row, all
//! in one transaction.
//!
//! Both take the write lock up front (`BEGIN IMMEDIATE`). A deferred
//! transaction that reads first cannot upgrade its lock while another till
//! writes, and SQLite fails it at once instead of waiting out the busy
//! timeout.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::store::SaleStore;
use simply_core::{NewSale, NewSaleItem, Sale, SaleItemDetail, SaleWithItems};

/// Item projection joined with the product name.
const ITEM_DETAIL_SELECT: &str = r#"
    SELECT
        si.id, si.sale_id, si.product_id, p.name AS product_name,
        si.quantity, si.unit_price_cents, si.unit_cost_cents,
        si.total_price_cents, si.total_cost_cents
    FROM sale_items si
    JOIN products p ON p.id = si.product_id
"#;

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Write transaction holding the lock from its first statement.
    async fn begin(&self) -> DbResult<Transaction<'static, Sqlite>> {
        self.pool
            .begin_with("BEGIN IMMEDIATE")
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))
    }

    /// Loads the lines for `sales` and nests them, keeping the sales' order.
    async fn attach_items(&self, sales: Vec<Sale>) -> DbResult<Vec<SaleWithItems>> {
        if sales.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; sales.len()].join(", ");
        let sql = format!(
            "{ITEM_DETAIL_SELECT} WHERE si.sale_id IN ({placeholders}) ORDER BY si.rowid"
        );

        let mut query = sqlx::query_as::<_, SaleItemDetail>(&sql);
        for sale in &sales {
            query = query.bind(&sale.id);
        }
        let rows = query.fetch_all(&self.pool).await?;

        let mut by_sale: HashMap<String, Vec<SaleItemDetail>> = HashMap::new();
        for row in rows {
            by_sale.entry(row.sale_id.clone()).or_default().push(row);
        }

        Ok(sales
            .into_iter()
            .map(|sale| {
                let items = by_sale.remove(&sale.id).unwrap_or_default();
                SaleWithItems { sale, items }
            })
            .collect())
    }
}

/// Sums quantities per product, keeping first-seen order.
fn quantities_by_product(items: &[NewSaleItem]) -> Vec<(&str, i64)> {
    let mut totals: Vec<(&str, i64)> = Vec::new();
    for item in items {
        match totals.iter_mut().find(|(id, _)| *id == item.product_id) {
            Some((_, qty)) => *qty += item.quantity,
            None => totals.push((item.product_id.as_str(), item.quantity)),
        }
    }
    totals
}

async fn decrement_stock(
    tx: &mut Transaction<'_, Sqlite>,
    product_id: &str,
    quantity: i64,
    now: DateTime<Utc>,
) -> DbResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE products
        SET stock_quantity = stock_quantity - ?2, updated_at = ?3
        WHERE id = ?1 AND stock_quantity >= ?2
        "#,
    )
    .bind(product_id)
    .bind(quantity)
    .bind(now)
    .execute(&mut **tx)
    .await?;

    if result.rows_affected() == 1 {
        return Ok(());
    }

    let available: Option<i64> =
        sqlx::query_scalar("SELECT stock_quantity FROM products WHERE id = ?1")
            .bind(product_id)
            .fetch_optional(&mut **tx)
            .await?;

    match available {
        Some(available) => Err(DbError::InsufficientStock {
            product_id: product_id.to_string(),
            available,
            requested: quantity,
        }),
        None => Err(DbError::not_found("Product", product_id)),
    }
}

#[async_trait]
impl SaleStore for SaleRepository {
    async fn list_recent(&self, limit: i64) -> DbResult<Vec<SaleWithItems>> {
        debug!(limit = limit, "Listing recent sales");

        let sales = sqlx::query_as::<_, Sale>(
            "SELECT * FROM sales ORDER BY created_at DESC, sale_number DESC LIMIT ?1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        self.attach_items(sales).await
    }

    async fn list_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<Vec<SaleWithItems>> {
        debug!(%from, %to, "Listing sales in period");

        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT * FROM sales
            WHERE created_at >= ?1 AND created_at <= ?2
            ORDER BY created_at, sale_number
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        self.attach_items(sales).await
    }

    async fn list_all(&self) -> DbResult<Vec<Sale>> {
        debug!("Listing all sales");

        let sales = sqlx::query_as::<_, Sale>("SELECT * FROM sales ORDER BY created_at")
            .fetch_all(&self.pool)
            .await?;

        Ok(sales)
    }

    async fn get_with_items(&self, id: &str) -> DbResult<Option<SaleWithItems>> {
        debug!(id = %id, "Getting sale with items");

        let sale = sqlx::query_as::<_, Sale>("SELECT * FROM sales WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match sale {
            Some(sale) => Ok(self.attach_items(vec![sale]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn create_sale(&self, new: &NewSale, items: &[NewSaleItem]) -> DbResult<Sale> {
        let now = Utc::now();
        let mut tx = self.begin().await?;

        let sale_number: i64 =
            sqlx::query_scalar("SELECT COALESCE(MAX(sale_number), 0) + 1 FROM sales")
                .fetch_one(&mut *tx)
                .await?;

        let sale = Sale {
            id: Uuid::new_v4().to_string(),
            sale_number,
            total_amount_cents: new.total_amount_cents,
            total_cost_cents: new.total_cost_cents,
            profit_cents: new.profit_cents,
            payment_method: new.payment_method,
            customer_id: new.customer_id.clone(),
            notes: new.notes.clone(),
            sold_by: new.sold_by.clone(),
            created_at: now,
        };

        debug!(id = %sale.id, sale_number = sale_number, items = items.len(), "Inserting sale");

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, sale_number, total_amount_cents, total_cost_cents,
                profit_cents, payment_method, customer_id, notes, sold_by, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&sale.id)
        .bind(sale.sale_number)
        .bind(sale.total_amount_cents)
        .bind(sale.total_cost_cents)
        .bind(sale.profit_cents)
        .bind(sale.payment_method)
        .bind(&sale.customer_id)
        .bind(&sale.notes)
        .bind(&sale.sold_by)
        .bind(sale.created_at)
        .execute(&mut *tx)
        .await?;

        for item in items {
            sqlx::query(
                r#"
                INSERT INTO sale_items (
                    id, sale_id, product_id, quantity, unit_price_cents,
                    unit_cost_cents, total_price_cents, total_cost_cents, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&sale.id)
            .bind(&item.product_id)
            .bind(item.quantity)
            .bind(item.unit_price_cents)
            .bind(item.unit_cost_cents)
            .bind(item.total_price_cents)
            .bind(item.total_cost_cents)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        for (product_id, quantity) in quantities_by_product(items) {
            if let Err(e) = decrement_stock(&mut tx, product_id, quantity, now).await {
                warn!(sale_number = sale_number, error = %e, "Sale rolled back");
                return Err(e);
            }
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            id = %sale.id,
            sale_number = sale.sale_number,
            total_cents = sale.total_amount_cents,
            payment_method = sale.payment_method.as_str(),
            "Sale recorded"
        );

        Ok(sale)
    }

    async fn delete_sale(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting sale");

        let mut tx = self.begin().await?;

        let sale_number: Option<i64> =
            sqlx::query_scalar("SELECT sale_number FROM sales WHERE id = ?1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let sale_number = sale_number.ok_or_else(|| DbError::not_found("Sale", id))?;

        let lines: Vec<(String, i64)> =
            sqlx::query_as("SELECT product_id, quantity FROM sale_items WHERE sale_id = ?1")
                .bind(id)
                .fetch_all(&mut *tx)
                .await?;

        let now = Utc::now();
        for (product_id, quantity) in &lines {
            let result = sqlx::query(
                r#"
                UPDATE products
                SET stock_quantity = stock_quantity + ?2, updated_at = ?3
                WHERE id = ?1
                "#,
            )
            .bind(product_id)
            .bind(quantity)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                warn!(product_id = %product_id, "Product gone, stock not restored");
            }
        }

        sqlx::query("DELETE FROM sale_items WHERE sale_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM sales WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(id = %id, sale_number = sale_number, lines = lines.len(), "Sale deleted, stock restored");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{new_product, test_db};
    use crate::store::{CustomerStore, ProductStore};
    use crate::Database;
    use simply_core::{Cart, NewCustomer, PaymentMethod, Product};

    async fn product(db: &Database, name: &str, price: i64, cost: i64, stock: i64) -> Product {
        db.products()
            .create(&new_product(name, price, cost, stock, None))
            .await
            .unwrap()
    }

    async fn stock_of(db: &Database, id: &str) -> i64 {
        db.products().get_by_id(id).await.unwrap().unwrap().stock_quantity
    }

    fn checkout(lines: &[(&Product, i64)], method: PaymentMethod) -> (NewSale, Vec<NewSaleItem>) {
        let mut cart = Cart::new();
        for (p, qty) in lines {
            cart.add_item(p, *qty).unwrap();
        }
        (
            cart.to_new_sale(method, None, None, Some("user-1".into())),
            cart.to_sale_items(),
        )
    }

    #[tokio::test]
    async fn test_checkout_records_sale_and_decrements_stock() {
        let db = test_db().await;
        let a = product(&db, "Batom", 1000, 600, 10).await;
        let b = product(&db, "Perfume", 2500, 1500, 5).await;

        let (sale, items) = checkout(&[(&a, 2), (&b, 1)], PaymentMethod::Pix);
        let recorded = db.sales().create_sale(&sale, &items).await.unwrap();

        assert_eq!(recorded.sale_number, 1);
        assert_eq!(recorded.total_amount_cents, 4500);
        assert_eq!(recorded.total_cost_cents, 2700);
        assert_eq!(recorded.profit_cents, 1800);

        assert_eq!(stock_of(&db, &a.id).await, 8);
        assert_eq!(stock_of(&db, &b.id).await, 4);

        let stored = db.sales().get_with_items(&recorded.id).await.unwrap().unwrap();
        assert_eq!(stored.sale, recorded);
        assert_eq!(stored.items.len(), 2);
        assert_eq!(stored.items[0].product_name, "Batom");
        let line_sum: i64 = stored.items.iter().map(|i| i.total_price_cents).sum();
        assert_eq!(line_sum, recorded.total_amount_cents);

        let (sale, items) = checkout(&[(&a, 1)], PaymentMethod::Cash);
        let second = db.sales().create_sale(&sale, &items).await.unwrap();
        assert_eq!(second.sale_number, 2);
    }

    #[tokio::test]
    async fn test_oversell_rolls_back_everything() {
        let db = test_db().await;
        let a = product(&db, "Batom", 1000, 600, 10).await;
        let b = product(&db, "Perfume", 2500, 1500, 3).await;

        // The cart saw 3 units of B; another till sold 2 meanwhile
        let (sale, items) = checkout(&[(&a, 2), (&b, 3)], PaymentMethod::CreditCard);
        db.products().set_stock(&b.id, 1).await.unwrap();

        let err = db.sales().create_sale(&sale, &items).await.unwrap_err();
        assert_eq!(
            err,
            DbError::InsufficientStock {
                product_id: b.id.clone(),
                available: 1,
                requested: 3,
            }
        );

        assert_eq!(stock_of(&db, &a.id).await, 10);
        assert_eq!(stock_of(&db, &b.id).await, 1);
        assert!(db.sales().list_all().await.unwrap().is_empty());

        let orphan_items: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sale_items")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(orphan_items, 0);
    }

    #[tokio::test]
    async fn test_unknown_product_fails_sale() {
        let db = test_db().await;
        let mut ghost = product(&db, "Fantasma", 1000, 500, 2).await;
        ghost.id = "no-such-product".to_string();

        let (sale, items) = checkout(&[(&ghost, 1)], PaymentMethod::Cash);
        let err = db.sales().create_sale(&sale, &items).await.unwrap_err();

        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
        assert!(db.sales().list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_restores_stock() {
        let db = test_db().await;
        let x = product(&db, "Creme X", 3000, 1000, 10).await;
        let y = product(&db, "Sérum Y", 5000, 2000, 4).await;

        let (sale, items) = checkout(&[(&x, 2), (&y, 1)], PaymentMethod::DebitCard);
        let recorded = db.sales().create_sale(&sale, &items).await.unwrap();
        assert_eq!(stock_of(&db, &x.id).await, 8);
        assert_eq!(stock_of(&db, &y.id).await, 3);

        db.sales().delete_sale(&recorded.id).await.unwrap();

        assert_eq!(stock_of(&db, &x.id).await, 10);
        assert_eq!(stock_of(&db, &y.id).await, 4);
        assert!(db.sales().get_with_items(&recorded.id).await.unwrap().is_none());

        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sale_items")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(remaining, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_tills_on_file_database() {
        let dir = std::env::temp_dir().join(format!("simply-tills-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let db = Database::new(crate::DbConfig::new(dir.join("loja.db")))
            .await
            .unwrap();
        let batom = product(&db, "Batom", 1000, 600, 1_000).await;

        let mut tills = Vec::new();
        for _ in 0..4 {
            let db = db.clone();
            let (sale, items) = checkout(&[(&batom, 1)], PaymentMethod::Pix);
            tills.push(tokio::spawn(async move {
                let mut recorded = Vec::new();
                for _ in 0..25 {
                    recorded.push(db.sales().create_sale(&sale, &items).await);
                }
                recorded
            }));
        }

        let mut numbers = Vec::new();
        for till in tills {
            for result in till.await.unwrap() {
                numbers.push(result.unwrap().sale_number);
            }
        }
        numbers.sort_unstable();
        assert_eq!(numbers, (1..=100).collect::<Vec<i64>>());
        assert_eq!(stock_of(&db, &batom.id).await, 900);

        // Deletions racing new sales also wait for the lock
        let sales = db.sales().list_all().await.unwrap();
        let mut jobs = Vec::new();
        for sale in sales.into_iter().take(10) {
            let del_db = db.clone();
            jobs.push(tokio::spawn(async move { del_db.sales().delete_sale(&sale.id).await }));
            let db = db.clone();
            let (new, items) = checkout(&[(&batom, 1)], PaymentMethod::Cash);
            jobs.push(tokio::spawn(async move {
                db.sales().create_sale(&new, &items).await.map(|_| ())
            }));
        }
        for job in jobs {
            job.await.unwrap().unwrap();
        }
        assert_eq!(stock_of(&db, &batom.id).await, 900);
        assert_eq!(db.sales().list_all().await.unwrap().len(), 100);

        db.close().await;
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_delete_unknown_sale_is_not_found() {
        let db = test_db().await;
        assert!(matches!(
            db.sales().delete_sale("missing").await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_sold_product_cannot_be_deleted() {
        let db = test_db().await;
        let a = product(&db, "Batom", 1000, 600, 10).await;

        let (sale, items) = checkout(&[(&a, 1)], PaymentMethod::Cash);
        db.sales().create_sale(&sale, &items).await.unwrap();

        assert!(matches!(
            db.products().delete(&a.id).await,
            Err(DbError::ForeignKeyViolation { .. })
        ));
    }

    #[tokio::test]
    async fn test_deleting_customer_keeps_sale() {
        let db = test_db().await;
        let a = product(&db, "Batom", 1000, 600, 10).await;
        let customer = db
            .customers()
            .create(
                &NewCustomer {
                    name: "Ana".into(),
                    ..Default::default()
                },
                "user-1",
            )
            .await
            .unwrap();

        let (mut sale, items) = checkout(&[(&a, 1)], PaymentMethod::Cash);
        sale.customer_id = Some(customer.id.clone());
        let recorded = db.sales().create_sale(&sale, &items).await.unwrap();

        db.customers().delete(&customer.id).await.unwrap();

        let stored = db.sales().get_with_items(&recorded.id).await.unwrap().unwrap();
        assert_eq!(stored.sale.customer_id, None);
    }

    #[tokio::test]
    async fn test_listing_by_period_and_recency() {
        let db = test_db().await;
        let a = product(&db, "Batom", 1000, 600, 10).await;

        let mut ids = Vec::new();
        for _ in 0..3 {
            let (sale, items) = checkout(&[(&a, 1)], PaymentMethod::Cash);
            ids.push(db.sales().create_sale(&sale, &items).await.unwrap().id);
        }

        // Move the first sale back 40 days
        let old = Utc::now() - chrono::Duration::days(40);
        sqlx::query("UPDATE sales SET created_at = ?1 WHERE id = ?2")
            .bind(old)
            .bind(&ids[0])
            .execute(db.pool())
            .await
            .unwrap();

        let now = Utc::now();
        let recent = db
            .sales()
            .list_between(now - chrono::Duration::days(30), now)
            .await
            .unwrap();
        let recent_ids: Vec<&str> = recent.iter().map(|s| s.sale.id.as_str()).collect();
        assert_eq!(recent_ids, vec![ids[1].as_str(), ids[2].as_str()]);
        assert!(recent.iter().all(|s| s.items.len() == 1));

        let latest = db.sales().list_recent(2).await.unwrap();
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[0].sale.sale_number, 3);
        assert_eq!(latest[1].sale.sale_number, 2);

        assert_eq!(db.sales().list_all().await.unwrap().len(), 3);
    }

    #[test]
    fn test_quantities_by_product_merges_lines() {
        let line = |id: &str, quantity| NewSaleItem {
            product_id: id.to_string(),
            quantity,
            unit_price_cents: 0,
            unit_cost_cents: 0,
            total_price_cents: 0,
            total_cost_cents: 0,
        };
        let items = vec![line("a", 2), line("b", 1), line("a", 3)];

        assert_eq!(quantities_by_product(&items), vec![("a", 5), ("b", 1)]);
    }
}
