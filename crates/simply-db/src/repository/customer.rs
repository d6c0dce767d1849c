//! # Customer Repository
//!
//! SQLite implementation of [`CustomerStore`].

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::store::CustomerStore;
use simply_core::{Customer, CustomerPatch, NewCustomer};

#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }
}

#[async_trait]
impl CustomerStore for CustomerRepository {
    async fn list(&self) -> DbResult<Vec<Customer>> {
        debug!("Listing customers");

        let customers = sqlx::query_as::<_, Customer>("SELECT * FROM customers ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(customers)
    }

    async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        debug!(id = %id, "Getting customer by ID");

        let customer = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(customer)
    }

    async fn create(&self, new: &NewCustomer, created_by: &str) -> DbResult<Customer> {
        let now = Utc::now();
        let customer = Customer {
            id: Uuid::new_v4().to_string(),
            name: new.name.clone(),
            email: new.email.clone(),
            phone: new.phone.clone(),
            address: new.address.clone(),
            cpf: new.cpf.clone(),
            birth_date: new.birth_date,
            notes: new.notes.clone(),
            created_by: Some(created_by.to_string()),
            created_at: now,
            updated_at: now,
        };

        debug!(id = %customer.id, created_by = %created_by, "Inserting customer");

        sqlx::query(
            r#"
            INSERT INTO customers (
                id, name, email, phone, address, cpf, birth_date,
                notes, created_by, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.phone)
        .bind(&customer.address)
        .bind(&customer.cpf)
        .bind(customer.birth_date)
        .bind(&customer.notes)
        .bind(&customer.created_by)
        .bind(customer.created_at)
        .bind(customer.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(customer)
    }

    async fn update(&self, id: &str, patch: &CustomerPatch) -> DbResult<Customer> {
        debug!(id = %id, "Updating customer");

        let mut customer = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", id))?;
        patch.apply(&mut customer);
        customer.updated_at = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE customers SET
                name = ?2,
                email = ?3,
                phone = ?4,
                address = ?5,
                cpf = ?6,
                birth_date = ?7,
                notes = ?8,
                updated_at = ?9
            WHERE id = ?1
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.phone)
        .bind(&customer.address)
        .bind(&customer.cpf)
        .bind(customer.birth_date)
        .bind(&customer.notes)
        .bind(customer.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        Ok(customer)
    }

    /// Sales keep their history; their `customer_id` is cleared.
    async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting customer");

        let result = sqlx::query("DELETE FROM customers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::test_db;
    use chrono::NaiveDate;

    fn maria() -> NewCustomer {
        NewCustomer {
            name: "Maria Souza".to_string(),
            email: Some("maria@example.com".to_string()),
            cpf: Some("123.456.789-09".to_string()),
            birth_date: NaiveDate::from_ymd_opt(1990, 5, 17),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_records_creator() {
        let db = test_db().await;
        let repo = db.customers();

        let created = repo.create(&maria(), "user-1").await.unwrap();
        assert_eq!(created.created_by.as_deref(), Some("user-1"));

        let fetched = repo.get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.birth_date, NaiveDate::from_ymd_opt(1990, 5, 17));
    }

    #[tokio::test]
    async fn test_list_ordered_by_name() {
        let db = test_db().await;
        let repo = db.customers();

        repo.create(&maria(), "user-1").await.unwrap();
        repo.create(
            &NewCustomer {
                name: "Ana Lima".to_string(),
                ..Default::default()
            },
            "user-1",
        )
        .await
        .unwrap();

        let names: Vec<String> = repo.list().await.unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Ana Lima", "Maria Souza"]);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let db = test_db().await;
        let repo = db.customers();

        let c = repo.create(&maria(), "user-1").await.unwrap();
        let updated = repo
            .update(
                &c.id,
                &CustomerPatch {
                    phone: Some(Some("(11) 99999-0000".to_string())),
                    email: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.phone.as_deref(), Some("(11) 99999-0000"));
        assert_eq!(updated.email, None);
        assert_eq!(updated.cpf, c.cpf);

        repo.delete(&c.id).await.unwrap();
        assert!(repo.list().await.unwrap().is_empty());
        assert!(matches!(repo.delete(&c.id).await, Err(DbError::NotFound { .. })));
    }
}
