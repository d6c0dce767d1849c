//! # Store Traits
//!
//! The seams between the back office and persistence.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  hooks / checkout workflow                                              │
//! │       │  Arc<dyn ProductStore>, Arc<dyn SaleStore>, ...                │
//! │       ▼                                                                 │
//! │  ┌──────────────────┐          ┌──────────────────────────────┐        │
//! │  │ SQLite repos     │          │ test fakes (failing stores)  │        │
//! │  │ (repository/*)   │          │                              │        │
//! │  └──────────────────┘          └──────────────────────────────┘        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every method reports failures as [`DbError`]; a missing row is `Ok(None)`
//! on lookups and [`DbError::NotFound`] on mutations.
//!
//! [`DbError`]: crate::DbError
//! [`DbError::NotFound`]: crate::DbError::NotFound

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::DbResult;
use simply_core::{
    Customer, CustomerPatch, NewCustomer, NewProduct, NewSale, NewSaleItem, Product,
    ProductPatch, Role, Sale, SaleWithItems, Session, User,
};

/// Catalog access.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Active products ordered by name.
    async fn list_active(&self) -> DbResult<Vec<Product>>;

    /// Active products with stock, ordered by name (the checkout picker).
    async fn list_available(&self) -> DbResult<Vec<Product>>;

    async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>>;

    /// Exact barcode match among active products.
    async fn get_by_barcode(&self, barcode: &str) -> DbResult<Option<Product>>;

    async fn create(&self, product: &NewProduct) -> DbResult<Product>;

    async fn update(&self, id: &str, patch: &ProductPatch) -> DbResult<Product>;

    /// Fails with `ForeignKeyViolation` when the product appears on a sale.
    async fn delete(&self, id: &str) -> DbResult<()>;

    /// Explicit stock edit (absolute quantity).
    async fn set_stock(&self, id: &str, quantity: i64) -> DbResult<Product>;

    async fn count_active(&self) -> DbResult<i64>;

    /// Active products at or below their minimum stock level.
    async fn count_low_stock(&self) -> DbResult<i64>;
}

/// Customer records.
#[async_trait]
pub trait CustomerStore: Send + Sync {
    /// All customers ordered by name.
    async fn list(&self) -> DbResult<Vec<Customer>>;

    async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>>;

    /// `created_by` is the id of the signed-in user.
    async fn create(&self, customer: &NewCustomer, created_by: &str) -> DbResult<Customer>;

    async fn update(&self, id: &str, patch: &CustomerPatch) -> DbResult<Customer>;

    async fn delete(&self, id: &str) -> DbResult<()>;
}

/// Sales and their lines.
#[async_trait]
pub trait SaleStore: Send + Sync {
    /// Most recent sales first, with their lines.
    async fn list_recent(&self, limit: i64) -> DbResult<Vec<SaleWithItems>>;

    /// Sales created in `[from, to]`, oldest first, with their lines.
    async fn list_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<Vec<SaleWithItems>>;

    /// Every sale header (dashboard totals).
    async fn list_all(&self) -> DbResult<Vec<Sale>>;

    async fn get_with_items(&self, id: &str) -> DbResult<Option<SaleWithItems>>;

    /// Records a sale, its lines and the stock decrements as one unit.
    ///
    /// Fails with `InsufficientStock` (nothing written) when any product has
    /// less stock than its line asks for.
    async fn create_sale(&self, sale: &NewSale, items: &[NewSaleItem]) -> DbResult<Sale>;

    /// Puts the sold quantities back into stock, then removes the lines and
    /// the sale, as one unit.
    async fn delete_sale(&self, id: &str) -> DbResult<()>;
}

/// Staff authentication.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// The session for `token`, if it is still valid.
    async fn current_session(&self, token: &str) -> DbResult<Option<Session>>;

    /// Fails with `InvalidCredentials` for an unknown e-mail or a wrong
    /// password.
    async fn sign_in(&self, email: &str, password: &str) -> DbResult<Session>;

    /// Signing out an unknown token is not an error.
    async fn sign_out(&self, token: &str) -> DbResult<()>;

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: Option<&str>,
        role: Role,
    ) -> DbResult<User>;
}
