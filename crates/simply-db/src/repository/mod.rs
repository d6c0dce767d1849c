//! # Repository Module
//!
//! SQLite implementations of the store traits in [`crate::store`].
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Hook / workflow                                                       │
//! │       │                                                                 │
//! │       │  products.get_by_barcode("7891000000017")                      │
//! │       ▼                                                                 │
//! │  Arc<dyn ProductStore>                                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ProductRepository ── SQL ──► SQLite                                   │
//! │                                                                         │
//! │  Tests swap the trait object for a fake; SQL stays in this module.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - catalog, barcode lookup, stock edits
//! - [`CustomerRepository`](customer::CustomerRepository) - customer records
//! - [`SaleRepository`](sale::SaleRepository) - transactional checkout and deletion
//! - [`AuthRepository`](auth::AuthRepository) - users, profiles, sessions

pub mod auth;
pub mod customer;
pub mod product;
pub mod sale;

#[cfg(test)]
pub(crate) mod test_support {
    use crate::{Database, DbConfig};
    use simply_core::NewProduct;

    pub async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    pub fn new_product(
        name: &str,
        price_cents: i64,
        cost_cents: i64,
        stock: i64,
        barcode: Option<&str>,
    ) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            price_cents,
            cost_cents,
            stock_quantity: stock,
            barcode: barcode.map(str::to_string),
            ..Default::default()
        }
    }
}
