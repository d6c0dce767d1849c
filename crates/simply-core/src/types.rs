//! # Domain Types
//!
//! Core domain types used throughout Simply POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │    SaleItem     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  barcode        │   │  sale_number    │   │  sale_id (FK)   │       │
//! │  │  price / cost   │   │  total / cost   │   │  product_id     │       │
//! │  │  stock_quantity │   │  profit         │   │  qty, snapshots │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Customer     │   │ PaymentMethod   │   │   User / Role   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  name, cpf      │   │  dinheiro       │   │  email          │       │
//! │  │  email, phone   │   │  cartao_credito │   │  full_name      │       │
//! │  │  created_by     │   │  cartao_debito  │   │  admin/vendedor │       │
//! │  └─────────────────┘   │  pix            │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID where one exists: `sale_number`, `barcode`

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown at the till and on the receipt.
    pub name: String,

    pub description: Option<String>,

    /// Sale price in cents.
    pub price_cents: i64,

    /// Purchase cost in cents (profit = price - cost).
    pub cost_cents: i64,

    /// Units on hand. Never negative after a successful checkout.
    pub stock_quantity: i64,

    /// Low-stock threshold for the dashboard.
    pub min_stock_level: i64,

    /// Barcode (EAN-13 etc.) read by the till scanner.
    pub barcode: Option<String>,

    pub image_url: Option<String>,

    pub category_id: Option<String>,

    /// Inactive products are hidden from the catalog and the scanner.
    pub active: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    #[inline]
    pub fn cost(&self) -> Money {
        Money::from_cents(self.cost_cents)
    }

    /// True when stock is at or below the configured minimum.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.stock_quantity <= self.min_stock_level
    }

    /// True when at least one unit can be sold.
    #[inline]
    pub fn in_stock(&self) -> bool {
        self.stock_quantity > 0
    }
}

/// Fields supplied when creating a product.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub cost_cents: i64,
    pub stock_quantity: i64,
    pub min_stock_level: i64,
    pub barcode: Option<String>,
    pub image_url: Option<String>,
    pub category_id: Option<String>,
    /// Defaults to active when omitted.
    pub active: Option<bool>,
}

/// Partial update for a product.
///
/// `None` leaves a field alone. For nullable columns the inner option
/// distinguishes "clear" (`Some(None)`) from "set" (`Some(Some(v))`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub price_cents: Option<i64>,
    pub cost_cents: Option<i64>,
    pub stock_quantity: Option<i64>,
    pub min_stock_level: Option<i64>,
    pub barcode: Option<Option<String>>,
    pub image_url: Option<Option<String>>,
    pub category_id: Option<Option<String>>,
    pub active: Option<bool>,
}

impl ProductPatch {
    /// Applies every present field onto `product`.
    pub fn apply(&self, product: &mut Product) {
        if let Some(name) = &self.name {
            product.name = name.clone();
        }
        if let Some(description) = &self.description {
            product.description = description.clone();
        }
        if let Some(price) = self.price_cents {
            product.price_cents = price;
        }
        if let Some(cost) = self.cost_cents {
            product.cost_cents = cost;
        }
        if let Some(stock) = self.stock_quantity {
            product.stock_quantity = stock;
        }
        if let Some(min) = self.min_stock_level {
            product.min_stock_level = min;
        }
        if let Some(barcode) = &self.barcode {
            product.barcode = barcode.clone();
        }
        if let Some(image_url) = &self.image_url {
            product.image_url = image_url.clone();
        }
        if let Some(category_id) = &self.category_id {
            product.category_id = category_id.clone();
        }
        if let Some(active) = self.active {
            product.active = active;
        }
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A registered customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    /// Brazilian taxpayer number, stored as typed.
    pub cpf: Option<String>,
    #[ts(as = "Option<String>")]
    pub birth_date: Option<NaiveDate>,
    pub notes: Option<String>,
    /// User who registered the customer.
    pub created_by: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct NewCustomer {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub cpf: Option<String>,
    #[ts(as = "Option<String>")]
    pub birth_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Partial update for a customer. Same conventions as [`ProductPatch`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct CustomerPatch {
    pub name: Option<String>,
    pub email: Option<Option<String>>,
    pub phone: Option<Option<String>>,
    pub address: Option<Option<String>>,
    pub cpf: Option<Option<String>>,
    #[ts(as = "Option<Option<String>>")]
    pub birth_date: Option<Option<NaiveDate>>,
    pub notes: Option<Option<String>>,
}

impl CustomerPatch {
    pub fn apply(&self, customer: &mut Customer) {
        if let Some(name) = &self.name {
            customer.name = name.clone();
        }
        if let Some(email) = &self.email {
            customer.email = email.clone();
        }
        if let Some(phone) = &self.phone {
            customer.phone = phone.clone();
        }
        if let Some(address) = &self.address {
            customer.address = address.clone();
        }
        if let Some(cpf) = &self.cpf {
            customer.cpf = cpf.clone();
        }
        if let Some(birth_date) = self.birth_date {
            customer.birth_date = birth_date;
        }
        if let Some(notes) = &self.notes {
            customer.notes = notes.clone();
        }
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// How a sale was paid. Stored as the Portuguese wire values.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum PaymentMethod {
    #[default]
    #[serde(rename = "dinheiro")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "dinheiro"))]
    Cash,
    #[serde(rename = "cartao_credito")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "cartao_credito"))]
    CreditCard,
    #[serde(rename = "cartao_debito")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "cartao_debito"))]
    DebitCard,
    #[serde(rename = "pix")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "pix"))]
    Pix,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 4] = [
        PaymentMethod::Cash,
        PaymentMethod::CreditCard,
        PaymentMethod::DebitCard,
        PaymentMethod::Pix,
    ];

    /// Stored value.
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "dinheiro",
            PaymentMethod::CreditCard => "cartao_credito",
            PaymentMethod::DebitCard => "cartao_debito",
            PaymentMethod::Pix => "pix",
        }
    }

    /// Parses a stored value; unknown values yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == value)
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A completed sale. Immutable once created except for deletion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: String,
    /// Human-facing sequential number, starting at 1.
    pub sale_number: i64,
    pub total_amount_cents: i64,
    pub total_cost_cents: i64,
    /// Persisted at creation, never re-derived.
    pub profit_cents: i64,
    pub payment_method: PaymentMethod,
    pub customer_id: Option<String>,
    pub notes: Option<String>,
    /// User who rang up the sale.
    pub sold_by: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Sale {
    #[inline]
    pub fn total_amount(&self) -> Money {
        Money::from_cents(self.total_amount_cents)
    }

    #[inline]
    pub fn profit(&self) -> Money {
        Money::from_cents(self.profit_cents)
    }
}

/// Header of a sale about to be recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewSale {
    pub total_amount_cents: i64,
    pub total_cost_cents: i64,
    pub profit_cents: i64,
    pub payment_method: PaymentMethod,
    pub customer_id: Option<String>,
    pub notes: Option<String>,
    pub sold_by: Option<String>,
}

// =============================================================================
// Sale Item
// =============================================================================

/// A line of a sale. Price and cost are frozen at the time of sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub unit_cost_cents: i64,
    /// unit_price × quantity
    pub total_price_cents: i64,
    /// unit_cost × quantity
    pub total_cost_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A line about to be recorded; `sale_id` is assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewSaleItem {
    pub product_id: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub unit_cost_cents: i64,
    pub total_price_cents: i64,
    pub total_cost_cents: i64,
}

/// A sale line joined with the product name, as the sales list and the
/// reports read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleItemDetail {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub unit_cost_cents: i64,
    pub total_price_cents: i64,
    pub total_cost_cents: i64,
}

/// A sale with its nested lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleWithItems {
    #[serde(flatten)]
    pub sale: Sale,
    pub items: Vec<SaleItemDetail>,
}

// =============================================================================
// Users
// =============================================================================

/// Staff role stored on the profile.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Vendedor,
}

/// An authenticated staff member (user joined with profile).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct User {
    pub id: String,
    pub email: String,
    pub full_name: Option<String>,
    pub role: Role,
}

impl User {
    /// Name printed on receipts.
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or("N/A")
    }
}

/// A signed-in session. The token is opaque to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Session {
    pub token: String,
    pub user: User,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
