//! # simply-core: Pure Business Logic for Simply POS
//!
//! All the arithmetic of the shop lives here as pure functions: the cart,
//! the sale totals, report aggregation and the exported file formats.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Simply POS Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Presentation (web frontend)                     │   │
//! │  │    Catalog ──► Cart / Till ──► Sales ──► Reports (CSV / PDF)    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              simply-backoffice (hooks, workflows)               │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ simply-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │  report   │  │   │
//! │  │   │  Product  │  │   Money   │  │   Cart    │  │  export   │  │   │
//! │  │   │   Sale    │  │  (cents)  │  │ CartItem  │  │ CSV / PDF │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 simply-db (Data Service Layer)                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Customer, Sale, SaleItem, User)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - Cart with stock-checked quantities and sale totals
//! - [`report`] - Sales aggregation for the reports page and dashboard
//! - [`export`] - CSV and PDF rendering of a report
//! - [`formatters`] - pt-BR currency, dates, payment labels, sale numbers
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use simply_core::money::Money;
//!
//! let price = Money::from_cents(1000); // R$ 10,00
//! let line = price.multiply_quantity(2);
//!
//! assert_eq!(line.cents(), 2000);
//! assert_eq!(line.to_string(), "R$ 20,00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod export;
pub mod formatters;
pub mod money;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartItem, CartTotals};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct products allowed in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single product in the cart.
///
/// Stock is the real limit; this one catches typing 1000 instead of 10.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// How many products the top-products ranking keeps.
pub const TOP_PRODUCTS_LIMIT: usize = 10;

/// How many days the sales-by-day table keeps (newest first).
pub const SALES_BY_DAY_LIMIT: usize = 30;
