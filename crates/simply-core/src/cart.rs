//! # Cart
//!
//! The cart being rung up at the till or in the "new sale" dialog.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Action                   Method                 Stock rule             │
//! │  ──────                   ──────                 ──────────             │
//! │                                                                         │
//! │  Click / scan product ───► add_product() ──────► qty + 1 <= stock      │
//! │                                                                         │
//! │  Type quantity ──────────► set_quantity() ─────► qty <= stock, 0 drops │
//! │                                                                         │
//! │  + / - buttons ──────────► increment() ────────► qty + 1 <= stock      │
//! │                            decrement() ────────► 1 → removes line      │
//! │                                                                         │
//! │  Trash icon ─────────────► remove() ───────────► (none)                │
//! │                                                                         │
//! │  Finalize ───────────────► totals(), to_sale_items()                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A rejected operation leaves the cart exactly as it was.
//!
//! ## Example
//! ```rust
//! use chrono::Utc;
//! use simply_core::{Cart, Product};
//!
//! let now = Utc::now();
//! let batom = Product {
//!     id: "p1".into(),
//!     name: "Batom".into(),
//!     description: None,
//!     price_cents: 1000,
//!     cost_cents: 600,
//!     stock_quantity: 5,
//!     min_stock_level: 1,
//!     barcode: None,
//!     image_url: None,
//!     category_id: None,
//!     active: true,
//!     created_at: now,
//!     updated_at: now,
//! };
//!
//! let mut cart = Cart::new();
//! cart.add_product(&batom).unwrap();
//! cart.add_product(&batom).unwrap();
//!
//! assert_eq!(cart.subtotal().cents(), 2000);
//! assert_eq!(cart.profit().cents(), 800);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{NewSale, NewSaleItem, PaymentMethod, Product};
use crate::validation::{validate_cart_size, validate_quantity};

// =============================================================================
// Cart Item
// =============================================================================

/// A line in the cart.
///
/// Holds a frozen copy of the product's price, cost and stock as they were
/// when the line was last touched by an add. The store re-checks stock when
/// the sale is recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: String,
    pub name: String,
    pub unit_price_cents: i64,
    pub unit_cost_cents: i64,
    /// Stock snapshot used to cap the quantity.
    pub stock_quantity: i64,
    pub quantity: i64,
    #[ts(as = "String")]
    pub added_at: DateTime<Utc>,
}

impl CartItem {
    fn from_product(product: &Product, quantity: i64) -> Self {
        CartItem {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price_cents: product.price_cents,
            unit_cost_cents: product.cost_cents,
            stock_quantity: product.stock_quantity,
            quantity,
            added_at: Utc::now(),
        }
    }

    /// unit price × quantity
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.unit_price_cents).multiply_quantity(self.quantity)
    }

    /// unit cost × quantity
    pub fn line_cost(&self) -> Money {
        Money::from_cents(self.unit_cost_cents).multiply_quantity(self.quantity)
    }

    fn insufficient(&self, requested: i64) -> CoreError {
        CoreError::InsufficientStock {
            product: self.name.clone(),
            available: self.stock_quantity,
            requested,
        }
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The cart.
///
/// ## Invariants
/// - Lines are unique by `product_id` (adding again raises the quantity)
/// - Every line has `1 <= quantity <= stock_quantity`
/// - At most `MAX_CART_ITEMS` lines, `MAX_ITEM_QUANTITY` per line
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Cart { items: Vec::new() }
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct lines.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Sum of all quantities.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    pub fn get(&self, product_id: &str) -> Option<&CartItem> {
        self.items.iter().find(|i| i.product_id == product_id)
    }

    /// The most recently added line, shown by the till display.
    pub fn last_item(&self) -> Option<&CartItem> {
        self.items.iter().max_by_key(|i| i.added_at)
    }

    /// Adds one unit of `product`.
    ///
    /// ## Errors
    /// - `OutOfStock` when the product has no stock at all
    /// - `InsufficientStock` when the line already holds every unit
    pub fn add_product(&mut self, product: &Product) -> CoreResult<()> {
        self.add_item(product, 1)
    }

    /// Adds `quantity` units of `product`, merging with an existing line.
    ///
    /// The line's price/cost/stock snapshot is refreshed from `product`.
    pub fn add_item(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        validate_quantity(quantity)?;

        if product.stock_quantity <= 0 {
            return Err(CoreError::OutOfStock(product.name.clone()));
        }

        if let Some(item) = self.items.iter_mut().find(|i| i.product_id == product.id) {
            let new_qty = item.quantity + quantity;
            check_line_quantity(product, new_qty)?;

            *item = CartItem::from_product(product, new_qty);
            return Ok(());
        }

        validate_cart_size(self.items.len()).map_err(|_| CoreError::CartTooLarge {
            max: crate::MAX_CART_ITEMS,
        })?;
        check_line_quantity(product, quantity)?;

        self.items.push(CartItem::from_product(product, quantity));
        Ok(())
    }

    /// Sets a line to an absolute quantity. Zero or less removes the line.
    pub fn set_quantity(&mut self, product_id: &str, quantity: i64) -> CoreResult<()> {
        if quantity <= 0 {
            return self.remove(product_id);
        }

        let item = self
            .items
            .iter_mut()
            .find(|i| i.product_id == product_id)
            .ok_or_else(|| CoreError::NotInCart(product_id.to_string()))?;

        if quantity > crate::MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: crate::MAX_ITEM_QUANTITY,
            });
        }
        if quantity > item.stock_quantity {
            return Err(item.insufficient(quantity));
        }

        item.quantity = quantity;
        Ok(())
    }

    /// Raises a line by one unit.
    pub fn increment(&mut self, product_id: &str) -> CoreResult<()> {
        let current = self
            .get(product_id)
            .map(|i| i.quantity)
            .ok_or_else(|| CoreError::NotInCart(product_id.to_string()))?;
        self.set_quantity(product_id, current + 1)
    }

    /// Lowers a line by one unit; the last unit removes the line.
    pub fn decrement(&mut self, product_id: &str) -> CoreResult<()> {
        let current = self
            .get(product_id)
            .map(|i| i.quantity)
            .ok_or_else(|| CoreError::NotInCart(product_id.to_string()))?;
        self.set_quantity(product_id, current - 1)
    }

    pub fn remove(&mut self, product_id: &str) -> CoreResult<()> {
        let before = self.items.len();
        self.items.retain(|i| i.product_id != product_id);

        if self.items.len() == before {
            Err(CoreError::NotInCart(product_id.to_string()))
        } else {
            Ok(())
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    // =========================================================================
    // Totals
    // =========================================================================

    /// Σ unit price × quantity
    pub fn subtotal(&self) -> Money {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Σ unit cost × quantity
    pub fn total_cost(&self) -> Money {
        self.items.iter().map(CartItem::line_cost).sum()
    }

    /// subtotal − total cost
    pub fn profit(&self) -> Money {
        self.subtotal() - self.total_cost()
    }

    pub fn totals(&self) -> CartTotals {
        CartTotals::from(self)
    }

    /// Lines as they will be recorded on the sale.
    pub fn to_sale_items(&self) -> Vec<NewSaleItem> {
        self.items
            .iter()
            .map(|i| NewSaleItem {
                product_id: i.product_id.clone(),
                quantity: i.quantity,
                unit_price_cents: i.unit_price_cents,
                unit_cost_cents: i.unit_cost_cents,
                total_price_cents: i.line_total().cents(),
                total_cost_cents: i.line_cost().cents(),
            })
            .collect()
    }

    /// Sale header with the totals frozen from the current lines.
    pub fn to_new_sale(
        &self,
        payment_method: PaymentMethod,
        customer_id: Option<String>,
        notes: Option<String>,
        sold_by: Option<String>,
    ) -> NewSale {
        let totals = self.totals();
        NewSale {
            total_amount_cents: totals.subtotal_cents,
            total_cost_cents: totals.total_cost_cents,
            profit_cents: totals.profit_cents,
            payment_method,
            customer_id,
            notes,
            sold_by,
        }
    }
}

fn check_line_quantity(product: &Product, quantity: i64) -> CoreResult<()> {
    if quantity > crate::MAX_ITEM_QUANTITY {
        return Err(CoreError::QuantityTooLarge {
            requested: quantity,
            max: crate::MAX_ITEM_QUANTITY,
        });
    }
    if quantity > product.stock_quantity {
        return Err(CoreError::InsufficientStock {
            product: product.name.clone(),
            available: product.stock_quantity,
            requested: quantity,
        });
    }
    Ok(())
}

// =============================================================================
// Cart Totals
// =============================================================================

/// Cart totals summary handed to the presenter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub item_count: usize,
    pub total_quantity: i64,
    pub subtotal_cents: i64,
    pub total_cost_cents: i64,
    pub profit_cents: i64,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        CartTotals {
            item_count: cart.item_count(),
            total_quantity: cart.total_quantity(),
            subtotal_cents: cart.subtotal().cents(),
            total_cost_cents: cart.total_cost().cents(),
            profit_cents: cart.profit().cents(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
