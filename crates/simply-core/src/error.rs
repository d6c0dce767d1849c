//! # Errors
//!
//! [`ValidationError`] covers bad input and [`CoreError`] covers cart rules.
//! Both are raised before any store is called. A `ValidationError` folds
//! into `CoreError::Validation`, and the back office maps either onto its
//! `ApiError` codes.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// Raised by the cart and the pure checks that run before any store call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Product cannot be found (unknown id or barcode).
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Adding would take the line above the product's stock.
    ///
    /// ## User Workflow
    /// ```text
    /// Batom Matte, stock 3, cart already holds 3
    ///      │
    ///      ▼
    /// add_product(batom)
    ///      │
    ///      ▼
    /// InsufficientStock { product: "Batom Matte", available: 3, requested: 4 }
    ///      │
    ///      ▼
    /// Toast: "Estoque insuficiente"
    /// ```
    #[error("Insufficient stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },

    /// Product exists but has nothing in stock.
    #[error("Product is out of stock: {0}")]
    OutOfStock(String),

    /// Checkout was attempted with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// A submission for this cart is already outstanding.
    #[error("A checkout is already in progress")]
    CheckoutInProgress,

    /// Cart has exceeded maximum allowed lines.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Item quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Line operation on a product the cart does not hold.
    #[error("Product {0} is not in the cart")]
    NotInCart(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Checked before anything reaches a store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid e-mail, malformed CPF).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

pub type CoreResult<T> = Result<T, CoreError>;
