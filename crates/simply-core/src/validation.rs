//! # Validation Module
//!
//! Input validation for catalog, customer and cart input.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Form (presentation)                                          │
//! │  └── Required fields, input masks                                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Hooks (simply-backoffice)                                    │
//! │  └── THIS MODULE: business rules, before any store call                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK (stock_quantity >= 0)                            │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use simply_core::validation::{validate_product_name, validate_quantity};
//!
//! assert!(validate_product_name("Base Líquida").is_ok());
//! assert!(validate_quantity(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::types::{Customer, NewCustomer, NewProduct, Product};
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_NAME_LEN: usize = 200;
const MAX_BARCODE_LEN: usize = 50;

// =============================================================================
// String Validators
// =============================================================================

fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty
/// - At most 200 characters
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    validate_name("name", name)
}

/// Validates a barcode.
///
/// ## Rules
/// - Letters and digits only
/// - At most 50 characters
///
/// ## Example
/// ```rust
/// use simply_core::validation::validate_barcode;
///
/// assert!(validate_barcode("7891234567890").is_ok());
/// assert!(validate_barcode("789 123").is_err());
/// ```
pub fn validate_barcode(barcode: &str) -> ValidationResult<()> {
    if barcode.is_empty() {
        return Err(ValidationError::Required {
            field: "barcode".to_string(),
        });
    }

    if barcode.len() > MAX_BARCODE_LEN {
        return Err(ValidationError::TooLong {
            field: "barcode".to_string(),
            max: MAX_BARCODE_LEN,
        });
    }

    if !barcode.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ValidationError::InvalidFormat {
            field: "barcode".to_string(),
            reason: "must contain only letters and digits".to_string(),
        });
    }

    Ok(())
}

/// Validates an e-mail address (shape only).
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let invalid = || ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: "must look like name@domain.tld".to_string(),
    };

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }

    match domain.rsplit_once('.') {
        Some((host, tld)) if !host.is_empty() && !tld.is_empty() => Ok(()),
        _ => Err(invalid()),
    }
}

/// Validates a CPF: 11 digits, with or without `.`/`-` punctuation.
///
/// ## Example
/// ```rust
/// use simply_core::validation::validate_cpf;
///
/// assert!(validate_cpf("123.456.789-09").is_ok());
/// assert!(validate_cpf("12345678909").is_ok());
/// assert!(validate_cpf("1234").is_err());
/// ```
pub fn validate_cpf(cpf: &str) -> ValidationResult<()> {
    let stripped: String = cpf.chars().filter(|c| *c != '.' && *c != '-').collect();

    if stripped.len() != 11 || !stripped.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "cpf".to_string(),
            reason: "must have 11 digits".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Rejects negative money or stock values.
pub fn validate_non_negative(field: &str, value: i64) -> ValidationResult<()> {
    if value < 0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a cart quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates cart size (number of distinct lines) before adding a new one.
pub fn validate_cart_size(current_items: usize) -> ValidationResult<()> {
    if current_items >= MAX_CART_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "cart items".to_string(),
            min: 0,
            max: MAX_CART_ITEMS as i64,
        });
    }

    Ok(())
}

/// Validates a report period in days.
pub fn validate_period_days(days: i64) -> ValidationResult<()> {
    if !(1..=3660).contains(&days) {
        return Err(ValidationError::OutOfRange {
            field: "period".to_string(),
            min: 1,
            max: 3660,
        });
    }

    Ok(())
}

// =============================================================================
// Entity Validators
// =============================================================================

fn validate_product_fields(
    name: &str,
    price_cents: i64,
    cost_cents: i64,
    stock_quantity: i64,
    min_stock_level: i64,
    barcode: Option<&str>,
) -> ValidationResult<()> {
    validate_product_name(name)?;
    validate_non_negative("price", price_cents)?;
    validate_non_negative("cost", cost_cents)?;
    validate_non_negative("stock_quantity", stock_quantity)?;
    validate_non_negative("min_stock_level", min_stock_level)?;
    if let Some(barcode) = barcode {
        validate_barcode(barcode)?;
    }
    Ok(())
}

/// Validates a product before it is created.
pub fn validate_new_product(product: &NewProduct) -> ValidationResult<()> {
    validate_product_fields(
        &product.name,
        product.price_cents,
        product.cost_cents,
        product.stock_quantity,
        product.min_stock_level,
        product.barcode.as_deref(),
    )
}

/// Validates a product after a patch has been applied.
pub fn validate_product(product: &Product) -> ValidationResult<()> {
    validate_product_fields(
        &product.name,
        product.price_cents,
        product.cost_cents,
        product.stock_quantity,
        product.min_stock_level,
        product.barcode.as_deref(),
    )
}

fn validate_customer_fields(
    name: &str,
    email: Option<&str>,
    cpf: Option<&str>,
) -> ValidationResult<()> {
    validate_name("name", name)?;
    if let Some(email) = email.filter(|e| !e.is_empty()) {
        validate_email(email)?;
    }
    if let Some(cpf) = cpf.filter(|c| !c.is_empty()) {
        validate_cpf(cpf)?;
    }
    Ok(())
}

/// Validates a customer before it is created.
pub fn validate_new_customer(customer: &NewCustomer) -> ValidationResult<()> {
    validate_customer_fields(&customer.name, customer.email.as_deref(), customer.cpf.as_deref())
}

/// Validates a customer after a patch has been applied.
pub fn validate_customer(customer: &Customer) -> ValidationResult<()> {
    validate_customer_fields(&customer.name, customer.email.as_deref(), customer.cpf.as_deref())
}

// =============================================================================
// Unit Tests
// =============================================================================
