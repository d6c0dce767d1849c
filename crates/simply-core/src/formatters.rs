//! # Formatters
//!
//! Brazilian Portuguese display strings: currency, dates, payment labels and
//! sale numbers. Every screen, the receipt and both exports go through here.
//!
//! Times are stored in UTC and shown in the shop's local offset (Brasília,
//! UTC−03:00, unless configured otherwise).
//!
//! ```rust
//! use simply_core::formatters::{format_currency, format_sale_number};
//! use simply_core::Money;
//!
//! assert_eq!(format_currency(Money::from_cents(4500)), "R$ 45,00");
//! assert_eq!(format_sale_number(42), "#00042");
//! ```

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};

use crate::money::Money;
use crate::types::PaymentMethod;

/// Offset used when none is configured.
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = -180;

/// Builds a fixed offset from minutes east of UTC, falling back to UTC when
/// the value is out of range.
pub fn utc_offset(minutes: i32) -> FixedOffset {
    FixedOffset::east_opt(minutes * 60).unwrap_or_else(|| Utc.fix())
}

/// Brasília time (UTC−03:00).
pub fn brasilia_offset() -> FixedOffset {
    utc_offset(DEFAULT_UTC_OFFSET_MINUTES)
}

// =============================================================================
// Currency
// =============================================================================

/// `R$ 1.234,56`
pub fn format_currency(amount: Money) -> String {
    amount.to_string()
}

/// `R$ 1234,56`: two decimals with a comma and no grouping, as written in
/// the CSV export.
pub fn format_currency_plain(amount: Money) -> String {
    let sign = if amount.is_negative() { "-" } else { "" };
    format!(
        "R$ {}{},{:02}",
        sign,
        amount.reais().abs(),
        amount.cents_part()
    )
}

/// A share in tenths of a percent, shown with one decimal: `33.3%`.
pub fn format_percent(permille: i64) -> String {
    format!("{}.{}%", permille / 10, (permille % 10).abs())
}

// =============================================================================
// Dates
// =============================================================================

/// `dd/mm/yyyy`
pub fn format_date(at: DateTime<Utc>, offset: FixedOffset) -> String {
    at.with_timezone(&offset).format("%d/%m/%Y").to_string()
}

/// `dd/mm/yyyy` for a calendar date.
pub fn format_day(day: NaiveDate) -> String {
    day.format("%d/%m/%Y").to_string()
}

/// `dd/mm/yyyy, HH:MM`
pub fn format_date_time(at: DateTime<Utc>, offset: FixedOffset) -> String {
    at.with_timezone(&offset)
        .format("%d/%m/%Y, %H:%M")
        .to_string()
}

/// `HH:MM:SS`
pub fn format_time(at: DateTime<Utc>, offset: FixedOffset) -> String {
    at.with_timezone(&offset).format("%H:%M:%S").to_string()
}

// =============================================================================
// Payment Methods
// =============================================================================

/// Label used on screens and the receipt.
pub fn payment_method_label(method: PaymentMethod) -> &'static str {
    match method {
        PaymentMethod::Cash => "Dinheiro",
        PaymentMethod::CreditCard => "Cartão de Crédito",
        PaymentMethod::DebitCard => "Cartão de Débito",
        PaymentMethod::Pix => "PIX",
    }
}

/// Shorter label used in report tables.
pub fn payment_method_short_label(method: PaymentMethod) -> &'static str {
    match method {
        PaymentMethod::Cash => "Dinheiro",
        PaymentMethod::CreditCard => "Cartão Crédito",
        PaymentMethod::DebitCard => "Cartão Débito",
        PaymentMethod::Pix => "PIX",
    }
}

// =============================================================================
// Sale Numbers
// =============================================================================

/// `#` followed by the number zero-padded to five digits.
pub fn format_sale_number(number: i64) -> String {
    format!("#{:05}", number)
}
