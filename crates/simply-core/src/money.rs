//! # Money
//!
//! Amounts are whole centavos in an `i64`. The stored columns
//! (`price_cents`, `total_amount_cents`, ...) are plain integers; `Money`
//! is the typed view used for arithmetic and display. Totals and profit add
//! up exactly: R$ 10,00 × 2 + R$ 25,00 is 4500 cents, not 44.99999.
//!
//! ```rust
//! use simply_core::money::Money;
//!
//! let batom = Money::from_cents(1099);
//! let total = batom * 2 + Money::from_cents(500);
//!
//! assert_eq!(total.cents(), 2698);
//! assert_eq!(total.to_string(), "R$ 26,98");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};
use ts_rs::TS;

/// Centavos.
///
/// ```text
/// Product.price_cents ──► CartItem.line_total ──► Cart.subtotal ──► Sale.total_amount
/// Product.cost_cents  ──► CartItem.line_cost  ──► Cart.total_cost ──► Sale.total_cost
///                                                  subtotal − cost ──► Sale.profit
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Whole reais, truncated toward zero.
    #[inline]
    pub const fn reais(&self) -> i64 {
        self.0 / 100
    }

    /// Centavos part, 0 to 99 whatever the sign.
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Line amount for `qty` units at this unit price.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Divides into `parts` shares, rounding half away from zero.
    ///
    /// Returns zero when `parts` is zero, which is what the average ticket
    /// of an empty period shows.
    ///
    /// ## Example
    /// ```rust
    /// use simply_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(1000).divide_rounded(3).cents(), 333);
    /// assert_eq!(Money::from_cents(2000).divide_rounded(3).cents(), 667);
    /// assert_eq!(Money::from_cents(4500).divide_rounded(0), Money::zero());
    /// ```
    pub fn divide_rounded(&self, parts: i64) -> Money {
        if parts == 0 {
            return Money::zero();
        }
        let num = self.0 as i128;
        let den = parts as i128;
        let half = den.abs() / 2;
        let rounded = if (num >= 0) == (den > 0) {
            (num.abs() + half) / den.abs()
        } else {
            -((num.abs() + half) / den.abs())
        };
        Money(rounded as i64)
    }

    /// Share of `total` in tenths of a percent (`1000` = 100.0%).
    ///
    /// Zero when `total` is zero.
    pub fn permille_of(&self, total: Money) -> i64 {
        if total.is_zero() {
            return 0;
        }
        let num = self.0 as i128 * 1000;
        let den = total.0 as i128;
        ((num * 2 + den) / (den * 2)) as i64
    }
}

/// `R$ 1.234,56`
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let digits = (self.0 / 100).unsigned_abs().to_string();

        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }

        write!(f, "{}R$ {},{:02}", sign, grouped, self.cents_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}
