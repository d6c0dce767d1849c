//! # Report Aggregation
//!
//! Turns a period's sales (with nested lines) into the figures shown on the
//! reports page and written to the CSV/PDF exports.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SaleStore::list_between(now − period, now)                            │
//! │       │  Vec<SaleWithItems>                                            │
//! │       ▼                                                                 │
//! │  build_report() ← THIS MODULE                                          │
//! │       │                                                                 │
//! │       ├── sales_by_day     local date, newest first, ≤ 30 rows         │
//! │       ├── top_products     by quantity, stable, ≤ 10 rows              │
//! │       ├── sales_by_payment first-seen order                            │
//! │       └── summary          totals + average ticket                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  export::csv / export::pdf                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{PaymentMethod, Product, Sale, SaleWithItems};
use crate::validation::{validate_period_days, ValidationResult};
use crate::{SALES_BY_DAY_LIMIT, TOP_PRODUCTS_LIMIT};

// =============================================================================
// Report Period
// =============================================================================

/// A trailing window of whole days ending now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReportPeriod {
    pub days: i64,
}

impl ReportPeriod {
    pub const LAST_7_DAYS: ReportPeriod = ReportPeriod { days: 7 };
    pub const LAST_30_DAYS: ReportPeriod = ReportPeriod { days: 30 };
    pub const LAST_90_DAYS: ReportPeriod = ReportPeriod { days: 90 };

    pub fn new(days: i64) -> ValidationResult<Self> {
        validate_period_days(days)?;
        Ok(ReportPeriod { days })
    }

    /// `[now − days, now]`
    pub fn range(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        (now - Duration::days(self.days), now)
    }
}

impl Default for ReportPeriod {
    fn default() -> Self {
        ReportPeriod::LAST_30_DAYS
    }
}

// =============================================================================
// Report Rows
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SalesByDay {
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub total: Money,
    /// Number of sales that day.
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TopProduct {
    pub name: String,
    pub quantity: i64,
    pub revenue: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodTotal {
    pub method: PaymentMethod,
    pub total: Money,
    pub count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total_sales: Money,
    pub total_profit: Money,
    pub total_orders: i64,
    /// total_sales / total_orders, zero without orders.
    pub avg_ticket: Money,
}

/// Everything the reports page and the exports need.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ReportData {
    pub period: ReportPeriod,
    #[ts(as = "String")]
    pub generated_at: DateTime<Utc>,
    pub sales_by_day: Vec<SalesByDay>,
    pub top_products: Vec<TopProduct>,
    pub sales_by_payment: Vec<PaymentMethodTotal>,
    pub summary: ReportSummary,
}

// =============================================================================
// Aggregation
// =============================================================================

/// Aggregates `sales` into a [`ReportData`].
///
/// Days are calendar dates in `offset`. Top products are keyed by product
/// name and ties keep the order in which names were first seen in `sales`.
pub fn build_report(
    period: ReportPeriod,
    sales: &[SaleWithItems],
    generated_at: DateTime<Utc>,
    offset: FixedOffset,
) -> ReportData {
    ReportData {
        period,
        generated_at,
        sales_by_day: sales_by_day(sales.iter().map(|s| &s.sale), offset),
        top_products: top_products(sales),
        sales_by_payment: sales_by_payment(sales.iter().map(|s| &s.sale)),
        summary: summarize(sales.iter().map(|s| &s.sale)),
    }
}

/// Per local date, newest first, at most 30 rows.
pub fn sales_by_day<'a>(
    sales: impl IntoIterator<Item = &'a Sale>,
    offset: FixedOffset,
) -> Vec<SalesByDay> {
    let mut days: BTreeMap<NaiveDate, (Money, i64)> = BTreeMap::new();
    for sale in sales {
        let date = sale.created_at.with_timezone(&offset).date_naive();
        let entry = days.entry(date).or_insert((Money::zero(), 0));
        entry.0 += sale.total_amount();
        entry.1 += 1;
    }

    days.into_iter()
        .rev()
        .take(SALES_BY_DAY_LIMIT)
        .map(|(date, (total, count))| SalesByDay { date, total, count })
        .collect()
}

/// Best sellers by quantity, at most 10.
pub fn top_products(sales: &[SaleWithItems]) -> Vec<TopProduct> {
    let mut order: Vec<TopProduct> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for item in sales.iter().flat_map(|s| s.items.iter()) {
        let slot = *index.entry(item.product_name.as_str()).or_insert_with(|| {
            order.push(TopProduct {
                name: item.product_name.clone(),
                quantity: 0,
                revenue: Money::zero(),
            });
            order.len() - 1
        });
        order[slot].quantity += item.quantity;
        order[slot].revenue += Money::from_cents(item.total_price_cents);
    }

    // sort_by is stable
    order.sort_by(|a, b| b.quantity.cmp(&a.quantity));
    order.truncate(TOP_PRODUCTS_LIMIT);
    order
}

/// Totals per payment method in first-seen order.
pub fn sales_by_payment<'a>(sales: impl IntoIterator<Item = &'a Sale>) -> Vec<PaymentMethodTotal> {
    let mut rows: Vec<PaymentMethodTotal> = Vec::new();
    for sale in sales {
        match rows.iter_mut().find(|r| r.method == sale.payment_method) {
            Some(row) => {
                row.total += sale.total_amount();
                row.count += 1;
            }
            None => rows.push(PaymentMethodTotal {
                method: sale.payment_method,
                total: sale.total_amount(),
                count: 1,
            }),
        }
    }
    rows
}

pub fn summarize<'a>(sales: impl IntoIterator<Item = &'a Sale>) -> ReportSummary {
    let mut summary = ReportSummary::default();
    for sale in sales {
        summary.total_sales += sale.total_amount();
        summary.total_profit += sale.profit();
        summary.total_orders += 1;
    }
    summary.avg_ticket = summary.total_sales.divide_rounded(summary.total_orders);
    summary
}

// =============================================================================
// Dashboard
// =============================================================================

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_sales: Money,
    /// Sales made on today's local date.
    pub today_sales: Money,
    pub sales_count: i64,
    /// Active products.
    pub total_products: i64,
    /// Active products at or below their minimum stock.
    pub low_stock_products: i64,
    pub total_profit: Money,
}

/// Computes dashboard stats over every recorded sale and the active catalog.
pub fn dashboard_stats(
    sales: &[Sale],
    active_products: &[Product],
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> DashboardStats {
    let today = now.with_timezone(&offset).date_naive();
    let mut stats = DashboardStats::default();

    for sale in sales {
        stats.total_sales += sale.total_amount();
        stats.total_profit += sale.profit();
        stats.sales_count += 1;
        if sale.created_at.with_timezone(&offset).date_naive() == today {
            stats.today_sales += sale.total_amount();
        }
    }

    stats.total_products = active_products.len() as i64;
    stats.low_stock_products = active_products.iter().filter(|p| p.is_low_stock()).count() as i64;
    stats
}

// =============================================================================
// Unit Tests
// =============================================================================
