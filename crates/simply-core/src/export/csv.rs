//! Sales-by-day CSV.
//!
//! ```text
//! \u{FEFF}Data,Vendas,Quantidade\r\n
//! "02/05/2024","R$ 1234,56",3\r\n
//! "01/05/2024","R$ 89,90",1
//! ```
//!
//! Starts with a UTF-8 BOM so spreadsheet apps pick the right encoding.
//! Rows are separated by CRLF with no trailing line break.

use crate::formatters::{format_currency_plain, format_day};
use crate::report::ReportData;

pub const HEADER: &str = "Data,Vendas,Quantidade";
const BOM: char = '\u{FEFF}';
const LINE_END: &str = "\r\n";

/// One row per `sales_by_day` entry, in report order.
pub fn sales_by_day_csv(report: &ReportData) -> String {
    let mut csv = String::new();
    csv.push(BOM);
    csv.push_str(HEADER);

    for day in &report.sales_by_day {
        csv.push_str(LINE_END);
        csv.push_str(&format!(
            "\"{}\",\"{}\",{}",
            format_day(day.date),
            format_currency_plain(day.total),
            day.count
        ));
    }

    csv
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::report::{ReportPeriod, ReportSummary, SalesByDay};
    use chrono::{NaiveDate, Utc};

    fn report(days: Vec<SalesByDay>) -> ReportData {
        ReportData {
            period: ReportPeriod::LAST_30_DAYS,
            generated_at: Utc::now(),
            sales_by_day: days,
            top_products: Vec::new(),
            sales_by_payment: Vec::new(),
            summary: ReportSummary::default(),
        }
    }

    #[test]
    fn test_empty_report_is_bom_and_header() {
        assert_eq!(sales_by_day_csv(&report(Vec::new())), "\u{FEFF}Data,Vendas,Quantidade");
    }

    #[test]
    fn test_rows_use_crlf_and_plain_currency() {
        let csv = sales_by_day_csv(&report(vec![
            SalesByDay {
                date: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
                total: Money::from_cents(123456),
                count: 3,
            },
            SalesByDay {
                date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
                total: Money::from_cents(8990),
                count: 1,
            },
        ]));

        assert!(csv.starts_with('\u{FEFF}'));
        let lines: Vec<&str> = csv.trim_start_matches('\u{FEFF}').split("\r\n").collect();
        assert_eq!(
            lines,
            vec![
                "Data,Vendas,Quantidade",
                "\"02/05/2024\",\"R$ 1234,56\",3",
                "\"01/05/2024\",\"R$ 89,90\",1",
            ]
        );
        assert!(!csv.ends_with("\r\n"));
        assert_eq!(csv.matches('\n').count(), csv.matches("\r\n").count());
    }
}
