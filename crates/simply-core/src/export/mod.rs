//! # Report Export
//!
//! Renders a [`ReportData`](crate::report::ReportData) into downloadable
//! files. Both formats are produced fully in memory; writing them to disk
//! or handing them to a browser is the caller's job.
//!
//! - [`csv`] - sales by day, UTF-8 with BOM, CRLF
//! - [`pdf`] - paginated A4 report with the summary and three tables

pub mod csv;
pub mod pdf;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::report::{ReportData, ReportPeriod};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Pdf,
}

impl ExportFormat {
    pub const fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Pdf => "pdf",
        }
    }

    pub const fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv;charset=utf-8",
            ExportFormat::Pdf => "application/pdf",
        }
    }

    /// `relatorio-vendas-{days}-dias.{ext}`
    pub fn file_name(&self, period: ReportPeriod) -> String {
        format!("relatorio-vendas-{}-dias.{}", period.days, self.extension())
    }
}

/// A rendered export ready to be saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Renders `report` in `format`.
pub fn export_report(
    report: &ReportData,
    format: ExportFormat,
    offset: chrono::FixedOffset,
) -> ExportedFile {
    let bytes = match format {
        ExportFormat::Csv => csv::sales_by_day_csv(report).into_bytes(),
        ExportFormat::Pdf => pdf::render_report(report, offset),
    };

    ExportedFile {
        file_name: format.file_name(report.period),
        mime_type: format.mime_type().to_string(),
        bytes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_names() {
        assert_eq!(
            ExportFormat::Csv.file_name(ReportPeriod::LAST_7_DAYS),
            "relatorio-vendas-7-dias.csv"
        );
        assert_eq!(
            ExportFormat::Pdf.file_name(ReportPeriod::LAST_90_DAYS),
            "relatorio-vendas-90-dias.pdf"
        );
    }
}
