//! # Reports Workflow
//!
//! Loads the sales of a trailing period, aggregates them and renders the
//! CSV/PDF exports. Also computes the dashboard headline numbers.
//!
//! ```text
//! load(period) ──► SaleStore::list_between(now − days, now)
//!                        │ newest first
//!                        ▼
//!                  build_report ──► ReportData ──► export(Csv | Pdf)
//! ```

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use simply_core::export::{export_report, ExportFormat, ExportedFile};
use simply_core::report::{build_report, dashboard_stats, DashboardStats, ReportData, ReportPeriod};
use simply_db::{ProductStore, SaleStore};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::notify::{Notification, Notifier};

pub struct ReportsWorkflow {
    sales: Arc<dyn SaleStore>,
    products: Arc<dyn ProductStore>,
    notifier: Arc<dyn Notifier>,
    offset: FixedOffset,
}

impl ReportsWorkflow {
    pub fn new(
        sales: Arc<dyn SaleStore>,
        products: Arc<dyn ProductStore>,
        notifier: Arc<dyn Notifier>,
        offset: FixedOffset,
    ) -> Self {
        ReportsWorkflow {
            sales,
            products,
            notifier,
            offset,
        }
    }

    pub async fn load(&self, period: ReportPeriod) -> Result<ReportData, ApiError> {
        self.load_at(period, Utc::now()).await
    }

    /// Report over `[now − period, now]`.
    pub async fn load_at(
        &self,
        period: ReportPeriod,
        now: DateTime<Utc>,
    ) -> Result<ReportData, ApiError> {
        let (from, to) = period.range(now);
        debug!(days = period.days, %from, %to, "Loading report");

        let mut sales = self.sales.list_between(from, to).await.map_err(|e| {
            self.notifier.notify(Notification::error(
                "Erro ao carregar relatórios",
                "Não foi possível carregar os dados dos relatórios.",
            ));
            ApiError::from(e)
        })?;

        // Ties in the rankings keep the order of the most recent sales
        sales.reverse();

        Ok(build_report(period, &sales, now, self.offset))
    }

    /// Renders `report` and notifies the download.
    pub fn export(&self, report: &ReportData, format: ExportFormat) -> ExportedFile {
        let file = export_report(report, format, self.offset);
        info!(
            file_name = %file.file_name,
            bytes = file.bytes.len(),
            "Report exported"
        );

        let notification = match format {
            ExportFormat::Csv => Notification::success(
                "Relatório exportado!",
                "O arquivo CSV foi baixado com sucesso.",
            ),
            ExportFormat::Pdf => Notification::success(
                "Relatório PDF exportado!",
                "O arquivo PDF foi baixado com sucesso.",
            ),
        };
        self.notifier.notify(notification);
        file
    }

    pub async fn dashboard(&self) -> Result<DashboardStats, ApiError> {
        self.dashboard_at(Utc::now()).await
    }

    /// Totals over every sale; "today" is `now`'s local date.
    pub async fn dashboard_at(&self, now: DateTime<Utc>) -> Result<DashboardStats, ApiError> {
        let loaded = async {
            let sales = self.sales.list_all().await?;
            let products = self.products.list_active().await?;
            Ok::<_, simply_db::DbError>((sales, products))
        }
        .await;

        let (sales, products) = loaded.map_err(|e| {
            self.notifier.notify(Notification::error(
                "Erro ao carregar dados",
                "Não foi possível carregar os dados do dashboard.",
            ));
            ApiError::from(e)
        })?;

        Ok(dashboard_stats(&sales, &products, now, self.offset))
    }
}
