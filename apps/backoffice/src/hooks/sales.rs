//! # Sales Hook
//!
//! Sales list state, plus [`record_sale`] for callers that persist a sale
//! outside the list. The checkout session records through its own store
//! handle and shares [`sale_recorded`] for the success message.

use std::sync::Arc;

use simply_core::formatters::format_currency;
use simply_core::{NewSale, NewSaleItem, Sale, SaleWithItems};
use simply_db::SaleStore;
use tracing::warn;

use crate::error::ApiError;
use crate::hooks::report_error;
use crate::notify::{Notification, Notifier};

/// Sales shown on the sales screen, newest first.
pub const SALES_LIST_LIMIT: i64 = 500;

/// Records a sale with its lines and stock decrements, notifying the outcome.
pub async fn record_sale(
    store: &dyn SaleStore,
    notifier: &dyn Notifier,
    sale: &NewSale,
    items: &[NewSaleItem],
) -> Result<Sale, ApiError> {
    let created = store
        .create_sale(sale, items)
        .await
        .map_err(|e| report_error(notifier, "Erro ao finalizar venda", e))?;

    notifier.notify(sale_recorded(&created));
    Ok(created)
}

/// Success message shown once a sale is stored.
pub fn sale_recorded(sale: &Sale) -> Notification {
    Notification::success(
        "Venda finalizada!",
        format!(
            "Venda de {} realizada com sucesso.",
            format_currency(sale.total_amount())
        ),
    )
}

pub struct SalesHook {
    store: Arc<dyn SaleStore>,
    notifier: Arc<dyn Notifier>,
    sales: Vec<SaleWithItems>,
    loading: bool,
}

impl SalesHook {
    pub fn new(store: Arc<dyn SaleStore>, notifier: Arc<dyn Notifier>) -> Self {
        SalesHook {
            store,
            notifier,
            sales: Vec::new(),
            loading: true,
        }
    }

    pub fn sales(&self) -> &[SaleWithItems] {
        &self.sales
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub async fn load(&mut self) -> Result<&[SaleWithItems], ApiError> {
        self.loading = true;
        let result = self.store.list_recent(SALES_LIST_LIMIT).await;
        self.loading = false;

        match result {
            Ok(sales) => {
                self.sales = sales;
                Ok(&self.sales)
            }
            Err(e) => Err(report_error(
                self.notifier.as_ref(),
                "Erro ao carregar vendas",
                e,
            )),
        }
    }

    /// Records the sale, then reloads the list to pick up the joined lines.
    pub async fn create_sale(
        &mut self,
        sale: &NewSale,
        items: &[NewSaleItem],
    ) -> Result<Sale, ApiError> {
        let created =
            record_sale(self.store.as_ref(), self.notifier.as_ref(), sale, items).await?;

        if let Err(e) = self.load().await {
            warn!(sale_id = %created.id, error = %e, "Sale recorded but list reload failed");
        }
        Ok(created)
    }

    /// Deletes a sale and puts its quantities back into stock.
    pub async fn delete_sale(&mut self, id: &str) -> Result<(), ApiError> {
        self.store
            .delete_sale(id)
            .await
            .map_err(|e| report_error(self.notifier.as_ref(), "Erro ao excluir venda", e))?;

        self.sales.retain(|s| s.sale.id != id);
        self.notifier.notify(Notification::success(
            "Venda excluída!",
            "A venda foi removida com sucesso.",
        ));
        Ok(())
    }
}
