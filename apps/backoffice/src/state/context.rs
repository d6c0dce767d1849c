//! # Application Context
//!
//! The stores are built once at startup and handed to every hook and
//! workflow as trait objects.
//!
//! ```text
//! AppConfig ──► Database::new ──► AppContext
//!                                   ├── products:  Arc<dyn ProductStore>
//!                                   ├── customers: Arc<dyn CustomerStore>
//!                                   ├── sales:     Arc<dyn SaleStore>
//!                                   ├── auth:      Arc<dyn AuthProvider>
//!                                   └── notifier:  Arc<dyn Notifier>
//! ```

use std::sync::Arc;

use simply_db::{AuthProvider, CustomerStore, Database, DbConfig, ProductStore, SaleStore};
use tracing::info;

use crate::error::ApiError;
use crate::hooks::{AuthHook, CustomersHook, ProductsHook, SalesHook};
use crate::notify::Notifier;
use crate::state::config::AppConfig;
use crate::workflow::{CheckoutMode, CheckoutSession, ReportsWorkflow};

/// Shared handles for one running back office.
#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub products: Arc<dyn ProductStore>,
    pub customers: Arc<dyn CustomerStore>,
    pub sales: Arc<dyn SaleStore>,
    pub auth: Arc<dyn AuthProvider>,
    pub notifier: Arc<dyn Notifier>,
}

impl AppContext {
    /// Opens the configured database file, creating its directory and
    /// running pending migrations.
    pub async fn open(config: AppConfig, notifier: Arc<dyn Notifier>) -> Result<Self, ApiError> {
        if let Some(dir) = config.database_path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| {
                ApiError::internal(format!("Could not create {}: {}", dir.display(), e))
            })?;
        }

        info!(db_path = %config.database_path.display(), "Opening database");
        let db = Database::new(DbConfig::new(&config.database_path)).await?;

        Ok(Self::from_database(&db, config, notifier))
    }

    /// Wraps the SQLite repositories of an open database.
    pub fn from_database(db: &Database, config: AppConfig, notifier: Arc<dyn Notifier>) -> Self {
        AppContext {
            config,
            products: Arc::new(db.products()),
            customers: Arc::new(db.customers()),
            sales: Arc::new(db.sales()),
            auth: Arc::new(db.auth()),
            notifier,
        }
    }

    pub fn products_hook(&self) -> ProductsHook {
        ProductsHook::new(self.products.clone(), self.notifier.clone())
    }

    pub fn customers_hook(&self) -> CustomersHook {
        CustomersHook::new(self.customers.clone(), self.notifier.clone())
    }

    pub fn sales_hook(&self) -> SalesHook {
        SalesHook::new(self.sales.clone(), self.notifier.clone())
    }

    pub fn auth_hook(&self) -> AuthHook {
        AuthHook::new(self.auth.clone(), self.notifier.clone())
    }

    /// A fresh checkout session for the "new sale" dialog or the till.
    pub fn checkout(&self, mode: CheckoutMode) -> CheckoutSession {
        CheckoutSession::new(
            mode,
            self.products.clone(),
            self.sales.clone(),
            self.notifier.clone(),
        )
        .with_reset_delay(self.config.till_reset_delay())
    }

    pub fn reports(&self) -> ReportsWorkflow {
        ReportsWorkflow::new(
            self.sales.clone(),
            self.products.clone(),
            self.notifier.clone(),
            self.config.utc_offset(),
        )
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[tokio::test]
    async fn test_context_shares_one_database() {
        let (ctx, _log) = test_context().await;
        seed_product(&ctx, "Batom Matte", 2990, 1200, 4, None).await;

        let mut hook = ctx.products_hook();
        hook.load().await.unwrap();
        assert_eq!(hook.products().len(), 1);
        assert_eq!(ctx.products.count_active().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_open_creates_database_file() {
        let dir = std::env::temp_dir().join(format!("simply-open-{}", std::process::id()));
        let config = AppConfig {
            database_path: dir.join("nested").join("simply.db"),
            ..AppConfig::default()
        };

        let ctx = AppContext::open(config.clone(), Arc::new(crate::notify::NotificationLog::new()))
            .await
            .unwrap();
        assert_eq!(ctx.products.count_active().await.unwrap(), 0);
        assert!(config.database_path.exists());

        drop(ctx);
        let _ = std::fs::remove_dir_all(dir);
    }
}
