//! # Products Hook
//!
//! Catalog screen state: the active products ordered by name, plus the
//! barcode lookup shared with the till.

use std::sync::Arc;

use simply_core::validation::{validate_new_product, validate_non_negative, validate_product};
use simply_core::{CoreError, NewProduct, Product, ProductPatch};
use simply_db::ProductStore;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::hooks::report_error;
use crate::notify::{Notification, Notifier};

/// Result of reading a barcode.
#[derive(Debug, Clone, PartialEq)]
pub enum BarcodeLookup {
    Found(Product),
    /// No active product carries this code.
    NotFound,
    /// The product exists but has no units left.
    OutOfStock(Product),
}

/// Looks `code` up among active products and notifies the two misses.
pub async fn lookup_barcode(
    store: &dyn ProductStore,
    notifier: &dyn Notifier,
    code: &str,
) -> Result<BarcodeLookup, ApiError> {
    let code = code.trim();
    debug!(barcode = %code, "Looking up barcode");

    let product = store
        .get_by_barcode(code)
        .await
        .map_err(|e| report_error(notifier, "Erro ao buscar produto", e))?;

    Ok(match product {
        None => {
            notifier.notify(Notification::error(
                "Produto não encontrado",
                format!("Nenhum produto com o código {} foi encontrado.", code),
            ));
            BarcodeLookup::NotFound
        }
        Some(p) if !p.in_stock() => {
            notifier.notify(Notification::error(
                "Estoque insuficiente",
                format!("O produto {} está sem estoque.", p.name),
            ));
            BarcodeLookup::OutOfStock(p)
        }
        Some(p) => BarcodeLookup::Found(p),
    })
}

/// A blank barcode field means "no barcode".
fn normalize_barcode(barcode: Option<String>) -> Option<String> {
    barcode
        .map(|b| b.trim().to_string())
        .filter(|b| !b.is_empty())
}

pub struct ProductsHook {
    store: Arc<dyn ProductStore>,
    notifier: Arc<dyn Notifier>,
    products: Vec<Product>,
    loading: bool,
}

impl ProductsHook {
    pub fn new(store: Arc<dyn ProductStore>, notifier: Arc<dyn Notifier>) -> Self {
        ProductsHook {
            store,
            notifier,
            products: Vec::new(),
            loading: true,
        }
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// True until the first load finishes.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub async fn load(&mut self) -> Result<&[Product], ApiError> {
        self.loading = true;
        let result = self.store.list_active().await;
        self.loading = false;

        match result {
            Ok(products) => {
                self.products = products;
                Ok(&self.products)
            }
            Err(e) => Err(report_error(
                self.notifier.as_ref(),
                "Erro ao carregar produtos",
                e,
            )),
        }
    }

    pub async fn lookup_barcode(&self, code: &str) -> Result<BarcodeLookup, ApiError> {
        lookup_barcode(self.store.as_ref(), self.notifier.as_ref(), code).await
    }

    pub async fn create(&mut self, mut product: NewProduct) -> Result<Product, ApiError> {
        const FAILED: &str = "Erro ao criar produto";

        product.barcode = normalize_barcode(product.barcode);
        validate_new_product(&product)
            .map_err(|e| report_error(self.notifier.as_ref(), FAILED, CoreError::from(e)))?;

        let created = self
            .store
            .create(&product)
            .await
            .map_err(|e| report_error(self.notifier.as_ref(), FAILED, e))?;

        self.upsert(created.clone());
        self.notifier.notify(Notification::success(
            "Produto criado!",
            "O produto foi adicionado com sucesso.",
        ));
        Ok(created)
    }

    pub async fn update(&mut self, id: &str, mut patch: ProductPatch) -> Result<Product, ApiError> {
        const FAILED: &str = "Erro ao atualizar produto";

        patch.barcode = patch.barcode.map(normalize_barcode);
        let mut preview = self.current(id, FAILED).await?;
        patch.apply(&mut preview);
        validate_product(&preview)
            .map_err(|e| report_error(self.notifier.as_ref(), FAILED, CoreError::from(e)))?;

        let updated = self
            .store
            .update(id, &patch)
            .await
            .map_err(|e| report_error(self.notifier.as_ref(), FAILED, e))?;

        self.upsert(updated.clone());
        self.notifier.notify(Notification::success(
            "Produto atualizado!",
            "As alterações foram salvas.",
        ));
        Ok(updated)
    }

    /// The row an update starts from: cached, or read from the store.
    async fn current(&self, id: &str, failed: &str) -> Result<Product, ApiError> {
        if let Some(cached) = self.products.iter().find(|p| p.id == id) {
            return Ok(cached.clone());
        }
        match self.store.get_by_id(id).await {
            Ok(Some(product)) => Ok(product),
            Ok(None) => Err(report_error(
                self.notifier.as_ref(),
                failed,
                ApiError::not_found("Product", id),
            )),
            Err(e) => Err(report_error(self.notifier.as_ref(), failed, e)),
        }
    }

    pub async fn delete(&mut self, id: &str) -> Result<(), ApiError> {
        self.store
            .delete(id)
            .await
            .map_err(|e| report_error(self.notifier.as_ref(), "Erro ao remover produto", e))?;

        self.products.retain(|p| p.id != id);
        self.notifier.notify(Notification::success(
            "Produto removido!",
            "O produto foi excluído com sucesso.",
        ));
        Ok(())
    }

    /// Sets the units on hand. No notification on success.
    pub async fn update_stock(&mut self, id: &str, quantity: i64) -> Result<Product, ApiError> {
        const FAILED: &str = "Erro ao atualizar estoque";

        if let Err(e) = validate_non_negative("stock_quantity", quantity) {
            warn!(id = %id, quantity, "Rejected stock edit");
            return Err(report_error(self.notifier.as_ref(), FAILED, CoreError::from(e)));
        }

        let updated = self
            .store
            .set_stock(id, quantity)
            .await
            .map_err(|e| report_error(self.notifier.as_ref(), FAILED, e))?;

        self.upsert(updated.clone());
        Ok(updated)
    }

    /// Replaces or inserts `product`, keeping the list ordered by name.
    /// Inactive products leave the list.
    fn upsert(&mut self, product: Product) {
        self.products.retain(|p| p.id != product.id);
        if product.active {
            let at = self
                .products
                .partition_point(|p| p.name.as_str() <= product.name.as_str());
            self.products.insert(at, product);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::hooks::test_support::FailingStore;
    use crate::notify::NotificationLog;
    use crate::state::test_support::{seed_product, test_context};

    #[tokio::test]
    async fn test_load_lists_active_by_name() {
        let (ctx, _log) = test_context().await;
        seed_product(&ctx, "Sérum Vitamina C", 8990, 4000, 3, None).await;
        seed_product(&ctx, "Base Líquida", 5990, 2500, 10, None).await;

        let mut hook = ctx.products_hook();
        assert!(hook.is_loading());
        let names: Vec<&str> = hook.load().await.unwrap().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Base Líquida", "Sérum Vitamina C"]);
        assert!(!hook.is_loading());
    }

    #[tokio::test]
    async fn test_barcode_outcomes() {
        let (ctx, log) = test_context().await;
        let blush = seed_product(&ctx, "Blush", 3990, 1500, 2, Some("7891234567890")).await;
        seed_product(&ctx, "Pó Compacto", 4590, 2000, 0, Some("7890000000001")).await;
        let hook = ctx.products_hook();

        assert_eq!(
            hook.lookup_barcode(" 7891234567890 ").await.unwrap(),
            BarcodeLookup::Found(blush)
        );
        assert!(log.is_empty());

        assert_eq!(hook.lookup_barcode("000").await.unwrap(), BarcodeLookup::NotFound);
        let n = log.last().unwrap();
        assert_eq!(n.title, "Produto não encontrado");
        assert_eq!(
            n.description.as_deref(),
            Some("Nenhum produto com o código 000 foi encontrado.")
        );

        assert!(matches!(
            hook.lookup_barcode("7890000000001").await.unwrap(),
            BarcodeLookup::OutOfStock(_)
        ));
        let n = log.last().unwrap();
        assert_eq!(n.title, "Estoque insuficiente");
        assert_eq!(
            n.description.as_deref(),
            Some("O produto Pó Compacto está sem estoque.")
        );
    }

    #[tokio::test]
    async fn test_create_validates_before_store() {
        let log = Arc::new(NotificationLog::new());
        let mut hook = ProductsHook::new(Arc::new(FailingStore), log.clone());

        let err = hook
            .create(NewProduct {
                name: "  ".into(),
                price_cents: 1000,
                ..Default::default()
            })
            .await
            .unwrap_err();

        // Rejected by validation, not by the (failing) store
        assert_eq!(err.code, ErrorCode::ValidationError);
        let n = log.last().unwrap();
        assert_eq!(n.title, "Erro ao criar produto");
        assert!(n.is_error());
    }

    #[tokio::test]
    async fn test_create_update_delete_keep_cache() {
        let (ctx, log) = test_context().await;
        let mut hook = ctx.products_hook();
        hook.load().await.unwrap();

        let gloss = hook
            .create(NewProduct {
                name: "Gloss Labial".into(),
                price_cents: 2490,
                cost_cents: 1000,
                stock_quantity: 8,
                barcode: Some("   ".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(gloss.barcode, None);
        assert_eq!(log.last().unwrap().title, "Produto criado!");

        hook.create(NewProduct {
            name: "Batom Matte".into(),
            price_cents: 2990,
            cost_cents: 1200,
            stock_quantity: 4,
            ..Default::default()
        })
        .await
        .unwrap();
        let names: Vec<&str> = hook.products().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Batom Matte", "Gloss Labial"]);

        let renamed = hook
            .update(
                &gloss.id,
                ProductPatch {
                    name: Some("Acqua Gloss".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.name, "Acqua Gloss");
        assert_eq!(hook.products()[0].id, gloss.id);
        assert_eq!(log.last().unwrap().title, "Produto atualizado!");

        hook.delete(&gloss.id).await.unwrap();
        assert_eq!(hook.products().len(), 1);
        let n = log.last().unwrap();
        assert_eq!(n.title, "Produto removido!");
        assert_eq!(n.description.as_deref(), Some("O produto foi excluído com sucesso."));
    }

    #[tokio::test]
    async fn test_update_rejects_negative_price() {
        let (ctx, log) = test_context().await;
        let p = seed_product(&ctx, "Corretivo", 3490, 1500, 6, None).await;
        let mut hook = ctx.products_hook();
        hook.load().await.unwrap();

        let err = hook
            .update(
                &p.id,
                ProductPatch {
                    price_cents: Some(-1),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(log.last().unwrap().title, "Erro ao atualizar produto");
        assert_eq!(ctx.products.get_by_id(&p.id).await.unwrap().unwrap().price_cents, 3490);
    }

    #[tokio::test]
    async fn test_update_validates_without_loaded_list() {
        let (ctx, log) = test_context().await;
        let p = seed_product(&ctx, "Delineador", 2990, 1100, 5, None).await;
        let mut hook = ctx.products_hook();

        let err = hook
            .update(
                &p.id,
                ProductPatch {
                    name: Some("   ".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(log.last().unwrap().title, "Erro ao atualizar produto");
        assert_eq!(ctx.products.get_by_id(&p.id).await.unwrap().unwrap().name, "Delineador");

        let err = hook
            .update("sem-produto", ProductPatch::default())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert!(log.last().unwrap().is_error());
    }

    #[tokio::test]
    async fn test_deactivating_drops_from_list() {
        let (ctx, _log) = test_context().await;
        let p = seed_product(&ctx, "Iluminador", 4990, 2000, 6, None).await;
        let mut hook = ctx.products_hook();
        hook.load().await.unwrap();

        hook.update(
            &p.id,
            ProductPatch {
                active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(hook.products().is_empty());
    }

    #[tokio::test]
    async fn test_update_stock() {
        let (ctx, log) = test_context().await;
        let p = seed_product(&ctx, "Máscara de Cílios", 3990, 1600, 6, None).await;
        let mut hook = ctx.products_hook();
        hook.load().await.unwrap();

        let updated = hook.update_stock(&p.id, 12).await.unwrap();
        assert_eq!(updated.stock_quantity, 12);
        assert_eq!(hook.products()[0].stock_quantity, 12);
        assert!(log.is_empty());

        let err = hook.update_stock(&p.id, -3).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(log.last().unwrap().title, "Erro ao atualizar estoque");
    }

    #[tokio::test]
    async fn test_store_failures_are_notified() {
        let log = Arc::new(NotificationLog::new());
        let mut hook = ProductsHook::new(Arc::new(FailingStore), log.clone());

        let err = hook.load().await.unwrap_err();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert_eq!(log.last().unwrap().title, "Erro ao carregar produtos");

        hook.lookup_barcode("123").await.unwrap_err();
        assert_eq!(log.last().unwrap().title, "Erro ao buscar produto");

        hook.delete("p-1").await.unwrap_err();
        assert_eq!(log.last().unwrap().title, "Erro ao remover produto");

        let err = hook.update("p-1", ProductPatch::default()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert_eq!(log.last().unwrap().title, "Erro ao atualizar produto");
    }
}
