//! # Checkout Session
//!
//! The state machine behind both ways of ringing up a sale:
//!
//! - **Dialog** ("Nova venda"): products picked from a list, optional
//!   customer and notes. The cart is cleared as soon as the sale is recorded.
//! - **Till** ("PDV"): products scanned by barcode. The completed sale stays
//!   on screen for the reset delay, then the session empties itself and
//!   asks for the barcode input to be focused again.
//!
//! ## States
//! ```text
//!            add / scan                finalize              store ok
//!   Empty ──────────────► Building ──────────────► Submitting ─────────► Completed
//!     ▲                    │  ▲  edits                 │                    │
//!     │   last line removed│  │                        │ store err /        │ dialog: at once
//!     └────────────────────┘  └──── edit ─── Failed ◄──┘ no user            │ till: after delay
//!     ▲                                                                     │
//!     └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Edits are local and checked against the stock snapshot held by each
//! cart line. The store re-checks stock when the sale is recorded, so a
//! cart built from a stale snapshot fails as a whole instead of overselling.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;
use simply_core::{Cart, CartTotals, CoreError, PaymentMethod, Product, Sale, User};
use simply_db::{ProductStore, SaleStore};
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::hooks::sales::sale_recorded;
use crate::hooks::{lookup_barcode, report_error, BarcodeLookup};
use crate::notify::{Notification, Notifier};
use crate::receipt::render_receipt;
use crate::state::DEFAULT_TILL_RESET_DELAY_MS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutMode {
    Dialog,
    Till,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "camelCase")]
pub enum CheckoutState {
    Empty,
    Building,
    Submitting,
    Completed(Sale),
    Failed(ApiError),
}

/// What a barcode read did to the cart.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    Added(Product),
    NotFound,
    OutOfStock(Product),
    /// Blank input.
    Ignored,
}

pub struct CheckoutSession {
    mode: CheckoutMode,
    products: Arc<dyn ProductStore>,
    sales: Arc<dyn SaleStore>,
    notifier: Arc<dyn Notifier>,
    reset_delay: Duration,

    state: CheckoutState,
    cart: Cart,
    payment_method: PaymentMethod,
    customer_id: Option<String>,
    notes: Option<String>,
}

impl CheckoutSession {
    pub fn new(
        mode: CheckoutMode,
        products: Arc<dyn ProductStore>,
        sales: Arc<dyn SaleStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        CheckoutSession {
            mode,
            products,
            sales,
            notifier,
            reset_delay: Duration::from_millis(DEFAULT_TILL_RESET_DELAY_MS),
            state: CheckoutState::Empty,
            cart: Cart::new(),
            payment_method: PaymentMethod::default(),
            customer_id: None,
            notes: None,
        }
    }

    /// How long the till keeps a completed sale on screen.
    pub fn with_reset_delay(mut self, delay: Duration) -> Self {
        self.reset_delay = delay;
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn mode(&self) -> CheckoutMode {
        self.mode
    }

    pub fn state(&self) -> &CheckoutState {
        &self.state
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn totals(&self) -> CartTotals {
        self.cart.totals()
    }

    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    pub fn customer_id(&self) -> Option<&str> {
        self.customer_id.as_deref()
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Products that can be picked in the dialog: active, with stock.
    pub async fn available_products(&self) -> Result<Vec<Product>, ApiError> {
        self.products.list_available().await.map_err(|e| {
            self.notifier.notify(Notification::error(
                "Erro ao carregar dados",
                "Não foi possível carregar os produtos.",
            ));
            ApiError::from(e)
        })
    }

    // =========================================================================
    // Cart Edits
    // =========================================================================

    /// Adds one unit of `product`.
    pub fn add_product(&mut self, product: &Product) -> Result<(), ApiError> {
        self.begin_edit()?;
        let result = self.cart.add_product(product);
        self.finish_edit(result)
    }

    /// Reads a barcode and adds the matching product.
    ///
    /// Unknown codes and products without stock are notified and leave the
    /// cart untouched.
    pub async fn scan_barcode(&mut self, code: &str) -> Result<ScanOutcome, ApiError> {
        if code.trim().is_empty() {
            return Ok(ScanOutcome::Ignored);
        }
        self.begin_edit()?;

        match lookup_barcode(self.products.as_ref(), self.notifier.as_ref(), code).await? {
            BarcodeLookup::NotFound => Ok(ScanOutcome::NotFound),
            BarcodeLookup::OutOfStock(p) => Ok(ScanOutcome::OutOfStock(p)),
            BarcodeLookup::Found(p) => {
                let result = self.cart.add_product(&p);
                self.finish_edit(result)?;
                debug!(product_id = %p.id, "Scanned into cart");
                Ok(ScanOutcome::Added(p))
            }
        }
    }

    pub fn increment(&mut self, product_id: &str) -> Result<(), ApiError> {
        self.begin_edit()?;
        let result = self.cart.increment(product_id);
        self.finish_edit(result)
    }

    /// The last unit removes the line.
    pub fn decrement(&mut self, product_id: &str) -> Result<(), ApiError> {
        self.begin_edit()?;
        let result = self.cart.decrement(product_id);
        self.finish_edit(result)
    }

    pub fn remove(&mut self, product_id: &str) -> Result<(), ApiError> {
        self.begin_edit()?;
        let result = self.cart.remove(product_id);
        self.finish_edit(result)
    }

    /// Zero removes the line.
    pub fn set_quantity(&mut self, product_id: &str, quantity: i64) -> Result<(), ApiError> {
        self.begin_edit()?;
        let result = self.cart.set_quantity(product_id, quantity);
        self.finish_edit(result)
    }

    pub fn set_payment_method(&mut self, method: PaymentMethod) -> Result<(), ApiError> {
        self.begin_edit()?;
        self.payment_method = method;
        self.finish_edit(Ok(()))
    }

    pub fn set_customer(&mut self, customer_id: Option<String>) -> Result<(), ApiError> {
        self.begin_edit()?;
        self.customer_id = customer_id.filter(|id| !id.is_empty());
        self.finish_edit(Ok(()))
    }

    pub fn set_notes(&mut self, notes: Option<String>) -> Result<(), ApiError> {
        self.begin_edit()?;
        self.notes = notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        self.finish_edit(Ok(()))
    }

    /// Empties the cart and forgets the sale details.
    pub fn reset(&mut self) {
        self.cart.clear();
        self.payment_method = PaymentMethod::default();
        self.customer_id = None;
        self.notes = None;
        self.state = CheckoutState::Empty;
    }

    /// Refuses edits during a submission. A completed sale still on the
    /// till screen is cleared before the next edit starts a new cart.
    fn begin_edit(&mut self) -> Result<(), ApiError> {
        match self.state {
            CheckoutState::Submitting => Err(CoreError::CheckoutInProgress.into()),
            CheckoutState::Completed(_) => {
                self.reset();
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn finish_edit(&mut self, result: Result<(), CoreError>) -> Result<(), ApiError> {
        if let Err(e) = result {
            if let CoreError::InsufficientStock { available, .. } = &e {
                self.notifier.notify(Notification::error(
                    "Estoque insuficiente",
                    format!("Apenas {} unidades disponíveis.", available),
                ));
            } else if let CoreError::OutOfStock(name) = &e {
                self.notifier.notify(Notification::error(
                    "Estoque insuficiente",
                    format!("O produto {} está sem estoque.", name),
                ));
            }
            return Err(e.into());
        }

        self.state = if self.cart.is_empty() {
            CheckoutState::Empty
        } else {
            CheckoutState::Building
        };
        Ok(())
    }

    // =========================================================================
    // Finalize
    // =========================================================================

    /// Records the cart as a sale sold by `user`.
    ///
    /// ## Errors
    /// - `CART_ERROR` when the cart is empty or a submission is outstanding
    ///   (no store call, no state change)
    /// - `AUTH_REQUIRED` without a user
    /// - any store error; the cart is kept so the sale can be retried
    pub async fn finalize(&mut self, user: Option<&User>) -> Result<Sale, ApiError> {
        match self.state {
            CheckoutState::Submitting => return Err(CoreError::CheckoutInProgress.into()),
            // The till still shows the previous sale
            CheckoutState::Completed(_) => return Err(CoreError::EmptyCart.into()),
            _ => {}
        }

        if self.cart.is_empty() {
            if self.mode == CheckoutMode::Dialog {
                self.notifier.notify(Notification::error(
                    "Carrinho vazio",
                    "Adicione produtos ao carrinho antes de finalizar a venda.",
                ));
            }
            return Err(CoreError::EmptyCart.into());
        }

        let Some(user) = user else {
            warn!("Checkout without a signed-in user");
            return Err(self.fail(ApiError::auth_required()));
        };

        self.state = CheckoutState::Submitting;

        let header = self.cart.to_new_sale(
            self.payment_method,
            self.customer_id.clone(),
            self.notes.clone(),
            Some(user.id.clone()),
        );
        let items = self.cart.to_sale_items();

        match self.sales.create_sale(&header, &items).await {
            Ok(sale) => {
                info!(
                    sale_id = %sale.id,
                    sale_number = sale.sale_number,
                    mode = ?self.mode,
                    "Checkout completed"
                );
                self.notifier.notify(sale_recorded(&sale));

                if self.mode == CheckoutMode::Dialog {
                    self.reset();
                }
                self.state = CheckoutState::Completed(sale.clone());
                Ok(sale)
            }
            Err(e) => Err(self.fail(ApiError::from(e))),
        }
    }

    fn fail(&mut self, err: ApiError) -> ApiError {
        let err = match self.mode {
            // The dialog shows a generic hint; details go to the log
            CheckoutMode::Dialog => {
                warn!(error = %err, "Checkout failed");
                self.notifier.notify(Notification::error(
                    "Erro ao finalizar venda",
                    "Verifique os dados e tente novamente.",
                ));
                err
            }
            CheckoutMode::Till => {
                report_error(self.notifier.as_ref(), "Erro ao finalizar venda", err)
            }
        };
        self.state = CheckoutState::Failed(err.clone());
        err
    }

    /// Holds a completed till sale on screen for the reset delay, then
    /// empties the session.
    ///
    /// Returns `true` when the barcode input should be focused again. Does
    /// nothing outside a completed till sale.
    pub async fn finish_till_display(&mut self) -> bool {
        if self.mode != CheckoutMode::Till || !matches!(self.state, CheckoutState::Completed(_)) {
            return false;
        }

        tokio::time::sleep(self.reset_delay).await;

        // An edit during the delay already started a new cart
        if !matches!(self.state, CheckoutState::Completed(_)) {
            return false;
        }
        self.reset();
        debug!("Till reset");
        true
    }

    // =========================================================================
    // Receipt
    // =========================================================================

    /// HTML receipt for the lines currently in the cart.
    pub fn receipt(
        &self,
        store_name: &str,
        user: Option<&User>,
        at: DateTime<Utc>,
        offset: FixedOffset,
    ) -> Result<String, ApiError> {
        render_receipt(store_name, &self.cart, self.payment_method, user, at, offset)
            .map_err(ApiError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::hooks::test_support::FailingStore;
    use crate::notify::NotificationLog;
    use crate::state::test_support::{seed_product, seed_user, test_context};
    use crate::state::AppContext;
    use async_trait::async_trait;
    use simply_core::{NewSale, NewSaleItem, Role, SaleWithItems};
    use simply_db::{DbError, DbResult};
    use std::sync::Mutex;

    fn cashier() -> User {
        User {
            id: "u-1".into(),
            email: "caixa@simply.com".into(),
            full_name: Some("Joana Lima".into()),
            role: Role::Vendedor,
        }
    }

    fn product(id: &str, name: &str, price_cents: i64, cost_cents: i64, stock: i64) -> Product {
        let now = Utc::now();
        Product {
            id: id.to_string(),
            name: name.to_string(),
            description: None,
            price_cents,
            cost_cents,
            stock_quantity: stock,
            min_stock_level: 0,
            barcode: None,
            image_url: None,
            category_id: None,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Records sales in memory. With `hang` set, `create_sale` never
    /// completes.
    #[derive(Default)]
    struct MemorySales {
        recorded: Mutex<Vec<(NewSale, Vec<NewSaleItem>)>>,
        hang: bool,
    }

    #[async_trait]
    impl SaleStore for MemorySales {
        async fn list_recent(&self, _limit: i64) -> DbResult<Vec<SaleWithItems>> {
            Ok(Vec::new())
        }
        async fn list_between(
            &self,
            _from: DateTime<Utc>,
            _to: DateTime<Utc>,
        ) -> DbResult<Vec<SaleWithItems>> {
            Ok(Vec::new())
        }
        async fn list_all(&self) -> DbResult<Vec<Sale>> {
            Ok(Vec::new())
        }
        async fn get_with_items(&self, _id: &str) -> DbResult<Option<SaleWithItems>> {
            Ok(None)
        }
        async fn create_sale(&self, sale: &NewSale, items: &[NewSaleItem]) -> DbResult<Sale> {
            if self.hang {
                std::future::pending::<()>().await;
            }
            let mut recorded = self.recorded.lock().unwrap();
            recorded.push((sale.clone(), items.to_vec()));
            Ok(Sale {
                id: format!("s-{}", recorded.len()),
                sale_number: recorded.len() as i64,
                total_amount_cents: sale.total_amount_cents,
                total_cost_cents: sale.total_cost_cents,
                profit_cents: sale.profit_cents,
                payment_method: sale.payment_method,
                customer_id: sale.customer_id.clone(),
                notes: sale.notes.clone(),
                sold_by: sale.sold_by.clone(),
                created_at: Utc::now(),
            })
        }
        async fn delete_sale(&self, id: &str) -> DbResult<()> {
            Err(DbError::not_found("Sale", id))
        }
    }

    fn memory_session(
        mode: CheckoutMode,
        sales: Arc<MemorySales>,
    ) -> (CheckoutSession, Arc<NotificationLog>) {
        let log = Arc::new(NotificationLog::new());
        let session = CheckoutSession::new(mode, Arc::new(FailingStore), sales, log.clone());
        (session, log)
    }

    async fn sqlite_session(
        mode: CheckoutMode,
    ) -> (AppContext, CheckoutSession, Arc<NotificationLog>) {
        let (ctx, log) = test_context().await;
        let session = ctx.checkout(mode);
        (ctx, session, log)
    }

    #[tokio::test]
    async fn test_dialog_checkout_persists_and_clears() {
        let (ctx, mut session, log) = sqlite_session(CheckoutMode::Dialog).await;
        let user = seed_user(&ctx).await;
        let a = seed_product(&ctx, "Batom Matte", 1000, 600, 5, None).await;
        let b = seed_product(&ctx, "Base Líquida", 2500, 1500, 5, None).await;

        assert_eq!(session.available_products().await.unwrap().len(), 2);

        session.add_product(&a).unwrap();
        session.add_product(&a).unwrap();
        session.add_product(&b).unwrap();
        session.set_payment_method(PaymentMethod::CreditCard).unwrap();
        session.set_notes(Some("  presente  ".into())).unwrap();
        assert_eq!(session.state(), &CheckoutState::Building);

        let totals = session.totals();
        assert_eq!(totals.subtotal_cents, 4500);
        assert_eq!(totals.total_cost_cents, 2700);
        assert_eq!(totals.profit_cents, 1800);

        let sale = session.finalize(Some(&user)).await.unwrap();
        assert_eq!(sale.total_amount_cents, 4500);
        assert_eq!(sale.total_cost_cents, 2700);
        assert_eq!(sale.profit_cents, 1800);
        assert_eq!(sale.payment_method, PaymentMethod::CreditCard);
        assert_eq!(sale.notes.as_deref(), Some("presente"));
        assert_eq!(sale.sold_by.as_deref(), Some(user.id.as_str()));

        // Dialog clears at once
        assert!(session.cart().is_empty());
        assert!(matches!(session.state(), CheckoutState::Completed(s) if s.id == sale.id));
        assert_eq!(session.payment_method(), PaymentMethod::Cash);

        assert_eq!(ctx.products.get_by_id(&a.id).await.unwrap().unwrap().stock_quantity, 3);
        assert_eq!(ctx.products.get_by_id(&b.id).await.unwrap().unwrap().stock_quantity, 4);

        let n = log.last().unwrap();
        assert_eq!(n.title, "Venda finalizada!");
        assert_eq!(n.description.as_deref(), Some("Venda de R$ 45,00 realizada com sucesso."));
    }

    #[tokio::test]
    async fn test_add_stops_at_stock() {
        let (mut session, log) = memory_session(CheckoutMode::Dialog, Arc::default());
        let p = product("p", "Delineador Líquido", 2990, 1200, 3);

        for _ in 0..3 {
            session.add_product(&p).unwrap();
        }
        let err = session.add_product(&p).unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert_eq!(session.cart().get("p").unwrap().quantity, 3);

        let n = log.last().unwrap();
        assert_eq!(n.title, "Estoque insuficiente");
        assert_eq!(n.description.as_deref(), Some("Apenas 3 unidades disponíveis."));

        let err = session.set_quantity("p", 4).unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert_eq!(session.cart().get("p").unwrap().quantity, 3);
    }

    #[tokio::test]
    async fn test_edits_drive_state() {
        let (mut session, _log) = memory_session(CheckoutMode::Dialog, Arc::default());
        let p = product("p", "Blush", 3990, 1500, 5);
        let q = product("q", "Iluminador", 4990, 2000, 5);

        assert_eq!(session.state(), &CheckoutState::Empty);
        session.add_product(&p).unwrap();
        session.add_product(&q).unwrap();
        assert_eq!(session.state(), &CheckoutState::Building);

        session.increment("p").unwrap();
        session.set_quantity("q", 0).unwrap();
        assert!(session.cart().get("q").is_none());

        session.decrement("p").unwrap();
        session.decrement("p").unwrap();
        assert_eq!(session.state(), &CheckoutState::Empty);

        let err = session.remove("p").unwrap_err();
        assert_eq!(err.code, ErrorCode::CartError);

        session.set_customer(Some(String::new())).unwrap();
        assert_eq!(session.customer_id(), None);
        session.set_customer(Some("c-1".into())).unwrap();
        assert_eq!(session.customer_id(), Some("c-1"));
    }

    #[tokio::test]
    async fn test_empty_cart_is_rejected_without_store_call() {
        let sales = Arc::new(MemorySales::default());
        let (mut dialog, log) = memory_session(CheckoutMode::Dialog, sales.clone());

        let err = dialog.finalize(Some(&cashier())).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::CartError);
        assert_eq!(dialog.state(), &CheckoutState::Empty);
        let n = log.last().unwrap();
        assert_eq!(n.title, "Carrinho vazio");
        assert_eq!(
            n.description.as_deref(),
            Some("Adicione produtos ao carrinho antes de finalizar a venda.")
        );

        // The till ignores it silently
        let (mut till, log) = memory_session(CheckoutMode::Till, sales.clone());
        till.finalize(Some(&cashier())).await.unwrap_err();
        assert!(log.is_empty());

        assert!(sales.recorded.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_no_user_fails() {
        let sales = Arc::new(MemorySales::default());
        let (mut session, log) = memory_session(CheckoutMode::Dialog, sales.clone());
        session.add_product(&product("p", "Blush", 3990, 1500, 5)).unwrap();

        let err = session.finalize(None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::AuthRequired);
        assert!(matches!(session.state(), CheckoutState::Failed(e) if e.code == ErrorCode::AuthRequired));
        assert_eq!(session.cart().item_count(), 1);
        assert_eq!(log.last().unwrap().title, "Erro ao finalizar venda");
        assert!(sales.recorded.lock().unwrap().is_empty());

        // Retry once signed in
        session.finalize(Some(&cashier())).await.unwrap();
        assert_eq!(sales.recorded.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_store_failure_keeps_cart() {
        let (ctx, mut session, log) = sqlite_session(CheckoutMode::Dialog).await;
        let user = seed_user(&ctx).await;
        let p = seed_product(&ctx, "Sérum Vitamina C", 8990, 4000, 2, None).await;

        session.add_product(&p).unwrap();
        session.add_product(&p).unwrap();
        // Someone else sold one meanwhile
        ctx.products.set_stock(&p.id, 1).await.unwrap();

        let err = session.finalize(Some(&user)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert!(matches!(session.state(), CheckoutState::Failed(_)));
        assert_eq!(session.cart().get(&p.id).unwrap().quantity, 2);

        let n = log.last().unwrap();
        assert_eq!(n.title, "Erro ao finalizar venda");
        assert_eq!(n.description.as_deref(), Some("Verifique os dados e tente novamente."));

        assert_eq!(ctx.products.get_by_id(&p.id).await.unwrap().unwrap().stock_quantity, 1);
        assert!(ctx.sales.list_all().await.unwrap().is_empty());

        // Editing after a failure goes back to Building
        session.set_quantity(&p.id, 1).unwrap();
        assert_eq!(session.state(), &CheckoutState::Building);
        session.finalize(Some(&user)).await.unwrap();
        assert_eq!(ctx.products.get_by_id(&p.id).await.unwrap().unwrap().stock_quantity, 0);
    }

    #[tokio::test]
    async fn test_till_scan_outcomes() {
        let (ctx, mut session, log) = sqlite_session(CheckoutMode::Till).await;
        let blush = seed_product(&ctx, "Blush", 3990, 1500, 2, Some("7891000000001")).await;
        seed_product(&ctx, "Pó Compacto", 4590, 2000, 0, Some("7891000000002")).await;

        assert_eq!(session.scan_barcode("   ").await.unwrap(), ScanOutcome::Ignored);

        assert_eq!(session.scan_barcode("999").await.unwrap(), ScanOutcome::NotFound);
        assert!(session.cart().is_empty());
        assert_eq!(log.last().unwrap().title, "Produto não encontrado");

        assert!(matches!(
            session.scan_barcode("7891000000002").await.unwrap(),
            ScanOutcome::OutOfStock(_)
        ));
        assert!(session.cart().is_empty());
        assert_eq!(session.state(), &CheckoutState::Empty);

        assert_eq!(
            session.scan_barcode("7891000000001").await.unwrap(),
            ScanOutcome::Added(blush.clone())
        );
        session.scan_barcode("7891000000001").await.unwrap();
        assert_eq!(session.cart().last_item().unwrap().quantity, 2);

        let err = session.scan_barcode("7891000000001").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
    }

    #[tokio::test(start_paused = true)]
    async fn test_till_resets_after_delay() {
        let sales = Arc::new(MemorySales::default());
        let (session, _log) = memory_session(CheckoutMode::Till, sales.clone());
        let mut session = session.with_reset_delay(Duration::from_secs(3));
        session.add_product(&product("p", "Blush", 3990, 1500, 5)).unwrap();

        let sale = session.finalize(Some(&cashier())).await.unwrap();
        // Still on screen for the receipt
        assert_eq!(session.cart().item_count(), 1);
        let offset = FixedOffset::west_opt(3 * 3600).unwrap();
        let receipt = session
            .receipt("SIMPLY COSMÉTICOS", Some(&cashier()), Utc::now(), offset)
            .unwrap();
        assert!(receipt.contains("Blush x1"));
        assert!(matches!(session.state(), CheckoutState::Completed(s) if s.id == sale.id));

        // A second finalize must not sell the same cart again
        assert_eq!(
            session.finalize(Some(&cashier())).await.unwrap_err().code,
            ErrorCode::CartError
        );

        let start = tokio::time::Instant::now();
        assert!(session.finish_till_display().await);
        assert!(start.elapsed() >= Duration::from_secs(3));
        assert!(session.cart().is_empty());
        assert_eq!(session.state(), &CheckoutState::Empty);
        assert_eq!(sales.recorded.lock().unwrap().len(), 1);

        // Nothing to hold now
        assert!(!session.finish_till_display().await);
    }

    #[tokio::test]
    async fn test_checkout_and_sales_screen_share_success_message() {
        let sales = Arc::new(MemorySales::default());
        let (mut session, log) = memory_session(CheckoutMode::Till, sales.clone());
        let p = product("p", "Perfume Floral", 12990, 6000, 2);
        session.add_product(&p).unwrap();

        let sale = session.finalize(Some(&cashier())).await.unwrap();
        let from_till = log.last().unwrap();
        assert_eq!(from_till, sale_recorded(&sale));
        assert_eq!(
            from_till.description.as_deref(),
            Some("Venda de R$ 129,90 realizada com sucesso.")
        );

        let mut cart = Cart::new();
        cart.add_product(&p).unwrap();
        let other = Arc::new(NotificationLog::new());
        crate::hooks::sales::record_sale(
            sales.as_ref(),
            other.as_ref(),
            &cart.to_new_sale(PaymentMethod::Cash, None, None, None),
            &cart.to_sale_items(),
        )
        .await
        .unwrap();
        assert_eq!(other.last().unwrap(), from_till);
        assert_eq!(log.len(), 1);
    }

    #[tokio::test]
    async fn test_scan_after_completion_starts_new_cart() {
        let (mut session, _log) = memory_session(CheckoutMode::Till, Arc::default());
        let p = product("p", "Blush", 3990, 1500, 5);
        let q = product("q", "Corretivo", 3490, 1500, 5);

        session.add_product(&p).unwrap();
        session.finalize(Some(&cashier())).await.unwrap();

        session.add_product(&q).unwrap();
        assert_eq!(session.cart().item_count(), 1);
        assert!(session.cart().get("q").is_some());
        assert_eq!(session.state(), &CheckoutState::Building);
    }

    #[tokio::test]
    async fn test_abandoned_submission_blocks_session() {
        let sales = Arc::new(MemorySales {
            hang: true,
            ..Default::default()
        });
        let (mut session, _log) = memory_session(CheckoutMode::Dialog, sales);
        session.add_product(&product("p", "Blush", 3990, 1500, 5)).unwrap();

        let user = cashier();
        let abandoned =
            tokio::time::timeout(Duration::from_millis(10), session.finalize(Some(&user))).await;
        assert!(abandoned.is_err());
        assert_eq!(session.state(), &CheckoutState::Submitting);

        let err = session.finalize(Some(&user)).await.unwrap_err();
        assert_eq!(err, ApiError::from(CoreError::CheckoutInProgress));
        assert!(session.increment("p").is_err());

        session.reset();
        assert_eq!(session.state(), &CheckoutState::Empty);
    }
}
