//! # Domain Hooks
//!
//! State containers for the back-office screens. Each hook pairs a store
//! with a locally cached list and reports every outcome through the
//! injected [`Notifier`].
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Hook                 Store                 Cache after success         │
//! │  ────                 ─────                 ───────────────────         │
//! │  ProductsHook    ──►  ProductStore    ──►   active products by name     │
//! │  CustomersHook   ──►  CustomerStore   ──►   customers by name           │
//! │  SalesHook       ──►  SaleStore       ──►   recent sales (newest first) │
//! │  AuthHook        ──►  AuthProvider    ──►   current session             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! On failure the cache is left untouched, a destructive notification is
//! emitted and the error is returned to the caller.

pub mod auth;
pub mod customers;
pub mod products;
pub mod sales;

pub use auth::AuthHook;
pub use customers::CustomersHook;
pub use products::{lookup_barcode, BarcodeLookup, ProductsHook};
pub use sales::SalesHook;

use crate::error::ApiError;
use crate::notify::{Notification, Notifier};

/// Emits `title` with the error message and hands the error back.
pub(crate) fn report_error(
    notifier: &dyn Notifier,
    title: &str,
    err: impl Into<ApiError>,
) -> ApiError {
    let err = err.into();
    notifier.notify(Notification::error(title, err.message.clone()));
    err
}
