//! # Workflows
//!
//! Multi-step operations that span several store calls:
//!
//! - [`checkout`] - cart editing and sale finalization (dialog and till)
//! - [`reports`] - period reports, exports and dashboard totals
//!
//! Sale deletion is a single store call and lives on
//! [`SalesHook::delete_sale`](crate::hooks::SalesHook::delete_sale).

pub mod checkout;
pub mod reports;

pub use checkout::{CheckoutMode, CheckoutSession, CheckoutState, ScanOutcome};
pub use reports::ReportsWorkflow;
