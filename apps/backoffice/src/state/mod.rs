//! # Application State
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Back Office State                                │
//! │                                                                         │
//! │  ┌──────────────────────┐        ┌──────────────────────────────────┐  │
//! │  │  AppConfig           │        │  AppContext                      │  │
//! │  │                      │ ─────► │                                  │  │
//! │  │  database_path       │        │  stores (Arc<dyn ...>)           │  │
//! │  │  store_name          │        │  notifier                        │  │
//! │  │  utc_offset_minutes  │        │  hook / workflow factories       │  │
//! │  │  till_reset_delay_ms │        │                                  │  │
//! │  │  report_period_days  │        │                                  │  │
//! │  └──────────────────────┘        └──────────────────────────────────┘  │
//! │                                                                         │
//! │  Both are read-only after startup. Mutable state lives in the hooks    │
//! │  and the checkout session, each owned by one screen.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod context;

pub use config::{AppConfig, DEFAULT_STORE_NAME, DEFAULT_TILL_RESET_DELAY_MS};
pub use context::AppContext;

#[cfg(test)]
pub(crate) use context::test_support;
