//! # API Error
//!
//! Every hook and workflow returns `Result<T, ApiError>`. The screen shows
//! `message` (usually after a notification already went out) and branches on
//! `code`, e.g. `AUTH_REQUIRED` sends the user to the login page.
//!
//! ```text
//! ValidationError ──► CoreError ──┐
//!                                 ├──► ApiError { code, message }
//! sqlx::Error ──────► DbError ────┘
//! ```
//!
//! Store details (SQL text, constraint names, connection strings) are
//! logged here and replaced by a generic message.

use serde::Serialize;
use simply_core::CoreError;
use simply_db::DbError;
use thiserror::Error;
use tracing::error;

/// ```json
/// { "code": "INSUFFICIENT_STOCK", "message": "Insufficient stock for p-1: 3 available, 4 requested" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(rename_all = "camelCase")]
#[error("[{code:?}] {message}")]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NotFound,
    /// Bad input; nothing was sent to the store.
    ValidationError,
    DatabaseError,
    /// No signed-in user.
    AuthRequired,
    InvalidCredentials,
    InsufficientStock,
    /// Empty cart, unknown line, or a submission already running.
    CartError,
    BusinessLogic,
    Internal,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    pub fn cart(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::CartError, message)
    }

    pub fn auth_required() -> Self {
        ApiError::new(ErrorCode::AuthRequired, "User not authenticated")
    }

    /// Logs `detail` and keeps only `public` for the screen.
    fn hidden(code: ErrorCode, public: &str, detail: &DbError) -> Self {
        error!(error = %detail, "{}", public);
        ApiError::new(code, public)
    }
}

fn stock_message(what: &str, available: i64, requested: i64) -> String {
    format!(
        "Insufficient stock for {}: {} available, {} requested",
        what, available, requested
    )
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => {
                ApiError::validation(format!("{} '{}' already exists", field, value))
            }
            DbError::InsufficientStock {
                product_id,
                available,
                requested,
            } => ApiError::new(
                ErrorCode::InsufficientStock,
                stock_message(&product_id, available, requested),
            ),
            DbError::InvalidCredentials => {
                ApiError::new(ErrorCode::InvalidCredentials, "Invalid login credentials")
            }
            DbError::PoolExhausted => ApiError::new(ErrorCode::DatabaseError, "Database busy"),
            ref e @ DbError::ForeignKeyViolation { .. } => {
                ApiError::hidden(ErrorCode::ValidationError, "Invalid reference", e)
            }
            ref e @ DbError::CheckViolation { .. } => {
                ApiError::hidden(ErrorCode::ValidationError, "Invalid value", e)
            }
            ref e @ DbError::ConnectionFailed(_) => {
                ApiError::hidden(ErrorCode::DatabaseError, "Database connection failed", e)
            }
            ref e @ DbError::MigrationFailed(_) => {
                ApiError::hidden(ErrorCode::DatabaseError, "Database migration failed", e)
            }
            ref e @ DbError::TransactionFailed(_) => {
                ApiError::hidden(ErrorCode::DatabaseError, "Database transaction failed", e)
            }
            ref e @ (DbError::QueryFailed(_) | DbError::Internal(_)) => {
                ApiError::hidden(ErrorCode::DatabaseError, "Database operation failed", e)
            }
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(id) => ApiError::not_found("Product", &id),
            CoreError::InsufficientStock {
                product,
                available,
                requested,
            } => ApiError::new(
                ErrorCode::InsufficientStock,
                stock_message(&product, available, requested),
            ),
            CoreError::OutOfStock(name) => ApiError::new(
                ErrorCode::InsufficientStock,
                format!("{} is out of stock", name),
            ),
            e @ (CoreError::EmptyCart
            | CoreError::CheckoutInProgress
            | CoreError::NotInCart(_)
            | CoreError::CartTooLarge { .. }) => ApiError::cart(e.to_string()),
            e @ CoreError::QuantityTooLarge { .. } => ApiError::validation(e.to_string()),
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}
