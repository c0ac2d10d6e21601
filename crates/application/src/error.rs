use common::OrderId;
use domain::OrderError;
use order_store::StoreError;
use thiserror::Error;

use crate::product::ProductValidationError;

/// Errors surfaced by command and query handlers.
#[derive(Debug, Error)]
pub enum AppError {
    /// A domain rule rejected the command.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// The order store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The requested order does not exist.
    #[error("order {0} not found")]
    OrderNotFound(OrderId),

    /// One or more SKUs failed product validation.
    #[error(transparent)]
    ProductValidation(#[from] ProductValidationError),

    /// An event subscriber failed while handling a published event.
    #[error("subscriber {subscriber} failed: {message}")]
    Subscriber {
        subscriber: &'static str,
        message: String,
    },
}

/// Result type for application operations.
pub type Result<T> = std::result::Result<T, AppError>;
