//! Order error types.

use greenhouse_core::{OrderId, OrderStatus};
use thiserror::Error;

/// Errors from order lifecycle operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    /// Missing or malformed order input.
    #[error("{0}")]
    Validation(String),

    /// No order with this id.
    #[error("Order not found")]
    NotFound(OrderId),

    /// The operation is not valid in the order's current status.
    #[error("Order {id} is {status}; payment can only be confirmed while pending_payment")]
    InvalidState { id: OrderId, status: OrderStatus },
}
