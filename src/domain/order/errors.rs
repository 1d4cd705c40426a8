use uuid::Uuid;

use super::state_machine::TransitionKind;
use super::value_objects::OrderStatus;

// ============================================================================
// Order Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Invalid item at index {index}: {field} {reason}")]
    Validation {
        index: usize,
        field: &'static str,
        reason: String,
    },

    #[error("Order with id {0} not found")]
    NotFound(Uuid),

    #[error("{}", transition_message(*current, *operation))]
    InvalidTransition {
        current: OrderStatus,
        operation: TransitionKind,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<sqlx::Error> for OrderError {
    fn from(error: sqlx::Error) -> Self {
        OrderError::Storage(StorageError::Database(error))
    }
}

fn transition_message(current: OrderStatus, operation: TransitionKind) -> String {
    match operation {
        TransitionKind::Cancel => "Cannot cancel an order that was already delivered".to_string(),
        TransitionKind::Update(_) => {
            format!("Cannot change the status of an order that is already {}", current)
        }
    }
}

/// Failures of the durability layer. Never retried by the lifecycle engine.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Corrupt order row {order_id}: {reason}")]
    Corrupt { order_id: Uuid, reason: String },

    #[error("Identifier collision on create: {0}")]
    DuplicateId(Uuid),
}
