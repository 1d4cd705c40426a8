use super::errors::OrderError;
use super::value_objects::OrderStatus;

// ============================================================================
// Status State Machine
// ============================================================================
//
// Rules:
// - DELIVERED and CANCELED accept no status update.
// - Any other status accepts any requested target.
// - Cancel is rejected only from DELIVERED; cancelling a CANCELED order
//   leaves it CANCELED.
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    Update(OrderStatus),
    Cancel,
}

impl TransitionKind {
    /// Label used in logs and metrics
    pub fn operation(self) -> &'static str {
        match self {
            TransitionKind::Update(_) => "update_status",
            TransitionKind::Cancel => "cancel",
        }
    }
}

/// Compute the status that results from applying `kind` to `current`
pub fn next_status(current: OrderStatus, kind: TransitionKind) -> Result<OrderStatus, OrderError> {
    match kind {
        TransitionKind::Update(_) if current.is_terminal() => {
            Err(OrderError::InvalidTransition { current, operation: kind })
        }
        TransitionKind::Update(requested) => Ok(requested),
        TransitionKind::Cancel if current == OrderStatus::Delivered => {
            Err(OrderError::InvalidTransition { current, operation: kind })
        }
        TransitionKind::Cancel => Ok(OrderStatus::Canceled),
    }
}
