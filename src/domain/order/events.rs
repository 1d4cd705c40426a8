use chrono::{DateTime, Utc};

use super::value_objects::OrderStatus;

// ============================================================================
// Order Events - facts produced by a successful status change
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum OrderEvent {
    StatusChanged(OrderStatusChanged),
    Cancelled(OrderCancelled),
}

impl OrderEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::StatusChanged(_) => "OrderStatusChanged",
            OrderEvent::Cancelled(_) => "OrderCancelled",
        }
    }

    pub fn from_status(&self) -> OrderStatus {
        match self {
            OrderEvent::StatusChanged(e) => e.from,
            OrderEvent::Cancelled(e) => e.from,
        }
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            OrderEvent::StatusChanged(e) => e.changed_at,
            OrderEvent::Cancelled(e) => e.cancelled_at,
        }
    }

    pub fn to_status(&self) -> OrderStatus {
        match self {
            OrderEvent::StatusChanged(e) => e.to,
            OrderEvent::Cancelled(_) => OrderStatus::Canceled,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct OrderStatusChanged {
    pub from: OrderStatus,
    pub to: OrderStatus,
    pub changed_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct OrderCancelled {
    pub from: OrderStatus,
    pub cancelled_at: DateTime<Utc>,
}
