use chrono::{DateTime, SubsecRound, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::OrderError;
use super::events::{OrderCancelled, OrderEvent, OrderStatusChanged};
use super::state_machine::{next_status, TransitionKind};
use super::valuation::value_items;
use super::value_objects::{CustomerId, LineItem, LineItemInput, OrderStatus};

// ============================================================================
// Order Aggregate
// ============================================================================
//
// An order and its line items form one unit: they are created together,
// stored together and deleted together. After creation only `status`
// changes, and only through `handle_transition` + `apply_event`.
//
// ============================================================================

/// Order built from a creation request, not yet assigned an identity
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub created_at: DateTime<Utc>,
    pub customer_id: CustomerId,
    pub delivery_address: String,
    pub items: Vec<LineItem>,
    pub total_amount: Decimal,
    pub status: OrderStatus,
}

impl NewOrder {
    /// Validate and value the items, starting the order at AWAITING_PAYMENT
    pub fn place(
        customer_id: CustomerId,
        delivery_address: impl Into<String>,
        items: &[LineItemInput],
    ) -> Result<Self, OrderError> {
        let valuation = value_items(items)?;

        Ok(Self {
            // microsecond precision survives a round trip through TIMESTAMPTZ
            created_at: Utc::now().trunc_subsecs(6),
            customer_id,
            delivery_address: delivery_address.into(),
            items: valuation.items,
            total_amount: valuation.total,
            status: OrderStatus::AwaitingPayment,
        })
    }

    pub fn with_id(self, id: Uuid) -> Order {
        Order {
            id,
            created_at: self.created_at,
            customer_id: self.customer_id,
            delivery_address: self.delivery_address,
            items: self.items,
            total_amount: self.total_amount,
            status: self.status,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub customer_id: CustomerId,
    pub delivery_address: String,
    pub items: Vec<LineItem>,
    pub total_amount: Decimal,
    pub status: OrderStatus,
}

impl Order {
    /// Decide a transition without mutating anything.
    ///
    /// Returns `None` when the transition is legal but leaves the status
    /// unchanged (e.g. cancelling an order that is already CANCELED).
    pub fn handle_transition(&self, kind: TransitionKind) -> Result<Option<OrderEvent>, OrderError> {
        let to = next_status(self.status, kind)?;
        if to == self.status {
            return Ok(None);
        }

        let now = Utc::now();
        let event = match kind {
            TransitionKind::Cancel => OrderEvent::Cancelled(OrderCancelled {
                from: self.status,
                cancelled_at: now,
            }),
            TransitionKind::Update(_) => OrderEvent::StatusChanged(OrderStatusChanged {
                from: self.status,
                to,
                changed_at: now,
            }),
        };

        Ok(Some(event))
    }

    pub fn apply_event(&mut self, event: &OrderEvent) {
        self.status = event.to_status();
    }

    pub fn view(&self) -> OrderView {
        OrderView {
            id: self.id,
            created_at: self.created_at,
            customer_id: self.customer_id,
            total_amount: self.total_amount,
            status: self.status,
            delivery_address: self.delivery_address.clone(),
        }
    }
}

/// Outward representation of an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderView {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub customer_id: CustomerId,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub delivery_address: String,
}

// ============================================================================
// Unit Tests
// ============================================================================
