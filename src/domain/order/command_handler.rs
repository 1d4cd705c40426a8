use std::sync::Arc;
use uuid::Uuid;

use crate::metrics::Metrics;
use crate::store::{OrderMutation, OrderStore};

use super::aggregate::{NewOrder, Order, OrderView};
use super::errors::OrderError;
use super::events::OrderEvent;
use super::state_machine::TransitionKind;
use super::value_objects::{CustomerId, LineItemInput, OrderStatus};

// ============================================================================
// Order Command Handler - the order lifecycle engine
// ============================================================================
//
// Orchestrates: Request → Aggregate → Store
//
// Stateless apart from its handles; every mutation goes through
// `OrderStore::update`, which owns the per-order lock or transaction.
//
// ============================================================================

pub struct OrderCommandHandler {
    store: Arc<dyn OrderStore>,
    metrics: Arc<Metrics>,
}

impl OrderCommandHandler {
    pub fn new(store: Arc<dyn OrderStore>, metrics: Arc<Metrics>) -> Self {
        Self { store, metrics }
    }

    pub fn store_backend(&self) -> &'static str {
        self.store.backend()
    }

    pub async fn create_order(
        &self,
        customer_id: CustomerId,
        delivery_address: String,
        items: Vec<LineItemInput>,
    ) -> Result<OrderView, OrderError> {
        let _timer = self.metrics.start_timer("create");

        let new_order = NewOrder::place(customer_id, delivery_address, &items)
            .inspect_err(|e| {
                tracing::warn!(customer_id = customer_id, error = %e, "Rejected order creation");
                self.metrics.record_failure("create", e);
            })?;

        let id = self.store.create(new_order.clone()).await.inspect_err(|e| {
            tracing::error!(customer_id = customer_id, error = %e, "Failed to persist order");
        })?;

        let order = new_order.with_id(id);
        self.metrics.orders_created.inc();

        tracing::info!(
            order_id = %id,
            customer_id = customer_id,
            item_count = order.items.len(),
            total_amount = %order.total_amount,
            "Order created"
        );

        Ok(order.view())
    }

    pub async fn list_orders(&self) -> Result<Vec<OrderView>, OrderError> {
        let _timer = self.metrics.start_timer("list");

        let orders = self.store.list_all().await?;
        Ok(orders.iter().map(Order::view).collect())
    }

    pub async fn get_order(&self, id: Uuid) -> Result<OrderView, OrderError> {
        let _timer = self.metrics.start_timer("get");

        let order = self.store.get(id).await?;
        Ok(order.view())
    }

    pub async fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<OrderView, OrderError> {
        let order = self.transition(id, TransitionKind::Update(status)).await?;
        Ok(order.view())
    }

    pub async fn cancel_order(&self, id: Uuid) -> Result<(), OrderError> {
        self.transition(id, TransitionKind::Cancel).await?;
        Ok(())
    }

    /// Decide and apply one transition inside the store's atomic update
    async fn transition(&self, id: Uuid, kind: TransitionKind) -> Result<Order, OrderError> {
        let operation = kind.operation();
        let _timer = self.metrics.start_timer(operation);

        let mutation: OrderMutation =
            Box::new(move |order: &mut Order| -> Result<Option<OrderEvent>, OrderError> {
                let event = order.handle_transition(kind)?;
                if let Some(event) = &event {
                    order.apply_event(event);
                }
                Ok(event)
            });

        let update = match self.store.update(id, mutation).await {
            Ok(update) => update,
            Err(e) => {
                match &e {
                    OrderError::InvalidTransition { current, .. } => tracing::warn!(
                        order_id = %id,
                        operation = operation,
                        current = %current,
                        "Rejected status transition"
                    ),
                    OrderError::Storage(_) => tracing::error!(
                        order_id = %id,
                        operation = operation,
                        error = %e,
                        "Status transition failed in storage"
                    ),
                    _ => {}
                }
                self.metrics.record_failure(operation, &e);
                return Err(e);
            }
        };

        match &update.event {
            Some(event) => {
                self.metrics.record_transition(event);
                tracing::info!(
                    order_id = %id,
                    event_type = event.event_type(),
                    from = %event.from_status(),
                    to = %event.to_status(),
                    occurred_at = %event.occurred_at(),
                    "Order status changed"
                );
            }
            None => tracing::debug!(
                order_id = %id,
                operation = operation,
                status = %update.order.status,
                "Transition left status unchanged"
            ),
        }

        Ok(update.order)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
