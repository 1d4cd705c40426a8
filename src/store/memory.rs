use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use super::{OrderMutation, OrderStore, OrderUpdate};
use crate::domain::order::{NewOrder, Order, OrderError, StorageError};

// ============================================================================
// In-Memory Order Store
// ============================================================================
//
// Each order sits behind its own mutex, so an update holds a lock scoped to
// a single id. The index lock is held only to look up or insert the per-order
// handle, never across a mutation.
//
// ============================================================================

#[derive(Default)]
struct Index {
    by_id: HashMap<Uuid, Arc<Mutex<Order>>>,
    // insertion order, for stable listing
    sequence: Vec<Uuid>,
}

#[derive(Default)]
pub struct InMemoryOrderStore {
    index: RwLock<Index>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn handle(&self, id: Uuid) -> Result<Arc<Mutex<Order>>, OrderError> {
        self.index
            .read()
            .await
            .by_id
            .get(&id)
            .cloned()
            .ok_or(OrderError::NotFound(id))
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn create(&self, order: NewOrder) -> Result<Uuid, OrderError> {
        let id = Uuid::now_v7();
        let mut index = self.index.write().await;

        if index.by_id.contains_key(&id) {
            return Err(StorageError::DuplicateId(id).into());
        }

        index.by_id.insert(id, Arc::new(Mutex::new(order.with_id(id))));
        index.sequence.push(id);

        tracing::debug!(order_id = %id, "Stored order in memory");
        Ok(id)
    }

    async fn get(&self, id: Uuid) -> Result<Order, OrderError> {
        let handle = self.handle(id).await?;
        let order = handle.lock().await.clone();
        Ok(order)
    }

    async fn list_all(&self) -> Result<Vec<Order>, OrderError> {
        let handles: Vec<_> = {
            let index = self.index.read().await;
            index
                .sequence
                .iter()
                .filter_map(|id| index.by_id.get(id).cloned())
                .collect()
        };

        let mut orders = Vec::with_capacity(handles.len());
        for handle in handles {
            orders.push(handle.lock().await.clone());
        }
        Ok(orders)
    }

    async fn update(&self, id: Uuid, mutation: OrderMutation) -> Result<OrderUpdate, OrderError> {
        let handle = self.handle(id).await?;
        let mut stored = handle.lock().await;

        // Mutate a copy so a rejected mutation leaves the stored order untouched
        let mut working = stored.clone();
        let event = mutation(&mut working)?;
        if event.is_some() {
            *stored = working.clone();
        }

        Ok(OrderUpdate {
            order: working,
            event,
        })
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
