// ============================================================================
// Order Store - keyed persistence of order aggregates
// ============================================================================
//
// An order and its line items are always written and read as one unit.
// `update` is the only mutation path after creation and is atomic per order
// id: the load, the mutation and the write cannot interleave with another
// `update` on the same id. Different ids never wait on each other.
//
// ============================================================================

mod memory;
mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::order::{NewOrder, Order, OrderError, OrderEvent};

pub use memory::InMemoryOrderStore;
pub use postgres::PgOrderStore;

/// Pure mutation applied under the per-order lock.
///
/// Returning an error aborts the update and nothing is persisted.
/// `Ok(None)` means the order is left as it was.
pub type OrderMutation =
    Box<dyn FnOnce(&mut Order) -> Result<Option<OrderEvent>, OrderError> + Send>;

/// Result of a committed `update`
#[derive(Debug, Clone)]
pub struct OrderUpdate {
    pub order: Order,
    pub event: Option<OrderEvent>,
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Assign a fresh identifier and persist the order with its items
    async fn create(&self, order: NewOrder) -> Result<Uuid, OrderError>;

    async fn get(&self, id: Uuid) -> Result<Order, OrderError>;

    /// Every stored order, in creation order
    async fn list_all(&self) -> Result<Vec<Order>, OrderError>;

    /// Atomically load, mutate and persist one order
    async fn update(&self, id: Uuid, mutation: OrderMutation) -> Result<OrderUpdate, OrderError>;

    /// Short backend name reported by the health endpoint
    fn backend(&self) -> &'static str;
}
