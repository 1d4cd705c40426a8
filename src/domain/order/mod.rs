// ============================================================================
// Order Domain
// ============================================================================
//
// - Value objects (LineItem, OrderStatus)
// - Line-item valuation (validation + exact totals)
// - Status state machine
// - Events (OrderStatusChanged, OrderCancelled)
// - Errors (OrderError, StorageError)
// - Aggregate (NewOrder, Order, OrderView)
// - Command handler (the lifecycle engine)
//
// ============================================================================

pub mod value_objects;
pub mod valuation;
pub mod state_machine;
pub mod events;
pub mod errors;
pub mod aggregate;
pub mod command_handler;

// Re-export for convenience
pub use value_objects::*;
pub use valuation::*;
pub use state_machine::*;
pub use events::*;
pub use errors::*;
pub use aggregate::*;
pub use command_handler::*;
