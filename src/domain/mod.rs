// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Pure order rules plus the lifecycle engine that drives them against an
// `OrderStore`. HTTP and persistence drivers live outside this module.
//
// ============================================================================

pub mod order;
