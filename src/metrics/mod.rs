// Private module declaration
mod server;

use prometheus::{
    HistogramOpts, HistogramTimer, HistogramVec, IntCounter, IntCounterVec, Opts, Registry,
};

use crate::domain::order::{OrderError, OrderEvent};

// Re-export for public API
pub use server::{health_handler, metrics_handler};

// ============================================================================
// Metrics Module - Prometheus metrics for the order lifecycle
// ============================================================================
//
// Provides metrics for:
// - Order creation throughput
// - Status transitions by source/target status
// - Rejected transitions and validation failures
// - Lifecycle operation latency
//
// All metrics are registered with Prometheus and can be scraped via /metrics
// ============================================================================

pub struct Metrics {
    registry: Registry,

    pub orders_created: IntCounter,
    pub transitions: IntCounterVec,
    pub transitions_rejected: IntCounterVec,
    pub validation_failures: IntCounterVec,
    pub operation_duration: HistogramVec,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let orders_created = IntCounter::new("orders_created_total", "Total orders created")?;
        registry.register(Box::new(orders_created.clone()))?;

        let transitions = IntCounterVec::new(
            Opts::new("order_transitions_total", "Applied order status transitions"),
            &["from", "to"],
        )?;
        registry.register(Box::new(transitions.clone()))?;

        let transitions_rejected = IntCounterVec::new(
            Opts::new(
                "order_transitions_rejected_total",
                "Status changes rejected by the state machine",
            ),
            &["operation"],
        )?;
        registry.register(Box::new(transitions_rejected.clone()))?;

        let validation_failures = IntCounterVec::new(
            Opts::new(
                "order_validation_failures_total",
                "Order creations rejected for invalid items",
            ),
            &["field"],
        )?;
        registry.register(Box::new(validation_failures.clone()))?;

        let operation_duration = HistogramVec::new(
            HistogramOpts::new(
                "order_operation_duration_seconds",
                "Lifecycle operation duration",
            )
            .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
            &["operation"],
        )?;
        registry.register(Box::new(operation_duration.clone()))?;

        Ok(Self {
            registry,
            orders_created,
            transitions,
            transitions_rejected,
            validation_failures,
            operation_duration,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Observes the elapsed time when dropped
    pub fn start_timer(&self, operation: &str) -> HistogramTimer {
        self.operation_duration
            .with_label_values(&[operation])
            .start_timer()
    }

    pub fn record_transition(&self, event: &OrderEvent) {
        self.transitions
            .with_label_values(&[event.from_status().as_str(), event.to_status().as_str()])
            .inc();
    }

    /// Count business-rule rejections; storage and lookup failures are not counted here
    pub fn record_failure(&self, operation: &str, error: &OrderError) {
        match error {
            OrderError::Validation { field, .. } => {
                self.validation_failures.with_label_values(&[*field]).inc();
            }
            OrderError::InvalidTransition { .. } => {
                self.transitions_rejected.with_label_values(&[operation]).inc();
            }
            OrderError::NotFound(_) | OrderError::Storage(_) => {}
        }
    }
}
