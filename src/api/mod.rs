// ============================================================================
// HTTP API
// ============================================================================
//
//   POST   /orders              create an order           201
//   GET    /orders              list orders               200
//   GET    /orders/{id}         fetch one order           200
//   PUT    /orders/{id}/status  change status             200
//   DELETE /orders/{id}         cancel the order          204
//   GET    /health              liveness + store backend  200
//   GET    /metrics             Prometheus exposition     200
//
// Handlers expect `web::Data<OrderCommandHandler>` and `web::Data<Metrics>`
// to be registered on the App.
//
// ============================================================================

mod error;
mod handlers;

use actix_web::web;

use crate::metrics::{health_handler, metrics_handler};

pub use error::ApiError;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into()),
    )
    .service(
        web::scope("/orders")
            .route("", web::post().to(handlers::create_order))
            .route("", web::get().to(handlers::list_orders))
            .route("/{id}", web::get().to(handlers::get_order))
            .route("/{id}", web::delete().to(handlers::cancel_order))
            .route("/{id}/status", web::put().to(handlers::update_status)),
    )
    .route("/health", web::get().to(health_handler))
    .route("/metrics", web::get().to(metrics_handler));
}
