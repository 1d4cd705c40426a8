use actix_web::{middleware, web, App, HttpServer};
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod api;
mod config;
mod domain;
mod metrics;
mod store;
mod utils;

use config::Config;
use domain::order::OrderCommandHandler;
use store::{InMemoryOrderStore, OrderStore, PgOrderStore};
use utils::RetryConfig;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Default to INFO, override with RUST_LOG
    // Example: RUST_LOG=debug cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,orders_service=debug")),
        )
        .init();

    let config = Config::from_env();
    tracing::info!(
        host = %config.http_host,
        port = config.http_port,
        "🚀 Starting orders service"
    );

    // === 1. Metrics ===
    let metrics = Arc::new(metrics::Metrics::new()?);
    tracing::info!(
        "📊 Metrics registry created with {} metrics",
        metrics.registry().gather().len()
    );

    // === 2. Order store ===
    let store: Arc<dyn OrderStore> = match &config.database_url {
        Some(url) => {
            let pg = PgOrderStore::connect(
                url,
                config.database_max_connections,
                RetryConfig::with_attempts(config.database_connect_attempts),
            )
            .await?;
            pg.migrate().await?;
            tracing::info!("Orders persisted in PostgreSQL");
            Arc::new(pg)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, orders are kept in memory and lost on restart");
            Arc::new(InMemoryOrderStore::new())
        }
    };

    // === 3. HTTP server ===
    let orders = web::Data::new(OrderCommandHandler::new(store, metrics.clone()));
    let metrics = web::Data::from(metrics);

    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(orders.clone())
            .app_data(metrics.clone())
            .configure(api::configure)
    });
    if let Some(workers) = config.http_workers {
        server = server.workers(workers);
    }

    tracing::info!("Listening on http://{}:{}", config.http_host, config.http_port);
    server
        .bind((config.http_host.as_str(), config.http_port))?
        .run()
        .await?;

    tracing::info!("Orders service stopped");
    Ok(())
}
