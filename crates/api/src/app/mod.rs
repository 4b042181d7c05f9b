//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store, gate, ledger and report wiring
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs and mapping to domain inputs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use holdbook_infra::config::AppConfig;
use holdbook_infra::table_store::TableStoreError;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use services::{AppServices, SharedStore};

/// Build the full HTTP router from configuration (entrypoint used by `main.rs`).
pub async fn build_app(config: &AppConfig) -> Result<Router, TableStoreError> {
    let services = services::build_services(config).await?;
    Ok(router(Arc::new(services)))
}

/// Build the router over an already opened store.
pub fn build_app_with_store(config: &AppConfig, store: SharedStore) -> Router {
    router(Arc::new(AppServices::new(config, store)))
}

fn router(services: Arc<AppServices>) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .layer(ServiceBuilder::new().layer(Extension(services)))
}
