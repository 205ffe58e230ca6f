//! HTTP surface
//!
//! Routes:
//! - `GET /` lists the configured categories as JSON
//! - `GET /categories/{category_id}/courses` crawls one category and returns
//!   the CSV as a file download
//! - `GET /health` liveness probe

mod errors;
mod handlers;

pub use errors::AppError;

use crate::catalog::Catalog;
use crate::config::Config;
use crate::crawler::Orchestrator;
use crate::HarvestError;
use axum::{routing::get, Router};
use std::sync::Arc;
use tokio::net::TcpListener;

/// Shared, read-only state handed to every request
///
/// Built once at startup; handlers only ever read from it.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub catalog: Arc<Catalog>,
    pub orchestrator: Arc<Orchestrator>,
}

impl AppState {
    pub fn new(config: Config, orchestrator: Orchestrator) -> Result<Self, HarvestError> {
        let catalog = Catalog::from_config(&config)?;
        Ok(Self {
            config: Arc::new(config),
            catalog: Arc::new(catalog),
            orchestrator: Arc::new(orchestrator),
        })
    }

    /// Builds state with an HTTP-backed orchestrator
    pub fn from_config(config: Config) -> Result<Self, HarvestError> {
        let orchestrator = Orchestrator::from_config(&config)?;
        Self::new(config, orchestrator)
    }
}

/// Creates the application router
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::list_categories))
        .route("/health", get(handlers::health_check))
        .route(
            "/categories/{category_id}/courses",
            get(handlers::category_courses),
        )
        .with_state(state)
}

/// Binds `addr` and serves requests until the process is stopped
pub async fn serve(state: AppState, addr: &str) -> Result<(), HarvestError> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, routes(state))
        .await
        .map_err(|e| HarvestError::Server(e.to_string()))
}
