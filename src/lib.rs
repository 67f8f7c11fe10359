// src/lib.rs

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use services::aggregator::CauseAggregator;
use services::registry::CauseWriter;

#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<CauseAggregator>,
    /// Write relay; `None` when no signer is configured
    pub writer: Option<Arc<dyn CauseWriter>>,
    /// API key gating the admin endpoints; `None` disables them
    pub admin_api_key: Option<String>,
}

pub mod config;

pub mod services {
    pub mod aggregator;
    pub mod derive;
    pub mod events;
    pub mod filters;
    pub mod registry;
}

pub mod models;
pub mod handlers;

/// Build the full API router. Shared between `main` and the test suite.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route(
            "/api/causes",
            get(handlers::causes::list_causes).post(handlers::admin::add_cause),
        )
        .route("/api/causes/featured", get(handlers::causes::featured_causes))
        .route(
            "/api/causes/categories",
            get(handlers::causes::list_categories),
        )
        .route(
            "/api/causes/{id}",
            get(handlers::causes::get_cause).put(handlers::admin::update_cause),
        )
        .route("/api/causes/{id}/donate", post(handlers::donations::donate))
        .route(
            "/api/dashboard/overview",
            get(handlers::overview::dashboard_overview),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "CharityOne backend is running"
}
