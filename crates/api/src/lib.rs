//! HTTP API for the Tally fee ledger.
//!
//! Thin handlers over the `tally-core` domain logic and the `tally-store`
//! append boundary: requests are deserialized into factory inputs, appended
//! through the store, and domain errors are mapped onto the HTTP error
//! envelope.

pub mod routes;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use tally_store::LedgerStore;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// The durable ledger store.
    pub store: Arc<dyn LedgerStore>,
}

/// Builds the application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::ledger::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
