//! Web server adapter.
//!
//! JSON API over axum: holdings CRUD under `/stocks`, the live valuation at
//! `/stocks/wealth` and constituent lookups.

mod auth;
mod error;
mod handlers;

pub use auth::{AccessGate, Caller, hash_token};
pub use error::{WebError, status_from_error};
pub use handlers::*;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::domain::service::HoldingService;
use crate::ports::constituents_port::ConstituentsPort;

pub struct AppState {
    pub service: Arc<HoldingService>,
    pub constituents: Arc<dyn ConstituentsPort>,
    pub access: AccessGate,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/stocks",
            get(handlers::list_stocks).post(handlers::create_stock),
        )
        .route(
            "/stocks/",
            get(handlers::list_stocks).post(handlers::create_stock),
        )
        .route("/stocks/wealth", get(handlers::wealth))
        .route("/stocks/wealth/refresh", post(handlers::refresh_wealth))
        .route(
            "/stocks/{id}",
            get(handlers::get_stock)
                .put(handlers::update_stock)
                .delete(handlers::delete_stock),
        )
        .route("/constituents/{symbol}", get(handlers::get_constituent))
        .fallback(handlers::not_found)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(Arc::new(state))
}
