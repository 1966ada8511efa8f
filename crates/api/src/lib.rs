//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST routes for every document kind, credit applications, and reports
//! - Bearer authentication middleware
//! - Error mapping from ledger errors to JSON responses
//!
//! Handlers are generic over the [`Store`] so the same router serves the
//! Postgres store in production and the in-memory store in tests.

pub mod error;
pub mod middleware;
pub mod routes;

#[cfg(test)]
mod tests;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use rentledger_core::credit::CreditService;
use rentledger_core::posting::PostingService;
use rentledger_core::reports::ReportEngine;
use rentledger_core::store::Store;
use rentledger_shared::jwt::JwtService;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState<S> {
    /// Document posting.
    pub posting: PostingService<S>,
    /// Credit memo applications.
    pub credits: CreditService<S>,
    /// Financial reports.
    pub reports: ReportEngine<S>,
    /// JWT service for token validation.
    pub jwt_service: Arc<JwtService>,
    /// Deadline applied to every store call of a request.
    pub query_timeout: Duration,
}

impl<S: Store> AppState<S> {
    /// Builds every engine over one store.
    pub fn new(store: S, jwt_service: JwtService, query_timeout: Duration) -> Self {
        Self {
            posting: PostingService::new(store.clone()),
            credits: CreditService::new(store.clone()),
            reports: ReportEngine::new(store),
            jwt_service: Arc::new(jwt_service),
            query_timeout,
        }
    }
}

/// Creates the main application router.
pub fn create_router<S: Store>(state: AppState<S>) -> Router {
    Router::new()
        .nest("/v1", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
