//! API route definitions.

use axum::{Router, middleware};
use rentledger_core::store::Store;

use crate::{AppState, middleware::auth_middleware};

pub mod credits;
pub mod documents;
pub mod health;
pub mod reports;

/// Creates the API router: public health check plus the authenticated
/// building routes.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state<S: Store>(state: AppState<S>) -> Router<AppState<S>> {
    let protected_routes = Router::new()
        .merge(documents::routes())
        .merge(credits::routes())
        .merge(reports::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::<S>,
        ));

    Router::new()
        .merge(health::routes())
        .merge(protected_routes)
}
