//! Credit application routes.
//!
//! Invoice balance, the customer's open credit, and the applications of
//! credit memos to an invoice.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use axum_extra::extract::WithRejection;
use rentledger_core::credit::{AppliedCredit, ApplyCredit, AvailableCredit, InvoiceBalance};
use rentledger_core::store::Store;
use rentledger_shared::types::{AppliedCreditId, BuildingId, DocumentId};

use crate::{AppState, error::ApiError, middleware::Caller};

type InvoicePath = WithRejection<Path<(BuildingId, DocumentId)>, ApiError>;

/// Creates the credit routes (requires auth middleware to be applied externally).
pub fn routes<S: Store>() -> Router<AppState<S>> {
    Router::new()
        .route(
            "/buildings/{building_id}/invoices/{id}/balance",
            get(get_invoice_balance::<S>),
        )
        .route(
            "/buildings/{building_id}/invoices/{id}/available-credits",
            get(list_available_credits::<S>),
        )
        .route(
            "/buildings/{building_id}/invoices/{id}/applied-credits",
            get(list_applied_credits::<S>).post(apply_credit::<S>),
        )
        .route(
            "/buildings/{building_id}/applied-credits/{id}/void",
            post(void_applied_credit::<S>),
        )
}

/// GET /buildings/{building_id}/invoices/{id}/balance
async fn get_invoice_balance<S: Store>(
    State(state): State<AppState<S>>,
    Caller(ctx): Caller,
    WithRejection(Path((building_id, invoice_id)), _): InvoicePath,
) -> Result<Json<InvoiceBalance>, ApiError> {
    let balance = state
        .credits
        .invoice_balance(&ctx, building_id, invoice_id)
        .await?;
    Ok(Json(balance))
}

/// GET /buildings/{building_id}/invoices/{id}/available-credits
async fn list_available_credits<S: Store>(
    State(state): State<AppState<S>>,
    Caller(ctx): Caller,
    WithRejection(Path((building_id, invoice_id)), _): InvoicePath,
) -> Result<Json<Vec<AvailableCredit>>, ApiError> {
    let credits = state
        .credits
        .available_credits_for_invoice(&ctx, building_id, invoice_id)
        .await?;
    Ok(Json(credits))
}

/// GET /buildings/{building_id}/invoices/{id}/applied-credits
async fn list_applied_credits<S: Store>(
    State(state): State<AppState<S>>,
    Caller(ctx): Caller,
    WithRejection(Path((building_id, invoice_id)), _): InvoicePath,
) -> Result<Json<Vec<AppliedCredit>>, ApiError> {
    let applied = state
        .credits
        .applied_credits(&ctx, building_id, invoice_id)
        .await?;
    Ok(Json(applied))
}

/// POST /buildings/{building_id}/invoices/{id}/applied-credits
async fn apply_credit<S: Store>(
    State(state): State<AppState<S>>,
    Caller(ctx): Caller,
    WithRejection(Path((building_id, invoice_id)), _): InvoicePath,
    WithRejection(Json(request), _): WithRejection<Json<ApplyCredit>, ApiError>,
) -> Result<(StatusCode, Json<AppliedCredit>), ApiError> {
    let applied = state
        .credits
        .apply_credit(&ctx, building_id, invoice_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(applied)))
}

/// POST /buildings/{building_id}/applied-credits/{id}/void
async fn void_applied_credit<S: Store>(
    State(state): State<AppState<S>>,
    Caller(ctx): Caller,
    WithRejection(Path((building_id, id)), _): WithRejection<
        Path<(BuildingId, AppliedCreditId)>,
        ApiError,
    >,
) -> Result<Json<AppliedCredit>, ApiError> {
    let applied = state
        .credits
        .void_applied_credit(&ctx, building_id, id)
        .await?;
    Ok(Json(applied))
}
