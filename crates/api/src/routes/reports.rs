//! Report routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use axum_extra::extract::WithRejection;
use chrono::{NaiveDate, Utc};
use rentledger_core::reports::{BalanceSheetReport, CustomerBalanceSummary, TrialBalanceReport};
use rentledger_core::store::Store;
use rentledger_shared::types::BuildingId;
use serde::Deserialize;

use crate::{AppState, error::ApiError, middleware::Caller};

type BuildingPath = WithRejection<Path<BuildingId>, ApiError>;
type AsOf = WithRejection<Query<AsOfQuery>, ApiError>;

/// Creates the report routes (requires auth middleware to be applied externally).
pub fn routes<S: Store>() -> Router<AppState<S>> {
    Router::new()
        .route(
            "/buildings/{building_id}/reports/trial-balance",
            get(get_trial_balance::<S>),
        )
        .route(
            "/buildings/{building_id}/reports/balance-sheet",
            get(get_balance_sheet::<S>),
        )
        .route(
            "/buildings/{building_id}/reports/customer-balance-summary",
            get(get_customer_balance_summary::<S>),
        )
}

/// Query parameters shared by every report.
#[derive(Debug, Deserialize)]
pub struct AsOfQuery {
    /// Inclusive cutoff date (defaults to today).
    pub as_of_date: Option<NaiveDate>,
}

impl AsOfQuery {
    fn date(&self) -> NaiveDate {
        self.as_of_date.unwrap_or_else(|| Utc::now().date_naive())
    }
}

/// GET /buildings/{building_id}/reports/trial-balance
async fn get_trial_balance<S: Store>(
    State(state): State<AppState<S>>,
    Caller(ctx): Caller,
    WithRejection(Path(building_id), _): BuildingPath,
    WithRejection(Query(query), _): AsOf,
) -> Result<Json<TrialBalanceReport>, ApiError> {
    let report = state
        .reports
        .trial_balance(&ctx, building_id, query.date())
        .await?;
    Ok(Json(report))
}

/// GET /buildings/{building_id}/reports/balance-sheet
async fn get_balance_sheet<S: Store>(
    State(state): State<AppState<S>>,
    Caller(ctx): Caller,
    WithRejection(Path(building_id), _): BuildingPath,
    WithRejection(Query(query), _): AsOf,
) -> Result<Json<BalanceSheetReport>, ApiError> {
    let report = state
        .reports
        .balance_sheet(&ctx, building_id, query.date())
        .await?;
    Ok(Json(report))
}

/// GET /buildings/{building_id}/reports/customer-balance-summary
async fn get_customer_balance_summary<S: Store>(
    State(state): State<AppState<S>>,
    Caller(ctx): Caller,
    WithRejection(Path(building_id), _): BuildingPath,
    WithRejection(Query(query), _): AsOf,
) -> Result<Json<CustomerBalanceSummary>, ApiError> {
    let report = state
        .reports
        .customer_balance_summary(&ctx, building_id, query.date())
        .await?;
    Ok(Json(report))
}
