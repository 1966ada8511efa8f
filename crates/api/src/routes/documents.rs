//! Document routes.
//!
//! Every document kind gets the same five routes under
//! `/buildings/{building_id}/{kind}`: list, create, get, update, and void.
//! The handlers are generic over the poster, so each kind only needs its
//! path segment registered here.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use axum_extra::extract::WithRejection;
use rentledger_core::ledger::{Split, Transaction};
use rentledger_core::posting::{
    BillPaymentPoster, BillPoster, CheckPoster, CreditMemoPoster, DepositPoster, DocumentPoster,
    InvoicePaymentPoster, InvoicePoster, JournalPoster, Posted, Record, SalesReceiptPoster,
};
use rentledger_core::store::Store;
use rentledger_shared::types::{BuildingId, DocumentId};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{AppState, error::ApiError, middleware::Caller};

/// Creates the document routes (requires auth middleware to be applied externally).
pub fn routes<S: Store>() -> Router<AppState<S>> {
    Router::new()
        .merge(kind_routes::<S, InvoicePoster>("invoices"))
        .merge(kind_routes::<S, SalesReceiptPoster>("sales-receipts"))
        .merge(kind_routes::<S, BillPoster>("bills"))
        .merge(kind_routes::<S, CheckPoster>("checks"))
        .merge(kind_routes::<S, DepositPoster>("deposits"))
        .merge(kind_routes::<S, JournalPoster>("journals"))
        .merge(kind_routes::<S, InvoicePaymentPoster>("invoice-payments"))
        .merge(kind_routes::<S, BillPaymentPoster>("bill-payments"))
        .merge(kind_routes::<S, CreditMemoPoster>("credit-memos"))
}

fn kind_routes<S, P>(segment: &str) -> Router<AppState<S>>
where
    S: Store,
    P: DocumentPoster,
    P::Payload: Serialize + DeserializeOwned,
{
    let collection = format!("/buildings/{{building_id}}/{segment}");
    let item = format!("{collection}/{{id}}");
    let void = format!("{item}/void");

    Router::new()
        .route(
            &collection,
            get(list_documents::<S, P>).post(create_document::<S, P>),
        )
        .route(
            &item,
            get(get_document::<S, P>).put(update_document::<S, P>),
        )
        .route(&void, post(void_document::<S, P>))
}

// ============================================================================
// Response Types
// ============================================================================

/// A document with its transaction header and splits.
#[derive(Debug, Serialize)]
pub struct DocumentResponse<P> {
    /// The stored document.
    #[serde(flatten)]
    pub document: Record<P>,
    /// Transaction header.
    pub transaction: Transaction,
    /// Splits, void ones included.
    pub splits: Vec<Split>,
}

impl<P> From<Posted<P>> for DocumentResponse<P> {
    fn from(posted: Posted<P>) -> Self {
        Self {
            document: posted.record,
            transaction: posted.transaction,
            splits: posted.splits,
        }
    }
}

// ============================================================================
// Request Parsing
// ============================================================================

/// Turns a request body into a payload scoped to the path's building.
///
/// The body carries every payload field except `building_id`, which comes
/// from the path. A body that names another building, or asks for any
/// status other than `active`, is rejected.
fn parse_payload<T: DeserializeOwned>(building_id: BuildingId, mut body: Value) -> Result<T, ApiError> {
    let Value::Object(fields) = &mut body else {
        return Err(ApiError::invalid_payload("body", "expected a JSON object"));
    };

    if let Some(status) = fields.remove("status") {
        if status != Value::from("active") {
            return Err(ApiError::invalid_payload(
                "status",
                "documents are posted active; use the void route to void one",
            ));
        }
    }

    let path_building = Value::from(building_id.get());
    match fields.get("building_id") {
        Some(given) if *given != path_building => {
            return Err(ApiError::invalid_payload(
                "building_id",
                format!("body names building {given}, path names {building_id}"),
            ));
        }
        Some(_) => {}
        None => {
            fields.insert("building_id".to_string(), path_building);
        }
    }

    serde_json::from_value(body).map_err(|e| ApiError::invalid_payload("body", e.to_string()))
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /buildings/{building_id}/{kind}
async fn list_documents<S, P>(
    State(state): State<AppState<S>>,
    Caller(ctx): Caller,
    WithRejection(Path(building_id), _): WithRejection<Path<BuildingId>, ApiError>,
) -> Result<Json<Vec<Record<P::Payload>>>, ApiError>
where
    S: Store,
    P: DocumentPoster,
    P::Payload: Serialize + DeserializeOwned,
{
    let records = state.posting.list::<P>(&ctx, building_id).await?;
    Ok(Json(records))
}

/// POST /buildings/{building_id}/{kind}
async fn create_document<S, P>(
    State(state): State<AppState<S>>,
    Caller(ctx): Caller,
    WithRejection(Path(building_id), _): WithRejection<Path<BuildingId>, ApiError>,
    WithRejection(Json(body), _): WithRejection<Json<Value>, ApiError>,
) -> Result<(StatusCode, Json<DocumentResponse<P::Payload>>), ApiError>
where
    S: Store,
    P: DocumentPoster,
    P::Payload: Serialize + DeserializeOwned,
{
    let payload = parse_payload(building_id, body)?;
    let posted = state.posting.create::<P>(&ctx, payload).await?;
    Ok((StatusCode::CREATED, Json(posted.into())))
}

/// GET /buildings/{building_id}/{kind}/{id}
async fn get_document<S, P>(
    State(state): State<AppState<S>>,
    Caller(ctx): Caller,
    WithRejection(Path((building_id, id)), _): WithRejection<
        Path<(BuildingId, DocumentId)>,
        ApiError,
    >,
) -> Result<Json<DocumentResponse<P::Payload>>, ApiError>
where
    S: Store,
    P: DocumentPoster,
    P::Payload: Serialize + DeserializeOwned,
{
    let posted = state.posting.get::<P>(&ctx, building_id, id).await?;
    Ok(Json(posted.into()))
}

/// PUT /buildings/{building_id}/{kind}/{id}
async fn update_document<S, P>(
    State(state): State<AppState<S>>,
    Caller(ctx): Caller,
    WithRejection(Path((building_id, id)), _): WithRejection<
        Path<(BuildingId, DocumentId)>,
        ApiError,
    >,
    WithRejection(Json(body), _): WithRejection<Json<Value>, ApiError>,
) -> Result<Json<DocumentResponse<P::Payload>>, ApiError>
where
    S: Store,
    P: DocumentPoster,
    P::Payload: Serialize + DeserializeOwned,
{
    let payload = parse_payload(building_id, body)?;
    let posted = state
        .posting
        .update::<P>(&ctx, building_id, id, payload)
        .await?;
    Ok(Json(posted.into()))
}

/// POST /buildings/{building_id}/{kind}/{id}/void
async fn void_document<S, P>(
    State(state): State<AppState<S>>,
    Caller(ctx): Caller,
    WithRejection(Path((building_id, id)), _): WithRejection<
        Path<(BuildingId, DocumentId)>,
        ApiError,
    >,
) -> Result<Json<Record<P::Payload>>, ApiError>
where
    S: Store,
    P: DocumentPoster,
    P::Payload: Serialize + DeserializeOwned,
{
    let record = state.posting.void::<P>(&ctx, building_id, id).await?;
    Ok(Json(record))
}
