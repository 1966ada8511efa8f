//! Router tests against the in-memory store.

use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header::AUTHORIZATION},
};
use http_body_util::BodyExt;
use rentledger_core::ledger::{Account, AccountNature, ItemRow, NormalSide, Person};
use rentledger_core::store::MemoryStore;
use rentledger_shared::jwt::{JwtConfig, JwtService};
use rentledger_shared::types::{AccountId, AccountTypeId, BuildingId, ItemId, PersonId, UserId};
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::{AppState, create_router};

const SECRET: &str = "test-secret-key-that-is-long-enough";
const BUILDING: BuildingId = BuildingId::new(1);

const BANK: i64 = 11;
const AR: i64 = 10;
const INCOME: i64 = 30;
const DEPOSITS: i64 = 40;
const EQUITY: i64 = 80;
const RENT_ITEM: i64 = 200;
const CUSTOMER: i64 = 500;

fn account(id: i64, number: &str, name: &str, type_name: &str, nature: AccountNature) -> Account {
    Account {
        id: AccountId::new(id),
        building_id: BUILDING,
        number: number.to_string(),
        name: name.to_string(),
        type_id: AccountTypeId::new(nature as i64 + 1),
        type_name: type_name.to_string(),
        nature,
        normal_side: NormalSide::for_nature(nature),
        is_default: false,
    }
}

struct TestApp {
    router: Router,
    token: String,
}

async fn test_app() -> TestApp {
    let store = MemoryStore::new();
    for account in [
        account(BANK, "1000", "Operating Bank", "Bank", AccountNature::Asset),
        account(AR, "1200", "Accounts Receivable", "Account Receivable", AccountNature::Asset),
        account(DEPOSITS, "2100", "Customer Deposits", "Other Current Liability", AccountNature::Liability),
        account(EQUITY, "3000", "Owner Equity", "Equity", AccountNature::Equity),
        account(INCOME, "4000", "Rental Income", "Income", AccountNature::Income),
    ] {
        store.insert_account(account).await;
    }
    store
        .insert_item(ItemRow {
            id: ItemId::new(RENT_ITEM),
            building_id: BUILDING,
            name: "Monthly Rent".to_string(),
            item_type: "service".to_string(),
            asset_account_id: None,
            income_account_id: Some(AccountId::new(INCOME)),
        })
        .await;
    store
        .insert_person(Person {
            id: PersonId::new(CUSTOMER),
            building_id: BUILDING,
            display_name: "Ada Tenant".to_string(),
        })
        .await;

    let jwt_service = JwtService::new(JwtConfig::with_secret(SECRET));
    let token = jwt_service.generate_token(UserId::new(1)).unwrap();
    let state = AppState::new(store, jwt_service, Duration::from_secs(5));

    TestApp {
        router: create_router(state),
        token,
    }
}

impl TestApp {
    async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .header("Content-Type", "application/json");
        let request = match body {
            Some(body) => request.body(Body::from(body.to_string())).unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };
        send_request(&self.router, request).await
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None).await
    }

    async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(body)).await
    }
}

async fn send_request(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn rent_invoice(rate: &str) -> Value {
    json!({
        "customer_id": CUSTOMER,
        "ar_account_id": AR,
        "date": "2025-01-01",
        "due_date": "2025-01-31",
        "reference_number": "INV-1",
        "lines": [{
            "item_id": RENT_ITEM,
            "description": "January rent",
            "quantity": "1",
            "rate": rate
        }]
    })
}

fn credit_memo(amount: &str) -> Value {
    json!({
        "customer_id": CUSTOMER,
        "liability_account_id": DEPOSITS,
        "deposit_account_id": BANK,
        "date": "2025-01-02",
        "reference_number": "CM-1",
        "amount": amount
    })
}

// ============================================================================
// Health and authentication
// ============================================================================

#[tokio::test]
async fn test_health_needs_no_token() {
    let app = test_app().await;
    let request = Request::builder()
        .uri("/v1/health")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send_request(&app.router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_missing_token_is_rejected() {
    let app = test_app().await;
    let request = Request::builder()
        .uri("/v1/buildings/1/invoices")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send_request(&app.router, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "missing_token");
}

#[tokio::test]
async fn test_invalid_token_is_rejected() {
    let app = test_app().await;
    let request = Request::builder()
        .uri("/v1/buildings/1/invoices")
        .header(AUTHORIZATION, "Bearer not-a-jwt")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send_request(&app.router, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid_token");
}

// ============================================================================
// Documents
// ============================================================================

#[tokio::test]
async fn test_create_get_and_list_invoice() {
    let app = test_app().await;

    let (status, created) = app
        .post("/v1/buildings/1/invoices", rent_invoice("1200"))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["total"], "1200.00");
    assert_eq!(created["status"], "active");
    assert_eq!(created["body"]["building_id"], 1);
    assert_eq!(created["splits"].as_array().unwrap().len(), 2);

    let id = created["id"].as_i64().unwrap();
    let (status, fetched) = app.get(&format!("/v1/buildings/1/invoices/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["id"], created["id"]);
    assert_eq!(fetched["transaction"]["id"], created["transaction"]["id"]);

    let (status, listed) = app.get("/v1/buildings/1/invoices").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_update_invoice_reposts_splits() {
    let app = test_app().await;
    let (_, created) = app
        .post("/v1/buildings/1/invoices", rent_invoice("1200"))
        .await;
    let id = created["id"].as_i64().unwrap();

    let (status, updated) = app
        .send(
            Method::PUT,
            &format!("/v1/buildings/1/invoices/{id}"),
            Some(rent_invoice("1300")),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["total"], "1300.00");

    let splits = updated["splits"].as_array().unwrap();
    let void = splits.iter().filter(|s| s["status"] == "void").count();
    let active = splits.iter().filter(|s| s["status"] == "active").count();
    assert_eq!(void, 2);
    assert_eq!(active, 2);
}

#[tokio::test]
async fn test_create_rejects_void_status() {
    let app = test_app().await;
    let mut invoice = rent_invoice("1200");
    invoice["status"] = json!("void");

    let (status, body) = app.post("/v1/buildings/1/invoices", invoice).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_payload");
}

#[tokio::test]
async fn test_malformed_body_is_invalid_payload() {
    let app = test_app().await;
    let mut invoice = rent_invoice("1200");
    invoice["date"] = json!("January first");

    let (status, body) = app.post("/v1/buildings/1/invoices", invoice).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_payload");
}

#[tokio::test]
async fn test_unbalanced_journal_is_rejected() {
    let app = test_app().await;
    let journal = json!({
        "date": "2025-01-05",
        "reference_number": "JE-1",
        "total_amount": "100.00",
        "lines": [
            { "account_id": BANK, "debit": "100.00" },
            { "account_id": EQUITY, "credit": "99.50" }
        ]
    });

    let (status, body) = app.post("/v1/buildings/1/journals", journal).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "unbalanced");

    let (_, listed) = app.get("/v1/buildings/1/journals").await;
    assert!(listed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_document_is_not_found() {
    let app = test_app().await;

    let (status, body) = app.get("/v1/buildings/1/bills/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_non_numeric_id_is_invalid_payload() {
    let app = test_app().await;

    let (status, body) = app.get("/v1/buildings/1/checks/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_payload");
}

#[tokio::test]
async fn test_quantity_above_bound_is_rejected() {
    let app = test_app().await;
    let mut body = rent_invoice("1");
    body["lines"][0]["quantity"] = json!("100000000000");

    let (status, error) = app.post("/v1/buildings/1/invoices", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], "invalid_payload");

    let (_, listed) = app.get("/v1/buildings/1/invoices").await;
    assert!(listed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_void_invoice_drops_it_from_reports() {
    let app = test_app().await;
    let (_, created) = app
        .post("/v1/buildings/1/invoices", rent_invoice("1200"))
        .await;
    let id = created["id"].as_i64().unwrap();

    let (status, voided) = app
        .post(&format!("/v1/buildings/1/invoices/{id}/void"), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(voided["status"], "void");

    let (status, report) = app
        .get("/v1/buildings/1/reports/trial-balance?as_of_date=2025-01-31")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(report["rows"].as_array().unwrap().is_empty());
    assert_eq!(report["is_balanced"], true);
}

// ============================================================================
// Credits
// ============================================================================

#[tokio::test]
async fn test_credit_application_flow() {
    let app = test_app().await;
    let (_, invoice) = app
        .post("/v1/buildings/1/invoices", rent_invoice("500"))
        .await;
    let invoice_id = invoice["id"].as_i64().unwrap();
    let (status, memo) = app
        .post("/v1/buildings/1/credit-memos", credit_memo("200.00"))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let memo_id = memo["id"].as_i64().unwrap();

    let applied_uri = format!("/v1/buildings/1/invoices/{invoice_id}/applied-credits");
    let apply = |amount: &str| {
        json!({
            "credit_memo_id": memo_id,
            "amount": amount,
            "date": "2025-01-03"
        })
    };

    let (status, applied) = app.post(&applied_uri, apply("150.00")).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(applied["amount"], "150.00");

    let (status, body) = app.post(&applied_uri, apply("60.00")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "exceeds_available");

    let (_, balance) = app
        .get(&format!("/v1/buildings/1/invoices/{invoice_id}/balance"))
        .await;
    assert_eq!(balance["total"], "500.00");
    assert_eq!(balance["credits"], "150.00");
    assert_eq!(balance["outstanding"], "350.00");

    let (_, available) = app
        .get(&format!(
            "/v1/buildings/1/invoices/{invoice_id}/available-credits"
        ))
        .await;
    assert_eq!(available[0]["available"], "50.00");

    let application_id = applied["id"].as_i64().unwrap();
    let (status, voided) = app
        .post(
            &format!("/v1/buildings/1/applied-credits/{application_id}/void"),
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(voided["status"], "void");

    let (_, listed) = app.get(&applied_uri).await;
    assert_eq!(listed[0]["status"], "void");

    let (_, available) = app
        .get(&format!(
            "/v1/buildings/1/invoices/{invoice_id}/available-credits"
        ))
        .await;
    assert_eq!(available[0]["available"], "200.00");
}

// ============================================================================
// Reports
// ============================================================================

#[tokio::test]
async fn test_reports_reflect_posted_invoice() {
    let app = test_app().await;
    app.post("/v1/buildings/1/invoices", rent_invoice("1200"))
        .await;

    let (status, trial) = app
        .get("/v1/buildings/1/reports/trial-balance?as_of_date=2025-01-31")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(trial["total"]["debit_balance"], "1200.00");
    assert_eq!(trial["total"]["credit_balance"], "1200.00");

    let (_, sheet) = app
        .get("/v1/buildings/1/reports/balance-sheet?as_of_date=2025-01-31")
        .await;
    assert_eq!(sheet["net_income"], "1200.00");
    assert_eq!(sheet["is_balanced"], true);

    let (_, summary) = app
        .get("/v1/buildings/1/reports/customer-balance-summary?as_of_date=2025-01-31")
        .await;
    assert_eq!(summary["rows"][0]["name"], "Ada Tenant");
    assert_eq!(summary["total"], "1200.00");

    let (_, earlier) = app
        .get("/v1/buildings/1/reports/trial-balance?as_of_date=2024-12-31")
        .await;
    assert!(earlier["rows"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_bad_report_date_is_invalid_payload() {
    let app = test_app().await;

    let (status, body) = app
        .get("/v1/buildings/1/reports/balance-sheet?as_of_date=31-01-2025")
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_payload");
}
