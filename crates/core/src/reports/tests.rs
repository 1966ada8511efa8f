//! Report tests: pure shaping over synthetic totals, and end-to-end over
//! documents posted to the in-memory store.

use proptest::prelude::*;
use rentledger_shared::types::{AccountId, Cents, DocumentId};

use super::service::{NET_INCOME_ROW, ReportEngine, ReportService};
use super::types::*;
use crate::ledger::{Account, SideTotals};
use crate::posting::{
    BillPoster, InvoicePaymentPayload, InvoicePaymentPoster, InvoicePoster, JournalLine,
    JournalPayload, JournalPoster, PostingService,
};
use crate::store::MemoryStore;
use crate::testing::*;

fn chart(id: AccountId) -> Account {
    accounts()
        .into_iter()
        .find(|a| a.id == id)
        .unwrap()
}

fn totals(id: AccountId, debit: &str, credit: &str) -> AccountTotals {
    AccountTotals {
        account: chart(id),
        totals: SideTotals::new(money(debit), money(credit)),
    }
}

struct Books {
    posting: PostingService<MemoryStore>,
    reports: ReportEngine<MemoryStore>,
}

impl Books {
    async fn new() -> Self {
        let store = seeded_store().await;
        Self {
            posting: PostingService::new(store.clone()),
            reports: ReportEngine::new(store),
        }
    }

    /// Invoice INV-1 for 100.00 and bill BL-1 for 100.00, both on 2025-01-15.
    async fn post_invoice_and_bill(&self) -> DocumentId {
        let inv = self
            .posting
            .create::<InvoicePoster>(&ctx(), invoice(vec![item_line(RENT_ITEM, "2", "50")]))
            .await
            .unwrap();
        self.posting
            .create::<BillPoster>(
                &ctx(),
                bill(vec![
                    account_line(REPAIRS, "30.00"),
                    account_line(UTILITIES, "70.00"),
                ]),
            )
            .await
            .unwrap();
        inv.record.id
    }

    async fn post_february_journal(&self) {
        let line = |account_id, debit: Option<&str>, credit: Option<&str>| JournalLine {
            account_id,
            debit: debit.map(money),
            credit: credit.map(money),
            description: None,
            unit_id: None,
            person_id: None,
        };
        self.posting
            .create::<JournalPoster>(
                &ctx(),
                JournalPayload {
                    building_id: BUILDING,
                    unit_id: None,
                    date: date(2025, 2, 1),
                    reference_number: "JE-1".to_string(),
                    memo: Some("owner draw".to_string()),
                    total_amount: money("100.00"),
                    lines: vec![
                        line(EQUITY, Some("100.00"), None),
                        line(AP, None, Some("100.00")),
                    ],
                },
            )
            .await
            .unwrap();
    }
}

// ============================================================================
// Pure shaping
// ============================================================================

#[test]
fn test_trial_balance_places_balance_by_sign() {
    let report = ReportService::trial_balance(
        date(2025, 1, 31),
        vec![
            totals(BANK, "10.00", "25.00"),
            totals(INCOME, "5.00", "0.00"),
            totals(AP, "0.00", "0.00"),
            totals(EQUITY, "0.00", "20.00"),
        ],
    );

    let sides: Vec<_> = report
        .rows
        .iter()
        .map(|r| (r.account_id, r.debit_balance, r.credit_balance))
        .collect();
    assert_eq!(
        sides,
        vec![
            (BANK, money("0.00"), money("15.00")),
            (INCOME, money("5.00"), money("0.00")),
            (EQUITY, money("0.00"), money("20.00")),
        ]
    );
    assert_eq!(report.total.debit_balance, money("5.00"));
    assert_eq!(report.total.credit_balance, money("35.00"));
    assert!(!report.is_balanced);
}

#[test]
fn test_balance_sheet_without_net_income_has_no_synthetic_row() {
    let report = ReportService::balance_sheet(
        date(2025, 1, 31),
        vec![totals(BANK, "50.00", "0.00"), totals(EQUITY, "0.00", "50.00")],
    );
    assert!(report.net_income.is_zero());
    assert!(report.equity.accounts.iter().all(|r| r.name != NET_INCOME_ROW));
    assert!(report.is_balanced);
}

#[test]
fn test_customer_summary_drops_settled_customers() {
    let report = ReportService::customer_balance_summary(
        date(2025, 1, 31),
        vec![
            CustomerTotals {
                person_id: CUSTOMER,
                name: "Ada Tenant".to_string(),
                totals: SideTotals::new(money("100.00"), money("40.00")),
            },
            CustomerTotals {
                person_id: OTHER_CUSTOMER,
                name: "Bo Tenant".to_string(),
                totals: SideTotals::new(money("10.00"), money("10.00")),
            },
        ],
    );
    assert_eq!(report.rows.len(), 1);
    assert_eq!(report.rows[0].balance, money("60.00"));
    assert_eq!(report.total, money("60.00"));
}

// ============================================================================
// End to end
// ============================================================================

#[tokio::test]
async fn test_trial_balance_after_single_invoice() {
    let books = Books::new().await;
    books
        .posting
        .create::<InvoicePoster>(&ctx(), invoice(vec![item_line(RENT_ITEM, "2", "50")]))
        .await
        .unwrap();

    let report = books
        .reports
        .trial_balance(&ctx(), BUILDING, date(2025, 1, 31))
        .await
        .unwrap();

    let rows: Vec<_> = report
        .rows
        .iter()
        .map(|r| (r.account_id, r.debit_balance, r.credit_balance))
        .collect();
    assert_eq!(
        rows,
        vec![
            (AR, money("100.00"), money("0.00")),
            (INCOME, money("0.00"), money("100.00")),
        ]
    );
    assert!(report.is_balanced);
}

#[tokio::test]
async fn test_balance_sheet_as_of_excludes_later_journal() {
    let books = Books::new().await;
    books.post_invoice_and_bill().await;
    books.post_february_journal().await;

    let report = books
        .reports
        .balance_sheet(&ctx(), BUILDING, date(2025, 1, 31))
        .await
        .unwrap();

    assert_eq!(report.total_assets, money("100.00"));
    assert_eq!(report.total_liabilities, money("100.00"));
    assert_eq!(report.total_equity, money("0.00"));
    assert_eq!(report.net_income, money("0.00"));
    assert_eq!(report.income.total, money("100.00"));
    assert_eq!(report.expense.total, money("100.00"));
    assert!(report.is_balanced);

    let later = books
        .reports
        .balance_sheet(&ctx(), BUILDING, date(2025, 2, 1))
        .await
        .unwrap();
    assert_eq!(later.total_liabilities, money("200.00"));
    assert_eq!(later.total_equity, money("-100.00"));
    assert!(later.is_balanced);
}

#[tokio::test]
async fn test_net_income_row_is_appended_to_equity() {
    let books = Books::new().await;
    books
        .posting
        .create::<InvoicePoster>(&ctx(), invoice(vec![item_line(RENT_ITEM, "2", "50")]))
        .await
        .unwrap();

    let report = books
        .reports
        .balance_sheet(&ctx(), BUILDING, date(2025, 1, 31))
        .await
        .unwrap();
    let row = report.equity.accounts.last().unwrap();
    assert_eq!(row.name, NET_INCOME_ROW);
    assert_eq!(row.account_id, None);
    assert_eq!(row.balance, money("100.00"));
    assert_eq!(report.total_equity, money("100.00"));
    assert!(report.is_balanced);
}

#[tokio::test]
async fn test_void_documents_drop_out_of_reports() {
    let books = Books::new().await;
    let invoice_id = books.post_invoice_and_bill().await;
    books
        .posting
        .void::<InvoicePoster>(&ctx(), BUILDING, invoice_id)
        .await
        .unwrap();

    let report = books
        .reports
        .trial_balance(&ctx(), BUILDING, date(2025, 1, 31))
        .await
        .unwrap();
    assert!(report.rows.iter().all(|r| r.account_id != AR && r.account_id != INCOME));
    assert_eq!(report.total.debit_balance, money("100.00"));
    assert!(report.is_balanced);
}

#[tokio::test]
async fn test_customer_summary_tracks_payments() {
    let books = Books::new().await;
    let invoice_id = books.post_invoice_and_bill().await;
    books
        .posting
        .create::<InvoicePaymentPoster>(
            &ctx(),
            InvoicePaymentPayload {
                building_id: BUILDING,
                invoice_id,
                asset_account_id: BANK,
                date: date(2025, 1, 20),
                reference_number: "RCPT-1".to_string(),
                memo: None,
                amount: money("40.00"),
            },
        )
        .await
        .unwrap();

    let report = books
        .reports
        .customer_balance_summary(&ctx(), BUILDING, date(2025, 1, 31))
        .await
        .unwrap();
    assert_eq!(
        report.rows,
        vec![CustomerBalanceRow {
            person_id: CUSTOMER,
            name: "Ada Tenant".to_string(),
            balance: money("60.00"),
        }]
    );
    assert_eq!(report.total, money("60.00"));

    let before_payment = books
        .reports
        .customer_balance_summary(&ctx(), BUILDING, date(2025, 1, 15))
        .await
        .unwrap();
    assert_eq!(before_payment.total, money("100.00"));
}

#[tokio::test]
async fn test_reports_are_scoped_to_building() {
    let books = Books::new().await;
    books.post_invoice_and_bill().await;

    let report = books
        .reports
        .trial_balance(&ctx(), OTHER_BUILDING, date(2025, 12, 31))
        .await
        .unwrap();
    assert!(report.rows.is_empty());
    assert!(report.is_balanced);
}

proptest! {
    /// Any mix of balanced account totals yields a balanced trial balance
    /// and balance sheet.
    #[test]
    fn prop_balanced_ledger_balances_reports(
        amounts in prop::collection::vec((0_usize..8, 0_usize..8, 1_i64..1_000_000), 1..30)
    ) {
        let chart: Vec<Account> = accounts()
            .into_iter()
            .filter(|a| a.building_id == BUILDING)
            .collect();
        let mut sides = vec![SideTotals::default(); chart.len()];
        for (debit_idx, credit_idx, cents) in amounts {
            let amount = Cents::new(cents);
            sides[debit_idx % chart.len()].add_debit(amount);
            sides[credit_idx % chart.len()].add_credit(amount);
        }
        let rows: Vec<AccountTotals> = chart
            .into_iter()
            .zip(sides)
            .map(|(account, totals)| AccountTotals { account, totals })
            .collect();

        let tb = ReportService::trial_balance(date(2025, 1, 31), rows.clone());
        prop_assert!(tb.is_balanced);
        let bs = ReportService::balance_sheet(date(2025, 1, 31), rows);
        prop_assert!(bs.is_balanced);
    }
}
