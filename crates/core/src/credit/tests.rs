//! Credit application against the in-memory store.

use rentledger_shared::types::{DocumentId, PersonId};

use super::*;
use crate::ledger::{LedgerError, Status};
use crate::posting::{
    CreditMemoPoster, InvoicePaymentPayload, InvoicePaymentPoster, InvoicePoster, PostingService,
};
use crate::store::MemoryStore;
use crate::testing::*;

struct Fixture {
    posting: PostingService<MemoryStore>,
    credits: CreditService<MemoryStore>,
}

impl Fixture {
    async fn new() -> Self {
        let store = seeded_store().await;
        Self {
            posting: PostingService::new(store.clone()),
            credits: CreditService::new(store),
        }
    }

    async fn invoice_for(&self, customer: PersonId) -> DocumentId {
        let mut payload = invoice(vec![item_line(RENT_ITEM, "2", "50")]);
        payload.customer_id = customer;
        self.posting
            .create::<InvoicePoster>(&ctx(), payload)
            .await
            .unwrap()
            .record
            .id
    }

    async fn memo_for(&self, customer: PersonId, amount: &str) -> DocumentId {
        self.posting
            .create::<CreditMemoPoster>(&ctx(), credit_memo(customer, amount))
            .await
            .unwrap()
            .record
            .id
    }

    async fn apply(
        &self,
        invoice_id: DocumentId,
        memo_id: DocumentId,
        amount: &str,
    ) -> Result<AppliedCredit, LedgerError> {
        self.credits
            .apply_credit(
                &ctx(),
                BUILDING,
                invoice_id,
                ApplyCredit {
                    credit_memo_id: memo_id,
                    amount: money(amount),
                    date: date(2025, 1, 20),
                    description: Some("rent credit".to_string()),
                },
            )
            .await
    }
}

#[tokio::test]
async fn test_apply_and_exhaust_memo() {
    let fx = Fixture::new().await;
    let first = fx.invoice_for(CUSTOMER).await;
    let second = fx.invoice_for(CUSTOMER).await;
    let memo = fx.memo_for(CUSTOMER, "50.00").await;

    let applied = fx.apply(first, memo, "30.00").await.unwrap();
    assert_eq!(applied.amount, money("30.00"));
    assert_eq!(applied.status, Status::Active);

    let available = fx
        .credits
        .available_credits_for_invoice(&ctx(), BUILDING, second)
        .await
        .unwrap();
    assert_eq!(available.len(), 1);
    assert_eq!(available[0].credit_memo_id, memo);
    assert_eq!(available[0].memo_amount, money("50.00"));
    assert_eq!(available[0].applied_sum, money("30.00"));
    assert_eq!(available[0].available, money("20.00"));

    let err = fx.apply(second, memo, "25.00").await.unwrap_err();
    assert_eq!(
        err,
        LedgerError::ExceedsAvailable {
            memo_id: memo,
            requested: money("25.00"),
            available: money("20.00"),
        }
    );

    fx.apply(second, memo, "20.00").await.unwrap();
    let available = fx
        .credits
        .available_credits_for_invoice(&ctx(), BUILDING, second)
        .await
        .unwrap();
    assert!(available.is_empty());
}

#[tokio::test]
async fn test_application_does_not_touch_ledger() {
    let fx = Fixture::new().await;
    let invoice_id = fx.invoice_for(CUSTOMER).await;
    let memo = fx.memo_for(CUSTOMER, "50.00").await;
    let before = fx.posting.store().snapshot().await;

    fx.apply(invoice_id, memo, "10.00").await.unwrap();

    let after = fx.posting.store().snapshot().await;
    assert_eq!(before.transactions, after.transactions);
    assert_eq!(before.splits, after.splits);
    assert_eq!(after.applied_credits.len(), 1);
}

#[tokio::test]
async fn test_customer_mismatch() {
    let fx = Fixture::new().await;
    let invoice_id = fx.invoice_for(OTHER_CUSTOMER).await;
    let memo = fx.memo_for(CUSTOMER, "50.00").await;

    let err = fx.apply(invoice_id, memo, "10.00").await.unwrap_err();
    assert_eq!(
        err,
        LedgerError::CustomerMismatch {
            memo_id: memo,
            memo_customer: CUSTOMER,
            invoice_id,
            invoice_customer: OTHER_CUSTOMER,
        }
    );
    assert!(fx.posting.store().snapshot().await.applied_credits.is_empty());
}

#[tokio::test]
async fn test_non_positive_amount_is_rejected() {
    let fx = Fixture::new().await;
    let invoice_id = fx.invoice_for(CUSTOMER).await;
    let memo = fx.memo_for(CUSTOMER, "50.00").await;

    let err = fx.apply(invoice_id, memo, "0").await.unwrap_err();
    assert_eq!(err.error_code(), "invalid_amount");
}

#[tokio::test]
async fn test_unknown_memo_is_not_found() {
    let fx = Fixture::new().await;
    let invoice_id = fx.invoice_for(CUSTOMER).await;

    let err = fx.apply(invoice_id, DocumentId::new(9_999), "1.00").await.unwrap_err();
    assert_eq!(err.error_code(), "not_found");
}

#[tokio::test]
async fn test_memo_cannot_shrink_below_applied() {
    let fx = Fixture::new().await;
    let invoice_id = fx.invoice_for(CUSTOMER).await;
    let memo = fx.memo_for(CUSTOMER, "50.00").await;
    fx.apply(invoice_id, memo, "30.00").await.unwrap();

    let err = fx
        .posting
        .update::<CreditMemoPoster>(&ctx(), BUILDING, memo, credit_memo(CUSTOMER, "20.00"))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        LedgerError::ExceedsApplied {
            memo_id: memo,
            amount: money("20.00"),
            applied: money("30.00"),
        }
    );

    fx.posting
        .update::<CreditMemoPoster>(&ctx(), BUILDING, memo, credit_memo(CUSTOMER, "30.00"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_void_releases_credit() {
    let fx = Fixture::new().await;
    let invoice_id = fx.invoice_for(CUSTOMER).await;
    let memo = fx.memo_for(CUSTOMER, "50.00").await;
    let applied = fx.apply(invoice_id, memo, "50.00").await.unwrap();

    let err = fx
        .posting
        .void::<CreditMemoPoster>(&ctx(), BUILDING, memo)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "exceeds_applied");

    let voided = fx
        .credits
        .void_applied_credit(&ctx(), BUILDING, applied.id)
        .await
        .unwrap();
    assert_eq!(voided.status, Status::Void);

    let listed = fx
        .credits
        .applied_credits(&ctx(), BUILDING, invoice_id)
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].status, Status::Void);

    fx.apply(invoice_id, memo, "50.00").await.unwrap();
}

#[tokio::test]
async fn test_invoice_keeps_customer_while_credit_applied() {
    let fx = Fixture::new().await;
    let invoice_id = fx.invoice_for(CUSTOMER).await;
    let memo = fx.memo_for(CUSTOMER, "50.00").await;
    let applied = fx.apply(invoice_id, memo, "30.00").await.unwrap();

    let mut moved = invoice(vec![item_line(RENT_ITEM, "2", "50")]);
    moved.customer_id = OTHER_CUSTOMER;
    let err = fx
        .posting
        .update::<InvoicePoster>(&ctx(), BUILDING, invoice_id, moved.clone())
        .await
        .unwrap_err();
    assert!(matches!(&err, LedgerError::InvalidPayload { field, .. } if field == "customer_id"));

    let listed = fx
        .credits
        .applied_credits(&ctx(), BUILDING, invoice_id)
        .await
        .unwrap();
    assert_eq!(listed, vec![applied.clone()]);

    fx.posting
        .update::<InvoicePoster>(
            &ctx(),
            BUILDING,
            invoice_id,
            invoice(vec![item_line(RENT_ITEM, "3", "50")]),
        )
        .await
        .unwrap();

    fx.credits
        .void_applied_credit(&ctx(), BUILDING, applied.id)
        .await
        .unwrap();
    let updated = fx
        .posting
        .update::<InvoicePoster>(&ctx(), BUILDING, invoice_id, moved)
        .await
        .unwrap();
    assert_eq!(updated.record.body.customer_id, OTHER_CUSTOMER);
}

#[tokio::test]
async fn test_invoice_void_releases_applied_credit() {
    let fx = Fixture::new().await;
    let invoice_id = fx.invoice_for(CUSTOMER).await;
    let memo = fx.memo_for(CUSTOMER, "50.00").await;
    fx.apply(invoice_id, memo, "30.00").await.unwrap();

    fx.posting
        .void::<InvoicePoster>(&ctx(), BUILDING, invoice_id)
        .await
        .unwrap();

    let listed = fx
        .credits
        .applied_credits(&ctx(), BUILDING, invoice_id)
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].status, Status::Void);

    let fresh = fx.invoice_for(CUSTOMER).await;
    let available = fx
        .credits
        .available_credits_for_invoice(&ctx(), BUILDING, fresh)
        .await
        .unwrap();
    assert_eq!(available.len(), 1);
    assert_eq!(available[0].available, money("50.00"));
    fx.apply(fresh, memo, "50.00").await.unwrap();
}

#[tokio::test]
async fn test_invoice_with_payments_cannot_be_voided_or_rehomed() {
    let fx = Fixture::new().await;
    let invoice_id = fx.invoice_for(CUSTOMER).await;
    let payment = fx
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

    let err = fx
        .posting
        .void::<InvoicePoster>(&ctx(), BUILDING, invoice_id)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "invalid_payload");

    let mut rehomed = invoice(vec![item_line(RENT_ITEM, "2", "50")]);
    rehomed.ar_account_id = DEPOSITS;
    let err = fx
        .posting
        .update::<InvoicePoster>(&ctx(), BUILDING, invoice_id, rehomed)
        .await
        .unwrap_err();
    assert!(
        matches!(&err, LedgerError::InvalidPayload { field, .. } if field == "ar_account_id")
    );

    fx.posting
        .void::<InvoicePaymentPoster>(&ctx(), BUILDING, payment.record.id)
        .await
        .unwrap();
    let voided = fx
        .posting
        .void::<InvoicePoster>(&ctx(), BUILDING, invoice_id)
        .await
        .unwrap();
    assert_eq!(voided.status, Status::Void);
}

#[tokio::test]
async fn test_invoice_balance_counts_active_payments_and_credits() {
    let fx = Fixture::new().await;
    let invoice_id = fx.invoice_for(CUSTOMER).await;
    let memo = fx.memo_for(CUSTOMER, "50.00").await;

    let payment = InvoicePaymentPayload {
        building_id: BUILDING,
        invoice_id,
        asset_account_id: BANK,
        date: date(2025, 1, 20),
        reference_number: "RCPT-1".to_string(),
        memo: None,
        amount: money("40.00"),
    };
    fx.posting
        .create::<InvoicePaymentPoster>(&ctx(), payment.clone())
        .await
        .unwrap();
    let voided = fx
        .posting
        .create::<InvoicePaymentPoster>(&ctx(), payment)
        .await
        .unwrap();
    fx.posting
        .void::<InvoicePaymentPoster>(&ctx(), BUILDING, voided.record.id)
        .await
        .unwrap();
    fx.apply(invoice_id, memo, "30.00").await.unwrap();

    let balance = fx
        .credits
        .invoice_balance(&ctx(), BUILDING, invoice_id)
        .await
        .unwrap();
    assert_eq!(
        balance,
        InvoiceBalance {
            invoice_id,
            total: money("100.00"),
            payments: money("40.00"),
            credits: money("30.00"),
            outstanding: money("30.00"),
        }
    );
}

#[tokio::test]
async fn test_other_building_invoice_is_not_found() {
    let fx = Fixture::new().await;
    let invoice_id = fx.invoice_for(CUSTOMER).await;

    let err = fx
        .credits
        .invoice_balance(&ctx(), OTHER_BUILDING, invoice_id)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "not_found");
}
