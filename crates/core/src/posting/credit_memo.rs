//! Credit memo posting.
//!
//! Debit the liability account and credit the deposit (asset) account for
//! the memo amount. The memo also funds a pool of available credit that
//! invoices draw on through applied credits, so an update may not shrink
//! the memo below what is already applied, and a memo with active
//! applications cannot be voided.

use async_trait::async_trait;
use rentledger_shared::types::Cents;

use crate::credit::applied_sum;
use crate::ledger::{
    Attribution, LedgerError, LedgerResult, SplitSet, TransactionHeader, TransactionKind,
};
use crate::store::Scope;

use super::{
    CreditMemoPayload, Document, DocumentPoster, Lookup, Posting, Record, References,
    require_positive,
};

/// Poster for customer credit memos.
#[derive(Debug, Clone, Copy, Default)]
pub struct CreditMemoPoster;

#[async_trait]
impl DocumentPoster for CreditMemoPoster {
    type Payload = CreditMemoPayload;

    const KIND: TransactionKind = TransactionKind::CreditMemo;

    fn header(payload: &CreditMemoPayload) -> TransactionHeader {
        TransactionHeader {
            building_id: payload.building_id,
            unit_id: payload.unit_id,
            date: payload.date,
            reference_number: payload.reference_number.clone(),
            memo: payload.memo.clone(),
        }
    }

    fn references(payload: &CreditMemoPayload) -> References {
        References::new()
            .account(payload.liability_account_id)
            .account(payload.deposit_account_id)
    }

    fn validate(payload: &CreditMemoPayload) -> LedgerResult<()> {
        require_positive("amount", payload.amount)
    }

    fn generate_splits(payload: &CreditMemoPayload, lookup: &Lookup) -> LedgerResult<Posting> {
        let attribution = Attribution::new(payload.unit_id, Some(payload.customer_id));
        lookup.account(payload.liability_account_id)?;
        lookup.account(payload.deposit_account_id)?;

        let mut splits = SplitSet::new();
        splits.debit(payload.liability_account_id, payload.amount, attribution);
        splits.credit(payload.deposit_account_id, payload.amount, attribution);
        Ok(Posting {
            splits,
            total: payload.amount,
        })
    }

    fn into_document(record: Record<CreditMemoPayload>) -> Document {
        Document::CreditMemo(record)
    }

    fn from_document(document: Document) -> Option<Record<CreditMemoPayload>> {
        match document {
            Document::CreditMemo(record) => Some(record),
            _ => None,
        }
    }

    async fn before_update<Sc: Scope>(
        scope: &mut Sc,
        previous: &Record<CreditMemoPayload>,
        next: &CreditMemoPayload,
    ) -> LedgerResult<()> {
        scope.lock_credit_memo(previous.id).await?;
        let applied = applied_sum(scope, previous.id).await?;
        if next.amount < applied {
            return Err(LedgerError::ExceedsApplied {
                memo_id: previous.id,
                amount: next.amount,
                applied,
            });
        }
        if next.customer_id != previous.body.customer_id && applied.is_positive() {
            return Err(LedgerError::invalid_payload(
                "customer_id",
                format!(
                    "credit memo {} has applications and cannot change customer",
                    previous.id
                ),
            ));
        }
        Ok(())
    }

    async fn before_void<Sc: Scope>(
        scope: &mut Sc,
        previous: &Record<CreditMemoPayload>,
    ) -> LedgerResult<()> {
        scope.lock_credit_memo(previous.id).await?;
        let applied = applied_sum(scope, previous.id).await?;
        if applied.is_positive() {
            return Err(LedgerError::ExceedsApplied {
                memo_id: previous.id,
                amount: Cents::ZERO,
                applied,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Side;
    use crate::testing::*;

    #[test]
    fn test_memo_debits_liability_and_credits_deposit_account() {
        let payload = credit_memo(CUSTOMER, "50.00");
        let posting = CreditMemoPoster::generate_splits(&payload, &lookup()).unwrap();
        assert_eq!(
            drafts(&posting.splits),
            vec![
                (DEPOSITS, Side::Debit, money("50.00")),
                (BANK, Side::Credit, money("50.00")),
            ]
        );
        assert_eq!(posting.total, money("50.00"));
    }

    #[test]
    fn test_zero_memo_is_rejected() {
        let payload = credit_memo(CUSTOMER, "0.00");
        assert_eq!(
            CreditMemoPoster::validate(&payload).unwrap_err().error_code(),
            "invalid_amount"
        );
    }
}
