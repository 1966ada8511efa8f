//! Invoice posting (A/R side of sales).
//!
//! Debit the receivable account for the invoice total. Item lines are
//! netted per account: service lines credit their income account, discount
//! lines debit it, payment lines credit their asset account. One split is
//! written per account with a nonzero net. The customer and the header unit
//! are attributed to every split.
//!
//! Applied credits and payments point at an invoice, so an update may not
//! move the invoice to another customer while credits are applied, nor to
//! another receivable account while payments are recorded. Voiding an
//! invoice with active payments fails; voiding one with applied credits
//! voids those applications and releases the credit back to its memos.

use async_trait::async_trait;
use rentledger_shared::types::DocumentId;
use tracing::info;

use crate::credit::AppliedCredit;
use crate::ledger::{
    Attribution, ItemKind, LedgerError, LedgerResult, NetAccumulator, SplitSet,
    TransactionHeader, TransactionKind,
};
use crate::store::Scope;

use super::{
    Document, DocumentPoster, InvoicePayload, Lookup, Posting, Record, References,
    require_lines, require_positive,
};

/// Poster for customer invoices.
#[derive(Debug, Clone, Copy, Default)]
pub struct InvoicePoster;

async fn active_applications<Sc: Scope>(
    scope: &mut Sc,
    invoice_id: DocumentId,
) -> LedgerResult<Vec<AppliedCredit>> {
    let mut credits = scope.applied_credits_for_invoice(invoice_id).await?;
    credits.retain(|credit| credit.status.is_active());
    Ok(credits)
}

async fn has_active_payments<Sc: Scope>(
    scope: &mut Sc,
    invoice_id: DocumentId,
) -> LedgerResult<bool> {
    Ok(scope
        .payments_for_invoice(invoice_id)
        .await?
        .iter()
        .any(|payment| payment.status.is_active()))
}

#[async_trait]
impl DocumentPoster for InvoicePoster {
    type Payload = InvoicePayload;

    const KIND: TransactionKind = TransactionKind::Invoice;

    fn header(payload: &InvoicePayload) -> TransactionHeader {
        TransactionHeader {
            building_id: payload.building_id,
            unit_id: payload.unit_id,
            date: payload.date,
            reference_number: payload.reference_number.clone(),
            memo: payload.memo.clone(),
        }
    }

    fn references(payload: &InvoicePayload) -> References {
        References::new()
            .account(payload.ar_account_id)
            .items(payload.lines.iter().map(|line| line.item_id))
    }

    fn validate(payload: &InvoicePayload) -> LedgerResult<()> {
        require_lines(&payload.lines)?;
        for (index, line) in payload.lines.iter().enumerate() {
            line.total(index)?;
        }
        Ok(())
    }

    fn generate_splits(payload: &InvoicePayload, lookup: &Lookup) -> LedgerResult<Posting> {
        let attribution = Attribution::new(payload.unit_id, Some(payload.customer_id));

        let mut nets = NetAccumulator::new();
        for (index, line) in payload.lines.iter().enumerate() {
            let amount = line.total(index)?;
            match lookup.item(line.item_id)?.kind {
                ItemKind::Service { income_account_id } => {
                    nets.credit(income_account_id, amount)?;
                }
                ItemKind::Discount { income_account_id } => {
                    nets.debit(income_account_id, amount)?;
                }
                ItemKind::Payment { asset_account_id } => {
                    nets.credit(asset_account_id, amount)?;
                }
            }
        }

        let total = nets.total()?;
        require_positive("total", total)?;

        let mut splits = SplitSet::new();
        splits.debit(payload.ar_account_id, total, attribution);
        nets.emit_into(&mut splits, attribution);
        Ok(Posting { splits, total })
    }

    fn into_document(record: Record<InvoicePayload>) -> Document {
        Document::Invoice(record)
    }

    fn from_document(document: Document) -> Option<Record<InvoicePayload>> {
        match document {
            Document::Invoice(record) => Some(record),
            _ => None,
        }
    }

    async fn before_update<Sc: Scope>(
        scope: &mut Sc,
        previous: &Record<InvoicePayload>,
        next: &InvoicePayload,
    ) -> LedgerResult<()> {
        if next.customer_id != previous.body.customer_id
            && !active_applications(scope, previous.id).await?.is_empty()
        {
            return Err(LedgerError::invalid_payload(
                "customer_id",
                format!(
                    "invoice {} has applied credits and cannot change customer",
                    previous.id
                ),
            ));
        }
        if next.ar_account_id != previous.body.ar_account_id
            && has_active_payments(scope, previous.id).await?
        {
            return Err(LedgerError::invalid_payload(
                "ar_account_id",
                format!(
                    "invoice {} has payments and cannot change receivable account",
                    previous.id
                ),
            ));
        }
        Ok(())
    }

    async fn before_void<Sc: Scope>(
        scope: &mut Sc,
        previous: &Record<InvoicePayload>,
    ) -> LedgerResult<()> {
        if has_active_payments(scope, previous.id).await? {
            return Err(LedgerError::invalid_payload(
                "invoice_id",
                format!("invoice {} has payments; void them first", previous.id),
            ));
        }
        for credit in active_applications(scope, previous.id).await? {
            scope.lock_credit_memo(credit.credit_memo_id).await?;
            scope.void_applied_credit(credit.id).await?;
            info!(
                applied_credit_id = %credit.id,
                invoice_id = %previous.id,
                amount = %credit.amount,
                "applied credit released by invoice void"
            );
        }
        Ok(())
    }
}
