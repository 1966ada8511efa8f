//! Settlement posting: invoice payments and bill payments.

use crate::ledger::{Attribution, LedgerResult, SplitSet, TransactionHeader, TransactionKind};

use super::{
    BillPaymentPayload, Document, DocumentPoster, InvoicePaymentPayload, Lookup, Posting,
    Record, References, require_positive,
};

// ============================================================================
// Invoice payments
// ============================================================================

/// Poster for payments received against an invoice.
///
/// Debit the receiving asset account and credit the invoice's receivable
/// account. Unit and customer come from the invoice.
#[derive(Debug, Clone, Copy, Default)]
pub struct InvoicePaymentPoster;

impl DocumentPoster for InvoicePaymentPoster {
    type Payload = InvoicePaymentPayload;

    const KIND: TransactionKind = TransactionKind::Payment;

    fn header(payload: &InvoicePaymentPayload) -> TransactionHeader {
        TransactionHeader {
            building_id: payload.building_id,
            unit_id: None,
            date: payload.date,
            reference_number: payload.reference_number.clone(),
            memo: payload.memo.clone(),
        }
    }

    fn references(payload: &InvoicePaymentPayload) -> References {
        References::new()
            .account(payload.asset_account_id)
            .invoice(payload.invoice_id)
    }

    fn validate(payload: &InvoicePaymentPayload) -> LedgerResult<()> {
        require_positive("amount", payload.amount)
    }

    fn generate_splits(
        payload: &InvoicePaymentPayload,
        lookup: &Lookup,
    ) -> LedgerResult<Posting> {
        let invoice = &lookup.invoice()?.body;
        let attribution = Attribution::new(invoice.unit_id, Some(invoice.customer_id));
        lookup.account(payload.asset_account_id)?;
        lookup.account(invoice.ar_account_id)?;

        let mut splits = SplitSet::new();
        splits.debit(payload.asset_account_id, payload.amount, attribution);
        splits.credit(invoice.ar_account_id, payload.amount, attribution);
        Ok(Posting {
            splits,
            total: payload.amount,
        })
    }

    fn into_document(record: Record<InvoicePaymentPayload>) -> Document {
        Document::InvoicePayment(record)
    }

    fn from_document(document: Document) -> Option<Record<InvoicePaymentPayload>> {
        match document {
            Document::InvoicePayment(record) => Some(record),
            _ => None,
        }
    }
}

// ============================================================================
// Bill payments
// ============================================================================

/// Poster for payments made against a bill.
///
/// Debit the bill's payable account and credit the paying asset account.
#[derive(Debug, Clone, Copy, Default)]
pub struct BillPaymentPoster;

impl DocumentPoster for BillPaymentPoster {
    type Payload = BillPaymentPayload;

    const KIND: TransactionKind = TransactionKind::BillPayment;

    fn header(payload: &BillPaymentPayload) -> TransactionHeader {
        TransactionHeader {
            building_id: payload.building_id,
            unit_id: None,
            date: payload.date,
            reference_number: payload.reference_number.clone(),
            memo: payload.memo.clone(),
        }
    }

    fn references(payload: &BillPaymentPayload) -> References {
        References::new()
            .account(payload.asset_account_id)
            .bill(payload.bill_id)
    }

    fn validate(payload: &BillPaymentPayload) -> LedgerResult<()> {
        require_positive("amount", payload.amount)
    }

    fn generate_splits(payload: &BillPaymentPayload, lookup: &Lookup) -> LedgerResult<Posting> {
        let bill = &lookup.bill()?.body;
        let attribution = Attribution::new(bill.unit_id, bill.vendor_id);
        lookup.account(payload.asset_account_id)?;
        lookup.account(bill.ap_account_id)?;

        let mut splits = SplitSet::new();
        splits.debit(bill.ap_account_id, payload.amount, attribution);
        splits.credit(payload.asset_account_id, payload.amount, attribution);
        Ok(Posting {
            splits,
            total: payload.amount,
        })
    }

    fn into_document(record: Record<BillPaymentPayload>) -> Document {
        Document::BillPayment(record)
    }

    fn from_document(document: Document) -> Option<Record<BillPaymentPayload>> {
        match document {
            Document::BillPayment(record) => Some(record),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use rentledger_shared::types::{DocumentId, TransactionId};

    use super::*;
    use crate::ledger::{Side, Status};
    use crate::testing::*;

    fn record<P>(body: P) -> Record<P> {
        Record {
            id: DocumentId::new(1),
            transaction_id: TransactionId::new(1),
            status: Status::Active,
            total: money("100.00"),
            body,
        }
    }

    #[test]
    fn test_invoice_payment_settles_receivable() {
        let mut inv = invoice(vec![item_line(RENT_ITEM, "2", "50")]);
        inv.unit_id = Some(UNIT);
        let mut lookup = lookup();
        lookup.set_invoice(record(inv));

        let payload = InvoicePaymentPayload {
            building_id: BUILDING,
            invoice_id: DocumentId::new(1),
            asset_account_id: BANK,
            date: date(2025, 1, 20),
            reference_number: "PMT-1".to_string(),
            memo: None,
            amount: money("40.00"),
        };
        let posting = InvoicePaymentPoster::generate_splits(&payload, &lookup).unwrap();

        assert_eq!(
            drafts(&posting.splits),
            vec![
                (BANK, Side::Debit, money("40.00")),
                (AR, Side::Credit, money("40.00")),
            ]
        );
        for draft in posting.splits.drafts() {
            assert_eq!(draft.attribution.unit_id, Some(UNIT));
            assert_eq!(draft.attribution.person_id, Some(CUSTOMER));
        }
    }

    #[test]
    fn test_bill_payment_settles_payable() {
        let mut lookup = lookup();
        lookup.set_bill(record(bill(vec![account_line(REPAIRS, "100.00")])));

        let payload = BillPaymentPayload {
            building_id: BUILDING,
            bill_id: DocumentId::new(1),
            asset_account_id: BANK,
            date: date(2025, 1, 25),
            reference_number: "CHK-7".to_string(),
            memo: None,
            amount: money("60.00"),
        };
        let posting = BillPaymentPoster::generate_splits(&payload, &lookup).unwrap();

        assert_eq!(
            drafts(&posting.splits),
            vec![
                (AP, Side::Debit, money("60.00")),
                (BANK, Side::Credit, money("60.00")),
            ]
        );
    }

    #[test]
    fn test_payment_without_resolved_invoice_is_rejected() {
        let payload = InvoicePaymentPayload {
            building_id: BUILDING,
            invoice_id: DocumentId::new(1),
            asset_account_id: BANK,
            date: date(2025, 1, 20),
            reference_number: "PMT-1".to_string(),
            memo: None,
            amount: money("40.00"),
        };
        assert!(InvoicePaymentPoster::generate_splits(&payload, &lookup()).is_err());
    }
}
