//! Sales receipt posting (cash sale, no receivable).
//!
//! Debit the deposit account for the receipt total. Item lines net per
//! income account the same way invoice lines do. Payment items have no
//! income account and are rejected.

use crate::ledger::{
    Attribution, ItemKind, LedgerError, LedgerResult, NetAccumulator, SplitSet,
    TransactionHeader, TransactionKind,
};

use super::{
    Document, DocumentPoster, Lookup, Posting, Record, References, SalesReceiptPayload,
    require_lines, require_positive,
};

/// Poster for sales receipts.
#[derive(Debug, Clone, Copy, Default)]
pub struct SalesReceiptPoster;

impl DocumentPoster for SalesReceiptPoster {
    type Payload = SalesReceiptPayload;

    const KIND: TransactionKind = TransactionKind::Receipt;

    fn header(payload: &SalesReceiptPayload) -> TransactionHeader {
        TransactionHeader {
            building_id: payload.building_id,
            unit_id: payload.unit_id,
            date: payload.date,
            reference_number: payload.reference_number.clone(),
            memo: payload.memo.clone(),
        }
    }

    fn references(payload: &SalesReceiptPayload) -> References {
        References::new()
            .account(payload.deposit_account_id)
            .items(payload.lines.iter().map(|line| line.item_id))
    }

    fn validate(payload: &SalesReceiptPayload) -> LedgerResult<()> {
        require_lines(&payload.lines)?;
        for (index, line) in payload.lines.iter().enumerate() {
            line.total(index)?;
        }
        Ok(())
    }

    fn generate_splits(payload: &SalesReceiptPayload, lookup: &Lookup) -> LedgerResult<Posting> {
        let attribution = Attribution::new(payload.unit_id, payload.customer_id);

        let mut nets = NetAccumulator::new();
        for (index, line) in payload.lines.iter().enumerate() {
            let amount = line.total(index)?;
            let item = lookup.item(line.item_id)?;
            match item.kind {
                ItemKind::Service { income_account_id } => {
                    nets.credit(income_account_id, amount)?;
                }
                ItemKind::Discount { income_account_id } => {
                    nets.debit(income_account_id, amount)?;
                }
                ItemKind::Payment { .. } => {
                    return Err(LedgerError::UnsupportedItemType {
                        item_id: item.id,
                        item_type: "payment".to_string(),
                    });
                }
            }
        }

        let total = nets.total()?;
        require_positive("total", total)?;

        let mut splits = SplitSet::new();
        splits.debit(payload.deposit_account_id, total, attribution);
        nets.emit_into(&mut splits, attribution);
        Ok(Posting { splits, total })
    }

    fn into_document(record: Record<SalesReceiptPayload>) -> Document {
        Document::SalesReceipt(record)
    }

    fn from_document(document: Document) -> Option<Record<SalesReceiptPayload>> {
        match document {
            Document::SalesReceipt(record) => Some(record),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Side;
    use crate::posting::ItemLine;
    use crate::testing::*;

    fn receipt(lines: Vec<ItemLine>) -> SalesReceiptPayload {
        SalesReceiptPayload {
            building_id: BUILDING,
            customer_id: None,
            unit_id: None,
            deposit_account_id: BANK,
            date: date(2025, 1, 18),
            reference_number: "SR-1".to_string(),
            memo: None,
            lines,
        }
    }

    #[test]
    fn test_receipt_debits_deposit_account() {
        let payload = receipt(vec![
            item_line(RENT_ITEM, "1", "30"),
            item_line(RENT_ITEM, "1", "20"),
        ]);
        let posting = SalesReceiptPoster::generate_splits(&payload, &lookup()).unwrap();
        assert_eq!(
            drafts(&posting.splits),
            vec![
                (BANK, Side::Debit, money("50.00")),
                (INCOME, Side::Credit, money("50.00")),
            ]
        );
    }

    #[test]
    fn test_payment_item_is_unsupported() {
        let payload = receipt(vec![item_line(PASS_THROUGH_ITEM, "1", "30")]);
        let err = SalesReceiptPoster::generate_splits(&payload, &lookup()).unwrap_err();
        assert_eq!(err.error_code(), "unsupported_item_type");
    }
}
