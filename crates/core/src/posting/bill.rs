//! Bill posting (A/P side of purchases).
//!
//! Credit the payable account for the bill total and debit each expense
//! line's account for its amount. Line unit and person override the header.

use crate::ledger::{Attribution, LedgerResult, SplitSet, TransactionHeader, TransactionKind};

use super::{
    BillPayload, Document, DocumentPoster, Lookup, Posting, Record, References,
    checked_total, require_lines, require_positive,
};

/// Poster for vendor bills.
#[derive(Debug, Clone, Copy, Default)]
pub struct BillPoster;

impl DocumentPoster for BillPoster {
    type Payload = BillPayload;

    const KIND: TransactionKind = TransactionKind::Bill;

    fn header(payload: &BillPayload) -> TransactionHeader {
        TransactionHeader {
            building_id: payload.building_id,
            unit_id: payload.unit_id,
            date: payload.date,
            reference_number: payload.reference_number.clone(),
            memo: payload.memo.clone(),
        }
    }

    fn references(payload: &BillPayload) -> References {
        References::new()
            .account(payload.ap_account_id)
            .accounts(payload.lines.iter().map(|line| line.account_id))
    }

    fn validate(payload: &BillPayload) -> LedgerResult<()> {
        require_lines(&payload.lines)?;
        for (index, line) in payload.lines.iter().enumerate() {
            require_positive(format!("lines[{index}].amount"), line.amount)?;
        }
        Ok(())
    }

    fn generate_splits(payload: &BillPayload, lookup: &Lookup) -> LedgerResult<Posting> {
        let header = Attribution::new(payload.unit_id, payload.vendor_id);
        lookup.account(payload.ap_account_id)?;

        let total = checked_total("total", payload.lines.iter().map(|line| line.amount))?;
        let mut splits = SplitSet::new();
        splits.credit(payload.ap_account_id, total, header);
        for line in &payload.lines {
            lookup.account(line.account_id)?;
            splits.debit(line.account_id, line.amount, line.attribution(header));
        }
        Ok(Posting { splits, total })
    }

    fn into_document(record: Record<BillPayload>) -> Document {
        Document::Bill(record)
    }

    fn from_document(document: Document) -> Option<Record<BillPayload>> {
        match document {
            Document::Bill(record) => Some(record),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Side;
    use crate::testing::*;

    #[test]
    fn test_two_expense_lines() {
        let payload = bill(vec![
            account_line(REPAIRS, "30.00"),
            account_line(UTILITIES, "70.00"),
        ]);
        let posting = BillPoster::generate_splits(&payload, &lookup()).unwrap();

        assert_eq!(posting.total, money("100.00"));
        assert_eq!(
            drafts(&posting.splits),
            vec![
                (AP, Side::Credit, money("100.00")),
                (REPAIRS, Side::Debit, money("30.00")),
                (UTILITIES, Side::Debit, money("70.00")),
            ]
        );
        posting.splits.ensure_balanced().unwrap();
    }

    #[test]
    fn test_line_attribution_overrides_header() {
        let mut line = account_line(REPAIRS, "30.00");
        line.unit_id = Some(UNIT);
        line.person_id = Some(CUSTOMER);
        let payload = bill(vec![line]);
        let posting = BillPoster::generate_splits(&payload, &lookup()).unwrap();

        let [ap, expense] = posting.splits.drafts() else {
            panic!("expected two splits");
        };
        assert_eq!(ap.attribution.person_id, Some(VENDOR));
        assert_eq!(ap.attribution.unit_id, None);
        assert_eq!(expense.attribution.person_id, Some(CUSTOMER));
        assert_eq!(expense.attribution.unit_id, Some(UNIT));
    }

    #[test]
    fn test_zero_line_is_rejected() {
        let payload = bill(vec![account_line(REPAIRS, "0")]);
        let err = BillPoster::validate(&payload).unwrap_err();
        assert_eq!(err.error_code(), "invalid_amount");
        assert!(err.to_string().contains("lines[0].amount"));
    }
}
