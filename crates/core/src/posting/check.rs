//! Check posting (direct disbursement).
//!
//! Debit the bank account for the check total, then credit each expense
//! line's account for that line's own amount.

use crate::ledger::{Attribution, LedgerResult, SplitSet, TransactionHeader, TransactionKind};

use super::{
    CheckPayload, Document, DocumentPoster, Lookup, Posting, Record, References,
    checked_total, require_lines, require_positive,
};

/// Poster for checks.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckPoster;

impl DocumentPoster for CheckPoster {
    type Payload = CheckPayload;

    const KIND: TransactionKind = TransactionKind::Check;

    fn header(payload: &CheckPayload) -> TransactionHeader {
        TransactionHeader {
            building_id: payload.building_id,
            unit_id: payload.unit_id,
            date: payload.date,
            reference_number: payload.reference_number.clone(),
            memo: payload.memo.clone(),
        }
    }

    fn references(payload: &CheckPayload) -> References {
        References::new()
            .account(payload.bank_account_id)
            .accounts(payload.lines.iter().map(|line| line.account_id))
    }

    fn validate(payload: &CheckPayload) -> LedgerResult<()> {
        require_lines(&payload.lines)?;
        for (index, line) in payload.lines.iter().enumerate() {
            require_positive(format!("lines[{index}].amount"), line.amount)?;
        }
        Ok(())
    }

    fn generate_splits(payload: &CheckPayload, lookup: &Lookup) -> LedgerResult<Posting> {
        let header = Attribution::new(payload.unit_id, payload.payee_id);
        lookup.account(payload.bank_account_id)?;

        let total = checked_total("total", payload.lines.iter().map(|line| line.amount))?;
        let mut splits = SplitSet::new();
        splits.debit(payload.bank_account_id, total, header);
        for line in &payload.lines {
            lookup.account(line.account_id)?;
            splits.credit(line.account_id, line.amount, line.attribution(header));
        }
        Ok(Posting { splits, total })
    }

    fn into_document(record: Record<CheckPayload>) -> Document {
        Document::Check(record)
    }

    fn from_document(document: Document) -> Option<Record<CheckPayload>> {
        match document {
            Document::Check(record) => Some(record),
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
    fn test_each_line_credited_for_its_own_amount() {
        let payload = check(vec![
            account_line(REPAIRS, "25.00"),
            account_line(UTILITIES, "75.00"),
        ]);
        let posting = CheckPoster::generate_splits(&payload, &lookup()).unwrap();

        assert_eq!(
            drafts(&posting.splits),
            vec![
                (BANK, Side::Debit, money("100.00")),
                (REPAIRS, Side::Credit, money("25.00")),
                (UTILITIES, Side::Credit, money("75.00")),
            ]
        );
        let totals = posting.splits.ensure_balanced().unwrap();
        assert_eq!(totals.credit, money("100.00"));
    }
}
