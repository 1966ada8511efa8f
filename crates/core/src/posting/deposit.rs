//! Deposit posting.
//!
//! Debit the bank account for the deposit total and credit each source
//! line's account for its amount.

use crate::ledger::{Attribution, LedgerResult, SplitSet, TransactionHeader, TransactionKind};

use super::{
    DepositPayload, Document, DocumentPoster, Lookup, Posting, Record, References,
    checked_total, require_lines, require_positive,
};

/// Poster for bank deposits.
#[derive(Debug, Clone, Copy, Default)]
pub struct DepositPoster;

impl DocumentPoster for DepositPoster {
    type Payload = DepositPayload;

    const KIND: TransactionKind = TransactionKind::Deposit;

    fn header(payload: &DepositPayload) -> TransactionHeader {
        TransactionHeader {
            building_id: payload.building_id,
            unit_id: payload.unit_id,
            date: payload.date,
            reference_number: payload.reference_number.clone(),
            memo: payload.memo.clone(),
        }
    }

    fn references(payload: &DepositPayload) -> References {
        References::new()
            .account(payload.bank_account_id)
            .accounts(payload.lines.iter().map(|line| line.account_id))
    }

    fn validate(payload: &DepositPayload) -> LedgerResult<()> {
        require_lines(&payload.lines)?;
        for (index, line) in payload.lines.iter().enumerate() {
            require_positive(format!("lines[{index}].amount"), line.amount)?;
        }
        Ok(())
    }

    fn generate_splits(payload: &DepositPayload, lookup: &Lookup) -> LedgerResult<Posting> {
        let header = Attribution::new(payload.unit_id, None);
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

    fn into_document(record: Record<DepositPayload>) -> Document {
        Document::Deposit(record)
    }

    fn from_document(document: Document) -> Option<Record<DepositPayload>> {
        match document {
            Document::Deposit(record) => Some(record),
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
    fn test_deposit_debits_bank_for_total() {
        let mut line = account_line(INCOME, "40.00");
        line.person_id = Some(CUSTOMER);
        let payload = DepositPayload {
            building_id: BUILDING,
            unit_id: Some(UNIT),
            bank_account_id: BANK,
            date: date(2025, 1, 31),
            reference_number: "DEP-1".to_string(),
            memo: None,
            lines: vec![line, account_line(EQUITY, "60.00")],
        };
        let posting = DepositPoster::generate_splits(&payload, &lookup()).unwrap();

        assert_eq!(
            drafts(&posting.splits),
            vec![
                (BANK, Side::Debit, money("100.00")),
                (INCOME, Side::Credit, money("40.00")),
                (EQUITY, Side::Credit, money("60.00")),
            ]
        );
        assert_eq!(posting.splits.drafts()[1].attribution.person_id, Some(CUSTOMER));
        assert_eq!(posting.splits.drafts()[2].attribution.unit_id, Some(UNIT));
    }
}
