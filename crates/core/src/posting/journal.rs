//! Manual journal posting.
//!
//! Each line is a raw debit or credit. The caller is responsible for
//! balance; the orchestrator's balance check rejects anything else. The
//! declared `total_amount` must be positive but is not compared to the lines.

use crate::ledger::{
    Attribution, LedgerError, LedgerResult, SplitSet, TransactionHeader, TransactionKind,
};

use super::{
    Document, DocumentPoster, JournalPayload, Lookup, Posting, Record, References,
    checked_total, require_lines, require_positive,
};

/// Poster for manual journals.
#[derive(Debug, Clone, Copy, Default)]
pub struct JournalPoster;

impl DocumentPoster for JournalPoster {
    type Payload = JournalPayload;

    const KIND: TransactionKind = TransactionKind::Journal;

    fn header(payload: &JournalPayload) -> TransactionHeader {
        TransactionHeader {
            building_id: payload.building_id,
            unit_id: payload.unit_id,
            date: payload.date,
            reference_number: payload.reference_number.clone(),
            memo: payload.memo.clone(),
        }
    }

    fn references(payload: &JournalPayload) -> References {
        References::new().accounts(payload.lines.iter().map(|line| line.account_id))
    }

    fn validate(payload: &JournalPayload) -> LedgerResult<()> {
        require_positive("total_amount", payload.total_amount)?;
        require_lines(&payload.lines)?;
        for (index, line) in payload.lines.iter().enumerate() {
            match (line.debit, line.credit) {
                (Some(amount), None) => {
                    require_positive(format!("lines[{index}].debit"), amount)?;
                }
                (None, Some(amount)) => {
                    require_positive(format!("lines[{index}].credit"), amount)?;
                }
                _ => {
                    return Err(LedgerError::invalid_payload(
                        format!("lines[{index}]"),
                        "exactly one of debit or credit is required",
                    ));
                }
            }
        }
        Ok(())
    }

    fn generate_splits(payload: &JournalPayload, lookup: &Lookup) -> LedgerResult<Posting> {
        let header = Attribution::new(payload.unit_id, None);
        let mut splits = SplitSet::new();
        for (index, line) in payload.lines.iter().enumerate() {
            lookup.account(line.account_id)?;
            let attribution = Attribution::new(line.unit_id, line.person_id).or(header);
            match (line.debit, line.credit) {
                (Some(amount), None) => splits.debit(line.account_id, amount, attribution),
                (None, Some(amount)) => splits.credit(line.account_id, amount, attribution),
                _ => {
                    return Err(LedgerError::invalid_payload(
                        format!("lines[{index}]"),
                        "exactly one of debit or credit is required",
                    ));
                }
            }
        }
        let total = checked_total("total", payload.lines.iter().filter_map(|line| line.debit))?;
        checked_total("total", payload.lines.iter().filter_map(|line| line.credit))?;
        Ok(Posting { splits, total })
    }

    fn into_document(record: Record<JournalPayload>) -> Document {
        Document::Journal(record)
    }

    fn from_document(document: Document) -> Option<Record<JournalPayload>> {
        match document {
            Document::Journal(record) => Some(record),
            _ => None,
        }
    }
}
