//! Credit memo applications.
//!
//! An application links an invoice to a credit memo of the same customer
//! for part of the memo's amount. Applications never touch the ledger; they
//! only feed an invoice's paid progress and the memo's remaining credit.

pub mod service;
pub mod types;

#[cfg(test)]
mod tests;

use rentledger_shared::types::{Cents, DocumentId};

use crate::ledger::LedgerResult;
use crate::store::Scope;

pub use service::CreditService;
pub use types::{AppliedCredit, ApplyCredit, AvailableCredit, InvoiceBalance, NewAppliedCredit};

/// Sum of the active applications drawing on a memo.
pub(crate) async fn applied_sum<Sc: Scope>(scope: &mut Sc, memo_id: DocumentId) -> LedgerResult<Cents> {
    Ok(scope
        .applied_credits_for_memo(memo_id)
        .await?
        .iter()
        .filter(|credit| credit.status.is_active())
        .map(|credit| credit.amount)
        .sum())
}
