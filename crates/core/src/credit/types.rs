//! Credit application types.

use chrono::NaiveDate;
use rentledger_shared::types::{AppliedCreditId, BuildingId, Cents, DocumentId};
use serde::{Deserialize, Serialize};

use crate::ledger::Status;

/// Application row to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAppliedCredit {
    /// Owning building.
    pub building_id: BuildingId,
    /// Invoice credited.
    pub invoice_id: DocumentId,
    /// Memo drawn on.
    pub credit_memo_id: DocumentId,
    /// Amount applied.
    pub amount: Cents,
    /// Application date.
    pub date: NaiveDate,
    /// Free text.
    pub description: Option<String>,
}

/// Stored application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedCredit {
    /// Application ID.
    pub id: AppliedCreditId,
    /// Owning building.
    pub building_id: BuildingId,
    /// Invoice credited.
    pub invoice_id: DocumentId,
    /// Memo drawn on.
    pub credit_memo_id: DocumentId,
    /// Amount applied.
    pub amount: Cents,
    /// Application date.
    pub date: NaiveDate,
    /// Free text.
    pub description: Option<String>,
    /// Void applications release their amount back to the memo.
    pub status: Status,
}

/// Request to apply part of a memo to an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyCredit {
    /// Memo drawn on.
    pub credit_memo_id: DocumentId,
    /// Amount to apply.
    pub amount: Cents,
    /// Application date.
    pub date: NaiveDate,
    /// Free text.
    #[serde(default)]
    pub description: Option<String>,
}

/// A memo with credit left for an invoice's customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailableCredit {
    /// The memo.
    pub credit_memo_id: DocumentId,
    /// Memo number.
    pub reference_number: String,
    /// Memo date.
    pub date: NaiveDate,
    /// Memo amount.
    pub memo_amount: Cents,
    /// Sum of active applications on any invoice.
    pub applied_sum: Cents,
    /// `memo_amount - applied_sum`.
    pub available: Cents,
}

/// Paid progress of an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceBalance {
    /// The invoice.
    pub invoice_id: DocumentId,
    /// Invoice total.
    pub total: Cents,
    /// Active payments received.
    pub payments: Cents,
    /// Active credits applied.
    pub credits: Cents,
    /// `total - payments - credits`. Negative when overpaid.
    pub outstanding: Cents,
}
