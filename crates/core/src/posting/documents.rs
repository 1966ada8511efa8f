//! Business document payloads and the stored document envelope.

use chrono::NaiveDate;
use rentledger_shared::types::money::line_total_cents;
use rentledger_shared::types::{
    AccountId, BuildingId, Cents, DocumentId, ItemId, MoneyError, PersonId, Scaled5,
    TransactionId, UnitId,
};
use serde::{Deserialize, Serialize};

use crate::ledger::{Attribution, LedgerError, LedgerResult, Status, TransactionKind};

// ============================================================================
// Line shapes
// ============================================================================

/// Invoice or sales receipt line: an item times a quantity at a rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemLine {
    /// Catalog item.
    pub item_id: ItemId,
    /// Free text.
    pub description: Option<String>,
    /// Quantity, 5-decimal scaled.
    #[serde(deserialize_with = "rentledger_shared::types::money::deserialize_quantity")]
    pub quantity: Scaled5,
    /// Unit price, 5-decimal scaled.
    pub rate: Scaled5,
}

impl ItemLine {
    /// `quantity * rate` in cents.
    ///
    /// A negative product is blamed on whichever factor is negative. A
    /// product past the money range names the whole line.
    pub fn total(&self, index: usize) -> LedgerResult<Cents> {
        line_total_cents(self.quantity, self.rate).map_err(|e| {
            let field = match e {
                MoneyError::Negative if self.quantity.get() < 0 => {
                    format!("lines[{index}].quantity")
                }
                MoneyError::Negative => format!("lines[{index}].rate"),
                _ => format!("lines[{index}]"),
            };
            LedgerError::money(field, &e)
        })
    }
}

/// Bill, check, or deposit line: an amount on an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountLine {
    /// Account hit by the line.
    pub account_id: AccountId,
    /// Line amount.
    pub amount: Cents,
    /// Free text.
    pub description: Option<String>,
    /// Overrides the header unit.
    pub unit_id: Option<UnitId>,
    /// Overrides the header person.
    pub person_id: Option<PersonId>,
}

impl AccountLine {
    /// Line attribution with the header as fallback.
    #[must_use]
    pub fn attribution(&self, header: Attribution) -> Attribution {
        Attribution::new(self.unit_id, self.person_id).or(header)
    }
}

/// Journal line: a raw debit or credit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalLine {
    /// Account hit by the line.
    pub account_id: AccountId,
    /// Debit amount.
    pub debit: Option<Cents>,
    /// Credit amount.
    pub credit: Option<Cents>,
    /// Free text.
    pub description: Option<String>,
    /// Unit attribution.
    pub unit_id: Option<UnitId>,
    /// Person attribution.
    pub person_id: Option<PersonId>,
}

// ============================================================================
// Payloads
// ============================================================================

/// Customer invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoicePayload {
    /// Owning building.
    pub building_id: BuildingId,
    /// Billed customer.
    pub customer_id: PersonId,
    /// Unit billed for.
    pub unit_id: Option<UnitId>,
    /// Receivable account debited.
    pub ar_account_id: AccountId,
    /// Invoice date.
    pub date: NaiveDate,
    /// Payment due date.
    pub due_date: Option<NaiveDate>,
    /// Invoice number.
    pub reference_number: String,
    /// Free text.
    pub memo: Option<String>,
    /// Item lines.
    pub lines: Vec<ItemLine>,
}

/// Vendor bill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillPayload {
    /// Owning building.
    pub building_id: BuildingId,
    /// Vendor billed by.
    pub vendor_id: Option<PersonId>,
    /// Unit the bill is for.
    pub unit_id: Option<UnitId>,
    /// Payable account credited.
    pub ap_account_id: AccountId,
    /// Bill date.
    pub date: NaiveDate,
    /// Payment due date.
    pub due_date: Option<NaiveDate>,
    /// Bill number.
    pub reference_number: String,
    /// Free text.
    pub memo: Option<String>,
    /// Expense lines.
    pub lines: Vec<AccountLine>,
}

/// Check written from a bank account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckPayload {
    /// Owning building.
    pub building_id: BuildingId,
    /// Payee.
    pub payee_id: Option<PersonId>,
    /// Unit the check is for.
    pub unit_id: Option<UnitId>,
    /// Bank account.
    pub bank_account_id: AccountId,
    /// Check date.
    pub date: NaiveDate,
    /// Check number.
    pub reference_number: String,
    /// Free text.
    pub memo: Option<String>,
    /// Expense lines.
    pub lines: Vec<AccountLine>,
}

/// Bank deposit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositPayload {
    /// Owning building.
    pub building_id: BuildingId,
    /// Unit the deposit is for.
    pub unit_id: Option<UnitId>,
    /// Bank account debited.
    pub bank_account_id: AccountId,
    /// Deposit date.
    pub date: NaiveDate,
    /// Deposit slip number.
    pub reference_number: String,
    /// Free text.
    pub memo: Option<String>,
    /// Source lines.
    pub lines: Vec<AccountLine>,
}

/// Manual journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalPayload {
    /// Owning building.
    pub building_id: BuildingId,
    /// Unit the journal is about.
    pub unit_id: Option<UnitId>,
    /// Journal date.
    pub date: NaiveDate,
    /// Journal number.
    pub reference_number: String,
    /// Free text.
    pub memo: Option<String>,
    /// Declared total. Descriptive only.
    pub total_amount: Cents,
    /// Raw lines.
    pub lines: Vec<JournalLine>,
}

/// Payment received against an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoicePaymentPayload {
    /// Owning building.
    pub building_id: BuildingId,
    /// Invoice being paid.
    pub invoice_id: DocumentId,
    /// Asset account receiving the money.
    pub asset_account_id: AccountId,
    /// Payment date.
    pub date: NaiveDate,
    /// Receipt number.
    pub reference_number: String,
    /// Free text.
    pub memo: Option<String>,
    /// Amount received.
    pub amount: Cents,
}

/// Payment made against a bill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillPaymentPayload {
    /// Owning building.
    pub building_id: BuildingId,
    /// Bill being paid.
    pub bill_id: DocumentId,
    /// Asset account paying.
    pub asset_account_id: AccountId,
    /// Payment date.
    pub date: NaiveDate,
    /// Check or transfer number.
    pub reference_number: String,
    /// Free text.
    pub memo: Option<String>,
    /// Amount paid.
    pub amount: Cents,
}

/// Customer credit memo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditMemoPayload {
    /// Owning building.
    pub building_id: BuildingId,
    /// Customer credited.
    pub customer_id: PersonId,
    /// Unit the credit is for.
    pub unit_id: Option<UnitId>,
    /// Liability account debited.
    pub liability_account_id: AccountId,
    /// Deposit (asset) account credited.
    pub deposit_account_id: AccountId,
    /// Memo date.
    pub date: NaiveDate,
    /// Memo number.
    pub reference_number: String,
    /// Free text.
    pub memo: Option<String>,
    /// Credit amount.
    pub amount: Cents,
}

/// Cash sale with no receivable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesReceiptPayload {
    /// Owning building.
    pub building_id: BuildingId,
    /// Buyer, if known.
    pub customer_id: Option<PersonId>,
    /// Unit the sale is for.
    pub unit_id: Option<UnitId>,
    /// Asset account receiving the money.
    pub deposit_account_id: AccountId,
    /// Receipt date.
    pub date: NaiveDate,
    /// Receipt number.
    pub reference_number: String,
    /// Free text.
    pub memo: Option<String>,
    /// Item lines.
    pub lines: Vec<ItemLine>,
}

// ============================================================================
// Stored envelope
// ============================================================================

/// A stored document: header row plus its payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record<P> {
    /// Document ID. Ignored on insert; the store assigns one.
    pub id: DocumentId,
    /// The transaction this document posted.
    pub transaction_id: TransactionId,
    /// Lifecycle status.
    pub status: Status,
    /// Posted total.
    pub total: Cents,
    /// Header fields and lines.
    pub body: P,
}

/// Any stored document, closed over the nine kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Document {
    /// Customer invoice.
    Invoice(Record<InvoicePayload>),
    /// Vendor bill.
    Bill(Record<BillPayload>),
    /// Check.
    Check(Record<CheckPayload>),
    /// Bank deposit.
    Deposit(Record<DepositPayload>),
    /// Manual journal.
    Journal(Record<JournalPayload>),
    /// Invoice payment.
    InvoicePayment(Record<InvoicePaymentPayload>),
    /// Bill payment.
    BillPayment(Record<BillPaymentPayload>),
    /// Credit memo.
    CreditMemo(Record<CreditMemoPayload>),
    /// Sales receipt.
    SalesReceipt(Record<SalesReceiptPayload>),
}

macro_rules! each_record {
    ($doc:expr, $record:ident => $body:expr) => {
        match $doc {
            Document::Invoice($record) => $body,
            Document::Bill($record) => $body,
            Document::Check($record) => $body,
            Document::Deposit($record) => $body,
            Document::Journal($record) => $body,
            Document::InvoicePayment($record) => $body,
            Document::BillPayment($record) => $body,
            Document::CreditMemo($record) => $body,
            Document::SalesReceipt($record) => $body,
        }
    };
}

impl Document {
    /// Transaction kind this document posts as.
    #[must_use]
    pub const fn kind(&self) -> TransactionKind {
        match self {
            Self::Invoice(_) => TransactionKind::Invoice,
            Self::Bill(_) => TransactionKind::Bill,
            Self::Check(_) => TransactionKind::Check,
            Self::Deposit(_) => TransactionKind::Deposit,
            Self::Journal(_) => TransactionKind::Journal,
            Self::InvoicePayment(_) => TransactionKind::Payment,
            Self::BillPayment(_) => TransactionKind::BillPayment,
            Self::CreditMemo(_) => TransactionKind::CreditMemo,
            Self::SalesReceipt(_) => TransactionKind::Receipt,
        }
    }

    /// Document ID.
    #[must_use]
    pub fn id(&self) -> DocumentId {
        each_record!(self, r => r.id)
    }

    /// Assigns the document ID.
    pub fn set_id(&mut self, id: DocumentId) {
        each_record!(self, r => r.id = id);
    }

    /// Posted transaction.
    #[must_use]
    pub fn transaction_id(&self) -> TransactionId {
        each_record!(self, r => r.transaction_id)
    }

    /// Owning building.
    #[must_use]
    pub fn building_id(&self) -> BuildingId {
        each_record!(self, r => r.body.building_id)
    }

    /// Lifecycle status.
    #[must_use]
    pub fn status(&self) -> Status {
        each_record!(self, r => r.status)
    }

    /// Sets the lifecycle status.
    pub fn set_status(&mut self, status: Status) {
        each_record!(self, r => r.status = status);
    }

    /// Posted total.
    #[must_use]
    pub fn total(&self) -> Cents {
        each_record!(self, r => r.total)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::testing::{RENT_ITEM, item_line};

    #[rstest]
    #[case("-1", "50", "lines[2].quantity")]
    #[case("1", "-50", "lines[2].rate")]
    #[case("9999999999", "99999999999999.99", "lines[2]")]
    fn test_line_total_error_names_offending_field(
        #[case] quantity: &str,
        #[case] rate: &str,
        #[case] expected: &str,
    ) {
        let err = item_line(RENT_ITEM, quantity, rate).total(2).unwrap_err();
        match err {
            LedgerError::InvalidAmount { field, .. } => assert_eq!(field, expected),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
