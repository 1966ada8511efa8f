//! Ledger error types.
//!
//! Every failure the posting engine, the credit workflow, and the report
//! engine can raise is a [`LedgerError`]. Each variant maps to a stable
//! snake_case kind and an HTTP status so adapters never need to inspect
//! message text.

use rentledger_shared::types::{Cents, DocumentId, ItemId, MoneyError, PersonId};
use thiserror::Error;

/// Coarse classification of a [`LedgerError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A referenced record does not exist.
    NotFound,
    /// A uniqueness rule would be broken.
    Conflict,
    /// An amount failed to parse or is out of range.
    InvalidAmount,
    /// A payload field is missing, malformed, or inconsistent.
    InvalidPayload,
    /// Credit memo and invoice belong to different customers.
    CustomerMismatch,
    /// Requested credit exceeds what the memo has left.
    ExceedsAvailable,
    /// Memo amount would drop below what is already applied.
    ExceedsApplied,
    /// Debits and credits differ.
    Unbalanced,
    /// Catalog item has a type posting cannot handle.
    UnsupportedItemType,
    /// The per-call deadline elapsed.
    DeadlineExceeded,
    /// The caller went away.
    Cancelled,
    /// Anything else.
    Internal,
}

impl ErrorKind {
    /// Stable snake_case name used in API responses.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::InvalidAmount => "invalid_amount",
            Self::InvalidPayload => "invalid_payload",
            Self::CustomerMismatch => "customer_mismatch",
            Self::ExceedsAvailable => "exceeds_available",
            Self::ExceedsApplied => "exceeds_applied",
            Self::Unbalanced => "unbalanced",
            Self::UnsupportedItemType => "unsupported_item_type",
            Self::DeadlineExceeded => "deadline_exceeded",
            Self::Cancelled => "cancelled",
            Self::Internal => "internal",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur during ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    // ========== Lookup Errors ==========
    /// Referenced record not found.
    #[error("{entity} {id} not found")]
    NotFound {
        /// What kind of record, e.g. `account`.
        entity: &'static str,
        /// The missing key.
        id: i64,
    },

    /// Uniqueness violation.
    #[error("conflict: {0}")]
    Conflict(String),

    // ========== Validation Errors ==========
    /// Amount could not be parsed or is out of range.
    #[error("invalid amount for {field}: {reason}")]
    InvalidAmount {
        /// Payload field that carried the amount.
        field: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Payload is structurally wrong.
    #[error("invalid {field}: {reason}")]
    InvalidPayload {
        /// Offending payload field.
        field: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Transaction is not balanced (debits != credits).
    #[error("transaction is not balanced. debit: {debit}, credit: {credit}")]
    Unbalanced {
        /// Sum of debit splits.
        debit: Cents,
        /// Sum of credit splits.
        credit: Cents,
    },

    /// Item type outside service, discount, payment.
    #[error("item {item_id} has unsupported type {item_type:?}")]
    UnsupportedItemType {
        /// The item.
        item_id: ItemId,
        /// Its stored type.
        item_type: String,
    },

    // ========== Credit Errors ==========
    /// Credit memo and invoice customers differ.
    #[error(
        "credit memo {memo_id} belongs to customer {memo_customer}, invoice {invoice_id} to customer {invoice_customer}"
    )]
    CustomerMismatch {
        /// The credit memo.
        memo_id: DocumentId,
        /// Customer on the memo.
        memo_customer: PersonId,
        /// The invoice.
        invoice_id: DocumentId,
        /// Customer on the invoice.
        invoice_customer: PersonId,
    },

    /// Application larger than the memo's remaining credit.
    #[error("credit memo {memo_id} has {available} available, {requested} requested")]
    ExceedsAvailable {
        /// The credit memo.
        memo_id: DocumentId,
        /// Amount asked for.
        requested: Cents,
        /// Amount still available.
        available: Cents,
    },

    /// Memo amount lowered below what is already applied.
    #[error("credit memo {memo_id} already has {applied} applied, more than {amount}")]
    ExceedsApplied {
        /// The credit memo.
        memo_id: DocumentId,
        /// New memo amount.
        amount: Cents,
        /// Active applications.
        applied: Cents,
    },

    // ========== Request Lifecycle Errors ==========
    /// Store call ran past its deadline.
    #[error("store call exceeded its deadline")]
    DeadlineExceeded,

    /// Caller cancelled the request.
    #[error("request cancelled")]
    Cancelled,

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl LedgerError {
    /// Builds a [`LedgerError::NotFound`].
    pub fn not_found(entity: &'static str, id: impl Into<i64>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Builds a [`LedgerError::InvalidPayload`].
    pub fn invalid_payload(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPayload {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Builds a [`LedgerError::InvalidAmount`].
    pub fn invalid_amount(field: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidAmount {
            field: field.into(),
            reason: reason.to_string(),
        }
    }

    /// Wraps a money parse failure for `field`.
    pub fn money(field: impl Into<String>, err: &MoneyError) -> Self {
        Self::invalid_amount(field, err)
    }

    /// Returns the error classification.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::InvalidAmount { .. } => ErrorKind::InvalidAmount,
            Self::InvalidPayload { .. } => ErrorKind::InvalidPayload,
            Self::Unbalanced { .. } => ErrorKind::Unbalanced,
            Self::UnsupportedItemType { .. } => ErrorKind::UnsupportedItemType,
            Self::CustomerMismatch { .. } => ErrorKind::CustomerMismatch,
            Self::ExceedsAvailable { .. } => ErrorKind::ExceedsAvailable,
            Self::ExceedsApplied { .. } => ErrorKind::ExceedsApplied,
            Self::DeadlineExceeded => ErrorKind::DeadlineExceeded,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        self.kind().as_str()
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self.kind() {
            // 404 Not Found
            ErrorKind::NotFound => 404,

            // 409 Conflict
            ErrorKind::Conflict => 409,

            // 400 Bad Request - validation errors
            ErrorKind::InvalidAmount
            | ErrorKind::InvalidPayload
            | ErrorKind::CustomerMismatch
            | ErrorKind::ExceedsAvailable
            | ErrorKind::ExceedsApplied
            | ErrorKind::Unbalanced
            | ErrorKind::UnsupportedItemType => 400,

            // 499 Client Closed Request
            ErrorKind::Cancelled => 499,

            // 504 Gateway Timeout
            ErrorKind::DeadlineExceeded => 504,

            // 500 Internal Server Error
            ErrorKind::Internal => 500,
        }
    }
}

/// Result alias for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(LedgerError::not_found("account", 3_i64), "not_found", 404)]
    #[case(LedgerError::Conflict("duplicate".into()), "conflict", 409)]
    #[case(LedgerError::invalid_amount("amount", "empty"), "invalid_amount", 400)]
    #[case(LedgerError::invalid_payload("lines", "empty"), "invalid_payload", 400)]
    #[case(
        LedgerError::Unbalanced { debit: Cents::new(100), credit: Cents::new(90) },
        "unbalanced",
        400
    )]
    #[case(LedgerError::DeadlineExceeded, "deadline_exceeded", 504)]
    #[case(LedgerError::Cancelled, "cancelled", 499)]
    #[case(LedgerError::Internal("boom".into()), "internal", 500)]
    fn test_error_codes_and_statuses(
        #[case] err: LedgerError,
        #[case] code: &str,
        #[case] status: u16,
    ) {
        assert_eq!(err.error_code(), code);
        assert_eq!(err.http_status_code(), status);
    }

    #[test]
    fn test_unbalanced_message_shows_two_decimals() {
        let err = LedgerError::Unbalanced {
            debit: Cents::new(10_000),
            credit: Cents::new(9_950),
        };
        assert_eq!(
            err.to_string(),
            "transaction is not balanced. debit: 100.00, credit: 99.50"
        );
    }
}
