//! Store error types and their mapping onto the engine taxonomy.

use rentledger_core::ledger::LedgerError;
use sea_orm::{DbErr, SqlErr};
use tracing::error;

/// Errors raised while talking to Postgres.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Driver or query error.
    #[error("database error: {0}")]
    Database(#[from] DbErr),

    /// A stored value does not decode into the domain model.
    #[error("corrupt row: {0}")]
    Corrupt(String),

    /// A domain rule failed while decoding a row.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Database(db) => match db.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(detail)) => Self::Conflict(detail),
                Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
                    Self::invalid_payload("reference", detail)
                }
                _ => {
                    error!(error = %db, "store call failed");
                    Self::Internal("store call failed".to_string())
                }
            },
            StoreError::Corrupt(detail) => {
                error!(detail = %detail, "corrupt row");
                Self::Internal(format!("corrupt row: {detail}"))
            }
            StoreError::Ledger(err) => err,
        }
    }
}
