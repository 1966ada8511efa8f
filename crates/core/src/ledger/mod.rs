//! Double-entry bookkeeping primitives.
//!
//! This module implements the pieces every document poster builds on:
//! - Domain types for accounts, items, transactions, and splits
//! - Split sets with the exact-cents balance check
//! - Per-account netting of line amounts
//! - Natural-sign balance rules
//! - Error types shared by the whole engine

pub mod balance;
pub mod error;
pub mod split;
pub mod types;

#[cfg(test)]
mod split_props;

pub use balance::SideTotals;
pub use error::{ErrorKind, LedgerError, LedgerResult};
pub use split::{Attribution, NetAccumulator, Side, SplitDraft, SplitSet};
pub use types::{
    Account, AccountNature, Item, ItemKind, ItemRow, NewSplit, NewTransaction, NormalSide,
    Person, Split, Status, Transaction, TransactionHeader, TransactionKind,
};
