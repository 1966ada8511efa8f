//! Posting and reporting engine for Rentledger.
//!
//! This crate contains the accounting rules with ZERO web or database
//! dependencies. Storage is reached only through the [`store::Store`] seam.
//!
//! # Modules
//!
//! - `ledger` - Double-entry bookkeeping primitives
//! - `posting` - Business document posters and the posting orchestrator
//! - `credit` - Credit memo applications
//! - `reports` - Trial balance, balance sheet, customer balances
//! - `store` - Store and scope traits, in-memory store
//! - `context` - Per-request principal, deadline, cancellation

pub mod context;
pub mod credit;
pub mod ledger;
pub mod posting;
pub mod reports;
pub mod store;

#[cfg(test)]
mod testing;

pub use context::{Principal, RequestContext};
pub use ledger::{LedgerError, LedgerResult};
