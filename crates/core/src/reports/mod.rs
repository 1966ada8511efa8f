//! Financial report generation.
//!
//! Reports are built in two steps: the store aggregates active splits of
//! active transactions up to the as-of date, then [`ReportService`] turns
//! those totals into report rows without touching the store.
//! - Trial Balance
//! - Balance Sheet
//! - Customer Balance Summary

pub mod service;
pub mod types;

#[cfg(test)]
mod tests;

pub use service::{ReportEngine, ReportService};
pub use types::*;
