//! `SeaORM` entity definitions, one module per table.

pub mod account_types;
pub mod accounts;
pub mod bill_lines;
pub mod bill_payments;
pub mod bills;
pub mod check_lines;
pub mod checks;
pub mod credit_memos;
pub mod deposit_lines;
pub mod deposits;
pub mod invoice_applied_credits;
pub mod invoice_lines;
pub mod invoice_payments;
pub mod invoices;
pub mod items;
pub mod journal_lines;
pub mod journals;
pub mod people;
pub mod sales_receipt_lines;
pub mod sales_receipts;
pub mod splits;
pub mod transactions;
