//! Report data types.

use chrono::NaiveDate;
use rentledger_shared::types::{AccountId, Cents, PersonId};
use serde::Serialize;

use crate::ledger::{Account, AccountNature, SideTotals};

/// Account type name that marks receivable accounts.
pub const RECEIVABLE_TYPE_NAME: &str = "Account Receivable";

// ============================================================================
// Store aggregates
// ============================================================================

/// Debit and credit totals of one account within the report filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountTotals {
    /// The account.
    pub account: Account,
    /// Its totals.
    pub totals: SideTotals,
}

/// Receivable debit and credit totals of one customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerTotals {
    /// The customer.
    pub person_id: PersonId,
    /// Display name.
    pub name: String,
    /// Totals on receivable accounts.
    pub totals: SideTotals,
}

// ============================================================================
// Trial balance
// ============================================================================

/// One account line of a trial balance. At most one side is nonzero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrialBalanceRow {
    /// Account ID.
    pub account_id: AccountId,
    /// Account number.
    pub number: String,
    /// Account name.
    pub name: String,
    /// Statement category.
    pub nature: AccountNature,
    /// Debit-side balance.
    pub debit_balance: Cents,
    /// Credit-side balance.
    pub credit_balance: Cents,
}

/// The closing total row of a trial balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrialBalanceTotal {
    /// Sum of debit balances.
    pub debit_balance: Cents,
    /// Sum of credit balances.
    pub credit_balance: Cents,
}

/// Trial balance report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrialBalanceReport {
    /// Inclusive as-of date.
    pub as_of_date: NaiveDate,
    /// Account rows, by account number.
    pub rows: Vec<TrialBalanceRow>,
    /// Total row.
    pub total: TrialBalanceTotal,
    /// Whether both total sides agree.
    pub is_balanced: bool,
}

// ============================================================================
// Balance sheet
// ============================================================================

/// One line of a balance sheet section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceSheetRow {
    /// Account ID; `None` for the synthetic net income row.
    pub account_id: Option<AccountId>,
    /// Account number; `None` for the synthetic net income row.
    pub number: Option<String>,
    /// Display name.
    pub name: String,
    /// Balance in the account's natural sign.
    pub balance: Cents,
}

/// Accounts of one statement category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BalanceSheetSection {
    /// Nonzero rows.
    pub accounts: Vec<BalanceSheetRow>,
    /// Sum of the rows.
    pub total: Cents,
}

impl BalanceSheetSection {
    pub(crate) fn push(&mut self, row: BalanceSheetRow) {
        self.total += row.balance;
        self.accounts.push(row);
    }
}

/// Balance sheet report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceSheetReport {
    /// Inclusive as-of date.
    pub as_of_date: NaiveDate,
    /// Asset accounts.
    pub assets: BalanceSheetSection,
    /// Liability accounts.
    pub liabilities: BalanceSheetSection,
    /// Equity accounts, plus a net income row when it is nonzero.
    pub equity: BalanceSheetSection,
    /// Income accounts.
    pub income: BalanceSheetSection,
    /// Expense accounts.
    pub expense: BalanceSheetSection,
    /// Income minus expense.
    pub net_income: Cents,
    /// Total assets.
    pub total_assets: Cents,
    /// Total liabilities.
    pub total_liabilities: Cents,
    /// Total equity, net income included.
    pub total_equity: Cents,
    /// Liabilities plus equity.
    pub liabilities_and_equity: Cents,
    /// Whether assets equal liabilities plus equity.
    pub is_balanced: bool,
}

// ============================================================================
// Customer balance summary
// ============================================================================

/// Receivable balance of one customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerBalanceRow {
    /// The customer.
    pub person_id: PersonId,
    /// Display name.
    pub name: String,
    /// Debits minus credits on receivable accounts.
    pub balance: Cents,
}

/// Customer balance summary report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerBalanceSummary {
    /// Inclusive as-of date.
    pub as_of_date: NaiveDate,
    /// Customers with a nonzero balance, by name.
    pub rows: Vec<CustomerBalanceRow>,
    /// Sum of the rows.
    pub total: Cents,
}
