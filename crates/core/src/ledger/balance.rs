//! Natural-sign balance calculations.
//!
//! Debit-normal accounts (assets, expenses): balance = debit - credit.
//! Credit-normal accounts (liabilities, equity, income): balance = credit - debit.

use rentledger_shared::types::Cents;
use serde::{Deserialize, Serialize};

use super::types::{AccountNature, NormalSide};

impl NormalSide {
    /// Normal side implied by a statement category.
    #[must_use]
    pub const fn for_nature(nature: AccountNature) -> Self {
        match nature {
            AccountNature::Asset | AccountNature::Expense => Self::Debit,
            AccountNature::Liability | AccountNature::Equity | AccountNature::Income => {
                Self::Credit
            }
        }
    }

    /// Balance in this account's natural sign.
    #[must_use]
    pub fn natural_balance(self, debit: Cents, credit: Cents) -> Cents {
        match self {
            Self::Debit => debit - credit,
            Self::Credit => credit - debit,
        }
    }
}

/// Debit and credit totals for one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SideTotals {
    /// Sum of debit splits.
    pub debit: Cents,
    /// Sum of credit splits.
    pub credit: Cents,
}

impl SideTotals {
    /// Creates totals.
    #[must_use]
    pub const fn new(debit: Cents, credit: Cents) -> Self {
        Self { debit, credit }
    }

    /// Adds a debit amount.
    pub fn add_debit(&mut self, amount: Cents) {
        self.debit += amount;
    }

    /// Adds a credit amount.
    pub fn add_credit(&mut self, amount: Cents) {
        self.credit += amount;
    }

    /// Balance in the natural sign of `side`.
    #[must_use]
    pub fn balance(self, side: NormalSide) -> Cents {
        side.natural_balance(self.debit, self.credit)
    }

    /// Returns true if debits equal credits.
    #[must_use]
    pub fn is_balanced(self) -> bool {
        self.debit == self.credit
    }
}
