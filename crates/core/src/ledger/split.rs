//! Split sets: the balanced debit/credit lines a document posts.

use std::collections::BTreeMap;

use rentledger_shared::types::{AccountId, Cents, PersonId, TransactionId, UnitId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::balance::SideTotals;
use super::error::{LedgerError, LedgerResult};
use super::types::NewSplit;

/// Debit or credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// Left side.
    Debit,
    /// Right side.
    Credit,
}

/// Unit and person a split is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Attribution {
    /// Unit, if any.
    pub unit_id: Option<UnitId>,
    /// Person, if any.
    pub person_id: Option<PersonId>,
}

impl Attribution {
    /// Creates an attribution.
    #[must_use]
    pub const fn new(unit_id: Option<UnitId>, person_id: Option<PersonId>) -> Self {
        Self { unit_id, person_id }
    }

    /// Fills missing fields from `fallback`.
    #[must_use]
    pub fn or(self, fallback: Self) -> Self {
        Self {
            unit_id: self.unit_id.or(fallback.unit_id),
            person_id: self.person_id.or(fallback.person_id),
        }
    }
}

/// One side of a posting before it has a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitDraft {
    /// Account hit.
    pub account_id: AccountId,
    /// Debit or credit.
    pub side: Side,
    /// Always positive.
    pub amount: Cents,
    /// Unit and person.
    pub attribution: Attribution,
}

impl SplitDraft {
    /// Attaches the draft to a transaction.
    #[must_use]
    pub fn bind(&self, transaction_id: TransactionId) -> NewSplit {
        let (debit, credit) = match self.side {
            Side::Debit => (Some(self.amount), None),
            Side::Credit => (None, Some(self.amount)),
        };
        NewSplit {
            transaction_id,
            account_id: self.account_id,
            debit,
            credit,
            unit_id: self.attribution.unit_id,
            person_id: self.attribution.person_id,
        }
    }
}

/// Ordered collection of drafts produced by one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitSet {
    drafts: Vec<SplitDraft>,
}

impl SplitSet {
    /// Empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a debit.
    pub fn debit(&mut self, account_id: AccountId, amount: Cents, attribution: Attribution) {
        self.push(account_id, Side::Debit, amount, attribution);
    }

    /// Appends a credit.
    pub fn credit(&mut self, account_id: AccountId, amount: Cents, attribution: Attribution) {
        self.push(account_id, Side::Credit, amount, attribution);
    }

    fn push(&mut self, account_id: AccountId, side: Side, amount: Cents, attribution: Attribution) {
        self.drafts.push(SplitDraft {
            account_id,
            side,
            amount,
            attribution,
        });
    }

    /// The drafts in insertion order.
    #[must_use]
    pub fn drafts(&self) -> &[SplitDraft] {
        &self.drafts
    }

    /// Number of drafts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    /// Returns true if nothing was posted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }

    /// Debit and credit totals.
    #[must_use]
    pub fn totals(&self) -> SideTotals {
        self.drafts
            .iter()
            .fold(SideTotals::default(), |mut totals, draft| {
                match draft.side {
                    Side::Debit => totals.add_debit(draft.amount),
                    Side::Credit => totals.add_credit(draft.amount),
                }
                totals
            })
    }

    /// Checks the set can be written.
    ///
    /// Every amount must be positive and the debit total must equal the
    /// credit total exactly in cents.
    pub fn ensure_balanced(&self) -> LedgerResult<SideTotals> {
        if self.drafts.is_empty() {
            return Err(LedgerError::invalid_payload(
                "lines",
                "document produces no ledger lines",
            ));
        }
        if let Some(draft) = self.drafts.iter().find(|d| !d.amount.is_positive()) {
            return Err(LedgerError::invalid_amount(
                "amount",
                format!(
                    "split on account {} must be positive, got {}",
                    draft.account_id, draft.amount
                ),
            ));
        }

        let totals = self.totals();
        if !totals.is_balanced() {
            let difference = totals.debit.to_decimal() - totals.credit.to_decimal();
            tracing::warn!(
                debit = %totals.debit,
                credit = %totals.credit,
                %difference,
                within_tolerance = difference.abs() <= Decimal::new(1, 4),
                "split set does not balance"
            );
            return Err(LedgerError::Unbalanced {
                debit: totals.debit,
                credit: totals.credit,
            });
        }
        Ok(totals)
    }

    /// Binds every draft to `transaction_id`.
    #[must_use]
    pub fn bind(&self, transaction_id: TransactionId) -> Vec<NewSplit> {
        self.drafts.iter().map(|d| d.bind(transaction_id)).collect()
    }
}

/// Nets line amounts per account before they become splits.
///
/// Amounts are kept credit-positive: a positive net becomes one credit
/// split, a negative net one debit split, and a zero net no split at all.
#[derive(Debug, Clone, Default)]
pub struct NetAccumulator {
    nets: BTreeMap<AccountId, Cents>,
}

impl NetAccumulator {
    /// Empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds to the credit side of `account_id`.
    ///
    /// Fails with `invalid_amount` once the account's net leaves the money
    /// range.
    pub fn credit(&mut self, account_id: AccountId, amount: Cents) -> LedgerResult<()> {
        self.add(account_id, amount)
    }

    /// Adds to the debit side of `account_id`.
    pub fn debit(&mut self, account_id: AccountId, amount: Cents) -> LedgerResult<()> {
        self.add(account_id, -amount)
    }

    fn add(&mut self, account_id: AccountId, amount: Cents) -> LedgerResult<()> {
        let net = self.nets.entry(account_id).or_default();
        *net = net
            .bounded_add(amount)
            .map_err(|e| LedgerError::money(format!("account {account_id}"), &e))?;
        Ok(())
    }

    /// Signed sum of all nets (credits minus debits), bounded like any
    /// other amount.
    pub fn total(&self) -> LedgerResult<Cents> {
        self.nets.values().try_fold(Cents::ZERO, |sum, net| {
            sum.bounded_add(*net)
                .map_err(|e| LedgerError::money("total", &e))
        })
    }

    /// Appends one split per nonzero net, ordered by account.
    pub fn emit_into(self, set: &mut SplitSet, attribution: Attribution) {
        for (account_id, net) in self.nets {
            if net.is_positive() {
                set.credit(account_id, net, attribution);
            } else if net.is_negative() {
                set.debit(account_id, net.abs(), attribution);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AR: AccountId = AccountId::new(1);
    const RENT: AccountId = AccountId::new(2);
    const FEES: AccountId = AccountId::new(3);

    #[test]
    fn test_balanced_set_passes() {
        let mut set = SplitSet::new();
        set.debit(AR, Cents::new(10_000), Attribution::default());
        set.credit(RENT, Cents::new(10_000), Attribution::default());
        let totals = set.ensure_balanced().unwrap();
        assert_eq!(totals.debit, Cents::new(10_000));
    }

    #[test]
    fn test_unbalanced_set_reports_both_sides() {
        let mut set = SplitSet::new();
        set.debit(AR, Cents::new(10_000), Attribution::default());
        set.credit(RENT, Cents::new(9_999), Attribution::default());
        assert_eq!(
            set.ensure_balanced().unwrap_err(),
            LedgerError::Unbalanced {
                debit: Cents::new(10_000),
                credit: Cents::new(9_999),
            }
        );
    }

    #[test]
    fn test_empty_and_zero_sets_are_rejected() {
        assert_eq!(
            SplitSet::new().ensure_balanced().unwrap_err().error_code(),
            "invalid_payload"
        );

        let mut set = SplitSet::new();
        set.debit(AR, Cents::ZERO, Attribution::default());
        set.credit(RENT, Cents::ZERO, Attribution::default());
        assert_eq!(set.ensure_balanced().unwrap_err().error_code(), "invalid_amount");
    }

    #[test]
    fn test_accumulator_nets_and_skips_zero() {
        let mut acc = NetAccumulator::new();
        acc.credit(RENT, Cents::new(10_000)).unwrap();
        acc.debit(RENT, Cents::new(2_000)).unwrap();
        acc.credit(FEES, Cents::new(500)).unwrap();
        acc.debit(FEES, Cents::new(500)).unwrap();
        assert_eq!(acc.total().unwrap(), Cents::new(8_000));

        let mut set = SplitSet::new();
        acc.emit_into(&mut set, Attribution::default());
        assert_eq!(set.len(), 1);
        assert_eq!(set.drafts()[0].side, Side::Credit);
        assert_eq!(set.drafts()[0].amount, Cents::new(8_000));
    }

    #[test]
    fn test_accumulator_rejects_nets_past_money_range() {
        let max = Cents::new(rentledger_shared::types::money::MAX_CENTS);
        let mut acc = NetAccumulator::new();
        acc.credit(RENT, max).unwrap();
        let err = acc.credit(RENT, Cents::new(1)).unwrap_err();
        assert_eq!(err.error_code(), "invalid_amount");

        let mut acc = NetAccumulator::new();
        acc.credit(RENT, max).unwrap();
        acc.credit(FEES, max).unwrap();
        assert_eq!(acc.total().unwrap_err().error_code(), "invalid_amount");

        acc.debit(FEES, max).unwrap();
        assert_eq!(acc.total().unwrap(), max);
    }

    #[test]
    fn test_bind_sets_exactly_one_side() {
        let draft = SplitDraft {
            account_id: AR,
            side: Side::Debit,
            amount: Cents::new(1),
            attribution: Attribution::new(Some(UnitId::new(4)), None),
        };
        let split = draft.bind(TransactionId::new(9));
        assert_eq!(split.debit, Some(Cents::new(1)));
        assert_eq!(split.credit, None);
        assert_eq!(split.unit_id, Some(UnitId::new(4)));
    }
}
