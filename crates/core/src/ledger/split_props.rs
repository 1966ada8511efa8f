//! Property tests for split netting and balancing.

use proptest::prelude::*;
use rentledger_shared::types::{AccountId, Cents};

use super::split::{Attribution, NetAccumulator, SplitSet};

fn line() -> impl Strategy<Value = (i64, bool, i64)> {
    (1_i64..6, any::<bool>(), 1_i64..1_000_000)
}

proptest! {
    /// Netting lines and offsetting the total on a control account always balances.
    #[test]
    fn prop_netted_lines_balance_against_total(lines in prop::collection::vec(line(), 1..20)) {
        let mut acc = NetAccumulator::new();
        for (account, is_credit, amount) in &lines {
            if *is_credit {
                acc.credit(AccountId::new(*account), Cents::new(*amount)).unwrap();
            } else {
                acc.debit(AccountId::new(*account), Cents::new(*amount)).unwrap();
            }
        }
        let total = acc.total().unwrap();
        let mut set = SplitSet::new();
        acc.emit_into(&mut set, Attribution::default());

        if total.is_positive() {
            set.debit(AccountId::new(99), total, Attribution::default());
        } else if total.is_negative() {
            set.credit(AccountId::new(99), total.abs(), Attribution::default());
        }

        if !set.is_empty() {
            let totals = set.ensure_balanced().unwrap();
            prop_assert_eq!(totals.debit, totals.credit);
        }
    }

    /// Netting never emits two splits for the same account.
    #[test]
    fn prop_at_most_one_split_per_account(lines in prop::collection::vec(line(), 1..20)) {
        let mut acc = NetAccumulator::new();
        for (account, is_credit, amount) in &lines {
            if *is_credit {
                acc.credit(AccountId::new(*account), Cents::new(*amount)).unwrap();
            } else {
                acc.debit(AccountId::new(*account), Cents::new(*amount)).unwrap();
            }
        }
        let mut set = SplitSet::new();
        acc.emit_into(&mut set, Attribution::default());

        let mut seen = std::collections::BTreeSet::new();
        for draft in set.drafts() {
            prop_assert!(seen.insert(draft.account_id));
            prop_assert!(draft.amount.is_positive());
        }
    }
}
