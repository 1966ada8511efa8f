//! Property tests for posting through the store.

use proptest::prelude::*;
use rentledger_shared::types::{AccountId, Cents, ItemId, PersonId, UnitId};

use super::*;
use crate::testing::*;

type SplitKey = (AccountId, Option<Cents>, Option<Cents>, Option<UnitId>, Option<PersonId>);

fn item() -> impl Strategy<Value = ItemId> {
    prop_oneof![Just(RENT_ITEM), Just(DISCOUNT_ITEM), Just(PASS_THROUGH_ITEM)]
}

/// Invoice lines led by a rent line large enough to keep the total positive.
fn lines() -> impl Strategy<Value = Vec<ItemLine>> {
    prop::collection::vec((item(), 1_u32..5, 1_u32..10_000), 0..6).prop_map(|rest| {
        let mut lines = vec![item_line(RENT_ITEM, "10", "5000")];
        lines.extend(rest.into_iter().map(|(item, qty, cents)| {
            item_line(item, &qty.to_string(), &format!("{}.{:02}", cents / 100, cents % 100))
        }));
        lines
    })
}

fn keys<'a>(splits: impl Iterator<Item = &'a crate::ledger::Split>) -> Vec<SplitKey> {
    let mut keys: Vec<SplitKey> = splits
        .map(|s| (s.account_id, s.debit, s.credit, s.unit_id, s.person_id))
        .collect();
    keys.sort();
    keys
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Updating to a payload leaves the same active splits a fresh create
    /// would, and keeps every prior split as void.
    #[test]
    fn prop_update_matches_fresh_create(first in lines(), second in lines()) {
        let (updated, fresh, prior) = block_on(async {
            let svc = PostingService::new(seeded_store().await);
            let created = svc.create::<InvoicePoster>(&ctx(), invoice(first)).await.unwrap();
            let updated = svc
                .update::<InvoicePoster>(&ctx(), BUILDING, created.record.id, invoice(second.clone()))
                .await
                .unwrap();

            let other = PostingService::new(seeded_store().await);
            let fresh = other.create::<InvoicePoster>(&ctx(), invoice(second)).await.unwrap();
            (updated, fresh, created)
        });

        prop_assert_eq!(keys(updated.active_splits()), keys(fresh.active_splits()));
        prop_assert_eq!(updated.record.total, fresh.record.total);
        for split in &prior.splits {
            let now = updated.splits.iter().find(|s| s.id == split.id);
            prop_assert_eq!(now.map(|s| s.status), Some(crate::ledger::Status::Void));
        }
    }

    /// Every stored invoice balances and no split carries both sides.
    #[test]
    fn prop_posted_invoice_balances(payload in lines()) {
        let posted = block_on(async {
            let svc = PostingService::new(seeded_store().await);
            svc.create::<InvoicePoster>(&ctx(), invoice(payload)).await.unwrap()
        });

        let debit: Cents = posted.active_splits().map(|s| s.debit_or_zero()).sum();
        let credit: Cents = posted.active_splits().map(|s| s.credit_or_zero()).sum();
        prop_assert_eq!(debit, credit);
        prop_assert_eq!(debit, posted.record.total);
        for split in posted.active_splits() {
            let one_side = matches!(
                (split.debit, split.credit),
                (Some(d), None) if d.is_positive()
            ) || matches!(
                (split.debit, split.credit),
                (None, Some(c)) if c.is_positive()
            );
            prop_assert!(one_side);
        }
    }

    /// Credit applications never exceed the memo, whatever is requested.
    #[test]
    fn prop_credit_is_conserved(requests in prop::collection::vec(1_i64..4_000, 1..8)) {
        let (applied, memo_amount) = block_on(async {
            let store = seeded_store().await;
            let svc = PostingService::new(store.clone());
            let credits = crate::credit::CreditService::new(store.clone());
            let inv = svc
                .create::<InvoicePoster>(&ctx(), invoice(vec![item_line(RENT_ITEM, "1", "100")]))
                .await
                .unwrap();
            let memo = svc
                .create::<CreditMemoPoster>(&ctx(), credit_memo(CUSTOMER, "100.00"))
                .await
                .unwrap();
            for cents in requests {
                let _ = credits
                    .apply_credit(
                        &ctx(),
                        BUILDING,
                        inv.record.id,
                        crate::credit::ApplyCredit {
                            credit_memo_id: memo.record.id,
                            amount: Cents::new(cents),
                            date: date(2025, 1, 20),
                            description: None,
                        },
                    )
                    .await;
            }
            let applied: Cents = store
                .snapshot()
                .await
                .applied_credits
                .values()
                .filter(|c| c.status.is_active())
                .map(|c| c.amount)
                .sum();
            (applied, memo.record.total)
        });
        prop_assert!(applied <= memo_amount);
    }
}
