//! In-memory store.
//!
//! A scope takes the state mutex for its whole life and works on a copy,
//! which replaces the shared state on commit. Scopes are therefore fully
//! serialized, which is all the engine tests need. Fault injection lets a
//! test fail the N-th call of a given operation.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex as SyncMutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use rentledger_shared::types::{
    AccountId, AppliedCreditId, BuildingId, DocumentId, ItemId, PersonId, SplitId,
    TransactionId,
};
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{Scope, Store};
use crate::context::RequestContext;
use crate::credit::{AppliedCredit, NewAppliedCredit};
use crate::ledger::{
    Account, Item, ItemRow, LedgerError, LedgerResult, NewSplit, NewTransaction, Person,
    SideTotals, Split, Status, Transaction, TransactionKind,
};
use crate::posting::{CreditMemoPayload, Document, InvoicePaymentPayload, Record};
use crate::reports::{AccountTotals, CustomerTotals, RECEIVABLE_TYPE_NAME};

/// Tables held by a [`MemoryStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryState {
    next_id: i64,
    /// Chart of accounts.
    pub accounts: BTreeMap<AccountId, Account>,
    /// Catalog items as stored.
    pub items: BTreeMap<ItemId, ItemRow>,
    /// People.
    pub people: BTreeMap<PersonId, Person>,
    /// Ledger headers.
    pub transactions: BTreeMap<TransactionId, Transaction>,
    /// Ledger lines.
    pub splits: BTreeMap<SplitId, Split>,
    /// Document headers with their lines.
    pub documents: BTreeMap<DocumentId, Document>,
    /// Credit memo applications.
    pub applied_credits: BTreeMap<AppliedCreditId, AppliedCredit>,
}

impl MemoryState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    /// Splits of a transaction that are still active.
    #[must_use]
    pub fn active_splits(&self, transaction_id: TransactionId) -> Vec<&Split> {
        self.splits
            .values()
            .filter(|s| s.transaction_id == transaction_id && s.status.is_active())
            .collect()
    }

    fn ledger_rows(
        &self,
        building_id: BuildingId,
        as_of: NaiveDate,
    ) -> impl Iterator<Item = (&Split, &Account)> + '_ {
        self.splits
            .values()
            .filter(|split| split.status.is_active())
            .filter_map(move |split| {
                let tx = self.transactions.get(&split.transaction_id)?;
                let visible = tx.status.is_active()
                    && tx.header.building_id == building_id
                    && tx.header.date <= as_of;
                if !visible {
                    return None;
                }
                let account = self.accounts.get(&split.account_id)?;
                Some((split, account))
            })
    }
}

/// Store backed by process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
    faults: Arc<SyncMutex<BTreeMap<&'static str, usize>>>,
}

impl MemoryStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an account.
    pub async fn insert_account(&self, account: Account) {
        self.state.lock().await.accounts.insert(account.id, account);
    }

    /// Seeds an item.
    pub async fn insert_item(&self, item: ItemRow) {
        self.state.lock().await.items.insert(item.id, item);
    }

    /// Seeds a person.
    pub async fn insert_person(&self, person: Person) {
        self.state.lock().await.people.insert(person.id, person);
    }

    /// Copy of the committed state.
    pub async fn snapshot(&self) -> MemoryState {
        self.state.lock().await.clone()
    }

    /// Makes the `nth` call (1-based) of `op` from now on fail with
    /// `internal`. `op` is a [`Scope`] method name or `commit`.
    pub fn fail_on(&self, op: &'static str, nth: usize) {
        if let Ok(mut faults) = self.faults.lock() {
            faults.insert(op, nth.max(1));
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    type Scope = MemoryScope;

    async fn begin(&self, ctx: &RequestContext) -> LedgerResult<MemoryScope> {
        let state = Arc::clone(&self.state);
        let guard = ctx.guard(async move { Ok(state.lock_owned().await) }).await?;
        let working = guard.clone();
        Ok(MemoryScope {
            guard,
            working,
            faults: Arc::clone(&self.faults),
            ctx: ctx.clone(),
        })
    }
}

/// Scope over a [`MemoryStore`].
pub struct MemoryScope {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
    faults: Arc<SyncMutex<BTreeMap<&'static str, usize>>>,
    ctx: RequestContext,
}

impl MemoryScope {
    fn enter(&self, op: &'static str) -> LedgerResult<()> {
        if self.ctx.cancel_token().is_cancelled() {
            return Err(LedgerError::Cancelled);
        }
        let mut faults = self
            .faults
            .lock()
            .map_err(|_| LedgerError::Internal("fault table poisoned".to_string()))?;
        if let Some(remaining) = faults.get_mut(op) {
            *remaining -= 1;
            if *remaining == 0 {
                faults.remove(op);
                return Err(LedgerError::Internal(format!("injected failure in {op}")));
            }
        }
        Ok(())
    }

    fn record_of<P>(
        &self,
        id: DocumentId,
        pick: impl Fn(&Document) -> Option<&Record<P>>,
    ) -> Option<Record<P>>
    where
        P: Clone,
    {
        self.working.documents.get(&id).and_then(pick).cloned()
    }
}

fn invoice_payment(doc: &Document) -> Option<&Record<InvoicePaymentPayload>> {
    match doc {
        Document::InvoicePayment(record) => Some(record),
        _ => None,
    }
}

fn credit_memo(doc: &Document) -> Option<&Record<CreditMemoPayload>> {
    match doc {
        Document::CreditMemo(record) => Some(record),
        _ => None,
    }
}

#[async_trait]
impl Scope for MemoryScope {
    async fn commit(self) -> LedgerResult<()> {
        self.enter("commit")?;
        let Self {
            mut guard, working, ..
        } = self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self) -> LedgerResult<()> {
        Ok(())
    }

    async fn account(&mut self, id: AccountId) -> LedgerResult<Option<Account>> {
        self.enter("account")?;
        Ok(self.working.accounts.get(&id).cloned())
    }

    async fn item(&mut self, id: ItemId) -> LedgerResult<Option<Item>> {
        self.enter("item")?;
        self.working
            .items
            .get(&id)
            .cloned()
            .map(Item::try_from)
            .transpose()
    }

    async fn person(&mut self, id: PersonId) -> LedgerResult<Option<Person>> {
        self.enter("person")?;
        Ok(self.working.people.get(&id).cloned())
    }

    async fn create_transaction(&mut self, tx: NewTransaction) -> LedgerResult<Transaction> {
        self.enter("create_transaction")?;
        let transaction = Transaction {
            id: TransactionId::new(self.working.next_id()),
            kind: tx.kind,
            header: tx.header,
            user_id: tx.user_id,
            status: Status::Active,
        };
        self.working
            .transactions
            .insert(transaction.id, transaction.clone());
        Ok(transaction)
    }

    async fn update_transaction(
        &mut self,
        id: TransactionId,
        tx: NewTransaction,
    ) -> LedgerResult<Transaction> {
        self.enter("update_transaction")?;
        let existing = self
            .working
            .transactions
            .get_mut(&id)
            .ok_or_else(|| LedgerError::not_found("transaction", id))?;
        existing.kind = tx.kind;
        existing.header = tx.header;
        existing.user_id = tx.user_id;
        Ok(existing.clone())
    }

    async fn void_transaction(&mut self, id: TransactionId) -> LedgerResult<()> {
        self.enter("void_transaction")?;
        let existing = self
            .working
            .transactions
            .get_mut(&id)
            .ok_or_else(|| LedgerError::not_found("transaction", id))?;
        existing.status = Status::Void;
        Ok(())
    }

    async fn transaction(&mut self, id: TransactionId) -> LedgerResult<Option<Transaction>> {
        self.enter("transaction")?;
        Ok(self.working.transactions.get(&id).cloned())
    }

    async fn create_split(&mut self, split: NewSplit) -> LedgerResult<Split> {
        self.enter("create_split")?;
        if !self.working.transactions.contains_key(&split.transaction_id) {
            return Err(LedgerError::not_found("transaction", split.transaction_id));
        }
        let stored = Split {
            id: SplitId::new(self.working.next_id()),
            transaction_id: split.transaction_id,
            account_id: split.account_id,
            debit: split.debit,
            credit: split.credit,
            unit_id: split.unit_id,
            person_id: split.person_id,
            status: Status::Active,
        };
        self.working.splits.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn void_splits(&mut self, transaction_id: TransactionId) -> LedgerResult<u64> {
        self.enter("void_splits")?;
        let mut changed = 0;
        for split in self.working.splits.values_mut() {
            if split.transaction_id == transaction_id && split.status.is_active() {
                split.status = Status::Void;
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn splits(&mut self, transaction_id: TransactionId) -> LedgerResult<Vec<Split>> {
        self.enter("splits")?;
        Ok(self
            .working
            .splits
            .values()
            .filter(|s| s.transaction_id == transaction_id)
            .cloned()
            .collect())
    }

    async fn insert_document(&mut self, mut document: Document) -> LedgerResult<Document> {
        self.enter("insert_document")?;
        document.set_id(DocumentId::new(self.working.next_id()));
        self.working
            .documents
            .insert(document.id(), document.clone());
        Ok(document)
    }

    async fn update_document(&mut self, document: Document) -> LedgerResult<Document> {
        self.enter("update_document")?;
        let slot = self
            .working
            .documents
            .get_mut(&document.id())
            .filter(|existing| existing.kind() == document.kind())
            .ok_or_else(|| LedgerError::not_found(document.kind().as_str(), document.id()))?;
        *slot = document.clone();
        Ok(document)
    }

    async fn document(
        &mut self,
        kind: TransactionKind,
        id: DocumentId,
    ) -> LedgerResult<Option<Document>> {
        self.enter("document")?;
        Ok(self
            .working
            .documents
            .get(&id)
            .filter(|doc| doc.kind() == kind)
            .cloned())
    }

    async fn documents(
        &mut self,
        kind: TransactionKind,
        building_id: BuildingId,
    ) -> LedgerResult<Vec<Document>> {
        self.enter("documents")?;
        Ok(self
            .working
            .documents
            .values()
            .filter(|doc| doc.kind() == kind && doc.building_id() == building_id)
            .cloned()
            .collect())
    }

    async fn payments_for_invoice(
        &mut self,
        invoice_id: DocumentId,
    ) -> LedgerResult<Vec<Record<InvoicePaymentPayload>>> {
        self.enter("payments_for_invoice")?;
        Ok(self
            .working
            .documents
            .values()
            .filter_map(invoice_payment)
            .filter(|record| record.body.invoice_id == invoice_id)
            .cloned()
            .collect())
    }

    async fn credit_memos_for_customer(
        &mut self,
        building_id: BuildingId,
        customer_id: PersonId,
    ) -> LedgerResult<Vec<Record<CreditMemoPayload>>> {
        self.enter("credit_memos_for_customer")?;
        Ok(self
            .working
            .documents
            .values()
            .filter_map(credit_memo)
            .filter(|r| r.body.building_id == building_id && r.body.customer_id == customer_id)
            .cloned()
            .collect())
    }

    async fn lock_credit_memo(
        &mut self,
        id: DocumentId,
    ) -> LedgerResult<Option<Record<CreditMemoPayload>>> {
        self.enter("lock_credit_memo")?;
        Ok(self.record_of(id, credit_memo))
    }

    async fn create_applied_credit(
        &mut self,
        credit: NewAppliedCredit,
    ) -> LedgerResult<AppliedCredit> {
        self.enter("create_applied_credit")?;
        let stored = AppliedCredit {
            id: AppliedCreditId::new(self.working.next_id()),
            building_id: credit.building_id,
            invoice_id: credit.invoice_id,
            credit_memo_id: credit.credit_memo_id,
            amount: credit.amount,
            date: credit.date,
            description: credit.description,
            status: Status::Active,
        };
        self.working.applied_credits.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn applied_credit(
        &mut self,
        id: AppliedCreditId,
    ) -> LedgerResult<Option<AppliedCredit>> {
        self.enter("applied_credit")?;
        Ok(self.working.applied_credits.get(&id).cloned())
    }

    async fn void_applied_credit(&mut self, id: AppliedCreditId) -> LedgerResult<()> {
        self.enter("void_applied_credit")?;
        let existing = self
            .working
            .applied_credits
            .get_mut(&id)
            .ok_or_else(|| LedgerError::not_found("applied credit", id))?;
        existing.status = Status::Void;
        Ok(())
    }

    async fn applied_credits_for_invoice(
        &mut self,
        invoice_id: DocumentId,
    ) -> LedgerResult<Vec<AppliedCredit>> {
        self.enter("applied_credits_for_invoice")?;
        Ok(self
            .working
            .applied_credits
            .values()
            .filter(|c| c.invoice_id == invoice_id)
            .cloned()
            .collect())
    }

    async fn applied_credits_for_memo(
        &mut self,
        memo_id: DocumentId,
    ) -> LedgerResult<Vec<AppliedCredit>> {
        self.enter("applied_credits_for_memo")?;
        Ok(self
            .working
            .applied_credits
            .values()
            .filter(|c| c.credit_memo_id == memo_id)
            .cloned()
            .collect())
    }

    async fn account_totals(
        &mut self,
        building_id: BuildingId,
        as_of: NaiveDate,
    ) -> LedgerResult<Vec<AccountTotals>> {
        self.enter("account_totals")?;
        let mut by_account: BTreeMap<AccountId, AccountTotals> = BTreeMap::new();
        for (split, account) in self.working.ledger_rows(building_id, as_of) {
            let entry = by_account
                .entry(account.id)
                .or_insert_with(|| AccountTotals {
                    account: account.clone(),
                    totals: SideTotals::default(),
                });
            entry.totals.add_debit(split.debit_or_zero());
            entry.totals.add_credit(split.credit_or_zero());
        }
        let mut rows: Vec<AccountTotals> = by_account.into_values().collect();
        rows.sort_by(|a, b| {
            a.account
                .number
                .cmp(&b.account.number)
                .then(a.account.id.cmp(&b.account.id))
        });
        Ok(rows)
    }

    async fn receivable_totals(
        &mut self,
        building_id: BuildingId,
        as_of: NaiveDate,
    ) -> LedgerResult<Vec<CustomerTotals>> {
        self.enter("receivable_totals")?;
        let mut by_person: BTreeMap<PersonId, SideTotals> = BTreeMap::new();
        for (split, account) in self.working.ledger_rows(building_id, as_of) {
            let Some(person_id) = split.person_id else {
                continue;
            };
            if account.type_name != RECEIVABLE_TYPE_NAME {
                continue;
            }
            let totals = by_person.entry(person_id).or_default();
            totals.add_debit(split.debit_or_zero());
            totals.add_credit(split.credit_or_zero());
        }
        let mut rows: Vec<CustomerTotals> = by_person
            .into_iter()
            .map(|(person_id, totals)| CustomerTotals {
                person_id,
                name: self
                    .working
                    .people
                    .get(&person_id)
                    .map_or_else(|| format!("Person {person_id}"), |p| p.display_name.clone()),
                totals,
            })
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name).then(a.person_id.cmp(&b.person_id)));
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::NaiveDate;
    use rentledger_shared::types::UserId;

    use super::*;
    use crate::context::Principal;
    use crate::ledger::TransactionHeader;
    use crate::store::with_scope;

    fn ctx() -> RequestContext {
        RequestContext::new(
            Principal {
                user_id: UserId::new(1),
            },
            Duration::from_secs(1),
        )
    }

    fn new_tx() -> NewTransaction {
        NewTransaction {
            kind: TransactionKind::Journal,
            header: TransactionHeader {
                building_id: BuildingId::new(1),
                unit_id: None,
                date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
                reference_number: "JE-1".to_string(),
                memo: None,
            },
            user_id: UserId::new(1),
        }
    }

    async fn create(store: &MemoryStore, fail: bool) -> LedgerResult<TransactionId> {
        let ctx = ctx();
        with_scope!(store, &ctx, |scope| {
            let tx = scope.create_transaction(new_tx()).await?;
            if fail {
                return Err(LedgerError::Internal("body failed".to_string()));
            }
            Ok(tx.id)
        })
    }

    #[tokio::test]
    async fn test_commit_publishes_writes() {
        let store = MemoryStore::new();
        let id = create(&store, false).await.unwrap();
        assert!(store.snapshot().await.transactions.contains_key(&id));
    }

    #[tokio::test]
    async fn test_error_rolls_back() {
        let store = MemoryStore::new();
        let err = create(&store, true).await.unwrap_err();
        assert_eq!(err, LedgerError::Internal("body failed".to_string()));
        assert!(store.snapshot().await.transactions.is_empty());
    }

    #[tokio::test]
    async fn test_injected_fault_fires_once() {
        let store = MemoryStore::new();
        store.fail_on("commit", 1);
        assert!(create(&store, false).await.is_err());
        assert!(store.snapshot().await.transactions.is_empty());
        assert!(create(&store, false).await.is_ok());
    }

    #[tokio::test]
    async fn test_cancelled_context_stops_calls() {
        let store = MemoryStore::new();
        let ctx = ctx();
        let mut scope = store.begin(&ctx).await.unwrap();
        ctx.cancel_token().cancel();
        let err = scope.create_transaction(new_tx()).await.unwrap_err();
        assert_eq!(err, LedgerError::Cancelled);
    }
}
