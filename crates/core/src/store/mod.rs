//! Store seam consumed by the posting, credit, and report engines.
//!
//! A [`Store`] hands out [`Scope`]s. Every read and write of one document
//! post goes through a single scope, so a concurrent reader sees either all
//! of its writes or none. Dropping a scope without committing discards it.

pub mod memory;

use async_trait::async_trait;
use chrono::NaiveDate;
use rentledger_shared::types::{
    AccountId, AppliedCreditId, BuildingId, DocumentId, ItemId, PersonId, TransactionId,
};

use crate::context::RequestContext;
use crate::credit::{AppliedCredit, NewAppliedCredit};
use crate::ledger::{
    Account, Item, LedgerResult, NewSplit, NewTransaction, Person, Split, Transaction,
    TransactionKind,
};
use crate::posting::{CreditMemoPayload, Document, InvoicePaymentPayload, Record};
use crate::reports::{AccountTotals, CustomerTotals};

pub use memory::MemoryStore;

/// Source of transactional scopes.
#[async_trait]
pub trait Store: Clone + Send + Sync + 'static {
    /// Scope type handed out by [`Store::begin`].
    type Scope: Scope;

    /// Opens a scope bound to `ctx`.
    async fn begin(&self, ctx: &RequestContext) -> LedgerResult<Self::Scope>;
}

/// One all-or-nothing unit of work.
#[async_trait]
pub trait Scope: Send {
    /// Makes every write of this scope visible.
    async fn commit(self) -> LedgerResult<()>;

    /// Discards every write of this scope.
    async fn rollback(self) -> LedgerResult<()>;

    // ========== Master data ==========

    /// Account joined with its type.
    async fn account(&mut self, id: AccountId) -> LedgerResult<Option<Account>>;

    /// Item with a validated kind. Unknown item types are an error.
    async fn item(&mut self, id: ItemId) -> LedgerResult<Option<Item>>;

    /// Person.
    async fn person(&mut self, id: PersonId) -> LedgerResult<Option<Person>>;

    // ========== Transactions ==========

    /// Inserts an active transaction header.
    async fn create_transaction(&mut self, tx: NewTransaction) -> LedgerResult<Transaction>;

    /// Rewrites a transaction header in place.
    async fn update_transaction(
        &mut self,
        id: TransactionId,
        tx: NewTransaction,
    ) -> LedgerResult<Transaction>;

    /// Marks a transaction void.
    async fn void_transaction(&mut self, id: TransactionId) -> LedgerResult<()>;

    /// Transaction header.
    async fn transaction(&mut self, id: TransactionId) -> LedgerResult<Option<Transaction>>;

    // ========== Splits ==========

    /// Inserts an active split.
    async fn create_split(&mut self, split: NewSplit) -> LedgerResult<Split>;

    /// Voids every split of a transaction, returning how many changed.
    async fn void_splits(&mut self, transaction_id: TransactionId) -> LedgerResult<u64>;

    /// Every split of a transaction, void ones included, in id order.
    async fn splits(&mut self, transaction_id: TransactionId) -> LedgerResult<Vec<Split>>;

    // ========== Documents ==========

    /// Inserts a document header and its lines, assigning its ID.
    async fn insert_document(&mut self, document: Document) -> LedgerResult<Document>;

    /// Rewrites a document header and replaces its lines.
    async fn update_document(&mut self, document: Document) -> LedgerResult<Document>;

    /// Document of the given kind.
    async fn document(
        &mut self,
        kind: TransactionKind,
        id: DocumentId,
    ) -> LedgerResult<Option<Document>>;

    /// Every document of a kind in a building, in id order.
    async fn documents(
        &mut self,
        kind: TransactionKind,
        building_id: BuildingId,
    ) -> LedgerResult<Vec<Document>>;

    /// Payments recorded against an invoice, void ones included.
    async fn payments_for_invoice(
        &mut self,
        invoice_id: DocumentId,
    ) -> LedgerResult<Vec<Record<InvoicePaymentPayload>>>;

    /// Credit memos of a customer, void ones included.
    async fn credit_memos_for_customer(
        &mut self,
        building_id: BuildingId,
        customer_id: PersonId,
    ) -> LedgerResult<Vec<Record<CreditMemoPayload>>>;

    /// Loads a credit memo and holds it against concurrent applications
    /// until the scope ends.
    async fn lock_credit_memo(
        &mut self,
        id: DocumentId,
    ) -> LedgerResult<Option<Record<CreditMemoPayload>>>;

    // ========== Applied credits ==========

    /// Inserts an active application.
    async fn create_applied_credit(
        &mut self,
        credit: NewAppliedCredit,
    ) -> LedgerResult<AppliedCredit>;

    /// One application.
    async fn applied_credit(&mut self, id: AppliedCreditId)
    -> LedgerResult<Option<AppliedCredit>>;

    /// Marks an application void.
    async fn void_applied_credit(&mut self, id: AppliedCreditId) -> LedgerResult<()>;

    /// Applications against an invoice, void ones included.
    async fn applied_credits_for_invoice(
        &mut self,
        invoice_id: DocumentId,
    ) -> LedgerResult<Vec<AppliedCredit>>;

    /// Applications drawing on a credit memo, void ones included.
    async fn applied_credits_for_memo(
        &mut self,
        memo_id: DocumentId,
    ) -> LedgerResult<Vec<AppliedCredit>>;

    // ========== Report reads ==========

    /// Debit and credit totals per account for active splits of active
    /// transactions dated on or before `as_of`.
    async fn account_totals(
        &mut self,
        building_id: BuildingId,
        as_of: NaiveDate,
    ) -> LedgerResult<Vec<AccountTotals>>;

    /// Same filter as [`Scope::account_totals`], restricted to receivable
    /// accounts and grouped by person.
    async fn receivable_totals(
        &mut self,
        building_id: BuildingId,
        as_of: NaiveDate,
    ) -> LedgerResult<Vec<CustomerTotals>>;
}

/// Runs a block inside a scope.
///
/// Commits when the block yields `Ok`, rolls back and returns the error
/// unchanged when it yields `Err`. A panic drops the scope uncommitted.
///
/// ```ignore
/// let record = with_scope!(self.store, ctx, |scope| {
///     let tx = scope.create_transaction(new_tx).await?;
///     Ok(tx)
/// })?;
/// ```
macro_rules! with_scope {
    ($store:expr, $ctx:expr, |$scope:ident| $body:block) => {{
        #[allow(unused_mut)]
        let mut $scope = {
            use $crate::store::Store as _;
            $store.begin($ctx).await?
        };
        let outcome: $crate::ledger::LedgerResult<_> = async { $body }.await;
        match outcome {
            Ok(value) => $crate::store::Scope::commit($scope).await.map(|()| value),
            Err(err) => {
                ::tracing::warn!(error = %err, kind = %err.kind(), "rolling back scope");
                if let Err(rollback_err) = $crate::store::Scope::rollback($scope).await {
                    ::tracing::error!(error = %rollback_err, "scope rollback failed");
                }
                Err(err)
            }
        }
    }};
}

pub(crate) use with_scope;
