//! Document posters.
//!
//! Each business document kind implements [`DocumentPoster`]: a pure
//! `generate_splits` that turns a payload plus looked-up account metadata
//! into a balanced [`SplitSet`], and the glue to wrap its payload into the
//! closed [`Document`] enum. [`PostingService`] owns the shared
//! create/update/void orchestration around a single store scope.

pub mod bill;
pub mod check;
pub mod credit_memo;
pub mod deposit;
pub mod documents;
pub mod invoice;
pub mod journal;
pub mod payment;
pub mod sales_receipt;
pub mod service;

#[cfg(test)]
mod props;

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use rentledger_shared::types::{AccountId, BuildingId, Cents, DocumentId, ItemId};

use crate::ledger::{
    Account, Item, LedgerError, LedgerResult, Split, SplitSet, Transaction, TransactionHeader,
    TransactionKind,
};
use crate::store::Scope;

pub use bill::BillPoster;
pub use check::CheckPoster;
pub use credit_memo::CreditMemoPoster;
pub use deposit::DepositPoster;
pub use documents::{
    AccountLine, BillPayload, BillPaymentPayload, CheckPayload, CreditMemoPayload,
    DepositPayload, Document, InvoicePayload, InvoicePaymentPayload, ItemLine, JournalLine,
    JournalPayload, Record, SalesReceiptPayload,
};
pub use invoice::InvoicePoster;
pub use journal::JournalPoster;
pub use payment::{BillPaymentPoster, InvoicePaymentPoster};
pub use sales_receipt::SalesReceiptPoster;
pub use service::PostingService;

/// Split set and document total produced by a poster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Posting {
    /// Balanced splits to write.
    pub splits: SplitSet,
    /// Total recorded on the document row.
    pub total: Cents,
}

/// A document together with its ledger effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Posted<P> {
    /// The stored document.
    pub record: Record<P>,
    /// Its transaction header.
    pub transaction: Transaction,
    /// Its splits, void ones included.
    pub splits: Vec<Split>,
}

impl<P> Posted<P> {
    /// Splits that still count.
    pub fn active_splits(&self) -> impl Iterator<Item = &Split> {
        self.splits.iter().filter(|s| s.status.is_active())
    }
}

/// Records a payload points at, resolved before splits are generated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct References {
    accounts: BTreeSet<AccountId>,
    items: BTreeSet<ItemId>,
    invoice: Option<DocumentId>,
    bill: Option<DocumentId>,
}

impl References {
    /// Nothing referenced yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an account.
    #[must_use]
    pub fn account(mut self, id: AccountId) -> Self {
        self.accounts.insert(id);
        self
    }

    /// Adds every account in `ids`.
    #[must_use]
    pub fn accounts(mut self, ids: impl IntoIterator<Item = AccountId>) -> Self {
        self.accounts.extend(ids);
        self
    }

    /// Adds every item in `ids`.
    #[must_use]
    pub fn items(mut self, ids: impl IntoIterator<Item = ItemId>) -> Self {
        self.items.extend(ids);
        self
    }

    /// References an invoice.
    #[must_use]
    pub const fn invoice(mut self, id: DocumentId) -> Self {
        self.invoice = Some(id);
        self
    }

    /// References a bill.
    #[must_use]
    pub const fn bill(mut self, id: DocumentId) -> Self {
        self.bill = Some(id);
        self
    }
}

/// Resolved references handed to `generate_splits`.
#[derive(Debug, Clone, Default)]
pub struct Lookup {
    accounts: BTreeMap<AccountId, Account>,
    items: BTreeMap<ItemId, Item>,
    invoice: Option<Record<InvoicePayload>>,
    bill: Option<Record<BillPayload>>,
}

impl Lookup {
    /// Registers an account.
    pub fn insert_account(&mut self, account: Account) {
        self.accounts.insert(account.id, account);
    }

    /// Registers an item.
    pub fn insert_item(&mut self, item: Item) {
        self.items.insert(item.id, item);
    }

    /// Registers the referenced invoice.
    pub fn set_invoice(&mut self, invoice: Record<InvoicePayload>) {
        self.invoice = Some(invoice);
    }

    /// Registers the referenced bill.
    pub fn set_bill(&mut self, bill: Record<BillPayload>) {
        self.bill = Some(bill);
    }

    /// A resolved account.
    pub fn account(&self, id: AccountId) -> LedgerResult<&Account> {
        self.accounts
            .get(&id)
            .ok_or_else(|| LedgerError::not_found("account", id))
    }

    /// A resolved item.
    pub fn item(&self, id: ItemId) -> LedgerResult<&Item> {
        self.items
            .get(&id)
            .ok_or_else(|| LedgerError::not_found("item", id))
    }

    /// The resolved invoice.
    pub fn invoice(&self) -> LedgerResult<&Record<InvoicePayload>> {
        self.invoice
            .as_ref()
            .ok_or_else(|| LedgerError::invalid_payload("invoice_id", "invoice not resolved"))
    }

    /// The resolved bill.
    pub fn bill(&self) -> LedgerResult<&Record<BillPayload>> {
        self.bill
            .as_ref()
            .ok_or_else(|| LedgerError::invalid_payload("bill_id", "bill not resolved"))
    }
}

/// Posting behavior of one document kind.
#[async_trait]
pub trait DocumentPoster: Send + Sync + 'static {
    /// Header fields and lines of this kind.
    type Payload: Clone + Send + Sync + std::fmt::Debug + 'static;

    /// Transaction kind written.
    const KIND: TransactionKind;

    /// Transaction header fields taken from the payload.
    fn header(payload: &Self::Payload) -> TransactionHeader;

    /// Accounts, items, and documents the payload points at.
    fn references(payload: &Self::Payload) -> References;

    /// Checks that need no store access: required fields and amounts.
    fn validate(payload: &Self::Payload) -> LedgerResult<()>;

    /// Pure split generation. Performs no writes.
    fn generate_splits(payload: &Self::Payload, lookup: &Lookup) -> LedgerResult<Posting>;

    /// Wraps a record into the closed document enum.
    fn into_document(record: Record<Self::Payload>) -> Document;

    /// Unwraps a document of this kind.
    fn from_document(document: Document) -> Option<Record<Self::Payload>>;

    /// Extra checks run inside the scope before an update is applied.
    async fn before_update<Sc: Scope>(
        _scope: &mut Sc,
        _previous: &Record<Self::Payload>,
        _next: &Self::Payload,
    ) -> LedgerResult<()> {
        Ok(())
    }

    /// Extra checks run inside the scope before a void is applied.
    async fn before_void<Sc: Scope>(
        _scope: &mut Sc,
        _previous: &Record<Self::Payload>,
    ) -> LedgerResult<()> {
        Ok(())
    }
}

// ============================================================================
// Shared validation helpers
// ============================================================================

/// Rejects a non-positive amount.
pub(crate) fn require_positive(field: impl Into<String>, amount: Cents) -> LedgerResult<()> {
    if amount.is_positive() {
        Ok(())
    } else {
        Err(LedgerError::invalid_amount(
            field,
            format!("must be greater than 0, got {amount}"),
        ))
    }
}

/// Sums line amounts, rejecting a total outside the money range.
pub(crate) fn checked_total(
    field: &str,
    amounts: impl IntoIterator<Item = Cents>,
) -> LedgerResult<Cents> {
    amounts
        .into_iter()
        .try_fold(Cents::ZERO, |sum, amount| sum.bounded_add(amount))
        .map_err(|e| LedgerError::money(field, &e))
}

/// Rejects an empty line list.
pub(crate) fn require_lines<T>(lines: &[T]) -> LedgerResult<()> {
    if lines.is_empty() {
        Err(LedgerError::invalid_payload("lines", "at least one line is required"))
    } else {
        Ok(())
    }
}

/// Loads everything `refs` points at and checks it belongs to `building_id`.
pub(crate) async fn resolve<Sc: Scope>(
    scope: &mut Sc,
    building_id: BuildingId,
    refs: References,
) -> LedgerResult<Lookup> {
    let mut lookup = Lookup::default();
    let mut accounts = refs.accounts;

    if let Some(id) = refs.invoice {
        let invoice = scope
            .document(TransactionKind::Invoice, id)
            .await?
            .and_then(InvoicePoster::from_document)
            .filter(|r| r.body.building_id == building_id)
            .ok_or_else(|| LedgerError::not_found("invoice", id))?;
        if !invoice.status.is_active() {
            return Err(LedgerError::invalid_payload(
                "invoice_id",
                format!("invoice {id} is void"),
            ));
        }
        accounts.insert(invoice.body.ar_account_id);
        lookup.set_invoice(invoice);
    }

    if let Some(id) = refs.bill {
        let bill = scope
            .document(TransactionKind::Bill, id)
            .await?
            .and_then(BillPoster::from_document)
            .filter(|r| r.body.building_id == building_id)
            .ok_or_else(|| LedgerError::not_found("bill", id))?;
        if !bill.status.is_active() {
            return Err(LedgerError::invalid_payload(
                "bill_id",
                format!("bill {id} is void"),
            ));
        }
        accounts.insert(bill.body.ap_account_id);
        lookup.set_bill(bill);
    }

    for id in refs.items {
        let item = scope
            .item(id)
            .await?
            .ok_or_else(|| LedgerError::not_found("item", id))?;
        if item.building_id != building_id {
            return Err(LedgerError::invalid_payload(
                "item_id",
                format!("item {id} belongs to another building"),
            ));
        }
        accounts.insert(item.kind.account_id());
        lookup.insert_item(item);
    }

    for id in accounts {
        let account = scope
            .account(id)
            .await?
            .ok_or_else(|| LedgerError::not_found("account", id))?;
        if account.building_id != building_id {
            return Err(LedgerError::invalid_payload(
                "account_id",
                format!("account {id} belongs to another building"),
            ));
        }
        lookup.insert_account(account);
    }

    Ok(lookup)
}
