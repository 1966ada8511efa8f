//! Postgres implementation of the engine's store seam.
//!
//! A [`PgScope`] wraps one database transaction. Every call runs under the
//! request context's deadline and cancellation token; dropping a scope
//! without committing rolls the transaction back.

mod documents;
mod reports;

use std::future::Future;

use async_trait::async_trait;
use chrono::NaiveDate;
use rentledger_core::RequestContext;
use rentledger_core::credit::{AppliedCredit, NewAppliedCredit};
use rentledger_core::ledger::{
    Account, Item, ItemRow, LedgerError, LedgerResult, NewSplit, NewTransaction, Person, Split,
    Status, Transaction, TransactionHeader, TransactionKind,
};
use rentledger_core::posting::{CreditMemoPayload, Document, InvoicePaymentPayload, Record};
use rentledger_core::reports::{AccountTotals, CustomerTotals};
use rentledger_core::store::{Scope, Store};
use rentledger_shared::types::{
    AccountId, AccountTypeId, AppliedCreditId, BuildingId, Cents, DocumentId, ItemId, PersonId,
    SplitId, TransactionId, UnitId, UserId,
};
use sea_orm::ActiveValue::{Set, Unchanged};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    FromQueryResult, JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait,
    TransactionTrait,
};
use tracing::debug;

use crate::entities::{
    account_types, accounts, invoice_applied_credits, items, people, splits, transactions,
};
use crate::error::StoreError;

// ============================================================================
// Store
// ============================================================================

/// Store backed by a Postgres connection pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    db: DatabaseConnection,
}

impl PgStore {
    /// Wraps a connection pool.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// The underlying pool.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[async_trait]
impl Store for PgStore {
    type Scope = PgScope;

    async fn begin(&self, ctx: &RequestContext) -> LedgerResult<PgScope> {
        let txn = ctx
            .guard(async { self.db.begin().await.map_err(|e| StoreError::from(e).into()) })
            .await?;
        debug!("opened database transaction");
        Ok(PgScope {
            txn,
            ctx: ctx.clone(),
        })
    }
}

// ============================================================================
// Row shapes
// ============================================================================

/// Account joined with its type, as read from the database.
#[derive(Debug, Clone, FromQueryResult)]
pub(crate) struct AccountRow {
    pub(crate) id: i64,
    pub(crate) building_id: i64,
    pub(crate) number: String,
    pub(crate) name: String,
    pub(crate) type_id: i64,
    pub(crate) is_default: bool,
    pub(crate) type_name: String,
    pub(crate) nature: String,
    pub(crate) normal_side: String,
}

impl TryFrom<AccountRow> for Account {
    type Error = StoreError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: AccountId::new(row.id),
            building_id: BuildingId::new(row.building_id),
            number: row.number,
            name: row.name,
            type_id: AccountTypeId::new(row.type_id),
            type_name: row.type_name,
            nature: row.nature.parse()?,
            normal_side: row.normal_side.parse()?,
            is_default: row.is_default,
        })
    }
}

fn transaction_from(row: transactions::Model) -> Result<Transaction, StoreError> {
    Ok(Transaction {
        id: TransactionId::new(row.id),
        kind: row.kind.parse()?,
        header: TransactionHeader {
            building_id: BuildingId::new(row.building_id),
            unit_id: row.unit_id.map(UnitId::new),
            date: row.date,
            reference_number: row.reference_number,
            memo: row.memo,
        },
        user_id: UserId::new(row.user_id),
        status: Status::from_flag(&row.status)?,
    })
}

fn split_from(row: splits::Model) -> Result<Split, StoreError> {
    Ok(Split {
        id: SplitId::new(row.id),
        transaction_id: TransactionId::new(row.transaction_id),
        account_id: AccountId::new(row.account_id),
        debit: row.debit_cents.map(Cents::new),
        credit: row.credit_cents.map(Cents::new),
        unit_id: row.unit_id.map(UnitId::new),
        person_id: row.person_id.map(PersonId::new),
        status: Status::from_flag(&row.status)?,
    })
}

fn applied_credit_from(row: invoice_applied_credits::Model) -> Result<AppliedCredit, StoreError> {
    Ok(AppliedCredit {
        id: AppliedCreditId::new(row.id),
        building_id: BuildingId::new(row.building_id),
        invoice_id: DocumentId::new(row.invoice_id),
        credit_memo_id: DocumentId::new(row.credit_memo_id),
        amount: Cents::new(row.amount_cents),
        date: row.date,
        description: row.description,
        status: Status::from_flag(&row.status)?,
    })
}

fn transaction_row(tx: &NewTransaction) -> transactions::ActiveModel {
    transactions::ActiveModel {
        building_id: Set(tx.header.building_id.get()),
        unit_id: Set(tx.header.unit_id.map(UnitId::get)),
        kind: Set(tx.kind.as_str().to_string()),
        date: Set(tx.header.date),
        reference_number: Set(tx.header.reference_number.clone()),
        memo: Set(tx.header.memo.clone()),
        user_id: Set(tx.user_id.get()),
        ..Default::default()
    }
}

// ============================================================================
// Scope
// ============================================================================

/// One database transaction bound to a request context.
pub struct PgScope {
    txn: DatabaseTransaction,
    ctx: RequestContext,
}

impl PgScope {
    /// Runs one database call under the context guard.
    async fn run<T, F>(&self, call: F) -> LedgerResult<T>
    where
        F: Future<Output = Result<T, StoreError>> + Send,
        T: Send,
    {
        self.ctx
            .guard(async { call.await.map_err(LedgerError::from) })
            .await
    }
}

#[async_trait]
impl Scope for PgScope {
    async fn commit(self) -> LedgerResult<()> {
        let Self { txn, ctx } = self;
        ctx.guard(async { txn.commit().await.map_err(|e| StoreError::from(e).into()) })
            .await
    }

    async fn rollback(self) -> LedgerResult<()> {
        self.txn
            .rollback()
            .await
            .map_err(|e| StoreError::from(e).into())
    }

    // ========== Master data ==========

    async fn account(&mut self, id: AccountId) -> LedgerResult<Option<Account>> {
        let db = &self.txn;
        self.run(async move {
            accounts::Entity::find_by_id(id.get())
                .select_only()
                .columns([
                    accounts::Column::Id,
                    accounts::Column::BuildingId,
                    accounts::Column::Number,
                    accounts::Column::Name,
                    accounts::Column::TypeId,
                    accounts::Column::IsDefault,
                ])
                .column_as(account_types::Column::Name, "type_name")
                .column_as(account_types::Column::Nature, "nature")
                .column_as(account_types::Column::NormalSide, "normal_side")
                .join(JoinType::InnerJoin, accounts::Relation::AccountTypes.def())
                .into_model::<AccountRow>()
                .one(db)
                .await?
                .map(Account::try_from)
                .transpose()
        })
        .await
    }

    async fn item(&mut self, id: ItemId) -> LedgerResult<Option<Item>> {
        let db = &self.txn;
        self.run(async move {
            let Some(row) = items::Entity::find_by_id(id.get()).one(db).await? else {
                return Ok(None);
            };
            let item = Item::try_from(ItemRow {
                id: ItemId::new(row.id),
                building_id: BuildingId::new(row.building_id),
                name: row.name,
                item_type: row.item_type,
                asset_account_id: row.asset_account_id.map(AccountId::new),
                income_account_id: row.income_account_id.map(AccountId::new),
            })?;
            Ok(Some(item))
        })
        .await
    }

    async fn person(&mut self, id: PersonId) -> LedgerResult<Option<Person>> {
        let db = &self.txn;
        self.run(async move {
            Ok(people::Entity::find_by_id(id.get())
                .one(db)
                .await?
                .map(|row| Person {
                    id: PersonId::new(row.id),
                    building_id: BuildingId::new(row.building_id),
                    display_name: row.display_name,
                }))
        })
        .await
    }

    // ========== Transactions ==========

    async fn create_transaction(&mut self, tx: NewTransaction) -> LedgerResult<Transaction> {
        let db = &self.txn;
        self.run(async move {
            let mut row = transaction_row(&tx);
            row.status = Set(Status::Active.as_flag().to_string());
            transaction_from(row.insert(db).await?)
        })
        .await
    }

    async fn update_transaction(
        &mut self,
        id: TransactionId,
        tx: NewTransaction,
    ) -> LedgerResult<Transaction> {
        let db = &self.txn;
        self.run(async move {
            let mut row = transaction_row(&tx);
            row.id = Unchanged(id.get());
            row.updated_at = Set(chrono::Utc::now().fixed_offset());
            match row.update(db).await {
                Ok(updated) => transaction_from(updated),
                Err(DbErr::RecordNotUpdated) => {
                    Err(LedgerError::not_found("transaction", id).into())
                }
                Err(err) => Err(err.into()),
            }
        })
        .await
    }

    async fn void_transaction(&mut self, id: TransactionId) -> LedgerResult<()> {
        let db = &self.txn;
        self.run(async move {
            let result = transactions::Entity::update_many()
                .col_expr(
                    transactions::Column::Status,
                    Expr::value(Status::Void.as_flag()),
                )
                .col_expr(
                    transactions::Column::UpdatedAt,
                    Expr::current_timestamp().into(),
                )
                .filter(transactions::Column::Id.eq(id.get()))
                .exec(db)
                .await?;
            if result.rows_affected == 0 {
                return Err(LedgerError::not_found("transaction", id).into());
            }
            Ok(())
        })
        .await
    }

    async fn transaction(&mut self, id: TransactionId) -> LedgerResult<Option<Transaction>> {
        let db = &self.txn;
        self.run(async move {
            transactions::Entity::find_by_id(id.get())
                .one(db)
                .await?
                .map(transaction_from)
                .transpose()
        })
        .await
    }

    // ========== Splits ==========

    async fn create_split(&mut self, split: NewSplit) -> LedgerResult<Split> {
        let db = &self.txn;
        self.run(async move {
            let row = splits::ActiveModel {
                transaction_id: Set(split.transaction_id.get()),
                account_id: Set(split.account_id.get()),
                debit: Set(split.debit.map(Cents::to_decimal)),
                credit: Set(split.credit.map(Cents::to_decimal)),
                debit_cents: Set(split.debit.map(Cents::get)),
                credit_cents: Set(split.credit.map(Cents::get)),
                unit_id: Set(split.unit_id.map(UnitId::get)),
                person_id: Set(split.person_id.map(PersonId::get)),
                status: Set(Status::Active.as_flag().to_string()),
                ..Default::default()
            };
            split_from(row.insert(db).await?)
        })
        .await
    }

    async fn void_splits(&mut self, transaction_id: TransactionId) -> LedgerResult<u64> {
        let db = &self.txn;
        self.run(async move {
            let result = splits::Entity::update_many()
                .col_expr(splits::Column::Status, Expr::value(Status::Void.as_flag()))
                .filter(splits::Column::TransactionId.eq(transaction_id.get()))
                .filter(splits::Column::Status.eq(Status::Active.as_flag()))
                .exec(db)
                .await?;
            Ok(result.rows_affected)
        })
        .await
    }

    async fn splits(&mut self, transaction_id: TransactionId) -> LedgerResult<Vec<Split>> {
        let db = &self.txn;
        self.run(async move {
            splits::Entity::find()
                .filter(splits::Column::TransactionId.eq(transaction_id.get()))
                .order_by_asc(splits::Column::Id)
                .all(db)
                .await?
                .into_iter()
                .map(split_from)
                .collect()
        })
        .await
    }

    // ========== Documents ==========

    async fn insert_document(&mut self, document: Document) -> LedgerResult<Document> {
        let db = &self.txn;
        self.run(documents::insert(db, document)).await
    }

    async fn update_document(&mut self, document: Document) -> LedgerResult<Document> {
        let db = &self.txn;
        self.run(documents::update(db, document)).await
    }

    async fn document(
        &mut self,
        kind: TransactionKind,
        id: DocumentId,
    ) -> LedgerResult<Option<Document>> {
        let db = &self.txn;
        self.run(documents::load(db, kind, id)).await
    }

    async fn documents(
        &mut self,
        kind: TransactionKind,
        building_id: BuildingId,
    ) -> LedgerResult<Vec<Document>> {
        let db = &self.txn;
        self.run(documents::list(db, kind, building_id)).await
    }

    async fn payments_for_invoice(
        &mut self,
        invoice_id: DocumentId,
    ) -> LedgerResult<Vec<Record<InvoicePaymentPayload>>> {
        let db = &self.txn;
        self.run(documents::payments_for_invoice(db, invoice_id))
            .await
    }

    async fn credit_memos_for_customer(
        &mut self,
        building_id: BuildingId,
        customer_id: PersonId,
    ) -> LedgerResult<Vec<Record<CreditMemoPayload>>> {
        let db = &self.txn;
        self.run(documents::credit_memos_for_customer(
            db,
            building_id,
            customer_id,
        ))
        .await
    }

    async fn lock_credit_memo(
        &mut self,
        id: DocumentId,
    ) -> LedgerResult<Option<Record<CreditMemoPayload>>> {
        let db = &self.txn;
        self.run(documents::lock_credit_memo(db, id)).await
    }

    // ========== Applied credits ==========

    async fn create_applied_credit(
        &mut self,
        credit: NewAppliedCredit,
    ) -> LedgerResult<AppliedCredit> {
        let db = &self.txn;
        self.run(async move {
            let row = invoice_applied_credits::ActiveModel {
                building_id: Set(credit.building_id.get()),
                invoice_id: Set(credit.invoice_id.get()),
                credit_memo_id: Set(credit.credit_memo_id.get()),
                amount_cents: Set(credit.amount.get()),
                date: Set(credit.date),
                description: Set(credit.description),
                status: Set(Status::Active.as_flag().to_string()),
                ..Default::default()
            };
            applied_credit_from(row.insert(db).await?)
        })
        .await
    }

    async fn applied_credit(
        &mut self,
        id: AppliedCreditId,
    ) -> LedgerResult<Option<AppliedCredit>> {
        let db = &self.txn;
        self.run(async move {
            invoice_applied_credits::Entity::find_by_id(id.get())
                .one(db)
                .await?
                .map(applied_credit_from)
                .transpose()
        })
        .await
    }

    async fn void_applied_credit(&mut self, id: AppliedCreditId) -> LedgerResult<()> {
        let db = &self.txn;
        self.run(async move {
            let result = invoice_applied_credits::Entity::update_many()
                .col_expr(
                    invoice_applied_credits::Column::Status,
                    Expr::value(Status::Void.as_flag()),
                )
                .filter(invoice_applied_credits::Column::Id.eq(id.get()))
                .exec(db)
                .await?;
            if result.rows_affected == 0 {
                return Err(LedgerError::not_found("applied credit", id).into());
            }
            Ok(())
        })
        .await
    }

    async fn applied_credits_for_invoice(
        &mut self,
        invoice_id: DocumentId,
    ) -> LedgerResult<Vec<AppliedCredit>> {
        let db = &self.txn;
        self.run(async move {
            invoice_applied_credits::Entity::find()
                .filter(invoice_applied_credits::Column::InvoiceId.eq(invoice_id.get()))
                .order_by_asc(invoice_applied_credits::Column::Id)
                .all(db)
                .await?
                .into_iter()
                .map(applied_credit_from)
                .collect()
        })
        .await
    }

    async fn applied_credits_for_memo(
        &mut self,
        memo_id: DocumentId,
    ) -> LedgerResult<Vec<AppliedCredit>> {
        let db = &self.txn;
        self.run(async move {
            invoice_applied_credits::Entity::find()
                .filter(invoice_applied_credits::Column::CreditMemoId.eq(memo_id.get()))
                .order_by_asc(invoice_applied_credits::Column::Id)
                .all(db)
                .await?
                .into_iter()
                .map(applied_credit_from)
                .collect()
        })
        .await
    }

    // ========== Report reads ==========

    async fn account_totals(
        &mut self,
        building_id: BuildingId,
        as_of: NaiveDate,
    ) -> LedgerResult<Vec<AccountTotals>> {
        let db = &self.txn;
        self.run(reports::account_totals(db, building_id, as_of))
            .await
    }

    async fn receivable_totals(
        &mut self,
        building_id: BuildingId,
        as_of: NaiveDate,
    ) -> LedgerResult<Vec<CustomerTotals>> {
        let db = &self.txn;
        self.run(reports::receivable_totals(db, building_id, as_of))
            .await
    }
}
