//! Per-kind document tables.
//!
//! Each business document has its own header table and, for the kinds that
//! carry lines, a line table keyed by `(parent, position)`. An update
//! rewrites the header in place and replaces every line.

use chrono::Utc;
use rentledger_core::ledger::{LedgerError, Status, TransactionKind};
use rentledger_core::posting::{
    AccountLine, BillPayload, BillPaymentPayload, CheckPayload, CreditMemoPayload,
    DepositPayload, Document, InvoicePayload, InvoicePaymentPayload, ItemLine, JournalLine,
    JournalPayload, Record, SalesReceiptPayload,
};
use rentledger_shared::types::{
    AccountId, BuildingId, Cents, DocumentId, ItemId, PersonId, Scaled5, TransactionId, UnitId,
};
use sea_orm::ActiveValue::{NotSet, Set, Unchanged};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

use crate::entities::{
    bill_lines, bill_payments, bills, check_lines, checks, credit_memos, deposit_lines, deposits,
    invoice_lines, invoice_payments, invoices, journal_lines, journals, sales_receipt_lines,
    sales_receipts,
};
use crate::error::StoreError;

// ============================================================================
// Line tables
// ============================================================================

/// A table holding the ordered lines of one document kind.
trait LineTable: EntityTrait {
    /// Domain shape of one line.
    type Line: Send + Sync;

    /// Column pointing at the header row.
    const PARENT: Self::Column;

    /// Column ordering lines within a document.
    const POSITION: Self::Column;

    /// Row to insert for `line` at `position` under `parent`.
    fn to_row(parent: i64, position: i32, line: &Self::Line) -> Self::ActiveModel;

    /// Domain line read back from a row.
    fn to_line(row: Self::Model) -> Self::Line;
}

fn position(index: usize) -> Result<i32, StoreError> {
    i32::try_from(index).map_err(|_| StoreError::Corrupt(format!("line index {index} overflows")))
}

async fn insert_lines<T: LineTable>(
    db: &DatabaseTransaction,
    parent: i64,
    lines: &[T::Line],
) -> Result<(), StoreError> {
    if lines.is_empty() {
        return Ok(());
    }
    let rows = lines
        .iter()
        .enumerate()
        .map(|(index, line)| Ok(T::to_row(parent, position(index)?, line)))
        .collect::<Result<Vec<_>, StoreError>>()?;
    T::insert_many(rows).exec(db).await?;
    Ok(())
}

async fn replace_lines<T: LineTable>(
    db: &DatabaseTransaction,
    parent: i64,
    lines: &[T::Line],
) -> Result<(), StoreError> {
    T::delete_many()
        .filter(T::PARENT.eq(parent))
        .exec(db)
        .await?;
    insert_lines::<T>(db, parent, lines).await
}

async fn load_lines<T: LineTable>(
    db: &DatabaseTransaction,
    parent: i64,
) -> Result<Vec<T::Line>, StoreError> {
    let rows = T::find()
        .filter(T::PARENT.eq(parent))
        .order_by_asc(T::POSITION)
        .all(db)
        .await?;
    Ok(rows.into_iter().map(T::to_line).collect())
}

macro_rules! item_line_table {
    ($table:ident, $parent:ident, $parent_col:ident) => {
        impl LineTable for $table::Entity {
            type Line = ItemLine;

            const PARENT: $table::Column = $table::Column::$parent_col;
            const POSITION: $table::Column = $table::Column::Position;

            fn to_row(parent: i64, position: i32, line: &ItemLine) -> $table::ActiveModel {
                $table::ActiveModel {
                    id: NotSet,
                    $parent: Set(parent),
                    position: Set(position),
                    item_id: Set(line.item_id.get()),
                    description: Set(line.description.clone()),
                    quantity_scaled: Set(line.quantity.get()),
                    rate_scaled: Set(line.rate.get()),
                }
            }

            fn to_line(row: $table::Model) -> ItemLine {
                ItemLine {
                    item_id: ItemId::new(row.item_id),
                    description: row.description,
                    quantity: Scaled5::new(row.quantity_scaled),
                    rate: Scaled5::new(row.rate_scaled),
                }
            }
        }
    };
}

macro_rules! account_line_table {
    ($table:ident, $parent:ident, $parent_col:ident) => {
        impl LineTable for $table::Entity {
            type Line = AccountLine;

            const PARENT: $table::Column = $table::Column::$parent_col;
            const POSITION: $table::Column = $table::Column::Position;

            fn to_row(parent: i64, position: i32, line: &AccountLine) -> $table::ActiveModel {
                $table::ActiveModel {
                    id: NotSet,
                    $parent: Set(parent),
                    position: Set(position),
                    account_id: Set(line.account_id.get()),
                    amount_cents: Set(line.amount.get()),
                    description: Set(line.description.clone()),
                    unit_id: Set(line.unit_id.map(UnitId::get)),
                    person_id: Set(line.person_id.map(PersonId::get)),
                }
            }

            fn to_line(row: $table::Model) -> AccountLine {
                AccountLine {
                    account_id: AccountId::new(row.account_id),
                    amount: Cents::new(row.amount_cents),
                    description: row.description,
                    unit_id: row.unit_id.map(UnitId::new),
                    person_id: row.person_id.map(PersonId::new),
                }
            }
        }
    };
}

item_line_table!(invoice_lines, invoice_id, InvoiceId);
item_line_table!(sales_receipt_lines, sales_receipt_id, SalesReceiptId);
account_line_table!(bill_lines, bill_id, BillId);
account_line_table!(check_lines, check_id, CheckId);
account_line_table!(deposit_lines, deposit_id, DepositId);

impl LineTable for journal_lines::Entity {
    type Line = JournalLine;

    const PARENT: journal_lines::Column = journal_lines::Column::JournalId;
    const POSITION: journal_lines::Column = journal_lines::Column::Position;

    fn to_row(parent: i64, position: i32, line: &JournalLine) -> journal_lines::ActiveModel {
        journal_lines::ActiveModel {
            id: NotSet,
            journal_id: Set(parent),
            position: Set(position),
            account_id: Set(line.account_id.get()),
            debit_cents: Set(line.debit.map(Cents::get)),
            credit_cents: Set(line.credit.map(Cents::get)),
            description: Set(line.description.clone()),
            unit_id: Set(line.unit_id.map(UnitId::get)),
            person_id: Set(line.person_id.map(PersonId::get)),
        }
    }

    fn to_line(row: journal_lines::Model) -> JournalLine {
        JournalLine {
            account_id: AccountId::new(row.account_id),
            debit: row.debit_cents.map(Cents::new),
            credit: row.credit_cents.map(Cents::new),
            description: row.description,
            unit_id: row.unit_id.map(UnitId::new),
            person_id: row.person_id.map(PersonId::new),
        }
    }
}

// ============================================================================
// Header rows
// ============================================================================

fn status(flag: &str) -> Result<Status, StoreError> {
    Ok(Status::from_flag(flag)?)
}

fn now() -> sea_orm::prelude::DateTimeWithTimeZone {
    Utc::now().fixed_offset()
}

fn invoice_row(record: &Record<InvoicePayload>) -> invoices::ActiveModel {
    let body = &record.body;
    invoices::ActiveModel {
        transaction_id: Set(record.transaction_id.get()),
        building_id: Set(body.building_id.get()),
        customer_id: Set(body.customer_id.get()),
        unit_id: Set(body.unit_id.map(UnitId::get)),
        ar_account_id: Set(body.ar_account_id.get()),
        date: Set(body.date),
        due_date: Set(body.due_date),
        reference_number: Set(body.reference_number.clone()),
        memo: Set(body.memo.clone()),
        total_cents: Set(record.total.get()),
        status: Set(record.status.as_flag().to_string()),
        ..Default::default()
    }
}

fn invoice_record(row: invoices::Model) -> Result<Record<InvoicePayload>, StoreError> {
    Ok(Record {
        id: DocumentId::new(row.id),
        transaction_id: TransactionId::new(row.transaction_id),
        status: status(&row.status)?,
        total: Cents::new(row.total_cents),
        body: InvoicePayload {
            building_id: BuildingId::new(row.building_id),
            customer_id: PersonId::new(row.customer_id),
            unit_id: row.unit_id.map(UnitId::new),
            ar_account_id: AccountId::new(row.ar_account_id),
            date: row.date,
            due_date: row.due_date,
            reference_number: row.reference_number,
            memo: row.memo,
            lines: Vec::new(),
        },
    })
}

fn sales_receipt_row(record: &Record<SalesReceiptPayload>) -> sales_receipts::ActiveModel {
    let body = &record.body;
    sales_receipts::ActiveModel {
        transaction_id: Set(record.transaction_id.get()),
        building_id: Set(body.building_id.get()),
        customer_id: Set(body.customer_id.map(PersonId::get)),
        unit_id: Set(body.unit_id.map(UnitId::get)),
        deposit_account_id: Set(body.deposit_account_id.get()),
        date: Set(body.date),
        reference_number: Set(body.reference_number.clone()),
        memo: Set(body.memo.clone()),
        total_cents: Set(record.total.get()),
        status: Set(record.status.as_flag().to_string()),
        ..Default::default()
    }
}

fn sales_receipt_record(
    row: sales_receipts::Model,
) -> Result<Record<SalesReceiptPayload>, StoreError> {
    Ok(Record {
        id: DocumentId::new(row.id),
        transaction_id: TransactionId::new(row.transaction_id),
        status: status(&row.status)?,
        total: Cents::new(row.total_cents),
        body: SalesReceiptPayload {
            building_id: BuildingId::new(row.building_id),
            customer_id: row.customer_id.map(PersonId::new),
            unit_id: row.unit_id.map(UnitId::new),
            deposit_account_id: AccountId::new(row.deposit_account_id),
            date: row.date,
            reference_number: row.reference_number,
            memo: row.memo,
            lines: Vec::new(),
        },
    })
}

fn bill_row(record: &Record<BillPayload>) -> bills::ActiveModel {
    let body = &record.body;
    bills::ActiveModel {
        transaction_id: Set(record.transaction_id.get()),
        building_id: Set(body.building_id.get()),
        vendor_id: Set(body.vendor_id.map(PersonId::get)),
        unit_id: Set(body.unit_id.map(UnitId::get)),
        ap_account_id: Set(body.ap_account_id.get()),
        date: Set(body.date),
        due_date: Set(body.due_date),
        reference_number: Set(body.reference_number.clone()),
        memo: Set(body.memo.clone()),
        total_cents: Set(record.total.get()),
        status: Set(record.status.as_flag().to_string()),
        ..Default::default()
    }
}

fn bill_record(row: bills::Model) -> Result<Record<BillPayload>, StoreError> {
    Ok(Record {
        id: DocumentId::new(row.id),
        transaction_id: TransactionId::new(row.transaction_id),
        status: status(&row.status)?,
        total: Cents::new(row.total_cents),
        body: BillPayload {
            building_id: BuildingId::new(row.building_id),
            vendor_id: row.vendor_id.map(PersonId::new),
            unit_id: row.unit_id.map(UnitId::new),
            ap_account_id: AccountId::new(row.ap_account_id),
            date: row.date,
            due_date: row.due_date,
            reference_number: row.reference_number,
            memo: row.memo,
            lines: Vec::new(),
        },
    })
}

fn check_row(record: &Record<CheckPayload>) -> checks::ActiveModel {
    let body = &record.body;
    checks::ActiveModel {
        transaction_id: Set(record.transaction_id.get()),
        building_id: Set(body.building_id.get()),
        payee_id: Set(body.payee_id.map(PersonId::get)),
        unit_id: Set(body.unit_id.map(UnitId::get)),
        bank_account_id: Set(body.bank_account_id.get()),
        date: Set(body.date),
        reference_number: Set(body.reference_number.clone()),
        memo: Set(body.memo.clone()),
        total_cents: Set(record.total.get()),
        status: Set(record.status.as_flag().to_string()),
        ..Default::default()
    }
}

fn check_record(row: checks::Model) -> Result<Record<CheckPayload>, StoreError> {
    Ok(Record {
        id: DocumentId::new(row.id),
        transaction_id: TransactionId::new(row.transaction_id),
        status: status(&row.status)?,
        total: Cents::new(row.total_cents),
        body: CheckPayload {
            building_id: BuildingId::new(row.building_id),
            payee_id: row.payee_id.map(PersonId::new),
            unit_id: row.unit_id.map(UnitId::new),
            bank_account_id: AccountId::new(row.bank_account_id),
            date: row.date,
            reference_number: row.reference_number,
            memo: row.memo,
            lines: Vec::new(),
        },
    })
}

fn deposit_row(record: &Record<DepositPayload>) -> deposits::ActiveModel {
    let body = &record.body;
    deposits::ActiveModel {
        transaction_id: Set(record.transaction_id.get()),
        building_id: Set(body.building_id.get()),
        unit_id: Set(body.unit_id.map(UnitId::get)),
        bank_account_id: Set(body.bank_account_id.get()),
        date: Set(body.date),
        reference_number: Set(body.reference_number.clone()),
        memo: Set(body.memo.clone()),
        total_cents: Set(record.total.get()),
        status: Set(record.status.as_flag().to_string()),
        ..Default::default()
    }
}

fn deposit_record(row: deposits::Model) -> Result<Record<DepositPayload>, StoreError> {
    Ok(Record {
        id: DocumentId::new(row.id),
        transaction_id: TransactionId::new(row.transaction_id),
        status: status(&row.status)?,
        total: Cents::new(row.total_cents),
        body: DepositPayload {
            building_id: BuildingId::new(row.building_id),
            unit_id: row.unit_id.map(UnitId::new),
            bank_account_id: AccountId::new(row.bank_account_id),
            date: row.date,
            reference_number: row.reference_number,
            memo: row.memo,
            lines: Vec::new(),
        },
    })
}

fn journal_row(record: &Record<JournalPayload>) -> journals::ActiveModel {
    let body = &record.body;
    journals::ActiveModel {
        transaction_id: Set(record.transaction_id.get()),
        building_id: Set(body.building_id.get()),
        unit_id: Set(body.unit_id.map(UnitId::get)),
        date: Set(body.date),
        reference_number: Set(body.reference_number.clone()),
        memo: Set(body.memo.clone()),
        total_amount_cents: Set(body.total_amount.get()),
        total_cents: Set(record.total.get()),
        status: Set(record.status.as_flag().to_string()),
        ..Default::default()
    }
}

fn journal_record(row: journals::Model) -> Result<Record<JournalPayload>, StoreError> {
    Ok(Record {
        id: DocumentId::new(row.id),
        transaction_id: TransactionId::new(row.transaction_id),
        status: status(&row.status)?,
        total: Cents::new(row.total_cents),
        body: JournalPayload {
            building_id: BuildingId::new(row.building_id),
            unit_id: row.unit_id.map(UnitId::new),
            date: row.date,
            reference_number: row.reference_number,
            memo: row.memo,
            total_amount: Cents::new(row.total_amount_cents),
            lines: Vec::new(),
        },
    })
}

fn invoice_payment_row(record: &Record<InvoicePaymentPayload>) -> invoice_payments::ActiveModel {
    let body = &record.body;
    invoice_payments::ActiveModel {
        transaction_id: Set(record.transaction_id.get()),
        building_id: Set(body.building_id.get()),
        invoice_id: Set(body.invoice_id.get()),
        asset_account_id: Set(body.asset_account_id.get()),
        date: Set(body.date),
        reference_number: Set(body.reference_number.clone()),
        memo: Set(body.memo.clone()),
        amount_cents: Set(body.amount.get()),
        status: Set(record.status.as_flag().to_string()),
        ..Default::default()
    }
}

pub(super) fn invoice_payment_record(
    row: invoice_payments::Model,
) -> Result<Record<InvoicePaymentPayload>, StoreError> {
    let amount = Cents::new(row.amount_cents);
    Ok(Record {
        id: DocumentId::new(row.id),
        transaction_id: TransactionId::new(row.transaction_id),
        status: status(&row.status)?,
        total: amount,
        body: InvoicePaymentPayload {
            building_id: BuildingId::new(row.building_id),
            invoice_id: DocumentId::new(row.invoice_id),
            asset_account_id: AccountId::new(row.asset_account_id),
            date: row.date,
            reference_number: row.reference_number,
            memo: row.memo,
            amount,
        },
    })
}

fn bill_payment_row(record: &Record<BillPaymentPayload>) -> bill_payments::ActiveModel {
    let body = &record.body;
    bill_payments::ActiveModel {
        transaction_id: Set(record.transaction_id.get()),
        building_id: Set(body.building_id.get()),
        bill_id: Set(body.bill_id.get()),
        asset_account_id: Set(body.asset_account_id.get()),
        date: Set(body.date),
        reference_number: Set(body.reference_number.clone()),
        memo: Set(body.memo.clone()),
        amount_cents: Set(body.amount.get()),
        status: Set(record.status.as_flag().to_string()),
        ..Default::default()
    }
}

fn bill_payment_record(
    row: bill_payments::Model,
) -> Result<Record<BillPaymentPayload>, StoreError> {
    let amount = Cents::new(row.amount_cents);
    Ok(Record {
        id: DocumentId::new(row.id),
        transaction_id: TransactionId::new(row.transaction_id),
        status: status(&row.status)?,
        total: amount,
        body: BillPaymentPayload {
            building_id: BuildingId::new(row.building_id),
            bill_id: DocumentId::new(row.bill_id),
            asset_account_id: AccountId::new(row.asset_account_id),
            date: row.date,
            reference_number: row.reference_number,
            memo: row.memo,
            amount,
        },
    })
}

fn credit_memo_row(record: &Record<CreditMemoPayload>) -> credit_memos::ActiveModel {
    let body = &record.body;
    credit_memos::ActiveModel {
        transaction_id: Set(record.transaction_id.get()),
        building_id: Set(body.building_id.get()),
        customer_id: Set(body.customer_id.get()),
        unit_id: Set(body.unit_id.map(UnitId::get)),
        liability_account_id: Set(body.liability_account_id.get()),
        deposit_account_id: Set(body.deposit_account_id.get()),
        date: Set(body.date),
        reference_number: Set(body.reference_number.clone()),
        memo: Set(body.memo.clone()),
        amount_cents: Set(body.amount.get()),
        status: Set(record.status.as_flag().to_string()),
        ..Default::default()
    }
}

pub(super) fn credit_memo_record(
    row: credit_memos::Model,
) -> Result<Record<CreditMemoPayload>, StoreError> {
    let amount = Cents::new(row.amount_cents);
    Ok(Record {
        id: DocumentId::new(row.id),
        transaction_id: TransactionId::new(row.transaction_id),
        status: status(&row.status)?,
        total: amount,
        body: CreditMemoPayload {
            building_id: BuildingId::new(row.building_id),
            customer_id: PersonId::new(row.customer_id),
            unit_id: row.unit_id.map(UnitId::new),
            liability_account_id: AccountId::new(row.liability_account_id),
            deposit_account_id: AccountId::new(row.deposit_account_id),
            date: row.date,
            reference_number: row.reference_number,
            memo: row.memo,
            amount,
        },
    })
}

// ============================================================================
// Per-kind table access
// ============================================================================

/// Generates insert, update, load, and list for one document kind.
macro_rules! document_table {
    (
        $name:ident {
            kind: $kind:ident,
            table: $table:ident,
            payload: $payload:ty,
            to_row: $to_row:ident,
            to_record: $to_record:ident,
            $(lines: $lines:ident => $field:ident,)?
        }
    ) => {
        struct $name;

        impl $name {
            async fn insert(
                db: &DatabaseTransaction,
                mut record: Record<$payload>,
            ) -> Result<Record<$payload>, StoreError> {
                let row = $to_row(&record).insert(db).await?;
                record.id = DocumentId::new(row.id);
                $(insert_lines::<$lines::Entity>(db, row.id, &record.body.$field).await?;)?
                Ok(record)
            }

            async fn update(
                db: &DatabaseTransaction,
                record: Record<$payload>,
            ) -> Result<Record<$payload>, StoreError> {
                let id = record.id.get();
                let mut row = $to_row(&record);
                row.id = Unchanged(id);
                row.updated_at = Set(now());
                match row.update(db).await {
                    Ok(_) => {}
                    Err(DbErr::RecordNotUpdated) => {
                        return Err(
                            LedgerError::not_found(TransactionKind::$kind.as_str(), id).into()
                        );
                    }
                    Err(err) => return Err(err.into()),
                }
                $(replace_lines::<$lines::Entity>(db, id, &record.body.$field).await?;)?
                Ok(record)
            }

            #[allow(unused_variables)]
            async fn hydrate(
                db: &DatabaseTransaction,
                row: $table::Model,
            ) -> Result<Record<$payload>, StoreError> {
                #[allow(unused_mut)]
                let mut record = $to_record(row)?;
                $(record.body.$field = load_lines::<$lines::Entity>(db, record.id.get()).await?;)?
                Ok(record)
            }

            async fn load(
                db: &DatabaseTransaction,
                id: i64,
            ) -> Result<Option<Record<$payload>>, StoreError> {
                match $table::Entity::find_by_id(id).one(db).await? {
                    Some(row) => Ok(Some(Self::hydrate(db, row).await?)),
                    None => Ok(None),
                }
            }

            async fn list(
                db: &DatabaseTransaction,
                building_id: i64,
            ) -> Result<Vec<Record<$payload>>, StoreError> {
                let rows = $table::Entity::find()
                    .filter($table::Column::BuildingId.eq(building_id))
                    .order_by_asc($table::Column::Id)
                    .all(db)
                    .await?;
                let mut records = Vec::with_capacity(rows.len());
                for row in rows {
                    records.push(Self::hydrate(db, row).await?);
                }
                Ok(records)
            }
        }
    };
}

document_table!(Invoices {
    kind: Invoice,
    table: invoices,
    payload: InvoicePayload,
    to_row: invoice_row,
    to_record: invoice_record,
    lines: invoice_lines => lines,
});

document_table!(SalesReceipts {
    kind: Receipt,
    table: sales_receipts,
    payload: SalesReceiptPayload,
    to_row: sales_receipt_row,
    to_record: sales_receipt_record,
    lines: sales_receipt_lines => lines,
});

document_table!(Bills {
    kind: Bill,
    table: bills,
    payload: BillPayload,
    to_row: bill_row,
    to_record: bill_record,
    lines: bill_lines => lines,
});

document_table!(Checks {
    kind: Check,
    table: checks,
    payload: CheckPayload,
    to_row: check_row,
    to_record: check_record,
    lines: check_lines => lines,
});

document_table!(Deposits {
    kind: Deposit,
    table: deposits,
    payload: DepositPayload,
    to_row: deposit_row,
    to_record: deposit_record,
    lines: deposit_lines => lines,
});

document_table!(Journals {
    kind: Journal,
    table: journals,
    payload: JournalPayload,
    to_row: journal_row,
    to_record: journal_record,
    lines: journal_lines => lines,
});

document_table!(InvoicePayments {
    kind: Payment,
    table: invoice_payments,
    payload: InvoicePaymentPayload,
    to_row: invoice_payment_row,
    to_record: invoice_payment_record,
});

document_table!(BillPayments {
    kind: BillPayment,
    table: bill_payments,
    payload: BillPaymentPayload,
    to_row: bill_payment_row,
    to_record: bill_payment_record,
});

document_table!(CreditMemos {
    kind: CreditMemo,
    table: credit_memos,
    payload: CreditMemoPayload,
    to_row: credit_memo_row,
    to_record: credit_memo_record,
});

// ============================================================================
// Dispatch over the closed document enum
// ============================================================================

pub(super) async fn insert(
    db: &DatabaseTransaction,
    document: Document,
) -> Result<Document, StoreError> {
    Ok(match document {
        Document::Invoice(r) => Document::Invoice(Invoices::insert(db, r).await?),
        Document::Bill(r) => Document::Bill(Bills::insert(db, r).await?),
        Document::Check(r) => Document::Check(Checks::insert(db, r).await?),
        Document::Deposit(r) => Document::Deposit(Deposits::insert(db, r).await?),
        Document::Journal(r) => Document::Journal(Journals::insert(db, r).await?),
        Document::InvoicePayment(r) => {
            Document::InvoicePayment(InvoicePayments::insert(db, r).await?)
        }
        Document::BillPayment(r) => Document::BillPayment(BillPayments::insert(db, r).await?),
        Document::CreditMemo(r) => Document::CreditMemo(CreditMemos::insert(db, r).await?),
        Document::SalesReceipt(r) => {
            Document::SalesReceipt(SalesReceipts::insert(db, r).await?)
        }
    })
}

pub(super) async fn update(
    db: &DatabaseTransaction,
    document: Document,
) -> Result<Document, StoreError> {
    Ok(match document {
        Document::Invoice(r) => Document::Invoice(Invoices::update(db, r).await?),
        Document::Bill(r) => Document::Bill(Bills::update(db, r).await?),
        Document::Check(r) => Document::Check(Checks::update(db, r).await?),
        Document::Deposit(r) => Document::Deposit(Deposits::update(db, r).await?),
        Document::Journal(r) => Document::Journal(Journals::update(db, r).await?),
        Document::InvoicePayment(r) => {
            Document::InvoicePayment(InvoicePayments::update(db, r).await?)
        }
        Document::BillPayment(r) => Document::BillPayment(BillPayments::update(db, r).await?),
        Document::CreditMemo(r) => Document::CreditMemo(CreditMemos::update(db, r).await?),
        Document::SalesReceipt(r) => {
            Document::SalesReceipt(SalesReceipts::update(db, r).await?)
        }
    })
}

pub(super) async fn load(
    db: &DatabaseTransaction,
    kind: TransactionKind,
    id: DocumentId,
) -> Result<Option<Document>, StoreError> {
    let id = id.get();
    Ok(match kind {
        TransactionKind::Invoice => Invoices::load(db, id).await?.map(Document::Invoice),
        TransactionKind::Bill => Bills::load(db, id).await?.map(Document::Bill),
        TransactionKind::Check => Checks::load(db, id).await?.map(Document::Check),
        TransactionKind::Deposit => Deposits::load(db, id).await?.map(Document::Deposit),
        TransactionKind::Journal => Journals::load(db, id).await?.map(Document::Journal),
        TransactionKind::Payment => InvoicePayments::load(db, id)
            .await?
            .map(Document::InvoicePayment),
        TransactionKind::BillPayment => {
            BillPayments::load(db, id).await?.map(Document::BillPayment)
        }
        TransactionKind::CreditMemo => CreditMemos::load(db, id).await?.map(Document::CreditMemo),
        TransactionKind::Receipt => SalesReceipts::load(db, id)
            .await?
            .map(Document::SalesReceipt),
    })
}

pub(super) async fn list(
    db: &DatabaseTransaction,
    kind: TransactionKind,
    building_id: BuildingId,
) -> Result<Vec<Document>, StoreError> {
    fn wrap<P>(records: Vec<Record<P>>, f: fn(Record<P>) -> Document) -> Vec<Document> {
        records.into_iter().map(f).collect()
    }

    let building = building_id.get();
    Ok(match kind {
        TransactionKind::Invoice => wrap(Invoices::list(db, building).await?, Document::Invoice),
        TransactionKind::Bill => wrap(Bills::list(db, building).await?, Document::Bill),
        TransactionKind::Check => wrap(Checks::list(db, building).await?, Document::Check),
        TransactionKind::Deposit => wrap(Deposits::list(db, building).await?, Document::Deposit),
        TransactionKind::Journal => wrap(Journals::list(db, building).await?, Document::Journal),
        TransactionKind::Payment => wrap(
            InvoicePayments::list(db, building).await?,
            Document::InvoicePayment,
        ),
        TransactionKind::BillPayment => wrap(
            BillPayments::list(db, building).await?,
            Document::BillPayment,
        ),
        TransactionKind::CreditMemo => wrap(
            CreditMemos::list(db, building).await?,
            Document::CreditMemo,
        ),
        TransactionKind::Receipt => wrap(
            SalesReceipts::list(db, building).await?,
            Document::SalesReceipt,
        ),
    })
}

// ============================================================================
// Cross-document reads
// ============================================================================

pub(super) async fn payments_for_invoice(
    db: &DatabaseTransaction,
    invoice_id: DocumentId,
) -> Result<Vec<Record<InvoicePaymentPayload>>, StoreError> {
    invoice_payments::Entity::find()
        .filter(invoice_payments::Column::InvoiceId.eq(invoice_id.get()))
        .order_by_asc(invoice_payments::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(invoice_payment_record)
        .collect()
}

pub(super) async fn credit_memos_for_customer(
    db: &DatabaseTransaction,
    building_id: BuildingId,
    customer_id: PersonId,
) -> Result<Vec<Record<CreditMemoPayload>>, StoreError> {
    credit_memos::Entity::find()
        .filter(credit_memos::Column::BuildingId.eq(building_id.get()))
        .filter(credit_memos::Column::CustomerId.eq(customer_id.get()))
        .order_by_asc(credit_memos::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(credit_memo_record)
        .collect()
}

/// Reads a credit memo under `SELECT ... FOR UPDATE`.
pub(super) async fn lock_credit_memo(
    db: &DatabaseTransaction,
    id: DocumentId,
) -> Result<Option<Record<CreditMemoPayload>>, StoreError> {
    credit_memos::Entity::find_by_id(id.get())
        .lock_exclusive()
        .one(db)
        .await?
        .map(credit_memo_record)
        .transpose()
}
