//! Aggregate reads behind the report engine.
//!
//! Both queries share one filter: active splits of active transactions in
//! the building, dated on or before the as-of date. Sums are taken in SQL
//! over the integer cents columns.

use chrono::NaiveDate;
use rentledger_core::ledger::{Account, SideTotals};
use rentledger_core::reports::{AccountTotals, CustomerTotals, RECEIVABLE_TYPE_NAME};
use rentledger_shared::types::{BuildingId, Cents, PersonId};
use sea_orm::{DatabaseTransaction, DbBackend, FromQueryResult, Statement};

use super::AccountRow;
use crate::error::StoreError;

const ACCOUNT_TOTALS_SQL: &str = r"
SELECT a.id, a.building_id, a.number, a.name, a.type_id, a.is_default,
       t.name AS type_name, t.nature, t.normal_side,
       COALESCE(SUM(s.debit_cents), 0)::BIGINT AS debit_cents,
       COALESCE(SUM(s.credit_cents), 0)::BIGINT AS credit_cents
FROM splits s
JOIN transactions tx ON tx.id = s.transaction_id
JOIN accounts a ON a.id = s.account_id
JOIN account_types t ON t.id = a.type_id
WHERE s.status = '1'
  AND tx.status = '1'
  AND tx.building_id = $1
  AND tx.date <= $2
GROUP BY a.id, t.id
ORDER BY a.number, a.id
";

const RECEIVABLE_TOTALS_SQL: &str = r"
SELECT s.person_id,
       COALESCE(p.display_name, 'Person ' || s.person_id::TEXT) AS name,
       COALESCE(SUM(s.debit_cents), 0)::BIGINT AS debit_cents,
       COALESCE(SUM(s.credit_cents), 0)::BIGINT AS credit_cents
FROM splits s
JOIN transactions tx ON tx.id = s.transaction_id
JOIN accounts a ON a.id = s.account_id
JOIN account_types t ON t.id = a.type_id
LEFT JOIN people p ON p.id = s.person_id
WHERE s.status = '1'
  AND tx.status = '1'
  AND tx.building_id = $1
  AND tx.date <= $2
  AND t.name = $3
  AND s.person_id IS NOT NULL
GROUP BY s.person_id, p.display_name
ORDER BY name, s.person_id
";

#[derive(Debug, FromQueryResult)]
struct AccountTotalsRow {
    id: i64,
    building_id: i64,
    number: String,
    name: String,
    type_id: i64,
    is_default: bool,
    type_name: String,
    nature: String,
    normal_side: String,
    debit_cents: i64,
    credit_cents: i64,
}

#[derive(Debug, FromQueryResult)]
struct CustomerTotalsRow {
    person_id: i64,
    name: String,
    debit_cents: i64,
    credit_cents: i64,
}

pub(super) async fn account_totals(
    db: &DatabaseTransaction,
    building_id: BuildingId,
    as_of: NaiveDate,
) -> Result<Vec<AccountTotals>, StoreError> {
    let rows = AccountTotalsRow::find_by_statement(Statement::from_sql_and_values(
        DbBackend::Postgres,
        ACCOUNT_TOTALS_SQL,
        [building_id.get().into(), as_of.into()],
    ))
    .all(db)
    .await?;

    rows.into_iter()
        .map(|row| {
            let account = AccountRow {
                id: row.id,
                building_id: row.building_id,
                number: row.number,
                name: row.name,
                type_id: row.type_id,
                is_default: row.is_default,
                type_name: row.type_name,
                nature: row.nature,
                normal_side: row.normal_side,
            };
            Ok(AccountTotals {
                account: Account::try_from(account)?,
                totals: SideTotals::new(Cents::new(row.debit_cents), Cents::new(row.credit_cents)),
            })
        })
        .collect()
}

pub(super) async fn receivable_totals(
    db: &DatabaseTransaction,
    building_id: BuildingId,
    as_of: NaiveDate,
) -> Result<Vec<CustomerTotals>, StoreError> {
    let rows = CustomerTotalsRow::find_by_statement(Statement::from_sql_and_values(
        DbBackend::Postgres,
        RECEIVABLE_TOTALS_SQL,
        [
            building_id.get().into(),
            as_of.into(),
            RECEIVABLE_TYPE_NAME.into(),
        ],
    ))
    .all(db)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| CustomerTotals {
            person_id: PersonId::new(row.person_id),
            name: row.name,
            totals: SideTotals::new(Cents::new(row.debit_cents), Cents::new(row.credit_cents)),
        })
        .collect())
}
