//! Demo building master data.
//!
//! Used by the seeder binary and the database integration tests.

use rentledger_shared::types::{AccountId, BuildingId, ItemId, PersonId};
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, Set};

use crate::entities::{account_types, accounts, items, people};

/// IDs of the rows created by [`seed_demo_building`].
#[derive(Debug, Clone, Copy)]
pub struct DemoBuilding {
    /// The building.
    pub building_id: BuildingId,
    /// Operating bank account.
    pub bank: AccountId,
    /// Accounts receivable.
    pub receivable: AccountId,
    /// Customer deposits liability.
    pub deposits: AccountId,
    /// Accounts payable.
    pub payable: AccountId,
    /// Owner equity.
    pub equity: AccountId,
    /// Rental income.
    pub rent_income: AccountId,
    /// Repairs expense.
    pub repairs: AccountId,
    /// Monthly rent service item.
    pub rent_item: ItemId,
    /// Discount item against rental income.
    pub discount_item: ItemId,
    /// A tenant.
    pub customer: PersonId,
    /// A vendor.
    pub vendor: PersonId,
}

async fn type_id<C: ConnectionTrait>(db: &C, name: &str) -> Result<i64, DbErr> {
    account_types::Entity::find()
        .filter(account_types::Column::Name.eq(name))
        .one(db)
        .await?
        .map(|t| t.id)
        .ok_or_else(|| DbErr::RecordNotFound(format!("account type {name}")))
}

async fn account<C: ConnectionTrait>(
    db: &C,
    building_id: BuildingId,
    number: &str,
    name: &str,
    type_name: &str,
) -> Result<AccountId, DbErr> {
    let row = accounts::ActiveModel {
        building_id: Set(building_id.get()),
        number: Set(number.to_string()),
        name: Set(name.to_string()),
        type_id: Set(type_id(db, type_name).await?),
        is_default: Set(true),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(AccountId::new(row.id))
}

async fn item<C: ConnectionTrait>(
    db: &C,
    building_id: BuildingId,
    name: &str,
    item_type: &str,
    income_account: AccountId,
) -> Result<ItemId, DbErr> {
    let row = items::ActiveModel {
        building_id: Set(building_id.get()),
        name: Set(name.to_string()),
        item_type: Set(item_type.to_string()),
        asset_account_id: Set(None),
        income_account_id: Set(Some(income_account.get())),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(ItemId::new(row.id))
}

async fn person<C: ConnectionTrait>(
    db: &C,
    building_id: BuildingId,
    display_name: &str,
) -> Result<PersonId, DbErr> {
    let row = people::ActiveModel {
        building_id: Set(building_id.get()),
        display_name: Set(display_name.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(PersonId::new(row.id))
}

/// Creates a small chart of accounts, two items, a tenant, and a vendor.
///
/// Expects the standard account types from the ledger migration.
///
/// # Errors
///
/// Returns an error if an account type is missing or an insert fails,
/// e.g. when the building was already seeded.
pub async fn seed_demo_building<C: ConnectionTrait>(
    db: &C,
    building_id: BuildingId,
) -> Result<DemoBuilding, DbErr> {
    let bank = account(db, building_id, "1000", "Operating Bank", "Bank").await?;
    let receivable = account(
        db,
        building_id,
        "1200",
        "Accounts Receivable",
        "Account Receivable",
    )
    .await?;
    let payable = account(db, building_id, "2000", "Accounts Payable", "Account Payable").await?;
    let deposits = account(
        db,
        building_id,
        "2100",
        "Customer Deposits",
        "Other Current Liability",
    )
    .await?;
    let equity = account(db, building_id, "3000", "Owner Equity", "Equity").await?;
    let rent_income = account(db, building_id, "4000", "Rental Income", "Income").await?;
    let repairs = account(db, building_id, "6000", "Repairs", "Expense").await?;

    let rent_item = item(db, building_id, "Monthly Rent", "service", rent_income).await?;
    let discount_item = item(db, building_id, "Prompt Pay Discount", "discount", rent_income).await?;

    let customer = person(db, building_id, "Ada Tenant").await?;
    let vendor = person(db, building_id, "Fixit Plumbing").await?;

    Ok(DemoBuilding {
        building_id,
        bank,
        receivable,
        deposits,
        payable,
        equity,
        rent_income,
        repairs,
        rent_item,
        discount_item,
        customer,
        vendor,
    })
}
