//! `SeaORM` Entity for bill_payments table.
//!
//! Payments made against bills.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "bill_payments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub transaction_id: i64,
    pub building_id: i64,
    pub bill_id: i64,
    pub asset_account_id: i64,
    pub date: Date,
    pub reference_number: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub memo: Option<String>,
    pub amount_cents: i64,
    #[sea_orm(column_type = "Char(Some(1))")]
    pub status: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
