//! `SeaORM` Entity for credit_memos table.
//!
//! Customer credit memos.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "credit_memos")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub transaction_id: i64,
    pub building_id: i64,
    pub customer_id: i64,
    pub unit_id: Option<i64>,
    pub liability_account_id: i64,
    pub deposit_account_id: i64,
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
