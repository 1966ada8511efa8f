//! `SeaORM` Entity for sales_receipts table.
//!
//! Sales receipt headers.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "sales_receipts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub transaction_id: i64,
    pub building_id: i64,
    pub customer_id: Option<i64>,
    pub unit_id: Option<i64>,
    pub deposit_account_id: i64,
    pub date: Date,
    pub reference_number: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub memo: Option<String>,
    pub total_cents: i64,
    #[sea_orm(column_type = "Char(Some(1))")]
    pub status: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::sales_receipt_lines::Entity")]
    SalesReceiptLines,
}

impl Related<super::sales_receipt_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SalesReceiptLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
