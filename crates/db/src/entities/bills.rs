//! `SeaORM` Entity for bills table.
//!
//! Bill headers.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "bills")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub transaction_id: i64,
    pub building_id: i64,
    pub vendor_id: Option<i64>,
    pub unit_id: Option<i64>,
    pub ap_account_id: i64,
    pub date: Date,
    pub due_date: Option<Date>,
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
    #[sea_orm(has_many = "super::bill_lines::Entity")]
    BillLines,
}

impl Related<super::bill_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BillLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
