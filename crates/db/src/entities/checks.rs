//! `SeaORM` Entity for checks table.
//!
//! Check headers.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "checks")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub transaction_id: i64,
    pub building_id: i64,
    pub payee_id: Option<i64>,
    pub unit_id: Option<i64>,
    pub bank_account_id: i64,
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
    #[sea_orm(has_many = "super::check_lines::Entity")]
    CheckLines,
}

impl Related<super::check_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CheckLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
